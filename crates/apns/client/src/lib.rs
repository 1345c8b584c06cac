//! APNs Push Delivery
//!
//! HTTP/2 delivery of push notifications to the APNs gateway, with
//! certificate or provider-token authentication.

mod auth;
mod client;
mod connection;
mod endpoint;
mod pool;

pub use auth::*;
pub use client::*;
pub use connection::*;
pub use endpoint::*;
pub use pool::*;

//! APNs Core Types
//!
//! Notification requests, delivery results, and the wire vocabulary of the
//! APNs HTTP/2 provider API.

mod request;
mod result;

pub use request::*;
pub use result::*;

//! APNs Credential Primitives
//!
//! Certificate parsing, provider token signing, and TLS client
//! configuration for gateway connections.

mod cert;
mod tls;
mod token;

pub use cert::*;
pub use tls::*;
pub use token::*;

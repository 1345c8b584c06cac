//! Gateway endpoint selection.

/// APNs gateway environment.
///
/// Production and sandbox use distinct fixed hostnames; nothing else about
/// a connection differs between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Endpoint {
    /// Live gateway.
    Production,
    /// Development gateway for sandbox-provisioned devices.
    Sandbox,
}

impl Endpoint {
    /// Gateway hostname.
    pub fn host(&self) -> &'static str {
        match self {
            Endpoint::Production => "api.push.apple.com",
            Endpoint::Sandbox => "api.development.push.apple.com",
        }
    }

    /// Gateway TLS port. Connections are always secure.
    pub fn port(&self) -> u16 {
        443
    }

    /// Select the endpoint for a pool configuration flag.
    pub fn from_sandbox_flag(use_sandbox: bool) -> Self {
        if use_sandbox {
            Endpoint::Sandbox
        } else {
            Endpoint::Production
        }
    }
}

//! Client address resolution and hashing.

use sha2::{Digest, Sha256};
use std::net::IpAddr;

/// Placeholder used when no address source is available.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Address hints gathered from a request, in priority order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientAddressSources<'a> {
    /// `x-forwarded-for` header.
    pub forwarded_for: Option<&'a str>,
    /// `x-real-ip` header.
    pub real_ip: Option<&'a str>,
    /// `remote-addr` header.
    pub remote_addr: Option<&'a str>,
    /// Socket peer address.
    pub peer: Option<IpAddr>,
}

impl ClientAddressSources<'_> {
    /// Picks the client address: the first `x-forwarded-for` entry, then
    /// `x-real-ip`, then `remote-addr`, then the socket peer.
    #[must_use]
    pub fn resolve(&self) -> String {
        let forwarded = self.forwarded_for.and_then(|v| v.split(',').next());
        [forwarded, self.real_ip, self.remote_addr]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|v| !v.is_empty())
            .map(ToString::to_string)
            .or_else(|| self.peer.map(|ip| ip.to_string()))
            .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
    }
}

/// Salted SHA-256 of client addresses.
#[derive(Clone)]
pub struct IpHasher {
    salt: String,
}

impl IpHasher {
    #[must_use]
    pub fn new(salt: impl Into<String>) -> Self {
        Self { salt: salt.into() }
    }

    /// Lowercase hex of `sha256(ip + salt)`.
    #[must_use]
    pub fn hash(&self, ip: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(ip.as_bytes());
        hasher.update(self.salt.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

impl std::fmt::Debug for IpHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IpHasher").finish_non_exhaustive()
    }
}

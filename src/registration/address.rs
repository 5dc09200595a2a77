//! Advertised address discovery.
//!
//! Picks the first non-loopback IPv4 address bound to a local interface
//! and pairs it with the listen port. Falls back to `127.0.0.1` when the
//! host has no such interface or interfaces cannot be enumerated.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr};

/// Host used when no qualifying interface exists.
pub const FALLBACK_HOST: Ipv4Addr = Ipv4Addr::LOCALHOST;

/// `host:port` this instance is reachable at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NetworkAddress(String);

impl NetworkAddress {
    pub fn new(host: Ipv4Addr, port: u16) -> Self {
        Self(format!("{}:{}", host, port))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NetworkAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolve the advertised address from the host's current interfaces.
pub fn resolve(port: u16) -> NetworkAddress {
    let interfaces = match local_ip_address::list_afinet_netifas() {
        Ok(interfaces) => interfaces,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to enumerate network interfaces");
            Vec::new()
        }
    };

    let host = select_host(&interfaces);
    NetworkAddress::new(host, port)
}

/// First non-loopback IPv4 address in enumeration order.
pub fn select_host(interfaces: &[(String, IpAddr)]) -> Ipv4Addr {
    interfaces
        .iter()
        .find_map(|(name, ip)| match ip {
            IpAddr::V4(v4) if !v4.is_loopback() => {
                tracing::debug!(interface = %name, address = %v4, "Selected interface");
                Some(*v4)
            }
            _ => None,
        })
        .unwrap_or(FALLBACK_HOST)
}

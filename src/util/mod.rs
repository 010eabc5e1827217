//! Utility module
//!
//! Helpers shared by the library and the demos.

use std::net::{IpAddr, Ipv4Addr};

use tracing_subscriber::EnvFilter;

use crate::core::{Error, Result};

/// Every address assigned to an interface of this machine, loopback included
#[cfg(unix)]
pub fn local_addrs() -> Result<Vec<IpAddr>> {
    let interfaces = nix::ifaddrs::getifaddrs()
        .map_err(|e| Error::resource(format!("Failed to list network interfaces: {}", e)))?;

    let mut addrs: Vec<IpAddr> = Vec::new();
    for address in interfaces.filter_map(|interface| interface.address) {
        let ip = if let Some(sin) = address.as_sockaddr_in() {
            IpAddr::V4(Ipv4Addr::from(sin.ip()))
        } else if let Some(sin6) = address.as_sockaddr_in6() {
            IpAddr::V6(sin6.ip())
        } else {
            continue;
        };
        if !addrs.contains(&ip) {
            addrs.push(ip);
        }
    }
    Ok(addrs)
}

#[cfg(not(unix))]
pub fn local_addrs() -> Result<Vec<IpAddr>> {
    Err(Error::resource(
        "interface detection needs a unix host; set local_addr in the config",
    ))
}

/// First non-loopback IPv4 address of this machine
pub fn local_ipv4() -> Result<Ipv4Addr> {
    local_addrs()?
        .into_iter()
        .find_map(|ip| match ip {
            IpAddr::V4(v4) if !v4.is_loopback() && !v4.is_unspecified() => Some(v4),
            _ => None,
        })
        .ok_or_else(|| Error::resource("no connected IPv4 interface found"))
}

/// Installs a fmt subscriber. `RUST_LOG` wins over `default_filter`.
///
/// Does nothing if a global subscriber is already set.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

use std::net::{Ipv4Addr, SocketAddr, ToSocketAddrs};

use log::warn;

/// Resolves the address workers should use to reach a service listening on `port`.
///
/// The host name is resolved first, falling back to the loopback address when it
/// can't be resolved to an IPv4 address.
///
/// # Arguments
/// * `port` - The port the service is bound to.
///
/// # Returns
/// The externally reachable address of the service.
pub fn determine_master(port: u16) -> SocketAddr {
    match resolve_host(port) {
        Some(addr) => addr,
        None => {
            warn!(port = port; "couldn't resolve the host name, falling back to loopback");
            SocketAddr::from((Ipv4Addr::LOCALHOST, port))
        }
    }
}

fn resolve_host(port: u16) -> Option<SocketAddr> {
    let host = hostname::get().ok()?.into_string().ok()?;

    (host.as_str(), port)
        .to_socket_addrs()
        .ok()?
        .find(SocketAddr::is_ipv4)
}

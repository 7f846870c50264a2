//! Printer address resolution.
//!
//! Accepts `IP`, `IP:PORT`, `hostname`, `hostname:PORT`, and Windows share
//! paths (`\\server\printer`). Defaults to port 9100.

use std::net::{IpAddr, SocketAddr, ToSocketAddrs};

use tracing::debug;

use crate::PrintError;

/// Default ZPL raw printing port (JetDirect / RAW).
pub const DEFAULT_PORT: u16 = 9100;

/// Extract the printer host name from a share path such as
/// `\\printsrv\ZD420-DOCK` or `//printsrv/ZD420-DOCK`.
///
/// The printer segment (the one after the server) is the device's own host
/// name. Returns `None` when `input` is not a share path, and
/// `Some(Err(..))` when it is one without a printer segment.
pub fn share_path_host(input: &str) -> Option<Result<&str, PrintError>> {
    let rest = input
        .strip_prefix(r"\\")
        .or_else(|| input.strip_prefix("//"))?;

    let mut segments = rest.split(['\\', '/']);
    let _server = segments.next();
    Some(match segments.next() {
        Some(printer) if !printer.trim().is_empty() => Ok(printer.trim()),
        _ => Err(PrintError::InvalidAddress(input.to_string())),
    })
}

/// Resolve a user-provided printer address string to a `SocketAddr`.
///
/// Accepts these formats:
/// - `192.168.1.55:9100` -- IP with explicit port
/// - `192.168.1.55` -- IP without port (defaults to 9100)
/// - `printer01.local:9100` -- hostname with port
/// - `printer01.local` -- hostname without port (defaults to 9100)
/// - `\\printsrv\printer01` -- share path; `printer01` is resolved
///
/// Returns the first resolved address.
pub fn resolve_printer_addr(input: &str) -> Result<SocketAddr, PrintError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(PrintError::InvalidAddress(input.to_string()));
    }

    if let Some(host) = share_path_host(input) {
        let host = host?;
        debug!(path = input, host, "resolving printer from share path");
        return resolve_host(host, DEFAULT_PORT);
    }

    if let Ok(addr) = input.parse::<SocketAddr>() {
        return Ok(addr);
    }

    if let Ok(ip) = input.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, DEFAULT_PORT));
    }

    // host:port
    if let Ok(mut addrs) = input.to_socket_addrs()
        && let Some(addr) = addrs.next()
    {
        return Ok(addr);
    }

    resolve_host(input, DEFAULT_PORT)
}

fn resolve_host(host: &str, port: u16) -> Result<SocketAddr, PrintError> {
    (host, port)
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .ok_or_else(|| PrintError::NoAddressFound(host.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ip_with_port() {
        let addr = resolve_printer_addr("192.168.1.55:6101").unwrap();
        assert_eq!(addr.ip().to_string(), "192.168.1.55");
        assert_eq!(addr.port(), 6101);
    }

    #[test]
    fn ip_without_port_defaults_to_9100() {
        let addr = resolve_printer_addr("192.168.1.55").unwrap();
        assert_eq!(addr.port(), DEFAULT_PORT);
    }

    #[test]
    fn ipv6_forms() {
        let addr = resolve_printer_addr("[::1]:9200").unwrap();
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), 9200);
        let addr = resolve_printer_addr("::1").unwrap();
        assert_eq!(addr.port(), DEFAULT_PORT);
    }

    #[test]
    fn localhost_without_port() {
        let addr = resolve_printer_addr("localhost").unwrap();
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), DEFAULT_PORT);
    }

    #[test]
    fn share_path_uses_printer_segment() {
        assert_eq!(
            share_path_host(r"\\printsrv\ZD420").unwrap().unwrap(),
            "ZD420"
        );
        assert_eq!(
            share_path_host("//printsrv/ZD420/extra").unwrap().unwrap(),
            "ZD420"
        );
        assert!(share_path_host("printsrv").is_none());
    }

    #[test]
    fn share_path_without_printer_is_invalid() {
        match share_path_host(r"\\printsrv").unwrap() {
            Err(PrintError::InvalidAddress(s)) => assert_eq!(s, r"\\printsrv"),
            other => panic!("expected InvalidAddress, got {other:?}"),
        }
    }

    #[test]
    fn share_path_resolves_printer_host() {
        let addr = resolve_printer_addr(r"\\printsrv\localhost").unwrap();
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), DEFAULT_PORT);
    }

    #[test]
    fn unresolvable_hostname() {
        match resolve_printer_addr("no-such-host.invalid") {
            Err(PrintError::NoAddressFound(s)) => assert_eq!(s, "no-such-host.invalid"),
            other => panic!("expected NoAddressFound, got {other:?}"),
        }
    }

    #[test]
    fn empty_input_is_invalid() {
        assert!(matches!(
            resolve_printer_addr("  "),
            Err(PrintError::InvalidAddress(_))
        ));
    }
}

//! SSRF (Server-Side Request Forgery) protection.
//!
//! Quiz text is user-authored, so every embedded URL is untrusted. Hosts
//! are resolved before fetching and refused if any address is private,
//! internal, or reserved. The same rule is applied to every redirect hop
//! and inside the HTTP client's own DNS lookups, so the address that was
//! checked is the address that gets connected to.
use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use std::net::{IpAddr, SocketAddr};
use url::{Host, Url};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error type for SSRF validation failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SsrfError {
    #[error("blocked IP: {0} (private/reserved)")]
    BlockedIp(IpAddr),

    #[error("DNS resolution failed: {0}")]
    DnsError(String),
}

/// Check if an IP address is private, reserved, or otherwise blocked.
///
/// Covers loopback, RFC 1918, link-local (v4 and v6), multicast, broadcast,
/// the unspecified address and `0.0.0.0/8`, and IPv6 unique-local `fc00::/7`.
/// IPv4-mapped IPv6 addresses are judged by their IPv4 form.
pub fn is_private_or_reserved(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_multicast()
                || v4.is_broadcast()
                || v4.octets()[0] == 0
        }
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => is_private_or_reserved(IpAddr::V4(v4)),
            None => {
                let first = v6.segments()[0];
                v6.is_loopback()
                    || v6.is_multicast()
                    || v6.is_unspecified()
                    || (first & 0xfe00) == 0xfc00
                    || (first & 0xffc0) == 0xfe80
            }
        },
    }
}

/// Validate that an IP address is not private or reserved.
///
/// Returns an error if the IP is blocked.
pub fn validate_ip(ip: IpAddr) -> Result<(), SsrfError> {
    if is_private_or_reserved(ip) { Err(SsrfError::BlockedIp(ip)) } else { Ok(()) }
}

/// The address of an IP-literal host, if `url` has one.
pub fn host_ip(url: &Url) -> Option<IpAddr> {
    match url.host()? {
        Host::Ipv4(ip) => Some(IpAddr::V4(ip)),
        Host::Ipv6(ip) => Some(IpAddr::V6(ip)),
        Host::Domain(_) => None,
    }
}

/// Resolve `domain` and return its addresses, all of which must be public.
pub async fn resolve_public(domain: &str, port: u16) -> Result<Vec<SocketAddr>, SsrfError> {
    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((domain, port))
        .await
        .map_err(|e| SsrfError::DnsError(format!("{domain}: {e}")))?
        .collect();

    if addrs.is_empty() {
        return Err(SsrfError::DnsError(format!("{domain}: no addresses")));
    }
    for addr in &addrs {
        validate_ip(addr.ip())?;
    }
    Ok(addrs)
}

/// Resolve the host of `url` and validate every address it maps to.
///
/// IP-literal hosts are checked directly without a lookup.
pub async fn validate_host(url: &Url) -> Result<(), SsrfError> {
    if let Some(ip) = host_ip(url) {
        return validate_ip(ip);
    }
    match url.host_str() {
        Some(domain) => resolve_public(domain, url.port_or_known_default().unwrap_or(80)).await.map(|_| ()),
        None => Err(SsrfError::DnsError(format!("no host in {url}"))),
    }
}

/// Check one redirect target. Domain targets are left to [`PublicResolver`].
pub fn validate_redirect(url: &Url) -> Result<(), SsrfError> {
    host_ip(url).map_or(Ok(()), validate_ip)
}

/// DNS resolver for the HTTP client that refuses private and reserved answers.
#[derive(Debug, Clone, Copy, Default)]
pub struct PublicResolver;

impl Resolve for PublicResolver {
    fn resolve(&self, name: Name) -> Resolving {
        Box::pin(async move {
            let addrs = resolve_public(name.as_str(), 0).await?;
            Ok::<Addrs, BoxError>(Box::new(addrs.into_iter()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    fn v4(a: u8, b: u8, c: u8, d: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(a, b, c, d))
    }

    fn v6(first: u16, last: u16) -> IpAddr {
        IpAddr::V6(Ipv6Addr::new(first, 0, 0, 0, 0, 0, 0, last))
    }

    #[test]
    fn test_blocked_v4_ranges() {
        for ip in [
            v4(127, 0, 0, 1),
            v4(10, 1, 2, 3),
            v4(172, 16, 0, 1),
            v4(172, 31, 255, 255),
            v4(192, 168, 0, 1),
            v4(169, 254, 169, 254),
            v4(224, 0, 0, 1),
            v4(255, 255, 255, 255),
            v4(0, 0, 0, 0),
            v4(0, 1, 2, 3),
        ] {
            assert!(is_private_or_reserved(ip), "{ip} should be blocked");
        }
    }

    #[test]
    fn test_blocked_v6_ranges() {
        for ip in [
            IpAddr::V6(Ipv6Addr::LOCALHOST),
            IpAddr::V6(Ipv6Addr::UNSPECIFIED),
            v6(0xfc00, 1),
            v6(0xfdff, 1),
            v6(0xfe80, 1),
            v6(0xff02, 1),
            IpAddr::V6(Ipv4Addr::new(10, 0, 0, 1).to_ipv6_mapped()),
        ] {
            assert!(is_private_or_reserved(ip), "{ip} should be blocked");
        }
    }

    #[test]
    fn test_public_addresses_allowed() {
        for ip in [v4(8, 8, 8, 8), v4(93, 184, 216, 34), v6(0x2001, 1), v4(172, 32, 0, 1)] {
            assert!(validate_ip(ip).is_ok(), "{ip} should be allowed");
        }
    }

    #[tokio::test]
    async fn test_validate_host_ip_literals() {
        let loopback = Url::parse("http://127.0.0.1/pic.png").unwrap();
        assert!(matches!(validate_host(&loopback).await, Err(SsrfError::BlockedIp(_))));

        let private_v6 = Url::parse("http://[fd00::1]/pic.png").unwrap();
        assert!(matches!(validate_host(&private_v6).await, Err(SsrfError::BlockedIp(_))));

        let public = Url::parse("http://93.184.216.34/pic.png").unwrap();
        assert!(validate_host(&public).await.is_ok());
    }

    #[test]
    fn test_validate_redirect() {
        for target in ["http://127.0.0.1/x.png", "http://169.254.169.254/latest/meta-data", "http://[::1]/x.png"] {
            let url = Url::parse(target).unwrap();
            assert!(matches!(validate_redirect(&url), Err(SsrfError::BlockedIp(_))), "{target} should be refused");
        }
        assert!(validate_redirect(&Url::parse("https://93.184.216.34/x.png").unwrap()).is_ok());
        assert!(validate_redirect(&Url::parse("https://cdn.example.com/x.png").unwrap()).is_ok());
    }

    #[tokio::test]
    async fn test_resolver_refuses_loopback_names() {
        let name: Name = "localhost".parse().unwrap();
        let err = PublicResolver.resolve(name).await.err().unwrap();
        assert!(err.downcast_ref::<SsrfError>().is_some());
    }
}

// ── Identifier parsing ──
//
// The two identifier kinds a lookup accepts: a CIDR for network lookups and
// a literal address for IP lookups.

use std::net::IpAddr;

use ipnet::IpNet;

use crate::error::CoreError;

/// Parse a CIDR (`10.1.0.0/24`, `2001:db8::/48`).
///
/// Host bits are allowed and cleared, so `10.1.0.5/24` yields `10.1.0.0/24`.
/// A missing prefix length or one wider than the address family is rejected.
pub fn parse_cidr(input: &str) -> Result<IpNet, CoreError> {
    let trimmed = input.trim();
    let invalid = |reason: &str| CoreError::InvalidIdentifier {
        input: input.to_owned(),
        reason: reason.to_owned(),
    };

    let Some((addr, prefix)) = trimmed.split_once('/') else {
        return Err(invalid("expected address/prefix-length"));
    };
    let addr: IpAddr = addr
        .parse()
        .map_err(|_| invalid("network address is not a valid IPv4 or IPv6 address"))?;
    let prefix: u8 = prefix
        .parse()
        .map_err(|_| invalid("prefix length is not a number"))?;

    IpNet::new(addr, prefix)
        .map(|net| net.trunc())
        .map_err(|_| {
            let max = if addr.is_ipv4() { 32 } else { 128 };
            invalid(&format!("prefix length {prefix} exceeds {max}"))
        })
}

/// Parse a literal IPv4 or IPv6 address.
pub fn parse_ip(input: &str) -> Result<IpAddr, CoreError> {
    input
        .trim()
        .parse()
        .map_err(|_| CoreError::InvalidIdentifier {
            input: input.to_owned(),
            reason: "not a valid IPv4 or IPv6 address".into(),
        })
}

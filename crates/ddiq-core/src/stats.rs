// ── Derived statistics ──
//
// Address arithmetic for utilization and DHCP free counts. Everything here
// is pure: the aggregator feeds it gateway records and stores the results
// on the report.

use std::collections::BTreeSet;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use ipnet::IpNet;

use crate::model::{DhcpRange, FixedAddressRecord, LeaseRecord};

/// Numeric value of an address, for range arithmetic across both families.
pub fn addr_value(ip: &IpAddr) -> u128 {
    match ip {
        IpAddr::V4(v4) => u128::from(u32::from(*v4)),
        IpAddr::V6(v6) => u128::from(*v6),
    }
}

fn addr_from_value(template: &IpAddr, value: u128) -> Option<IpAddr> {
    match template {
        IpAddr::V4(_) => u32::try_from(value)
            .ok()
            .map(|v| IpAddr::V4(Ipv4Addr::from(v))),
        IpAddr::V6(_) => Some(IpAddr::V6(Ipv6Addr::from(value))),
    }
}

/// Usable host addresses in a network: `2^(bits - prefix) - 2`.
///
/// The network and broadcast addresses are excluded for both families, so
/// /31 and /32 (and /127, /128) have no usable hosts. An IPv6 /0 saturates
/// at `u128::MAX - 2`.
pub fn usable_hosts(net: &IpNet) -> u128 {
    let host_bits = u32::from(net.max_prefix_len() - net.prefix_len());
    let size = 1u128.checked_shl(host_bits).unwrap_or(u128::MAX);
    size.saturating_sub(2)
}

/// First usable host of a network, if it has any.
pub fn first_usable_host(net: &IpNet) -> Option<IpAddr> {
    if usable_hosts(net) == 0 {
        return None;
    }
    let network = net.network();
    addr_from_value(&network, addr_value(&network) + 1)
}

/// IPv4 broadcast address. IPv6 has none, and neither do /31 and /32.
pub fn broadcast_address(net: &IpNet) -> Option<IpAddr> {
    match net {
        IpNet::V4(v4) if v4.prefix_len() <= 30 => Some(IpAddr::V4(v4.broadcast())),
        _ => None,
    }
}

/// Addresses inside `cidr` held by a bound lease or a fixed address.
///
/// An address with both a lease and a reservation is counted once.
pub fn bound_addresses(
    cidr: &IpNet,
    leases: &[LeaseRecord],
    fixed: &[FixedAddressRecord],
) -> BTreeSet<IpAddr> {
    leases
        .iter()
        .filter(|lease| lease.is_bound())
        .map(|lease| lease.ip)
        .chain(fixed.iter().map(|fa| fa.ip))
        .filter(|ip| cidr.contains(ip))
        .collect()
}

/// Addresses inside the DHCP ranges that are not bound.
pub fn dhcp_free(ranges: &[DhcpRange], bound: &BTreeSet<IpAddr>) -> u128 {
    let capacity = ranges
        .iter()
        .fold(0u128, |acc, range| acc.saturating_add(range.size()));
    let taken = bound
        .iter()
        .filter(|ip| ranges.iter().any(|range| range.contains(ip)))
        .count();
    capacity.saturating_sub(u128::try_from(taken).unwrap_or(u128::MAX))
}

/// `used / total` as a percentage rounded to one decimal place.
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub fn percent(used: u128, total: u128) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let ratio = used as f64 / total as f64;
    (ratio * 1000.0).round() / 10.0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn net(s: &str) -> IpNet {
        s.parse().unwrap()
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn usable_hosts_by_prefix() {
        assert_eq!(usable_hosts(&net("192.168.1.0/24")), 254);
        assert_eq!(usable_hosts(&net("10.0.0.0/8")), 16_777_214);
        assert_eq!(usable_hosts(&net("10.0.0.0/30")), 2);
        assert_eq!(usable_hosts(&net("10.0.0.0/31")), 0);
        assert_eq!(usable_hosts(&net("10.0.0.1/32")), 0);
        assert_eq!(usable_hosts(&net("0.0.0.0/0")), 4_294_967_294);
        assert_eq!(usable_hosts(&net("2001:db8::/64")), (1u128 << 64) - 2);
        assert_eq!(usable_hosts(&net("2001:db8::/127")), 0);
        assert_eq!(usable_hosts(&net("::/0")), u128::MAX - 2);
    }

    #[test]
    fn first_host_and_broadcast() {
        assert_eq!(first_usable_host(&net("10.1.0.0/24")), Some(ip("10.1.0.1")));
        assert_eq!(first_usable_host(&net("2001:db8::/64")), Some(ip("2001:db8::1")));
        assert_eq!(first_usable_host(&net("10.1.0.0/31")), None);

        assert_eq!(broadcast_address(&net("10.1.0.0/24")), Some(ip("10.1.0.255")));
        assert_eq!(broadcast_address(&net("10.1.0.0/31")), None);
        assert_eq!(broadcast_address(&net("2001:db8::/64")), None);
    }

    #[test]
    fn bound_addresses_dedupes_and_scopes() {
        let cidr = net("10.0.0.0/24");
        let mut released = LeaseRecord::new(ip("10.0.0.12"));
        released.binding_state = Some("FREE".into());
        let leases = vec![
            LeaseRecord::new(ip("10.0.0.10")),
            LeaseRecord::new(ip("10.0.0.11")),
            released,
            LeaseRecord::new(ip("10.0.1.10")),
        ];
        let fixed = vec![
            FixedAddressRecord::new(ip("10.0.0.11")),
            FixedAddressRecord::new(ip("10.0.0.20")),
        ];

        let bound = bound_addresses(&cidr, &leases, &fixed);
        let got: Vec<String> = bound.iter().map(ToString::to_string).collect();
        assert_eq!(got, vec!["10.0.0.10", "10.0.0.11", "10.0.0.20"]);
    }

    #[test]
    fn dhcp_free_subtracts_bound_inside_ranges() {
        let ranges = vec![
            DhcpRange {
                start: ip("10.0.0.100"),
                end: ip("10.0.0.149"),
            },
            DhcpRange {
                start: ip("10.0.0.200"),
                end: ip("10.0.0.209"),
            },
        ];
        let bound: BTreeSet<IpAddr> = [ip("10.0.0.100"), ip("10.0.0.205"), ip("10.0.0.20")]
            .into_iter()
            .collect();

        assert_eq!(dhcp_free(&ranges, &bound), 58);
        assert_eq!(dhcp_free(&[], &bound), 0);
    }

    #[test]
    fn percent_rounds_to_one_decimal() {
        assert!((percent(142, 254) - 55.9).abs() < f64::EPSILON);
        assert!((percent(1, 3) - 33.3).abs() < f64::EPSILON);
        assert!(percent(5, 0).abs() < f64::EPSILON);
    }
}

// ── DHCP domain types ──

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::stats::addr_value;

/// Binding states in which a lease no longer holds its address.
const RELEASED_STATES: &[&str] = &["FREE", "BACKUP", "EXPIRED", "RELEASED", "RESET"];

/// A DHCP lease.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaseRecord {
    pub ip: IpAddr,
    pub mac: Option<String>,
    pub hostname: Option<String>,
    /// `ACTIVE`, `FREE`, `STATIC`, ...
    pub binding_state: Option<String>,
    pub ends: Option<DateTime<Utc>>,
}

impl LeaseRecord {
    pub fn new(ip: IpAddr) -> Self {
        Self {
            ip,
            mac: None,
            hostname: None,
            binding_state: None,
            ends: None,
        }
    }

    /// Whether the lease currently holds its address.
    ///
    /// Leases without a reported state are assumed bound.
    pub fn is_bound(&self) -> bool {
        self.binding_state.as_deref().is_none_or(|state| {
            !RELEASED_STATES
                .iter()
                .any(|released| state.eq_ignore_ascii_case(released))
        })
    }
}

/// A DHCP reservation binding an address to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedAddressRecord {
    pub ip: IpAddr,
    /// MAC address (IPv4) or DUID (IPv6).
    pub mac: Option<String>,
    pub hostname: Option<String>,
    pub binding_state: Option<String>,
    pub comment: Option<String>,
    pub extensible_attributes: IndexMap<String, String>,
}

impl FixedAddressRecord {
    pub fn new(ip: IpAddr) -> Self {
        Self {
            ip,
            mac: None,
            hostname: None,
            binding_state: None,
            comment: None,
            extensible_attributes: IndexMap::new(),
        }
    }
}

/// An inclusive range of addresses handed out by DHCP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DhcpRange {
    pub start: IpAddr,
    pub end: IpAddr,
}

impl DhcpRange {
    pub fn contains(&self, ip: &IpAddr) -> bool {
        if self.start.is_ipv4() != ip.is_ipv4() {
            return false;
        }
        let value = addr_value(ip);
        addr_value(&self.start) <= value && value <= addr_value(&self.end)
    }

    /// Number of addresses in the range. A reversed range is empty.
    pub fn size(&self) -> u128 {
        let (start, end) = (addr_value(&self.start), addr_value(&self.end));
        if end < start {
            return 0;
        }
        (end - start).saturating_add(1)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn lease(state: Option<&str>) -> LeaseRecord {
        LeaseRecord {
            binding_state: state.map(str::to_owned),
            ..LeaseRecord::new("10.0.0.5".parse().unwrap())
        }
    }

    #[test]
    fn lease_binding_states() {
        assert!(lease(Some("ACTIVE")).is_bound());
        assert!(lease(Some("static")).is_bound());
        assert!(lease(None).is_bound());
        assert!(!lease(Some("FREE")).is_bound());
        assert!(!lease(Some("expired")).is_bound());
    }

    #[test]
    fn range_size_and_membership() {
        let range = DhcpRange {
            start: "10.0.0.100".parse().unwrap(),
            end: "10.0.0.199".parse().unwrap(),
        };
        assert_eq!(range.size(), 100);
        assert!(range.contains(&"10.0.0.100".parse().unwrap()));
        assert!(range.contains(&"10.0.0.199".parse().unwrap()));
        assert!(!range.contains(&"10.0.0.200".parse().unwrap()));
        assert!(!range.contains(&"::ffff:10.0.0.150".parse().unwrap()));
    }

    #[test]
    fn reversed_range_is_empty() {
        let range = DhcpRange {
            start: "10.0.0.9".parse().unwrap(),
            end: "10.0.0.1".parse().unwrap(),
        };
        assert_eq!(range.size(), 0);
    }
}

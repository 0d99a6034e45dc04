// ── Reports ──
//
// The structured results of the two lookup workflows. A report is built
// fresh for each query and never mutated after it is returned. Fields fed
// by a secondary lookup are `Field<T>`: when that lookup fails the field is
// `Unknown` and the report's `warnings` say why.

use std::fmt;
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use ipnet::IpNet;
use serde::{Serialize, Serializer};
use strum::Display;

use crate::model::{
    AddressStatus, DhcpRange, DnsRecord, FixedAddressRecord, HostRecord, LeaseRecord, ObjectRef,
};
use crate::stats;

// ── Field ────────────────────────────────────────────────────────────

/// A report value that may have been lost to a failed lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    Known(T),
    Unknown,
}

impl<T> Field<T> {
    pub fn known(&self) -> Option<&T> {
        match self {
            Self::Known(v) => Some(v),
            Self::Unknown => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    pub fn as_ref(&self) -> Field<&T> {
        match self {
            Self::Known(v) => Field::Known(v),
            Self::Unknown => Field::Unknown,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Field<U> {
        match self {
            Self::Known(v) => Field::Known(f(v)),
            Self::Unknown => Field::Unknown,
        }
    }
}

impl<T> Field<Option<T>> {
    /// The inner value when the lookup succeeded and found something.
    pub fn found(&self) -> Option<&T> {
        match self {
            Self::Known(Some(v)) => Some(v),
            _ => None,
        }
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Unknown, Self::Known)
    }
}

/// `Unknown` serializes as the string `"unknown"`.
impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Known(v) => v.serialize(serializer),
            Self::Unknown => serializer.serialize_str("unknown"),
        }
    }
}

/// A degraded field and the failure that caused it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub field: String,
    pub message: String,
}

impl Warning {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

// ── Network report ───────────────────────────────────────────────────

/// Address usage of a network.
///
/// `total` is always known. When `used` is known, `used + free == total`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UtilizationStats {
    pub total: u128,
    pub used: Field<u128>,
    pub free: Field<u128>,
    pub percent_used: Field<f64>,
}

impl UtilizationStats {
    /// Stats for `used` bound addresses out of `total`; `used` is clamped.
    pub fn new(total: u128, used: u128) -> Self {
        let used = used.min(total);
        Self {
            total,
            used: Field::Known(used),
            free: Field::Known(total - used),
            percent_used: Field::Known(stats::percent(used, total)),
        }
    }

    pub fn unknown(total: u128) -> Self {
        Self {
            total,
            used: Field::Unknown,
            free: Field::Unknown,
            percent_used: Field::Unknown,
        }
    }
}

/// Where a network sits in the container hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ContainerInfo {
    TopLevel,
    Resolved {
        network: IpNet,
        comment: Option<String>,
    },
    /// The network names a container that could not be read.
    Unresolved { reference: ObjectRef },
}

impl fmt::Display for ContainerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TopLevel => f.write_str("none (top-level network)"),
            Self::Resolved {
                network,
                comment: Some(comment),
            } if !comment.is_empty() => write!(f, "{network} ({comment})"),
            Self::Resolved { network, .. } => write!(f, "{network}"),
            Self::Unresolved { reference } => write!(f, "unresolved ({reference})"),
        }
    }
}

/// Default gateway(s) of a network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatewayAddresses {
    pub addresses: Vec<IpAddr>,
    /// No routers option was set; the first usable host is assumed.
    pub inferred: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DhcpSummary {
    pub enabled: bool,
    pub members: Vec<String>,
    pub ranges: Field<Vec<DhcpRange>>,
    /// Unbound addresses inside the ranges.
    pub free: Field<u128>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DnsZones {
    pub forward: Option<String>,
    pub reverse: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Modification {
    pub last_modified: Option<DateTime<Utc>>,
    pub last_modified_by: Option<String>,
}

/// Everything known about one network.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkReport {
    pub network: IpNet,
    pub reference: Option<ObjectRef>,
    pub network_view: Option<String>,
    pub container: ContainerInfo,
    pub comment: Option<String>,
    /// Sorted by name, case-insensitively. Empty when the network has none.
    pub extensible_attributes: IndexMap<String, String>,
    pub utilization: UtilizationStats,
    pub network_address: IpAddr,
    pub broadcast_address: Option<IpAddr>,
    pub gateways: GatewayAddresses,
    pub dhcp: DhcpSummary,
    pub dns: DnsZones,
    pub modification: Modification,
    pub warnings: Vec<Warning>,
}

// ── IP report ────────────────────────────────────────────────────────

/// How an address is handed out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AllocationType {
    FixedAddress,
    Lease { binding_state: Option<String> },
    /// Owned by a host record. `name` is unset when only the IPAM status
    /// reports one.
    HostRecord { name: Option<String> },
    /// Bound by something other than DHCP or a host record (A record, ...).
    Other { types: Vec<String> },
    NotAllocated,
}

impl fmt::Display for AllocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FixedAddress => f.write_str("Fixed address (DHCP reservation)"),
            Self::Lease {
                binding_state: Some(state),
            } => write!(f, "DHCP lease ({state})"),
            Self::Lease { binding_state: None } => f.write_str("DHCP lease"),
            Self::HostRecord { name: Some(name) } => write!(f, "Host record ({name})"),
            Self::HostRecord { name: None } => f.write_str("Host record"),
            Self::Other { types } if types.is_empty() => f.write_str("In use"),
            Self::Other { types } => write!(f, "In use ({})", types.join(", ")),
            Self::NotAllocated => f.write_str("Not allocated"),
        }
    }
}

/// Whether the forward and reverse records agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Consistency {
    Matches,
    Mismatch,
    Incomplete,
}

/// Summary of the most specific network containing an address.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParentNetwork {
    pub network: IpNet,
    pub comment: Option<String>,
    pub container: ContainerInfo,
    pub gateways: GatewayAddresses,
    pub dhcp_enabled: bool,
}

/// Everything known about one address.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IpReport {
    pub ip: IpAddr,
    pub status: AddressStatus,
    pub allocation: AllocationType,
    pub fixed_address: Field<Option<FixedAddressRecord>>,
    pub lease: Field<Option<LeaseRecord>>,
    pub forward: Field<Option<DnsRecord>>,
    pub reverse: Field<Option<DnsRecord>>,
    pub host_record: Field<Option<HostRecord>>,
    pub consistency: Consistency,
    pub network: Field<Option<ParentNetwork>>,
    pub warnings: Vec<Warning>,
}

impl IpReport {
    /// MAC from the reservation, else from the lease.
    pub fn mac(&self) -> Option<&str> {
        self.fixed_address
            .found()
            .and_then(|fa| fa.mac.as_deref())
            .or_else(|| self.lease.found().and_then(|l| l.mac.as_deref()))
    }

    /// Hostname from the reservation, else the lease, else the host
    /// record, else the A record.
    pub fn hostname(&self) -> Option<&str> {
        self.fixed_address
            .found()
            .and_then(|fa| fa.hostname.as_deref())
            .or_else(|| self.lease.found().and_then(|l| l.hostname.as_deref()))
            .or_else(|| self.host_record.found().map(|h| h.name.as_str()))
            .or_else(|| self.forward.found().map(|r| r.hostname.as_str()))
    }

    /// Extensible attributes from the reservation, else the host record.
    pub fn extensible_attributes(&self) -> Option<&IndexMap<String, String>> {
        self.fixed_address
            .found()
            .map(|fa| &fa.extensible_attributes)
            .filter(|attrs| !attrs.is_empty())
            .or_else(|| {
                self.host_record
                    .found()
                    .map(|h| &h.extensible_attributes)
                    .filter(|attrs| !attrs.is_empty())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn utilization_invariant_holds() {
        for (total, used) in [(254u128, 142u128), (254, 0), (254, 254), (0, 0), (2, 7)] {
            let stats = UtilizationStats::new(total, used);
            let (Field::Known(u), Field::Known(f)) = (&stats.used, &stats.free) else {
                panic!("expected known counts");
            };
            assert_eq!(u + f, total);
            assert!(*u <= total);
        }
    }

    #[test]
    fn unknown_field_serializes_as_unknown() {
        let stats = UtilizationStats::unknown(254);
        let json = serde_json::to_value(&stats).unwrap_or_default();
        assert_eq!(json["total"], 254);
        assert_eq!(json["used"], "unknown");
        assert_eq!(json["free"], "unknown");
    }

    #[test]
    fn container_display() {
        assert_eq!(ContainerInfo::TopLevel.to_string(), "none (top-level network)");
        let resolved = ContainerInfo::Resolved {
            network: "10.0.0.0/8".parse().unwrap_or_else(|_| unreachable!()),
            comment: Some("Corporate".into()),
        };
        assert_eq!(resolved.to_string(), "10.0.0.0/8 (Corporate)");
        let dangling = ContainerInfo::Unresolved {
            reference: ObjectRef::new("10.9.0.0/16"),
        };
        assert_eq!(dangling.to_string(), "unresolved (10.9.0.0/16)");
    }

    #[test]
    fn consistency_display_is_lowercase() {
        assert_eq!(Consistency::Matches.to_string(), "matches");
        assert_eq!(Consistency::Mismatch.to_string(), "mismatch");
        assert_eq!(Consistency::Incomplete.to_string(), "incomplete");
    }
}

// ── WAPI-to-domain type conversions ──
//
// Bridges raw `ddiq_api` objects into `ddiq_core::model` types. Address and
// CIDR strings are parsed into strong types here; a record whose key field
// does not parse is rejected, optional fields that do not parse are dropped.

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use ipnet::IpNet;

use ddiq_api::wapi::models::{
    DhcpMember, ExtAttr, WapiAddress, WapiAddressRecord, WapiFixedAddress, WapiHostRecord,
    WapiLease, WapiNetwork, WapiNetworkContainer, WapiPtrRecord, WapiRange, ZoneAssociation,
};

use crate::gateway::GatewayError;
use crate::model::{
    AddressState, AddressStatus, DhcpRange, DnsRecord, DnsRecordKind, FixedAddressRecord,
    HostRecord, LeaseRecord, NetworkContainerRecord, NetworkRecord, ObjectRef,
};

// ── Helpers ────────────────────────────────────────────────────────

fn malformed(what: &str, raw: &str) -> GatewayError {
    GatewayError::Rejected {
        message: format!("malformed {what} '{raw}' in response"),
    }
}

fn parse_net(what: &str, raw: &str) -> Result<IpNet, GatewayError> {
    raw.parse().map_err(|_| malformed(what, raw))
}

fn parse_addr(what: &str, raw: &str) -> Result<IpAddr, GatewayError> {
    raw.parse().map_err(|_| malformed(what, raw))
}

/// Convert an optional epoch-seconds timestamp to `DateTime<Utc>`.
fn epoch_to_datetime(epoch: Option<i64>) -> Option<DateTime<Utc>> {
    epoch.and_then(|ts| DateTime::from_timestamp(ts, 0))
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty())
}

fn ext_attrs(raw: impl IntoIterator<Item = (String, ExtAttr)>) -> IndexMap<String, String> {
    raw.into_iter()
        .map(|(name, attr)| (name, attr.display_value()))
        .collect()
}

/// `network_container` is the parent CIDR, or `/` at the root of the view.
fn container_ref(raw: Option<String>) -> Option<ObjectRef> {
    raw.map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty() && s != "/")
        .map(ObjectRef::new)
}

fn member_name(member: &DhcpMember) -> Option<String> {
    member
        .name
        .clone()
        .or_else(|| member.ipv4addr.clone())
        .or_else(|| member.ipv6addr.clone())
}

/// Reverse zones are associated by CIDR (`10.1.0.0/24`) or by their
/// `in-addr.arpa` / `ip6.arpa` name.
fn is_reverse_zone(zone: &ZoneAssociation) -> bool {
    let fqdn = zone.fqdn.trim_end_matches('.').to_ascii_lowercase();
    fqdn.contains('/') || fqdn.ends_with(".in-addr.arpa") || fqdn.ends_with(".ip6.arpa")
}

fn pick_zone<'a>(zones: impl Iterator<Item = &'a ZoneAssociation>) -> Option<String> {
    let zones: Vec<&ZoneAssociation> = zones.collect();
    zones
        .iter()
        .find(|z| z.is_default == Some(true))
        .or_else(|| zones.first())
        .map(|z| z.fqdn.clone())
}

// ── IPAM ───────────────────────────────────────────────────────────

impl TryFrom<WapiNetwork> for NetworkRecord {
    type Error = GatewayError;

    fn try_from(raw: WapiNetwork) -> Result<Self, Self::Error> {
        let cidr = parse_net("network", &raw.network)?;

        let routers = raw
            .options
            .iter()
            .filter(|opt| opt.is_routers())
            .filter_map(|opt| opt.value.as_deref())
            .flat_map(|value| value.split(','))
            .filter_map(|addr| addr.trim().parse().ok())
            .collect();

        let forward_zone = pick_zone(raw.zone_associations.iter().filter(|z| !is_reverse_zone(z)));
        let reverse_zone = pick_zone(raw.zone_associations.iter().filter(|z| is_reverse_zone(z)));

        Ok(Self {
            reference: Some(ObjectRef::new(raw.reference)),
            cidr,
            network_view: raw.network_view,
            container: container_ref(raw.network_container),
            comment: non_empty(raw.comment),
            extensible_attributes: ext_attrs(raw.extattrs),
            dhcp_members: raw.members.iter().filter_map(member_name).collect(),
            routers,
            forward_zone,
            reverse_zone,
            // WAPI networks carry no modification metadata.
            last_modified: None,
            last_modified_by: None,
        })
    }
}

impl TryFrom<WapiNetworkContainer> for NetworkContainerRecord {
    type Error = GatewayError;

    fn try_from(raw: WapiNetworkContainer) -> Result<Self, Self::Error> {
        Ok(Self {
            cidr: parse_net("network container", &raw.network)?,
            reference: Some(ObjectRef::new(raw.reference)),
            comment: non_empty(raw.comment),
        })
    }
}

impl TryFrom<WapiRange> for DhcpRange {
    type Error = GatewayError;

    fn try_from(raw: WapiRange) -> Result<Self, Self::Error> {
        Ok(Self {
            start: parse_addr("range start", &raw.start_addr)?,
            end: parse_addr("range end", &raw.end_addr)?,
        })
    }
}

impl TryFrom<WapiAddress> for AddressStatus {
    type Error = GatewayError;

    fn try_from(raw: WapiAddress) -> Result<Self, Self::Error> {
        let state = raw
            .status
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(AddressState::Unknown);

        Ok(Self {
            ip: parse_addr("address", &raw.ip_address)?,
            state,
            types: raw.types,
            usage: raw.usage,
            names: raw.names,
            network: raw.network.as_deref().and_then(|n| n.parse().ok()),
        })
    }
}

// ── DHCP ───────────────────────────────────────────────────────────

impl TryFrom<WapiLease> for LeaseRecord {
    type Error = GatewayError;

    fn try_from(raw: WapiLease) -> Result<Self, Self::Error> {
        Ok(Self {
            ip: parse_addr("lease address", &raw.address)?,
            mac: non_empty(raw.hardware),
            hostname: non_empty(raw.client_hostname),
            binding_state: non_empty(raw.binding_state),
            ends: epoch_to_datetime(raw.ends),
        })
    }
}

impl TryFrom<WapiFixedAddress> for FixedAddressRecord {
    type Error = GatewayError;

    fn try_from(raw: WapiFixedAddress) -> Result<Self, Self::Error> {
        let ip = match raw.address() {
            Some(addr) => parse_addr("fixed address", addr)?,
            None => return Err(malformed("fixed address", "<missing>")),
        };

        Ok(Self {
            ip,
            mac: non_empty(raw.mac).or_else(|| non_empty(raw.duid)),
            hostname: non_empty(raw.name),
            // A reservation is bound for as long as it exists.
            binding_state: Some("STATIC".into()),
            comment: non_empty(raw.comment),
            extensible_attributes: ext_attrs(raw.extattrs),
        })
    }
}

// ── DNS ────────────────────────────────────────────────────────────

impl TryFrom<WapiAddressRecord> for DnsRecord {
    type Error = GatewayError;

    fn try_from(raw: WapiAddressRecord) -> Result<Self, Self::Error> {
        let (kind, addr) = match (&raw.ipv4addr, &raw.ipv6addr) {
            (Some(v4), _) => (DnsRecordKind::A, v4.as_str()),
            (None, Some(v6)) => (DnsRecordKind::Aaaa, v6.as_str()),
            (None, None) => return Err(malformed("A record address", "<missing>")),
        };

        Ok(Self {
            ip: parse_addr("A record address", addr)?,
            kind,
            hostname: raw.name,
            zone: non_empty(raw.zone),
            view: non_empty(raw.view),
            last_queried: epoch_to_datetime(raw.last_queried),
        })
    }
}

impl TryFrom<WapiPtrRecord> for DnsRecord {
    type Error = GatewayError;

    fn try_from(raw: WapiPtrRecord) -> Result<Self, Self::Error> {
        let ip = match raw.address() {
            Some(addr) => parse_addr("PTR record address", addr)?,
            None => return Err(malformed("PTR record address", "<missing>")),
        };

        Ok(Self {
            kind: DnsRecordKind::Ptr,
            ip,
            hostname: raw.ptrdname,
            zone: non_empty(raw.zone),
            view: non_empty(raw.view),
            last_queried: epoch_to_datetime(raw.last_queried),
        })
    }
}

impl TryFrom<WapiHostRecord> for HostRecord {
    type Error = GatewayError;

    fn try_from(raw: WapiHostRecord) -> Result<Self, Self::Error> {
        let addresses = raw
            .ipv4addrs
            .iter()
            .chain(&raw.ipv6addrs)
            .filter_map(|a| a.address())
            .map(|a| parse_addr("host record address", a))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: raw.name,
            addresses,
            comment: non_empty(raw.comment),
            view: non_empty(raw.view),
            extensible_attributes: ext_attrs(raw.extattrs),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn network(value: serde_json::Value) -> WapiNetwork {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn network_conversion_maps_routers_zones_and_members() {
        let raw = network(json!({
            "_ref": "network/ZG5z:10.1.0.0/24/default",
            "network": "10.1.0.0/24",
            "network_view": "default",
            "comment": "Branch LAN",
            "network_container": "10.0.0.0/8",
            "extattrs": { "VLAN": { "value": 110 }, "Site": { "value": "Branch" } },
            "options": [
                { "name": "domain-name", "num": 15, "value": "branch.example.com" },
                { "name": "routers", "num": 3, "value": "10.1.0.1, 10.1.0.2" }
            ],
            "members": [
                { "_struct": "dhcpmember", "name": "dhcp1.example.com" },
                { "_struct": "dhcpmember", "ipv4addr": "10.255.0.2" }
            ],
            "zone_associations": [
                { "fqdn": "10.1.0.0/24", "is_default": false },
                { "fqdn": "branch.example.com", "is_default": true }
            ]
        }));

        let record = NetworkRecord::try_from(raw).unwrap();

        assert_eq!(record.cidr.to_string(), "10.1.0.0/24");
        assert_eq!(record.container, Some(ObjectRef::new("10.0.0.0/8")));
        assert_eq!(record.comment.as_deref(), Some("Branch LAN"));
        assert_eq!(record.extensible_attributes["VLAN"], "110");
        assert_eq!(
            record.routers,
            vec!["10.1.0.1".parse::<IpAddr>().unwrap(), "10.1.0.2".parse().unwrap()]
        );
        assert_eq!(record.dhcp_members, vec!["dhcp1.example.com", "10.255.0.2"]);
        assert_eq!(record.forward_zone.as_deref(), Some("branch.example.com"));
        assert_eq!(record.reverse_zone.as_deref(), Some("10.1.0.0/24"));
        assert!(record.last_modified.is_none());
    }

    #[test]
    fn root_container_is_top_level() {
        let raw = network(json!({
            "_ref": "network/ZG5z:192.168.1.0/24/default",
            "network": "192.168.1.0/24",
            "network_container": "/"
        }));
        let record = NetworkRecord::try_from(raw).unwrap();
        assert_eq!(record.container, None);
        assert!(!record.dhcp_enabled());
    }

    #[test]
    fn malformed_network_is_rejected() {
        let raw = network(json!({ "_ref": "network/x", "network": "not-a-cidr" }));
        assert!(matches!(
            NetworkRecord::try_from(raw),
            Err(GatewayError::Rejected { .. })
        ));
    }

    #[test]
    fn address_status_parses_state_case_insensitively() {
        let raw: WapiAddress = serde_json::from_value(json!({
            "ip_address": "10.0.0.5",
            "status": "used",
            "types": ["A", "PTR"],
            "network": "10.0.0.0/24"
        }))
        .unwrap();
        let status = AddressStatus::try_from(raw).unwrap();
        assert_eq!(status.state, AddressState::Used);
        assert_eq!(status.network.unwrap().to_string(), "10.0.0.0/24");
    }

    #[test]
    fn ipv6_fixed_address_uses_duid() {
        let raw: WapiFixedAddress = serde_json::from_value(json!({
            "ipv6addr": "2001:db8::10",
            "duid": "00:01:00:01:2a:3b:4c:5d",
            "name": "printer6"
        }))
        .unwrap();
        let fixed = FixedAddressRecord::try_from(raw).unwrap();
        assert_eq!(fixed.mac.as_deref(), Some("00:01:00:01:2a:3b:4c:5d"));
        assert_eq!(fixed.hostname.as_deref(), Some("printer6"));
    }

    #[test]
    fn host_record_collects_both_families() {
        let raw: WapiHostRecord = serde_json::from_value(json!({
            "name": "dual.example.com",
            "ipv4addrs": [{ "ipv4addr": "10.0.0.7" }],
            "ipv6addrs": [{ "ipv6addr": "2001:db8::7" }],
            "comment": " ",
            "extattrs": { "Owner": { "value": "netops" } }
        }))
        .unwrap();
        let host = HostRecord::try_from(raw).unwrap();
        assert_eq!(
            host.addresses,
            vec!["10.0.0.7".parse::<IpAddr>().unwrap(), "2001:db8::7".parse().unwrap()]
        );
        assert_eq!(host.comment, None);
        assert_eq!(host.extensible_attributes["Owner"], "netops");
    }
}

// WAPI response types
//
// Models for the WAPI objects the lookups read. Searches are wrapped in the
// `WapiResult<T>` paging envelope; single-object reads in `WapiObject<T>`.
// Fields use `#[serde(default)]` liberally because WAPI omits fields that
// are unset on the object.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ── Envelopes ────────────────────────────────────────────────────────

/// Paged search envelope (`_return_as_object=1`):
/// ```json
/// { "result": [...], "next_page_id": "789c5590..." }
/// ```
#[derive(Debug, Deserialize)]
pub struct WapiResult<T> {
    pub result: Vec<T>,
    #[serde(default)]
    pub next_page_id: Option<String>,
}

/// Single-object envelope for reads by `_ref`.
#[derive(Debug, Deserialize)]
pub struct WapiObject<T> {
    pub result: T,
}

/// Error body WAPI returns with non-2xx statuses.
#[derive(Debug, Deserialize)]
pub struct WapiErrorBody {
    #[serde(default, rename = "Error")]
    pub error: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

// ── Shared structs ───────────────────────────────────────────────────

/// Extensible attribute value: `{"value": "HQ"}`.
///
/// Values may be strings, integers, or lists (multi-value attributes).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtAttr {
    pub value: serde_json::Value,
}

impl ExtAttr {
    /// Render the value as display text; list values are comma-joined.
    pub fn display_value(&self) -> String {
        fn scalar(v: &serde_json::Value) -> String {
            match v {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Null => String::new(),
                other => other.to_string(),
            }
        }

        match &self.value {
            serde_json::Value::Array(items) => {
                items.iter().map(scalar).collect::<Vec<_>>().join(", ")
            }
            other => scalar(other),
        }
    }
}

/// DHCP option on a network (`options` field).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DhcpOption {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub num: Option<u32>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub vendor_class: Option<String>,
    #[serde(default)]
    pub use_option: Option<bool>,
}

impl DhcpOption {
    /// Option 3, the default routers.
    pub fn is_routers(&self) -> bool {
        self.num == Some(3) || self.name.as_deref() == Some("routers")
    }
}

/// DHCP member serving a network (`members` field).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DhcpMember {
    #[serde(default, rename = "_struct")]
    pub kind: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub ipv4addr: Option<String>,
    #[serde(default)]
    pub ipv6addr: Option<String>,
}

/// DNS zone associated with a network (`zone_associations` field).
///
/// Reverse zones appear with their CIDR as `fqdn` (e.g. `10.1.0.0/24`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneAssociation {
    pub fqdn: String,
    #[serde(default)]
    pub is_default: Option<bool>,
    #[serde(default)]
    pub view: Option<String>,
}

// ── IPAM ─────────────────────────────────────────────────────────────

/// `network` / `ipv6network` object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WapiNetwork {
    #[serde(rename = "_ref")]
    pub reference: String,
    pub network: String,
    #[serde(default)]
    pub network_view: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub extattrs: BTreeMap<String, ExtAttr>,
    /// Parent container CIDR, `/` at the root of the network view.
    #[serde(default)]
    pub network_container: Option<String>,
    #[serde(default)]
    pub options: Vec<DhcpOption>,
    #[serde(default)]
    pub members: Vec<DhcpMember>,
    #[serde(default)]
    pub zone_associations: Vec<ZoneAssociation>,
    /// Catch-all for fields we don't model.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// `networkcontainer` / `ipv6networkcontainer` object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WapiNetworkContainer {
    #[serde(rename = "_ref")]
    pub reference: String,
    pub network: String,
    #[serde(default)]
    pub network_view: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// `range` / `ipv6range` object (a DHCP range).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WapiRange {
    #[serde(rename = "_ref")]
    pub reference: String,
    pub start_addr: String,
    pub end_addr: String,
    #[serde(default)]
    pub network: Option<String>,
}

/// `ipv4address` / `ipv6address` object: the IPAM view of one address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WapiAddress {
    #[serde(default, rename = "_ref")]
    pub reference: Option<String>,
    pub ip_address: String,
    /// `USED` or `UNUSED`.
    #[serde(default)]
    pub status: Option<String>,
    /// Object types bound to the address (`FA`, `LEASE`, `A`, `PTR`, `HOST`, ...).
    #[serde(default)]
    pub types: Vec<String>,
    /// Usage tags (`DHCP`, `DNS`).
    #[serde(default)]
    pub usage: Vec<String>,
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub objects: Vec<String>,
}

// ── DHCP ─────────────────────────────────────────────────────────────

/// `lease` object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WapiLease {
    #[serde(default, rename = "_ref")]
    pub reference: Option<String>,
    pub address: String,
    #[serde(default)]
    pub binding_state: Option<String>,
    #[serde(default)]
    pub client_hostname: Option<String>,
    /// Lease end, epoch seconds.
    #[serde(default)]
    pub ends: Option<i64>,
    #[serde(default)]
    pub hardware: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
}

/// `fixedaddress` / `ipv6fixedaddress` object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WapiFixedAddress {
    #[serde(default, rename = "_ref")]
    pub reference: Option<String>,
    #[serde(default)]
    pub ipv4addr: Option<String>,
    #[serde(default)]
    pub ipv6addr: Option<String>,
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default)]
    pub duid: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub extattrs: BTreeMap<String, ExtAttr>,
    #[serde(default)]
    pub network: Option<String>,
}

impl WapiFixedAddress {
    pub fn address(&self) -> Option<&str> {
        self.ipv4addr.as_deref().or(self.ipv6addr.as_deref())
    }
}

// ── DNS ──────────────────────────────────────────────────────────────

/// `record:a` / `record:aaaa` object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WapiAddressRecord {
    #[serde(default, rename = "_ref")]
    pub reference: Option<String>,
    pub name: String,
    #[serde(default)]
    pub ipv4addr: Option<String>,
    #[serde(default)]
    pub ipv6addr: Option<String>,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub view: Option<String>,
    /// Last time the record was queried, epoch seconds.
    #[serde(default)]
    pub last_queried: Option<i64>,
}

impl WapiAddressRecord {
    pub fn address(&self) -> Option<&str> {
        self.ipv4addr.as_deref().or(self.ipv6addr.as_deref())
    }
}

/// `record:ptr` object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WapiPtrRecord {
    #[serde(default, rename = "_ref")]
    pub reference: Option<String>,
    pub ptrdname: String,
    #[serde(default)]
    pub ipv4addr: Option<String>,
    #[serde(default)]
    pub ipv6addr: Option<String>,
    /// Reverse owner name, e.g. `5.0.0.10.in-addr.arpa`.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub view: Option<String>,
    #[serde(default)]
    pub last_queried: Option<i64>,
}

impl WapiPtrRecord {
    pub fn address(&self) -> Option<&str> {
        self.ipv4addr.as_deref().or(self.ipv6addr.as_deref())
    }
}

/// One address of a host record (`record:host_ipv4addr` / `record:host_ipv6addr`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WapiHostAddress {
    #[serde(default)]
    pub ipv4addr: Option<String>,
    #[serde(default)]
    pub ipv6addr: Option<String>,
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default)]
    pub configure_for_dhcp: Option<bool>,
}

impl WapiHostAddress {
    pub fn address(&self) -> Option<&str> {
        self.ipv4addr.as_deref().or(self.ipv6addr.as_deref())
    }
}

/// `record:host` object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WapiHostRecord {
    #[serde(default, rename = "_ref")]
    pub reference: Option<String>,
    pub name: String,
    #[serde(default)]
    pub ipv4addrs: Vec<WapiHostAddress>,
    #[serde(default)]
    pub ipv6addrs: Vec<WapiHostAddress>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub view: Option<String>,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub extattrs: BTreeMap<String, ExtAttr>,
}

// ── Network domain types ──

use std::fmt;
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use ipnet::IpNet;
use serde::{Deserialize, Serialize};

/// Opaque reference to an object held by the data source.
///
/// For WAPI this is the `_ref` string
/// (`networkcontainer/ZG5z...:10.0.0.0/8/default`), or the parent CIDR
/// WAPI reports in a network's `network_container` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectRef(String);

impl ObjectRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectRef {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A managed network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkRecord {
    pub reference: Option<ObjectRef>,
    pub cidr: IpNet,
    pub network_view: Option<String>,
    /// Parent container; `None` for a top-level network.
    pub container: Option<ObjectRef>,
    pub comment: Option<String>,
    /// Extensible attributes in the order the data source returned them.
    pub extensible_attributes: IndexMap<String, String>,
    /// DHCP members serving this network. Empty when DHCP is not served.
    pub dhcp_members: Vec<String>,
    /// Default routers (DHCP option 3).
    pub routers: Vec<IpAddr>,
    pub forward_zone: Option<String>,
    pub reverse_zone: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
    pub last_modified_by: Option<String>,
}

impl NetworkRecord {
    /// A bare record for `cidr` with every optional field empty.
    pub fn new(cidr: IpNet) -> Self {
        Self {
            reference: None,
            cidr,
            network_view: None,
            container: None,
            comment: None,
            extensible_attributes: IndexMap::new(),
            dhcp_members: Vec::new(),
            routers: Vec::new(),
            forward_zone: None,
            reverse_zone: None,
            last_modified: None,
            last_modified_by: None,
        }
    }

    pub fn dhcp_enabled(&self) -> bool {
        !self.dhcp_members.is_empty()
    }
}

/// A network container: the parent of one or more networks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkContainerRecord {
    pub reference: Option<ObjectRef>,
    pub cidr: IpNet,
    pub comment: Option<String>,
}

// ── DNS domain types ──

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum DnsRecordKind {
    A,
    Aaaa,
    Ptr,
}

/// A DNS record tying an address to a name, in either direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DnsRecord {
    pub kind: DnsRecordKind,
    pub ip: IpAddr,
    /// The A/AAAA owner name, or the PTR target.
    pub hostname: String,
    pub zone: Option<String>,
    pub view: Option<String>,
    pub last_queried: Option<DateTime<Utc>>,
}

impl DnsRecord {
    pub fn new(kind: DnsRecordKind, ip: IpAddr, hostname: impl Into<String>) -> Self {
        Self {
            kind,
            ip,
            hostname: hostname.into(),
            zone: None,
            view: None,
            last_queried: None,
        }
    }

    /// Hostname compared case-insensitively, with any trailing dot removed.
    pub fn normalized_hostname(&self) -> String {
        self.hostname.trim_end_matches('.').to_ascii_lowercase()
    }
}

/// A host record: one name owning one or more addresses, kept in IPAM and
/// DNS together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostRecord {
    pub name: String,
    pub addresses: Vec<IpAddr>,
    pub comment: Option<String>,
    pub view: Option<String>,
    pub extensible_attributes: IndexMap<String, String>,
}

impl HostRecord {
    pub fn new(name: impl Into<String>, addresses: Vec<IpAddr>) -> Self {
        Self {
            name: name.into(),
            addresses,
            comment: None,
            view: None,
            extensible_attributes: IndexMap::new(),
        }
    }
}

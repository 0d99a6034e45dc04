// ── Address status ──
//
// The data source's IPAM view of one address: whether it is in use and
// which kinds of objects bind it.

use std::net::IpAddr;

use ipnet::IpNet;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum AddressState {
    Used,
    Unused,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressStatus {
    pub ip: IpAddr,
    pub state: AddressState,
    /// Object types bound to the address (`FA`, `LEASE`, `A`, `PTR`, `HOST`, ...).
    pub types: Vec<String>,
    /// Usage tags (`DHCP`, `DNS`).
    pub usage: Vec<String>,
    pub names: Vec<String>,
    pub network: Option<IpNet>,
}

impl AddressStatus {
    pub fn new(ip: IpAddr, state: AddressState) -> Self {
        Self {
            ip,
            state,
            types: Vec::new(),
            usage: Vec::new(),
            names: Vec::new(),
            network: None,
        }
    }

    pub fn has_type(&self, kind: &str) -> bool {
        self.types.iter().any(|t| t.eq_ignore_ascii_case(kind))
    }
}

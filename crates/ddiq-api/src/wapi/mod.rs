// WAPI client modules
//
// Hand-written client for the handful of InfoBlox WAPI objects the
// network/IP lookups need. Every query is read-only and goes through the
// paged `{ "result": [...], "next_page_id": "..." }` envelope.

pub mod client;
pub mod dhcp;
pub mod dns;
pub mod ipam;
pub mod models;

use std::net::IpAddr;

pub use client::WapiClient;

/// Address family of a query.
///
/// WAPI splits most objects into IPv4 and IPv6 flavours with different
/// object names and address field names; this maps between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpFamily {
    V4,
    V6,
}

impl IpFamily {
    pub fn of(addr: &IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => Self::V4,
            IpAddr::V6(_) => Self::V6,
        }
    }

    pub fn network_object(self) -> &'static str {
        match self {
            Self::V4 => "network",
            Self::V6 => "ipv6network",
        }
    }

    pub fn container_object(self) -> &'static str {
        match self {
            Self::V4 => "networkcontainer",
            Self::V6 => "ipv6networkcontainer",
        }
    }

    pub fn range_object(self) -> &'static str {
        match self {
            Self::V4 => "range",
            Self::V6 => "ipv6range",
        }
    }

    pub fn address_object(self) -> &'static str {
        match self {
            Self::V4 => "ipv4address",
            Self::V6 => "ipv6address",
        }
    }

    pub fn fixed_address_object(self) -> &'static str {
        match self {
            Self::V4 => "fixedaddress",
            Self::V6 => "ipv6fixedaddress",
        }
    }

    pub fn forward_record_object(self) -> &'static str {
        match self {
            Self::V4 => "record:a",
            Self::V6 => "record:aaaa",
        }
    }

    /// Field name carrying the address on fixed addresses and DNS records.
    pub fn addr_field(self) -> &'static str {
        match self {
            Self::V4 => "ipv4addr",
            Self::V6 => "ipv6addr",
        }
    }
}

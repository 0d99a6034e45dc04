// ── Data-source gateway ──
//
// The read-only lookups the aggregator is built on. `WapiGateway` is the
// production implementation; `ConfirmingGateway` wraps any gateway and asks
// before each call goes out.

mod confirm;
mod convert;
mod wapi;

use std::fmt;
use std::future::Future;
use std::net::IpAddr;
use std::time::Duration;

use ipnet::IpNet;
use thiserror::Error;

use crate::model::{
    AddressStatus, DhcpRange, DnsRecord, FixedAddressRecord, HostRecord, LeaseRecord,
    NetworkContainerRecord, NetworkRecord, ObjectRef,
};

pub use confirm::{Confirm, ConfirmingGateway, Decision};
pub use wapi::WapiGateway;

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Why a single gateway call failed.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// `after` is zero when the transport gave up without saying how long
    /// it waited.
    #[error("timed out{}", waited(.after))]
    Timeout { after: Duration },

    #[error("authentication failed: {message}")]
    Authentication { message: String },

    /// Connection refused, TLS failure, 5xx: the data source is not answering.
    #[error("unreachable: {message}")]
    Unavailable { message: String },

    /// The data source answered but refused or garbled the query.
    #[error("query rejected: {message}")]
    Rejected { message: String },

    /// The operator declined the call at the confirmation prompt.
    #[error("declined at confirmation prompt: {call}")]
    Declined { call: String },
}

fn waited(after: &Duration) -> String {
    if after.is_zero() {
        String::new()
    } else {
        format!(" after {after:?}")
    }
}

impl GatewayError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Records from a collection lookup, plus how many came back too malformed
/// to convert.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch<T> {
    pub records: Vec<T>,
    pub skipped: usize,
}

impl<T> Batch<T> {
    pub fn new(records: Vec<T>, skipped: usize) -> Self {
        Self { records, skipped }
    }
}

impl<T> Default for Batch<T> {
    fn default() -> Self {
        Self::new(Vec::new(), 0)
    }
}

impl<T> From<Vec<T>> for Batch<T> {
    fn from(records: Vec<T>) -> Self {
        Self::new(records, 0)
    }
}

impl From<ddiq_api::Error> for GatewayError {
    fn from(err: ddiq_api::Error) -> Self {
        match err {
            ddiq_api::Error::Authentication { message } => Self::Authentication { message },
            ddiq_api::Error::Timeout { timeout_secs } => Self::Timeout {
                after: Duration::from_secs(timeout_secs),
            },
            ddiq_api::Error::Transport(ref e) if e.is_timeout() => Self::Timeout {
                after: Duration::ZERO,
            },
            ddiq_api::Error::Transport(e) => Self::Unavailable {
                message: e.to_string(),
            },
            ddiq_api::Error::Tls(message) => Self::Unavailable { message },
            ddiq_api::Error::Wapi {
                message, status, ..
            } if status >= 500 => Self::Unavailable {
                message: format!("HTTP {status}: {message}"),
            },
            ddiq_api::Error::Wapi { message, .. } => Self::Rejected { message },
            ddiq_api::Error::InvalidUrl(e) => Self::Rejected {
                message: e.to_string(),
            },
            ddiq_api::Error::Deserialization { message, .. } => Self::Rejected {
                message: format!("malformed response: {message}"),
            },
        }
    }
}

/// One gateway call and its argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    Network(IpNet),
    NetworkContainer(ObjectRef),
    Leases(IpNet),
    FixedAddresses(IpNet),
    DhcpRanges(IpNet),
    AddressStatus(IpAddr),
    FixedAddress(IpAddr),
    Lease(IpAddr),
    ForwardRecord(IpAddr),
    ReverseRecord(IpAddr),
    HostRecord(IpAddr),
    ParentNetwork(IpAddr),
}

impl GatewayCall {
    /// Name of the `Gateway` method this call maps to.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Network(_) => "lookup_network",
            Self::NetworkContainer(_) => "lookup_network_container",
            Self::Leases(_) => "lookup_leases",
            Self::FixedAddresses(_) => "lookup_fixed_addresses",
            Self::DhcpRanges(_) => "lookup_dhcp_ranges",
            Self::AddressStatus(_) => "lookup_address_status",
            Self::FixedAddress(_) => "lookup_fixed_address",
            Self::Lease(_) => "lookup_lease",
            Self::ForwardRecord(_) => "lookup_forward_record",
            Self::ReverseRecord(_) => "lookup_reverse_record",
            Self::HostRecord(_) => "lookup_host_record",
            Self::ParentNetwork(_) => "lookup_parent_network",
        }
    }

    /// Human description of what the call reads.
    pub fn describe(&self) -> String {
        match self {
            Self::Network(cidr) => format!("Read network {cidr}"),
            Self::NetworkContainer(r) => format!("Read network container {r}"),
            Self::Leases(cidr) => format!("List DHCP leases in {cidr}"),
            Self::FixedAddresses(cidr) => format!("List fixed addresses in {cidr}"),
            Self::DhcpRanges(cidr) => format!("List DHCP ranges in {cidr}"),
            Self::AddressStatus(ip) => format!("Read IPAM status of {ip}"),
            Self::FixedAddress(ip) => format!("Read fixed address for {ip}"),
            Self::Lease(ip) => format!("Read DHCP lease for {ip}"),
            Self::ForwardRecord(ip) => format!("Find forward DNS record for {ip}"),
            Self::ReverseRecord(ip) => format!("Find PTR record for {ip}"),
            Self::HostRecord(ip) => format!("Find host record for {ip}"),
            Self::ParentNetwork(ip) => format!("Find the most specific network containing {ip}"),
        }
    }

    fn argument(&self) -> String {
        match self {
            Self::Network(cidr)
            | Self::Leases(cidr)
            | Self::FixedAddresses(cidr)
            | Self::DhcpRanges(cidr) => cidr.to_string(),
            Self::NetworkContainer(r) => r.to_string(),
            Self::AddressStatus(ip)
            | Self::FixedAddress(ip)
            | Self::Lease(ip)
            | Self::ForwardRecord(ip)
            | Self::ReverseRecord(ip)
            | Self::HostRecord(ip)
            | Self::ParentNetwork(ip) => ip.to_string(),
        }
    }
}

impl fmt::Display for GatewayCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.operation(), self.argument())
    }
}

/// What a call will send, shown before it is confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallPreview {
    pub call: GatewayCall,
    pub method: &'static str,
    /// Object path relative to the data source root.
    pub path: String,
    pub params: Vec<(String, String)>,
    pub description: String,
}

impl CallPreview {
    /// Preview for gateways with no wire-level detail to offer.
    pub fn generic(call: &GatewayCall) -> Self {
        Self {
            method: "READ",
            path: call.operation().to_owned(),
            params: vec![("target".into(), call.argument())],
            description: call.describe(),
            call: call.clone(),
        }
    }

    /// `GET network?network=10.0.0.0/24` style request line.
    pub fn request_line(&self) -> String {
        if self.params.is_empty() {
            return format!("{} {}", self.method, self.path);
        }
        let query = self
            .params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        format!("{} {}?{query}", self.method, self.path)
    }
}

impl fmt::Display for CallPreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.request_line(), self.description)
    }
}

/// Read-only lookups over a DDI data source.
///
/// Collection lookups return every match, already folded across pages, in a
/// [`Batch`] that counts records dropped as malformed. Single-object lookups
/// return `None` when nothing matches; that is not an error.
///
/// Callers await [`Gateway::approve`] for a call before issuing it. Approval
/// may wait on an operator, so it is not part of the call's own deadline.
pub trait Gateway: Send + Sync {
    /// Clear `call` to go out. Gateways that never ask approve everything.
    fn approve(&self, _call: &GatewayCall) -> impl Future<Output = GatewayResult<()>> + Send {
        std::future::ready(Ok(()))
    }

    /// Networks whose CIDR is exactly `cidr`.
    fn lookup_network(
        &self,
        cidr: IpNet,
    ) -> impl Future<Output = GatewayResult<Vec<NetworkRecord>>> + Send;

    fn lookup_network_container(
        &self,
        reference: &ObjectRef,
    ) -> impl Future<Output = GatewayResult<Option<NetworkContainerRecord>>> + Send;

    fn lookup_leases(
        &self,
        scope: IpNet,
    ) -> impl Future<Output = GatewayResult<Batch<LeaseRecord>>> + Send;

    fn lookup_fixed_addresses(
        &self,
        scope: IpNet,
    ) -> impl Future<Output = GatewayResult<Batch<FixedAddressRecord>>> + Send;

    fn lookup_dhcp_ranges(
        &self,
        scope: IpNet,
    ) -> impl Future<Output = GatewayResult<Batch<DhcpRange>>> + Send;

    fn lookup_address_status(
        &self,
        ip: IpAddr,
    ) -> impl Future<Output = GatewayResult<Option<AddressStatus>>> + Send;

    fn lookup_fixed_address(
        &self,
        ip: IpAddr,
    ) -> impl Future<Output = GatewayResult<Option<FixedAddressRecord>>> + Send;

    /// The current lease for `ip`. When several exist, a bound one wins.
    fn lookup_lease(
        &self,
        ip: IpAddr,
    ) -> impl Future<Output = GatewayResult<Option<LeaseRecord>>> + Send;

    fn lookup_forward_record(
        &self,
        ip: IpAddr,
    ) -> impl Future<Output = GatewayResult<Option<DnsRecord>>> + Send;

    fn lookup_reverse_record(
        &self,
        ip: IpAddr,
    ) -> impl Future<Output = GatewayResult<Option<DnsRecord>>> + Send;

    fn lookup_host_record(
        &self,
        ip: IpAddr,
    ) -> impl Future<Output = GatewayResult<Option<HostRecord>>> + Send;

    /// Longest-prefix match: the most specific network containing `ip`.
    fn lookup_parent_network(
        &self,
        ip: IpAddr,
    ) -> impl Future<Output = GatewayResult<Option<NetworkRecord>>> + Send;

    /// Describe what `call` would send.
    fn preview(&self, call: &GatewayCall) -> CallPreview {
        CallPreview::generic(call)
    }
}

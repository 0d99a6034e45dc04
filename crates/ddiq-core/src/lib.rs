// ddiq-core: Network / IP lookup aggregation over a DDI data source.

pub mod aggregator;
pub mod config;
pub mod error;
pub mod gateway;
pub mod identifier;
pub mod model;
pub mod report;
pub mod stats;

#[cfg(test)]
mod testing;

// ── Primary re-exports ──────────────────────────────────────────────
pub use aggregator::{Aggregator, DEFAULT_CALL_TIMEOUT};
pub use config::{GatewayConfig, TlsVerification};
pub use error::CoreError;
pub use gateway::{
    Batch, CallPreview, Confirm, ConfirmingGateway, Decision, Gateway, GatewayCall, GatewayError,
    GatewayResult, WapiGateway,
};
pub use identifier::{parse_cidr, parse_ip};
pub use report::{
    AllocationType, Consistency, ContainerInfo, DhcpSummary, DnsZones, Field, GatewayAddresses,
    IpReport, Modification, NetworkReport, ParentNetwork, UtilizationStats, Warning,
};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    AddressState, AddressStatus, DhcpRange, DnsRecord, DnsRecordKind, FixedAddressRecord,
    HostRecord, LeaseRecord, NetworkContainerRecord, NetworkRecord, ObjectRef,
};

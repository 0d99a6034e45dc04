// ── Domain model ──
//
// Read-only views of the records a DDI data source hands back. Gateways
// produce these; the aggregator reads them and builds reports. Nothing in
// here knows about WAPI field names.

pub mod address;
pub mod dhcp;
pub mod dns;
pub mod network;

// ── Re-exports ──────────────────────────────────────────────────────

pub use address::{AddressState, AddressStatus};
pub use dhcp::{DhcpRange, FixedAddressRecord, LeaseRecord};
pub use dns::{DnsRecord, DnsRecordKind, HostRecord};
pub use network::{NetworkContainerRecord, NetworkRecord, ObjectRef};

// ── find_ip ──

use tracing::info;

use crate::aggregator::{Aggregator, Warnings, gateway_addresses, unavailable};
use crate::error::CoreError;
use crate::gateway::{Gateway, GatewayCall};
use crate::identifier::parse_ip;
use crate::model::{
    AddressState, AddressStatus, DnsRecord, FixedAddressRecord, HostRecord, LeaseRecord,
};
use crate::report::{AllocationType, Consistency, Field, IpReport, ParentNetwork};

/// Forward/reverse agreement: same address, same name (case and trailing
/// dot ignored). Anything missing or degraded is incomplete.
fn consistency(forward: &Field<Option<DnsRecord>>, reverse: &Field<Option<DnsRecord>>) -> Consistency {
    match (forward.found(), reverse.found()) {
        (Some(a), Some(ptr)) => {
            if a.ip == ptr.ip && a.normalized_hostname() == ptr.normalized_hostname() {
                Consistency::Matches
            } else {
                Consistency::Mismatch
            }
        }
        _ => Consistency::Incomplete,
    }
}

/// Fixed address wins over lease, lease over host record, host record over
/// whatever else the IPAM status lists.
fn allocation(
    status: &AddressStatus,
    fixed: &Field<Option<FixedAddressRecord>>,
    lease: &Field<Option<LeaseRecord>>,
    host: &Field<Option<HostRecord>>,
) -> AllocationType {
    if fixed.found().is_some() || status.has_type("FA") || status.has_type("RESERVATION") {
        return AllocationType::FixedAddress;
    }
    if let Some(lease) = lease.found().filter(|l| l.is_bound()) {
        return AllocationType::Lease {
            binding_state: lease.binding_state.clone(),
        };
    }
    if let Some(host) = host.found() {
        return AllocationType::HostRecord {
            name: Some(host.name.clone()),
        };
    }
    if status.has_type("LEASE") {
        return AllocationType::Lease {
            binding_state: None,
        };
    }
    if status.has_type("HOST") {
        return AllocationType::HostRecord { name: None };
    }
    if !status.types.is_empty() || status.state == AddressState::Used {
        return AllocationType::Other {
            types: status.types.clone(),
        };
    }
    AllocationType::NotAllocated
}

impl<G: Gateway> Aggregator<G> {
    /// Build the report for a single address.
    ///
    /// Fails only when the address does not parse, has no IPAM status, or
    /// the status lookup itself fails. Every other lookup degrades.
    pub async fn find_ip(&self, identifier: &str) -> Result<IpReport, CoreError> {
        let ip = parse_ip(identifier)?;
        info!(%ip, "looking up address");

        let (status, fixed, lease, forward, reverse, host, parent) = tokio::join!(
            self.call(
                GatewayCall::AddressStatus(ip),
                self.gateway.lookup_address_status(ip),
            ),
            self.call(
                GatewayCall::FixedAddress(ip),
                self.gateway.lookup_fixed_address(ip),
            ),
            self.call(GatewayCall::Lease(ip), self.gateway.lookup_lease(ip)),
            self.call(
                GatewayCall::ForwardRecord(ip),
                self.gateway.lookup_forward_record(ip),
            ),
            self.call(
                GatewayCall::ReverseRecord(ip),
                self.gateway.lookup_reverse_record(ip),
            ),
            self.call(GatewayCall::HostRecord(ip), self.gateway.lookup_host_record(ip)),
            self.call(
                GatewayCall::ParentNetwork(ip),
                self.gateway.lookup_parent_network(ip),
            ),
        );

        let status = status
            .map_err(unavailable("address status lookup"))?
            .ok_or_else(|| CoreError::NotFound {
                entity: "IP address".into(),
                identifier: ip.to_string(),
            })?;

        let mut warnings = Warnings::default();
        let fixed = warnings.settle("fixed_address", "fixed address", fixed);
        let lease = warnings.settle("lease", "lease", lease);
        let forward = warnings.settle("forward_record", "forward DNS", forward);
        let reverse = warnings.settle("reverse_record", "reverse DNS", reverse);
        let host = warnings.settle("host_record", "host record", host);
        let parent = warnings.settle("network", "parent network", parent);

        let network = match parent {
            Field::Known(Some(record)) => {
                let container = self
                    .resolve_container(record.container.as_ref(), &mut warnings)
                    .await;
                Field::Known(Some(ParentNetwork {
                    network: record.cidr,
                    gateways: gateway_addresses(&record),
                    dhcp_enabled: record.dhcp_enabled(),
                    comment: record.comment,
                    container,
                }))
            }
            Field::Known(None) => Field::Known(None),
            Field::Unknown => Field::Unknown,
        };

        let report = IpReport {
            ip,
            allocation: allocation(&status, &fixed, &lease, &host),
            consistency: consistency(&forward, &reverse),
            status,
            fixed_address: fixed,
            lease,
            forward,
            reverse,
            host_record: host,
            network,
            warnings: warnings.into_vec(),
        };

        info!(
            %ip,
            allocation = %report.allocation,
            consistency = %report.consistency,
            warnings = report.warnings.len(),
            "address report assembled"
        );
        Ok(report)
    }
}

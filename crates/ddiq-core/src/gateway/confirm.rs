// ── Call confirmation ──
//
// `ConfirmingGateway` puts a yes/no decision in front of every call of the
// gateway it wraps. The decision maker is passed in as a `Confirm`
// capability, so nothing global changes when confirmation is on.

use std::net::IpAddr;
use std::sync::Arc;

use ipnet::IpNet;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::gateway::{Batch, CallPreview, Gateway, GatewayCall, GatewayError, GatewayResult};
use crate::model::{
    AddressStatus, DhcpRange, DnsRecord, FixedAddressRecord, HostRecord, LeaseRecord,
    NetworkContainerRecord, NetworkRecord, ObjectRef,
};

/// Outcome of a confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Deny,
}

/// Decides whether a previewed call may go out.
///
/// May block (terminal prompts). `ConfirmingGateway` runs it on the
/// blocking pool, one prompt at a time.
pub trait Confirm: Send + Sync {
    fn confirm(&self, preview: &CallPreview) -> Decision;
}

impl<F> Confirm for F
where
    F: Fn(&CallPreview) -> Decision + Send + Sync,
{
    fn confirm(&self, preview: &CallPreview) -> Decision {
        self(preview)
    }
}

/// Gateway decorator that asks before each call.
///
/// The question is asked in [`Gateway::approve`]; lookups themselves go
/// straight to the inner gateway. `Aggregator` approves every call before
/// starting its deadline, so time spent at the prompt is not charged to
/// the lookup.
pub struct ConfirmingGateway<G, C> {
    inner: G,
    confirm: Arc<C>,
    prompt: Mutex<()>,
}

impl<G: Gateway, C: Confirm + 'static> ConfirmingGateway<G, C> {
    pub fn new(inner: G, confirm: C) -> Self {
        Self {
            inner,
            confirm: Arc::new(confirm),
            prompt: Mutex::new(()),
        }
    }

    pub fn inner(&self) -> &G {
        &self.inner
    }
}

impl<G: Gateway, C: Confirm + 'static> Gateway for ConfirmingGateway<G, C> {
    async fn approve(&self, call: &GatewayCall) -> GatewayResult<()> {
        self.inner.approve(call).await?;

        let preview = self.inner.preview(call);
        let decision = {
            let _turn = self.prompt.lock().await;
            let confirm = Arc::clone(&self.confirm);
            tokio::task::spawn_blocking(move || confirm.confirm(&preview))
                .await
                .unwrap_or_else(|e| {
                    warn!(%call, error = %e, "confirmation prompt failed, declining");
                    Decision::Deny
                })
        };

        match decision {
            Decision::Approve => {
                debug!(%call, "call approved");
                Ok(())
            }
            Decision::Deny => {
                info!(%call, "call declined");
                Err(GatewayError::Declined {
                    call: call.to_string(),
                })
            }
        }
    }

    async fn lookup_network(&self, cidr: IpNet) -> GatewayResult<Vec<NetworkRecord>> {
        self.inner.lookup_network(cidr).await
    }

    async fn lookup_network_container(
        &self,
        reference: &ObjectRef,
    ) -> GatewayResult<Option<NetworkContainerRecord>> {
        self.inner.lookup_network_container(reference).await
    }

    async fn lookup_leases(&self, scope: IpNet) -> GatewayResult<Batch<LeaseRecord>> {
        self.inner.lookup_leases(scope).await
    }

    async fn lookup_fixed_addresses(
        &self,
        scope: IpNet,
    ) -> GatewayResult<Batch<FixedAddressRecord>> {
        self.inner.lookup_fixed_addresses(scope).await
    }

    async fn lookup_dhcp_ranges(&self, scope: IpNet) -> GatewayResult<Batch<DhcpRange>> {
        self.inner.lookup_dhcp_ranges(scope).await
    }

    async fn lookup_address_status(&self, ip: IpAddr) -> GatewayResult<Option<AddressStatus>> {
        self.inner.lookup_address_status(ip).await
    }

    async fn lookup_fixed_address(&self, ip: IpAddr) -> GatewayResult<Option<FixedAddressRecord>> {
        self.inner.lookup_fixed_address(ip).await
    }

    async fn lookup_lease(&self, ip: IpAddr) -> GatewayResult<Option<LeaseRecord>> {
        self.inner.lookup_lease(ip).await
    }

    async fn lookup_forward_record(&self, ip: IpAddr) -> GatewayResult<Option<DnsRecord>> {
        self.inner.lookup_forward_record(ip).await
    }

    async fn lookup_reverse_record(&self, ip: IpAddr) -> GatewayResult<Option<DnsRecord>> {
        self.inner.lookup_reverse_record(ip).await
    }

    async fn lookup_host_record(&self, ip: IpAddr) -> GatewayResult<Option<HostRecord>> {
        self.inner.lookup_host_record(ip).await
    }

    async fn lookup_parent_network(&self, ip: IpAddr) -> GatewayResult<Option<NetworkRecord>> {
        self.inner.lookup_parent_network(ip).await
    }

    fn preview(&self, call: &GatewayCall) -> CallPreview {
        self.inner.preview(call)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex, PoisonError};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::aggregator::Aggregator;
    use crate::error::CoreError;
    use crate::model::NetworkRecord;
    use crate::testing::FakeGateway;

    fn gateway() -> FakeGateway {
        FakeGateway {
            networks: vec![NetworkRecord::new("10.1.0.0/24".parse().unwrap())],
            ..FakeGateway::default()
        }
    }

    /// Approves everything except `deny`, recording what it was asked.
    fn recorder(
        deny: &'static str,
    ) -> (Arc<Mutex<Vec<String>>>, impl Fn(&CallPreview) -> Decision + Send + Sync) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        let confirm = move |preview: &CallPreview| {
            log.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(preview.call.operation().to_owned());
            if preview.call.operation() == deny {
                Decision::Deny
            } else {
                Decision::Approve
            }
        };
        (seen, confirm)
    }

    #[tokio::test]
    async fn every_call_is_previewed() {
        let (seen, confirm) = recorder("none");
        let aggregator = Aggregator::new(ConfirmingGateway::new(gateway(), confirm));

        aggregator.find_network("10.1.0.0/24").await.unwrap();

        let mut seen = seen.lock().unwrap().clone();
        assert_eq!(seen.first().map(String::as_str), Some("lookup_network"));
        seen.sort();
        assert_eq!(
            seen,
            vec![
                "lookup_dhcp_ranges",
                "lookup_fixed_addresses",
                "lookup_leases",
                "lookup_network",
            ]
        );
    }

    #[tokio::test]
    async fn denied_secondary_call_degrades() {
        let (_, confirm) = recorder("lookup_leases");
        let aggregator = Aggregator::new(ConfirmingGateway::new(gateway(), confirm));

        let report = aggregator.find_network("10.1.0.0/24").await.unwrap();

        assert!(report.utilization.used.is_unknown());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].message.contains("declined"));
        assert_eq!(aggregator.gateway().inner().call_count("lookup_leases"), 0);
    }

    #[tokio::test]
    async fn denied_mandatory_call_is_fatal() {
        let (_, confirm) = recorder("lookup_network");
        let aggregator = Aggregator::new(ConfirmingGateway::new(gateway(), confirm));

        let err = aggregator.find_network("10.1.0.0/24").await.unwrap_err();

        assert!(matches!(
            err.gateway_error(),
            Some(GatewayError::Declined { .. })
        ));
        assert!(matches!(err, CoreError::GatewayUnavailable { .. }));
        assert!(aggregator.gateway().inner().calls().is_empty());
    }

    #[tokio::test]
    async fn slow_approval_does_not_count_against_call_timeout() {
        let confirm = |preview: &CallPreview| {
            if preview.call.operation() == "lookup_network" {
                std::thread::sleep(std::time::Duration::from_millis(400));
            }
            Decision::Approve
        };
        let aggregator = Aggregator::new(ConfirmingGateway::new(gateway(), confirm))
            .with_call_timeout(std::time::Duration::from_millis(300));

        let report = aggregator.find_network("10.1.0.0/24").await.unwrap();

        assert_eq!(report.network.to_string(), "10.1.0.0/24");
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    }
}

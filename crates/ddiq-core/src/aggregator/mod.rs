// ── Aggregator ──
//
// Runs the fixed call graph behind each lookup: one mandatory gateway call,
// a concurrent fan-out of secondary calls, dependent reads, then pure
// computation into a report. Only the mandatory call can fail the lookup;
// a failed secondary call degrades its field and leaves a warning.

mod ip;
mod network;

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::CoreError;
use crate::gateway::{Batch, Gateway, GatewayCall, GatewayError, GatewayResult};
use crate::model::{NetworkRecord, ObjectRef};
use crate::report::{ContainerInfo, Field, GatewayAddresses, Warning};
use crate::stats;

/// Per-call timeout applied when none is configured.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds network and IP reports from a [`Gateway`].
///
/// Holds no mutable state; one aggregator can serve any number of
/// concurrent lookups. Dropping a lookup future cancels its outstanding
/// gateway calls.
pub struct Aggregator<G> {
    gateway: G,
    call_timeout: Duration,
}

impl<G: Gateway> Aggregator<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Bound every individual gateway call by `timeout`.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// Get `call` approved, then run `fut` under the per-call deadline.
    ///
    /// `fut` must be the lookup `call` names; it is not polled until the
    /// call is approved.
    async fn call<T>(
        &self,
        call: GatewayCall,
        fut: impl Future<Output = GatewayResult<T>>,
    ) -> GatewayResult<T> {
        self.gateway.approve(&call).await?;
        tokio::time::timeout(self.call_timeout, fut)
            .await
            .unwrap_or_else(|_| {
                Err(GatewayError::Timeout {
                    after: self.call_timeout,
                })
            })
    }

    /// Resolve a network's container reference.
    ///
    /// No reference means a top-level network and no gateway call at all.
    async fn resolve_container(
        &self,
        reference: Option<&ObjectRef>,
        warnings: &mut Warnings,
    ) -> ContainerInfo {
        let Some(reference) = reference else {
            return ContainerInfo::TopLevel;
        };

        match self
            .call(
                GatewayCall::NetworkContainer(reference.clone()),
                self.gateway.lookup_network_container(reference),
            )
            .await
        {
            Ok(Some(container)) => ContainerInfo::Resolved {
                network: container.cidr,
                comment: container.comment,
            },
            Ok(None) => {
                warnings.push(
                    "container",
                    format!("container {reference} does not exist"),
                );
                ContainerInfo::Unresolved {
                    reference: reference.clone(),
                }
            }
            Err(e) => {
                warnings.push("container", format!("container lookup failed: {e}"));
                ContainerInfo::Unresolved {
                    reference: reference.clone(),
                }
            }
        }
    }
}

fn unavailable(operation: &str) -> impl FnOnce(GatewayError) -> CoreError + '_ {
    move |source| CoreError::GatewayUnavailable {
        operation: operation.to_owned(),
        source,
    }
}

/// Routers from DHCP option 3, else the first usable host.
fn gateway_addresses(record: &NetworkRecord) -> GatewayAddresses {
    if !record.routers.is_empty() {
        return GatewayAddresses {
            addresses: record.routers.clone(),
            inferred: false,
        };
    }
    GatewayAddresses {
        addresses: stats::first_usable_host(&record.cidr).into_iter().collect(),
        inferred: true,
    }
}

/// Warnings collected while a report is assembled.
#[derive(Debug, Default)]
struct Warnings(Vec<Warning>);

impl Warnings {
    fn push(&mut self, field: &str, message: String) {
        warn!(field, "{message}");
        self.0.push(Warning::new(field, message));
    }

    /// Keep a successful secondary result, or record why it is missing.
    fn settle<T>(&mut self, field: &str, what: &str, result: GatewayResult<T>) -> Field<T> {
        match result {
            Ok(value) => Field::Known(value),
            Err(e) => {
                self.push(field, format!("{what} lookup failed: {e}"));
                Field::Unknown
            }
        }
    }

    /// Like [`Warnings::settle`], and also record how many records the
    /// gateway had to skip as malformed.
    fn settle_batch<T>(
        &mut self,
        field: &str,
        what: &str,
        result: GatewayResult<Batch<T>>,
    ) -> Field<Vec<T>> {
        let batch = self.settle(field, what, result);
        if let Field::Known(batch) = &batch {
            match batch.skipped {
                0 => {}
                1 => self.push(field, format!("1 malformed {what} record skipped")),
                n => self.push(field, format!("{n} malformed {what} records skipped")),
            }
        }
        batch.map(|b| b.records)
    }

    fn into_vec(self) -> Vec<Warning> {
        self.0
    }
}

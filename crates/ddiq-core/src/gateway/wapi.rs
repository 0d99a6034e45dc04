// ── WAPI gateway ──
//
// `Gateway` over an InfoBlox grid master. Each lookup is one WAPI search
// (or one read by `_ref`), converted into domain records.

use std::net::IpAddr;
use std::time::Duration;

use ipnet::IpNet;
use tracing::{debug, warn};

use ddiq_api::{Credentials, IpFamily, TransportConfig, WapiClient};

use crate::config::GatewayConfig;
use crate::error::CoreError;
use crate::gateway::{Batch, CallPreview, Gateway, GatewayCall, GatewayError, GatewayResult};
use crate::model::{
    AddressStatus, DhcpRange, DnsRecord, FixedAddressRecord, HostRecord, LeaseRecord,
    NetworkContainerRecord, NetworkRecord, ObjectRef,
};

fn family_of(net: &IpNet) -> IpFamily {
    match net {
        IpNet::V4(_) => IpFamily::V4,
        IpNet::V6(_) => IpFamily::V6,
    }
}

/// A `_ref` names its object type before the first slash.
fn is_container_object_ref(raw: &str) -> bool {
    raw.starts_with("networkcontainer/") || raw.starts_with("ipv6networkcontainer/")
}

/// Convert raw objects, skipping any that fail and counting them.
///
/// One malformed lease should not cost the whole utilization count, but
/// the caller is told how many were left out.
fn convert_all<R, T>(what: &'static str, raw: Vec<R>) -> Batch<T>
where
    T: TryFrom<R, Error = GatewayError>,
{
    let mut batch = Batch::default();
    for item in raw {
        match T::try_from(item) {
            Ok(record) => batch.records.push(record),
            Err(e) => {
                warn!(what, error = %e, "skipping malformed record");
                batch.skipped += 1;
            }
        }
    }
    batch
}

/// The lease currently holding the address: the first bound one, else the
/// first returned.
fn current_lease(mut leases: Vec<LeaseRecord>) -> Option<LeaseRecord> {
    if leases.is_empty() {
        return None;
    }
    let pick = leases.iter().position(LeaseRecord::is_bound).unwrap_or(0);
    Some(leases.swap_remove(pick))
}

/// InfoBlox WAPI implementation of [`Gateway`].
pub struct WapiGateway {
    client: WapiClient,
    timeout: Duration,
}

impl WapiGateway {
    /// Wrap an existing client. `timeout` is the HTTP timeout it was built
    /// with, reported back in timeout errors.
    pub fn new(client: WapiClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Build the HTTP client described by `config`.
    pub fn connect(config: &GatewayConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            tls: config.tls.clone().into(),
            timeout: config.timeout,
        };
        let credentials = Credentials::new(config.username.clone(), config.password.clone());
        let client = WapiClient::new(config.base_url.as_str(), credentials, &transport)?
            .with_page_size(config.page_size);

        debug!(base_url = %client.base_url(), "WAPI gateway ready");
        Ok(Self::new(client, config.timeout))
    }

    pub fn client(&self) -> &WapiClient {
        &self.client
    }

    fn classify(&self, err: ddiq_api::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Timeout {
                after: self.timeout,
            }
        } else {
            err.into()
        }
    }

    /// WAPI object and filter a call resolves to.
    fn query_for(call: &GatewayCall) -> (String, Vec<(String, String)>) {
        let by = |field: &str, value: String| vec![(field.to_owned(), value)];
        match call {
            GatewayCall::Network(cidr) => (
                family_of(cidr).network_object().into(),
                by("network", cidr.to_string()),
            ),
            GatewayCall::NetworkContainer(reference) if is_container_object_ref(reference.as_str()) => {
                (reference.to_string(), Vec::new())
            }
            GatewayCall::NetworkContainer(reference) => {
                let object = match reference.as_str().parse::<IpNet>() {
                    Ok(cidr) => family_of(&cidr).container_object(),
                    Err(_) => IpFamily::V4.container_object(),
                };
                (object.into(), by("network", reference.to_string()))
            }
            GatewayCall::Leases(cidr) => ("lease".into(), by("network", cidr.to_string())),
            GatewayCall::FixedAddresses(cidr) => (
                family_of(cidr).fixed_address_object().into(),
                by("network", cidr.to_string()),
            ),
            GatewayCall::DhcpRanges(cidr) => (
                family_of(cidr).range_object().into(),
                by("network", cidr.to_string()),
            ),
            GatewayCall::AddressStatus(ip) => (
                IpFamily::of(ip).address_object().into(),
                by("ip_address", ip.to_string()),
            ),
            GatewayCall::FixedAddress(ip) => {
                let family = IpFamily::of(ip);
                (
                    family.fixed_address_object().into(),
                    by(family.addr_field(), ip.to_string()),
                )
            }
            GatewayCall::Lease(ip) => ("lease".into(), by("address", ip.to_string())),
            GatewayCall::ForwardRecord(ip) => {
                let family = IpFamily::of(ip);
                (
                    family.forward_record_object().into(),
                    by(family.addr_field(), ip.to_string()),
                )
            }
            GatewayCall::ReverseRecord(ip) => (
                "record:ptr".into(),
                by(IpFamily::of(ip).addr_field(), ip.to_string()),
            ),
            GatewayCall::HostRecord(ip) => (
                "record:host".into(),
                by(IpFamily::of(ip).addr_field(), ip.to_string()),
            ),
            GatewayCall::ParentNetwork(ip) => (
                IpFamily::of(ip).network_object().into(),
                by("contains_address", ip.to_string()),
            ),
        }
    }
}

impl Gateway for WapiGateway {
    async fn lookup_network(&self, cidr: IpNet) -> GatewayResult<Vec<NetworkRecord>> {
        let raw = self
            .client
            .search_networks(family_of(&cidr), &cidr.to_string())
            .await
            .map_err(|e| self.classify(e))?;
        raw.into_iter().map(NetworkRecord::try_from).collect()
    }

    async fn lookup_network_container(
        &self,
        reference: &ObjectRef,
    ) -> GatewayResult<Option<NetworkContainerRecord>> {
        let raw = reference.as_str();
        let result = if is_container_object_ref(raw) {
            self.client.get_network_container(raw).await
        } else {
            let cidr: IpNet = raw.parse().map_err(|_| GatewayError::Rejected {
                message: format!("unrecognized container reference '{raw}'"),
            })?;
            self.client
                .search_network_containers(family_of(&cidr), &cidr.to_string())
                .await
                .map(|containers| containers.into_iter().next())
        };
        let found = result.map_err(|e| self.classify(e))?;

        found.map(NetworkContainerRecord::try_from).transpose()
    }

    async fn lookup_leases(&self, scope: IpNet) -> GatewayResult<Batch<LeaseRecord>> {
        let raw = self
            .client
            .search_leases(&scope.to_string())
            .await
            .map_err(|e| self.classify(e))?;
        Ok(convert_all("lease", raw))
    }

    async fn lookup_fixed_addresses(
        &self,
        scope: IpNet,
    ) -> GatewayResult<Batch<FixedAddressRecord>> {
        let raw = self
            .client
            .search_fixed_addresses(family_of(&scope), &scope.to_string())
            .await
            .map_err(|e| self.classify(e))?;
        Ok(convert_all("fixed address", raw))
    }

    async fn lookup_dhcp_ranges(&self, scope: IpNet) -> GatewayResult<Batch<DhcpRange>> {
        let raw = self
            .client
            .search_ranges(family_of(&scope), &scope.to_string())
            .await
            .map_err(|e| self.classify(e))?;
        Ok(convert_all("DHCP range", raw))
    }

    async fn lookup_address_status(&self, ip: IpAddr) -> GatewayResult<Option<AddressStatus>> {
        self.client
            .address_status(ip)
            .await
            .map_err(|e| self.classify(e))?
            .map(AddressStatus::try_from)
            .transpose()
    }

    async fn lookup_fixed_address(&self, ip: IpAddr) -> GatewayResult<Option<FixedAddressRecord>> {
        self.client
            .fixed_address_for(ip)
            .await
            .map_err(|e| self.classify(e))?
            .map(FixedAddressRecord::try_from)
            .transpose()
    }

    async fn lookup_lease(&self, ip: IpAddr) -> GatewayResult<Option<LeaseRecord>> {
        let leases = self
            .client
            .leases_for_address(ip)
            .await
            .map_err(|e| self.classify(e))?
            .into_iter()
            .map(LeaseRecord::try_from)
            .collect::<GatewayResult<Vec<_>>>()?;
        if leases.len() > 1 {
            debug!(%ip, count = leases.len(), "multiple leases, preferring a bound one");
        }
        Ok(current_lease(leases))
    }

    async fn lookup_forward_record(&self, ip: IpAddr) -> GatewayResult<Option<DnsRecord>> {
        let raw = self
            .client
            .forward_records(ip)
            .await
            .map_err(|e| self.classify(e))?;
        if raw.len() > 1 {
            debug!(%ip, count = raw.len(), "multiple forward records, using the first");
        }
        raw.into_iter().next().map(DnsRecord::try_from).transpose()
    }

    async fn lookup_reverse_record(&self, ip: IpAddr) -> GatewayResult<Option<DnsRecord>> {
        let raw = self
            .client
            .reverse_records(ip)
            .await
            .map_err(|e| self.classify(e))?;
        if raw.len() > 1 {
            debug!(%ip, count = raw.len(), "multiple PTR records, using the first");
        }
        raw.into_iter().next().map(DnsRecord::try_from).transpose()
    }

    async fn lookup_host_record(&self, ip: IpAddr) -> GatewayResult<Option<HostRecord>> {
        let raw = self
            .client
            .host_records(ip)
            .await
            .map_err(|e| self.classify(e))?;
        if raw.len() > 1 {
            debug!(%ip, count = raw.len(), "multiple host records, using the first");
        }
        raw.into_iter().next().map(HostRecord::try_from).transpose()
    }

    async fn lookup_parent_network(&self, ip: IpAddr) -> GatewayResult<Option<NetworkRecord>> {
        let networks = self
            .client
            .networks_containing(ip)
            .await
            .map_err(|e| self.classify(e))?
            .into_iter()
            .map(NetworkRecord::try_from)
            .collect::<GatewayResult<Vec<_>>>()?;
        Ok(networks
            .into_iter()
            .filter(|net| net.cidr.contains(&ip))
            .max_by_key(|net| net.cidr.prefix_len()))
    }

    fn preview(&self, call: &GatewayCall) -> CallPreview {
        let (object, params) = Self::query_for(call);
        CallPreview {
            call: call.clone(),
            method: "GET",
            path: object,
            params,
            description: call.describe(),
        }
    }
}

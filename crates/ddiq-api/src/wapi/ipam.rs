// WAPI IPAM endpoints
//
// Networks, network containers, DHCP ranges and per-address status
// (`ipv4address` / `ipv6address`).

use std::net::IpAddr;

use tracing::debug;

use crate::error::Error;
use crate::wapi::IpFamily;
use crate::wapi::client::WapiClient;
use crate::wapi::models::{WapiAddress, WapiNetwork, WapiNetworkContainer, WapiRange};

const NETWORK_FIELDS: &str =
    "network,network_view,comment,extattrs,network_container,options,members,zone_associations";
const CONTAINER_FIELDS: &str = "network,network_view,comment";
const RANGE_FIELDS: &str = "start_addr,end_addr,network";
const ADDRESS_FIELDS: &str = "ip_address,status,types,usage,names,network,objects";

impl WapiClient {
    /// Networks whose CIDR equals `cidr`.
    ///
    /// `GET /network?network={cidr}` (or `ipv6network`)
    pub async fn search_networks(
        &self,
        family: IpFamily,
        cidr: &str,
    ) -> Result<Vec<WapiNetwork>, Error> {
        debug!(cidr, "searching networks");
        self.search(
            family.network_object(),
            &[("network", cidr.to_owned())],
            NETWORK_FIELDS,
        )
        .await
    }

    /// Every network that contains `addr`, at any prefix length.
    ///
    /// `GET /network?contains_address={addr}`
    pub async fn networks_containing(&self, addr: IpAddr) -> Result<Vec<WapiNetwork>, Error> {
        debug!(%addr, "searching networks containing address");
        self.search(
            IpFamily::of(&addr).network_object(),
            &[("contains_address", addr.to_string())],
            NETWORK_FIELDS,
        )
        .await
    }

    /// Read a network container by its `_ref`.
    pub async fn get_network_container(
        &self,
        reference: &str,
    ) -> Result<Option<WapiNetworkContainer>, Error> {
        debug!(reference, "reading network container");
        self.get_object(reference, CONTAINER_FIELDS).await
    }

    /// Network containers whose CIDR equals `cidr`.
    ///
    /// `GET /networkcontainer?network={cidr}`
    pub async fn search_network_containers(
        &self,
        family: IpFamily,
        cidr: &str,
    ) -> Result<Vec<WapiNetworkContainer>, Error> {
        debug!(cidr, "searching network containers");
        self.search(
            family.container_object(),
            &[("network", cidr.to_owned())],
            CONTAINER_FIELDS,
        )
        .await
    }

    /// DHCP ranges defined inside a network.
    ///
    /// `GET /range?network={cidr}`
    pub async fn search_ranges(&self, family: IpFamily, cidr: &str) -> Result<Vec<WapiRange>, Error> {
        debug!(cidr, "searching DHCP ranges");
        self.search(
            family.range_object(),
            &[("network", cidr.to_owned())],
            RANGE_FIELDS,
        )
        .await
    }

    /// IPAM status of a single address, if WAPI tracks it at all.
    ///
    /// `GET /ipv4address?ip_address={addr}`
    pub async fn address_status(&self, addr: IpAddr) -> Result<Option<WapiAddress>, Error> {
        debug!(%addr, "reading address status");
        let found: Vec<WapiAddress> = self
            .search(
                IpFamily::of(&addr).address_object(),
                &[("ip_address", addr.to_string())],
                ADDRESS_FIELDS,
            )
            .await?;
        Ok(found.into_iter().next())
    }
}

// WAPI DHCP endpoints
//
// Leases and fixed addresses, either scoped to a network or to one address.

use std::net::IpAddr;

use tracing::debug;

use crate::error::Error;
use crate::wapi::IpFamily;
use crate::wapi::client::WapiClient;
use crate::wapi::models::{WapiFixedAddress, WapiLease};

const LEASE_FIELDS: &str = "address,binding_state,client_hostname,ends,hardware,network";
const FIXED_V4_FIELDS: &str = "ipv4addr,mac,name,comment,extattrs,network";
const FIXED_V6_FIELDS: &str = "ipv6addr,duid,name,comment,extattrs,network";

fn fixed_fields(family: IpFamily) -> &'static str {
    match family {
        IpFamily::V4 => FIXED_V4_FIELDS,
        IpFamily::V6 => FIXED_V6_FIELDS,
    }
}

impl WapiClient {
    /// All leases inside a network.
    ///
    /// `GET /lease?network={cidr}`
    pub async fn search_leases(&self, cidr: &str) -> Result<Vec<WapiLease>, Error> {
        debug!(cidr, "searching leases");
        self.search("lease", &[("network", cidr.to_owned())], LEASE_FIELDS)
            .await
    }

    /// Every lease WAPI holds for a single address.
    ///
    /// Expired and released leases are kept alongside the current one, so
    /// this can return several.
    ///
    /// `GET /lease?address={addr}`
    pub async fn leases_for_address(&self, addr: IpAddr) -> Result<Vec<WapiLease>, Error> {
        debug!(%addr, "reading leases for address");
        self.search("lease", &[("address", addr.to_string())], LEASE_FIELDS)
            .await
    }

    /// All fixed addresses inside a network.
    ///
    /// `GET /fixedaddress?network={cidr}`
    pub async fn search_fixed_addresses(
        &self,
        family: IpFamily,
        cidr: &str,
    ) -> Result<Vec<WapiFixedAddress>, Error> {
        debug!(cidr, "searching fixed addresses");
        self.search(
            family.fixed_address_object(),
            &[("network", cidr.to_owned())],
            fixed_fields(family),
        )
        .await
    }

    /// The fixed address reserved for a single address, if any.
    ///
    /// `GET /fixedaddress?ipv4addr={addr}`
    pub async fn fixed_address_for(
        &self,
        addr: IpAddr,
    ) -> Result<Option<WapiFixedAddress>, Error> {
        debug!(%addr, "reading fixed address");
        let family = IpFamily::of(&addr);
        let found: Vec<WapiFixedAddress> = self
            .search(
                family.fixed_address_object(),
                &[(family.addr_field(), addr.to_string())],
                fixed_fields(family),
            )
            .await?;
        Ok(found.into_iter().next())
    }
}

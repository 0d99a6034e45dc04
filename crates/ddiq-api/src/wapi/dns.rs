// WAPI DNS endpoints
//
// Forward (A / AAAA), reverse (PTR) and host records pointing at one address.

use std::net::IpAddr;

use tracing::debug;

use crate::error::Error;
use crate::wapi::IpFamily;
use crate::wapi::client::WapiClient;
use crate::wapi::models::{WapiAddressRecord, WapiHostRecord, WapiPtrRecord};

impl WapiClient {
    /// A (or AAAA) records resolving to `addr`.
    ///
    /// `GET /record:a?ipv4addr={addr}`
    pub async fn forward_records(&self, addr: IpAddr) -> Result<Vec<WapiAddressRecord>, Error> {
        let family = IpFamily::of(&addr);
        debug!(%addr, object = family.forward_record_object(), "searching forward records");
        let fields = format!("name,{},zone,view,last_queried", family.addr_field());
        self.search(
            family.forward_record_object(),
            &[(family.addr_field(), addr.to_string())],
            &fields,
        )
        .await
    }

    /// PTR records for `addr`.
    ///
    /// `GET /record:ptr?ipv4addr={addr}`
    pub async fn reverse_records(&self, addr: IpAddr) -> Result<Vec<WapiPtrRecord>, Error> {
        let family = IpFamily::of(&addr);
        debug!(%addr, "searching PTR records");
        let fields = format!("ptrdname,{},name,zone,view,last_queried", family.addr_field());
        self.search(
            "record:ptr",
            &[(family.addr_field(), addr.to_string())],
            &fields,
        )
        .await
    }

    /// Host records with `addr` among their addresses.
    ///
    /// `GET /record:host?ipv4addr={addr}`
    pub async fn host_records(&self, addr: IpAddr) -> Result<Vec<WapiHostRecord>, Error> {
        let family = IpFamily::of(&addr);
        debug!(%addr, "searching host records");
        let fields = format!("name,{}s,comment,view,zone,extattrs", family.addr_field());
        self.search(
            "record:host",
            &[(family.addr_field(), addr.to_string())],
            &fields,
        )
        .await
    }
}

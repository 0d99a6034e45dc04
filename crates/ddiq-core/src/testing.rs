// In-memory gateway for unit tests.

use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use ipnet::IpNet;

use crate::gateway::{Batch, Gateway, GatewayError, GatewayResult};
use crate::model::{
    AddressStatus, DhcpRange, DnsRecord, FixedAddressRecord, HostRecord, LeaseRecord,
    NetworkContainerRecord, NetworkRecord, ObjectRef,
};

/// Serves canned records. Operations named in `stalled` hang for an hour;
/// operations named in `failing` return `Unavailable`. Collection lookups
/// report `malformed[op]` skipped records on top of what they return.
#[derive(Default)]
pub(crate) struct FakeGateway {
    pub networks: Vec<NetworkRecord>,
    pub containers: HashMap<ObjectRef, NetworkContainerRecord>,
    pub leases: Vec<LeaseRecord>,
    pub fixed: Vec<FixedAddressRecord>,
    pub ranges: Vec<DhcpRange>,
    pub statuses: Vec<AddressStatus>,
    pub forward: Vec<DnsRecord>,
    pub reverse: Vec<DnsRecord>,
    pub hosts: Vec<HostRecord>,
    pub malformed: HashMap<&'static str, usize>,
    pub stalled: HashSet<&'static str>,
    pub failing: HashSet<&'static str>,
    pub(crate) calls: Mutex<Vec<&'static str>>,
}

impl FakeGateway {
    async fn enter(&self, op: &'static str) -> GatewayResult<()> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(op);
        if self.stalled.contains(op) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.failing.contains(op) {
            return Err(GatewayError::Unavailable {
                message: format!("{op} failed"),
            });
        }
        Ok(())
    }

    fn batch<T>(&self, op: &str, records: Vec<T>) -> Batch<T> {
        Batch::new(records, self.malformed.get(op).copied().unwrap_or(0))
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self, op: &str) -> usize {
        self.calls().iter().filter(|c| **c == op).count()
    }
}

impl Gateway for FakeGateway {
    async fn lookup_network(&self, cidr: IpNet) -> GatewayResult<Vec<NetworkRecord>> {
        self.enter("lookup_network").await?;
        Ok(self
            .networks
            .iter()
            .filter(|n| n.cidr == cidr)
            .cloned()
            .collect())
    }

    async fn lookup_network_container(
        &self,
        reference: &ObjectRef,
    ) -> GatewayResult<Option<NetworkContainerRecord>> {
        self.enter("lookup_network_container").await?;
        Ok(self.containers.get(reference).cloned())
    }

    async fn lookup_leases(&self, scope: IpNet) -> GatewayResult<Batch<LeaseRecord>> {
        self.enter("lookup_leases").await?;
        let found = self
            .leases
            .iter()
            .filter(|l| scope.contains(&l.ip))
            .cloned()
            .collect();
        Ok(self.batch("lookup_leases", found))
    }

    async fn lookup_fixed_addresses(
        &self,
        scope: IpNet,
    ) -> GatewayResult<Batch<FixedAddressRecord>> {
        self.enter("lookup_fixed_addresses").await?;
        let found = self
            .fixed
            .iter()
            .filter(|f| scope.contains(&f.ip))
            .cloned()
            .collect();
        Ok(self.batch("lookup_fixed_addresses", found))
    }

    async fn lookup_dhcp_ranges(&self, scope: IpNet) -> GatewayResult<Batch<DhcpRange>> {
        self.enter("lookup_dhcp_ranges").await?;
        let found = self
            .ranges
            .iter()
            .filter(|r| scope.contains(&r.start))
            .copied()
            .collect();
        Ok(self.batch("lookup_dhcp_ranges", found))
    }

    async fn lookup_address_status(&self, ip: IpAddr) -> GatewayResult<Option<AddressStatus>> {
        self.enter("lookup_address_status").await?;
        Ok(self.statuses.iter().find(|s| s.ip == ip).cloned())
    }

    async fn lookup_fixed_address(&self, ip: IpAddr) -> GatewayResult<Option<FixedAddressRecord>> {
        self.enter("lookup_fixed_address").await?;
        Ok(self.fixed.iter().find(|f| f.ip == ip).cloned())
    }

    async fn lookup_lease(&self, ip: IpAddr) -> GatewayResult<Option<LeaseRecord>> {
        self.enter("lookup_lease").await?;
        let held: Vec<&LeaseRecord> = self.leases.iter().filter(|l| l.ip == ip).collect();
        let current = held.iter().find(|l| l.is_bound()).or(held.first());
        Ok(current.map(|l| (*l).clone()))
    }

    async fn lookup_forward_record(&self, ip: IpAddr) -> GatewayResult<Option<DnsRecord>> {
        self.enter("lookup_forward_record").await?;
        Ok(self.forward.iter().find(|r| r.ip == ip).cloned())
    }

    async fn lookup_reverse_record(&self, ip: IpAddr) -> GatewayResult<Option<DnsRecord>> {
        self.enter("lookup_reverse_record").await?;
        Ok(self.reverse.iter().find(|r| r.ip == ip).cloned())
    }

    async fn lookup_host_record(&self, ip: IpAddr) -> GatewayResult<Option<HostRecord>> {
        self.enter("lookup_host_record").await?;
        Ok(self.hosts.iter().find(|h| h.addresses.contains(&ip)).cloned())
    }

    async fn lookup_parent_network(&self, ip: IpAddr) -> GatewayResult<Option<NetworkRecord>> {
        self.enter("lookup_parent_network").await?;
        Ok(self
            .networks
            .iter()
            .filter(|n| n.cidr.contains(&ip))
            .max_by_key(|n| n.cidr.prefix_len())
            .cloned())
    }
}

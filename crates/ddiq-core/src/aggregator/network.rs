// ── find_network ──

use indexmap::IndexMap;
use tracing::info;

use crate::aggregator::{Aggregator, Warnings, gateway_addresses, unavailable};
use crate::error::CoreError;
use crate::gateway::{Gateway, GatewayCall};
use crate::identifier::parse_cidr;
use crate::report::{
    DhcpSummary, DnsZones, Field, Modification, NetworkReport, UtilizationStats,
};
use crate::stats;

/// Sort attributes by name, case-insensitively; exact case breaks ties.
fn sorted_attributes(attrs: IndexMap<String, String>) -> IndexMap<String, String> {
    let mut attrs: Vec<(String, String)> = attrs.into_iter().collect();
    attrs.sort_by(|(a, _), (b, _)| {
        a.to_lowercase()
            .cmp(&b.to_lowercase())
            .then_with(|| a.cmp(b))
    });
    attrs.into_iter().collect()
}

impl<G: Gateway> Aggregator<G> {
    /// Build the report for the network whose CIDR is exactly `identifier`.
    ///
    /// Fails when the CIDR does not parse, when no network or more than one
    /// network matches, or when the network lookup itself fails. Container,
    /// lease, fixed-address and range lookups degrade instead.
    pub async fn find_network(&self, identifier: &str) -> Result<NetworkReport, CoreError> {
        let cidr = parse_cidr(identifier)?;
        info!(%cidr, "looking up network");

        let mut matches = self
            .call(GatewayCall::Network(cidr), self.gateway.lookup_network(cidr))
            .await
            .map_err(unavailable("network lookup"))?;

        let record = match matches.len() {
            0 => {
                return Err(CoreError::NotFound {
                    entity: "Network".into(),
                    identifier: cidr.to_string(),
                });
            }
            1 => matches.swap_remove(0),
            count => {
                return Err(CoreError::AmbiguousResult {
                    entity: "network".into(),
                    identifier: cidr.to_string(),
                    count,
                    references: matches
                        .iter()
                        .map(|n| {
                            n.reference
                                .as_ref()
                                .map_or_else(|| n.cidr.to_string(), ToString::to_string)
                        })
                        .collect(),
                });
            }
        };

        let mut warnings = Warnings::default();
        let (container, leases, fixed, ranges) = tokio::join!(
            self.resolve_container(record.container.as_ref(), &mut warnings),
            self.call(GatewayCall::Leases(cidr), self.gateway.lookup_leases(cidr)),
            self.call(
                GatewayCall::FixedAddresses(cidr),
                self.gateway.lookup_fixed_addresses(cidr),
            ),
            self.call(GatewayCall::DhcpRanges(cidr), self.gateway.lookup_dhcp_ranges(cidr)),
        );

        let leases = warnings.settle_batch("leases", "lease", leases);
        let fixed = warnings.settle_batch("fixed_addresses", "fixed address", fixed);
        let ranges = warnings.settle_batch("dhcp_ranges", "DHCP range", ranges);

        let bound = match (&leases, &fixed) {
            (Field::Known(leases), Field::Known(fixed)) => {
                Field::Known(stats::bound_addresses(&cidr, leases, fixed))
            }
            _ => Field::Unknown,
        };

        let total = stats::usable_hosts(&cidr);
        let utilization = match &bound {
            Field::Known(set) => {
                UtilizationStats::new(total, u128::try_from(set.len()).unwrap_or(u128::MAX))
            }
            Field::Unknown => UtilizationStats::unknown(total),
        };

        let dhcp_free = match (&ranges, &bound) {
            (Field::Known(ranges), Field::Known(bound)) => {
                Field::Known(stats::dhcp_free(ranges, bound))
            }
            _ => Field::Unknown,
        };

        let gateways = gateway_addresses(&record);
        let dhcp = DhcpSummary {
            enabled: record.dhcp_enabled(),
            members: record.dhcp_members,
            ranges,
            free: dhcp_free,
        };

        let report = NetworkReport {
            network: cidr,
            reference: record.reference,
            network_view: record.network_view,
            container,
            comment: record.comment,
            extensible_attributes: sorted_attributes(record.extensible_attributes),
            utilization,
            network_address: cidr.network(),
            broadcast_address: stats::broadcast_address(&cidr),
            gateways,
            dhcp,
            dns: DnsZones {
                forward: record.forward_zone,
                reverse: record.reverse_zone,
            },
            modification: Modification {
                last_modified: record.last_modified,
                last_modified_by: record.last_modified_by,
            },
            warnings: warnings.into_vec(),
        };

        info!(
            %cidr,
            used = ?report.utilization.used.known(),
            total = report.utilization.total,
            warnings = report.warnings.len(),
            "network report assembled"
        );
        Ok(report)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::net::IpAddr;
    use std::time::Duration;

    use ipnet::IpNet;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{
        DhcpRange, FixedAddressRecord, LeaseRecord, NetworkContainerRecord, NetworkRecord,
        ObjectRef,
    };
    use crate::report::ContainerInfo;
    use crate::testing::FakeGateway;

    fn net(s: &str) -> IpNet {
        s.parse().unwrap()
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    fn management_network() -> NetworkRecord {
        NetworkRecord {
            comment: Some("Management Network".into()),
            ..NetworkRecord::new(net("192.168.1.0/24"))
        }
    }

    /// 100 leases (.1-.100) and 50 fixed addresses (.93-.142): 142 distinct.
    fn populated_gateway() -> FakeGateway {
        FakeGateway {
            networks: vec![management_network()],
            leases: (1..=100)
                .map(|n| LeaseRecord::new(ip(&format!("192.168.1.{n}"))))
                .collect(),
            fixed: (93..=142)
                .map(|n| FixedAddressRecord::new(ip(&format!("192.168.1.{n}"))))
                .collect(),
            ..FakeGateway::default()
        }
    }

    #[tokio::test]
    async fn top_level_network_with_combined_bindings() {
        let aggregator = Aggregator::new(populated_gateway());

        let report = aggregator.find_network("192.168.1.0/24").await.unwrap();

        assert_eq!(report.utilization.total, 254);
        assert_eq!(report.utilization.used, Field::Known(142));
        assert_eq!(report.utilization.free, Field::Known(112));
        assert_eq!(report.container.to_string(), "none (top-level network)");
        assert_eq!(report.comment.as_deref(), Some("Management Network"));
        assert!(report.warnings.is_empty());
        assert_eq!(aggregator.gateway().call_count("lookup_network_container"), 0);
    }

    #[tokio::test]
    async fn container_is_resolved_by_reference() {
        let reference = ObjectRef::new("10.0.0.0/8");
        let mut gateway = FakeGateway {
            networks: vec![NetworkRecord {
                container: Some(reference.clone()),
                ..NetworkRecord::new(net("10.1.0.0/24"))
            }],
            ..FakeGateway::default()
        };
        gateway.containers.insert(
            reference,
            NetworkContainerRecord {
                reference: None,
                cidr: net("10.0.0.0/8"),
                comment: Some("Corporate".into()),
            },
        );
        let aggregator = Aggregator::new(gateway);

        let report = aggregator.find_network("10.1.0.0/24").await.unwrap();

        assert_eq!(report.container.to_string(), "10.0.0.0/8 (Corporate)");
        assert_eq!(aggregator.gateway().call_count("lookup_network_container"), 1);
    }

    #[tokio::test]
    async fn dangling_container_degrades_with_warning() {
        let gateway = FakeGateway {
            networks: vec![NetworkRecord {
                container: Some(ObjectRef::new("10.9.0.0/16")),
                ..NetworkRecord::new(net("10.9.1.0/24"))
            }],
            ..FakeGateway::default()
        };

        let report = Aggregator::new(gateway)
            .find_network("10.9.1.0/24")
            .await
            .unwrap();

        assert!(matches!(report.container, ContainerInfo::Unresolved { .. }));
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].field, "container");
    }

    #[tokio::test]
    async fn missing_network_is_not_found() {
        let err = Aggregator::new(FakeGateway::default())
            .find_network("172.16.0.0/16")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn duplicate_networks_are_ambiguous() {
        let gateway = FakeGateway {
            networks: vec![
                NetworkRecord {
                    network_view: Some("default".into()),
                    ..NetworkRecord::new(net("10.1.0.0/24"))
                },
                NetworkRecord {
                    network_view: Some("lab".into()),
                    ..NetworkRecord::new(net("10.1.0.0/24"))
                },
            ],
            ..FakeGateway::default()
        };

        let err = Aggregator::new(gateway)
            .find_network("10.1.0.0/24")
            .await
            .unwrap_err();
        match err {
            CoreError::AmbiguousResult { count, .. } => assert_eq!(count, 2),
            other => panic!("expected AmbiguousResult, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_cidr_never_reaches_gateway() {
        let aggregator = Aggregator::new(FakeGateway::default());
        let err = aggregator.find_network("10.0.0.0/33").await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidIdentifier { .. }), "{err:?}");
        assert!(aggregator.gateway().calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn lease_timeout_degrades_utilization() {
        let mut gateway = populated_gateway();
        gateway.stalled.insert("lookup_leases");
        let aggregator = Aggregator::new(gateway).with_call_timeout(Duration::from_secs(5));

        let report = aggregator.find_network("192.168.1.0/24").await.unwrap();

        assert_eq!(report.utilization.total, 254);
        assert!(report.utilization.used.is_unknown());
        assert!(report.utilization.free.is_unknown());
        assert!(report.dhcp.free.is_unknown());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].field, "leases");
        assert!(report.warnings[0].message.contains("timed out"));
    }

    #[tokio::test]
    async fn skipped_records_are_reported_without_losing_the_count() {
        let mut gateway = populated_gateway();
        gateway.malformed.insert("lookup_leases", 1);
        gateway.malformed.insert("lookup_fixed_addresses", 3);

        let report = Aggregator::new(gateway)
            .find_network("192.168.1.0/24")
            .await
            .unwrap();

        assert_eq!(report.utilization.used, Field::Known(142));
        let messages: Vec<(&str, &str)> = report
            .warnings
            .iter()
            .map(|w| (w.field.as_str(), w.message.as_str()))
            .collect();
        assert_eq!(
            messages,
            vec![
                ("leases", "1 malformed lease record skipped"),
                ("fixed_addresses", "3 malformed fixed address records skipped"),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn network_lookup_timeout_is_fatal() {
        let mut gateway = populated_gateway();
        gateway.stalled.insert("lookup_network");
        let aggregator = Aggregator::new(gateway).with_call_timeout(Duration::from_secs(5));

        let err = aggregator.find_network("192.168.1.0/24").await.unwrap_err();

        match err {
            CoreError::GatewayUnavailable { source, .. } => assert!(source.is_timeout()),
            other => panic!("expected GatewayUnavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn attributes_sorted_case_insensitively() {
        let mut record = NetworkRecord::new(net("10.2.0.0/24"));
        for (k, v) in [("vlan", "20"), ("Site", "HQ"), ("building", "B2"), ("Owner", "NetOps")] {
            record.extensible_attributes.insert(k.into(), v.into());
        }
        let gateway = FakeGateway {
            networks: vec![record],
            ..FakeGateway::default()
        };

        let report = Aggregator::new(gateway)
            .find_network("10.2.0.0/24")
            .await
            .unwrap();

        let keys: Vec<&str> = report.extensible_attributes.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["building", "Owner", "Site", "vlan"]);
    }

    #[tokio::test]
    async fn gateway_falls_back_to_first_host() {
        let report = Aggregator::new(populated_gateway())
            .find_network("192.168.1.0/24")
            .await
            .unwrap();
        assert_eq!(report.gateways.addresses, vec![ip("192.168.1.1")]);
        assert!(report.gateways.inferred);
        assert_eq!(report.broadcast_address, Some(ip("192.168.1.255")));
    }

    #[tokio::test]
    async fn routers_and_dhcp_free_count() {
        let mut gateway = populated_gateway();
        gateway.networks[0].routers = vec![ip("192.168.1.254"), ip("192.168.1.253")];
        gateway.networks[0].dhcp_members = vec!["dhcp1.example.com".into()];
        gateway.ranges = vec![DhcpRange {
            start: ip("192.168.1.51"),
            end: ip("192.168.1.200"),
        }];

        let report = Aggregator::new(gateway)
            .find_network("192.168.1.0/24")
            .await
            .unwrap();

        assert_eq!(report.gateways.addresses.len(), 2);
        assert!(!report.gateways.inferred);
        assert!(report.dhcp.enabled);
        // 150 addresses in range, .51-.142 bound
        assert_eq!(report.dhcp.free, Field::Known(58));
    }

    #[tokio::test]
    async fn host_bits_are_normalized_before_lookup() {
        let report = Aggregator::new(populated_gateway())
            .find_network("192.168.1.77/24")
            .await
            .unwrap();
        assert_eq!(report.network.to_string(), "192.168.1.0/24");
    }
}

//! Unit tests for network operations

#[cfg(test)]
mod tests {
    use crate::error::ProvisionError;
    use crate::status::NetworkStatus;
    use crate::test_utils::*;
    use crate::types::{Network, Route};
    use openstack_client::MockOpenStackClient;

    fn assert_backend_empty(mock: &MockOpenStackClient) {
        assert!(mock.networks().is_empty(), "networks left: {:?}", mock.networks());
        assert!(mock.routers().is_empty(), "routers left: {:?}", mock.routers());
        assert!(mock.subnets().is_empty(), "subnets left: {:?}", mock.subnets());
        assert!(mock.ports().is_empty(), "ports left: {:?}", mock.ports());
    }

    #[tokio::test]
    async fn test_create_network_end_to_end() {
        let mock = MockOpenStackClient::new();
        let provisioner = test_provisioner(&mock);
        let mut network = test_network("net1", "t1", &["10.0.0.0/24"]);

        provisioner.create_network(&mut network).await.unwrap();

        assert_eq!(
            mock.mutating_calls(),
            vec!["create_network", "create_router", "create_subnet", "add_router_interface"]
        );

        let backend_network = &mock.networks()[0];
        assert_eq!(network.uid, backend_network.id);
        assert_eq!(network.status, NetworkStatus::Active);
        assert_eq!(backend_network.name, "net1");
        assert_eq!(backend_network.tenant_id, "t1");

        let router = &mock.routers()[0];
        assert_eq!(router.name, "net1");
        assert_eq!(
            router.external_gateway_info.as_ref().map(|g| g.network_id.as_str()),
            Some(EXT_NET_ID)
        );

        let subnet = &mock.subnets()[0];
        assert_eq!(network.subnets[0].uid, subnet.id);
        assert_eq!(subnet.network_id, backend_network.id);
        assert_eq!(subnet.cidr, "10.0.0.0/24");
        assert_eq!(subnet.gateway_ip.as_deref(), Some("10.0.0.1"));
        assert_eq!(subnet.ip_version, 4);
        assert_eq!(subnet.tenant_id, "t1");
    }

    #[tokio::test]
    async fn test_create_network_reports_backend_status() {
        let mock = MockOpenStackClient::new();
        mock.set_network_create_status("BUILD");
        let provisioner = test_provisioner(&mock);
        let mut network = test_network("net1", "t1", &["10.0.0.0/24"]);

        provisioner.create_network(&mut network).await.unwrap();
        assert_eq!(network.status, NetworkStatus::Pending);
    }

    #[tokio::test]
    async fn test_create_network_without_subnets_makes_no_calls() {
        let mock = MockOpenStackClient::new();
        let provisioner = test_provisioner(&mock);
        let mut network = test_network("net1", "t1", &[]);

        let err = provisioner.create_network(&mut network).await.unwrap_err();
        assert!(matches!(err, ProvisionError::Validation(_)));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_network_create_failure_leaves_nothing_to_undo() {
        let mock = MockOpenStackClient::new();
        mock.fail_next("create_network", 500);
        let provisioner = test_provisioner(&mock);
        let mut network = test_network("net1", "t1", &["10.0.0.0/24"]);

        assert!(provisioner.create_network(&mut network).await.is_err());
        assert_eq!(mock.mutating_calls(), vec!["create_network"]);
        assert!(network.uid.is_empty());
    }

    #[tokio::test]
    async fn test_router_failure_deletes_network() {
        let mock = MockOpenStackClient::new();
        mock.fail_next("create_router", 500);
        let provisioner = test_provisioner(&mock);
        let mut network = test_network("net1", "t1", &["10.0.0.0/24"]);

        let err = provisioner.create_network(&mut network).await.unwrap_err();
        assert!(matches!(err, ProvisionError::Backend(ref e) if e.status_code() == Some(500)));
        assert_eq!(
            mock.mutating_calls(),
            vec!["create_network", "create_router", "delete_network"]
        );
        assert_backend_empty(&mock);
        // Still populated for correlation
        assert!(!network.uid.is_empty());
    }

    #[tokio::test]
    async fn test_failure_at_third_subnet_cascades() {
        let mock = MockOpenStackClient::new();
        mock.fail_call("create_subnet", 3, 500);
        let provisioner = test_provisioner(&mock);
        let mut network = test_network("net1", "t1", &["10.0.0.0/24", "10.0.1.0/24", "10.0.2.0/24"]);

        assert!(provisioner.create_network(&mut network).await.is_err());
        assert_eq!(
            mock.mutating_calls(),
            vec![
                "create_network",
                "create_router",
                "create_subnet",
                "add_router_interface",
                "create_subnet",
                "add_router_interface",
                "create_subnet",
                "remove_router_interface",
                "delete_subnet",
                "remove_router_interface",
                "delete_subnet",
                "delete_router",
                "delete_network",
            ]
        );
        assert_backend_empty(&mock);
        assert!(!network.subnets[0].uid.is_empty());
        assert!(network.subnets[2].uid.is_empty());
    }

    #[tokio::test]
    async fn test_failure_attaching_second_subnet_cascades() {
        let mock = MockOpenStackClient::new();
        mock.fail_call("add_router_interface", 2, 500);
        let provisioner = test_provisioner(&mock);
        let mut network = test_network("net1", "t1", &["10.0.0.0/24", "10.0.1.0/24"]);

        assert!(provisioner.create_network(&mut network).await.is_err());
        assert_eq!(mock.call_count("delete_subnet"), 2);
        assert_eq!(mock.call_count("remove_router_interface"), 1);
        assert_backend_empty(&mock);
    }

    #[tokio::test]
    async fn test_failed_compensation_keeps_original_error() {
        let mock = MockOpenStackClient::new();
        mock.fail_call("create_subnet", 1, 500);
        mock.fail_call("delete_router", 1, 503);
        let provisioner = test_provisioner(&mock);
        let mut network = test_network("net1", "t1", &["10.0.0.0/24"]);

        let err = provisioner.create_network(&mut network).await.unwrap_err();
        assert!(matches!(
            err,
            ProvisionError::Backend(ref e) if e.status_code() == Some(500) && e.to_string().contains("create_subnet")
        ));
        // The router left by the failed undo is found by name and removed
        assert_eq!(mock.call_count("delete_router"), 2);
        assert_eq!(mock.call_count("delete_network"), 1);
        assert_backend_empty(&mock);
    }

    #[tokio::test]
    async fn test_router_failure_removes_leftover_router_by_name() {
        let mock = MockOpenStackClient::new();
        mock.add_router("net1", "t1");
        mock.fail_next("create_router", 500);
        let provisioner = test_provisioner(&mock);
        let mut network = test_network("net1", "t1", &["10.0.0.0/24"]);

        assert!(provisioner.create_network(&mut network).await.is_err());
        assert_eq!(
            mock.mutating_calls(),
            vec!["create_network", "create_router", "delete_router", "delete_network"]
        );
        assert!(mock.routers().iter().all(|r| r.name != "net1"));

        // A retry is not left with two routers of the same name
        let mut network = test_network("net1", "t1", &["10.0.0.0/24"]);
        provisioner.create_network(&mut network).await.unwrap();
        provisioner.delete_network("net1").await.unwrap();
        assert_backend_empty(&mock);
    }

    #[tokio::test]
    async fn test_delete_network_full_teardown_order() {
        let mock = MockOpenStackClient::new();
        let provisioner = test_provisioner(&mock);
        let mut network = test_network("net1", "t1", &["10.0.0.0/24", "10.0.1.0/24"]);
        provisioner.create_network(&mut network).await.unwrap();
        mock.add_port("pod-a", &network.uid, "compute:node-1");
        mock.clear_calls();

        provisioner.delete_network("net1").await.unwrap();

        assert_eq!(
            mock.mutating_calls(),
            vec![
                "delete_port",
                "remove_router_interface",
                "delete_subnet",
                "remove_router_interface",
                "delete_subnet",
                "delete_router",
                "delete_network",
            ]
        );
        assert_backend_empty(&mock);
    }

    #[tokio::test]
    async fn test_delete_missing_network_is_a_lookup_only() {
        let mock = MockOpenStackClient::new();
        let provisioner = test_provisioner(&mock);

        provisioner.delete_network("nope").await.unwrap();
        assert_eq!(mock.calls(), vec!["list_networks"]);
        assert!(mock.mutating_calls().is_empty());
    }

    #[tokio::test]
    async fn test_delete_network_twice() {
        let mock = MockOpenStackClient::new();
        let provisioner = test_provisioner(&mock);
        let mut network = test_network("net1", "t1", &["10.0.0.0/24"]);
        provisioner.create_network(&mut network).await.unwrap();

        provisioner.delete_network("net1").await.unwrap();
        mock.clear_calls();
        provisioner.delete_network("net1").await.unwrap();

        assert!(mock.mutating_calls().is_empty());
        assert_backend_empty(&mock);
    }

    #[tokio::test]
    async fn test_delete_network_without_router() {
        let mock = MockOpenStackClient::new();
        mock.add_network("net1", "t1");
        let provisioner = test_provisioner(&mock);

        provisioner.delete_network("net1").await.unwrap();
        assert_eq!(mock.mutating_calls(), vec!["delete_network"]);
        assert!(mock.networks().is_empty());
    }

    #[tokio::test]
    async fn test_port_delete_failure_is_skipped_then_retried() {
        let mock = MockOpenStackClient::new();
        let provisioner = test_provisioner(&mock);
        let mut network = test_network("net1", "t1", &["10.0.0.0/24"]);
        provisioner.create_network(&mut network).await.unwrap();
        mock.add_port("pod-a", &network.uid, "compute:node-1");
        mock.fail_next("delete_port", 500);

        // The stuck port blocks only the final network delete
        let err = provisioner.delete_network("net1").await.unwrap_err();
        assert!(matches!(err, ProvisionError::Backend(ref e) if e.is_conflict()));
        assert!(mock.routers().is_empty());
        assert!(mock.subnets().is_empty());
        assert_eq!(mock.networks().len(), 1);

        provisioner.delete_network("net1").await.unwrap();
        assert_backend_empty(&mock);
    }

    #[tokio::test]
    async fn test_detach_failure_stops_teardown() {
        let mock = MockOpenStackClient::new();
        let provisioner = test_provisioner(&mock);
        let mut network = test_network("net1", "t1", &["10.0.0.0/24"]);
        provisioner.create_network(&mut network).await.unwrap();
        mock.fail_next("remove_router_interface", 500);
        mock.clear_calls();

        assert!(provisioner.delete_network("net1").await.is_err());
        assert_eq!(mock.call_count("delete_subnet"), 0);
        assert_eq!(mock.call_count("delete_router"), 0);
        assert_eq!(mock.subnets().len(), 1);

        provisioner.delete_network("net1").await.unwrap();
        assert_backend_empty(&mock);
    }

    #[tokio::test]
    async fn test_retry_after_subnet_delete_failure_skips_detached_interface() {
        let mock = MockOpenStackClient::new();
        let provisioner = test_provisioner(&mock);
        let mut network = test_network("net1", "t1", &["10.0.0.0/24"]);
        provisioner.create_network(&mut network).await.unwrap();
        mock.fail_next("delete_subnet", 500);

        assert!(provisioner.delete_network("net1").await.is_err());
        assert_eq!(mock.subnets().len(), 1);
        assert_eq!(mock.routers().len(), 1);

        provisioner.delete_network("net1").await.unwrap();
        assert_backend_empty(&mock);
    }

    #[tokio::test]
    async fn test_ambiguous_router_is_found_after_port_sweep() {
        let mock = MockOpenStackClient::new();
        let backend = mock.add_network("net1", "t1");
        mock.add_port("pod-a", &backend.id, "compute:node-1");
        mock.add_router("net1", "t1");
        mock.add_router("net1", "t1");
        let provisioner = test_provisioner(&mock);

        let err = provisioner.delete_network("net1").await.unwrap_err();
        assert!(matches!(err, ProvisionError::MultipleResults { kind: "Router", .. }));
        assert_eq!(mock.mutating_calls(), vec!["delete_port"]);
        assert!(mock.ports().is_empty());
        assert_eq!(mock.networks().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_ambiguous_network_is_refused() {
        let mock = MockOpenStackClient::new();
        mock.add_network("net1", "t1");
        mock.add_network("net1", "t1");
        let provisioner = test_provisioner(&mock);

        let err = provisioner.delete_network("net1").await.unwrap_err();
        assert!(matches!(err, ProvisionError::MultipleResults { .. }));
        assert!(mock.mutating_calls().is_empty());
        assert_eq!(mock.networks().len(), 2);
    }

    #[tokio::test]
    async fn test_get_network_resolves_subnets() {
        let mock = MockOpenStackClient::new();
        let provisioner = test_provisioner(&mock);
        let mut network = test_network("net1", "t1", &["10.0.0.0/24", "10.0.1.0/24"]);
        network.subnets[0].dns_servers = vec!["10.0.0.2".to_string(), "8.8.8.8".to_string()];
        network.subnets[0].routes = vec![Route {
            nexthop: "10.0.0.254".to_string(),
            destination_cidr: "192.168.0.0/16".to_string(),
        }];
        provisioner.create_network(&mut network).await.unwrap();

        let by_name = provisioner.get_network_by_name("net1").await.unwrap();
        let by_id = provisioner.get_network_by_id(&network.uid).await.unwrap();
        let by_tenant = provisioner.get_network_by_tenant_id("t1").await.unwrap();
        assert_eq!(by_name, by_id);
        assert_eq!(by_name, by_tenant);
        assert_eq!(by_name, network);
    }

    #[tokio::test]
    async fn test_get_missing_network_and_subnet() {
        let mock = MockOpenStackClient::new();
        let provisioner = test_provisioner(&mock);

        assert!(provisioner.get_network_by_name("nope").await.unwrap_err().is_not_found());
        let err = provisioner.get_provider_subnet("subnet-404").await.unwrap_err();
        assert!(matches!(err, ProvisionError::Backend(ref e) if e.is_not_found()));
    }

    #[tokio::test]
    async fn test_update_network_is_not_implemented() {
        let mock = MockOpenStackClient::new();
        let provisioner = test_provisioner(&mock);

        let err = provisioner.update_network(&Network::default()).await.unwrap_err();
        assert!(matches!(err, ProvisionError::NotImplemented("update_network")));
        assert!(mock.calls().is_empty());
    }
}

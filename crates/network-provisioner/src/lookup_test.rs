//! Unit tests for lookup module

#[cfg(test)]
mod tests {
    use crate::error::ProvisionError;
    use crate::lookup::{router_by_name, select, MatchMode};
    use crate::test_utils::*;
    use openstack_client::MockOpenStackClient;

    #[test]
    fn test_select_classifies_match_counts() {
        let items = vec!["a", "b", "b"];

        assert_eq!(select("Item", "a", items.clone(), |i| *i == "a", MatchMode::Unique).unwrap(), "a");

        let err = select("Item", "c", items.clone(), |i| *i == "c", MatchMode::Unique).unwrap_err();
        assert!(matches!(err, ProvisionError::NotFound { kind: "Item", ref key } if key == "c"));

        let err = select("Item", "b", items.clone(), |i| *i == "b", MatchMode::Unique).unwrap_err();
        assert!(matches!(err, ProvisionError::MultipleResults { kind: "Item", .. }));
    }

    #[test]
    fn test_select_first_tolerates_duplicates() {
        let items = vec![(1, "b"), (2, "b")];
        let found = select("Item", "b", items.clone(), |i| i.1 == "b", MatchMode::First).unwrap();
        assert_eq!(found.0, 1);

        let err = select("Item", "x", items, |i| i.1 == "x", MatchMode::First).unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_network_by_name_rejects_duplicates() {
        let mock = MockOpenStackClient::new();
        mock.add_network("net1", "t1");
        mock.add_network("net1", "t2");
        let provisioner = test_provisioner(&mock);

        let err = provisioner.find_network_by_name("net1").await.unwrap_err();
        assert!(matches!(err, ProvisionError::MultipleResults { kind: "Network", .. }));
    }

    #[tokio::test]
    async fn test_network_lookup_matches_exact_name() {
        let mock = MockOpenStackClient::new();
        mock.add_network("net10", "t1");
        let provisioner = test_provisioner(&mock);

        let err = provisioner.find_network_by_name("net1").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(provisioner.find_network_by_name("net10").await.is_ok());
    }

    #[tokio::test]
    async fn test_router_and_port_lookups() {
        let mock = MockOpenStackClient::new();
        let router = mock.add_router("net1", "t1");
        let network = mock.add_network("net1", "t1");
        let port = mock.add_port("pod-a", &network.id, "compute:node-1");
        mock.add_port("pod-b", &network.id, "compute:node-1");
        mock.add_port("pod-b", &network.id, "compute:node-1");
        let provisioner = test_provisioner(&mock);

        assert_eq!(router_by_name(&mock, "net1").await.unwrap().id, router.id);
        assert_eq!(provisioner.find_port_by_name("pod-a").await.unwrap().id, port.id);
        assert!(matches!(
            provisioner.find_port_by_name("pod-b").await,
            Err(ProvisionError::MultipleResults { .. })
        ));
        assert!(router_by_name(&mock, "missing").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_security_group_lookup_is_scoped_to_tenant() {
        let mock = MockOpenStackClient::new();
        mock.add_security_group("default-sg", "t2");
        let first = mock.add_security_group("default-sg", "t1");
        mock.add_security_group("default-sg", "t1");
        let provisioner = test_provisioner(&mock);

        let found = provisioner.find_security_group("t1", "default-sg").await.unwrap();
        assert_eq!(found.id, first.id);
        assert!(provisioner.find_security_group("t3", "default-sg").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_backend_errors_propagate() {
        let mock = MockOpenStackClient::new();
        mock.fail_next("list_networks", 503);
        let provisioner = test_provisioner(&mock);

        let err = provisioner.find_network_by_id("network-1").await.unwrap_err();
        assert!(matches!(err, ProvisionError::Backend(ref e) if e.status_code() == Some(503)));
        assert_eq!(mock.call_count("list_networks"), 1);
    }
}

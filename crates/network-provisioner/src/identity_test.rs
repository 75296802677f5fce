//! Unit tests for identity operations

#[cfg(test)]
mod tests {
    use crate::error::ProvisionError;
    use crate::test_utils::*;
    use openstack_client::MockOpenStackClient;

    #[tokio::test]
    async fn test_recorded_tenant_id_skips_keystone() {
        let mock = MockOpenStackClient::new();
        let store = InMemoryTenantStore::default();
        store.add("team-a", Some("recorded-id"));
        let provisioner = test_provisioner_with_store(&mock, &store);

        let id = provisioner.tenant_id_from_name("team-a").await.unwrap();
        assert_eq!(id, "recorded-id");
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unrecorded_tenant_id_is_listed() {
        let mock = MockOpenStackClient::new();
        let tenant = mock.add_tenant("team-a");
        let store = InMemoryTenantStore::default();
        store.add("team-a", Some(""));
        let provisioner = test_provisioner_with_store(&mock, &store);

        assert_eq!(provisioner.tenant_id_from_name("team-a").await.unwrap(), tenant.id);
        assert_eq!(mock.call_count("list_tenants"), 1);
    }

    #[tokio::test]
    async fn test_system_namespace_maps_to_system_tenant() {
        let mock = MockOpenStackClient::new();
        let system = mock.add_tenant("system-tenant");
        mock.add_tenant("kube-system");
        let store = InMemoryTenantStore::default();
        store.add("system-tenant", None);
        let provisioner = test_provisioner_with_store(&mock, &store);

        assert_eq!(provisioner.tenant_id_from_name("kube-system").await.unwrap(), system.id);
    }

    #[tokio::test]
    async fn test_duplicate_tenant_names_first_wins() {
        let mock = MockOpenStackClient::new();
        let first = mock.add_tenant("team-a");
        mock.add_tenant("team-a");
        let store = InMemoryTenantStore::default();
        store.add("team-a", None);
        let provisioner = test_provisioner_with_store(&mock, &store);

        assert_eq!(provisioner.tenant_id_from_name("team-a").await.unwrap(), first.id);
    }

    #[tokio::test]
    async fn test_unknown_tenant_is_not_found() {
        let mock = MockOpenStackClient::new();
        let store = InMemoryTenantStore::default();
        store.add("team-a", None);
        let provisioner = test_provisioner_with_store(&mock, &store);

        let err = provisioner.tenant_id_from_name("team-a").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_tenant_store_errors_propagate() {
        let mock = MockOpenStackClient::new();
        let provisioner = test_provisioner(&mock);

        let err = provisioner.tenant_id_from_name("team-a").await.unwrap_err();
        assert!(matches!(err, ProvisionError::TenantStore(_)));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_tenant_returns_new_id() {
        let mock = MockOpenStackClient::new();
        let store = InMemoryTenantStore::default();
        store.add("team-a", None);
        let provisioner = test_provisioner_with_store(&mock, &store);

        let id = provisioner.create_tenant("team-a").await.unwrap();
        let tenants = mock.tenants();
        assert_eq!(tenants.len(), 1);
        assert_eq!(tenants[0].id, id);
        assert_eq!(tenants[0].description.as_deref(), Some("tenantnet"));
    }

    #[tokio::test]
    async fn test_create_existing_tenant_still_resolves() {
        let mock = MockOpenStackClient::new();
        let existing = mock.add_tenant("team-a");
        let store = InMemoryTenantStore::default();
        store.add("team-a", None);
        let provisioner = test_provisioner_with_store(&mock, &store);

        let id = provisioner.create_tenant("team-a").await.unwrap();
        assert_eq!(id, existing.id);
        assert_eq!(mock.tenants().len(), 1);
        assert_eq!(mock.call_count("create_tenant"), 1);
    }

    #[tokio::test]
    async fn test_create_tenant_other_errors_propagate() {
        let mock = MockOpenStackClient::new();
        mock.fail_next("create_tenant", 401);
        let store = InMemoryTenantStore::default();
        store.add("team-a", None);
        let provisioner = test_provisioner_with_store(&mock, &store);

        let err = provisioner.create_tenant("team-a").await.unwrap_err();
        assert!(matches!(err, ProvisionError::Backend(ref e) if e.status_code() == Some(401)));
        assert_eq!(store.reads(), 0);
    }

    #[tokio::test]
    async fn test_delete_tenant_removes_every_match() {
        let mock = MockOpenStackClient::new();
        mock.add_tenant("team-a");
        mock.add_tenant("team-a");
        let other = mock.add_tenant("team-b");
        let provisioner = test_provisioner(&mock);

        provisioner.delete_tenant("team-a").await.unwrap();
        assert_eq!(mock.tenants(), vec![other]);

        // Nothing left to match
        provisioner.delete_tenant("team-a").await.unwrap();
        assert_eq!(mock.call_count("delete_tenant"), 2);
    }

    #[tokio::test]
    async fn test_check_tenant_by_id_or_name() {
        let mock = MockOpenStackClient::new();
        let provisioner = test_provisioner(&mock);
        assert!(provisioner.check_tenant_by_id("team-a").await.unwrap_err().is_not_found());

        let tenant = mock.add_tenant("team-a");
        assert!(provisioner.check_tenant_by_id(&tenant.id).await.unwrap());
        assert!(provisioner.check_tenant_by_id("team-a").await.unwrap());
        assert!(!provisioner.check_tenant_by_id("team-b").await.unwrap());
    }

    #[tokio::test]
    async fn test_create_user_is_idempotent() {
        let mock = MockOpenStackClient::new();
        let tenant = mock.add_tenant("team-a");
        let provisioner = test_provisioner(&mock);

        provisioner.create_user("alice", "secret", &tenant.id).await.unwrap();
        provisioner.create_user("alice", "secret", &tenant.id).await.unwrap();
        assert_eq!(mock.users().len(), 1);
        assert_eq!(mock.users()[0].tenant_id.as_deref(), Some(tenant.id.as_str()));

        mock.fail_next("create_user", 500);
        assert!(provisioner.create_user("bob", "secret", &tenant.id).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_all_users_on_tenant() {
        let mock = MockOpenStackClient::new();
        let tenant = mock.add_tenant("team-a");
        let other = mock.add_tenant("team-b");
        mock.add_user("alice", &tenant.id);
        mock.add_user("bob", &tenant.id);
        let carol = mock.add_user("carol", &other.id);
        let store = InMemoryTenantStore::default();
        store.add("team-a", Some(&tenant.id));
        let provisioner = test_provisioner_with_store(&mock, &store);

        provisioner.delete_all_users_on_tenant("team-a").await.unwrap();
        assert_eq!(mock.users(), vec![carol]);
    }

    #[tokio::test]
    async fn test_delete_users_of_unresolvable_tenant_succeeds() {
        let mock = MockOpenStackClient::new();
        let store = InMemoryTenantStore::default();
        store.add("gone", None);
        let provisioner = test_provisioner_with_store(&mock, &store);

        provisioner.delete_all_users_on_tenant("gone").await.unwrap();
        provisioner.delete_all_users_on_tenant("never-recorded").await.unwrap();
        assert!(mock.mutating_calls().is_empty());
    }

    #[tokio::test]
    async fn test_delete_user_failure_propagates() {
        let mock = MockOpenStackClient::new();
        let tenant = mock.add_tenant("team-a");
        mock.add_user("alice", &tenant.id);
        mock.fail_next("delete_user", 500);
        let store = InMemoryTenantStore::default();
        store.add("team-a", Some(&tenant.id));
        let provisioner = test_provisioner_with_store(&mock, &store);

        assert!(provisioner.delete_all_users_on_tenant("team-a").await.is_err());
        assert_eq!(mock.users().len(), 1);
    }

    #[tokio::test]
    async fn test_tenant_name_is_matched_across_full_listing() {
        let mock = MockOpenStackClient::new();
        mock.add_tenant("team");
        let tenant = mock.add_tenant("team-a");
        mock.add_tenant("team-ab");
        let store = InMemoryTenantStore::default();
        store.add("team-a", None);
        let provisioner = test_provisioner_with_store(&mock, &store);

        assert_eq!(provisioner.tenant_id_from_name("team-a").await.unwrap(), tenant.id);

        provisioner.delete_tenant("team-a").await.unwrap();
        let mut left: Vec<String> = mock.tenants().into_iter().map(|t| t.name).collect();
        left.sort();
        assert_eq!(left, vec!["team", "team-ab"]);
        assert_eq!(mock.call_count("delete_tenant"), 1);
    }
}

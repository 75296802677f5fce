//! Tenant Custom Resource Definition
//!
//! Defines the cluster-scoped Kubernetes CRD that maps a logical tenant name
//! to its OpenStack tenant. tenantnet only ever reads these records.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// TenantSpec defines the desired state of a tenant
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[kube(
    group = "tenantnet.io",
    version = "v1",
    kind = "Tenant",
    plural = "tenants"
)]
#[serde(rename_all = "camelCase")]
pub struct TenantSpec {
    /// User created alongside the tenant
    #[serde(default)]
    pub user_name: String,

    /// Password of that user
    #[serde(default)]
    pub password: String,

    /// OpenStack tenant ID, when the tenant already exists in Keystone
    ///
    /// Empty or absent means "not yet resolved".
    #[serde(default, rename = "tenantID", skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

impl TenantSpec {
    /// The resolved OpenStack tenant ID, if one is recorded
    pub fn resolved_tenant_id(&self) -> Option<&str> {
        self.tenant_id.as_deref().filter(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::CustomResourceExt;

    #[test]
    fn test_tenant_is_cluster_scoped() {
        let crd = Tenant::crd();
        assert_eq!(crd.spec.scope, "Cluster");
        assert_eq!(crd.spec.group, "tenantnet.io");
        assert_eq!(crd.spec.names.kind, "Tenant");
    }

    #[test]
    fn test_empty_tenant_id_is_unresolved() {
        let spec: TenantSpec = serde_json::from_value(serde_json::json!({
            "userName": "alice",
            "password": "secret",
            "tenantID": ""
        }))
        .unwrap();
        assert_eq!(spec.resolved_tenant_id(), None);

        let spec: TenantSpec = serde_json::from_value(serde_json::json!({
            "userName": "alice",
            "tenantID": "abc123"
        }))
        .unwrap();
        assert_eq!(spec.resolved_tenant_id(), Some("abc123"));
    }
}

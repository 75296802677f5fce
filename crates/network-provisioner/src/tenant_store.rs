//! Read-only access to Tenant records
//!
//! A Tenant record may already carry the OpenStack tenant ID. When it does,
//! the provisioner trusts it and skips the Keystone lookup.

use crate::error::ProvisionError;
use async_trait::async_trait;
use crds::Tenant;
use kube::{Api, Client};
use tracing::debug;

/// The parts of a Tenant record the provisioner reads
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TenantRecord {
    pub name: String,
    pub user_name: String,
    /// Resolved OpenStack tenant ID; `None` when not yet recorded
    pub tenant_id: Option<String>,
}

/// Trait for looking up Tenant records
#[async_trait]
pub trait TenantStore: Send + Sync {
    async fn get_tenant(&self, name: &str) -> Result<TenantRecord, ProvisionError>;
}

/// `TenantStore` over the cluster-scoped Tenant custom resource
#[derive(Clone)]
pub struct KubeTenantStore {
    api: Api<Tenant>,
}

impl std::fmt::Debug for KubeTenantStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeTenantStore").finish()
    }
}

impl KubeTenantStore {
    pub fn new(client: Client) -> Self {
        Self { api: Api::all(client) }
    }
}

#[async_trait]
impl TenantStore for KubeTenantStore {
    async fn get_tenant(&self, name: &str) -> Result<TenantRecord, ProvisionError> {
        debug!("Reading Tenant record {}", name);
        let tenant = self
            .api
            .get_opt(name)
            .await?
            .ok_or_else(|| ProvisionError::TenantStore(format!("no Tenant record named {}", name)))?;

        Ok(TenantRecord {
            name: name.to_string(),
            tenant_id: tenant.spec.resolved_tenant_id().map(str::to_string),
            user_name: tenant.spec.user_name,
        })
    }
}

//! Identity operations
//!
//! Handles: tenants and users

use crate::error::ProvisionError;
use crate::provider::Provisioner;
use openstack_client::{CreateTenantRequest, CreateUserRequest};
use tracing::{debug, error, info, warn};

/// Description set on tenants created here
const TENANT_DESCRIPTION: &str = "tenantnet";

impl Provisioner {
    /// Resolve a tenant name to its OpenStack tenant ID
    ///
    /// System namespaces resolve as the system tenant. A tenant ID recorded
    /// on the Tenant record is returned without contacting Keystone.
    /// Otherwise the first Keystone tenant with that exact name wins;
    /// duplicate names are not an error here.
    pub async fn tenant_id_from_name(&self, name: &str) -> Result<String, ProvisionError> {
        let name = if self.settings.is_system_namespace(name) {
            self.settings.system_tenant.as_str()
        } else {
            name
        };

        let record = self.tenant_store.get_tenant(name).await?;
        if let Some(tenant_id) = record.tenant_id.filter(|id| !id.is_empty()) {
            debug!("Tenant {} has recorded tenant ID {}", name, tenant_id);
            return Ok(tenant_id);
        }

        let tenant = self.find_tenant_by_name(name).await?;
        debug!("Got tenant ID {} for tenant {}", tenant.id, name);
        Ok(tenant.id)
    }

    /// Create a tenant, tolerating one that already exists, and return its ID
    pub async fn create_tenant(&self, name: &str) -> Result<String, ProvisionError> {
        let request = CreateTenantRequest {
            name: name.to_string(),
            description: Some(TENANT_DESCRIPTION.to_string()),
            enabled: true,
        };

        match self.client.create_tenant(&request).await {
            Ok(tenant) => info!("Created tenant {} (ID: {})", name, tenant.id),
            Err(e) if e.is_conflict() => warn!("Tenant {} already exists, reusing it", name),
            Err(e) => {
                error!("Failed to create tenant {}: {}", name, e);
                return Err(e.into());
            }
        }

        self.tenant_id_from_name(name).await
    }

    /// Delete every tenant named exactly `name`
    pub async fn delete_tenant(&self, name: &str) -> Result<(), ProvisionError> {
        let tenants = self.client.list_tenants().await?;
        for tenant in tenants.iter().filter(|t| t.name == name) {
            if let Err(e) = self.client.delete_tenant(&tenant.id).await {
                error!("Failed to delete tenant {} (ID: {}): {}", name, tenant.id, e);
                return Err(e.into());
            }
            info!("Deleted tenant {} (ID: {})", name, tenant.id);
        }
        Ok(())
    }

    /// Whether any tenant has `id_or_name` as its ID or its name
    ///
    /// An empty tenant listing is `NotFound` rather than `false`.
    pub async fn check_tenant_by_id(&self, id_or_name: &str) -> Result<bool, ProvisionError> {
        let tenants = self.client.list_tenants().await?;
        if tenants.is_empty() {
            return Err(ProvisionError::not_found("Tenant", id_or_name));
        }
        Ok(tenants.iter().any(|t| t.id == id_or_name || t.name == id_or_name))
    }

    /// Create a user in a tenant, tolerating one that already exists
    pub async fn create_user(&self, name: &str, password: &str, tenant_id: &str) -> Result<(), ProvisionError> {
        let request = CreateUserRequest {
            name: name.to_string(),
            password: password.to_string(),
            tenant_id: tenant_id.to_string(),
            enabled: true,
        };

        match self.client.create_user(&request).await {
            Ok(user) => info!("Created user {} in tenant {} (ID: {})", name, tenant_id, user.id),
            Err(e) if e.is_conflict() => warn!("User {} already exists", name),
            Err(e) => {
                error!("Failed to create user {}: {}", name, e);
                return Err(e.into());
            }
        }
        Ok(())
    }

    /// Delete every user of a tenant
    ///
    /// A tenant that cannot be resolved has no users to delete, so resolution
    /// failures return `Ok(())`.
    pub async fn delete_all_users_on_tenant(&self, tenant_name: &str) -> Result<(), ProvisionError> {
        let tenant_id = match self.tenant_id_from_name(tenant_name).await {
            Ok(id) => id,
            Err(e) => {
                debug!("Tenant {} not resolvable, no users to delete: {}", tenant_name, e);
                return Ok(());
            }
        };

        for user in self.client.list_tenant_users(&tenant_id).await? {
            if let Err(e) = self.client.delete_user(&user.id).await {
                error!("Failed to delete user {}: {}", user.name, e);
                return Err(e.into());
            }
            info!("Deleted user {} of tenant {}", user.name, tenant_name);
        }
        Ok(())
    }
}

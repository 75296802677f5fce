//! Port operations
//!
//! Handles: port create/lookup/delete and host binding

use crate::error::ProvisionError;
use crate::provider::Provisioner;
use openstack_client::{CreatePortRequest, Port, UpdatePortBindingRequest};
use tracing::{debug, error, info};

impl Provisioner {
    /// Create a port bound to the local host
    ///
    /// The tenant's default security group is ensured first; if that fails no
    /// port is created. The port gets a fresh device ID, a `compute:<host>`
    /// device owner and exactly that one security group.
    pub async fn create_port(&self, network_id: &str, tenant_id: &str, name: &str) -> Result<Port, ProvisionError> {
        let security_group = match self.ensure_security_group(tenant_id).await {
            Ok(id) => id,
            Err(e) => {
                error!("Failed to ensure security group for tenant {}: {}", tenant_id, e);
                return Err(e);
            }
        };

        let host_id = self.settings.host_id.clone();
        let request = CreatePortRequest {
            network_id: network_id.to_string(),
            name: name.to_string(),
            tenant_id: tenant_id.to_string(),
            admin_state_up: self.settings.admin_state_up,
            device_id: uuid::Uuid::new_v4().to_string(),
            device_owner: format!("compute:{}", host_id),
            security_groups: vec![security_group],
            host_id,
        };

        match self.client.create_port(&request).await {
            Ok(port) => {
                info!("Created port {} on network {} (ID: {})", name, network_id, port.id);
                Ok(port)
            }
            Err(e) => {
                error!("Failed to create port {}: {}", name, e);
                Err(e.into())
            }
        }
    }

    /// Port by name; must be unique
    pub async fn get_port(&self, name: &str) -> Result<Port, ProvisionError> {
        self.find_port_by_name(name).await
    }

    /// Every port on `network_id` owned by `device_owner`
    ///
    /// An empty argument does not filter.
    pub async fn list_ports(&self, network_id: &str, device_owner: &str) -> Result<Vec<Port>, ProvisionError> {
        let ports = self
            .client
            .list_ports(&[("network_id", network_id), ("device_owner", device_owner)])
            .await?;
        Ok(ports
            .into_iter()
            .filter(|p| network_id.is_empty() || p.network_id == network_id)
            .filter(|p| device_owner.is_empty() || p.device_owner == device_owner)
            .collect())
    }

    /// Delete a port by name; a port that no longer exists is not an error
    pub async fn delete_port_by_name(&self, name: &str) -> Result<(), ProvisionError> {
        let port = match self.find_port_by_name(name).await {
            Ok(port) => port,
            Err(e) if e.is_not_found() => {
                debug!("Port {} already deleted", name);
                return Ok(());
            }
            Err(e) => {
                error!("Failed to look up port {}: {}", name, e);
                return Err(e);
            }
        };
        self.delete_port_by_id(&port.id).await
    }

    pub async fn delete_port_by_id(&self, id: &str) -> Result<(), ProvisionError> {
        if let Err(e) = self.client.delete_port(id).await {
            error!("Failed to delete port {}: {}", id, e);
            return Err(e.into());
        }
        info!("Deleted port {}", id);
        Ok(())
    }

    /// Rebind a port to the local host with a new device owner
    pub async fn update_ports_binding(&self, port_id: &str, device_owner: &str) -> Result<(), ProvisionError> {
        let request = UpdatePortBindingRequest {
            host_id: self.settings.host_id.clone(),
            device_owner: device_owner.to_string(),
        };
        self.client.update_port_binding(port_id, &request).await?;
        debug!("Bound port {} to host {} as {}", port_id, request.host_id, device_owner);
        Ok(())
    }
}

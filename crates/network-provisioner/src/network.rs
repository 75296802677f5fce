//! Network operations
//!
//! A provider network is backed by four kinds of Neutron resources: the
//! network, a companion router named after it (gateway on the external
//! network), one subnet per requested subnet, and one router interface per
//! subnet. Neutron has no transaction spanning them, so creation and
//! teardown both run as sagas:
//!
//! - creation: network, router, then subnet + interface for each subnet;
//!   any failure undoes the completed steps in reverse order
//! - teardown: ports (best effort), then the companion router is located
//!   by name, then per subnet interface + subnet, then router and network;
//!   any failure stops the teardown, and calling it again picks up from
//!   what is left
//!
//! Undoing the network step runs the full teardown over the new network's
//! ID, so a router whose ID this call never learned (a failed or timed-out
//! create, or one left by an earlier attempt) is found by name and removed
//! with it.
//!
//! Nothing prevents two callers creating the same network name at once;
//! the second creation produces a duplicate that later by-name lookups
//! reject as `MultipleResults`.

use crate::config::Settings;
use crate::error::ProvisionError;
use crate::lookup::router_by_name;
use crate::provider::Provisioner;
use crate::saga::{Saga, SagaStep, StepPolicy};
use crate::status::NetworkStatus;
use crate::types::{Network, Subnet};
use async_trait::async_trait;
use openstack_client::{
    CreateNetworkRequest, CreateRouterRequest, CreateSubnetRequest, GatewayInfo,
    OpenStackClientTrait, DEVICE_OWNER_ROUTER_INTERFACE,
};
use tracing::{debug, error, info, warn};

/// Backend IDs of a network, its companion router and its subnets
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NetworkTopology {
    pub name: String,
    pub network_id: String,
    /// `None` when the router was never created or is already gone
    pub router_id: Option<String>,
    pub subnet_ids: Vec<String>,
}

/// State threaded through the creation saga
#[derive(Debug, Clone)]
pub(crate) struct Provisioning {
    pub network: Network,
    pub topology: NetworkTopology,
}

impl Provisioner {
    /// Create a network with its companion router and all of its subnets
    ///
    /// On return, `network.uid` and `network.status` reflect the backend
    /// network even when a later step failed, and each created subnet has
    /// its `uid` set.
    ///
    /// # Returns
    /// * `Ok(())` - Every resource was created and every subnet attached
    /// * `Err(ProvisionError::Validation)` - `network.subnets` is empty; no
    ///   remote call was made
    /// * `Err(ProvisionError)` - The first failing step's error, after
    ///   everything created by this call was removed again
    pub async fn create_network(&self, network: &mut Network) -> Result<(), ProvisionError> {
        if network.subnets.is_empty() {
            return Err(ProvisionError::Validation(format!(
                "network {} has no subnets",
                network.name
            )));
        }

        info!("Creating network {} for tenant {}", network.name, network.tenant_id);
        let saga = creation_saga(&*self.client, &self.settings, network.subnets.len());
        let mut state = Provisioning {
            network: network.clone(),
            topology: NetworkTopology {
                name: network.name.clone(),
                ..Default::default()
            },
        };

        let result = saga.execute(&mut state).await;
        *network = state.network;

        match &result {
            Ok(()) => info!("Created network {} (ID: {})", network.name, network.uid),
            Err(e) => error!("Failed to create network {}: {}", network.name, e),
        }
        result
    }

    /// Subnet reconciliation is not supported
    pub async fn update_network(&self, network: &Network) -> Result<(), ProvisionError> {
        debug!("Update requested for network {}", network.name);
        Err(ProvisionError::NotImplemented("update_network"))
    }

    /// Delete a network and everything hanging off it
    ///
    /// A network that does not exist is already deleted. A missing router
    /// is tolerated, since an earlier partial teardown may have removed it.
    pub async fn delete_network(&self, name: &str) -> Result<(), ProvisionError> {
        let network = match self.find_network_by_name(name).await {
            Ok(network) => network,
            Err(e) if e.is_not_found() => {
                debug!("Network {} already deleted", name);
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let mut topology = NetworkTopology {
            name: name.to_string(),
            network_id: network.id,
            router_id: None,
            subnet_ids: network.subnets,
        };
        teardown_saga(&*self.client, &topology)
            .execute(&mut topology)
            .await?;

        info!("Deleted network {}", name);
        Ok(())
    }

    pub async fn get_network_by_id(&self, id: &str) -> Result<Network, ProvisionError> {
        let network = self.find_network_by_id(id).await?;
        self.to_provider_network(network).await
    }

    pub async fn get_network_by_name(&self, name: &str) -> Result<Network, ProvisionError> {
        let network = self.find_network_by_name(name).await?;
        self.to_provider_network(network).await
    }

    /// The tenant's network; tenants own at most one
    pub async fn get_network_by_tenant_id(&self, tenant_id: &str) -> Result<Network, ProvisionError> {
        let network = self.find_network_by_tenant(tenant_id).await?;
        self.to_provider_network(network).await
    }

    pub async fn get_provider_subnet(&self, id: &str) -> Result<Subnet, ProvisionError> {
        match self.client.get_subnet(id).await {
            Ok(subnet) => Ok(Subnet::from(subnet)),
            Err(e) => {
                error!("Failed to get subnet {}: {}", id, e);
                Err(e.into())
            }
        }
    }

    async fn to_provider_network(&self, network: openstack_client::Network) -> Result<Network, ProvisionError> {
        let mut subnets = Vec::with_capacity(network.subnets.len());
        for subnet_id in &network.subnets {
            subnets.push(self.get_provider_subnet(subnet_id).await?);
        }

        Ok(Network {
            uid: network.id,
            name: network.name,
            tenant_id: network.tenant_id,
            status: NetworkStatus::from_backend(&network.status),
            subnets,
        })
    }
}

/// Steps that create a network with `subnets` subnets
pub(crate) fn creation_saga<'a>(
    client: &'a dyn OpenStackClientTrait,
    settings: &'a Settings,
    subnets: usize,
) -> Saga<'a, Provisioning> {
    let mut saga = Saga::new("create-network")
        .step(CreateNetworkStep { client, admin_state_up: settings.admin_state_up })
        .step(CreateRouterStep { client, ext_net_id: &settings.ext_net_id });

    for index in 0..subnets {
        saga.push(CreateSubnetStep { client, index });
        saga.push(AttachInterfaceStep { client, index });
    }
    saga
}

/// Steps that tear down `topology`, in dependency order
pub(crate) fn teardown_saga<'a>(
    client: &'a dyn OpenStackClientTrait,
    topology: &NetworkTopology,
) -> Saga<'a, NetworkTopology> {
    let mut saga = Saga::new("delete-network")
        .step(SweepPortsStep { client })
        .step(FindRouterStep { client });

    for subnet_id in &topology.subnet_ids {
        saga.push(DetachInterfaceStep { client, subnet_id: subnet_id.clone() });
        saga.push(DeleteSubnetStep { client, subnet_id: subnet_id.clone() });
    }

    saga.step(DeleteRouterStep { client })
        .step(DeleteNetworkStep { client })
}

async fn delete_network_by_id(client: &dyn OpenStackClientTrait, id: &str) -> Result<(), ProvisionError> {
    client.delete_network(id).await?;
    info!("Deleted network {}", id);
    Ok(())
}

async fn delete_router_by_id(client: &dyn OpenStackClientTrait, id: &str) -> Result<(), ProvisionError> {
    client.delete_router(id).await?;
    info!("Deleted router {}", id);
    Ok(())
}

async fn delete_subnet_by_id(client: &dyn OpenStackClientTrait, id: &str) -> Result<(), ProvisionError> {
    client.delete_subnet(id).await?;
    info!("Deleted subnet {}", id);
    Ok(())
}

async fn detach_interface(client: &dyn OpenStackClientTrait, router_id: &str, subnet_id: &str) -> Result<(), ProvisionError> {
    client.remove_router_interface(router_id, subnet_id).await?;
    info!("Detached subnet {} from router {}", subnet_id, router_id);
    Ok(())
}

fn router_of(topology: &NetworkTopology) -> Result<&str, ProvisionError> {
    topology
        .router_id
        .as_deref()
        .ok_or_else(|| ProvisionError::not_found("Router", &topology.name))
}

fn subnet_at(network: &mut Network, index: usize) -> Result<&mut Subnet, ProvisionError> {
    let name = network.name.clone();
    network
        .subnets
        .get_mut(index)
        .ok_or_else(|| ProvisionError::Validation(format!("network {} has no subnet #{}", name, index)))
}

// Creation steps

struct CreateNetworkStep<'a> {
    client: &'a dyn OpenStackClientTrait,
    admin_state_up: bool,
}

#[async_trait]
impl<'a> SagaStep<Provisioning> for CreateNetworkStep<'a> {
    fn name(&self) -> String {
        "create network".to_string()
    }

    async fn action(&self, state: &mut Provisioning) -> Result<(), ProvisionError> {
        let request = CreateNetworkRequest {
            name: state.network.name.clone(),
            tenant_id: state.network.tenant_id.clone(),
            admin_state_up: self.admin_state_up,
        };
        let created = self.client.create_network(&request).await?;
        info!("Created network {} (ID: {}, status: {})", created.name, created.id, created.status);

        state.network.uid = created.id.clone();
        state.network.status = NetworkStatus::from_backend(&created.status);
        state.topology.network_id = created.id;
        Ok(())
    }

    async fn undo(&self, state: &mut Provisioning) -> Result<(), ProvisionError> {
        let mut topology = NetworkTopology {
            name: state.topology.name.clone(),
            network_id: state.topology.network_id.clone(),
            router_id: None,
            subnet_ids: state.topology.subnet_ids.clone(),
        };
        teardown_saga(self.client, &topology)
            .execute(&mut topology)
            .await
    }
}

struct CreateRouterStep<'a> {
    client: &'a dyn OpenStackClientTrait,
    ext_net_id: &'a str,
}

#[async_trait]
impl<'a> SagaStep<Provisioning> for CreateRouterStep<'a> {
    fn name(&self) -> String {
        "create router".to_string()
    }

    async fn action(&self, state: &mut Provisioning) -> Result<(), ProvisionError> {
        let request = CreateRouterRequest {
            name: state.network.name.clone(),
            tenant_id: state.network.tenant_id.clone(),
            external_gateway_info: GatewayInfo {
                network_id: self.ext_net_id.to_string(),
            },
        };
        let router = self.client.create_router(&request).await?;
        info!("Created router {} (ID: {})", router.name, router.id);
        state.topology.router_id = Some(router.id);
        Ok(())
    }

    async fn undo(&self, state: &mut Provisioning) -> Result<(), ProvisionError> {
        match state.topology.router_id.take() {
            Some(id) => delete_router_by_id(self.client, &id).await,
            None => Ok(()),
        }
    }
}

struct CreateSubnetStep<'a> {
    client: &'a dyn OpenStackClientTrait,
    index: usize,
}

#[async_trait]
impl<'a> SagaStep<Provisioning> for CreateSubnetStep<'a> {
    fn name(&self) -> String {
        format!("create subnet #{}", self.index)
    }

    async fn action(&self, state: &mut Provisioning) -> Result<(), ProvisionError> {
        let network_id = state.topology.network_id.clone();
        let tenant_id = state.network.tenant_id.clone();
        let subnet = subnet_at(&mut state.network, self.index)?;

        let request = CreateSubnetRequest {
            network_id,
            name: subnet.name.clone(),
            cidr: subnet.cidr.clone(),
            ip_version: 4,
            tenant_id,
            gateway_ip: Some(subnet.gateway.clone()).filter(|g| !g.is_empty()),
            dns_nameservers: subnet.dns_servers.clone(),
            host_routes: subnet.host_routes(),
        };
        let created = self.client.create_subnet(&request).await?;
        info!("Created subnet {} {} (ID: {})", created.name, created.cidr, created.id);

        subnet.uid = created.id.clone();
        state.topology.subnet_ids.push(created.id);
        Ok(())
    }

    async fn undo(&self, state: &mut Provisioning) -> Result<(), ProvisionError> {
        let subnet_id = subnet_at(&mut state.network, self.index)?.uid.clone();
        delete_subnet_by_id(self.client, &subnet_id).await?;
        state.topology.subnet_ids.retain(|id| *id != subnet_id);
        Ok(())
    }
}

struct AttachInterfaceStep<'a> {
    client: &'a dyn OpenStackClientTrait,
    index: usize,
}

#[async_trait]
impl<'a> SagaStep<Provisioning> for AttachInterfaceStep<'a> {
    fn name(&self) -> String {
        format!("attach subnet #{}", self.index)
    }

    async fn action(&self, state: &mut Provisioning) -> Result<(), ProvisionError> {
        let router_id = router_of(&state.topology)?.to_string();
        let subnet_id = subnet_at(&mut state.network, self.index)?.uid.clone();
        let interface = self.client.add_router_interface(&router_id, &subnet_id).await?;
        info!("Attached subnet {} to router {} (port {})", subnet_id, router_id, interface.port_id);
        Ok(())
    }

    async fn undo(&self, state: &mut Provisioning) -> Result<(), ProvisionError> {
        let router_id = router_of(&state.topology)?.to_string();
        let subnet_id = subnet_at(&mut state.network, self.index)?.uid.clone();
        detach_interface(self.client, &router_id, &subnet_id).await
    }
}

// Teardown steps

/// Delete every port on the network except router interfaces
///
/// Router interface ports go away with their interface. A port that fails
/// to delete is logged and left for the network delete to report.
struct SweepPortsStep<'a> {
    client: &'a dyn OpenStackClientTrait,
}

#[async_trait]
impl<'a> SagaStep<NetworkTopology> for SweepPortsStep<'a> {
    fn name(&self) -> String {
        "delete ports".to_string()
    }

    fn policy(&self) -> StepPolicy {
        StepPolicy::BestEffort
    }

    async fn action(&self, state: &mut NetworkTopology) -> Result<(), ProvisionError> {
        let ports = self
            .client
            .list_ports(&[("network_id", state.network_id.as_str())])
            .await?;

        for port in ports
            .iter()
            .filter(|p| p.network_id == state.network_id)
            .filter(|p| p.device_owner != DEVICE_OWNER_ROUTER_INTERFACE)
        {
            match self.client.delete_port(&port.id).await {
                Ok(()) => info!("Deleted port {} ({}) of network {}", port.name, port.id, state.name),
                Err(e) => error!("Failed to delete port {} of network {}: {}", port.id, state.name, e),
            }
        }
        Ok(())
    }
}

/// Locate the companion router by name unless its ID is already known
///
/// A missing router is tolerated, since an earlier partial teardown may
/// have removed it.
struct FindRouterStep<'a> {
    client: &'a dyn OpenStackClientTrait,
}

#[async_trait]
impl<'a> SagaStep<NetworkTopology> for FindRouterStep<'a> {
    fn name(&self) -> String {
        "find router".to_string()
    }

    async fn action(&self, state: &mut NetworkTopology) -> Result<(), ProvisionError> {
        if state.router_id.is_some() {
            return Ok(());
        }
        match router_by_name(self.client, &state.name).await {
            Ok(router) => state.router_id = Some(router.id),
            Err(e) if e.is_not_found() => {
                warn!("Router {} not found, tearing down network without it", state.name);
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }
}

struct DetachInterfaceStep<'a> {
    client: &'a dyn OpenStackClientTrait,
    subnet_id: String,
}

#[async_trait]
impl<'a> SagaStep<NetworkTopology> for DetachInterfaceStep<'a> {
    fn name(&self) -> String {
        format!("detach subnet {}", self.subnet_id)
    }

    async fn action(&self, state: &mut NetworkTopology) -> Result<(), ProvisionError> {
        let Some(router_id) = state.router_id.as_deref() else {
            return Ok(());
        };
        match self.client.remove_router_interface(router_id, &self.subnet_id).await {
            Ok(_) => {
                info!("Detached subnet {} from router {}", self.subnet_id, router_id);
                Ok(())
            }
            // Detached by an earlier teardown that failed further on
            Err(e) if e.is_not_found() => {
                debug!("Subnet {} is not attached to router {}", self.subnet_id, router_id);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

struct DeleteSubnetStep<'a> {
    client: &'a dyn OpenStackClientTrait,
    subnet_id: String,
}

#[async_trait]
impl<'a> SagaStep<NetworkTopology> for DeleteSubnetStep<'a> {
    fn name(&self) -> String {
        format!("delete subnet {}", self.subnet_id)
    }

    async fn action(&self, state: &mut NetworkTopology) -> Result<(), ProvisionError> {
        delete_subnet_by_id(self.client, &self.subnet_id).await?;
        state.subnet_ids.retain(|id| *id != self.subnet_id);
        Ok(())
    }
}

struct DeleteRouterStep<'a> {
    client: &'a dyn OpenStackClientTrait,
}

#[async_trait]
impl<'a> SagaStep<NetworkTopology> for DeleteRouterStep<'a> {
    fn name(&self) -> String {
        "delete router".to_string()
    }

    async fn action(&self, state: &mut NetworkTopology) -> Result<(), ProvisionError> {
        if let Some(router_id) = state.router_id.take() {
            if let Err(e) = delete_router_by_id(self.client, &router_id).await {
                state.router_id = Some(router_id);
                return Err(e);
            }
        }
        Ok(())
    }
}

struct DeleteNetworkStep<'a> {
    client: &'a dyn OpenStackClientTrait,
}

#[async_trait]
impl<'a> SagaStep<NetworkTopology> for DeleteNetworkStep<'a> {
    fn name(&self) -> String {
        "delete network".to_string()
    }

    async fn action(&self, state: &mut NetworkTopology) -> Result<(), ProvisionError> {
        delete_network_by_id(self.client, &state.network_id).await
    }
}

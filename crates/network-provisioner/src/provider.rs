//! The provisioner and its public operation surface.
//!
//! `Provisioner` owns the backend client, the tenant store and the runtime
//! settings. Its operations are implemented across domain modules:
//! - `identity`: tenants and users
//! - `security`: the per-tenant default security group
//! - `network`: network creation and teardown
//! - `port`: ports and host binding
//! - `load_balancer`: delegation to an injected provider

use crate::config::{Config, Settings};
use crate::error::ProvisionError;
use crate::load_balancer::{LoadBalancer, LoadBalancerProvider, LoadBalancerStatus};
use crate::tenant_store::{KubeTenantStore, TenantStore};
use crate::types::{Network, Subnet};
use async_trait::async_trait;
use openstack_client::{OpenStackClient, OpenStackClientTrait, Port};
use tracing::info;

/// Provisions tenants, networks and ports against OpenStack.
pub struct Provisioner {
    pub(crate) client: Box<dyn OpenStackClientTrait + Send + Sync>,
    pub(crate) tenant_store: Box<dyn TenantStore + Send + Sync>,
    pub(crate) load_balancers: Option<Box<dyn LoadBalancerProvider + Send + Sync>>,
    pub(crate) settings: Settings,
}

impl std::fmt::Debug for Provisioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provisioner")
            .field("settings", &self.settings)
            .field("load_balancers", &self.load_balancers.is_some())
            .finish()
    }
}

impl Provisioner {
    pub fn new(
        client: Box<dyn OpenStackClientTrait + Send + Sync>,
        tenant_store: Box<dyn TenantStore + Send + Sync>,
        settings: Settings,
    ) -> Self {
        Self {
            client,
            tenant_store,
            load_balancers: None,
            settings,
        }
    }

    /// Authenticate to OpenStack and connect to the cluster
    ///
    /// # Returns
    /// * `Ok(Provisioner)` - Ready to serve operations
    /// * `Err(ProvisionError)` - Invalid configuration, failed Keystone
    ///   authentication, or no usable Kubernetes client configuration
    pub async fn from_config(config: &Config) -> Result<Self, ProvisionError> {
        config.validate()?;
        let settings = config.settings()?;

        let client = OpenStackClient::authenticate(&config.auth_options()).await?;
        info!(
            "Connected to OpenStack: identity {}, network {} (region '{}')",
            client.identity_url(),
            client.network_url(),
            client.region()
        );

        let kube_client = kube::Client::try_default().await?;
        Ok(Self::new(
            Box::new(client),
            Box::new(KubeTenantStore::new(kube_client)),
            settings,
        ))
    }

    /// Attach the load balancer backend
    pub fn with_load_balancer_provider(mut self, provider: Box<dyn LoadBalancerProvider + Send + Sync>) -> Self {
        self.load_balancers = Some(provider);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn plugin_name(&self) -> &str {
        &self.settings.plugin_name
    }

    pub fn integration_bridge(&self) -> &str {
        &self.settings.integration_bridge
    }
}

/// Operations offered to the orchestration layer
///
/// Implemented by [`Provisioner`]; callers hold a `dyn NetworkProvider` so
/// they can substitute their own in tests.
#[async_trait]
pub trait NetworkProvider: Send + Sync {
    // Identity Operations
    async fn create_tenant(&self, name: &str) -> Result<String, ProvisionError>;
    async fn delete_tenant(&self, name: &str) -> Result<(), ProvisionError>;
    async fn tenant_id_from_name(&self, name: &str) -> Result<String, ProvisionError>;
    async fn check_tenant_by_id(&self, id_or_name: &str) -> Result<bool, ProvisionError>;
    async fn create_user(&self, name: &str, password: &str, tenant_id: &str) -> Result<(), ProvisionError>;
    async fn delete_all_users_on_tenant(&self, tenant_name: &str) -> Result<(), ProvisionError>;

    // Network Operations
    async fn create_network(&self, network: &mut Network) -> Result<(), ProvisionError>;
    async fn get_network_by_id(&self, id: &str) -> Result<Network, ProvisionError>;
    async fn get_network_by_name(&self, name: &str) -> Result<Network, ProvisionError>;
    async fn update_network(&self, network: &Network) -> Result<(), ProvisionError>;
    async fn delete_network(&self, name: &str) -> Result<(), ProvisionError>;
    async fn get_provider_subnet(&self, id: &str) -> Result<Subnet, ProvisionError>;

    // Port Operations
    async fn create_port(&self, network_id: &str, tenant_id: &str, name: &str) -> Result<Port, ProvisionError>;
    async fn get_port(&self, name: &str) -> Result<Port, ProvisionError>;
    async fn list_ports(&self, network_id: &str, device_owner: &str) -> Result<Vec<Port>, ProvisionError>;
    async fn delete_port_by_name(&self, name: &str) -> Result<(), ProvisionError>;
    async fn delete_port_by_id(&self, id: &str) -> Result<(), ProvisionError>;
    async fn update_ports_binding(&self, port_id: &str, device_owner: &str) -> Result<(), ProvisionError>;

    // Load Balancer Operations
    async fn load_balancer_exists(&self, name: &str) -> Result<bool, ProvisionError>;
    async fn ensure_load_balancer(&self, lb: &LoadBalancer) -> Result<LoadBalancerStatus, ProvisionError>;
    async fn ensure_load_balancer_deleted(&self, name: &str) -> Result<(), ProvisionError>;

    // Plugin settings
    fn plugin_name(&self) -> &str;
    fn integration_bridge(&self) -> &str;
}

#[async_trait]
impl NetworkProvider for Provisioner {
    async fn create_tenant(&self, name: &str) -> Result<String, ProvisionError> {
        Provisioner::create_tenant(self, name).await
    }

    async fn delete_tenant(&self, name: &str) -> Result<(), ProvisionError> {
        Provisioner::delete_tenant(self, name).await
    }

    async fn tenant_id_from_name(&self, name: &str) -> Result<String, ProvisionError> {
        Provisioner::tenant_id_from_name(self, name).await
    }

    async fn check_tenant_by_id(&self, id_or_name: &str) -> Result<bool, ProvisionError> {
        Provisioner::check_tenant_by_id(self, id_or_name).await
    }

    async fn create_user(&self, name: &str, password: &str, tenant_id: &str) -> Result<(), ProvisionError> {
        Provisioner::create_user(self, name, password, tenant_id).await
    }

    async fn delete_all_users_on_tenant(&self, tenant_name: &str) -> Result<(), ProvisionError> {
        Provisioner::delete_all_users_on_tenant(self, tenant_name).await
    }

    async fn create_network(&self, network: &mut Network) -> Result<(), ProvisionError> {
        Provisioner::create_network(self, network).await
    }

    async fn get_network_by_id(&self, id: &str) -> Result<Network, ProvisionError> {
        Provisioner::get_network_by_id(self, id).await
    }

    async fn get_network_by_name(&self, name: &str) -> Result<Network, ProvisionError> {
        Provisioner::get_network_by_name(self, name).await
    }

    async fn update_network(&self, network: &Network) -> Result<(), ProvisionError> {
        Provisioner::update_network(self, network).await
    }

    async fn delete_network(&self, name: &str) -> Result<(), ProvisionError> {
        Provisioner::delete_network(self, name).await
    }

    async fn get_provider_subnet(&self, id: &str) -> Result<Subnet, ProvisionError> {
        Provisioner::get_provider_subnet(self, id).await
    }

    async fn create_port(&self, network_id: &str, tenant_id: &str, name: &str) -> Result<Port, ProvisionError> {
        Provisioner::create_port(self, network_id, tenant_id, name).await
    }

    async fn get_port(&self, name: &str) -> Result<Port, ProvisionError> {
        Provisioner::get_port(self, name).await
    }

    async fn list_ports(&self, network_id: &str, device_owner: &str) -> Result<Vec<Port>, ProvisionError> {
        Provisioner::list_ports(self, network_id, device_owner).await
    }

    async fn delete_port_by_name(&self, name: &str) -> Result<(), ProvisionError> {
        Provisioner::delete_port_by_name(self, name).await
    }

    async fn delete_port_by_id(&self, id: &str) -> Result<(), ProvisionError> {
        Provisioner::delete_port_by_id(self, id).await
    }

    async fn update_ports_binding(&self, port_id: &str, device_owner: &str) -> Result<(), ProvisionError> {
        Provisioner::update_ports_binding(self, port_id, device_owner).await
    }

    async fn load_balancer_exists(&self, name: &str) -> Result<bool, ProvisionError> {
        Provisioner::load_balancer_exists(self, name).await
    }

    async fn ensure_load_balancer(&self, lb: &LoadBalancer) -> Result<LoadBalancerStatus, ProvisionError> {
        Provisioner::ensure_load_balancer(self, lb).await
    }

    async fn ensure_load_balancer_deleted(&self, name: &str) -> Result<(), ProvisionError> {
        Provisioner::ensure_load_balancer_deleted(self, name).await
    }

    fn plugin_name(&self) -> &str {
        Provisioner::plugin_name(self)
    }

    fn integration_bridge(&self) -> &str {
        Provisioner::integration_bridge(self)
    }
}

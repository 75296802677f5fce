//! OpenStack API client
//!
//! Implements the Keystone v2 identity API (tenants, users) and the Neutron v2
//! networking API (networks, routers, subnets, ports, security groups).

use crate::common::query::query_resources;
use crate::common::HttpClient;
use crate::error::OpenStackError;
use crate::models::*;
use crate::openstack_trait::OpenStackClientTrait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

/// Password credentials used to obtain a token
#[derive(Debug, Clone)]
pub struct AuthOptions {
    /// Keystone endpoint, e.g. "http://keystone:5000/v2.0"
    pub auth_url: String,
    pub username: String,
    pub password: String,
    pub tenant_name: String,
    /// Region used to pick the network endpoint; empty matches any region
    pub region: String,
}

/// OpenStack API client
///
/// Identity calls go to the catalog's admin endpoint; network calls go to
/// the public endpoint of the configured region.
#[derive(Debug, Clone)]
pub struct OpenStackClient {
    identity: HttpClient,
    network: HttpClient,
    region: String,
}

impl OpenStackClient {
    /// Authenticate with password credentials and resolve service endpoints
    ///
    /// # Arguments
    /// * `opts` - Keystone URL, credentials, scope and region
    ///
    /// # Returns
    /// * `Ok(OpenStackClient)` - A client holding a scoped token
    /// * `Err(OpenStackError)` - If authentication fails or an endpoint is missing
    pub async fn authenticate(opts: &AuthOptions) -> Result<Self, OpenStackError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        let url = format!("{}/tokens", opts.auth_url.trim_end_matches('/'));
        debug!("Authenticating user {} against {}", opts.username, url);

        let body = serde_json::json!({
            "auth": {
                "passwordCredentials": {
                    "username": opts.username,
                    "password": opts.password,
                },
                "tenantName": opts.tenant_name,
            }
        });

        let response = client
            .post(&url)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OpenStackError::Authentication(format!(
                "{} - {}",
                status, body
            )));
        }

        let auth: AuthResponse = response.json().await?;
        let token = auth.access.token.id.clone();
        if let Some(expires) = auth.access.token.expires {
            debug!("Token expires at {}", expires);
        }

        let identity_url = find_endpoint(&auth.access.service_catalog, "identity", "", Endpoint::Admin)?;
        let network_url = find_endpoint(&auth.access.service_catalog, "network", &opts.region, Endpoint::Public)?;
        let network_url = format!("{}/v2.0", network_url.trim_end_matches('/'));

        info!("Authenticated to OpenStack: identity {}, network {}", identity_url, network_url);

        Ok(Self {
            identity: HttpClient::new(client.clone(), identity_url, token.clone()),
            network: HttpClient::new(client, network_url, token),
            region: opts.region.clone(),
        })
    }

    /// Region the network endpoint was selected for
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Identity endpoint in use
    pub fn identity_url(&self) -> &str {
        self.identity.base_url()
    }

    /// Network endpoint in use
    pub fn network_url(&self) -> &str {
        self.network.base_url()
    }
}

#[derive(Debug, Clone, Copy)]
enum Endpoint {
    Public,
    Admin,
}

/// Pick an endpoint URL of `service_type` from the catalog
fn find_endpoint(
    catalog: &[CatalogEntry],
    service_type: &str,
    region: &str,
    which: Endpoint,
) -> Result<String, OpenStackError> {
    catalog
        .iter()
        .filter(|entry| entry.service_type == service_type)
        .flat_map(|entry| entry.endpoints.iter())
        .filter(|ep| region.is_empty() || ep.region.as_deref() == Some(region))
        .find_map(|ep| match which {
            Endpoint::Public => ep.public_url.clone(),
            Endpoint::Admin => ep.admin_url.clone().or_else(|| ep.public_url.clone()),
        })
        .ok_or_else(|| {
            OpenStackError::InvalidResponse(format!(
                "no {} endpoint in service catalog (region '{}')",
                service_type, region
            ))
        })
}

#[async_trait::async_trait]
impl OpenStackClientTrait for OpenStackClient {
    async fn list_tenants(&self) -> Result<Vec<Tenant>, OpenStackError> {
        // `?name=` switches Keystone v2 to a single-tenant lookup, so never filter
        debug!("Querying all tenants");
        query_resources(&self.identity, "/tenants", "tenants", &[]).await
    }

    async fn create_tenant(&self, request: &CreateTenantRequest) -> Result<Tenant, OpenStackError> {
        self.identity
            .post("/tenants", "tenant", &serde_json::to_value(request)?)
            .await
    }

    async fn delete_tenant(&self, id: &str) -> Result<(), OpenStackError> {
        self.identity.delete(&format!("/tenants/{}", id)).await
    }

    async fn create_user(&self, request: &CreateUserRequest) -> Result<User, OpenStackError> {
        self.identity
            .post("/users", "user", &serde_json::to_value(request)?)
            .await
    }

    async fn list_tenant_users(&self, tenant_id: &str) -> Result<Vec<User>, OpenStackError> {
        query_resources(&self.identity, &format!("/tenants/{}/users", tenant_id), "users", &[]).await
    }

    async fn delete_user(&self, id: &str) -> Result<(), OpenStackError> {
        self.identity.delete(&format!("/users/{}", id)).await
    }

    async fn list_networks(&self, filters: &[(&str, &str)]) -> Result<Vec<Network>, OpenStackError> {
        debug!("Querying networks with filters: {:?}", filters);
        query_resources(&self.network, "/networks", "networks", filters).await
    }

    async fn create_network(&self, request: &CreateNetworkRequest) -> Result<Network, OpenStackError> {
        self.network
            .post("/networks", "network", &serde_json::to_value(request)?)
            .await
    }

    async fn delete_network(&self, id: &str) -> Result<(), OpenStackError> {
        self.network.delete(&format!("/networks/{}", id)).await
    }

    async fn list_routers(&self, filters: &[(&str, &str)]) -> Result<Vec<Router>, OpenStackError> {
        debug!("Querying routers with filters: {:?}", filters);
        query_resources(&self.network, "/routers", "routers", filters).await
    }

    async fn create_router(&self, request: &CreateRouterRequest) -> Result<Router, OpenStackError> {
        self.network
            .post("/routers", "router", &serde_json::to_value(request)?)
            .await
    }

    async fn delete_router(&self, id: &str) -> Result<(), OpenStackError> {
        self.network.delete(&format!("/routers/{}", id)).await
    }

    async fn add_router_interface(&self, router_id: &str, subnet_id: &str) -> Result<RouterInterface, OpenStackError> {
        self.network
            .put_raw(
                &format!("/routers/{}/add_router_interface", router_id),
                &serde_json::json!({ "subnet_id": subnet_id }),
            )
            .await
    }

    async fn remove_router_interface(&self, router_id: &str, subnet_id: &str) -> Result<RouterInterface, OpenStackError> {
        self.network
            .put_raw(
                &format!("/routers/{}/remove_router_interface", router_id),
                &serde_json::json!({ "subnet_id": subnet_id }),
            )
            .await
    }

    async fn get_subnet(&self, id: &str) -> Result<Subnet, OpenStackError> {
        self.network.get(&format!("/subnets/{}", id), "subnet").await
    }

    async fn create_subnet(&self, request: &CreateSubnetRequest) -> Result<Subnet, OpenStackError> {
        self.network
            .post("/subnets", "subnet", &serde_json::to_value(request)?)
            .await
    }

    async fn delete_subnet(&self, id: &str) -> Result<(), OpenStackError> {
        self.network.delete(&format!("/subnets/{}", id)).await
    }

    async fn list_ports(&self, filters: &[(&str, &str)]) -> Result<Vec<Port>, OpenStackError> {
        debug!("Querying ports with filters: {:?}", filters);
        query_resources(&self.network, "/ports", "ports", filters).await
    }

    async fn create_port(&self, request: &CreatePortRequest) -> Result<Port, OpenStackError> {
        self.network
            .post("/ports", "port", &serde_json::to_value(request)?)
            .await
    }

    async fn update_port_binding(&self, id: &str, request: &UpdatePortBindingRequest) -> Result<Port, OpenStackError> {
        self.network
            .put(&format!("/ports/{}", id), "port", &serde_json::to_value(request)?)
            .await
    }

    async fn delete_port(&self, id: &str) -> Result<(), OpenStackError> {
        self.network.delete(&format!("/ports/{}", id)).await
    }

    async fn list_security_groups(&self, filters: &[(&str, &str)]) -> Result<Vec<SecurityGroup>, OpenStackError> {
        query_resources(&self.network, "/security-groups", "security_groups", filters).await
    }

    async fn create_security_group(&self, request: &CreateSecurityGroupRequest) -> Result<SecurityGroup, OpenStackError> {
        self.network
            .post("/security-groups", "security_group", &serde_json::to_value(request)?)
            .await
    }

    async fn list_security_group_rules(&self, filters: &[(&str, &str)]) -> Result<Vec<SecurityGroupRule>, OpenStackError> {
        query_resources(&self.network, "/security-group-rules", "security_group_rules", filters).await
    }

    async fn create_security_group_rule(&self, request: &CreateSecurityGroupRuleRequest) -> Result<SecurityGroupRule, OpenStackError> {
        self.network
            .post("/security-group-rules", "security_group_rule", &serde_json::to_value(request)?)
            .await
    }
}

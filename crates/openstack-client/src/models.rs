//! OpenStack API models
//!
//! These models match the Keystone v2 (identity) and Neutron v2 (networking)
//! JSON representations. Request bodies are wrapped in their resource key
//! (`{"network": {...}}`) by the client, not by these types.

use serde::{Deserialize, Serialize};

/// Device owner Neutron assigns to ports created by `add_router_interface`.
pub const DEVICE_OWNER_ROUTER_INTERFACE: &str = "network:router_interface";

// Identity (Keystone v2)

/// Keystone v2 tenant (project)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Request body for creating a tenant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTenantRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub enabled: bool,
}

/// Keystone v2 user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(rename = "tenantId", default)]
    pub tenant_id: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Request body for creating a user
///
/// The password is write-only: no response model carries it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub password: String,
    #[serde(rename = "tenantId")]
    pub tenant_id: String,
    pub enabled: bool,
}

// Authentication

/// Response to `POST /tokens`
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub access: Access,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Access {
    pub token: Token,
    #[serde(rename = "serviceCatalog", default)]
    pub service_catalog: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Token {
    pub id: String,
    #[serde(default)]
    pub expires: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub endpoints: Vec<CatalogEndpoint>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEndpoint {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(rename = "publicURL", default)]
    pub public_url: Option<String>,
    #[serde(rename = "adminURL", default)]
    pub admin_url: Option<String>,
    #[serde(rename = "internalURL", default)]
    pub internal_url: Option<String>,
}

// Networking (Neutron v2)

/// Neutron network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub admin_state_up: bool,
    /// Subnet IDs
    #[serde(default)]
    pub subnets: Vec<String>,
}

/// Request body for creating a network
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNetworkRequest {
    pub name: String,
    pub tenant_id: String,
    pub admin_state_up: bool,
}

/// External gateway of a router
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayInfo {
    pub network_id: String,
}

/// Neutron router
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Router {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub external_gateway_info: Option<GatewayInfo>,
}

/// Request body for creating a router
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRouterRequest {
    pub name: String,
    pub tenant_id: String,
    pub external_gateway_info: GatewayInfo,
}

/// Response to `add_router_interface` / `remove_router_interface`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterInterface {
    #[serde(default)]
    pub id: String,
    pub subnet_id: String,
    pub port_id: String,
}

/// Static route announced to hosts on a subnet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostRoute {
    pub destination: String,
    pub nexthop: String,
}

/// Neutron subnet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subnet {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub network_id: String,
    #[serde(default)]
    pub tenant_id: String,
    pub cidr: String,
    #[serde(default)]
    pub gateway_ip: Option<String>,
    #[serde(default)]
    pub ip_version: u8,
    #[serde(default)]
    pub dns_nameservers: Vec<String>,
    #[serde(default)]
    pub host_routes: Vec<HostRoute>,
}

/// Request body for creating a subnet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubnetRequest {
    pub network_id: String,
    pub name: String,
    pub cidr: String,
    pub ip_version: u8,
    pub tenant_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_ip: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dns_nameservers: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub host_routes: Vec<HostRoute>,
}

/// Fixed IP of a port
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedIp {
    pub subnet_id: String,
    #[serde(default)]
    pub ip_address: String,
}

/// Neutron port, including the `binding` extension attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub network_id: String,
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub device_owner: String,
    #[serde(default)]
    pub admin_state_up: bool,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub mac_address: String,
    #[serde(default)]
    pub fixed_ips: Vec<FixedIp>,
    #[serde(default)]
    pub security_groups: Vec<String>,
    #[serde(rename = "binding:host_id", default)]
    pub host_id: String,
    #[serde(rename = "binding:vif_type", default)]
    pub vif_type: String,
}

/// Request body for creating a port bound to a host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePortRequest {
    pub network_id: String,
    pub name: String,
    pub tenant_id: String,
    pub admin_state_up: bool,
    pub device_id: String,
    pub device_owner: String,
    pub security_groups: Vec<String>,
    #[serde(rename = "binding:host_id")]
    pub host_id: String,
}

/// Request body for re-binding a port
///
/// Only the binding host and the device owner are touched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePortBindingRequest {
    #[serde(rename = "binding:host_id")]
    pub host_id: String,
    pub device_owner: String,
}

/// Neutron security group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub description: String,
}

/// Request body for creating a security group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSecurityGroupRequest {
    pub name: String,
    pub tenant_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Direction of a security group rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleDirection {
    Ingress,
    Egress,
}

impl RuleDirection {
    /// Value used in query filters
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleDirection::Ingress => "ingress",
            RuleDirection::Egress => "egress",
        }
    }
}

/// Ether type of a security group rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EtherType {
    IPv4,
    IPv6,
}

/// Neutron security group rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityGroupRule {
    pub id: String,
    pub security_group_id: String,
    #[serde(default)]
    pub tenant_id: String,
    pub direction: RuleDirection,
    pub ethertype: EtherType,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub port_range_min: Option<u16>,
    #[serde(default)]
    pub port_range_max: Option<u16>,
    #[serde(default)]
    pub remote_ip_prefix: Option<String>,
}

/// Request body for creating a security group rule
///
/// No protocol or port range: rules created here allow all traffic in
/// their direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSecurityGroupRuleRequest {
    pub tenant_id: String,
    pub security_group_id: String,
    pub direction: RuleDirection,
    pub ethertype: EtherType,
}

fn default_true() -> bool {
    true
}

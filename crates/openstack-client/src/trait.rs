//! OpenStackClient trait for mocking
//!
//! This trait abstracts the OpenStackClient to enable mocking in unit tests.
//! The concrete OpenStackClient implements this trait, and tests can use mock implementations.

use crate::error::OpenStackError;
use crate::models::*;

/// Trait for Keystone and Neutron API operations
///
/// Every `list_*` call enumerates all pages before returning. Filters are
/// passed to the backend as query parameters; callers must not assume the
/// backend honours them and should re-check matches locally.
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait OpenStackClientTrait: Send + Sync {
    // Identity Operations
    /// Every tenant; Keystone v2 has no filtered tenant listing
    async fn list_tenants(&self) -> Result<Vec<Tenant>, OpenStackError>;
    async fn create_tenant(&self, request: &CreateTenantRequest) -> Result<Tenant, OpenStackError>;
    async fn delete_tenant(&self, id: &str) -> Result<(), OpenStackError>;
    async fn create_user(&self, request: &CreateUserRequest) -> Result<User, OpenStackError>;
    async fn list_tenant_users(&self, tenant_id: &str) -> Result<Vec<User>, OpenStackError>;
    async fn delete_user(&self, id: &str) -> Result<(), OpenStackError>;

    // Network Operations
    async fn list_networks(&self, filters: &[(&str, &str)]) -> Result<Vec<Network>, OpenStackError>;
    async fn create_network(&self, request: &CreateNetworkRequest) -> Result<Network, OpenStackError>;
    async fn delete_network(&self, id: &str) -> Result<(), OpenStackError>;

    // Router Operations
    async fn list_routers(&self, filters: &[(&str, &str)]) -> Result<Vec<Router>, OpenStackError>;
    async fn create_router(&self, request: &CreateRouterRequest) -> Result<Router, OpenStackError>;
    async fn delete_router(&self, id: &str) -> Result<(), OpenStackError>;
    async fn add_router_interface(&self, router_id: &str, subnet_id: &str) -> Result<RouterInterface, OpenStackError>;
    async fn remove_router_interface(&self, router_id: &str, subnet_id: &str) -> Result<RouterInterface, OpenStackError>;

    // Subnet Operations
    async fn get_subnet(&self, id: &str) -> Result<Subnet, OpenStackError>;
    async fn create_subnet(&self, request: &CreateSubnetRequest) -> Result<Subnet, OpenStackError>;
    async fn delete_subnet(&self, id: &str) -> Result<(), OpenStackError>;

    // Port Operations
    async fn list_ports(&self, filters: &[(&str, &str)]) -> Result<Vec<Port>, OpenStackError>;
    async fn create_port(&self, request: &CreatePortRequest) -> Result<Port, OpenStackError>;
    async fn update_port_binding(&self, id: &str, request: &UpdatePortBindingRequest) -> Result<Port, OpenStackError>;
    async fn delete_port(&self, id: &str) -> Result<(), OpenStackError>;

    // Security Operations
    async fn list_security_groups(&self, filters: &[(&str, &str)]) -> Result<Vec<SecurityGroup>, OpenStackError>;
    async fn create_security_group(&self, request: &CreateSecurityGroupRequest) -> Result<SecurityGroup, OpenStackError>;
    async fn list_security_group_rules(&self, filters: &[(&str, &str)]) -> Result<Vec<SecurityGroupRule>, OpenStackError>;
    async fn create_security_group_rule(&self, request: &CreateSecurityGroupRuleRequest) -> Result<SecurityGroupRule, OpenStackError>;
}

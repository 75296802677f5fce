//! Mock OpenStackClient for unit testing
//!
//! This module provides a mock implementation of OpenStackClientTrait that can be used
//! in unit tests without requiring a running Keystone or Neutron.
//!
//! The mock is organized into domain-specific modules:
//! - `identity.rs` - Tenants and users
//! - `network.rs` - Networks, routers, subnets and ports
//! - `security.rs` - Security groups and rules
//!
//! Beyond storage, the mock enforces the referential conflicts Neutron
//! raises on out-of-order deletes, records every call, and can be told to
//! fail the N-th call of a given operation.

mod identity;
mod network;
mod security;

use crate::error::OpenStackError;
use crate::models::*;
use crate::openstack_trait::OpenStackClientTrait;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// A failure to inject on the `nth` (1-based) call of `op`
#[derive(Debug, Clone)]
struct InjectedFailure {
    op: String,
    nth: usize,
    status: u16,
}

/// Mock OpenStackClient for testing
///
/// This mock stores resources in memory, keyed by generated IDs that sort
/// in creation order, so listings are deterministic.
#[derive(Clone, Default)]
pub struct MockOpenStackClient {
    // In-memory storage for resources
    pub(crate) tenants: Arc<Mutex<BTreeMap<String, Tenant>>>,
    pub(crate) users: Arc<Mutex<BTreeMap<String, User>>>,
    pub(crate) networks: Arc<Mutex<BTreeMap<String, Network>>>,
    pub(crate) routers: Arc<Mutex<BTreeMap<String, Router>>>,
    pub(crate) subnets: Arc<Mutex<BTreeMap<String, Subnet>>>,
    pub(crate) ports: Arc<Mutex<BTreeMap<String, Port>>>,
    pub(crate) security_groups: Arc<Mutex<BTreeMap<String, SecurityGroup>>>,
    pub(crate) security_group_rules: Arc<Mutex<BTreeMap<String, SecurityGroupRule>>>,
    /// Status reported by `create_network`; "ACTIVE" when unset
    pub(crate) network_create_status: Arc<Mutex<Option<String>>>,
    // Call log and fault plan
    calls: Arc<Mutex<Vec<String>>>,
    failures: Arc<Mutex<Vec<InjectedFailure>>>,
    // Counter for generating IDs
    next_id: Arc<Mutex<u64>>,
}

impl std::fmt::Debug for MockOpenStackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockOpenStackClient")
            .field("calls", &self.calls.lock().unwrap().len())
            .finish()
    }
}

impl MockOpenStackClient {
    /// Create a new, empty mock client
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `nth` (1-based) call of `op` with an HTTP `status`
    pub fn fail_call(&self, op: &str, nth: usize, status: u16) {
        self.failures.lock().unwrap().push(InjectedFailure {
            op: op.to_string(),
            nth,
            status,
        });
    }

    /// Fail the next call of `op` with an HTTP `status`
    pub fn fail_next(&self, op: &str, status: u16) {
        let nth = self.call_count(op) + 1;
        self.fail_call(op, nth, status);
    }

    /// Status `create_network` reports for new networks
    pub fn set_network_create_status(&self, status: &str) {
        *self.network_create_status.lock().unwrap() = Some(status.to_string());
    }

    /// Every call made so far, by operation name, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls made to `op`
    pub fn call_count(&self, op: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.as_str() == op).count()
    }

    /// Calls that would change backend state (everything but `list_*`/`get_*`)
    pub fn mutating_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| !c.starts_with("list_") && !c.starts_with("get_"))
            .collect()
    }

    /// Forget recorded calls (the fault plan is kept)
    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Add a tenant to the mock store (for test setup); duplicates by name are allowed
    pub fn add_tenant(&self, name: &str) -> Tenant {
        let tenant = Tenant {
            id: self.next_id("tenant"),
            name: name.to_string(),
            description: None,
            enabled: true,
        };
        self.tenants.lock().unwrap().insert(tenant.id.clone(), tenant.clone());
        tenant
    }

    /// Add a user to the mock store (for test setup)
    pub fn add_user(&self, name: &str, tenant_id: &str) -> User {
        let user = User {
            id: self.next_id("user"),
            name: name.to_string(),
            tenant_id: Some(tenant_id.to_string()),
            enabled: true,
        };
        self.users.lock().unwrap().insert(user.id.clone(), user.clone());
        user
    }

    /// Add a network to the mock store (for test setup)
    pub fn add_network(&self, name: &str, tenant_id: &str) -> Network {
        let network = Network {
            id: self.next_id("network"),
            name: name.to_string(),
            tenant_id: tenant_id.to_string(),
            status: "ACTIVE".to_string(),
            admin_state_up: true,
            subnets: Vec::new(),
        };
        self.networks.lock().unwrap().insert(network.id.clone(), network.clone());
        network
    }

    /// Add a router to the mock store (for test setup)
    pub fn add_router(&self, name: &str, tenant_id: &str) -> Router {
        let router = Router {
            id: self.next_id("router"),
            name: name.to_string(),
            tenant_id: tenant_id.to_string(),
            status: "ACTIVE".to_string(),
            external_gateway_info: None,
        };
        self.routers.lock().unwrap().insert(router.id.clone(), router.clone());
        router
    }

    /// Add a plain port on a network to the mock store (for test setup)
    pub fn add_port(&self, name: &str, network_id: &str, device_owner: &str) -> Port {
        let port = Port {
            id: self.next_id("port"),
            name: name.to_string(),
            network_id: network_id.to_string(),
            tenant_id: String::new(),
            device_id: String::new(),
            device_owner: device_owner.to_string(),
            admin_state_up: true,
            status: "ACTIVE".to_string(),
            mac_address: String::new(),
            fixed_ips: Vec::new(),
            security_groups: Vec::new(),
            host_id: String::new(),
            vif_type: String::new(),
        };
        self.ports.lock().unwrap().insert(port.id.clone(), port.clone());
        port
    }

    /// Add a security group to the mock store (for test setup)
    pub fn add_security_group(&self, name: &str, tenant_id: &str) -> SecurityGroup {
        let group = SecurityGroup {
            id: self.next_id("secgroup"),
            name: name.to_string(),
            tenant_id: tenant_id.to_string(),
            description: String::new(),
        };
        self.security_groups.lock().unwrap().insert(group.id.clone(), group.clone());
        group
    }

    pub fn tenants(&self) -> Vec<Tenant> {
        self.tenants.lock().unwrap().values().cloned().collect()
    }

    pub fn users(&self) -> Vec<User> {
        self.users.lock().unwrap().values().cloned().collect()
    }

    pub fn networks(&self) -> Vec<Network> {
        self.networks.lock().unwrap().values().cloned().collect()
    }

    pub fn routers(&self) -> Vec<Router> {
        self.routers.lock().unwrap().values().cloned().collect()
    }

    pub fn subnets(&self) -> Vec<Subnet> {
        self.subnets.lock().unwrap().values().cloned().collect()
    }

    pub fn ports(&self) -> Vec<Port> {
        self.ports.lock().unwrap().values().cloned().collect()
    }

    pub fn security_groups(&self) -> Vec<SecurityGroup> {
        self.security_groups.lock().unwrap().values().cloned().collect()
    }

    pub fn security_group_rules(&self) -> Vec<SecurityGroupRule> {
        self.security_group_rules.lock().unwrap().values().cloned().collect()
    }

    /// Generate next ID
    pub(crate) fn next_id(&self, kind: &str) -> String {
        let mut id = self.next_id.lock().unwrap();
        *id += 1;
        format!("{}-{:06}", kind, *id)
    }

    /// Record a call to `op` and apply the fault plan
    pub(crate) fn begin(&self, op: &str) -> Result<(), OpenStackError> {
        let count = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(op.to_string());
            calls.iter().filter(|c| c.as_str() == op).count()
        };

        let failures = self.failures.lock().unwrap();
        match failures.iter().find(|f| f.op == op && f.nth == count) {
            Some(failure) => Err(OpenStackError::UnexpectedResponse {
                status: failure.status,
                body: format!("injected failure on {} call #{}", op, count),
            }),
            None => Ok(()),
        }
    }
}

/// Whether `item` satisfies every non-empty `(field, value)` filter
///
/// Fields are compared on the item's JSON representation, the way Neutron
/// compares query parameters against resource attributes.
pub(crate) fn matches_filters<T: Serialize>(item: &T, filters: &[(&str, &str)]) -> bool {
    let value = match serde_json::to_value(item) {
        Ok(v) => v,
        Err(_) => return false,
    };

    filters.iter().filter(|(_, v)| !v.is_empty()).all(|(key, expected)| {
        match value.get(*key) {
            Some(serde_json::Value::String(s)) => s == expected,
            Some(serde_json::Value::Bool(b)) => b.to_string() == *expected,
            Some(serde_json::Value::Number(n)) => n.to_string() == *expected,
            _ => false,
        }
    })
}

pub(crate) fn not_found(kind: &str, id: &str) -> OpenStackError {
    OpenStackError::NotFound(format!("{} {} not found", kind, id))
}

pub(crate) fn conflict(message: String) -> OpenStackError {
    OpenStackError::UnexpectedResponse {
        status: crate::error::STATUS_CODE_ALREADY_EXISTS,
        body: message,
    }
}

#[async_trait::async_trait]
impl OpenStackClientTrait for MockOpenStackClient {
    // Identity Operations - delegated to identity module
    async fn list_tenants(&self) -> Result<Vec<Tenant>, OpenStackError> {
        identity::list_tenants(self)
    }

    async fn create_tenant(&self, request: &CreateTenantRequest) -> Result<Tenant, OpenStackError> {
        identity::create_tenant(self, request)
    }

    async fn delete_tenant(&self, id: &str) -> Result<(), OpenStackError> {
        identity::delete_tenant(self, id)
    }

    async fn create_user(&self, request: &CreateUserRequest) -> Result<User, OpenStackError> {
        identity::create_user(self, request)
    }

    async fn list_tenant_users(&self, tenant_id: &str) -> Result<Vec<User>, OpenStackError> {
        identity::list_tenant_users(self, tenant_id)
    }

    async fn delete_user(&self, id: &str) -> Result<(), OpenStackError> {
        identity::delete_user(self, id)
    }

    // Network Operations - delegated to network module
    async fn list_networks(&self, filters: &[(&str, &str)]) -> Result<Vec<Network>, OpenStackError> {
        network::list_networks(self, filters)
    }

    async fn create_network(&self, request: &CreateNetworkRequest) -> Result<Network, OpenStackError> {
        network::create_network(self, request)
    }

    async fn delete_network(&self, id: &str) -> Result<(), OpenStackError> {
        network::delete_network(self, id)
    }

    async fn list_routers(&self, filters: &[(&str, &str)]) -> Result<Vec<Router>, OpenStackError> {
        network::list_routers(self, filters)
    }

    async fn create_router(&self, request: &CreateRouterRequest) -> Result<Router, OpenStackError> {
        network::create_router(self, request)
    }

    async fn delete_router(&self, id: &str) -> Result<(), OpenStackError> {
        network::delete_router(self, id)
    }

    async fn add_router_interface(&self, router_id: &str, subnet_id: &str) -> Result<RouterInterface, OpenStackError> {
        network::add_router_interface(self, router_id, subnet_id)
    }

    async fn remove_router_interface(&self, router_id: &str, subnet_id: &str) -> Result<RouterInterface, OpenStackError> {
        network::remove_router_interface(self, router_id, subnet_id)
    }

    async fn get_subnet(&self, id: &str) -> Result<Subnet, OpenStackError> {
        network::get_subnet(self, id)
    }

    async fn create_subnet(&self, request: &CreateSubnetRequest) -> Result<Subnet, OpenStackError> {
        network::create_subnet(self, request)
    }

    async fn delete_subnet(&self, id: &str) -> Result<(), OpenStackError> {
        network::delete_subnet(self, id)
    }

    async fn list_ports(&self, filters: &[(&str, &str)]) -> Result<Vec<Port>, OpenStackError> {
        network::list_ports(self, filters)
    }

    async fn create_port(&self, request: &CreatePortRequest) -> Result<Port, OpenStackError> {
        network::create_port(self, request)
    }

    async fn update_port_binding(&self, id: &str, request: &UpdatePortBindingRequest) -> Result<Port, OpenStackError> {
        network::update_port_binding(self, id, request)
    }

    async fn delete_port(&self, id: &str) -> Result<(), OpenStackError> {
        network::delete_port(self, id)
    }

    // Security Operations - delegated to security module
    async fn list_security_groups(&self, filters: &[(&str, &str)]) -> Result<Vec<SecurityGroup>, OpenStackError> {
        security::list_security_groups(self, filters)
    }

    async fn create_security_group(&self, request: &CreateSecurityGroupRequest) -> Result<SecurityGroup, OpenStackError> {
        security::create_security_group(self, request)
    }

    async fn list_security_group_rules(&self, filters: &[(&str, &str)]) -> Result<Vec<SecurityGroupRule>, OpenStackError> {
        security::list_security_group_rules(self, filters)
    }

    async fn create_security_group_rule(&self, request: &CreateSecurityGroupRuleRequest) -> Result<SecurityGroupRule, OpenStackError> {
        security::create_security_group_rule(self, request)
    }
}

//! Test utilities for unit testing the provisioner
//!
//! This module provides helpers for creating test data and setting up test scenarios.

use crate::config::{Settings, DEFAULT_SECURITY_GROUP_NAME, DEFAULT_SYSTEM_TENANT};
use crate::error::ProvisionError;
use crate::provider::Provisioner;
use crate::tenant_store::{TenantRecord, TenantStore};
use crate::types::{Network, Subnet};
use async_trait::async_trait;
use openstack_client::MockOpenStackClient;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const EXT_NET_ID: &str = "ext-net-0001";
pub const HOST_ID: &str = "node-1";

/// Settings used by every test provisioner
pub fn test_settings() -> Settings {
    Settings {
        ext_net_id: EXT_NET_ID.to_string(),
        security_group_name: DEFAULT_SECURITY_GROUP_NAME.to_string(),
        host_id: HOST_ID.to_string(),
        admin_state_up: true,
        system_tenant: DEFAULT_SYSTEM_TENANT.to_string(),
        system_namespaces: vec![
            "default".to_string(),
            "kube-system".to_string(),
            "kube-public".to_string(),
        ],
        plugin_name: "ovs".to_string(),
        integration_bridge: "br-int".to_string(),
    }
}

/// In-memory Tenant records, shared between clones
#[derive(Clone, Default)]
pub struct InMemoryTenantStore {
    records: Arc<Mutex<HashMap<String, TenantRecord>>>,
    reads: Arc<Mutex<usize>>,
}

impl InMemoryTenantStore {
    /// Add a record; `tenant_id` of `None` means "not yet resolved"
    pub fn add(&self, name: &str, tenant_id: Option<&str>) {
        self.records.lock().unwrap().insert(
            name.to_string(),
            TenantRecord {
                name: name.to_string(),
                user_name: format!("{}-user", name),
                tenant_id: tenant_id.map(str::to_string),
            },
        );
    }

    pub fn reads(&self) -> usize {
        *self.reads.lock().unwrap()
    }
}

#[async_trait]
impl TenantStore for InMemoryTenantStore {
    async fn get_tenant(&self, name: &str) -> Result<TenantRecord, ProvisionError> {
        *self.reads.lock().unwrap() += 1;
        self.records
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| ProvisionError::TenantStore(format!("no Tenant record named {}", name)))
    }
}

/// Provisioner over `mock` with an empty tenant store
pub fn test_provisioner(mock: &MockOpenStackClient) -> Provisioner {
    test_provisioner_with_store(mock, &InMemoryTenantStore::default())
}

/// Provisioner over `mock` and `store`; both handles stay usable for assertions
pub fn test_provisioner_with_store(mock: &MockOpenStackClient, store: &InMemoryTenantStore) -> Provisioner {
    Provisioner::new(Box::new(mock.clone()), Box::new(store.clone()), test_settings())
}

/// A network request with one subnet per CIDR; gateways are `.1`
pub fn test_network(name: &str, tenant_id: &str, cidrs: &[&str]) -> Network {
    Network {
        name: name.to_string(),
        tenant_id: tenant_id.to_string(),
        subnets: cidrs
            .iter()
            .enumerate()
            .map(|(i, cidr)| Subnet {
                name: format!("{}-subnet-{}", name, i),
                cidr: cidr.to_string(),
                gateway: gateway_of(cidr),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    }
}

fn gateway_of(cidr: &str) -> String {
    let network = cidr.split('/').next().unwrap_or(cidr);
    match network.rsplit_once('.') {
        Some((prefix, _)) => format!("{}.1", prefix),
        None => String::new(),
    }
}

//! Identity operations for MockOpenStackClient
//!
//! Handles tenants and users. Names are unique, as Keystone enforces.

use super::{MockOpenStackClient, conflict, not_found};
use crate::error::OpenStackError;
use crate::models::*;

pub fn list_tenants(client: &MockOpenStackClient) -> Result<Vec<Tenant>, OpenStackError> {
    client.begin("list_tenants")?;
    Ok(client.tenants.lock().unwrap().values().cloned().collect())
}

pub fn create_tenant(client: &MockOpenStackClient, request: &CreateTenantRequest) -> Result<Tenant, OpenStackError> {
    client.begin("create_tenant")?;
    let mut tenants = client.tenants.lock().unwrap();
    if tenants.values().any(|t| t.name == request.name) {
        return Err(conflict(format!("Tenant {} already exists", request.name)));
    }

    let tenant = Tenant {
        id: client.next_id("tenant"),
        name: request.name.clone(),
        description: request.description.clone(),
        enabled: request.enabled,
    };
    tenants.insert(tenant.id.clone(), tenant.clone());
    Ok(tenant)
}

pub fn delete_tenant(client: &MockOpenStackClient, id: &str) -> Result<(), OpenStackError> {
    client.begin("delete_tenant")?;
    client.tenants
        .lock()
        .unwrap()
        .remove(id)
        .map(|_| ())
        .ok_or_else(|| not_found("Tenant", id))
}

pub fn create_user(client: &MockOpenStackClient, request: &CreateUserRequest) -> Result<User, OpenStackError> {
    client.begin("create_user")?;
    let mut users = client.users.lock().unwrap();
    if users.values().any(|u| u.name == request.name) {
        return Err(conflict(format!("User {} already exists", request.name)));
    }

    let user = User {
        id: client.next_id("user"),
        name: request.name.clone(),
        tenant_id: Some(request.tenant_id.clone()),
        enabled: request.enabled,
    };
    users.insert(user.id.clone(), user.clone());
    Ok(user)
}

pub fn list_tenant_users(client: &MockOpenStackClient, tenant_id: &str) -> Result<Vec<User>, OpenStackError> {
    client.begin("list_tenant_users")?;
    if !client.tenants.lock().unwrap().contains_key(tenant_id) {
        return Err(not_found("Tenant", tenant_id));
    }
    let users = client.users.lock().unwrap();
    Ok(users
        .values()
        .filter(|u| u.tenant_id.as_deref() == Some(tenant_id))
        .cloned()
        .collect())
}

pub fn delete_user(client: &MockOpenStackClient, id: &str) -> Result<(), OpenStackError> {
    client.begin("delete_user")?;
    client.users
        .lock()
        .unwrap()
        .remove(id)
        .map(|_| ())
        .ok_or_else(|| not_found("User", id))
}

//! List-then-match resource lookup
//!
//! Neutron and Keystone list APIs accept filters but never promise a single
//! result, so every by-name lookup enumerates all pages, re-checks the
//! filter locally and then classifies the matches with [`select`].

use crate::error::ProvisionError;
use crate::provider::Provisioner;
use openstack_client::{Network, OpenStackClientTrait, Port, Router, SecurityGroup, Tenant};
use tracing::debug;

/// How many matches a lookup tolerates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Exactly one match, more is `MultipleResults`
    Unique,
    /// First match wins, duplicates are tolerated
    First,
}

/// Classify `items` matching `predicate`
///
/// Zero matches is `NotFound` in both modes.
pub fn select<T, P>(
    kind: &'static str,
    key: &str,
    items: Vec<T>,
    predicate: P,
    mode: MatchMode,
) -> Result<T, ProvisionError>
where
    P: Fn(&T) -> bool,
{
    let mut matches = items.into_iter().filter(|item| predicate(item));
    let first = matches
        .next()
        .ok_or_else(|| ProvisionError::not_found(kind, key))?;

    if mode == MatchMode::Unique && matches.next().is_some() {
        return Err(ProvisionError::multiple_results(kind, key));
    }
    Ok(first)
}

/// Router by exact name, for callers holding only a client
pub(crate) async fn router_by_name(client: &dyn OpenStackClientTrait, name: &str) -> Result<Router, ProvisionError> {
    debug!("Looking up router {}", name);
    let routers = client.list_routers(&[("name", name)]).await?;
    select("Router", name, routers, |r| r.name == name, MatchMode::Unique)
}

impl Provisioner {
    /// Tenant by exact name; duplicate names are tolerated
    ///
    /// Keystone v2 answers `GET /tenants?name=` with a single tenant rather
    /// than a collection, so the whole listing is matched locally.
    pub(crate) async fn find_tenant_by_name(&self, name: &str) -> Result<Tenant, ProvisionError> {
        debug!("Looking up tenant {}", name);
        let tenants = self.client.list_tenants().await?;
        select("Tenant", name, tenants, |t| t.name == name, MatchMode::First)
    }

    pub(crate) async fn find_network_by_id(&self, id: &str) -> Result<Network, ProvisionError> {
        debug!("Looking up network {}", id);
        let networks = self.client.list_networks(&[("id", id)]).await?;
        select("Network", id, networks, |n| n.id == id, MatchMode::Unique)
    }

    pub(crate) async fn find_network_by_name(&self, name: &str) -> Result<Network, ProvisionError> {
        debug!("Looking up network {}", name);
        let networks = self.client.list_networks(&[("name", name)]).await?;
        select("Network", name, networks, |n| n.name == name, MatchMode::Unique)
    }

    pub(crate) async fn find_network_by_tenant(&self, tenant_id: &str) -> Result<Network, ProvisionError> {
        debug!("Looking up network of tenant {}", tenant_id);
        let networks = self.client.list_networks(&[("tenant_id", tenant_id)]).await?;
        select("Network", tenant_id, networks, |n| n.tenant_id == tenant_id, MatchMode::Unique)
    }

    pub(crate) async fn find_port_by_name(&self, name: &str) -> Result<Port, ProvisionError> {
        debug!("Looking up port {}", name);
        let ports = self.client.list_ports(&[("name", name)]).await?;
        select("Port", name, ports, |p| p.name == name, MatchMode::Unique)
    }

    /// The tenant's well-known security group; first match wins
    pub(crate) async fn find_security_group(&self, tenant_id: &str, name: &str) -> Result<SecurityGroup, ProvisionError> {
        debug!("Looking up security group {} of tenant {}", name, tenant_id);
        let groups = self
            .client
            .list_security_groups(&[("tenant_id", tenant_id), ("name", name)])
            .await?;
        let key = format!("{}/{}", tenant_id, name);
        select(
            "SecurityGroup",
            &key,
            groups,
            |g| g.tenant_id == tenant_id && g.name == name,
            MatchMode::First,
        )
    }
}

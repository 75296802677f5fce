//! Provider-facing network model
//!
//! These are the shapes callers hand in and get back. Backend models stay
//! inside `openstack_client`.

use crate::status::NetworkStatus;
use serde::{Deserialize, Serialize};

/// A tenant network and its subnets
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    /// Backend ID; empty until created
    #[serde(default)]
    pub uid: String,
    pub name: String,
    #[serde(rename = "tenantID")]
    pub tenant_id: String,
    #[serde(default)]
    pub status: NetworkStatus,
    #[serde(default)]
    pub subnets: Vec<Subnet>,
}

/// A subnet of a [`Network`]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subnet {
    #[serde(default)]
    pub uid: String,
    pub cidr: String,
    #[serde(default)]
    pub gateway: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub dns_servers: Vec<String>,
    #[serde(default)]
    pub routes: Vec<Route>,
}

/// Static host route
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub nexthop: String,
    #[serde(rename = "destinationCIDR")]
    pub destination_cidr: String,
}

impl From<openstack_client::Subnet> for Subnet {
    fn from(subnet: openstack_client::Subnet) -> Self {
        Self {
            uid: subnet.id,
            cidr: subnet.cidr,
            gateway: subnet.gateway_ip.unwrap_or_default(),
            name: subnet.name,
            dns_servers: subnet.dns_nameservers,
            routes: subnet
                .host_routes
                .into_iter()
                .map(|r| Route {
                    nexthop: r.nexthop,
                    destination_cidr: r.destination,
                })
                .collect(),
        }
    }
}

impl Subnet {
    /// Host routes in backend form
    pub(crate) fn host_routes(&self) -> Vec<openstack_client::HostRoute> {
        self.routes
            .iter()
            .map(|r| openstack_client::HostRoute {
                destination: r.destination_cidr.clone(),
                nexthop: r.nexthop.clone(),
            })
            .collect()
    }
}

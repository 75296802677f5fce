//! Tenant-aware network provisioning over OpenStack
//!
//! Maps a small network/subnet/port model onto Keystone tenants and
//! Neutron networks, routers, subnets, ports and security groups.
//!
//! # Example
//!
//! ```no_run
//! use network_provisioner::{Config, Network, Provisioner, Subnet};
//!
//! # async fn example() -> Result<(), network_provisioner::ProvisionError> {
//! let config = Config::from_file("/etc/tenantnet/config.yaml")?;
//! let provisioner = Provisioner::from_config(&config).await?;
//!
//! let tenant_id = provisioner.create_tenant("team-a").await?;
//! let mut network = Network {
//!     name: "team-a-net".to_string(),
//!     tenant_id,
//!     subnets: vec![Subnet {
//!         cidr: "10.0.0.0/24".to_string(),
//!         gateway: "10.0.0.1".to_string(),
//!         ..Default::default()
//!     }],
//!     ..Default::default()
//! };
//! provisioner.create_network(&mut network).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod load_balancer;
pub mod lookup;
pub mod network;
pub mod provider;
pub mod saga;
pub mod status;
pub mod tenant_store;
pub mod types;

mod identity;
mod port;
mod security;

#[cfg(test)]
mod test_utils;
#[cfg(test)]
mod lookup_test;
#[cfg(test)]
mod identity_test;
#[cfg(test)]
mod network_test;

pub use config::{Config, Settings};
pub use error::ProvisionError;
pub use load_balancer::{Endpoint, LoadBalancer, LoadBalancerProvider, LoadBalancerStatus, SessionAffinity};
pub use lookup::{select, MatchMode};
pub use network::NetworkTopology;
pub use openstack_client::Port;
pub use provider::{NetworkProvider, Provisioner};
pub use saga::{Saga, SagaStep, StepPolicy};
pub use status::NetworkStatus;
pub use tenant_store::{KubeTenantStore, TenantRecord, TenantStore};
pub use types::{Network, Route, Subnet};

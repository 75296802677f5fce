//! OpenStack REST API Client
//!
//! A Rust client library for the Keystone v2 identity API and the Neutron v2
//! networking API. Provides type-safe models and an async trait over every
//! call tenantnet makes, so the provisioning core can run against a mock.
//!
//! # Example
//!
//! ```no_run
//! use openstack_client::{AuthOptions, OpenStackClient, OpenStackClientTrait};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenStackClient::authenticate(&AuthOptions {
//!     auth_url: "http://keystone:5000/v2.0".to_string(),
//!     username: "admin".to_string(),
//!     password: "secret".to_string(),
//!     tenant_name: "admin".to_string(),
//!     region: "RegionOne".to_string(),
//! })
//! .await?;
//!
//! // List every network named "net1", across all pages
//! let networks = client.list_networks(&[("name", "net1")]).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Identity Operations**: tenants and users
//! - **Network Operations**: networks, routers, subnets, ports with host binding
//! - **Security Operations**: security groups and rules
//! - **Pagination**: every listing follows `next` links until exhausted

pub mod client;
pub mod common;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod openstack_trait;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use client::{AuthOptions, OpenStackClient};
pub use common::{HttpClient, PageControl};
pub use error::{OpenStackError, STATUS_CODE_ALREADY_EXISTS};
pub use models::*;
pub use openstack_trait::OpenStackClientTrait;
#[cfg(any(test, feature = "test-util"))]
pub use mock::MockOpenStackClient;

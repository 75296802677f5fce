//! Provisioner error types.
//!
//! Backend, Kubernetes and configuration failures are folded into a single
//! enum so every public operation returns the same error type.

use kube::Error as KubeError;
use openstack_client::OpenStackError;
use thiserror::Error;

/// Errors that can occur while provisioning tenants, networks and ports.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// No resource matched a lookup
    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    /// A lookup that must be unique matched more than one resource
    #[error("Multiple {kind} resources match: {key}")]
    MultipleResults { kind: &'static str, key: String },

    /// Input rejected before any remote call
    #[error("Validation failed: {0}")]
    Validation(String),

    /// OpenStack API error
    #[error("OpenStack error: {0}")]
    Backend(#[from] OpenStackError),

    /// Tenant record could not be read
    #[error("Tenant store error: {0}")]
    TenantStore(String),

    /// Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Operation exists on the public surface but has no behaviour yet
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),

    /// Load balancer operation requested without a configured provider
    #[error("No load balancer provider is configured")]
    LoadBalancerUnavailable,
}

impl ProvisionError {
    /// Whether a lookup classified the resource as absent
    ///
    /// Only lookup misses count. A 404 surfaced by a direct backend call
    /// stays a `Backend` error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProvisionError::NotFound { .. })
    }

    pub(crate) fn not_found(kind: &'static str, key: &str) -> Self {
        ProvisionError::NotFound { kind, key: key.to_string() }
    }

    pub(crate) fn multiple_results(kind: &'static str, key: &str) -> Self {
        ProvisionError::MultipleResults { kind, key: key.to_string() }
    }
}

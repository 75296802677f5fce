//! tenantnet CRD Definitions
//!
//! Kubernetes Custom Resource Definitions read by the network provisioner.

pub mod tenant;

pub use tenant::*;

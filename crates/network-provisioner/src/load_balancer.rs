//! Load balancer capability
//!
//! Load balancers are part of the public surface, but the provisioner does
//! not manage them itself. A [`LoadBalancerProvider`] is injected at
//! construction; without one every load balancer call fails with
//! `LoadBalancerUnavailable`.

use crate::error::ProvisionError;
use crate::provider::Provisioner;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Session affinity of a load-balanced service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionAffinity {
    #[default]
    None,
    #[serde(rename = "ClientIP")]
    ClientIp,
}

/// Backend address of a load balancer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub address: String,
    pub port: u16,
}

/// Desired load balancer
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancer {
    pub name: String,
    pub service_port: u16,
    #[serde(rename = "tenantID")]
    pub tenant_id: String,
    #[serde(rename = "subnetID")]
    pub subnet_id: String,
    pub protocol: String,
    #[serde(rename = "internalIP", default)]
    pub internal_ip: String,
    #[serde(rename = "externalIP", default)]
    pub external_ip: String,
    #[serde(default)]
    pub session_affinity: SessionAffinity,
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

/// Addresses assigned to a load balancer
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoadBalancerStatus {
    #[serde(rename = "internalIP")]
    pub internal_ip: String,
    #[serde(rename = "externalIP")]
    pub external_ip: String,
}

/// Trait for load balancer backends
#[async_trait]
pub trait LoadBalancerProvider: Send + Sync {
    async fn exists(&self, name: &str) -> Result<bool, ProvisionError>;
    async fn ensure(&self, lb: &LoadBalancer) -> Result<LoadBalancerStatus, ProvisionError>;
    async fn ensure_deleted(&self, name: &str) -> Result<(), ProvisionError>;
}

impl Provisioner {
    fn load_balancer_provider(&self) -> Result<&(dyn LoadBalancerProvider + Send + Sync), ProvisionError> {
        self.load_balancers
            .as_deref()
            .ok_or(ProvisionError::LoadBalancerUnavailable)
    }

    pub async fn load_balancer_exists(&self, name: &str) -> Result<bool, ProvisionError> {
        self.load_balancer_provider()?.exists(name).await
    }

    pub async fn ensure_load_balancer(&self, lb: &LoadBalancer) -> Result<LoadBalancerStatus, ProvisionError> {
        debug!("Ensuring load balancer {}", lb.name);
        self.load_balancer_provider()?.ensure(lb).await
    }

    pub async fn ensure_load_balancer_deleted(&self, name: &str) -> Result<(), ProvisionError> {
        debug!("Ensuring load balancer {} is deleted", name);
        self.load_balancer_provider()?.ensure_deleted(name).await
    }
}

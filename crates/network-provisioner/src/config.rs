//! Provisioner configuration
//!
//! Loaded once at startup from a YAML file:
//!
//! ```yaml
//! global:
//!   authUrl: http://keystone:5000/v2.0
//!   username: admin
//!   password: secret
//!   tenantName: admin
//!   region: RegionOne
//!   extNetId: 0d4f0a4e-7a5e-4a2c-9c52-cf3e3c3d2b10
//! plugin:
//!   pluginName: ovs
//!   integrationBridge: br-int
//! ```
//!
//! The read-only values the provisioner needs at runtime are copied into
//! [`Settings`].

use crate::error::ProvisionError;
use openstack_client::AuthOptions;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Name of the per-tenant default security group
pub const DEFAULT_SECURITY_GROUP_NAME: &str = "kube-securitygroup-default";

/// Tenant that system namespaces map to
pub const DEFAULT_SYSTEM_TENANT: &str = "system-tenant";

const HOSTNAME_FILE: &str = "/etc/hostname";

/// Top-level configuration file
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub global: GlobalConfig,

    #[serde(default)]
    pub plugin: PluginConfig,

    /// Host ports are bound to; defaults to the local hostname
    #[serde(default)]
    pub host_id: Option<String>,

    #[serde(default = "default_security_group_name")]
    pub security_group_name: String,

    #[serde(default = "default_system_tenant")]
    pub system_tenant: String,

    /// Namespaces whose tenant is always `system_tenant`
    #[serde(default = "default_system_namespaces")]
    pub system_namespaces: Vec<String>,

    /// `admin_state_up` for created networks and ports
    #[serde(default = "default_true")]
    pub admin_state_up: bool,
}

/// Credentials, scope and deployment constants
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConfig {
    #[serde(default)]
    pub auth_url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub tenant_name: String,
    #[serde(default)]
    pub region: String,
    /// External network every companion router uses as its gateway
    #[serde(default)]
    pub ext_net_id: String,
}

/// Network plugin settings, passed through to callers
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginConfig {
    #[serde(default)]
    pub plugin_name: String,
    #[serde(default)]
    pub integration_bridge: String,
}

fn default_security_group_name() -> String {
    DEFAULT_SECURITY_GROUP_NAME.to_string()
}

fn default_system_tenant() -> String {
    DEFAULT_SYSTEM_TENANT.to_string()
}

fn default_system_namespaces() -> Vec<String> {
    vec![
        "default".to_string(),
        "kube-system".to_string(),
        "kube-public".to_string(),
    ]
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Read and validate a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ProvisionError> {
        let path = path.as_ref();
        debug!("Loading configuration from {}", path.display());
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ProvisionError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&raw)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml_str(raw: &str) -> Result<Self, ProvisionError> {
        let config: Config = serde_yaml::from_str(raw)
            .map_err(|e| ProvisionError::Config(format!("invalid YAML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the provisioner cannot start with
    pub fn validate(&self) -> Result<(), ProvisionError> {
        if self.global.auth_url.trim().is_empty() {
            return Err(ProvisionError::Config("global.authUrl is required".to_string()));
        }
        if self.global.ext_net_id.trim().is_empty() {
            return Err(ProvisionError::Config("global.extNetId is required".to_string()));
        }
        if self.security_group_name.is_empty() {
            return Err(ProvisionError::Config("securityGroupName must not be empty".to_string()));
        }
        Ok(())
    }

    /// Keystone credentials for the backend client
    pub fn auth_options(&self) -> AuthOptions {
        AuthOptions {
            auth_url: self.global.auth_url.clone(),
            username: self.global.username.clone(),
            password: self.global.password.clone(),
            tenant_name: self.global.tenant_name.clone(),
            region: self.global.region.clone(),
        }
    }

    /// Runtime settings, with the host identifier resolved
    pub fn settings(&self) -> Result<Settings, ProvisionError> {
        let host_id = resolve_host_id(
            self.host_id.as_deref(),
            std::env::var("HOSTNAME").ok().as_deref(),
            Path::new(HOSTNAME_FILE),
        )?;

        Ok(Settings {
            ext_net_id: self.global.ext_net_id.clone(),
            security_group_name: self.security_group_name.clone(),
            host_id,
            admin_state_up: self.admin_state_up,
            system_tenant: self.system_tenant.clone(),
            system_namespaces: self.system_namespaces.clone(),
            plugin_name: self.plugin.plugin_name.clone(),
            integration_bridge: self.plugin.integration_bridge.clone(),
        })
    }
}

/// Read-only values threaded through every operation
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub ext_net_id: String,
    pub security_group_name: String,
    /// Binding host for created and rebound ports
    pub host_id: String,
    pub admin_state_up: bool,
    pub system_tenant: String,
    pub system_namespaces: Vec<String>,
    pub plugin_name: String,
    pub integration_bridge: String,
}

impl Settings {
    /// Whether `name` is a namespace owned by the system tenant
    pub fn is_system_namespace(&self, name: &str) -> bool {
        self.system_namespaces.iter().any(|ns| ns == name)
    }
}

/// Pick the binding host: explicit setting, then `$HOSTNAME`, then the hostname file
fn resolve_host_id(
    configured: Option<&str>,
    env_hostname: Option<&str>,
    hostname_file: &Path,
) -> Result<String, ProvisionError> {
    let from_file = std::fs::read_to_string(hostname_file).ok();
    [configured, env_hostname, from_file.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|host| !host.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ProvisionError::Config("unable to determine host id".to_string()))
}

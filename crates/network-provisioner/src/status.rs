//! Translation of backend resource status into the provisioner's vocabulary

use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized network status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum NetworkStatus {
    Active,
    #[default]
    Pending,
    Failed,
}

impl NetworkStatus {
    /// Map a Neutron status string
    ///
    /// Unknown values map to `Failed`, never to `Active` or `Pending`.
    pub fn from_backend(status: &str) -> Self {
        match status {
            "ACTIVE" => NetworkStatus::Active,
            "BUILD" => NetworkStatus::Pending,
            "DOWN" | "ERROR" => NetworkStatus::Failed,
            _ => NetworkStatus::Failed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkStatus::Active => "Active",
            NetworkStatus::Pending => "Pending",
            NetworkStatus::Failed => "Failed",
        }
    }
}

impl fmt::Display for NetworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

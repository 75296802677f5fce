//! Security operations
//!
//! Handles: the per-tenant default security group and its rules
//!
//! Nothing here is serialized across callers. Two concurrent calls for a
//! new tenant can both miss the group and both create one; Neutron does not
//! reject duplicate group names.

use crate::error::ProvisionError;
use crate::provider::Provisioner;
use openstack_client::{
    CreateSecurityGroupRequest, CreateSecurityGroupRuleRequest, EtherType, RuleDirection,
};
use tracing::{debug, info};

impl Provisioner {
    /// Make sure the tenant's default group exists with its allow-all rules
    ///
    /// # Returns
    /// * `Ok(String)` - ID of the group
    /// * `Err(ProvisionError)` - If a lookup or create fails
    pub async fn ensure_security_group(&self, tenant_id: &str) -> Result<String, ProvisionError> {
        let name = self.settings.security_group_name.as_str();

        let group = match self.find_security_group(tenant_id, name).await {
            Ok(group) => group,
            Err(e) if e.is_not_found() => {
                let request = CreateSecurityGroupRequest {
                    name: name.to_string(),
                    tenant_id: tenant_id.to_string(),
                    description: None,
                };
                let group = self.client.create_security_group(&request).await?;
                info!("Created security group {} for tenant {} (ID: {})", name, tenant_id, group.id);
                group
            }
            Err(e) => return Err(e),
        };

        let ingress_rules = self
            .client
            .list_security_group_rules(&[
                ("tenant_id", tenant_id),
                ("direction", RuleDirection::Ingress.as_str()),
                ("security_group_id", group.id.as_str()),
            ])
            .await?;
        let ingress_rules = ingress_rules
            .iter()
            .filter(|r| r.security_group_id == group.id && r.direction == RuleDirection::Ingress)
            .count();

        if ingress_rules > 0 {
            debug!("Security group {} already has {} ingress rules", group.id, ingress_rules);
            return Ok(group.id);
        }

        for direction in [RuleDirection::Egress, RuleDirection::Ingress] {
            let request = CreateSecurityGroupRuleRequest {
                tenant_id: tenant_id.to_string(),
                security_group_id: group.id.clone(),
                direction,
                ethertype: EtherType::IPv4,
            };
            self.client.create_security_group_rule(&request).await?;
            info!("Created {} allow-all rule on security group {}", direction.as_str(), group.id);
        }

        Ok(group.id)
    }
}

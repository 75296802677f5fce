//! Security operations for MockOpenStackClient
//!
//! Handles security groups and rules. Like Neutron, group names are not unique.

use super::{MockOpenStackClient, matches_filters, not_found};
use crate::error::OpenStackError;
use crate::models::*;

pub fn list_security_groups(client: &MockOpenStackClient, filters: &[(&str, &str)]) -> Result<Vec<SecurityGroup>, OpenStackError> {
    client.begin("list_security_groups")?;
    let groups = client.security_groups.lock().unwrap();
    Ok(groups.values().filter(|g| matches_filters(*g, filters)).cloned().collect())
}

pub fn create_security_group(client: &MockOpenStackClient, request: &CreateSecurityGroupRequest) -> Result<SecurityGroup, OpenStackError> {
    client.begin("create_security_group")?;
    let group = SecurityGroup {
        id: client.next_id("secgroup"),
        name: request.name.clone(),
        tenant_id: request.tenant_id.clone(),
        description: request.description.clone().unwrap_or_default(),
    };
    client.security_groups.lock().unwrap().insert(group.id.clone(), group.clone());
    Ok(group)
}

pub fn list_security_group_rules(client: &MockOpenStackClient, filters: &[(&str, &str)]) -> Result<Vec<SecurityGroupRule>, OpenStackError> {
    client.begin("list_security_group_rules")?;
    let rules = client.security_group_rules.lock().unwrap();
    Ok(rules.values().filter(|r| matches_filters(*r, filters)).cloned().collect())
}

pub fn create_security_group_rule(client: &MockOpenStackClient, request: &CreateSecurityGroupRuleRequest) -> Result<SecurityGroupRule, OpenStackError> {
    client.begin("create_security_group_rule")?;
    if !client.security_groups.lock().unwrap().contains_key(&request.security_group_id) {
        return Err(not_found("Security group", &request.security_group_id));
    }

    let rule = SecurityGroupRule {
        id: client.next_id("rule"),
        security_group_id: request.security_group_id.clone(),
        tenant_id: request.tenant_id.clone(),
        direction: request.direction,
        ethertype: request.ethertype,
        protocol: None,
        port_range_min: None,
        port_range_max: None,
        remote_ip_prefix: None,
    };
    client.security_group_rules.lock().unwrap().insert(rule.id.clone(), rule.clone());
    Ok(rule)
}

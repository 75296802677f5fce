//! Network operations for MockOpenStackClient
//!
//! Handles networks, routers, subnets and ports. Deletes that Neutron would
//! reject because something still depends on the resource return 409.

use super::{MockOpenStackClient, conflict, matches_filters, not_found};
use crate::error::OpenStackError;
use crate::models::*;

pub fn list_networks(client: &MockOpenStackClient, filters: &[(&str, &str)]) -> Result<Vec<Network>, OpenStackError> {
    client.begin("list_networks")?;
    let networks = client.networks.lock().unwrap();
    Ok(networks.values().filter(|n| matches_filters(*n, filters)).cloned().collect())
}

pub fn create_network(client: &MockOpenStackClient, request: &CreateNetworkRequest) -> Result<Network, OpenStackError> {
    client.begin("create_network")?;
    let status = client.network_create_status
        .lock()
        .unwrap()
        .clone()
        .unwrap_or_else(|| "ACTIVE".to_string());

    let network = Network {
        id: client.next_id("network"),
        name: request.name.clone(),
        tenant_id: request.tenant_id.clone(),
        status,
        admin_state_up: request.admin_state_up,
        subnets: Vec::new(),
    };
    client.networks.lock().unwrap().insert(network.id.clone(), network.clone());
    Ok(network)
}

pub fn delete_network(client: &MockOpenStackClient, id: &str) -> Result<(), OpenStackError> {
    client.begin("delete_network")?;
    let mut networks = client.networks.lock().unwrap();
    let network = networks.get(id).ok_or_else(|| not_found("Network", id))?;

    if !network.subnets.is_empty() {
        return Err(conflict(format!("Network {} still has subnets {:?}", id, network.subnets)));
    }
    let in_use = client.ports.lock().unwrap().values().any(|p| p.network_id == id);
    if in_use {
        return Err(conflict(format!("Network {} still has ports", id)));
    }

    networks.remove(id);
    Ok(())
}

pub fn list_routers(client: &MockOpenStackClient, filters: &[(&str, &str)]) -> Result<Vec<Router>, OpenStackError> {
    client.begin("list_routers")?;
    let routers = client.routers.lock().unwrap();
    Ok(routers.values().filter(|r| matches_filters(*r, filters)).cloned().collect())
}

pub fn create_router(client: &MockOpenStackClient, request: &CreateRouterRequest) -> Result<Router, OpenStackError> {
    client.begin("create_router")?;
    let router = Router {
        id: client.next_id("router"),
        name: request.name.clone(),
        tenant_id: request.tenant_id.clone(),
        status: "ACTIVE".to_string(),
        external_gateway_info: Some(request.external_gateway_info.clone()),
    };
    client.routers.lock().unwrap().insert(router.id.clone(), router.clone());
    Ok(router)
}

pub fn delete_router(client: &MockOpenStackClient, id: &str) -> Result<(), OpenStackError> {
    client.begin("delete_router")?;
    let mut routers = client.routers.lock().unwrap();
    if !routers.contains_key(id) {
        return Err(not_found("Router", id));
    }

    let attached = client.ports
        .lock()
        .unwrap()
        .values()
        .any(|p| p.device_id == id && p.device_owner == DEVICE_OWNER_ROUTER_INTERFACE);
    if attached {
        return Err(conflict(format!("Router {} still has interfaces", id)));
    }

    routers.remove(id);
    Ok(())
}

pub fn add_router_interface(client: &MockOpenStackClient, router_id: &str, subnet_id: &str) -> Result<RouterInterface, OpenStackError> {
    client.begin("add_router_interface")?;
    if !client.routers.lock().unwrap().contains_key(router_id) {
        return Err(not_found("Router", router_id));
    }
    let subnet = client.subnets
        .lock()
        .unwrap()
        .get(subnet_id)
        .cloned()
        .ok_or_else(|| not_found("Subnet", subnet_id))?;

    let port = Port {
        id: client.next_id("port"),
        name: String::new(),
        network_id: subnet.network_id.clone(),
        tenant_id: subnet.tenant_id.clone(),
        device_id: router_id.to_string(),
        device_owner: DEVICE_OWNER_ROUTER_INTERFACE.to_string(),
        admin_state_up: true,
        status: "ACTIVE".to_string(),
        mac_address: String::new(),
        fixed_ips: vec![FixedIp {
            subnet_id: subnet.id.clone(),
            ip_address: subnet.gateway_ip.clone().unwrap_or_default(),
        }],
        security_groups: Vec::new(),
        host_id: String::new(),
        vif_type: String::new(),
    };
    client.ports.lock().unwrap().insert(port.id.clone(), port.clone());

    Ok(RouterInterface {
        id: router_id.to_string(),
        subnet_id: subnet.id,
        port_id: port.id,
    })
}

pub fn remove_router_interface(client: &MockOpenStackClient, router_id: &str, subnet_id: &str) -> Result<RouterInterface, OpenStackError> {
    client.begin("remove_router_interface")?;
    let mut ports = client.ports.lock().unwrap();
    let port_id = ports
        .values()
        .find(|p| {
            p.device_id == router_id
                && p.device_owner == DEVICE_OWNER_ROUTER_INTERFACE
                && p.fixed_ips.iter().any(|ip| ip.subnet_id == subnet_id)
        })
        .map(|p| p.id.clone())
        .ok_or_else(|| not_found("Router interface", &format!("{}/{}", router_id, subnet_id)))?;

    ports.remove(&port_id);
    Ok(RouterInterface {
        id: router_id.to_string(),
        subnet_id: subnet_id.to_string(),
        port_id,
    })
}

pub fn get_subnet(client: &MockOpenStackClient, id: &str) -> Result<Subnet, OpenStackError> {
    client.begin("get_subnet")?;
    client.subnets
        .lock()
        .unwrap()
        .get(id)
        .cloned()
        .ok_or_else(|| not_found("Subnet", id))
}

pub fn create_subnet(client: &MockOpenStackClient, request: &CreateSubnetRequest) -> Result<Subnet, OpenStackError> {
    client.begin("create_subnet")?;
    let subnet = Subnet {
        id: client.next_id("subnet"),
        name: request.name.clone(),
        network_id: request.network_id.clone(),
        tenant_id: request.tenant_id.clone(),
        cidr: request.cidr.clone(),
        gateway_ip: request.gateway_ip.clone(),
        ip_version: request.ip_version,
        dns_nameservers: request.dns_nameservers.clone(),
        host_routes: request.host_routes.clone(),
    };

    {
        let mut networks = client.networks.lock().unwrap();
        let network = networks
            .get_mut(&request.network_id)
            .ok_or_else(|| not_found("Network", &request.network_id))?;
        network.subnets.push(subnet.id.clone());
    }
    client.subnets.lock().unwrap().insert(subnet.id.clone(), subnet.clone());
    Ok(subnet)
}

pub fn delete_subnet(client: &MockOpenStackClient, id: &str) -> Result<(), OpenStackError> {
    client.begin("delete_subnet")?;
    let mut subnets = client.subnets.lock().unwrap();
    let subnet = subnets.get(id).ok_or_else(|| not_found("Subnet", id))?;

    let in_use = client.ports
        .lock()
        .unwrap()
        .values()
        .any(|p| p.fixed_ips.iter().any(|ip| ip.subnet_id == id));
    if in_use {
        return Err(conflict(format!("Subnet {} has ports allocated", id)));
    }

    if let Some(network) = client.networks.lock().unwrap().get_mut(&subnet.network_id) {
        network.subnets.retain(|s| s != id);
    }
    subnets.remove(id);
    Ok(())
}

pub fn list_ports(client: &MockOpenStackClient, filters: &[(&str, &str)]) -> Result<Vec<Port>, OpenStackError> {
    client.begin("list_ports")?;
    let ports = client.ports.lock().unwrap();
    Ok(ports.values().filter(|p| matches_filters(*p, filters)).cloned().collect())
}

pub fn create_port(client: &MockOpenStackClient, request: &CreatePortRequest) -> Result<Port, OpenStackError> {
    client.begin("create_port")?;
    if !client.networks.lock().unwrap().contains_key(&request.network_id) {
        return Err(not_found("Network", &request.network_id));
    }

    let id = client.next_id("port");
    let port = Port {
        mac_address: format!("fa:16:3e:{}", &id[id.len() - 6..]),
        id,
        name: request.name.clone(),
        network_id: request.network_id.clone(),
        tenant_id: request.tenant_id.clone(),
        device_id: request.device_id.clone(),
        device_owner: request.device_owner.clone(),
        admin_state_up: request.admin_state_up,
        status: "DOWN".to_string(),
        fixed_ips: Vec::new(),
        security_groups: request.security_groups.clone(),
        host_id: request.host_id.clone(),
        vif_type: "ovs".to_string(),
    };
    client.ports.lock().unwrap().insert(port.id.clone(), port.clone());
    Ok(port)
}

pub fn update_port_binding(client: &MockOpenStackClient, id: &str, request: &UpdatePortBindingRequest) -> Result<Port, OpenStackError> {
    client.begin("update_port_binding")?;
    let mut ports = client.ports.lock().unwrap();
    let port = ports.get_mut(id).ok_or_else(|| not_found("Port", id))?;
    port.host_id = request.host_id.clone();
    port.device_owner = request.device_owner.clone();
    Ok(port.clone())
}

pub fn delete_port(client: &MockOpenStackClient, id: &str) -> Result<(), OpenStackError> {
    client.begin("delete_port")?;
    client.ports
        .lock()
        .unwrap()
        .remove(id)
        .map(|_| ())
        .ok_or_else(|| not_found("Port", id))
}

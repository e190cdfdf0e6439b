// This file is part of the terraform-provider-azurerm project
//
// Copyright (C) ANEO, 2024-2024. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License")
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::BTreeMap;

use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};

use crate::{
    client::{ArmClient, ArmError, RequestOptions},
    enums::arm_enum,
    resourceids::{ResourceId, SubnetId, VirtualNetworkId},
};

const API_VERSION: &str = "2023-11-01";

arm_enum! {
    pub enum VirtualNetworkPrivateEndpointNetworkPolicies {
        Disabled => "Disabled",
        Enabled => "Enabled",
        NetworkSecurityGroupEnabled => "NetworkSecurityGroupEnabled",
        RouteTableEnabled => "RouteTableEnabled",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressSpace {
    #[serde(default)]
    pub address_prefixes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DhcpOptions {
    #[serde(default)]
    pub dns_servers: Vec<String>,
}

/// Properties of a virtual network
///
/// Properties the provider does not manage, like the subnets, are kept in `other`
/// so that a read-modify-write does not drop them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualNetworkProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_space: Option<AddressSpace>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dhcp_options: Option<DhcpOptions>,
    #[serde(skip_serializing)]
    pub resource_guid: Option<String>,
    #[serde(skip_serializing)]
    pub provisioning_state: Option<String>,
    #[serde(flatten)]
    pub other: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualNetwork {
    #[serde(skip_serializing)]
    pub id: Option<String>,
    #[serde(skip_serializing)]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub properties: VirtualNetworkProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEndpoint {
    pub service: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubnetProperties {
    /// Single prefix form, older subnets are returned with it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_prefixes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_endpoints: Option<Vec<ServiceEndpoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_endpoint_network_policies: Option<VirtualNetworkPrivateEndpointNetworkPolicies>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_outbound_access: Option<bool>,
    #[serde(skip_serializing)]
    pub provisioning_state: Option<String>,
    #[serde(flatten)]
    pub other: BTreeMap<String, serde_json::Value>,
}

impl SubnetProperties {
    /// Prefixes of the subnet, whichever form the API used
    pub fn prefixes(&self) -> Vec<String> {
        match (&self.address_prefixes, &self.address_prefix) {
            (Some(prefixes), _) if !prefixes.is_empty() => prefixes.clone(),
            (_, Some(prefix)) => vec![prefix.clone()],
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subnet {
    #[serde(skip_serializing)]
    pub id: Option<String>,
    #[serde(skip_serializing)]
    pub name: Option<String>,
    #[serde(default)]
    pub properties: SubnetProperties,
}

fn put(path: String) -> RequestOptions {
    RequestOptions::new(Method::PUT, path, API_VERSION).expect(&[StatusCode::OK, StatusCode::CREATED])
}

fn delete(path: String) -> RequestOptions {
    RequestOptions::new(Method::DELETE, path, API_VERSION).expect(&[
        StatusCode::OK,
        StatusCode::ACCEPTED,
        StatusCode::NO_CONTENT,
    ])
}

#[derive(Debug, Clone, Copy)]
pub struct VirtualNetworksClient<'c> {
    client: &'c ArmClient,
}

impl<'c> VirtualNetworksClient<'c> {
    pub fn new(client: &'c ArmClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, id: &VirtualNetworkId) -> Result<Option<VirtualNetwork>, ArmError> {
        self.client
            .get_optional(&RequestOptions::get(id.id(), API_VERSION))
            .await
    }

    /// Create or replace the virtual network, and wait for it to be provisioned
    pub async fn create_or_update(
        &self,
        id: &VirtualNetworkId,
        virtual_network: &VirtualNetwork,
    ) -> Result<VirtualNetwork, ArmError> {
        self.client
            .execute_lro(&put(id.id()).json(virtual_network)?)
            .await?
            .model()
    }

    pub async fn delete(&self, id: &VirtualNetworkId) -> Result<(), ArmError> {
        self.client.execute_lro(&delete(id.id())).await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SubnetsClient<'c> {
    client: &'c ArmClient,
}

impl<'c> SubnetsClient<'c> {
    pub fn new(client: &'c ArmClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, id: &SubnetId) -> Result<Option<Subnet>, ArmError> {
        self.client
            .get_optional(&RequestOptions::get(id.id(), API_VERSION))
            .await
    }

    pub async fn create_or_update(&self, id: &SubnetId, subnet: &Subnet) -> Result<Subnet, ArmError> {
        self.client
            .execute_lro(&put(id.id()).json(subnet)?)
            .await?
            .model()
    }

    pub async fn delete(&self, id: &SubnetId) -> Result<(), ArmError> {
        self.client.execute_lro(&delete(id.id())).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn unmanaged_properties_survive_a_round_trip() {
        let virtual_network: VirtualNetwork = serde_json::from_value(json!({
            "id": "/subscriptions/x/resourceGroups/rg/providers/Microsoft.Network/virtualNetworks/vnet",
            "name": "vnet",
            "location": "westeurope",
            "properties": {
                "addressSpace": {"addressPrefixes": ["10.0.0.0/16"]},
                "resourceGuid": "guid",
                "provisioningState": "Succeeded",
                "subnets": [{"name": "internal"}]
            }
        }))
        .unwrap();
        assert_eq!(virtual_network.properties.resource_guid.as_deref(), Some("guid"));

        let body = serde_json::to_value(&virtual_network).unwrap();
        assert_eq!(
            body,
            json!({
                "location": "westeurope",
                "properties": {
                    "addressSpace": {"addressPrefixes": ["10.0.0.0/16"]},
                    "subnets": [{"name": "internal"}]
                }
            })
        );
    }

    #[test]
    fn subnet_prefixes_in_either_form() {
        let single: SubnetProperties =
            serde_json::from_value(json!({"addressPrefix": "10.0.1.0/24"})).unwrap();
        assert_eq!(single.prefixes(), vec!["10.0.1.0/24".to_owned()]);

        let multiple: SubnetProperties = serde_json::from_value(json!({
            "addressPrefixes": ["10.0.1.0/24", "10.0.2.0/24"],
            "privateEndpointNetworkPolicies": "disabled",
            "defaultOutboundAccess": false
        }))
        .unwrap();
        assert_eq!(multiple.prefixes().len(), 2);
        assert_eq!(
            multiple.private_endpoint_network_policies,
            Some(VirtualNetworkPrivateEndpointNetworkPolicies::Disabled)
        );
    }
}

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

use std::{borrow::Cow, net::IpAddr};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tf_provider::{
    map,
    schema::{AttributeConstraint, AttributeType, Block, Description, Schema},
    value::{self, ValueList, ValueMap, ValueString, Value},
    AttributePath, Diagnostics,
};

use crate::{
    client::locks,
    clients::Clients,
    resource::{
        schema::{
            attribute, flatten_optional_list, flatten_tags, id_attribute, location_attribute,
            normalize_location, report_errors, resource_group_name_errors, tags_attribute,
            validate_location, validate_tags,
        },
        ArmResource, ArmState, Timeouts, TimeoutsBlock,
    },
    resourceids::{ResourceId, VirtualNetworkId},
    utils::{string_list, string_map, to_string_list, WithSchema, WithValidate},
};

use super::{
    cidr_errors,
    client::{AddressSpace, DhcpOptions, VirtualNetwork, VirtualNetworksClient},
    VIRTUAL_NETWORK_LOCK,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualNetworkState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub name: ValueString<'a>,
    pub resource_group_name: ValueString<'a>,
    pub location: ValueString<'a>,
    pub address_space: ValueList<ValueString<'a>>,
    pub dns_servers: ValueList<ValueString<'a>>,
    pub guid: ValueString<'a>,
    pub tags: ValueMap<'a, ValueString<'a>>,
    #[serde(with = "value::serde_as_vec")]
    pub timeouts: Value<TimeoutsBlock<'a>>,
}

impl<'a> WithSchema for VirtualNetworkState<'a> {
    fn schema() -> Schema {
        let strings = AttributeType::List(AttributeType::String.into());
        Schema {
            version: 1,
            block: Block {
                description: Description::plain("Manages a Virtual Network"),
                attributes: map! {
                    "id" => id_attribute(),
                    "name" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "Name of the Virtual Network, changing it forces a new resource",
                    ),
                    "resource_group_name" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "Resource Group of the Virtual Network, changing it forces a new resource",
                    ),
                    "location" => location_attribute(AttributeConstraint::Required),
                    "address_space" => attribute(
                        strings.clone(),
                        AttributeConstraint::Required,
                        "Address prefixes of the Virtual Network, in CIDR notation",
                    ),
                    "dns_servers" => attribute(
                        strings,
                        AttributeConstraint::Optional,
                        "IP addresses of the DNS servers, the Azure-provided DNS is used when empty",
                    ),
                    "guid" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Computed,
                        "GUID of the Virtual Network",
                    ),
                    "tags" => tags_attribute(AttributeConstraint::Optional),
                },
                blocks: map! {
                    "timeouts" => Timeouts::default().block(),
                },
                ..Default::default()
            },
        }
    }
}

impl<'a> WithValidate for VirtualNetworkState<'a> {
    fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath) {
        if self.name.as_deref_option() == Some("") {
            diags.error_short(
                "`name` must not be empty",
                attr_path.clone().attribute("name"),
            );
        }
        if let Some(name) = self.resource_group_name.as_deref_option() {
            report_errors(
                diags,
                resource_group_name_errors(name),
                attr_path.clone().attribute("resource_group_name"),
            );
        }
        validate_location(diags, &self.location, attr_path.clone().attribute("location"));

        if let Value::Value(address_space) = &self.address_space {
            if address_space.is_empty() {
                diags.error_short(
                    "`address_space` must contain at least one prefix",
                    attr_path.clone().attribute("address_space"),
                );
            }
            for (index, prefix) in address_space.iter().enumerate() {
                if let Some(prefix) = prefix.as_deref_option() {
                    report_errors(
                        diags,
                        cidr_errors(prefix),
                        attr_path
                            .clone()
                            .attribute("address_space")
                            .index(index as i64),
                    );
                }
            }
        }
        if let Value::Value(dns_servers) = &self.dns_servers {
            for (index, server) in dns_servers.iter().enumerate() {
                if let Some(server) = server.as_deref_option() {
                    if server.parse::<IpAddr>().is_err() {
                        diags.error(
                            "Invalid value",
                            format!("expected an IP address, got {server:?}"),
                            attr_path.clone().attribute("dns_servers").index(index as i64),
                        );
                    }
                }
            }
        }

        validate_tags(diags, &self.tags, attr_path.clone().attribute("tags"));
        self.timeouts
            .validate(diags, attr_path.attribute("timeouts"));
    }
}

impl<'a> ArmState<'a> for VirtualNetworkState<'a> {
    fn id(&self) -> &ValueString<'a> {
        &self.id
    }

    fn id_mut(&mut self) -> &mut ValueString<'a> {
        &mut self.id
    }

    fn timeouts(&self) -> &Value<TimeoutsBlock<'a>> {
        &self.timeouts
    }

    fn location_mut(&mut self) -> Option<&mut ValueString<'a>> {
        Some(&mut self.location)
    }
}

#[derive(Debug, Default, Clone)]
pub struct VirtualNetworkResource;

impl VirtualNetworkResource {
    fn apply(virtual_network: &mut VirtualNetwork, state: &VirtualNetworkState) {
        virtual_network.tags = Some(string_map(&state.tags));
        virtual_network.properties.address_space = Some(AddressSpace {
            address_prefixes: string_list(&state.address_space),
        });
        virtual_network.properties.dhcp_options = Some(DhcpOptions {
            dns_servers: string_list(&state.dns_servers),
        });
    }
}

#[async_trait]
impl ArmResource for VirtualNetworkResource {
    const TYPE_NAME: &'static str = "azurerm_virtual_network";
    const TIMEOUTS: Timeouts = Timeouts::minutes(30, 5, 30, 30);

    type Id = VirtualNetworkId;
    type State<'a> = VirtualNetworkState<'a>;

    fn build_id<'a>(&self, clients: &Clients, config: &Self::State<'a>) -> Result<Self::Id> {
        let missing = |attribute: &str| anyhow!("`{attribute}` must be known to create a Virtual Network");
        Ok(VirtualNetworkId::new(
            clients.subscription_id.as_str(),
            config
                .resource_group_name
                .as_deref_option()
                .ok_or_else(|| missing("resource_group_name"))?,
            config
                .name
                .as_deref_option()
                .ok_or_else(|| missing("name"))?,
        ))
    }

    fn plan_create<'a>(&self, state: &mut Self::State<'a>) {
        state.guid = Value::Unknown;
    }

    fn plan_update<'a>(
        &self,
        prior: &Self::State<'a>,
        planned: &mut Self::State<'a>,
    ) -> Vec<AttributePath> {
        let mut replace = Vec::new();
        if prior.name != planned.name {
            replace.push(AttributePath::new("name"));
        }
        if prior.resource_group_name != planned.resource_group_name {
            replace.push(AttributePath::new("resource_group_name"));
        }
        let location = |state: &Self::State<'a>| {
            state.location.as_deref_option().map(normalize_location)
        };
        if location(prior) != location(planned) {
            replace.push(AttributePath::new("location"));
        }
        replace
    }

    async fn exists(&self, clients: &Clients, id: &Self::Id) -> Result<bool> {
        Ok(VirtualNetworksClient::new(&clients.arm)
            .get(id)
            .await?
            .is_some())
    }

    async fn create<'a>(
        &self,
        clients: &Clients,
        id: &Self::Id,
        planned: &Self::State<'a>,
    ) -> Result<()> {
        let mut virtual_network = VirtualNetwork {
            location: planned.location.as_deref_option().map(str::to_owned),
            ..Default::default()
        };
        Self::apply(&mut virtual_network, planned);

        let _lock = locks::lock_by_name(VIRTUAL_NETWORK_LOCK, &id.virtual_network_name).await;
        VirtualNetworksClient::new(&clients.arm)
            .create_or_update(id, &virtual_network)
            .await
            .with_context(|| format!("creating {id}"))?;
        Ok(())
    }

    async fn read<'a>(
        &self,
        clients: &Clients,
        id: &Self::Id,
        state: Self::State<'a>,
    ) -> Result<Option<Self::State<'a>>> {
        let Some(virtual_network) = VirtualNetworksClient::new(&clients.arm)
            .get(id)
            .await
            .with_context(|| format!("retrieving {id}"))?
        else {
            return Ok(None);
        };
        let properties = virtual_network.properties;

        Ok(Some(VirtualNetworkState {
            id: Value::Value(Cow::Owned(id.id())),
            name: Value::Value(Cow::Owned(id.virtual_network_name.clone())),
            resource_group_name: Value::Value(Cow::Owned(id.resource_group_name.clone())),
            location: virtual_network
                .location
                .map_or(Value::Null, |location| Value::Value(Cow::Owned(location))),
            address_space: to_string_list(
                properties
                    .address_space
                    .map(|space| space.address_prefixes)
                    .unwrap_or_default(),
            ),
            dns_servers: flatten_optional_list(
                properties.dhcp_options.map(|options| options.dns_servers),
                &state.dns_servers,
            ),
            guid: properties
                .resource_guid
                .map_or(Value::Null, |guid| Value::Value(Cow::Owned(guid))),
            tags: flatten_tags(virtual_network.tags, &state.tags),
            timeouts: state.timeouts,
        }))
    }

    async fn update<'a>(
        &self,
        clients: &Clients,
        id: &Self::Id,
        _prior: &Self::State<'a>,
        planned: &Self::State<'a>,
    ) -> Result<()> {
        let client = VirtualNetworksClient::new(&clients.arm);
        let _lock = locks::lock_by_name(VIRTUAL_NETWORK_LOCK, &id.virtual_network_name).await;

        // the subnets are part of the existing network and must be sent back
        let mut virtual_network = client
            .get(id)
            .await
            .with_context(|| format!("retrieving {id}"))?
            .ok_or_else(|| anyhow!("{id} was not found"))?;
        Self::apply(&mut virtual_network, planned);

        client
            .create_or_update(id, &virtual_network)
            .await
            .with_context(|| format!("updating {id}"))?;
        Ok(())
    }

    async fn delete<'a>(
        &self,
        clients: &Clients,
        id: &Self::Id,
        _state: &Self::State<'a>,
    ) -> Result<()> {
        let _lock = locks::lock_by_name(VIRTUAL_NETWORK_LOCK, &id.virtual_network_name).await;
        VirtualNetworksClient::new(&clients.arm)
            .delete(id)
            .await
            .with_context(|| format!("deleting {id}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state<'a>(address_space: &[&'a str], dns_servers: &[&'a str]) -> VirtualNetworkState<'a> {
        let list = |values: &[&'a str]| {
            Value::Value(
                values
                    .iter()
                    .map(|value| Value::Value(Cow::Borrowed(*value)))
                    .collect(),
            )
        };
        VirtualNetworkState {
            name: Value::Value(Cow::Borrowed("vnet")),
            resource_group_name: Value::Value(Cow::Borrowed("rg")),
            location: Value::Value(Cow::Borrowed("westeurope")),
            address_space: list(address_space),
            dns_servers: list(dns_servers),
            ..Default::default()
        }
    }

    #[test]
    fn address_space_is_validated() {
        let mut diags = Diagnostics::default();
        state(&["10.0.0.0/16"], &["10.0.0.4"]).validate(&mut diags, AttributePath::default());
        assert!(diags.errors.is_empty());

        let mut diags = Diagnostics::default();
        state(&[], &[]).validate(&mut diags, AttributePath::default());
        assert_eq!(diags.errors.len(), 1);

        let mut diags = Diagnostics::default();
        state(&["10.0.0.0/33", "10.0.0.0"], &["dns.example.com"])
            .validate(&mut diags, AttributePath::default());
        assert_eq!(diags.errors.len(), 3);
    }

    #[test]
    fn state_is_applied_to_the_existing_network() {
        let mut virtual_network: VirtualNetwork = serde_json::from_value(serde_json::json!({
            "location": "westeurope",
            "properties": {
                "addressSpace": {"addressPrefixes": ["10.0.0.0/16"]},
                "subnets": [{"name": "internal"}]
            }
        }))
        .unwrap();
        VirtualNetworkResource::apply(
            &mut virtual_network,
            &state(&["10.0.0.0/16", "10.1.0.0/16"], &[]),
        );
        assert_eq!(
            virtual_network
                .properties
                .address_space
                .as_ref()
                .unwrap()
                .address_prefixes
                .len(),
            2
        );
        assert!(virtual_network.properties.other.contains_key("subnets"));
    }

    #[test]
    fn moving_forces_a_new_resource() {
        let prior = state(&["10.0.0.0/16"], &[]);
        let mut planned = state(&["10.1.0.0/16"], &[]);
        assert!(VirtualNetworkResource
            .plan_update(&prior, &mut planned)
            .is_empty());

        planned.resource_group_name = Value::Value(Cow::Borrowed("other"));
        assert_eq!(
            VirtualNetworkResource.plan_update(&prior, &mut planned),
            vec![AttributePath::new("resource_group_name")]
        );
    }
}

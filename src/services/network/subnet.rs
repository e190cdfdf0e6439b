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

use std::borrow::Cow;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tf_provider::{
    map,
    schema::{AttributeConstraint, AttributeType, Block, Description, Schema},
    value::{self, ValueBool, ValueList, ValueString, Value},
    AttributePath, Diagnostics,
};

use crate::{
    client::locks,
    clients::Clients,
    resource::{
        schema::{attribute, id_attribute, report_errors, resource_group_name_errors, validate_one_of},
        ArmResource, ArmState, Timeouts, TimeoutsBlock,
    },
    resourceids::{ResourceId, SubnetId},
    utils::{string_list, to_string_list, WithSchema, WithValidate},
};

use super::{
    cidr_errors,
    client::{
        ServiceEndpoint, Subnet, SubnetsClient, VirtualNetworkPrivateEndpointNetworkPolicies,
    },
    SUBNET_LOCK, VIRTUAL_NETWORK_LOCK,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub name: ValueString<'a>,
    pub resource_group_name: ValueString<'a>,
    pub virtual_network_name: ValueString<'a>,
    pub address_prefixes: ValueList<ValueString<'a>>,
    pub service_endpoints: ValueList<ValueString<'a>>,
    pub private_endpoint_network_policies: ValueString<'a>,
    pub default_outbound_access_enabled: ValueBool,
    #[serde(with = "value::serde_as_vec")]
    pub timeouts: Value<TimeoutsBlock<'a>>,
}

impl<'a> WithSchema for SubnetState<'a> {
    fn schema() -> Schema {
        let strings = AttributeType::List(AttributeType::String.into());
        let force_new = |what: &str| format!("{what}, changing it forces a new resource");
        Schema {
            version: 1,
            block: Block {
                description: Description::plain("Manages a Subnet within a Virtual Network"),
                attributes: map! {
                    "id" => id_attribute(),
                    "name" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        &force_new("Name of the Subnet"),
                    ),
                    "resource_group_name" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        &force_new("Resource Group of the Virtual Network"),
                    ),
                    "virtual_network_name" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        &force_new("Name of the Virtual Network the Subnet belongs to"),
                    ),
                    "address_prefixes" => attribute(
                        strings.clone(),
                        AttributeConstraint::Required,
                        "Address prefixes of the Subnet, in CIDR notation",
                    ),
                    "service_endpoints" => attribute(
                        strings,
                        AttributeConstraint::Optional,
                        "Service endpoints enabled on the Subnet, like `Microsoft.Storage`",
                    ),
                    "private_endpoint_network_policies" => attribute(
                        AttributeType::String,
                        AttributeConstraint::OptionalComputed,
                        "Network policies applied to the private endpoints of the Subnet (default: `Disabled`)",
                    ),
                    "default_outbound_access_enabled" => attribute(
                        AttributeType::Bool,
                        AttributeConstraint::OptionalComputed,
                        "Whether the default outbound access is enabled (default: `true`)",
                    ),
                },
                blocks: map! {
                    "timeouts" => Timeouts::default().block(),
                },
                ..Default::default()
            },
        }
    }
}

impl<'a> WithValidate for SubnetState<'a> {
    fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath) {
        for (name, value) in [
            ("name", &self.name),
            ("virtual_network_name", &self.virtual_network_name),
        ] {
            if value.as_deref_option() == Some("") {
                diags.error_short(
                    format!("`{name}` must not be empty"),
                    attr_path.clone().attribute(name),
                );
            }
        }
        if let Some(name) = self.resource_group_name.as_deref_option() {
            report_errors(
                diags,
                resource_group_name_errors(name),
                attr_path.clone().attribute("resource_group_name"),
            );
        }

        if let Value::Value(prefixes) = &self.address_prefixes {
            if prefixes.is_empty() {
                diags.error_short(
                    "`address_prefixes` must contain at least one prefix",
                    attr_path.clone().attribute("address_prefixes"),
                );
            }
            for (index, prefix) in prefixes.iter().enumerate() {
                if let Some(prefix) = prefix.as_deref_option() {
                    report_errors(
                        diags,
                        cidr_errors(prefix),
                        attr_path
                            .clone()
                            .attribute("address_prefixes")
                            .index(index as i64),
                    );
                }
            }
        }
        if let Value::Value(endpoints) = &self.service_endpoints {
            for (index, endpoint) in endpoints.iter().enumerate() {
                if endpoint.as_deref_option() == Some("") {
                    diags.error_short(
                        "service endpoints must not be empty",
                        attr_path
                            .clone()
                            .attribute("service_endpoints")
                            .index(index as i64),
                    );
                }
            }
        }

        validate_one_of(
            diags,
            &self.private_endpoint_network_policies,
            VirtualNetworkPrivateEndpointNetworkPolicies::possible_values(),
            false,
            attr_path.clone().attribute("private_endpoint_network_policies"),
        );
        self.timeouts
            .validate(diags, attr_path.attribute("timeouts"));
    }
}

impl<'a> ArmState<'a> for SubnetState<'a> {
    fn id(&self) -> &ValueString<'a> {
        &self.id
    }

    fn id_mut(&mut self) -> &mut ValueString<'a> {
        &mut self.id
    }

    fn timeouts(&self) -> &Value<TimeoutsBlock<'a>> {
        &self.timeouts
    }
}

#[derive(Debug, Default, Clone)]
pub struct SubnetResource;

impl SubnetResource {
    fn apply(subnet: &mut Subnet, state: &SubnetState) {
        let properties = &mut subnet.properties;
        let mut prefixes = string_list(&state.address_prefixes);
        if prefixes.len() == 1 {
            properties.address_prefix = prefixes.pop();
            properties.address_prefixes = None;
        } else {
            properties.address_prefix = None;
            properties.address_prefixes = Some(prefixes);
        }
        properties.service_endpoints = Some(
            string_list(&state.service_endpoints)
                .into_iter()
                .map(|service| ServiceEndpoint {
                    service,
                    locations: None,
                })
                .collect(),
        );
        if let Some(policies) = state.private_endpoint_network_policies.as_deref_option() {
            properties.private_endpoint_network_policies =
                Some(VirtualNetworkPrivateEndpointNetworkPolicies::parse(policies));
        }
        if let Value::Value(enabled) = state.default_outbound_access_enabled {
            properties.default_outbound_access = Some(enabled);
        }
    }
}

#[async_trait]
impl ArmResource for SubnetResource {
    const TYPE_NAME: &'static str = "azurerm_subnet";
    const TIMEOUTS: Timeouts = Timeouts::minutes(30, 5, 30, 30);

    type Id = SubnetId;
    type State<'a> = SubnetState<'a>;

    fn build_id<'a>(&self, clients: &Clients, config: &Self::State<'a>) -> Result<Self::Id> {
        let known = |value: &ValueString, attribute: &str| {
            value
                .as_deref_option()
                .map(str::to_owned)
                .ok_or_else(|| anyhow!("`{attribute}` must be known to create a Subnet"))
        };
        Ok(SubnetId::new(
            clients.subscription_id.as_str(),
            known(&config.resource_group_name, "resource_group_name")?,
            known(&config.virtual_network_name, "virtual_network_name")?,
            known(&config.name, "name")?,
        ))
    }

    fn plan_create<'a>(&self, state: &mut Self::State<'a>) {
        if state.private_endpoint_network_policies.is_null() {
            state.private_endpoint_network_policies = Value::Value(Cow::Owned(
                VirtualNetworkPrivateEndpointNetworkPolicies::Disabled.to_string(),
            ));
        }
        if state.default_outbound_access_enabled.is_null() {
            state.default_outbound_access_enabled = Value::Value(true);
        }
    }

    fn plan_update<'a>(
        &self,
        prior: &Self::State<'a>,
        planned: &mut Self::State<'a>,
    ) -> Vec<AttributePath> {
        [
            ("name", &prior.name, &planned.name),
            (
                "resource_group_name",
                &prior.resource_group_name,
                &planned.resource_group_name,
            ),
            (
                "virtual_network_name",
                &prior.virtual_network_name,
                &planned.virtual_network_name,
            ),
        ]
        .into_iter()
        .filter(|(_, prior, planned)| prior != planned)
        .map(|(name, _, _)| AttributePath::new(name))
        .collect()
    }

    async fn exists(&self, clients: &Clients, id: &Self::Id) -> Result<bool> {
        Ok(SubnetsClient::new(&clients.arm).get(id).await?.is_some())
    }

    async fn create<'a>(
        &self,
        clients: &Clients,
        id: &Self::Id,
        planned: &Self::State<'a>,
    ) -> Result<()> {
        let mut subnet = Subnet::default();
        Self::apply(&mut subnet, planned);

        let _network_lock =
            locks::lock_by_name(VIRTUAL_NETWORK_LOCK, &id.virtual_network_name).await;
        let _lock = locks::lock_by_name(SUBNET_LOCK, &id.subnet_name).await;
        SubnetsClient::new(&clients.arm)
            .create_or_update(id, &subnet)
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
        let Some(subnet) = SubnetsClient::new(&clients.arm)
            .get(id)
            .await
            .with_context(|| format!("retrieving {id}"))?
        else {
            return Ok(None);
        };
        let properties = subnet.properties;
        let service_endpoints = properties
            .service_endpoints
            .clone()
            .unwrap_or_default()
            .into_iter()
            .map(|endpoint| endpoint.service)
            .collect::<Vec<_>>();

        Ok(Some(SubnetState {
            id: Value::Value(Cow::Owned(id.id())),
            name: Value::Value(Cow::Owned(id.subnet_name.clone())),
            resource_group_name: Value::Value(Cow::Owned(id.resource_group_name.clone())),
            virtual_network_name: Value::Value(Cow::Owned(id.virtual_network_name.clone())),
            address_prefixes: to_string_list(properties.prefixes()),
            service_endpoints: if service_endpoints.is_empty() && state.service_endpoints.is_null()
            {
                Value::Null
            } else {
                to_string_list(service_endpoints)
            },
            private_endpoint_network_policies: Value::Value(Cow::Owned(
                properties
                    .private_endpoint_network_policies
                    .unwrap_or(VirtualNetworkPrivateEndpointNetworkPolicies::Disabled)
                    .to_string(),
            )),
            default_outbound_access_enabled: Value::Value(
                properties.default_outbound_access.unwrap_or(true),
            ),
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
        let client = SubnetsClient::new(&clients.arm);
        let _network_lock =
            locks::lock_by_name(VIRTUAL_NETWORK_LOCK, &id.virtual_network_name).await;
        let _lock = locks::lock_by_name(SUBNET_LOCK, &id.subnet_name).await;

        // delegations, route tables and security groups are managed elsewhere
        let mut subnet = client
            .get(id)
            .await
            .with_context(|| format!("retrieving {id}"))?
            .ok_or_else(|| anyhow!("{id} was not found"))?;
        Self::apply(&mut subnet, planned);

        client
            .create_or_update(id, &subnet)
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
        let _network_lock =
            locks::lock_by_name(VIRTUAL_NETWORK_LOCK, &id.virtual_network_name).await;
        let _lock = locks::lock_by_name(SUBNET_LOCK, &id.subnet_name).await;
        SubnetsClient::new(&clients.arm)
            .delete(id)
            .await
            .with_context(|| format!("deleting {id}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state<'a>(prefixes: &[&'a str]) -> SubnetState<'a> {
        SubnetState {
            name: Value::Value(Cow::Borrowed("internal")),
            resource_group_name: Value::Value(Cow::Borrowed("rg")),
            virtual_network_name: Value::Value(Cow::Borrowed("vnet")),
            address_prefixes: Value::Value(
                prefixes
                    .iter()
                    .map(|prefix| Value::Value(Cow::Borrowed(*prefix)))
                    .collect(),
            ),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_are_planned() {
        let mut planned = state(&["10.0.1.0/24"]);
        SubnetResource.plan_create(&mut planned);
        assert_eq!(
            planned.private_endpoint_network_policies,
            Value::Value(Cow::Borrowed("Disabled"))
        );
        assert_eq!(planned.default_outbound_access_enabled, Value::Value(true));
    }

    #[test]
    fn policies_are_case_sensitive() {
        let mut config = state(&["10.0.1.0/24"]);
        config.private_endpoint_network_policies = Value::Value(Cow::Borrowed("disabled"));
        let mut diags = Diagnostics::default();
        config.validate(&mut diags, AttributePath::default());
        assert_eq!(diags.errors.len(), 1);
    }

    #[test]
    fn single_prefix_uses_the_single_form() {
        let mut subnet = Subnet::default();
        SubnetResource::apply(&mut subnet, &state(&["10.0.1.0/24"]));
        assert_eq!(subnet.properties.address_prefix.as_deref(), Some("10.0.1.0/24"));
        assert!(subnet.properties.address_prefixes.is_none());

        SubnetResource::apply(&mut subnet, &state(&["10.0.1.0/24", "10.0.2.0/24"]));
        assert!(subnet.properties.address_prefix.is_none());
        assert_eq!(subnet.properties.address_prefixes.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn moving_to_another_network_forces_a_new_resource() {
        let prior = state(&["10.0.1.0/24"]);
        let mut planned = state(&["10.0.2.0/24"]);
        planned.virtual_network_name = Value::Value(Cow::Borrowed("other"));
        assert_eq!(
            SubnetResource.plan_update(&prior, &mut planned),
            vec![AttributePath::new("virtual_network_name")]
        );
    }
}

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

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tf_provider::{
    map,
    schema::{AttributeConstraint, AttributeType, Block, Description, Schema},
    value::{self, ValueMap, ValueString, Value, ValueEmpty},
    AttributePath, DataSource, Diagnostics,
};
use tracing::info;

use crate::{
    clients::{ClientHandle, Clients},
    resource::{
        schema::{
            attribute, flatten_tags, id_attribute, location_attribute, normalize_location,
            report_errors, resource_group_name_errors, tags_attribute, validate_location,
            validate_tags,
        },
        ArmResource, ArmState, Timeouts, TimeoutsBlock,
    },
    resourceids::{ResourceGroupId, ResourceId},
    utils::{non_empty_string, string_map, WithSchema, WithValidate},
};

use super::client::{ResourceGroup, ResourceGroupPatch, ResourceGroupsClient};

const TIMEOUTS: Timeouts = Timeouts::minutes(90, 5, 90, 90);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGroupState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub name: ValueString<'a>,
    pub location: ValueString<'a>,
    pub managed_by: ValueString<'a>,
    pub tags: ValueMap<'a, ValueString<'a>>,
    #[serde(with = "value::serde_as_vec")]
    pub timeouts: Value<TimeoutsBlock<'a>>,
}

impl<'a> WithSchema for ResourceGroupState<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                description: Description::plain("Manages a Resource Group"),
                attributes: map! {
                    "id" => id_attribute(),
                    "name" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "Name of the Resource Group, changing it forces a new resource",
                    ),
                    "location" => location_attribute(AttributeConstraint::Required),
                    "managed_by" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Optional,
                        "ID of the resource or application that manages this Resource Group",
                    ),
                    "tags" => tags_attribute(AttributeConstraint::Optional),
                },
                blocks: map! {
                    "timeouts" => TIMEOUTS.block(),
                },
                ..Default::default()
            },
        }
    }
}

impl<'a> WithValidate for ResourceGroupState<'a> {
    fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath) {
        if let Some(name) = self.name.as_deref_option() {
            report_errors(
                diags,
                resource_group_name_errors(name),
                attr_path.clone().attribute("name"),
            );
        }
        if self.managed_by.as_deref_option() == Some("") {
            diags.error_short(
                "`managed_by` must not be empty",
                attr_path.clone().attribute("managed_by"),
            );
        }
        validate_location(diags, &self.location, attr_path.clone().attribute("location"));
        validate_tags(diags, &self.tags, attr_path.clone().attribute("tags"));
        self.timeouts
            .validate(diags, attr_path.attribute("timeouts"));
    }
}

impl<'a> ArmState<'a> for ResourceGroupState<'a> {
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
pub struct ResourceGroupResource;

/// Message returned when a resource group cannot be deleted because of its content
fn still_contains_resources(id: &ResourceGroupId, resources: &[String]) -> String {
    format!(
        "the Resource Group {:?} still contains Resources.\n\n\
        Terraform is configured to check for Resources within the Resource Group when deleting \
        the Resource Group, and to raise an error if nested Resources still exist to avoid \
        unintentionally deleting these Resources.\n\n\
        The following Resources still exist within the Resource Group:\n\n{}\n\n\
        Either remove these Resources, or disable this check with the \
        `prevent_deletion_if_contains_resources` feature flag of the `resource_group` block \
        within the provider `features` block.",
        id.resource_group_name,
        resources
            .iter()
            .map(|resource| format!("* `{resource}`"))
            .join("\n")
    )
}

/// Update body turning `prior` into `planned`
fn patch(prior: &ResourceGroupState, planned: &ResourceGroupState) -> ResourceGroupPatch {
    let managed_by = match (
        prior.managed_by.as_deref_option(),
        planned.managed_by.as_deref_option(),
    ) {
        (_, Some(managed_by)) => Some(Some(managed_by.to_owned())),
        (Some(_), None) => Some(None),
        (None, None) => None,
    };
    ResourceGroupPatch {
        managed_by,
        tags: string_map(&planned.tags),
    }
}

#[async_trait]
impl ArmResource for ResourceGroupResource {
    const TYPE_NAME: &'static str = "azurerm_resource_group";
    const TIMEOUTS: Timeouts = TIMEOUTS;

    type Id = ResourceGroupId;
    type State<'a> = ResourceGroupState<'a>;

    fn build_id<'a>(&self, clients: &Clients, config: &Self::State<'a>) -> Result<Self::Id> {
        let name = config
            .name
            .as_deref_option()
            .ok_or_else(|| anyhow!("`name` must be known to create a Resource Group"))?;
        Ok(ResourceGroupId::new(clients.subscription_id.as_str(), name))
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
        let location = |state: &Self::State<'a>| {
            state.location.as_deref_option().map(normalize_location)
        };
        if location(prior) != location(planned) {
            replace.push(AttributePath::new("location"));
        }
        replace
    }

    async fn exists(&self, clients: &Clients, id: &Self::Id) -> Result<bool> {
        Ok(ResourceGroupsClient::new(&clients.arm)
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
        let resource_group = ResourceGroup {
            location: planned.location.as_deref_option().unwrap_or_default().to_owned(),
            managed_by: planned.managed_by.as_deref_option().map(str::to_owned),
            tags: Some(string_map(&planned.tags)),
            ..Default::default()
        };
        ResourceGroupsClient::new(&clients.arm)
            .create_or_update(id, &resource_group)
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
        let Some(resource_group) = ResourceGroupsClient::new(&clients.arm)
            .get(id)
            .await
            .with_context(|| format!("retrieving {id}"))?
        else {
            return Ok(None);
        };

        Ok(Some(ResourceGroupState {
            id: Value::Value(Cow::Owned(id.id())),
            name: Value::Value(Cow::Owned(
                resource_group
                    .name
                    .unwrap_or_else(|| id.resource_group_name.clone()),
            )),
            location: Value::Value(Cow::Owned(resource_group.location)),
            managed_by: resource_group
                .managed_by
                .map_or(Value::Null, non_empty_string),
            tags: flatten_tags(resource_group.tags, &state.tags),
            timeouts: state.timeouts,
        }))
    }

    async fn update<'a>(
        &self,
        clients: &Clients,
        id: &Self::Id,
        prior: &Self::State<'a>,
        planned: &Self::State<'a>,
    ) -> Result<()> {
        ResourceGroupsClient::new(&clients.arm)
            .update(id, &patch(prior, planned))
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
        let client = ResourceGroupsClient::new(&clients.arm);

        if clients.features.prevent_deletion_if_contains_resources {
            let resources = client
                .list_resources(id)
                .await
                .with_context(|| format!("listing the resources within {id}"))?;
            if !resources.is_empty() {
                let ids = resources
                    .into_iter()
                    .map(|resource| resource.id)
                    .collect::<Vec<_>>();
                bail!(still_contains_resources(id, &ids));
            }
        }

        info!(id = %id.id(), "waiting for the resource group to be deleted");
        client
            .delete(id)
            .await
            .with_context(|| format!("deleting {id}"))?;
        Ok(())
    }
}

/// `azurerm_resource_group` data source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGroupDataState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub name: ValueString<'a>,
    pub location: ValueString<'a>,
    pub managed_by: ValueString<'a>,
    pub tags: ValueMap<'a, ValueString<'a>>,
}

impl<'a> WithSchema for ResourceGroupDataState<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                description: Description::plain("Reads an existing Resource Group"),
                attributes: map! {
                    "id" => id_attribute(),
                    "name" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "Name of the Resource Group",
                    ),
                    "location" => location_attribute(AttributeConstraint::Computed),
                    "managed_by" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Computed,
                        "ID of the resource or application that manages this Resource Group",
                    ),
                    "tags" => tags_attribute(AttributeConstraint::Computed),
                },
                ..Default::default()
            },
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct ResourceGroupDataSource {
    clients: ClientHandle,
}

impl ResourceGroupDataSource {
    pub fn new(clients: ClientHandle) -> Self {
        Self { clients }
    }
}

#[async_trait]
impl DataSource for ResourceGroupDataSource {
    type State<'a> = ResourceGroupDataState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(ResourceGroupDataState::schema())
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        if let Some(name) = config.name.as_deref_option() {
            report_errors(
                diags,
                resource_group_name_errors(name),
                AttributePath::new("name"),
            );
        }

        if diags.errors.is_empty() {
            Some(())
        } else {
            None
        }
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        config: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::State<'a>> {
        let clients = self.clients.get_or_report(diags).await?;
        let Some(name) = config.name.as_deref_option() else {
            diags.error_short("`name` must be known", AttributePath::new("name"));
            return None;
        };
        let id = ResourceGroupId::new(clients.subscription_id.as_str(), name);

        match ResourceGroupsClient::new(&clients.arm).get(&id).await {
            Ok(Some(resource_group)) => Some(ResourceGroupDataState {
                id: Value::Value(Cow::Owned(id.id())),
                name: config.name.clone(),
                location: Value::Value(Cow::Owned(resource_group.location)),
                managed_by: resource_group
                    .managed_by
                    .map_or(Value::Null, non_empty_string),
                tags: flatten_tags(resource_group.tags, &Value::Value(Default::default())),
            }),
            Ok(None) => {
                diags.error(
                    "Resource Group not found",
                    format!("{id} was not found"),
                    AttributePath::new("name"),
                );
                None
            }
            Err(err) => {
                diags.root_error(format!("Retrieving {id}"), err.to_string());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state<'a>(name: &'a str, location: &'a str) -> ResourceGroupState<'a> {
        ResourceGroupState {
            name: Value::Value(Cow::Borrowed(name)),
            location: Value::Value(Cow::Borrowed(location)),
            ..Default::default()
        }
    }

    #[test]
    fn renaming_forces_a_new_resource() {
        let prior = state("rg", "westeurope");
        let mut planned = state("rg2", "West Europe");
        assert_eq!(
            ResourceGroupResource.plan_update(&prior, &mut planned),
            vec![AttributePath::new("name")]
        );

        let mut moved = state("rg", "northeurope");
        assert_eq!(
            ResourceGroupResource.plan_update(&prior, &mut moved),
            vec![AttributePath::new("location")]
        );
    }

    #[test]
    fn removed_manager_is_cleared() {
        let mut prior = state("rg", "westeurope");
        prior.managed_by = Value::Value(Cow::Borrowed("/subscriptions/x/app"));
        let planned = state("rg", "westeurope");
        assert_eq!(
            serde_json::to_value(patch(&prior, &planned)).unwrap(),
            serde_json::json!({"managedBy": null, "tags": {}})
        );

        assert_eq!(
            serde_json::to_value(patch(&planned, &prior)).unwrap(),
            serde_json::json!({"managedBy": "/subscriptions/x/app", "tags": {}})
        );
        assert_eq!(
            serde_json::to_value(patch(&planned, &planned)).unwrap(),
            serde_json::json!({"tags": {}})
        );
    }

    #[test]
    fn invalid_names_are_reported() {
        let mut diags = Diagnostics::default();
        state("rg.", "westeurope").validate(&mut diags, AttributePath::default());
        assert_eq!(diags.errors.len(), 1);

        let mut diags = Diagnostics::default();
        state("rg", "westeurope").validate(&mut diags, AttributePath::default());
        assert!(diags.errors.is_empty());
    }

    #[test]
    fn remaining_resources_are_listed() {
        let id = ResourceGroupId::new("00000000-0000-0000-0000-000000000000", "rg");
        let message = still_contains_resources(
            &id,
            &["/subscriptions/x/resourceGroups/rg/providers/Microsoft.Network/virtualNetworks/vnet"
                .to_owned()],
        );
        assert!(message.contains("* `/subscriptions/x/resourceGroups/rg/providers/Microsoft.Network/virtualNetworks/vnet`"));
        assert!(message.contains("prevent_deletion_if_contains_resources"));
    }
}

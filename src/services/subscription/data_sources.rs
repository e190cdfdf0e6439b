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

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tf_provider::{
    map,
    schema::{AttributeConstraint, AttributeType, Block, Description, Schema},
    value::{ValueString, Value, ValueEmpty},
    AttributePath, DataSource, Diagnostics,
};
use uuid::Uuid;

use crate::{
    clients::ClientHandle,
    resource::schema::{attribute, id_attribute},
    resourceids::{ResourceId, SubscriptionId},
    utils::{non_empty_string, optional_string},
};

use super::client::SubscriptionsClient;

fn computed(description: &str) -> tf_provider::schema::Attribute {
    attribute(AttributeType::String, AttributeConstraint::Computed, description)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionDataState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub subscription_id: ValueString<'a>,
    pub display_name: ValueString<'a>,
    pub state: ValueString<'a>,
    pub tenant_id: ValueString<'a>,
}

/// `azurerm_subscription` data source
///
/// Reads the subscription of the provider unless `subscription_id` is set.
#[derive(Debug, Default, Clone)]
pub struct SubscriptionDataSource {
    clients: ClientHandle,
}

impl SubscriptionDataSource {
    pub fn new(clients: ClientHandle) -> Self {
        Self { clients }
    }
}

#[async_trait]
impl DataSource for SubscriptionDataSource {
    type State<'a> = SubscriptionDataState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(Schema {
            version: 1,
            block: Block {
                description: Description::plain("Reads a Subscription"),
                attributes: map! {
                    "id" => id_attribute(),
                    "subscription_id" => attribute(
                        AttributeType::String,
                        AttributeConstraint::OptionalComputed,
                        "ID of the Subscription, defaults to the Subscription of the provider",
                    ),
                    "display_name" => computed("Display name of the Subscription"),
                    "state" => computed("State of the Subscription, like `Enabled` or `Disabled`"),
                    "tenant_id" => computed("Tenant the Subscription belongs to"),
                },
                ..Default::default()
            },
        })
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        if let Some(subscription_id) = config.subscription_id.as_deref_option() {
            if Uuid::parse_str(subscription_id).is_err() {
                diags.error(
                    "Invalid value",
                    format!("expected a UUID, got {subscription_id:?}"),
                    AttributePath::new("subscription_id"),
                );
            }
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
        let id = SubscriptionId::new(
            config
                .subscription_id
                .as_deref_option()
                .unwrap_or(clients.subscription_id.as_str()),
        );

        match SubscriptionsClient::new(&clients.arm).get(&id).await {
            Ok(Some(subscription)) => Some(SubscriptionDataState {
                id: Value::Value(Cow::Owned(id.id())),
                subscription_id: Value::Value(Cow::Owned(subscription.subscription_id)),
                display_name: non_empty_string(subscription.display_name),
                state: optional_string(subscription.state.map(|state| state.to_string())),
                tenant_id: optional_string(subscription.tenant_id),
            }),
            Ok(None) => {
                diags.root_error("Subscription not found", format!("{id} was not found"));
                None
            }
            Err(err) => {
                diags.root_error(format!("Retrieving {id}"), err.to_string());
                None
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfigDataState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub client_id: ValueString<'a>,
    pub tenant_id: ValueString<'a>,
    pub subscription_id: ValueString<'a>,
    pub object_id: ValueString<'a>,
}

/// `azurerm_client_config` data source: the identity the provider authenticates with
#[derive(Debug, Default, Clone)]
pub struct ClientConfigDataSource {
    clients: ClientHandle,
}

impl ClientConfigDataSource {
    pub fn new(clients: ClientHandle) -> Self {
        Self { clients }
    }
}

#[async_trait]
impl DataSource for ClientConfigDataSource {
    type State<'a> = ClientConfigDataState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(Schema {
            version: 1,
            block: Block {
                description: Description::plain(
                    "Reads the configuration of the identity used by the provider",
                ),
                attributes: map! {
                    "id" => computed("Opaque identifier of the configuration"),
                    "client_id" => computed("Client ID of the application or user"),
                    "tenant_id" => computed("Tenant ID"),
                    "subscription_id" => computed("Subscription ID of the provider"),
                    "object_id" => computed("Object ID of the principal"),
                },
                ..Default::default()
            },
        })
    }

    async fn validate<'a>(&self, _diags: &mut Diagnostics, _config: Self::State<'a>) -> Option<()> {
        Some(())
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        _config: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::State<'a>> {
        let clients = self.clients.get_or_report(diags).await?;
        let owned = |value: &str| Value::Value(Cow::Owned(value.to_owned()));

        Some(ClientConfigDataState {
            id: owned(&format!(
                "clientConfigs/clientId={};objectId={};subscriptionId={};tenantId={}",
                clients.client_id, clients.object_id, clients.subscription_id, clients.tenant_id
            )),
            client_id: owned(&clients.client_id),
            tenant_id: owned(&clients.tenant_id),
            subscription_id: owned(&clients.subscription_id),
            object_id: owned(&clients.object_id),
        })
    }
}

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
use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tf_provider::{
    map,
    schema::{Attribute, AttributeConstraint, AttributeType, Block, Description, Schema},
    value::{self, ValueBool, ValueMap, ValueString, Value},
    AttributePath, Diagnostics,
};
use tracing::warn;

use crate::{
    clients::Clients,
    resource::{
        schema::{
            attribute, flatten_tags, id_attribute, location_attribute, normalize_location,
            report_errors, resource_group_name_errors, tags_attribute, validate_location,
            validate_one_of, validate_tags,
        },
        ArmResource, ArmState, Timeouts, TimeoutsBlock,
    },
    resourceids::{ResourceId, StorageAccountId},
    utils::{optional_string, string_map, WithSchema, WithValidate},
};

use super::client::{
    AccessTier, Kind, MinimumTlsVersion, PublicNetworkAccess, ReplicationType, Sku, SkuTier,
    StorageAccount, StorageAccountProperties, StorageAccountUpdate, StorageAccountsClient,
};

lazy_static! {
    static ref STORAGE_ACCOUNT_NAME: Regex =
        Regex::new(r"^[a-z0-9]{3,24}$").expect("storage account name pattern");
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageAccountState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub name: ValueString<'a>,
    pub resource_group_name: ValueString<'a>,
    pub location: ValueString<'a>,
    pub account_kind: ValueString<'a>,
    pub account_tier: ValueString<'a>,
    pub account_replication_type: ValueString<'a>,
    pub access_tier: ValueString<'a>,
    pub min_tls_version: ValueString<'a>,
    pub https_traffic_only_enabled: ValueBool,
    pub public_network_access_enabled: ValueBool,
    pub shared_access_key_enabled: ValueBool,
    pub tags: ValueMap<'a, ValueString<'a>>,
    pub primary_location: ValueString<'a>,
    pub secondary_location: ValueString<'a>,
    pub primary_blob_endpoint: ValueString<'a>,
    pub primary_access_key: ValueString<'a>,
    #[serde(with = "value::serde_as_vec")]
    pub timeouts: Value<TimeoutsBlock<'a>>,
}

fn one_of(values: &[&str]) -> String {
    values.iter().map(|v| format!("`{v}`")).join(", ")
}

impl<'a> WithSchema for StorageAccountState<'a> {
    fn schema() -> Schema {
        let string = |constraint, description: &str| {
            attribute(AttributeType::String, constraint, description)
        };
        let bool_with_default = |description: &str| {
            attribute(
                AttributeType::Bool,
                AttributeConstraint::OptionalComputed,
                &format!("{description} (default: `true`)"),
            )
        };
        Schema {
            version: 1,
            block: Block {
                description: Description::plain("Manages a Storage Account"),
                attributes: map! {
                    "id" => id_attribute(),
                    "name" => string(
                        AttributeConstraint::Required,
                        "Name of the Storage Account: 3 to 24 lowercase letters and numbers, changing it forces a new resource",
                    ),
                    "resource_group_name" => string(
                        AttributeConstraint::Required,
                        "Resource Group of the Storage Account, changing it forces a new resource",
                    ),
                    "location" => location_attribute(AttributeConstraint::Required),
                    "account_kind" => string(
                        AttributeConstraint::OptionalComputed,
                        &format!(
                            "Kind of account, one of {} (default: `StorageV2`)",
                            one_of(Kind::POSSIBLE_VALUES)
                        ),
                    ),
                    "account_tier" => string(
                        AttributeConstraint::Required,
                        &format!(
                            "Tier of the account, one of {}, changing it forces a new resource",
                            one_of(SkuTier::POSSIBLE_VALUES)
                        ),
                    ),
                    "account_replication_type" => string(
                        AttributeConstraint::Required,
                        &format!(
                            "Replication of the account, one of {}",
                            one_of(ReplicationType::POSSIBLE_VALUES)
                        ),
                    ),
                    "access_tier" => string(
                        AttributeConstraint::OptionalComputed,
                        &format!(
                            "Access tier of the account, one of {} (default: `Hot`)",
                            one_of(AccessTier::POSSIBLE_VALUES)
                        ),
                    ),
                    "min_tls_version" => string(
                        AttributeConstraint::OptionalComputed,
                        &format!(
                            "Minimum TLS version of the requests, one of {} (default: `TLS1_2`)",
                            one_of(MinimumTlsVersion::POSSIBLE_VALUES)
                        ),
                    ),
                    "https_traffic_only_enabled" => bool_with_default("Whether only HTTPS traffic is allowed"),
                    "public_network_access_enabled" => bool_with_default("Whether the account is reachable from public networks"),
                    "shared_access_key_enabled" => bool_with_default("Whether requests can be authorized with the account access key"),
                    "tags" => tags_attribute(AttributeConstraint::Optional),
                    "primary_location" => string(AttributeConstraint::Computed, "Location of the primary replica"),
                    "secondary_location" => string(AttributeConstraint::Computed, "Location of the secondary replica, when geo-replicated"),
                    "primary_blob_endpoint" => string(AttributeConstraint::Computed, "Endpoint of the blob service"),
                    "primary_access_key" => Attribute {
                        sensitive: true,
                        ..string(AttributeConstraint::Computed, "Primary access key of the account")
                    },
                },
                blocks: map! {
                    "timeouts" => StorageAccountResource::TIMEOUTS.block(),
                },
                ..Default::default()
            },
        }
    }
}

impl<'a> StorageAccountState<'a> {
    /// Kind of the account once defaults are applied, `None` while unknown
    fn kind(&self) -> Option<Kind> {
        match &self.account_kind {
            Value::Value(kind) => Some(Kind::parse(kind)),
            Value::Null => Some(Kind::StorageV2),
            Value::Unknown => None,
        }
    }

    fn replication(&self) -> Option<ReplicationType> {
        self.account_replication_type
            .as_deref_option()
            .map(ReplicationType::parse)
    }
}

impl<'a> WithValidate for StorageAccountState<'a> {
    fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath) {
        if let Some(name) = self.name.as_deref_option() {
            if !STORAGE_ACCOUNT_NAME.is_match(name) {
                diags.error(
                    "Invalid value",
                    format!("name {name:?} can only consist of lowercase letters and numbers, and must be between 3 and 24 characters long"),
                    attr_path.clone().attribute("name"),
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
        validate_location(diags, &self.location, attr_path.clone().attribute("location"));

        for (name, value, possible) in [
            ("account_kind", &self.account_kind, Kind::POSSIBLE_VALUES),
            ("account_tier", &self.account_tier, SkuTier::POSSIBLE_VALUES),
            (
                "account_replication_type",
                &self.account_replication_type,
                ReplicationType::POSSIBLE_VALUES,
            ),
            ("access_tier", &self.access_tier, AccessTier::POSSIBLE_VALUES),
            (
                "min_tls_version",
                &self.min_tls_version,
                MinimumTlsVersion::POSSIBLE_VALUES,
            ),
        ] {
            validate_one_of(diags, value, possible, false, attr_path.clone().attribute(name));
        }

        if let Some(kind) = self.kind() {
            if self.access_tier.as_deref_option().is_some() && !kind.supports_access_tier() {
                diags.error(
                    "Invalid value",
                    format!(
                        "`access_tier` is only available for accounts where `account_kind` is set to one of: {}",
                        Kind::POSSIBLE_VALUES
                            .iter()
                            .filter(|kind| Kind::parse(kind).supports_access_tier())
                            .join(" / ")
                    ),
                    attr_path.clone().attribute("access_tier"),
                );
            }
            if kind == Kind::FileStorage
                && self.account_tier.as_deref_option() == Some(SkuTier::Standard.as_str())
            {
                diags.error(
                    "Invalid value",
                    "`account_tier` must be `Premium` for File Storage accounts",
                    attr_path.clone().attribute("account_tier"),
                );
            }
            if kind == Kind::BlobStorage && self.replication() == Some(ReplicationType::Zrs) {
                diags.error(
                    "Invalid value",
                    "an `account_replication_type` of `ZRS` isn't supported for Blob Storage accounts",
                    attr_path.clone().attribute("account_replication_type"),
                );
            }
        }

        validate_tags(diags, &self.tags, attr_path.clone().attribute("tags"));
        self.timeouts
            .validate(diags, attr_path.attribute("timeouts"));
    }
}

impl<'a> ArmState<'a> for StorageAccountState<'a> {
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

/// Whether changing the kind of an account requires a new account
///
/// Only upgrades to `StorageV2`, and from general purpose v1 accounts, are done in place.
pub fn kind_change_forces_new(prior: &Kind, planned: &Kind) -> bool {
    prior != planned && *prior != Kind::Storage && *planned != Kind::StorageV2
}

/// Whether changing the replication of an account requires a new account
pub fn replication_change_forces_new(prior: &ReplicationType, planned: &ReplicationType) -> bool {
    prior.is_known() && planned.is_known() && prior.is_zone_redundant() != planned.is_zone_redundant()
}

fn bool_or_true(value: &ValueBool) -> bool {
    !matches!(value, Value::Value(false))
}

fn properties(state: &StorageAccountState, kind: &Kind) -> StorageAccountProperties {
    StorageAccountProperties {
        access_tier: kind.supports_access_tier().then(|| {
            state
                .access_tier
                .as_deref_option()
                .map_or(AccessTier::Hot, AccessTier::parse)
        }),
        minimum_tls_version: Some(
            state
                .min_tls_version
                .as_deref_option()
                .map_or(MinimumTlsVersion::Tls1_2, MinimumTlsVersion::parse),
        ),
        supports_https_traffic_only: Some(bool_or_true(&state.https_traffic_only_enabled)),
        public_network_access: Some(if bool_or_true(&state.public_network_access_enabled) {
            PublicNetworkAccess::Enabled
        } else {
            PublicNetworkAccess::Disabled
        }),
        allow_shared_key_access: Some(bool_or_true(&state.shared_access_key_enabled)),
        ..Default::default()
    }
}

/// Plan the access tier sent by [`properties`] when none is configured
fn plan_access_tier(state: &mut StorageAccountState) {
    if state.access_tier.is_null() {
        state.access_tier = match state.kind() {
            Some(kind) if kind.supports_access_tier() => {
                Value::Value(Cow::Owned(AccessTier::Hot.to_string()))
            }
            Some(_) => Value::Null,
            None => Value::Unknown,
        };
    }
}

fn sku(state: &StorageAccountState) -> Result<Sku> {
    let tier = state
        .account_tier
        .as_deref_option()
        .ok_or_else(|| anyhow!("`account_tier` must be known"))?;
    let replication = state
        .replication()
        .ok_or_else(|| anyhow!("`account_replication_type` must be known"))?;
    Ok(Sku::new(&SkuTier::parse(tier), &replication))
}

#[derive(Debug, Default, Clone)]
pub struct StorageAccountResource;

#[async_trait]
impl ArmResource for StorageAccountResource {
    const TYPE_NAME: &'static str = "azurerm_storage_account";
    const TIMEOUTS: Timeouts = Timeouts::minutes(60, 5, 60, 60);

    type Id = StorageAccountId;
    type State<'a> = StorageAccountState<'a>;

    fn build_id<'a>(&self, clients: &Clients, config: &Self::State<'a>) -> Result<Self::Id> {
        let missing =
            |attribute: &str| anyhow!("`{attribute}` must be known to create a Storage Account");
        Ok(StorageAccountId::new(
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
        if state.account_kind.is_null() {
            state.account_kind = Value::Value(Cow::Owned(Kind::StorageV2.to_string()));
        }
        plan_access_tier(state);
        if state.min_tls_version.is_null() {
            state.min_tls_version = Value::Value(Cow::Owned(MinimumTlsVersion::Tls1_2.to_string()));
        }
        for enabled in [
            &mut state.https_traffic_only_enabled,
            &mut state.public_network_access_enabled,
            &mut state.shared_access_key_enabled,
        ] {
            if enabled.is_null() {
                *enabled = Value::Value(true);
            }
        }
        state.primary_location = Value::Unknown;
        state.secondary_location = Value::Unknown;
        state.primary_blob_endpoint = Value::Unknown;
        state.primary_access_key = Value::Unknown;
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
        if prior.account_tier != planned.account_tier {
            replace.push(AttributePath::new("account_tier"));
        }
        if let (Some(prior_kind), Some(planned_kind)) = (prior.kind(), planned.kind()) {
            if kind_change_forces_new(&prior_kind, &planned_kind) {
                replace.push(AttributePath::new("account_kind"));
            }
        }
        if let (Some(prior_replication), Some(planned_replication)) =
            (prior.replication(), planned.replication())
        {
            if replication_change_forces_new(&prior_replication, &planned_replication) {
                replace.push(AttributePath::new("account_replication_type"));
            }
            if prior_replication != planned_replication {
                planned.secondary_location = Value::Unknown;
            }
        }
        // upgraded accounts get the default tier
        plan_access_tier(planned);
        replace
    }

    async fn exists(&self, clients: &Clients, id: &Self::Id) -> Result<bool> {
        Ok(StorageAccountsClient::new(&clients.arm)
            .get_properties(id)
            .await?
            .is_some())
    }

    async fn create<'a>(
        &self,
        clients: &Clients,
        id: &Self::Id,
        planned: &Self::State<'a>,
    ) -> Result<()> {
        let kind = planned.kind().unwrap_or(Kind::StorageV2);
        let account = StorageAccount {
            location: planned.location.as_deref_option().unwrap_or_default().to_owned(),
            sku: Some(sku(planned)?),
            tags: Some(string_map(&planned.tags)),
            properties: properties(planned, &kind),
            kind: Some(kind),
            ..Default::default()
        };

        StorageAccountsClient::new(&clients.arm)
            .create(id, &account)
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
        let client = StorageAccountsClient::new(&clients.arm);
        let Some(account) = client
            .get_properties(id)
            .await
            .with_context(|| format!("retrieving {id}"))?
        else {
            return Ok(None);
        };

        // keys cannot be listed through a read-only lock
        let primary_access_key = match client.list_keys(id).await {
            Ok(keys) => optional_string(keys.primary().map(str::to_owned)),
            Err(err)
                if matches!(
                    err.status(),
                    Some(StatusCode::FORBIDDEN | StatusCode::CONFLICT)
                ) =>
            {
                warn!(id = %id.id(), error = %err, "the access keys of the storage account cannot be listed");
                Value::Null
            }
            Err(err) => return Err(err).with_context(|| format!("listing the keys of {id}")),
        };

        let owned = |value: String| Value::Value(Cow::Owned(value));
        let (tier, replication) = account
            .sku
            .as_ref()
            .and_then(Sku::parts)
            .map_or((Value::Null, Value::Null), |(tier, replication)| {
                (owned(tier.to_string()), owned(replication.to_string()))
            });
        let properties = account.properties;

        Ok(Some(StorageAccountState {
            id: owned(id.id()),
            name: owned(id.storage_account_name.clone()),
            resource_group_name: owned(id.resource_group_name.clone()),
            location: owned(account.location),
            account_kind: optional_string(account.kind.map(|kind| kind.to_string())),
            account_tier: tier,
            account_replication_type: replication,
            access_tier: optional_string(properties.access_tier.map(|tier| tier.to_string())),
            min_tls_version: owned(
                properties
                    .minimum_tls_version
                    .unwrap_or(MinimumTlsVersion::Tls1_0)
                    .to_string(),
            ),
            https_traffic_only_enabled: Value::Value(
                properties.supports_https_traffic_only.unwrap_or(true),
            ),
            public_network_access_enabled: Value::Value(
                properties.public_network_access != Some(PublicNetworkAccess::Disabled),
            ),
            shared_access_key_enabled: Value::Value(
                properties.allow_shared_key_access.unwrap_or(true),
            ),
            tags: flatten_tags(account.tags, &state.tags),
            primary_location: optional_string(properties.primary_location),
            secondary_location: optional_string(properties.secondary_location),
            primary_blob_endpoint: optional_string(
                properties.primary_endpoints.and_then(|endpoints| endpoints.blob),
            ),
            primary_access_key,
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
        let kind = planned.kind().unwrap_or(Kind::StorageV2);
        let update = StorageAccountUpdate {
            kind: (prior.kind() != planned.kind()).then(|| kind.clone()),
            sku: if prior.account_replication_type != planned.account_replication_type {
                Some(sku(planned)?)
            } else {
                None
            },
            tags: Some(string_map(&planned.tags)),
            properties: properties(planned, &kind),
        };

        StorageAccountsClient::new(&clients.arm)
            .update(id, &update)
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
        StorageAccountsClient::new(&clients.arm)
            .delete(id)
            .await
            .with_context(|| format!("deleting {id}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state<'a>(name: &'a str, kind: Option<&'a str>, tier: &'a str, replication: &'a str) -> StorageAccountState<'a> {
        StorageAccountState {
            name: Value::Value(Cow::Borrowed(name)),
            resource_group_name: Value::Value(Cow::Borrowed("rg")),
            location: Value::Value(Cow::Borrowed("westeurope")),
            account_kind: optional_string(kind),
            account_tier: Value::Value(Cow::Borrowed(tier)),
            account_replication_type: Value::Value(Cow::Borrowed(replication)),
            ..Default::default()
        }
    }

    fn errors(state: &StorageAccountState) -> usize {
        let mut diags = Diagnostics::default();
        state.validate(&mut diags, AttributePath::default());
        diags.errors.len()
    }

    #[test]
    fn names_are_validated() {
        assert_eq!(errors(&state("account01", None, "Standard", "LRS")), 0);
        assert_eq!(errors(&state("Account01", None, "Standard", "LRS")), 1);
        assert_eq!(errors(&state("ab", None, "Standard", "LRS")), 1);
        assert_eq!(errors(&state(&"a".repeat(25), None, "Standard", "LRS")), 1);
    }

    #[test]
    fn kind_constraints() {
        let mut account = state("account01", Some("Storage"), "Standard", "LRS");
        account.access_tier = Value::Value(Cow::Borrowed("Hot"));
        assert_eq!(errors(&account), 1);

        assert_eq!(errors(&state("account01", Some("FileStorage"), "Standard", "LRS")), 1);
        assert_eq!(errors(&state("account01", Some("FileStorage"), "Premium", "LRS")), 0);
        assert_eq!(errors(&state("account01", Some("BlobStorage"), "Standard", "ZRS")), 1);
        assert_eq!(errors(&state("account01", Some("storagev2"), "Standard", "LRS")), 1);
    }

    #[test]
    fn defaults_are_planned() {
        let mut planned = state("account01", None, "Standard", "LRS");
        StorageAccountResource.plan_create(&mut planned);
        assert_eq!(planned.account_kind, Value::Value(Cow::Borrowed("StorageV2")));
        assert_eq!(planned.access_tier, Value::Value(Cow::Borrowed("Hot")));
        assert_eq!(planned.min_tls_version, Value::Value(Cow::Borrowed("TLS1_2")));
        assert_eq!(planned.shared_access_key_enabled, Value::Value(true));
        assert!(planned.primary_access_key.is_unknown());

        let mut v1 = state("account01", Some("Storage"), "Standard", "LRS");
        StorageAccountResource.plan_create(&mut v1);
        assert!(v1.access_tier.is_null());
    }

    #[test]
    fn kind_upgrades_are_done_in_place() {
        assert!(!kind_change_forces_new(&Kind::Storage, &Kind::StorageV2));
        assert!(!kind_change_forces_new(&Kind::BlobStorage, &Kind::StorageV2));
        assert!(kind_change_forces_new(&Kind::StorageV2, &Kind::BlobStorage));
        assert!(!kind_change_forces_new(&Kind::StorageV2, &Kind::StorageV2));
    }

    #[test]
    fn zonal_replication_changes_force_a_new_account() {
        assert!(!replication_change_forces_new(&ReplicationType::Lrs, &ReplicationType::Ragrs));
        assert!(!replication_change_forces_new(&ReplicationType::Zrs, &ReplicationType::Gzrs));
        assert!(replication_change_forces_new(&ReplicationType::Lrs, &ReplicationType::Zrs));
        assert!(replication_change_forces_new(&ReplicationType::Ragzrs, &ReplicationType::Grs));

        let prior = state("account01", Some("StorageV2"), "Standard", "LRS");
        let mut planned = state("account01", Some("StorageV2"), "Standard", "GRS");
        assert!(StorageAccountResource
            .plan_update(&prior, &mut planned)
            .is_empty());
        assert!(planned.secondary_location.is_unknown());

        let mut planned = state("account01", Some("StorageV2"), "Premium", "ZRS");
        assert_eq!(
            StorageAccountResource.plan_update(&prior, &mut planned),
            vec![
                AttributePath::new("account_tier"),
                AttributePath::new("account_replication_type")
            ]
        );
    }

    #[test]
    fn kind_upgrade_plans_the_access_tier_it_sends() {
        let prior = state("account01", Some("Storage"), "Standard", "LRS");
        let mut planned = state("account01", Some("StorageV2"), "Standard", "LRS");
        assert!(StorageAccountResource
            .plan_update(&prior, &mut planned)
            .is_empty());

        let kind = planned.kind().unwrap();
        let sent = properties(&planned, &kind).access_tier;
        assert_eq!(planned.access_tier.as_deref_option(), Some("Hot"));
        assert_eq!(sent, Some(AccessTier::Hot));

        let mut unchanged = prior.clone();
        StorageAccountResource.plan_update(&prior, &mut unchanged);
        assert!(unchanged.access_tier.is_null());
    }

    #[test]
    fn access_tier_is_only_sent_when_supported() {
        let account = state("account01", Some("Storage"), "Standard", "LRS");
        assert!(properties(&account, &Kind::Storage).access_tier.is_none());
        assert_eq!(
            properties(&account, &Kind::StorageV2).access_tier,
            Some(AccessTier::Hot)
        );
    }
}

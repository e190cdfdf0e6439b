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

//! Provider block and its resolution against the environment

use anyhow::{anyhow, bail, Context, Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tf_provider::{
    map,
    schema::{
        Attribute, AttributeConstraint, AttributeType, Block, Description, NestedBlock, Schema,
    },
    value::{self, ValueBool, ValueString, Value},
    AttributePath, Diagnostics,
};
use uuid::Uuid;

use crate::{
    environment::Environment,
    utils::{WithSchema, WithValidate},
};

/// Which resource providers are registered on `configure`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistrationMode {
    /// The providers of the supported resources
    #[default]
    Core,
    /// Registration is managed outside of Terraform
    None,
}

impl RegistrationMode {
    pub const POSSIBLE_VALUES: &'static [&'static str] = &["core", "none"];

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "core" => Ok(Self::Core),
            "none" => Ok(Self::None),
            _ => bail!(
                "expected one of {}, got {value:?}",
                Self::POSSIBLE_VALUES
                    .iter()
                    .map(|v| format!("{v:?}"))
                    .join(", ")
            ),
        }
    }
}

/// Behaviours toggled by the `features` block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Features {
    pub prevent_deletion_if_contains_resources: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            prevent_deletion_if_contains_resources: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceGroupFeatures {
    pub prevent_deletion_if_contains_resources: ValueBool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeaturesBlock {
    #[serde(with = "value::serde_as_vec")]
    pub resource_group: Value<ResourceGroupFeatures>,
}

impl FeaturesBlock {
    fn resolve(&self) -> Features {
        let mut features = Features::default();
        if let Value::Value(resource_group) = &self.resource_group {
            if let Value::Value(prevent) = resource_group.prevent_deletion_if_contains_resources {
                features.prevent_deletion_if_contains_resources = prevent;
            }
        }
        features
    }
}

/// Provider block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig<'a> {
    #[serde(borrow = "'a")]
    pub subscription_id: ValueString<'a>,
    pub tenant_id: ValueString<'a>,
    pub client_id: ValueString<'a>,
    pub client_secret: ValueString<'a>,
    pub environment: ValueString<'a>,
    pub use_cli: ValueBool,
    pub resource_provider_registrations: ValueString<'a>,
    pub features: Value<FeaturesBlock>,
}

/// Provider configuration, once the environment has been taken into account
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Empty when it must be read from the Azure CLI
    pub subscription_id: String,
    pub tenant_id: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub environment: Environment,
    pub use_cli: bool,
    pub registrations: RegistrationMode,
    pub features: Features,
}

impl std::fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("subscription_id", &self.subscription_id)
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("environment", &self.environment.name)
            .field("use_cli", &self.use_cli)
            .field("registrations", &self.registrations)
            .field("features", &self.features)
            .finish()
    }
}

fn string_attribute(description: &str, sensitive: bool) -> Attribute {
    Attribute {
        attr_type: AttributeType::String,
        description: Description::plain(description),
        constraint: AttributeConstraint::Optional,
        sensitive,
        ..Default::default()
    }
}

impl<'a> WithSchema for ProviderConfig<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                description: Description::plain("Azure Resource Manager"),
                attributes: map! {
                    "subscription_id" => string_attribute("Subscription ID, defaults to `ARM_SUBSCRIPTION_ID` or the Azure CLI account", false),
                    "tenant_id" => string_attribute("Tenant ID, defaults to `ARM_TENANT_ID`", false),
                    "client_id" => string_attribute("Client ID of the service principal, defaults to `ARM_CLIENT_ID`", false),
                    "client_secret" => string_attribute("Client secret of the service principal, defaults to `ARM_CLIENT_SECRET`", true),
                    "environment" => string_attribute("Cloud environment: `public`, `usgovernment` or `china`, defaults to `ARM_ENVIRONMENT` or `public`", false),
                    "use_cli" => Attribute {
                        attr_type: AttributeType::Bool,
                        description: Description::plain("Allow authenticating with the Azure CLI, defaults to `ARM_USE_CLI` or `true`"),
                        constraint: AttributeConstraint::Optional,
                        ..Default::default()
                    },
                    "resource_provider_registrations" => string_attribute("Resource providers to register: `core` or `none`, defaults to `ARM_RESOURCE_PROVIDER_REGISTRATIONS` or `core`", false),
                },
                blocks: map! {
                    "features" => NestedBlock::Single(Block {
                        description: Description::plain("Behaviours of the resources"),
                        blocks: map! {
                            "resource_group" => NestedBlock::Optional(Block {
                                description: Description::plain("Resource group behaviours"),
                                attributes: map! {
                                    "prevent_deletion_if_contains_resources" => Attribute {
                                        attr_type: AttributeType::Bool,
                                        description: Description::plain("Refuse to delete resource groups that still contain resources (default: true)"),
                                        constraint: AttributeConstraint::Optional,
                                        ..Default::default()
                                    },
                                },
                                ..Default::default()
                            }),
                        },
                        ..Default::default()
                    }),
                },
                ..Default::default()
            },
        }
    }
}

fn validate_uuid(diags: &mut Diagnostics, value: &ValueString, name: &'static str) {
    if let Some(value) = value.as_deref_option() {
        if Uuid::parse_str(value).is_err() {
            diags.error(
                "Invalid UUID",
                format!("`{name}` must be a UUID, got {value:?}"),
                AttributePath::new(name),
            );
        }
    }
}

impl<'a> WithValidate for ProviderConfig<'a> {
    fn validate(&self, diags: &mut Diagnostics, _attr_path: AttributePath) {
        validate_uuid(diags, &self.subscription_id, "subscription_id");
        validate_uuid(diags, &self.tenant_id, "tenant_id");
        validate_uuid(diags, &self.client_id, "client_id");

        if let Some(environment) = self.environment.as_deref_option() {
            if let Err(err) = Environment::from_name(environment) {
                diags.error(
                    "Invalid environment",
                    err.to_string(),
                    AttributePath::new("environment"),
                );
            }
        }
        if let Some(mode) = self.resource_provider_registrations.as_deref_option() {
            if let Err(err) = RegistrationMode::parse(mode) {
                diags.error(
                    "Invalid resource provider registrations",
                    err.to_string(),
                    AttributePath::new("resource_provider_registrations"),
                );
            }
        }
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(anyhow!("`{name}` must be a boolean, got {value:?}")),
    }
}

impl<'a> ProviderConfig<'a> {
    /// Resolve the configuration, `env` is used for the unset attributes
    pub fn resolve(&self, env: impl Fn(&str) -> Option<String>) -> Result<ResolvedConfig> {
        let string = |value: &ValueString, var: &str| {
            value
                .as_deref_option()
                .map(str::to_owned)
                .or_else(|| env(var))
                .filter(|value| !value.is_empty())
        };

        let environment = match string(&self.environment, "ARM_ENVIRONMENT") {
            Some(name) => Environment::from_name(&name)?,
            None => Environment::public(),
        };
        let use_cli = match self.use_cli {
            Value::Value(use_cli) => use_cli,
            _ => env("ARM_USE_CLI")
                .map(|value| parse_bool("ARM_USE_CLI", &value))
                .transpose()?
                .unwrap_or(true),
        };
        let registrations = string(
            &self.resource_provider_registrations,
            "ARM_RESOURCE_PROVIDER_REGISTRATIONS",
        )
        .map(|mode| RegistrationMode::parse(&mode))
        .transpose()
        .context("invalid resource provider registrations")?
        .unwrap_or_default();

        let features = match &self.features {
            Value::Value(features) => features.resolve(),
            _ => Features::default(),
        };

        Ok(ResolvedConfig {
            subscription_id: string(&self.subscription_id, "ARM_SUBSCRIPTION_ID")
                .unwrap_or_default(),
            tenant_id: string(&self.tenant_id, "ARM_TENANT_ID"),
            client_id: string(&self.client_id, "ARM_CLIENT_ID"),
            client_secret: string(&self.client_secret, "ARM_CLIENT_SECRET"),
            environment,
            use_cli,
            registrations,
            features,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{borrow::Cow, collections::HashMap};

    use super::*;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn attributes_take_precedence_over_the_environment() {
        let config = ProviderConfig {
            subscription_id: Value::Value(Cow::Borrowed("00000000-0000-0000-0000-000000000001")),
            ..Default::default()
        };
        let resolved = config
            .resolve(env(&[
                ("ARM_SUBSCRIPTION_ID", "00000000-0000-0000-0000-000000000002"),
                ("ARM_TENANT_ID", "00000000-0000-0000-0000-000000000003"),
                ("ARM_ENVIRONMENT", "china"),
                ("ARM_USE_CLI", "false"),
            ]))
            .unwrap();
        assert_eq!(
            resolved.subscription_id,
            "00000000-0000-0000-0000-000000000001"
        );
        assert_eq!(
            resolved.tenant_id.as_deref(),
            Some("00000000-0000-0000-0000-000000000003")
        );
        assert_eq!(resolved.environment, Environment::china());
        assert!(!resolved.use_cli);
        assert_eq!(resolved.registrations, RegistrationMode::Core);
        assert!(resolved.features.prevent_deletion_if_contains_resources);
    }

    #[test]
    fn features_are_resolved() {
        let config = ProviderConfig {
            features: Value::Value(FeaturesBlock {
                resource_group: Value::Value(ResourceGroupFeatures {
                    prevent_deletion_if_contains_resources: Value::Value(false),
                }),
            }),
            resource_provider_registrations: Value::Value(Cow::Borrowed("none")),
            ..Default::default()
        };
        let resolved = config.resolve(env(&[])).unwrap();
        assert!(!resolved.features.prevent_deletion_if_contains_resources);
        assert_eq!(resolved.registrations, RegistrationMode::None);
        assert!(resolved.use_cli);
        assert!(resolved.subscription_id.is_empty());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let config = ProviderConfig {
            tenant_id: Value::Value(Cow::Borrowed("not-a-uuid")),
            environment: Value::Value(Cow::Borrowed("mars")),
            resource_provider_registrations: Value::Value(Cow::Borrowed("all")),
            ..Default::default()
        };
        let mut diags = Diagnostics::default();
        config.validate(&mut diags, AttributePath::default());
        assert_eq!(diags.errors.len(), 3);

        assert!(ProviderConfig::default()
            .resolve(env(&[("ARM_USE_CLI", "maybe")]))
            .is_err());
    }

    #[test]
    fn debug_hides_the_secret() {
        let config = ProviderConfig {
            client_secret: Value::Value(Cow::Borrowed("hunter2")),
            ..Default::default()
        };
        let resolved = config.resolve(env(&[])).unwrap();
        assert!(!format!("{resolved:?}").contains("hunter2"));
    }
}

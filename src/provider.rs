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

use std::{collections::HashMap, sync::Arc};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use futures::{stream, StreamExt};
use tf_provider::{
    map, schema::Schema, value::ValueEmpty, AttributePath, Diagnostics, DynamicDataSource,
    DynamicResource, Provider,
};
use tracing::{info, warn};

use crate::{
    auth::{
        claims, AzureCliCredential, CachedCredential, ClientSecretCredential, TokenCredential,
    },
    client::ArmClient,
    clients::{ClientHandle, Clients},
    config::{ProviderConfig, RegistrationMode, ResolvedConfig},
    resource::ArmResourceAdapter,
    resourceids::ProviderId,
    services::{
        network::{SubnetResource, VirtualNetworkResource},
        resources::{
            client::{ProvidersClient, RegistrationState},
            ResourceGroupDataSource, ResourceGroupResource,
        },
        storage::StorageAccountResource,
        subscription::{ClientConfigDataSource, SubscriptionDataSource},
    },
    utils::{WithSchema, WithValidate},
};

/// Resource providers needed by the supported resources
pub const CORE_RESOURCE_PROVIDERS: &[&str] = &[
    "Microsoft.Network",
    "Microsoft.Resources",
    "Microsoft.Storage",
];

const MAX_CONCURRENT_REGISTRATIONS: usize = 4;

#[derive(Debug, Default, Clone)]
pub struct AzureRmProvider {
    clients: ClientHandle,
}

impl AzureRmProvider {
    pub fn new(clients: ClientHandle) -> Self {
        Self { clients }
    }
}

fn credential(config: &ResolvedConfig) -> Result<Arc<dyn TokenCredential>> {
    let environment = &config.environment;
    match (&config.client_id, &config.client_secret) {
        (Some(client_id), Some(client_secret)) => {
            let Some(tenant_id) = &config.tenant_id else {
                bail!("`tenant_id` must be set to authenticate with a client secret");
            };
            Ok(Arc::new(CachedCredential::new(ClientSecretCredential::new(
                reqwest::Client::new(),
                environment,
                tenant_id,
                client_id,
                client_secret,
            ))))
        }
        (_, Some(_)) => bail!("`client_id` must be set to authenticate with a client secret"),
        _ if config.use_cli => Ok(Arc::new(CachedCredential::new(AzureCliCredential::new(
            &environment.token_audience,
            config.tenant_id.as_deref(),
        )))),
        _ => bail!(
            "no authentication method is available: set `client_id`, `client_secret` and `tenant_id`, or enable `use_cli`"
        ),
    }
}

/// Register the resource providers of `namespaces` that are not registered yet
pub async fn register_resource_providers(
    arm: &ArmClient,
    subscription_id: &str,
    namespaces: &[&str],
) -> Result<()> {
    let client = ProvidersClient::new(arm);
    let results = stream::iter(namespaces.iter().map(ToString::to_string).collect::<Vec<String>>())
        .map(|namespace: String| async move {
            let id = ProviderId::new(subscription_id, namespace.as_str());
            let provider = client
                .get(&id)
                .await
                .with_context(|| format!("retrieving {id}"))?;
            if provider.registration_state == Some(RegistrationState::NotRegistered) {
                info!(namespace = %namespace, "registering resource provider");
                client.register(&id).await.with_context(|| {
                    format!("registering {id}, set `resource_provider_registrations = \"none\"` if the credentials cannot register resource providers")
                })?;
            }
            Ok::<_, anyhow::Error>(())
        })
        .buffer_unordered(MAX_CONCURRENT_REGISTRATIONS)
        .collect::<Vec<Result<()>>>()
        .await;

    results.into_iter().collect()
}

/// Build the clients shared by the resources from the resolved configuration
pub async fn build_clients(config: ResolvedConfig) -> Result<Clients> {
    let mut subscription_id = config.subscription_id.clone();
    let mut tenant_id = config.tenant_id.clone();
    if subscription_id.is_empty() {
        if !config.use_cli {
            bail!("`subscription_id` must be set when the Azure CLI is not used");
        }
        let account = AzureCliCredential::default_account()
            .await
            .context("reading the default subscription of the Azure CLI")?;
        info!(subscription_id = %account.id, "using the default subscription of the Azure CLI");
        subscription_id = account.id;
        tenant_id = tenant_id.or(Some(account.tenant_id));
    }

    let credential = credential(&ResolvedConfig {
        tenant_id: tenant_id.clone(),
        ..config.clone()
    })?;
    info!(
        method = credential.name(),
        environment = %config.environment.name,
        "authenticating"
    );
    let token = credential
        .get_token()
        .await
        .context("obtaining an access token")?;
    let claims = match claims::decode(&token.token) {
        Ok(claims) => claims,
        Err(err) => {
            warn!(error = %err, "the claims of the access token cannot be read");
            Default::default()
        }
    };

    let arm = ArmClient::new(reqwest::Client::new(), &config.environment, credential);
    if config.registrations == RegistrationMode::Core {
        register_resource_providers(&arm, &subscription_id, CORE_RESOURCE_PROVIDERS).await?;
    }

    Ok(Clients {
        arm,
        environment: config.environment,
        subscription_id,
        tenant_id: tenant_id.unwrap_or(claims.tid),
        client_id: config.client_id.unwrap_or(claims.appid),
        object_id: claims.oid,
        features: config.features,
    })
}

#[async_trait]
impl Provider for AzureRmProvider {
    type Config<'a> = ProviderConfig<'a>;
    type MetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(ProviderConfig::schema())
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::Config<'a>) -> Option<()> {
        config.validate(diags, AttributePath::default());

        if diags.errors.is_empty() {
            Some(())
        } else {
            None
        }
    }

    async fn configure<'a>(
        &self,
        diags: &mut Diagnostics,
        terraform_version: String,
        config: Self::Config<'a>,
    ) -> Option<()> {
        info!(%terraform_version, "configuring the azurerm provider");
        let config = match config.resolve(|name| std::env::var(name).ok()) {
            Ok(config) => config,
            Err(err) => {
                diags.root_error("Invalid provider configuration", format!("{err:#}"));
                return None;
            }
        };

        match build_clients(config).await {
            Ok(clients) => {
                self.clients.set(clients).await;
                Some(())
            }
            Err(err) => {
                diags.root_error("Configuring the azurerm provider", format!("{err:#}"));
                None
            }
        }
    }

    fn get_resources(
        &self,
        _diags: &mut Diagnostics,
    ) -> Option<HashMap<String, Box<dyn DynamicResource>>> {
        let clients = &self.clients;
        Some(map! {
            "azurerm_resource_group" => ArmResourceAdapter::new(ResourceGroupResource, clients.clone()),
            "azurerm_virtual_network" => ArmResourceAdapter::new(VirtualNetworkResource, clients.clone()),
            "azurerm_subnet" => ArmResourceAdapter::new(SubnetResource, clients.clone()),
            "azurerm_storage_account" => ArmResourceAdapter::new(StorageAccountResource, clients.clone()),
        })
    }

    fn get_data_sources(
        &self,
        _diags: &mut Diagnostics,
    ) -> Option<HashMap<String, Box<dyn DynamicDataSource>>> {
        let clients = &self.clients;
        Some(map! {
            "azurerm_resource_group" => ResourceGroupDataSource::new(clients.clone()),
            "azurerm_subscription" => SubscriptionDataSource::new(clients.clone()),
            "azurerm_client_config" => ClientConfigDataSource::new(clients.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{config::Features, environment::Environment};

    use super::*;

    fn resolved() -> ResolvedConfig {
        ResolvedConfig {
            subscription_id: "00000000-0000-0000-0000-000000000000".to_owned(),
            tenant_id: None,
            client_id: None,
            client_secret: None,
            environment: Environment::public(),
            use_cli: false,
            registrations: RegistrationMode::None,
            features: Features::default(),
        }
    }

    #[test]
    fn client_secret_needs_a_tenant() {
        let config = ResolvedConfig {
            client_id: Some("client".to_owned()),
            client_secret: Some("secret".to_owned()),
            ..resolved()
        };
        assert!(credential(&config).is_err());

        let config = ResolvedConfig {
            tenant_id: Some("tenant".to_owned()),
            ..config
        };
        assert_eq!(credential(&config).unwrap().name(), "client secret");
    }

    #[test]
    fn an_authentication_method_is_required() {
        assert!(credential(&resolved()).is_err());

        let config = ResolvedConfig {
            use_cli: true,
            ..resolved()
        };
        assert_eq!(credential(&config).unwrap().name(), "azure cli");
    }

    #[test]
    fn every_type_is_served() {
        let provider = AzureRmProvider::default();
        let mut diags = Diagnostics::default();
        let resources = provider.get_resources(&mut diags).unwrap();
        assert_eq!(resources.len(), 4);
        assert!(resources.contains_key("azurerm_subnet"));
        let data_sources = provider.get_data_sources(&mut diags).unwrap();
        assert!(data_sources.contains_key("azurerm_client_config"));
    }
}

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

use std::sync::Arc;

use anyhow::{anyhow, Result};
use tf_provider::Diagnostics;
use tokio::sync::RwLock;

use crate::{client::ArmClient, config::Features, environment::Environment};

/// Everything the resources need once the provider is configured
#[derive(Debug, Clone)]
pub struct Clients {
    pub arm: ArmClient,
    pub environment: Environment,
    pub subscription_id: String,
    pub tenant_id: String,
    pub client_id: String,
    /// Object ID of the authenticated principal
    pub object_id: String,
    pub features: Features,
}

/// Slot shared by the provider and its resources
///
/// Resources are instantiated before the provider is configured, so they hold a
/// handle that is filled by `configure`.
#[derive(Debug, Clone, Default)]
pub struct ClientHandle(Arc<RwLock<Option<Arc<Clients>>>>);

impl ClientHandle {
    pub fn new(clients: Clients) -> Self {
        Self(Arc::new(RwLock::new(Some(Arc::new(clients)))))
    }

    pub async fn set(&self, clients: Clients) {
        *self.0.write().await = Some(Arc::new(clients));
    }

    pub async fn get(&self) -> Result<Arc<Clients>> {
        self.0
            .read()
            .await
            .clone()
            .ok_or_else(|| anyhow!("the azurerm provider has not been configured"))
    }

    /// Configured clients, or an error diagnostic
    pub async fn get_or_report(&self, diags: &mut Diagnostics) -> Option<Arc<Clients>> {
        match self.get().await {
            Ok(clients) => Some(clients),
            Err(err) => {
                diags.root_error("Provider not configured", err.to_string());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::auth::StaticTokenCredential;

    use super::*;

    #[tokio::test]
    async fn handle_is_shared() {
        let handle = ClientHandle::default();
        let resource_handle = handle.clone();
        assert!(resource_handle.get().await.is_err());

        let environment = Environment::public();
        handle
            .set(Clients {
                arm: ArmClient::new(
                    reqwest::Client::new(),
                    &environment,
                    Arc::new(StaticTokenCredential::new("token")),
                ),
                environment,
                subscription_id: "sub".to_owned(),
                tenant_id: "tenant".to_owned(),
                client_id: "client".to_owned(),
                object_id: "object".to_owned(),
                features: Features::default(),
            })
            .await;
        assert_eq!(resource_handle.get().await.unwrap().subscription_id, "sub");
    }
}

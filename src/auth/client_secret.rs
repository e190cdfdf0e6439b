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

use std::fmt::Debug;

use async_trait::async_trait;
use serde::Deserialize;
use time::{Duration, OffsetDateTime};

use crate::environment::Environment;

use super::{AccessToken, AuthError, TokenCredential};

/// OAuth2 client credentials flow of a service principal
pub struct ClientSecretCredential {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    scope: String,
}

impl ClientSecretCredential {
    pub fn new(
        http: reqwest::Client,
        environment: &Environment,
        tenant_id: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Self {
        Self {
            http,
            token_url: format!(
                "{}/{tenant_id}/oauth2/v2.0/token",
                environment.login_endpoint
            ),
            client_id: client_id.to_owned(),
            client_secret: client_secret.to_owned(),
            scope: environment.scope(),
        }
    }
}

impl Debug for ClientSecretCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSecretCredential")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Deserialize, Default)]
struct TokenError {
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_description: String,
}

#[async_trait]
impl TokenCredential for ClientSecretCredential {
    fn name(&self) -> &'static str {
        "client secret"
    }

    async fn get_token(&self) -> Result<AccessToken, AuthError> {
        let request_error = |source| AuthError::Request {
            endpoint: self.token_url.clone(),
            source,
        };

        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("scope", self.scope.as_str()),
            ])
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(request_error)?;

        if !status.is_success() {
            let error: TokenError = serde_json::from_slice(&body).unwrap_or_default();
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                error: error.error,
                description: error.error_description,
            });
        }

        let token: TokenResponse = serde_json::from_slice(&body)?;
        Ok(AccessToken::new(
            token.access_token,
            OffsetDateTime::now_utc() + Duration::seconds(token.expires_in as i64),
        ))
    }
}

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
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex;
use tracing::debug;

pub mod claims;
mod cli;
mod client_secret;

pub use cli::{AzureCliCredential, CliAccount};
pub use client_secret::ClientSecretCredential;

/// Tokens are refreshed this long before they expire
const EXPIRY_MARGIN: Duration = Duration::minutes(5);

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("requesting a token from {endpoint}: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("the token request was rejected with status {status}: {error}: {description}")]
    Rejected {
        status: u16,
        error: String,
        description: String,
    },
    #[error("running the Azure CLI: {0}")]
    Cli(String),
    #[error("decoding the token response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Bearer token for the resource manager
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub expires_on: OffsetDateTime,
}

impl AccessToken {
    pub fn new(token: impl Into<String>, expires_on: OffsetDateTime) -> Self {
        Self {
            token: token.into(),
            expires_on,
        }
    }

    /// Check if the token must be refreshed before use
    pub fn is_expiring(&self) -> bool {
        OffsetDateTime::now_utc() + EXPIRY_MARGIN >= self.expires_on
    }
}

impl Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

/// Source of access tokens
#[async_trait]
pub trait TokenCredential: Send + Sync + Debug {
    /// Name of the authentication method, for logs
    fn name(&self) -> &'static str;

    /// Request a new token
    async fn get_token(&self) -> Result<AccessToken, AuthError>;
}

/// Credential serving a fixed token
#[derive(Clone)]
pub struct StaticTokenCredential {
    token: AccessToken,
}

impl StaticTokenCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: AccessToken::new(token, OffsetDateTime::now_utc() + Duration::days(365)),
        }
    }
}

impl Debug for StaticTokenCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticTokenCredential")
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    fn name(&self) -> &'static str {
        "static token"
    }

    async fn get_token(&self) -> Result<AccessToken, AuthError> {
        Ok(self.token.clone())
    }
}

/// Wrap a credential to reuse its tokens until they are about to expire
#[derive(Debug)]
pub struct CachedCredential<C> {
    inner: C,
    cache: Mutex<Option<AccessToken>>,
}

impl<C: TokenCredential> CachedCredential<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            cache: Mutex::new(None),
        }
    }
}

#[async_trait]
impl<C: TokenCredential> TokenCredential for CachedCredential<C> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn get_token(&self) -> Result<AccessToken, AuthError> {
        let mut cache = self.cache.lock().await;
        if let Some(token) = cache.as_ref() {
            if !token.is_expiring() {
                return Ok(token.clone());
            }
        }

        debug!(method = self.inner.name(), "requesting a new access token");
        let token = self.inner.get_token().await?;
        *cache = Some(token.clone());
        Ok(token)
    }
}

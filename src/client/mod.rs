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

//! Azure Resource Manager HTTP client
//!
//! Requests are described by [`RequestOptions`], and executed by [`ArmClient`]
//! which handles authentication, retries, status checks and long-running operations.

use std::{fmt::Debug, sync::Arc, time::Duration};

use backoff::{future::retry_notify, Error as BackoffError};
use bytes::Bytes;
use reqwest::{
    header::{HeaderMap, AUTHORIZATION, USER_AGENT},
    Method, StatusCode, Url,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{auth::TokenCredential, environment::Environment};

mod error;
pub mod locks;
mod poller;
mod retry;

pub use error::{ArmError, ErrorDetail};
pub use poller::OperationStatus;
pub use retry::{retry_after, RetryPolicy};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Description of a request to the resource manager
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    /// Path relative to the resource manager endpoint, usually a resource ID
    pub path: String,
    pub api_version: &'static str,
    /// Statuses considered successful
    pub expected_status: Vec<StatusCode>,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl RequestOptions {
    pub fn new(method: Method, path: impl Into<String>, api_version: &'static str) -> Self {
        Self {
            method,
            path: path.into(),
            api_version,
            expected_status: vec![StatusCode::OK],
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>, api_version: &'static str) -> Self {
        Self::new(Method::GET, path, api_version)
    }

    pub fn expect(mut self, statuses: &[StatusCode]) -> Self {
        self.expected_status = statuses.to_vec();
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, ArmError> {
        self.body = Some(serde_json::to_value(body).map_err(ArmError::Encode)?);
        Ok(self)
    }
}

/// Response of the resource manager
#[derive(Debug, Clone)]
pub struct Response {
    pub url: String,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Response {
    /// Deserialize the body
    pub fn model<T: DeserializeOwned>(&self) -> Result<T, ArmError> {
        serde_json::from_slice(&self.body).map_err(|source| ArmError::Decode {
            url: self.url.clone(),
            source,
        })
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

/// Page of a list operation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Page<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
    next_link: Option<String>,
}

#[derive(Clone)]
pub struct ArmClient {
    http: reqwest::Client,
    endpoint: String,
    credential: Arc<dyn TokenCredential>,
    retry: RetryPolicy,
    poll_interval: Duration,
    user_agent: String,
}

impl Debug for ArmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArmClient")
            .field("endpoint", &self.endpoint)
            .field("credential", &self.credential)
            .field("retry", &self.retry)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

impl ArmClient {
    pub fn new(
        http: reqwest::Client,
        environment: &Environment,
        credential: Arc<dyn TokenCredential>,
    ) -> Self {
        Self {
            http,
            endpoint: environment.resource_manager_endpoint.clone(),
            credential,
            retry: RetryPolicy::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            user_agent: format!(
                "{}/{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Interval between polls when the service does not send `Retry-After`
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn credential(&self) -> &Arc<dyn TokenCredential> {
        &self.credential
    }

    pub(crate) fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    fn url(&self, options: &RequestOptions) -> Result<Url, ArmError> {
        let raw = format!("{}{}", self.endpoint, options.path);
        let mut url = Url::parse(&raw).map_err(|err| ArmError::InvalidUrl {
            url: raw.clone(),
            message: err.to_string(),
        })?;
        url.query_pairs_mut()
            .append_pair("api-version", options.api_version)
            .extend_pairs(options.query.iter());
        Ok(url)
    }

    /// Send a request once, whatever the response status
    async fn send_once(
        &self,
        method: &Method,
        url: &Url,
        body: Option<&serde_json::Value>,
    ) -> Result<Response, ArmError> {
        let token = self.credential.get_token().await?;
        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .header(AUTHORIZATION, format!("Bearer {}", token.token))
            .header(USER_AGENT, &self.user_agent);
        if let Some(body) = body {
            request = request.json(body);
        }

        let transport = |source| ArmError::Transport {
            url: url.to_string(),
            source,
        };
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(transport)?;

        debug!(%method, %url, %status, "resource manager request");

        Ok(Response {
            url: url.to_string(),
            status,
            headers,
            body,
        })
    }

    /// Send a request, retrying throttled and transient failures
    ///
    /// A retryable status is an error once the retries are exhausted.
    pub(crate) async fn send(
        &self,
        method: &Method,
        url: &Url,
        body: Option<&serde_json::Value>,
    ) -> Result<Response, ArmError> {
        let mut attempts = 0;
        let operation = || {
            attempts += 1;
            let exhausted = self.retry.exhausted(attempts);
            async move {
                match self.send_once(method, url, body).await {
                    Ok(response) if self.retry.should_retry(method, response.status) => {
                        let err = ArmError::unexpected(response.status, &response.body);
                        match retry::retry_after(&response.headers) {
                            _ if exhausted => Err(BackoffError::permanent(err)),
                            Some(delay) => Err(BackoffError::retry_after(err, delay)),
                            None => Err(BackoffError::transient(err)),
                        }
                    }
                    Ok(response) => Ok(response),
                    Err(err @ ArmError::Transport { .. })
                        if !exhausted && self.retry.should_retry_transport(method) =>
                    {
                        Err(BackoffError::transient(err))
                    }
                    Err(err) => Err(BackoffError::permanent(err)),
                }
            }
        };
        let notify = |err: ArmError, delay: Duration| {
            warn!(%method, %url, error = %err, ?delay, "retrying request");
        };
        retry_notify(self.retry.backoff(), operation, notify).await
    }

    fn check(options: &RequestOptions, response: Response) -> Result<Response, ArmError> {
        if options.expected_status.contains(&response.status) {
            Ok(response)
        } else {
            Err(ArmError::unexpected(response.status, &response.body))
        }
    }

    /// Execute a request and check its status
    pub async fn execute(&self, options: &RequestOptions) -> Result<Response, ArmError> {
        let url = self.url(options)?;
        let response = self
            .send(&options.method, &url, options.body.as_ref())
            .await?;
        Self::check(options, response)
    }

    /// Execute a `GET` request, a missing resource is `None`
    pub async fn get_optional<T: DeserializeOwned>(
        &self,
        options: &RequestOptions,
    ) -> Result<Option<T>, ArmError> {
        match self.execute(options).await {
            Ok(response) => Ok(Some(response.model()?)),
            Err(err) if err.was_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Execute a request, and wait for the long-running operation it started
    ///
    /// The returned response is the final state of the resource for `PUT`/`PATCH`,
    /// and the last polled response otherwise.
    pub async fn execute_lro(&self, options: &RequestOptions) -> Result<Response, ArmError> {
        let url = self.url(options)?;
        let response = self
            .send(&options.method, &url, options.body.as_ref())
            .await?;
        let response = Self::check(options, response)?;
        poller::poll_until_done(self, &options.method, &url, response).await
    }

    /// Execute a list request and follow the `nextLink` of every page
    pub async fn list_all<T: DeserializeOwned>(
        &self,
        options: &RequestOptions,
    ) -> Result<Vec<T>, ArmError> {
        let mut items = Vec::new();
        let mut page: Page<T> = self.execute(options).await?.model()?;
        loop {
            items.append(&mut page.value);
            let Some(next_link) = page.next_link.filter(|link| !link.is_empty()) else {
                return Ok(items);
            };
            let url = Url::parse(&next_link).map_err(|err| ArmError::InvalidUrl {
                url: next_link.clone(),
                message: err.to_string(),
            })?;
            let response = Self::check(options, self.send(&Method::GET, &url, None).await?)?;
            page = response.model()?;
        }
    }
}

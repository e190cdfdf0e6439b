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

use reqwest::{Method, StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

use super::{retry, ArmClient, ArmError, ErrorDetail, Response};

/// Status of a long-running operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationStatus {
    InProgress,
    Succeeded,
    Failed,
    Canceled,
}

impl OperationStatus {
    /// Services report many intermediate states (`Accepted`, `Creating`, `Updating`...),
    /// only the terminal ones are distinguished.
    pub fn parse(status: &str) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "succeeded" => Self::Succeeded,
            "failed" => Self::Failed,
            "canceled" | "cancelled" => Self::Canceled,
            _ => Self::InProgress,
        }
    }
}

/// Document returned by the `Azure-AsyncOperation` URL
#[derive(Debug, Deserialize)]
struct OperationDocument {
    status: String,
    error: Option<ErrorDetail>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProvisioningProperties {
    provisioning_state: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ProvisionedResource {
    #[serde(default)]
    properties: ProvisioningProperties,
}

fn provisioning_state(response: &Response) -> Option<OperationStatus> {
    let resource: ProvisionedResource = serde_json::from_slice(&response.body).ok()?;
    resource
        .properties
        .provisioning_state
        .as_deref()
        .map(OperationStatus::parse)
}

/// How the completion of an operation is observed
#[derive(Debug, Clone, PartialEq, Eq)]
enum Poller {
    AsyncOperation(Url),
    Location(Url),
    ProvisioningState,
    Done,
}

fn header_url(response: &Response, name: &str) -> Result<Option<Url>, ArmError> {
    response
        .header(name)
        .map(|value| {
            Url::parse(value).map_err(|err| ArmError::InvalidUrl {
                url: value.to_owned(),
                message: err.to_string(),
            })
        })
        .transpose()
}

fn select_poller(method: &Method, response: &Response) -> Result<Poller, ArmError> {
    if let Some(url) = header_url(response, "azure-asyncoperation")? {
        return Ok(Poller::AsyncOperation(url));
    }
    if response.status == StatusCode::ACCEPTED || response.status == StatusCode::CREATED {
        if let Some(url) = header_url(response, "location")? {
            return Ok(Poller::Location(url));
        }
    }
    if (method == Method::PUT || method == Method::PATCH)
        && provisioning_state(response) == Some(OperationStatus::InProgress)
    {
        return Ok(Poller::ProvisioningState);
    }
    Ok(Poller::Done)
}

fn failed(error: Option<ErrorDetail>, fallback: &str) -> ArmError {
    let error = error.unwrap_or_default();
    ArmError::PollingFailed {
        code: if error.code.is_empty() {
            fallback.to_owned()
        } else {
            error.code
        },
        message: error.message,
    }
}

/// Wait for the operation started by `initial`
///
/// `url` is the URL of the request that started the operation.
pub(super) async fn poll_until_done(
    client: &ArmClient,
    method: &Method,
    url: &Url,
    initial: Response,
) -> Result<Response, ArmError> {
    let poller = select_poller(method, &initial)?;
    debug!(%method, %url, ?poller, "waiting for long-running operation");

    let mut last = initial;
    match poller {
        Poller::Done => {
            if provisioning_state(&last) == Some(OperationStatus::Failed) {
                return Err(failed(None, "ProvisioningFailed"));
            }
            Ok(last)
        }
        Poller::AsyncOperation(status_url) => loop {
            wait(client, &last).await;
            last = client.send(&Method::GET, &status_url, None).await?;
            if !last.status.is_success() {
                return Err(ArmError::unexpected(last.status, &last.body));
            }
            let document: OperationDocument = last.model()?;
            match OperationStatus::parse(&document.status) {
                OperationStatus::InProgress => continue,
                OperationStatus::Succeeded => break final_response(client, method, url, last).await,
                OperationStatus::Failed => break Err(failed(document.error, "OperationFailed")),
                OperationStatus::Canceled => break Err(ArmError::PollingCancelled),
            }
        },
        Poller::Location(location) => loop {
            wait(client, &last).await;
            last = client.send(&Method::GET, &location, None).await?;
            match last.status {
                StatusCode::ACCEPTED => continue,
                StatusCode::OK | StatusCode::CREATED | StatusCode::NO_CONTENT => {
                    break final_response(client, method, url, last).await
                }
                // the deleted resource is gone
                StatusCode::NOT_FOUND if method == Method::DELETE => break Ok(last),
                status => break Err(ArmError::unexpected(status, &last.body)),
            }
        },
        Poller::ProvisioningState => loop {
            wait(client, &last).await;
            last = client.send(&Method::GET, url, None).await?;
            if !last.status.is_success() {
                return Err(ArmError::unexpected(last.status, &last.body));
            }
            match provisioning_state(&last) {
                Some(OperationStatus::InProgress) => continue,
                Some(OperationStatus::Failed) => break Err(failed(None, "ProvisioningFailed")),
                Some(OperationStatus::Canceled) => break Err(ArmError::PollingCancelled),
                Some(OperationStatus::Succeeded) | None => break Ok(last),
            }
        },
    }
}

async fn wait(client: &ArmClient, last: &Response) {
    let delay = retry::retry_after(&last.headers).unwrap_or(client.poll_interval());
    tokio::time::sleep(delay).await;
}

/// `PUT`/`PATCH` operations end with the state of the resource
async fn final_response(
    client: &ArmClient,
    method: &Method,
    url: &Url,
    last: Response,
) -> Result<Response, ArmError> {
    if method == Method::PUT || method == Method::PATCH {
        let response = client.send(&Method::GET, url, None).await?;
        if !response.status.is_success() {
            return Err(ArmError::unexpected(response.status, &response.body));
        }
        Ok(response)
    } else {
        Ok(last)
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use reqwest::header::{HeaderMap, HeaderValue};

    use super::*;

    fn response(status: StatusCode, headers: &[(&'static str, &'static str)], body: &'static str) -> Response {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.insert(*name, HeaderValue::from_static(*value));
        }
        Response {
            url: "https://management.azure.com/x".to_owned(),
            status,
            headers: map,
            body: Bytes::from_static(body.as_bytes()),
        }
    }

    #[test]
    fn parses_terminal_states() {
        assert_eq!(OperationStatus::parse("Succeeded"), OperationStatus::Succeeded);
        assert_eq!(OperationStatus::parse("FAILED"), OperationStatus::Failed);
        assert_eq!(OperationStatus::parse("Cancelled"), OperationStatus::Canceled);
        assert_eq!(OperationStatus::parse("Updating"), OperationStatus::InProgress);
    }

    #[test]
    fn async_operation_header_has_priority() {
        let initial = response(
            StatusCode::CREATED,
            &[
                ("azure-asyncoperation", "https://management.azure.com/operations/1"),
                ("location", "https://management.azure.com/results/1"),
            ],
            "",
        );
        assert!(matches!(
            select_poller(&Method::PUT, &initial).unwrap(),
            Poller::AsyncOperation(url) if url.path() == "/operations/1"
        ));
    }

    #[test]
    fn location_is_only_followed_for_pending_responses() {
        let accepted = response(
            StatusCode::ACCEPTED,
            &[("location", "https://management.azure.com/results/1")],
            "",
        );
        assert!(matches!(
            select_poller(&Method::DELETE, &accepted).unwrap(),
            Poller::Location(_)
        ));

        let ok = response(
            StatusCode::OK,
            &[("location", "https://management.azure.com/results/1")],
            "",
        );
        assert_eq!(select_poller(&Method::DELETE, &ok).unwrap(), Poller::Done);
    }

    #[test]
    fn provisioning_state_is_polled_for_puts() {
        let creating = response(
            StatusCode::OK,
            &[],
            r#"{"properties": {"provisioningState": "Creating"}}"#,
        );
        assert_eq!(
            select_poller(&Method::PUT, &creating).unwrap(),
            Poller::ProvisioningState
        );
        assert_eq!(select_poller(&Method::POST, &creating).unwrap(), Poller::Done);

        let done = response(
            StatusCode::OK,
            &[],
            r#"{"properties": {"provisioningState": "Succeeded"}}"#,
        );
        assert_eq!(select_poller(&Method::PUT, &done).unwrap(), Poller::Done);
    }

    #[test]
    fn invalid_poll_urls_are_errors() {
        let initial = response(StatusCode::ACCEPTED, &[("location", "not a url")], "");
        assert!(matches!(
            select_poller(&Method::DELETE, &initial),
            Err(ArmError::InvalidUrl { .. })
        ));
    }
}

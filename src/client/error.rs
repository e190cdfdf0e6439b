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

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::auth::AuthError;

#[derive(Debug, Error)]
pub enum ArmError {
    #[error("sending the request to {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("authenticating: {0}")]
    Auth(#[from] AuthError),
    #[error("invalid request URL {url:?}: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("unexpected status {status} with error: {code}: {message}")]
    UnexpectedStatus {
        status: StatusCode,
        code: String,
        message: String,
    },
    #[error("decoding the response of {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("encoding the request body: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("the long-running operation failed with {code}: {message}")]
    PollingFailed { code: String, message: String },
    #[error("the long-running operation was cancelled")]
    PollingCancelled,
}

impl ArmError {
    /// Status of the failed response, if any
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ArmError::UnexpectedStatus { status, .. } => Some(*status),
            ArmError::Transport { source, .. } => source.status(),
            _ => None,
        }
    }

    pub fn was_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    pub fn was_conflict(&self) -> bool {
        self.status() == Some(StatusCode::CONFLICT)
    }

    /// Build the error for an unexpected response, using the ARM error envelope when present
    pub(crate) fn unexpected(status: StatusCode, body: &[u8]) -> Self {
        let detail = serde_json::from_slice::<ErrorEnvelope>(body)
            .ok()
            .and_then(|envelope| envelope.error.or(envelope.detail))
            .filter(|detail| !detail.code.is_empty() || !detail.message.is_empty())
            .unwrap_or_else(|| ErrorDetail {
                code: status
                    .canonical_reason()
                    .unwrap_or("Unknown")
                    .replace(' ', ""),
                message: String::from_utf8_lossy(body).into_owned(),
            });
        ArmError::UnexpectedStatus {
            status,
            code: detail.code,
            message: detail.message,
        }
    }
}

/// `{"error": {"code": "...", "message": "..."}}`, some services omit the wrapping object
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorDetail>,
    #[serde(flatten)]
    detail: Option<ErrorDetail>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_error_envelope() {
        let err = ArmError::unexpected(
            StatusCode::CONFLICT,
            br#"{"error": {"code": "ResourceGroupBeingDeleted", "message": "The resource group is being deleted."}}"#,
        );
        assert!(err.was_conflict());
        assert_eq!(
            err.to_string(),
            "unexpected status 409 Conflict with error: ResourceGroupBeingDeleted: The resource group is being deleted."
        );
    }

    #[test]
    fn parses_unwrapped_errors() {
        let err = ArmError::unexpected(
            StatusCode::BAD_REQUEST,
            br#"{"code": "InvalidParameter", "message": "bad"}"#,
        );
        match err {
            ArmError::UnexpectedStatus { code, message, .. } => {
                assert_eq!(code, "InvalidParameter");
                assert_eq!(message, "bad");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn falls_back_to_the_raw_body() {
        let err = ArmError::unexpected(StatusCode::NOT_FOUND, b"gone");
        assert!(err.was_not_found());
        match err {
            ArmError::UnexpectedStatus { code, message, .. } => {
                assert_eq!(code, "NotFound");
                assert_eq!(message, "gone");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}

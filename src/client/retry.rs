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

use std::time::Duration;

use backoff::ExponentialBackoff;
use reqwest::{header::HeaderMap, Method, StatusCode};
use time::{format_description::well_known::Rfc2822, OffsetDateTime};

/// When and how long to wait before sending a request again
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            min_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

fn is_idempotent(method: &Method) -> bool {
    [
        Method::GET,
        Method::HEAD,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ]
    .contains(method)
}

impl RetryPolicy {
    /// Never retry
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Check if a response with `status` can be retried
    ///
    /// Throttled requests are never processed, so they can always be sent again.
    pub fn should_retry(&self, method: &Method, status: StatusCode) -> bool {
        match status {
            StatusCode::TOO_MANY_REQUESTS => true,
            StatusCode::REQUEST_TIMEOUT
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT => is_idempotent(method),
            _ => false,
        }
    }

    /// Check if a request that failed without response can be retried
    pub fn should_retry_transport(&self, method: &Method) -> bool {
        is_idempotent(method)
    }

    /// Check if the request must not be sent again after `attempts` tries
    pub fn exhausted(&self, attempts: u32) -> bool {
        attempts > self.max_retries
    }

    /// Exponential backoff between `min_delay` and `max_delay`, randomized by half
    /// the interval
    ///
    /// The number of retries is bounded by [`Self::exhausted`], not by the elapsed time.
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            current_interval: self.min_delay,
            initial_interval: self.min_delay,
            randomization_factor: 0.5,
            multiplier: 2.0,
            max_interval: self.max_delay,
            max_elapsed_time: None,
            ..ExponentialBackoff::default()
        }
    }
}

/// Read the `Retry-After` header, either a number of seconds or an HTTP date
pub fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(reqwest::header::RETRY_AFTER)?.to_str().ok()?.trim();
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }
    let date = OffsetDateTime::parse(value, &Rfc2822).ok()?;
    let remaining = date - OffsetDateTime::now_utc();
    Some(remaining.try_into().unwrap_or(Duration::ZERO))
}

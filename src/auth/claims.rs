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

//! Claims of the JWT access tokens

use anyhow::{anyhow, Context, Result};
use base64::Engine;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Object ID of the principal
    #[serde(default)]
    pub oid: String,
    /// Tenant ID
    #[serde(default)]
    pub tid: String,
    /// Application (client) ID, for service principals
    #[serde(default)]
    pub appid: String,
}

/// Decode the claims of a token, without verifying its signature
pub fn decode(token: &str) -> Result<Claims> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| anyhow!("the access token is not a JWT"))?;
    let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .context("decoding the access token payload")?;
    serde_json::from_slice(&payload).context("parsing the access token claims")
}

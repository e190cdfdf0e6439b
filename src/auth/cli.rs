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

use async_process::Command;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize};
use chrono::{Local, NaiveDateTime};
use time::OffsetDateTime;

use super::{AccessToken, AuthError, TokenCredential};

/// Tokens obtained from the logged in Azure CLI (`az login`)
#[derive(Debug, Clone)]
pub struct AzureCliCredential {
    resource: String,
    tenant_id: Option<String>,
}

/// Account selected in the Azure CLI
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CliAccount {
    /// Subscription ID
    pub id: String,
    pub tenant_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CliToken {
    access_token: String,
    /// Local time, only format known to older CLI versions
    expires_on: Option<String>,
    /// Unix timestamp
    #[serde(rename = "expires_on")]
    expires_on_timestamp: Option<i64>,
}

impl AzureCliCredential {
    pub fn new(resource: &str, tenant_id: Option<&str>) -> Self {
        Self {
            resource: resource.to_owned(),
            tenant_id: tenant_id.map(str::to_owned),
        }
    }

    /// Get the default account of the CLI
    pub async fn default_account() -> Result<CliAccount, AuthError> {
        run_az(&["account", "show", "--output", "json"]).await
    }
}

async fn run_az<T: DeserializeOwned>(args: &[&str]) -> Result<T, AuthError> {
    let output = Command::new("az")
        .args(args)
        .output()
        .await
        .map_err(|err| AuthError::Cli(format!("could not launch `az`: {err}")))?;

    if !output.status.success() {
        return Err(AuthError::Cli(
            String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        ));
    }

    Ok(serde_json::from_slice(&output.stdout)?)
}

fn parse_expiry(token: &CliToken) -> Result<OffsetDateTime, AuthError> {
    if let Some(timestamp) = token.expires_on_timestamp {
        return OffsetDateTime::from_unix_timestamp(timestamp)
            .map_err(|err| AuthError::Cli(format!("invalid token expiry {timestamp}: {err}")));
    }
    let Some(expires_on) = token.expires_on.as_deref() else {
        return Err(AuthError::Cli("the token has no expiry".to_owned()));
    };
    // printed in the time zone of the machine running the CLI
    let local = NaiveDateTime::parse_from_str(expires_on, "%Y-%m-%d %H:%M:%S%.f")
        .map_err(|err| AuthError::Cli(format!("invalid token expiry {expires_on:?}: {err}")))?
        .and_local_timezone(Local)
        .earliest()
        .ok_or_else(|| {
            AuthError::Cli(format!(
                "token expiry {expires_on:?} does not exist in the local time zone"
            ))
        })?;
    OffsetDateTime::from_unix_timestamp(local.timestamp())
        .map_err(|err| AuthError::Cli(format!("invalid token expiry {expires_on:?}: {err}")))
}

#[async_trait]
impl TokenCredential for AzureCliCredential {
    fn name(&self) -> &'static str {
        "azure cli"
    }

    async fn get_token(&self) -> Result<AccessToken, AuthError> {
        let mut args = vec![
            "account",
            "get-access-token",
            "--resource",
            self.resource.as_str(),
            "--output",
            "json",
        ];
        if let Some(tenant_id) = &self.tenant_id {
            args.extend(["--tenant", tenant_id.as_str()]);
        }

        let token: CliToken = run_az(&args).await?;
        let expires_on = parse_expiry(&token)?;
        Ok(AccessToken::new(token.access_token, expires_on))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_prefers_the_timestamp() {
        let token: CliToken = serde_json::from_str(
            r#"{"accessToken": "x", "expiresOn": "2030-01-01 00:00:00.000000", "expires_on": 1700000000}"#,
        )
        .unwrap();
        assert_eq!(parse_expiry(&token).unwrap().unix_timestamp(), 1700000000);
    }

    #[test]
    fn expiry_falls_back_to_local_time() {
        let token: CliToken = serde_json::from_str(
            r#"{"accessToken": "x", "expiresOn": "2030-01-01 12:30:00.123456"}"#,
        )
        .unwrap();
        let expected = chrono::NaiveDate::from_ymd_opt(2030, 1, 1)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap()
            .and_local_timezone(Local)
            .unwrap()
            .timestamp();
        assert_eq!(parse_expiry(&token).unwrap().unix_timestamp(), expected);
    }
}

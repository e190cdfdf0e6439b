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

use anyhow::{anyhow, Result};

/// Endpoints of an Azure cloud
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    pub name: String,
    pub resource_manager_endpoint: String,
    pub login_endpoint: String,
    /// Audience of the tokens accepted by the resource manager
    pub token_audience: String,
}

impl Environment {
    pub const NAMES: &'static [&'static str] = &["public", "usgovernment", "china"];

    pub fn public() -> Self {
        Self::new(
            "public",
            "https://management.azure.com",
            "https://login.microsoftonline.com",
        )
    }

    pub fn us_government() -> Self {
        Self::new(
            "usgovernment",
            "https://management.usgovcloudapi.net",
            "https://login.microsoftonline.us",
        )
    }

    pub fn china() -> Self {
        Self::new(
            "china",
            "https://management.chinacloudapi.cn",
            "https://login.chinacloudapi.cn",
        )
    }

    /// Build an environment from its endpoints
    pub fn new(name: &str, resource_manager_endpoint: &str, login_endpoint: &str) -> Self {
        let resource_manager_endpoint = resource_manager_endpoint.trim_end_matches('/');
        Self {
            name: name.to_owned(),
            resource_manager_endpoint: resource_manager_endpoint.to_owned(),
            login_endpoint: login_endpoint.trim_end_matches('/').to_owned(),
            token_audience: format!("{resource_manager_endpoint}/"),
        }
    }

    /// Find an environment by name
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "" | "public" | "azurepubliccloud" => Ok(Self::public()),
            "usgovernment" | "azureusgovernmentcloud" => Ok(Self::us_government()),
            "china" | "azurechinacloud" => Ok(Self::china()),
            _ => Err(anyhow!(
                "unknown environment {name:?}, expected one of {}",
                Self::NAMES.join(", ")
            )),
        }
    }

    /// OAuth2 scope requesting a token for the resource manager
    pub fn scope(&self) -> String {
        format!("{}.default", self.token_audience)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::public()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!(Environment::from_name("Public").unwrap(), Environment::public());
        assert_eq!(
            Environment::from_name("AzureChinaCloud").unwrap(),
            Environment::china()
        );
        assert!(Environment::from_name("mars").is_err());
    }

    #[test]
    fn scope_targets_resource_manager() {
        assert_eq!(
            Environment::public().scope(),
            "https://management.azure.com/.default"
        );
        let custom = Environment::new("test", "http://127.0.0.1:8080/", "http://127.0.0.1:8081");
        assert_eq!(custom.resource_manager_endpoint, "http://127.0.0.1:8080");
        assert_eq!(custom.scope(), "http://127.0.0.1:8080/.default");
    }
}

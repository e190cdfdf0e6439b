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

use std::collections::BTreeMap;

use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};

use crate::{
    client::{ArmClient, ArmError, RequestOptions},
    enums::arm_enum,
    resourceids::{ResourceId, StorageAccountId},
};

const API_VERSION: &str = "2023-01-01";

arm_enum! {
    pub enum Kind {
        BlobStorage => "BlobStorage",
        BlockBlobStorage => "BlockBlobStorage",
        FileStorage => "FileStorage",
        Storage => "Storage",
        StorageV2 => "StorageV2",
    }
}

arm_enum! {
    pub enum SkuTier {
        Premium => "Premium",
        Standard => "Standard",
    }
}

arm_enum! {
    pub enum AccessTier {
        Cool => "Cool",
        Hot => "Hot",
        Premium => "Premium",
    }
}

arm_enum! {
    pub enum MinimumTlsVersion {
        Tls1_0 => "TLS1_0",
        Tls1_1 => "TLS1_1",
        Tls1_2 => "TLS1_2",
    }
}

arm_enum! {
    pub enum PublicNetworkAccess {
        Disabled => "Disabled",
        Enabled => "Enabled",
    }
}

arm_enum! {
    /// Replication part of a SKU name
    pub enum ReplicationType {
        Lrs => "LRS",
        Zrs => "ZRS",
        Grs => "GRS",
        Ragrs => "RAGRS",
        Gzrs => "GZRS",
        Ragzrs => "RAGZRS",
    }
}

impl ReplicationType {
    /// Whether the replicas are spread over availability zones
    ///
    /// Accounts cannot be converted between zonal and non-zonal replication.
    pub fn is_zone_redundant(&self) -> bool {
        matches!(self, Self::Zrs | Self::Gzrs | Self::Ragzrs)
    }
}

impl Kind {
    /// Whether the `accessTier` property applies to the kind
    pub fn supports_access_tier(&self) -> bool {
        matches!(self, Self::BlobStorage | Self::FileStorage | Self::StorageV2)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sku {
    /// `{tier}_{replication}`, e.g. `Standard_LRS`
    pub name: String,
    #[serde(skip_serializing)]
    pub tier: Option<SkuTier>,
}

impl Sku {
    pub fn new(tier: &SkuTier, replication: &ReplicationType) -> Self {
        Self {
            name: format!("{tier}_{replication}"),
            tier: Some(tier.clone()),
        }
    }

    /// Tier and replication type encoded in the name
    pub fn parts(&self) -> Option<(SkuTier, ReplicationType)> {
        let (tier, replication) = self.name.split_once('_')?;
        Some((SkuTier::parse(tier), ReplicationType::parse(replication)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoints {
    pub blob: Option<String>,
    pub dfs: Option<String>,
    pub file: Option<String>,
    pub queue: Option<String>,
    pub table: Option<String>,
    pub web: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageAccountProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_tier: Option<AccessTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_tls_version: Option<MinimumTlsVersion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_https_traffic_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_network_access: Option<PublicNetworkAccess>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_shared_key_access: Option<bool>,
    #[serde(skip_serializing)]
    pub primary_location: Option<String>,
    #[serde(skip_serializing)]
    pub secondary_location: Option<String>,
    #[serde(skip_serializing)]
    pub primary_endpoints: Option<Endpoints>,
    #[serde(skip_serializing)]
    pub provisioning_state: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageAccount {
    #[serde(skip_serializing)]
    pub id: Option<String>,
    #[serde(skip_serializing)]
    pub name: Option<String>,
    pub location: String,
    pub kind: Option<Kind>,
    pub sku: Option<Sku>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub properties: StorageAccountProperties,
}

/// Body of a storage account update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageAccountUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<Kind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<Sku>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
    pub properties: StorageAccountProperties,
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageAccountKey {
    pub key_name: String,
    pub value: String,
    pub permissions: Option<String>,
}

impl std::fmt::Debug for StorageAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageAccountKey")
            .field("key_name", &self.key_name)
            .field("permissions", &self.permissions)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListKeysResult {
    #[serde(default)]
    pub keys: Vec<StorageAccountKey>,
}

impl ListKeysResult {
    pub fn primary(&self) -> Option<&str> {
        self.keys
            .iter()
            .find(|key| key.key_name == "key1")
            .or_else(|| self.keys.first())
            .map(|key| key.value.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StorageAccountsClient<'c> {
    client: &'c ArmClient,
}

impl<'c> StorageAccountsClient<'c> {
    pub fn new(client: &'c ArmClient) -> Self {
        Self { client }
    }

    pub async fn get_properties(
        &self,
        id: &StorageAccountId,
    ) -> Result<Option<StorageAccount>, ArmError> {
        self.client
            .get_optional(&RequestOptions::get(id.id(), API_VERSION))
            .await
    }

    /// Create the account, and wait for it to be provisioned
    pub async fn create(
        &self,
        id: &StorageAccountId,
        account: &StorageAccount,
    ) -> Result<StorageAccount, ArmError> {
        let options = RequestOptions::new(Method::PUT, id.id(), API_VERSION)
            .expect(&[StatusCode::OK, StatusCode::ACCEPTED])
            .json(account)?;
        self.client.execute_lro(&options).await?.model()
    }

    pub async fn update(
        &self,
        id: &StorageAccountId,
        update: &StorageAccountUpdate,
    ) -> Result<StorageAccount, ArmError> {
        let options = RequestOptions::new(Method::PATCH, id.id(), API_VERSION).json(update)?;
        self.client.execute(&options).await?.model()
    }

    pub async fn delete(&self, id: &StorageAccountId) -> Result<(), ArmError> {
        let options = RequestOptions::new(Method::DELETE, id.id(), API_VERSION)
            .expect(&[StatusCode::OK, StatusCode::NO_CONTENT]);
        self.client.execute(&options).await?;
        Ok(())
    }

    pub async fn list_keys(&self, id: &StorageAccountId) -> Result<ListKeysResult, ArmError> {
        let options =
            RequestOptions::new(Method::POST, format!("{}/listKeys", id.id()), API_VERSION);
        self.client.execute(&options).await?.model()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn sku_names() {
        let sku = Sku::new(&SkuTier::Standard, &ReplicationType::Ragrs);
        assert_eq!(sku.name, "Standard_RAGRS");
        assert_eq!(
            sku.parts(),
            Some((SkuTier::Standard, ReplicationType::Ragrs))
        );
        assert_eq!(
            Sku {
                name: "Premium_ZRS".to_owned(),
                tier: None
            }
            .parts(),
            Some((SkuTier::Premium, ReplicationType::Zrs))
        );
    }

    #[test]
    fn replication_families() {
        assert!(!ReplicationType::Grs.is_zone_redundant());
        assert!(ReplicationType::Gzrs.is_zone_redundant());
        assert!(Kind::StorageV2.supports_access_tier());
        assert!(!Kind::Storage.supports_access_tier());
    }

    #[test]
    fn keys_are_not_printed() {
        let keys: ListKeysResult = serde_json::from_value(json!({
            "keys": [
                {"keyName": "key1", "value": "secret1", "permissions": "FULL"},
                {"keyName": "key2", "value": "secret2", "permissions": "FULL"}
            ]
        }))
        .unwrap();
        assert_eq!(keys.primary(), Some("secret1"));
        assert!(!format!("{keys:?}").contains("secret"));
    }
}

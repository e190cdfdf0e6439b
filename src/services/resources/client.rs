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
    resourceids::{ProviderId, ResourceGroupId, ResourceId},
};

const API_VERSION: &str = "2022-09-01";

arm_enum! {
    pub enum RegistrationState {
        NotRegistered => "NotRegistered",
        Registered => "Registered",
        Registering => "Registering",
        Unregistered => "Unregistered",
        Unregistering => "Unregistering",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGroupProperties {
    #[serde(skip_serializing)]
    pub provisioning_state: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGroup {
    #[serde(skip_serializing)]
    pub id: Option<String>,
    #[serde(skip_serializing)]
    pub name: Option<String>,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub managed_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<ResourceGroupProperties>,
}

/// Body of a resource group update, absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGroupPatch {
    /// `Some(None)` clears the field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub managed_by: Option<Option<String>>,
    pub tags: BTreeMap<String, String>,
}

/// Resource nested in a resource group
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenericResource {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub resource_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    #[serde(default)]
    pub namespace: String,
    pub registration_state: Option<RegistrationState>,
}

/// Operations on resource groups
#[derive(Debug, Clone, Copy)]
pub struct ResourceGroupsClient<'c> {
    client: &'c ArmClient,
}

impl<'c> ResourceGroupsClient<'c> {
    pub fn new(client: &'c ArmClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, id: &ResourceGroupId) -> Result<Option<ResourceGroup>, ArmError> {
        self.client
            .get_optional(&RequestOptions::get(id.id(), API_VERSION))
            .await
    }

    pub async fn create_or_update(
        &self,
        id: &ResourceGroupId,
        resource_group: &ResourceGroup,
    ) -> Result<ResourceGroup, ArmError> {
        let options = RequestOptions::new(Method::PUT, id.id(), API_VERSION)
            .expect(&[StatusCode::OK, StatusCode::CREATED])
            .json(resource_group)?;
        self.client.execute(&options).await?.model()
    }

    pub async fn update(
        &self,
        id: &ResourceGroupId,
        patch: &ResourceGroupPatch,
    ) -> Result<ResourceGroup, ArmError> {
        let options = RequestOptions::new(Method::PATCH, id.id(), API_VERSION).json(patch)?;
        self.client.execute(&options).await?.model()
    }

    /// Delete the resource group and everything it contains
    pub async fn delete(&self, id: &ResourceGroupId) -> Result<(), ArmError> {
        let options = RequestOptions::new(Method::DELETE, id.id(), API_VERSION).expect(&[
            StatusCode::OK,
            StatusCode::ACCEPTED,
            StatusCode::NO_CONTENT,
            StatusCode::NOT_FOUND,
        ]);
        self.client.execute_lro(&options).await?;
        Ok(())
    }

    /// List the resources contained in the resource group
    pub async fn list_resources(
        &self,
        id: &ResourceGroupId,
    ) -> Result<Vec<GenericResource>, ArmError> {
        let options = RequestOptions::get(format!("{}/resources", id.id()), API_VERSION);
        self.client.list_all(&options).await
    }
}

/// Operations on resource providers
#[derive(Debug, Clone, Copy)]
pub struct ProvidersClient<'c> {
    client: &'c ArmClient,
}

impl<'c> ProvidersClient<'c> {
    pub fn new(client: &'c ArmClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, id: &ProviderId) -> Result<Provider, ArmError> {
        self.client
            .execute(&RequestOptions::get(id.id(), API_VERSION))
            .await?
            .model()
    }

    pub async fn register(&self, id: &ProviderId) -> Result<Provider, ArmError> {
        let options =
            RequestOptions::new(Method::POST, format!("{}/register", id.id()), API_VERSION);
        self.client.execute(&options).await?.model()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_only_fields_are_not_sent() {
        let resource_group = ResourceGroup {
            id: Some("/subscriptions/x/resourceGroups/rg".to_owned()),
            name: Some("rg".to_owned()),
            location: "westeurope".to_owned(),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&resource_group).unwrap(),
            serde_json::json!({"location": "westeurope"})
        );
    }

    #[test]
    fn parses_api_responses() {
        let resource_group: ResourceGroup = serde_json::from_value(serde_json::json!({
            "id": "/subscriptions/x/resourceGroups/rg",
            "name": "rg",
            "location": "westeurope",
            "managedBy": null,
            "tags": {"env": "test"},
            "properties": {"provisioningState": "Succeeded"}
        }))
        .unwrap();
        assert_eq!(resource_group.tags.unwrap()["env"], "test");
        assert_eq!(
            resource_group.properties.unwrap().provisioning_state.as_deref(),
            Some("Succeeded")
        );

        let provider: Provider = serde_json::from_value(serde_json::json!({
            "namespace": "Microsoft.Network",
            "registrationState": "notregistered"
        }))
        .unwrap();
        assert_eq!(
            provider.registration_state,
            Some(RegistrationState::NotRegistered)
        );
    }
}

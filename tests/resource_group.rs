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


use std::borrow::Cow;

use httpmock::prelude::*;
use serde_json::json;
use terraform_provider_azurerm::{
    config::Features,
    provider::register_resource_providers,
    resource::ArmResource,
    resourceids::{ResourceGroupId, ResourceId},
    services::resources::{ResourceGroupResource, ResourceGroupState},
};
use tf_provider::value::Value;

mod common;

use common::SUBSCRIPTION_ID;

const RG_PATH: &str = "/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/rg";

fn planned() -> ResourceGroupState<'static> {
    ResourceGroupState {
        name: Value::Value(Cow::Borrowed("rg")),
        location: Value::Value(Cow::Borrowed("West Europe")),
        tags: Value::Value(
            [(Cow::Borrowed("env"), Value::Value(Cow::Borrowed("test")))]
                .into_iter()
                .collect(),
        ),
        ..Default::default()
    }
}

#[tokio::test]
async fn create_then_read() {
    let server = MockServer::start_async().await;
    let put = server
        .mock_async(|when, then| {
            when.method(PUT).path(RG_PATH).json_body(json!({
                "location": "West Europe",
                "tags": {"env": "test"}
            }));
            then.status(201).json_body(json!({
                "id": RG_PATH,
                "name": "rg",
                "location": "westeurope",
                "tags": {"env": "test"},
                "properties": {"provisioningState": "Succeeded"}
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(RG_PATH);
            then.status(200).json_body(json!({
                "id": RG_PATH,
                "name": "rg",
                "location": "westeurope",
                "managedBy": "",
                "tags": {"env": "test"},
                "properties": {"provisioningState": "Succeeded"}
            }));
        })
        .await;

    let clients = common::clients(&server, Features::default());
    let planned = planned();
    let id = ResourceGroupResource.build_id(&clients, &planned).unwrap();
    assert_eq!(id.id(), RG_PATH);

    ResourceGroupResource
        .create(&clients, &id, &planned)
        .await
        .unwrap();
    put.assert_async().await;

    let state = ResourceGroupResource
        .read(&clients, &id, planned.clone())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(state.id.as_deref_option(), Some(RG_PATH));
    assert_eq!(state.location.as_deref_option(), Some("westeurope"));
    assert!(state.managed_by.is_null());
    assert_eq!(state.tags, planned.tags);
}

#[tokio::test]
async fn deleted_group_is_removed_from_state() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(RG_PATH);
            then.status(404).json_body(json!({
                "error": {"code": "ResourceGroupNotFound", "message": "Resource group 'rg' could not be found."}
            }));
        })
        .await;

    let clients = common::clients(&server, Features::default());
    let id = ResourceGroupId::new(SUBSCRIPTION_ID, "rg");
    assert!(!ResourceGroupResource.exists(&clients, &id).await.unwrap());
    assert!(ResourceGroupResource
        .read(&clients, &id, planned())
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn delete_refuses_non_empty_group() {
    let server = MockServer::start_async().await;
    let list = server
        .mock_async(|when, then| {
            when.method(GET).path(format!("{RG_PATH}/resources"));
            then.status(200).json_body(json!({
                "value": [{
                    "id": format!("{RG_PATH}/providers/Microsoft.Network/virtualNetworks/vnet"),
                    "name": "vnet",
                    "type": "Microsoft.Network/virtualNetworks"
                }]
            }));
        })
        .await;
    let delete = server
        .mock_async(|when, then| {
            when.method(DELETE).path(RG_PATH);
            then.status(200);
        })
        .await;

    let id = ResourceGroupId::new(SUBSCRIPTION_ID, "rg");
    let clients = common::clients(&server, Features::default());
    let err = ResourceGroupResource
        .delete(&clients, &id, &planned())
        .await
        .unwrap_err()
        .to_string();
    assert!(err.contains("still contains Resources"), "{err}");
    assert!(
        err.contains("* `/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/rg/providers/Microsoft.Network/virtualNetworks/vnet`"),
        "{err}"
    );
    assert_eq!(list.hits_async().await, 1);
    assert_eq!(delete.hits_async().await, 0);

    let clients = common::clients(
        &server,
        Features {
            prevent_deletion_if_contains_resources: false,
        },
    );
    ResourceGroupResource
        .delete(&clients, &id, &planned())
        .await
        .unwrap();
    assert_eq!(list.hits_async().await, 1);
    assert_eq!(delete.hits_async().await, 1);
}

#[tokio::test]
async fn registers_only_unregistered_providers() {
    let server = MockServer::start_async().await;
    let provider_path =
        |namespace: &str| format!("/subscriptions/{SUBSCRIPTION_ID}/providers/{namespace}");
    server
        .mock_async(|when, then| {
            when.method(GET).path(provider_path("Microsoft.Network"));
            then.status(200).json_body(json!({
                "namespace": "Microsoft.Network",
                "registrationState": "Registered"
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(provider_path("Microsoft.Storage"));
            then.status(200).json_body(json!({
                "namespace": "Microsoft.Storage",
                "registrationState": "NotRegistered"
            }));
        })
        .await;
    let register_network = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(format!("{}/register", provider_path("Microsoft.Network")));
            then.status(200).json_body(json!({"namespace": "Microsoft.Network"}));
        })
        .await;
    let register_storage = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(format!("{}/register", provider_path("Microsoft.Storage")));
            then.status(200).json_body(json!({
                "namespace": "Microsoft.Storage",
                "registrationState": "Registering"
            }));
        })
        .await;

    let arm = common::arm_client(&server);
    register_resource_providers(
        &arm,
        SUBSCRIPTION_ID,
        &["Microsoft.Network", "Microsoft.Storage"],
    )
    .await
    .unwrap();
    assert_eq!(register_network.hits_async().await, 0);
    assert_eq!(register_storage.hits_async().await, 1);
}

#[tokio::test]
async fn registration_failure_is_reported() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path(format!("/subscriptions/{SUBSCRIPTION_ID}/providers/Microsoft.Storage"));
            then.status(200).json_body(json!({"registrationState": "NotRegistered"}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(format!(
                "/subscriptions/{SUBSCRIPTION_ID}/providers/Microsoft.Storage/register"
            ));
            then.status(403).json_body(json!({
                "error": {"code": "AuthorizationFailed", "message": "not allowed"}
            }));
        })
        .await;

    let arm = common::arm_client(&server);
    let err = register_resource_providers(&arm, SUBSCRIPTION_ID, &["Microsoft.Storage"])
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("resource_provider_registrations"));
    assert!(format!("{err:#}").contains("AuthorizationFailed"));
}

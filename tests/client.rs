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


use httpmock::prelude::*;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use terraform_provider_azurerm::client::{ArmError, RequestOptions};

mod common;

const API_VERSION: &str = "2022-09-01";
const RG_PATH: &str = "/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/rg";

#[derive(Debug, Deserialize)]
struct Named {
    name: String,
}

#[tokio::test]
async fn sends_token_and_api_version() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(RG_PATH)
                .query_param("api-version", API_VERSION)
                .header("authorization", "Bearer token");
            then.status(200).json_body(json!({"name": "rg"}));
        })
        .await;

    let client = common::arm_client(&server);
    let named: Named = client
        .execute(&RequestOptions::get(RG_PATH, API_VERSION))
        .await
        .unwrap()
        .model()
        .unwrap();
    assert_eq!(named.name, "rg");
    mock.assert_async().await;
}

#[tokio::test]
async fn unexpected_status_uses_error_envelope() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(PUT).path(RG_PATH);
            then.status(409).json_body(json!({
                "error": {"code": "ResourceGroupBeingDeleted", "message": "rg is being deleted"}
            }));
        })
        .await;

    let client = common::arm_client(&server);
    let options = RequestOptions::new(reqwest::Method::PUT, RG_PATH, API_VERSION)
        .json(&json!({"location": "westeurope"}))
        .unwrap();
    let err = client.execute(&options).await.unwrap_err();
    assert!(err.was_conflict());
    let ArmError::UnexpectedStatus { code, message, .. } = &err else {
        panic!("unexpected error {err:?}");
    };
    assert_eq!(code, "ResourceGroupBeingDeleted");
    assert_eq!(message, "rg is being deleted");
}

#[tokio::test]
async fn missing_resource_is_none() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(RG_PATH);
            then.status(404).json_body(json!({
                "error": {"code": "ResourceGroupNotFound", "message": "not found"}
            }));
        })
        .await;

    let client = common::arm_client(&server);
    let named: Option<Named> = client
        .get_optional(&RequestOptions::get(RG_PATH, API_VERSION))
        .await
        .unwrap();
    assert!(named.is_none());
}

#[tokio::test]
async fn transient_failures_are_retried_for_idempotent_requests() {
    let server = MockServer::start_async().await;
    let get = server
        .mock_async(|when, then| {
            when.method(GET).path(RG_PATH);
            then.status(503);
        })
        .await;
    let post = server
        .mock_async(|when, then| {
            when.method(POST).path(format!("{RG_PATH}/exportTemplate"));
            then.status(503);
        })
        .await;

    let client = common::arm_client(&server);
    let err = client
        .execute(&RequestOptions::get(RG_PATH, API_VERSION))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
    assert_eq!(get.hits_async().await, 3);

    let options = RequestOptions::new(
        reqwest::Method::POST,
        format!("{RG_PATH}/exportTemplate"),
        API_VERSION,
    );
    assert!(client.execute(&options).await.is_err());
    assert_eq!(post.hits_async().await, 1);
}

#[tokio::test]
async fn throttled_requests_are_always_retried() {
    let server = MockServer::start_async().await;
    let post = server
        .mock_async(|when, then| {
            when.method(POST).path(format!("{RG_PATH}/exportTemplate"));
            then.status(429).header("retry-after", "0");
        })
        .await;

    let client = common::arm_client(&server);
    let options = RequestOptions::new(
        reqwest::Method::POST,
        format!("{RG_PATH}/exportTemplate"),
        API_VERSION,
    );
    let err = client.execute(&options).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::TOO_MANY_REQUESTS));
    assert_eq!(post.hits_async().await, 3);
}

#[tokio::test]
async fn list_follows_next_link() {
    let server = MockServer::start_async().await;
    let next_link = server.url("/next-page?$skiptoken=2");
    let first = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(format!("{RG_PATH}/resources"))
                .query_param("api-version", API_VERSION);
            then.status(200).json_body(json!({
                "value": [{"name": "a"}, {"name": "b"}],
                "nextLink": next_link,
            }));
        })
        .await;
    let second = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/next-page")
                .header("authorization", "Bearer token");
            then.status(200).json_body(json!({"value": [{"name": "c"}]}));
        })
        .await;

    let client = common::arm_client(&server);
    let items: Vec<Named> = client
        .list_all(&RequestOptions::get(format!("{RG_PATH}/resources"), API_VERSION))
        .await
        .unwrap();
    assert_eq!(
        items.iter().map(|item| item.name.as_str()).collect::<Vec<_>>(),
        ["a", "b", "c"]
    );
    first.assert_async().await;
    second.assert_async().await;
}

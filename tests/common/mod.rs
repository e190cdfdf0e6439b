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

//! Helpers shared by the integration tests, each test crate uses a subset
#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use httpmock::MockServer;
use terraform_provider_azurerm::{
    auth::StaticTokenCredential,
    client::{ArmClient, RetryPolicy},
    clients::Clients,
    config::Features,
    environment::Environment,
};

pub const SUBSCRIPTION_ID: &str = "00000000-0000-0000-0000-000000000000";

/// Resource manager client talking to the mock server, with short delays
pub fn arm_client(server: &MockServer) -> ArmClient {
    let environment = Environment::new("test", &server.base_url(), &server.base_url());
    ArmClient::new(
        reqwest::Client::new(),
        &environment,
        Arc::new(StaticTokenCredential::new("token")),
    )
    .with_retry_policy(RetryPolicy {
        max_retries: 2,
        min_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
    })
    .with_poll_interval(Duration::from_millis(1))
}

pub fn clients(server: &MockServer, features: Features) -> Clients {
    Clients {
        arm: arm_client(server),
        environment: Environment::new("test", &server.base_url(), &server.base_url()),
        subscription_id: SUBSCRIPTION_ID.to_owned(),
        tenant_id: "11111111-1111-1111-1111-111111111111".to_owned(),
        client_id: "22222222-2222-2222-2222-222222222222".to_owned(),
        object_id: "33333333-3333-3333-3333-333333333333".to_owned(),
        features,
    }
}

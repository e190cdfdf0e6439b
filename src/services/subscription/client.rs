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

use serde::Deserialize;

use crate::{
    client::{ArmClient, ArmError, RequestOptions},
    enums::arm_enum,
    resourceids::{ResourceId, SubscriptionId},
};

const API_VERSION: &str = "2022-12-01";

arm_enum! {
    pub enum SubscriptionState {
        Deleted => "Deleted",
        Disabled => "Disabled",
        Enabled => "Enabled",
        PastDue => "PastDue",
        Warned => "Warned",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub subscription_id: String,
    #[serde(default)]
    pub display_name: String,
    pub state: Option<SubscriptionState>,
    pub tenant_id: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct SubscriptionsClient<'c> {
    client: &'c ArmClient,
}

impl<'c> SubscriptionsClient<'c> {
    pub fn new(client: &'c ArmClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, id: &SubscriptionId) -> Result<Option<Subscription>, ArmError> {
        self.client
            .get_optional(&RequestOptions::get(id.id(), API_VERSION))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subscription() {
        let subscription: Subscription = serde_json::from_value(serde_json::json!({
            "id": "/subscriptions/00000000-0000-0000-0000-000000000000",
            "subscriptionId": "00000000-0000-0000-0000-000000000000",
            "displayName": "Dev",
            "state": "Enabled",
            "tenantId": "11111111-1111-1111-1111-111111111111",
            "subscriptionPolicies": {"spendingLimit": "Off"}
        }))
        .unwrap();
        assert_eq!(subscription.state, Some(SubscriptionState::Enabled));
        assert_eq!(subscription.display_name, "Dev");
    }
}

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

use std::fmt::{self, Display};

use super::{describe, ParseError, ParseResult, ResourceId, Segment};

const STATIC_SUBSCRIPTIONS: Segment = Segment::static_segment("staticSubscriptions", "subscriptions");
const SUBSCRIPTION_ID: Segment = Segment::subscription_id("subscriptionId");
const STATIC_RESOURCE_GROUPS: Segment =
    Segment::static_segment("staticResourceGroups", "resourceGroups");
const RESOURCE_GROUP_NAME: Segment = Segment::resource_group("resourceGroupName");
const STATIC_PROVIDERS: Segment = Segment::static_segment("staticProviders", "providers");

/// `/subscriptions/{subscriptionId}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionId {
    pub subscription_id: String,
}

impl SubscriptionId {
    pub fn new(subscription_id: impl Into<String>) -> Self {
        Self {
            subscription_id: subscription_id.into(),
        }
    }
}

impl ResourceId for SubscriptionId {
    const DESCRIPTION: &'static str = "Subscription";

    fn segments() -> &'static [Segment] {
        const SEGMENTS: &[Segment] = &[STATIC_SUBSCRIPTIONS, SUBSCRIPTION_ID];
        SEGMENTS
    }

    fn from_parse_result(parsed: &ParseResult) -> Result<Self, ParseError> {
        Ok(Self::new(parsed.get("subscriptionId")?))
    }

    fn id(&self) -> String {
        format!("/subscriptions/{}", self.subscription_id)
    }
}

impl Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        describe(
            f,
            Self::DESCRIPTION,
            &[("Subscription", self.subscription_id.as_str())],
        )
    }
}

/// `/subscriptions/{subscriptionId}/providers/{providerName}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProviderId {
    pub subscription_id: String,
    pub provider_name: String,
}

impl ProviderId {
    pub fn new(subscription_id: impl Into<String>, provider_name: impl Into<String>) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            provider_name: provider_name.into(),
        }
    }
}

impl ResourceId for ProviderId {
    const DESCRIPTION: &'static str = "Provider";

    fn segments() -> &'static [Segment] {
        const SEGMENTS: &[Segment] = &[
            STATIC_SUBSCRIPTIONS,
            SUBSCRIPTION_ID,
            STATIC_PROVIDERS,
            Segment::user_specified("providerName", "Microsoft.Example"),
        ];
        SEGMENTS
    }

    fn from_parse_result(parsed: &ParseResult) -> Result<Self, ParseError> {
        Ok(Self::new(
            parsed.get("subscriptionId")?,
            parsed.get("providerName")?,
        ))
    }

    fn id(&self) -> String {
        format!(
            "/subscriptions/{}/providers/{}",
            self.subscription_id, self.provider_name
        )
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        describe(
            f,
            Self::DESCRIPTION,
            &[
                ("Subscription", self.subscription_id.as_str()),
                ("Provider Name", self.provider_name.as_str()),
            ],
        )
    }
}

/// `/subscriptions/{subscriptionId}/resourceGroups/{resourceGroupName}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceGroupId {
    pub subscription_id: String,
    pub resource_group_name: String,
}

impl ResourceGroupId {
    pub fn new(subscription_id: impl Into<String>, resource_group_name: impl Into<String>) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group_name: resource_group_name.into(),
        }
    }
}

impl ResourceId for ResourceGroupId {
    const DESCRIPTION: &'static str = "Resource Group";

    fn segments() -> &'static [Segment] {
        const SEGMENTS: &[Segment] = &[
            STATIC_SUBSCRIPTIONS,
            SUBSCRIPTION_ID,
            STATIC_RESOURCE_GROUPS,
            RESOURCE_GROUP_NAME,
        ];
        SEGMENTS
    }

    fn from_parse_result(parsed: &ParseResult) -> Result<Self, ParseError> {
        Ok(Self::new(
            parsed.get("subscriptionId")?,
            parsed.get("resourceGroupName")?,
        ))
    }

    fn id(&self) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}",
            self.subscription_id, self.resource_group_name
        )
    }
}

impl Display for ResourceGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        describe(
            f,
            Self::DESCRIPTION,
            &[
                ("Subscription", self.subscription_id.as_str()),
                ("Resource Group Name", self.resource_group_name.as_str()),
            ],
        )
    }
}

/// `/subscriptions/{subscriptionId}/resourceGroups/{resourceGroupName}/providers/Microsoft.Network/virtualNetworks/{virtualNetworkName}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VirtualNetworkId {
    pub subscription_id: String,
    pub resource_group_name: String,
    pub virtual_network_name: String,
}

impl VirtualNetworkId {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group_name: impl Into<String>,
        virtual_network_name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group_name: resource_group_name.into(),
            virtual_network_name: virtual_network_name.into(),
        }
    }

    pub fn resource_group_id(&self) -> ResourceGroupId {
        ResourceGroupId::new(&self.subscription_id, &self.resource_group_name)
    }
}

const VIRTUAL_NETWORK_SEGMENTS: [Segment; 8] = [
    STATIC_SUBSCRIPTIONS,
    SUBSCRIPTION_ID,
    STATIC_RESOURCE_GROUPS,
    RESOURCE_GROUP_NAME,
    STATIC_PROVIDERS,
    Segment::resource_provider("staticMicrosoftNetwork", "Microsoft.Network"),
    Segment::static_segment("staticVirtualNetworks", "virtualNetworks"),
    Segment::user_specified("virtualNetworkName", "virtualNetworkName"),
];

impl ResourceId for VirtualNetworkId {
    const DESCRIPTION: &'static str = "Virtual Network";

    fn segments() -> &'static [Segment] {
        &VIRTUAL_NETWORK_SEGMENTS
    }

    fn from_parse_result(parsed: &ParseResult) -> Result<Self, ParseError> {
        Ok(Self::new(
            parsed.get("subscriptionId")?,
            parsed.get("resourceGroupName")?,
            parsed.get("virtualNetworkName")?,
        ))
    }

    fn id(&self) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Network/virtualNetworks/{}",
            self.subscription_id, self.resource_group_name, self.virtual_network_name
        )
    }
}

impl Display for VirtualNetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        describe(
            f,
            Self::DESCRIPTION,
            &[
                ("Subscription", self.subscription_id.as_str()),
                ("Resource Group Name", self.resource_group_name.as_str()),
                ("Virtual Network Name", self.virtual_network_name.as_str()),
            ],
        )
    }
}

/// `.../providers/Microsoft.Network/virtualNetworks/{virtualNetworkName}/subnets/{subnetName}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubnetId {
    pub subscription_id: String,
    pub resource_group_name: String,
    pub virtual_network_name: String,
    pub subnet_name: String,
}

impl SubnetId {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group_name: impl Into<String>,
        virtual_network_name: impl Into<String>,
        subnet_name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group_name: resource_group_name.into(),
            virtual_network_name: virtual_network_name.into(),
            subnet_name: subnet_name.into(),
        }
    }

    pub fn virtual_network_id(&self) -> VirtualNetworkId {
        VirtualNetworkId::new(
            &self.subscription_id,
            &self.resource_group_name,
            &self.virtual_network_name,
        )
    }
}

impl ResourceId for SubnetId {
    const DESCRIPTION: &'static str = "Subnet";

    fn segments() -> &'static [Segment] {
        const SEGMENTS: &[Segment] = &[
            VIRTUAL_NETWORK_SEGMENTS[0],
            VIRTUAL_NETWORK_SEGMENTS[1],
            VIRTUAL_NETWORK_SEGMENTS[2],
            VIRTUAL_NETWORK_SEGMENTS[3],
            VIRTUAL_NETWORK_SEGMENTS[4],
            VIRTUAL_NETWORK_SEGMENTS[5],
            VIRTUAL_NETWORK_SEGMENTS[6],
            VIRTUAL_NETWORK_SEGMENTS[7],
            Segment::static_segment("staticSubnets", "subnets"),
            Segment::user_specified("subnetName", "subnetName"),
        ];
        SEGMENTS
    }

    fn from_parse_result(parsed: &ParseResult) -> Result<Self, ParseError> {
        Ok(Self::new(
            parsed.get("subscriptionId")?,
            parsed.get("resourceGroupName")?,
            parsed.get("virtualNetworkName")?,
            parsed.get("subnetName")?,
        ))
    }

    fn id(&self) -> String {
        format!("{}/subnets/{}", self.virtual_network_id().id(), self.subnet_name)
    }
}

impl Display for SubnetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        describe(
            f,
            Self::DESCRIPTION,
            &[
                ("Subscription", self.subscription_id.as_str()),
                ("Resource Group Name", self.resource_group_name.as_str()),
                ("Virtual Network Name", self.virtual_network_name.as_str()),
                ("Subnet Name", self.subnet_name.as_str()),
            ],
        )
    }
}

/// `/subscriptions/{subscriptionId}/resourceGroups/{resourceGroupName}/providers/Microsoft.Storage/storageAccounts/{storageAccountName}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageAccountId {
    pub subscription_id: String,
    pub resource_group_name: String,
    pub storage_account_name: String,
}

impl StorageAccountId {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group_name: impl Into<String>,
        storage_account_name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group_name: resource_group_name.into(),
            storage_account_name: storage_account_name.into(),
        }
    }
}

impl ResourceId for StorageAccountId {
    const DESCRIPTION: &'static str = "Storage Account";

    fn segments() -> &'static [Segment] {
        const SEGMENTS: &[Segment] = &[
            STATIC_SUBSCRIPTIONS,
            SUBSCRIPTION_ID,
            STATIC_RESOURCE_GROUPS,
            RESOURCE_GROUP_NAME,
            STATIC_PROVIDERS,
            Segment::resource_provider("staticMicrosoftStorage", "Microsoft.Storage"),
            Segment::static_segment("staticStorageAccounts", "storageAccounts"),
            Segment::user_specified("storageAccountName", "storageAccountName"),
        ];
        SEGMENTS
    }

    fn from_parse_result(parsed: &ParseResult) -> Result<Self, ParseError> {
        Ok(Self::new(
            parsed.get("subscriptionId")?,
            parsed.get("resourceGroupName")?,
            parsed.get("storageAccountName")?,
        ))
    }

    fn id(&self) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Storage/storageAccounts/{}",
            self.subscription_id, self.resource_group_name, self.storage_account_name
        )
    }
}

impl Display for StorageAccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        describe(
            f,
            Self::DESCRIPTION,
            &[
                ("Subscription", self.subscription_id.as_str()),
                ("Resource Group Name", self.resource_group_name.as_str()),
                ("Storage Account Name", self.storage_account_name.as_str()),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUB: &str = "12345678-1234-9876-4563-123456789012";

    #[test]
    fn resource_group_round_trip() {
        let id = ResourceGroupId::new(SUB, "my-group");
        let formatted = id.id();
        assert_eq!(
            formatted,
            format!("/subscriptions/{SUB}/resourceGroups/my-group")
        );
        assert_eq!(ResourceGroupId::parse(&formatted).unwrap(), id);
    }

    #[test]
    fn subnet_parses_insensitively() {
        let input = format!(
            "/subscriptions/{SUB}/resourcegroups/rg/providers/microsoft.network/virtualnetworks/vnet/SUBNETS/internal"
        );
        assert!(SubnetId::parse(&input).is_err());

        let id = SubnetId::parse_insensitively(&input).unwrap();
        assert_eq!(id.subnet_name, "internal");
        assert_eq!(id.virtual_network_name, "vnet");
        assert_eq!(
            id.id(),
            format!("/subscriptions/{SUB}/resourceGroups/rg/providers/Microsoft.Network/virtualNetworks/vnet/subnets/internal")
        );
    }

    #[test]
    fn storage_account_is_not_a_virtual_network() {
        let id = StorageAccountId::new(SUB, "rg", "account");
        let err = VirtualNetworkId::parse(&id.id()).unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnexpectedSegment {
                name: "staticMicrosoftNetwork",
                ..
            }
        ));
    }

    #[test]
    fn display_is_human_readable() {
        let id = StorageAccountId::new(SUB, "rg", "account");
        assert_eq!(
            id.to_string(),
            format!("Storage Account (Subscription: \"{SUB}\"\nResource Group Name: \"rg\"\nStorage Account Name: \"account\")")
        );
    }

    #[test]
    fn validate_reports_the_attribute() {
        assert!(ResourceGroupId::validate(&format!("/subscriptions/{SUB}/resourceGroups/rg"), "id").is_empty());

        let errors = ResourceGroupId::validate("/subscriptions/x", "resource_group_id");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("parsing `resource_group_id`"));
    }
}

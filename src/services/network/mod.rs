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

//! `Microsoft.Network`: virtual networks and their subnets
//!
//! Subnets are child resources of their virtual network: every write to a
//! network or one of its subnets holds the lock of the network.

use ipnet::IpNet;

pub mod client;
mod subnet;
mod virtual_network;

pub use subnet::{SubnetResource, SubnetState};
pub use virtual_network::{VirtualNetworkResource, VirtualNetworkState};

const VIRTUAL_NETWORK_LOCK: &str = "azurerm_virtual_network";
const SUBNET_LOCK: &str = "azurerm_subnet";

/// Errors for an address prefix in CIDR notation
pub(crate) fn cidr_errors(value: &str) -> Vec<String> {
    match value.parse::<IpNet>() {
        Ok(_) => Vec::new(),
        Err(err) => vec![format!(
            "expected an address prefix in CIDR notation, got {value:?}: {err}"
        )],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cidr() {
        assert!(cidr_errors("10.0.0.0/16").is_empty());
        assert!(cidr_errors("fd00::/8").is_empty());
        assert_eq!(cidr_errors("10.0.0.0").len(), 1);
        assert_eq!(cidr_errors("10.0.0/16").len(), 1);
        assert_eq!(cidr_errors("10.0.0.0/33").len(), 1);
        assert_eq!(cidr_errors("fd00::/129").len(), 1);
        assert_eq!(cidr_errors("").len(), 1);
    }
}

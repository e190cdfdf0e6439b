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

//! Terraform provider for Azure Resource Manager
//!
//! The provider is served over the plugin protocol by [`tf_provider::serve`]:
//! see [`provider::AzureRmProvider`] for the resources and data sources it exposes.

use tracing_subscriber::EnvFilter;

pub mod auth;
pub mod client;
pub mod clients;
pub mod config;
pub(crate) mod enums;
pub mod environment;
pub mod provider;
pub mod resource;
pub mod resourceids;
pub mod services;
pub mod utils;

pub use provider::AzureRmProvider;

/// Variable holding the log filter, e.g. `debug` or `terraform_provider_azurerm::client=trace`
pub const LOG_FILTER_VAR: &str = "TF_LOG_PROVIDER_AZURERM";

/// Log to stderr, which Terraform collects in its own logs
///
/// stdout is reserved to the plugin handshake.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_env(LOG_FILTER_VAR).unwrap_or_else(|_| EnvFilter::new("info"));
    // a subscriber may already be installed by an embedding process
    _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}

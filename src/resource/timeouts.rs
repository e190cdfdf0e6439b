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

use std::{future::Future, time::Duration};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tf_provider::{
    schema::{Attribute, AttributeConstraint, AttributeType, Block, Description, NestedBlock},
    map,
    value::{Value, ValueString},
    AttributePath, Diagnostics,
};

use crate::utils::WithValidate;

/// Default deadlines of the operations of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub create: Duration,
    pub read: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Timeouts {
    pub const fn minutes(create: u64, read: u64, update: u64, delete: u64) -> Self {
        Self {
            create: Duration::from_secs(create * 60),
            read: Duration::from_secs(read * 60),
            update: Duration::from_secs(update * 60),
            delete: Duration::from_secs(delete * 60),
        }
    }

    /// Schema of the `timeouts` block, documenting these defaults
    pub fn block(&self) -> NestedBlock {
        let attribute = |operation: &str, default: Duration| Attribute {
            attr_type: AttributeType::String,
            description: Description::plain(format!(
                "Deadline of the {operation} operation (default: {})",
                humantime::format_duration(default)
            )),
            constraint: AttributeConstraint::Optional,
            ..Default::default()
        };
        NestedBlock::Optional(Block {
            description: Description::plain("Operation deadlines, like `30m` or `1h30m`"),
            attributes: map! {
                "create" => attribute("create", self.create),
                "read" => attribute("read", self.read),
                "update" => attribute("update", self.update),
                "delete" => attribute("delete", self.delete),
            },
            ..Default::default()
        })
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self::minutes(30, 5, 30, 30)
    }
}

/// `timeouts` block of a resource state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutsBlock<'a> {
    #[serde(borrow = "'a")]
    pub create: ValueString<'a>,
    pub read: ValueString<'a>,
    pub update: ValueString<'a>,
    pub delete: ValueString<'a>,
}

/// Operation bounded by a deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

impl Operation {
    fn name(self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

impl<'a> TimeoutsBlock<'a> {
    fn value(&self, operation: Operation) -> &ValueString<'a> {
        match operation {
            Operation::Create => &self.create,
            Operation::Read => &self.read,
            Operation::Update => &self.update,
            Operation::Delete => &self.delete,
        }
    }
}

/// Deadline of `operation`, from the `timeouts` block or the defaults
pub fn deadline(block: &Value<TimeoutsBlock<'_>>, defaults: &Timeouts, operation: Operation) -> Duration {
    let default = match operation {
        Operation::Create => defaults.create,
        Operation::Read => defaults.read,
        Operation::Update => defaults.update,
        Operation::Delete => defaults.delete,
    };
    let Value::Value(block) = block else {
        return default;
    };
    block
        .value(operation)
        .as_deref_option()
        .and_then(|value| humantime::parse_duration(value).ok())
        .unwrap_or(default)
}

/// Run `future` within `deadline`
pub async fn with_deadline<T>(
    operation: Operation,
    deadline: Duration,
    future: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(deadline, future).await {
        Ok(result) => result,
        Err(_) => Err(anyhow!(
            "the {} operation did not complete within {}",
            operation.name(),
            humantime::format_duration(deadline)
        )),
    }
}

impl<'a> WithValidate for TimeoutsBlock<'a> {
    fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath) {
        for operation in [
            Operation::Create,
            Operation::Read,
            Operation::Update,
            Operation::Delete,
        ] {
            let Some(value) = self.value(operation).as_deref_option() else {
                continue;
            };
            match humantime::parse_duration(value) {
                Ok(duration) if duration < Duration::from_secs(1) => diags.error(
                    "Invalid timeout",
                    format!("The {} timeout must be at least one second", operation.name()),
                    attr_path.clone().attribute(operation.name()),
                ),
                Ok(_) => (),
                Err(err) => diags.error(
                    "Invalid timeout",
                    format!("{value:?} is not a valid duration: {err}"),
                    attr_path.clone().attribute(operation.name()),
                ),
            }
        }
    }
}

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

//! Azure Resource Manager resource IDs
//!
//! A resource ID is an URL path made of an ordered list of segments.
//! Some segments are literals (`subscriptions`, `Microsoft.Storage`), the others
//! hold the user values (subscription, resource group, resource names).
//! Every ID type declares its segments once, and gets parsing, formatting and
//! validation from [`ResourceId`].

use std::fmt::{self, Display};

use itertools::Itertools;

mod common;
mod parse;

pub use common::{
    ProviderId, ResourceGroupId, StorageAccountId, SubnetId, SubscriptionId, VirtualNetworkId,
};
pub use parse::{ParseError, ParseResult};

/// Kind of a resource ID segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Literal path element, like `subscriptions` or `resourceGroups`
    Static(&'static str),
    /// Literal resource provider namespace, like `Microsoft.Network`
    ResourceProvider(&'static str),
    /// UUID of the subscription
    SubscriptionId,
    /// Name of the resource group
    ResourceGroup,
    /// Any non empty value chosen by the user
    UserSpecified,
    /// One value of a fixed set
    Constant(&'static [&'static str]),
}

/// Segment of a resource ID
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// Name of the segment, used as the key of the parse result
    pub name: &'static str,
    /// What the segment holds
    pub kind: SegmentKind,
    /// Value used to build an example ID in error messages
    pub example: &'static str,
}

impl Segment {
    pub const fn static_segment(name: &'static str, value: &'static str) -> Self {
        Self {
            name,
            kind: SegmentKind::Static(value),
            example: value,
        }
    }

    pub const fn resource_provider(name: &'static str, value: &'static str) -> Self {
        Self {
            name,
            kind: SegmentKind::ResourceProvider(value),
            example: value,
        }
    }

    pub const fn subscription_id(name: &'static str) -> Self {
        Self {
            name,
            kind: SegmentKind::SubscriptionId,
            example: "12345678-1234-9876-4563-123456789012",
        }
    }

    pub const fn resource_group(name: &'static str) -> Self {
        Self {
            name,
            kind: SegmentKind::ResourceGroup,
            example: "example-resource-group",
        }
    }

    pub const fn user_specified(name: &'static str, example: &'static str) -> Self {
        Self {
            name,
            kind: SegmentKind::UserSpecified,
            example,
        }
    }

    pub const fn constant(
        name: &'static str,
        values: &'static [&'static str],
        example: &'static str,
    ) -> Self {
        Self {
            name,
            kind: SegmentKind::Constant(values),
            example,
        }
    }

    /// Explain what value is expected for this segment
    pub(crate) fn explain(&self) -> String {
        match self.kind {
            SegmentKind::Static(value) => format!("this should be the literal value {value:?}"),
            SegmentKind::ResourceProvider(value) => format!(
                "this should be the literal value {value:?} (the resource provider namespace)"
            ),
            SegmentKind::SubscriptionId => {
                "this should be the UUID of the Azure Subscription".to_owned()
            }
            SegmentKind::ResourceGroup => {
                "this should be the name of the Resource Group".to_owned()
            }
            SegmentKind::UserSpecified => format!(
                "this should be the user specified value for this {} [for example {:?}]",
                self.name, self.example
            ),
            SegmentKind::Constant(values) => format!(
                "this should be one of {} [for example {:?}]",
                values
                    .iter()
                    .map(|v| format!("{v:?}"))
                    .join(", "),
                self.example
            ),
        }
    }
}

/// Build the example ID of a list of segments
pub(crate) fn example_id(segments: &[Segment]) -> String {
    segments
        .iter()
        .fold(String::new(), |acc, segment| acc + "/" + segment.example)
}

/// Typed resource ID
///
/// Implementors only declare their segments and how to build themselves from a
/// [`ParseResult`]; parsing and validation are shared.
pub trait ResourceId: Sized + Display {
    /// Human readable name of the resource type, e.g. `Storage Account`
    const DESCRIPTION: &'static str;

    /// Ordered segments of the ID
    fn segments() -> &'static [Segment];

    /// Build the ID from the values extracted by the parser
    fn from_parse_result(parsed: &ParseResult) -> Result<Self, ParseError>;

    /// Format the ID as an URL path
    fn id(&self) -> String;

    /// Parse an ID, literal segments must match exactly
    fn parse(input: &str) -> Result<Self, ParseError> {
        let parsed = parse::parse_segments(Self::DESCRIPTION, Self::segments(), input, false)?;
        Self::from_parse_result(&parsed)
    }

    /// Parse an ID, literal segments are matched case-insensitively and normalized
    ///
    /// This is meant for IDs returned by the API, which does not always preserve casing.
    fn parse_insensitively(input: &str) -> Result<Self, ParseError> {
        let parsed = parse::parse_segments(Self::DESCRIPTION, Self::segments(), input, true)?;
        Self::from_parse_result(&parsed)
    }

    /// Validate a value given for the attribute `key`
    fn validate(input: &str, key: &str) -> Vec<String> {
        match Self::parse(input) {
            Ok(_) => Vec::new(),
            Err(err) => vec![format!("parsing `{key}`: {err}")],
        }
    }
}

/// Write the human readable form of an ID:
/// `Description (Label: "value"\nLabel: "value")`
pub(crate) fn describe(
    f: &mut fmt::Formatter<'_>,
    description: &str,
    components: &[(&str, &str)],
) -> fmt::Result {
    write!(f, "{description} (")?;
    let mut sep = "";
    for (label, value) in components {
        write!(f, "{sep}{label}: {value:?}")?;
        sep = "\n";
    }
    f.write_str(")")
}

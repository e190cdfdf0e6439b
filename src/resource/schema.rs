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

//! Attributes shared by most resources

use std::collections::BTreeMap;

use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;
use tf_provider::{
    schema::{Attribute, AttributeConstraint, AttributeType, Description},
    value::{ValueList, ValueMap, ValueString, Value},
    AttributePath, Diagnostics,
};

use crate::utils::{to_string_list, to_string_map};

const MAX_TAGS: usize = 50;
const MAX_TAG_KEY_LENGTH: usize = 512;
const MAX_TAG_VALUE_LENGTH: usize = 256;

lazy_static! {
    static ref RESOURCE_GROUP_NAME: Regex =
        Regex::new(r"^[-\w\._\(\)]{1,90}$").expect("resource group name pattern");
}

pub fn attribute(
    attr_type: AttributeType,
    constraint: AttributeConstraint,
    description: &str,
) -> Attribute {
    Attribute {
        attr_type,
        description: Description::plain(description),
        constraint,
        ..Default::default()
    }
}

pub fn id_attribute() -> Attribute {
    attribute(
        AttributeType::String,
        AttributeConstraint::Computed,
        "Resource Manager ID of the resource",
    )
}

pub fn location_attribute(constraint: AttributeConstraint) -> Attribute {
    attribute(
        AttributeType::String,
        constraint,
        "Azure region of the resource, changing it forces a new resource",
    )
}

pub fn tags_attribute(constraint: AttributeConstraint) -> Attribute {
    attribute(
        AttributeType::Map(AttributeType::String.into()),
        constraint,
        "Tags assigned to the resource",
    )
}

/// Tags returned by the API, no tags stays null when none were configured
pub fn flatten_tags<'a>(
    tags: Option<BTreeMap<String, String>>,
    prior: &ValueMap<'a, ValueString<'a>>,
) -> ValueMap<'a, ValueString<'a>> {
    let tags = tags.unwrap_or_default();
    if tags.is_empty() && prior.is_null() {
        Value::Null
    } else {
        to_string_map(tags)
    }
}

/// Optional list returned by the API, an empty list stays null when none was configured
pub fn flatten_optional_list<'a>(
    values: Option<Vec<String>>,
    prior: &ValueList<ValueString<'a>>,
) -> ValueList<ValueString<'a>> {
    let values = values.unwrap_or_default();
    if values.is_empty() && prior.is_null() {
        Value::Null
    } else {
        to_string_list(values)
    }
}

/// Canonical form of a location: `West Europe` and `westeurope` are the same region
pub fn normalize_location(location: &str) -> String {
    location.replace(' ', "").to_lowercase()
}

/// Keep the location as written by the user when it designates the region returned by the API
pub fn suppress_location_diff<'a>(prior: &ValueString<'a>, current: &mut ValueString<'a>) {
    if let (Some(prior_location), Some(current_location)) =
        (prior.as_deref_option(), current.as_deref_option())
    {
        if normalize_location(prior_location) == normalize_location(current_location) {
            *current = prior.clone();
        }
    }
}

pub fn validate_location(
    diags: &mut Diagnostics,
    location: &ValueString,
    attr_path: AttributePath,
) {
    if location.as_deref_option().map(str::trim) == Some("") {
        diags.error_short("`location` must not be empty", attr_path);
    }
}

pub fn validate_tags(
    diags: &mut Diagnostics,
    tags: &ValueMap<'_, ValueString<'_>>,
    attr_path: AttributePath,
) {
    let Value::Value(tags) = tags else {
        return;
    };
    if tags.len() > MAX_TAGS {
        diags.error(
            "Too many tags",
            format!(
                "a maximum of {MAX_TAGS} tags can be applied to each resource, got {}",
                tags.len()
            ),
            attr_path.clone(),
        );
    }
    for (key, value) in tags {
        if key.chars().count() > MAX_TAG_KEY_LENGTH {
            diags.error(
                "Tag name too long",
                format!(
                    "the maximum length for a tag key is {MAX_TAG_KEY_LENGTH} characters: {key:?}"
                ),
                attr_path.clone().key(key.to_string()),
            );
        }
        if let Some(value) = value.as_deref_option() {
            if value.chars().count() > MAX_TAG_VALUE_LENGTH {
                diags.error(
                    "Tag value too long",
                    format!(
                        "the maximum length for a tag value is {MAX_TAG_VALUE_LENGTH} characters: {key:?}"
                    ),
                    attr_path.clone().key(key.to_string()),
                );
            }
        }
    }
}

/// Errors for a resource group name
pub fn resource_group_name_errors(name: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if !RESOURCE_GROUP_NAME.is_match(name) {
        errors.push(
            "may only contain alphanumeric characters, dash, underscores, parentheses and periods, and be between 1 and 90 characters".to_owned(),
        );
    }
    if name.ends_with('.') {
        errors.push("cannot end in a period".to_owned());
    }
    errors
}

/// Report the `errors` found for a string attribute
pub fn report_errors(diags: &mut Diagnostics, errors: Vec<String>, attr_path: AttributePath) {
    for error in errors {
        diags.error("Invalid value", error, attr_path.clone());
    }
}

/// Check that a string attribute is one of the `possible` values
pub fn validate_one_of(
    diags: &mut Diagnostics,
    value: &ValueString,
    possible: &[&str],
    ignore_case: bool,
    attr_path: AttributePath,
) {
    let Some(value) = value.as_deref_option() else {
        return;
    };
    let found = possible.iter().any(|candidate| {
        if ignore_case {
            candidate.eq_ignore_ascii_case(value)
        } else {
            *candidate == value
        }
    });
    if !found {
        diags.error(
            "Invalid value",
            format!(
                "expected one of {}, got {value:?}",
                possible.iter().map(|v| format!("{v:?}")).join(", ")
            ),
            attr_path,
        );
    }
}

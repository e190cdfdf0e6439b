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

use std::{borrow::Cow, collections::BTreeMap};

use tf_provider::{
    value::{ValueList, ValueMap, ValueString},
    schema::Schema,
    value::Value,
    AttributePath, Diagnostics,
};

pub trait WithSchema {
    fn schema() -> Schema;
}

pub trait WithValidate {
    fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath);
}

impl<T: WithValidate> WithValidate for Value<T> {
    fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath) {
        if let Value::Value(value) = self {
            value.validate(diags, attr_path);
        }
    }
}

/// Known string, or [`Value::Null`]
pub(crate) fn optional_string<'a>(value: Option<impl Into<Cow<'a, str>>>) -> ValueString<'a> {
    match value {
        Some(value) => Value::Value(value.into()),
        None => Value::Null,
    }
}

/// Known string, an empty string is [`Value::Null`]
pub(crate) fn non_empty_string<'a>(value: impl Into<Cow<'a, str>>) -> ValueString<'a> {
    let value = value.into();
    if value.is_empty() {
        Value::Null
    } else {
        Value::Value(value)
    }
}

/// Known strings of a list, unknown and null elements are skipped
pub(crate) fn string_list(list: &ValueList<ValueString<'_>>) -> Vec<String> {
    list.iter()
        .flatten()
        .filter_map(|value| Some(value.as_deref_option()?.to_owned()))
        .collect()
}

pub(crate) fn to_string_list<'a>(values: impl IntoIterator<Item = String>) -> ValueList<ValueString<'a>> {
    Value::Value(
        values
            .into_iter()
            .map(|value| Value::Value(Cow::Owned(value)))
            .collect(),
    )
}

/// Known entries of a map
pub(crate) fn string_map(map: &ValueMap<'_, ValueString<'_>>) -> BTreeMap<String, String> {
    map.iter()
        .flatten()
        .filter_map(|(key, value)| Some((key.to_string(), value.as_deref_option()?.to_owned())))
        .collect()
}

pub(crate) fn to_string_map<'a>(
    map: impl IntoIterator<Item = (String, String)>,
) -> ValueMap<'a, ValueString<'a>> {
    Value::Value(
        map.into_iter()
            .map(|(key, value)| (Cow::Owned(key), Value::Value(Cow::Owned(value))))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_elements_are_skipped() {
        let list: ValueList<ValueString> = Value::Value(vec![
            Value::Value(Cow::Borrowed("10.0.0.0/16")),
            Value::Unknown,
            Value::Null,
        ]);
        assert_eq!(string_list(&list), vec!["10.0.0.0/16".to_owned()]);
        assert!(string_list(&Value::Unknown).is_empty());
    }

    #[test]
    fn empty_strings_are_null() {
        assert!(non_empty_string("").is_null());
        assert_eq!(non_empty_string("x"), Value::Value(Cow::Borrowed("x")));
        assert!(optional_string(None::<String>).is_null());
    }
}

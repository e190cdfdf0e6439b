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

/// Declare a string enum of the ARM API
///
/// Parsing is case-insensitive, and values unknown to the provider are kept
/// verbatim in the `Other` variant: the API may add values at any time.
macro_rules! arm_enum {
    ($(#[$meta:meta])* $vis:vis enum $name:ident { $($variant:ident => $value:literal,)+ }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant,)+
            Other(String),
        }

        #[allow(dead_code)]
        impl $name {
            pub const POSSIBLE_VALUES: &'static [&'static str] = &[$($value,)+];

            pub fn possible_values() -> &'static [&'static str] {
                Self::POSSIBLE_VALUES
            }

            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $value,)+
                    Self::Other(value) => value.as_str(),
                }
            }

            pub fn parse(input: &str) -> Self {
                $(
                    if input.eq_ignore_ascii_case($value) {
                        return Self::$variant;
                    }
                )+
                Self::Other(input.to_owned())
            }

            pub fn is_known(&self) -> bool {
                !matches!(self, Self::Other(_))
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::parse(value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let value = <std::borrow::Cow<'de, str> as serde::Deserialize>::deserialize(deserializer)?;
                Ok(Self::parse(&value))
            }
        }
    };
}

pub(crate) use arm_enum;

#[cfg(test)]
mod tests {
    arm_enum! {
        enum AccessTier {
            Cool => "Cool",
            Hot => "Hot",
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(AccessTier::parse("hot"), AccessTier::Hot);
        assert_eq!(AccessTier::parse("COOL"), AccessTier::Cool);
        assert_eq!(AccessTier::possible_values(), &["Cool", "Hot"]);
    }

    #[test]
    fn unknown_values_are_kept() {
        let tier = AccessTier::parse("Archive");
        assert_eq!(tier, AccessTier::Other("Archive".to_owned()));
        assert!(!tier.is_known());
        assert_eq!(tier.to_string(), "Archive");
    }

    #[test]
    fn serde_uses_the_api_casing() {
        let tier: AccessTier = serde_json::from_str("\"hot\"").unwrap();
        assert_eq!(tier, AccessTier::Hot);
        assert_eq!(serde_json::to_string(&tier).unwrap(), "\"Hot\"");
    }
}

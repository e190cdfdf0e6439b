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

use std::collections::BTreeMap;

use thiserror::Error;

use super::{example_id, Segment, SegmentKind};

/// Values extracted from a resource ID, keyed by segment name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    pub parsed: BTreeMap<&'static str, String>,
    pub raw_input: String,
}

impl ParseResult {
    /// Get the value of the segment `name`
    pub fn get(&self, name: &'static str) -> Result<&str, ParseError> {
        self.parsed
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| ParseError::MissingSegment {
                name,
                input: self.raw_input.clone(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("parsing {description} ID: the input was empty")]
    Empty { description: &'static str },
    #[error("parsing {input:?}: the number of segments didn't match\n\n{explanation}")]
    SegmentCount { input: String, explanation: String },
    #[error("parsing {input:?}: expected the segment {name:?} (position {index}) to be {expected:?} but got {actual:?}\n\n{explanation}")]
    UnexpectedSegment {
        input: String,
        name: &'static str,
        index: usize,
        expected: String,
        actual: String,
        explanation: String,
    },
    #[error("parsing {input:?}: the segment {name:?} (position {index}) was empty\n\n{explanation}")]
    EmptySegment {
        input: String,
        name: &'static str,
        index: usize,
        explanation: String,
    },
    #[error("the segment {name:?} was not found in the parse result of {input:?}")]
    MissingSegment { name: &'static str, input: String },
}

fn explain(description: &str, segments: &[Segment], input: &str, found: usize) -> String {
    let mut explanation = format!(
        "Expected a {description} ID that matched (containing {} segments):\n\n> {}\n\nHowever this value was provided (which was parsed into {found} segments):\n\n> {input}\n\nThe following Segments are expected:\n",
        segments.len(),
        example_id(segments),
    );
    for (i, segment) in segments.iter().enumerate() {
        explanation.push_str(&format!("\n* Segment {i} - {}", segment.explain()));
    }
    explanation
}

fn literal_matches(expected: &str, actual: &str, insensitively: bool) -> bool {
    if insensitively {
        expected.eq_ignore_ascii_case(actual)
    } else {
        expected == actual
    }
}

/// Match `input` against `segments`
///
/// The leading `/` is optional. When `insensitively` is set, literal and
/// constant segments are normalized to their declared casing.
pub(super) fn parse_segments(
    description: &'static str,
    segments: &[Segment],
    input: &str,
    insensitively: bool,
) -> Result<ParseResult, ParseError> {
    if input.is_empty() {
        return Err(ParseError::Empty { description });
    }

    let values = input
        .strip_prefix('/')
        .unwrap_or(input)
        .split('/')
        .collect::<Vec<_>>();

    if values.len() != segments.len() {
        return Err(ParseError::SegmentCount {
            input: input.to_owned(),
            explanation: explain(description, segments, input, values.len()),
        });
    }

    let mut parsed = BTreeMap::new();
    for (index, (segment, value)) in segments.iter().zip(values).enumerate() {
        let unexpected = |expected: String| ParseError::UnexpectedSegment {
            input: input.to_owned(),
            name: segment.name,
            index,
            expected,
            actual: value.to_owned(),
            explanation: explain(description, segments, input, segments.len()),
        };

        let value = match segment.kind {
            SegmentKind::Static(expected) | SegmentKind::ResourceProvider(expected) => {
                if !literal_matches(expected, value, insensitively) {
                    return Err(unexpected(expected.to_owned()));
                }
                expected.to_owned()
            }
            SegmentKind::Constant(possible) => possible
                .iter()
                .find(|expected| literal_matches(expected, value, insensitively))
                .map(|expected| (*expected).to_owned())
                .ok_or_else(|| unexpected(format!("one of {possible:?}")))?,
            SegmentKind::SubscriptionId | SegmentKind::ResourceGroup | SegmentKind::UserSpecified => {
                if value.is_empty() {
                    return Err(ParseError::EmptySegment {
                        input: input.to_owned(),
                        name: segment.name,
                        index,
                        explanation: explain(description, segments, input, segments.len()),
                    });
                }
                value.to_owned()
            }
        };
        parsed.insert(segment.name, value);
    }

    Ok(ParseResult {
        parsed,
        raw_input: input.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEGMENTS: &[Segment] = &[
        Segment::static_segment("staticSubscriptions", "subscriptions"),
        Segment::subscription_id("subscriptionId"),
        Segment::static_segment("staticProviders", "providers"),
        Segment::resource_provider("staticMicrosoftCompute", "Microsoft.Compute"),
        Segment::static_segment("staticSkus", "skus"),
        Segment::constant("tier", &["Basic", "Premium"], "Basic"),
        Segment::user_specified("skuName", "skuValue"),
    ];

    #[test]
    fn parses_exact_input() {
        let result = parse_segments(
            "Sku",
            SEGMENTS,
            "/subscriptions/abc/providers/Microsoft.Compute/skus/Premium/large",
            false,
        )
        .unwrap();
        assert_eq!(result.get("subscriptionId").unwrap(), "abc");
        assert_eq!(result.get("tier").unwrap(), "Premium");
        assert_eq!(result.get("skuName").unwrap(), "large");
    }

    #[test]
    fn leading_slash_is_optional() {
        let result = parse_segments(
            "Sku",
            SEGMENTS,
            "subscriptions/abc/providers/Microsoft.Compute/skus/Basic/small",
            false,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn casing_is_strict_unless_insensitive() {
        let input = "/SUBSCRIPTIONS/abc/Providers/microsoft.compute/SKUS/premium/Large";
        let err = parse_segments("Sku", SEGMENTS, input, false).unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnexpectedSegment {
                name: "staticSubscriptions",
                index: 0,
                ..
            }
        ));

        let result = parse_segments("Sku", SEGMENTS, input, true).unwrap();
        assert_eq!(result.get("staticProviders").unwrap(), "providers");
        assert_eq!(
            result.get("staticMicrosoftCompute").unwrap(),
            "Microsoft.Compute"
        );
        assert_eq!(result.get("tier").unwrap(), "Premium");
        // user values keep their casing
        assert_eq!(result.get("skuName").unwrap(), "Large");
    }

    #[test]
    fn rejects_unknown_constant() {
        let err = parse_segments(
            "Sku",
            SEGMENTS,
            "/subscriptions/abc/providers/Microsoft.Compute/skus/Gold/large",
            true,
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedSegment { name: "tier", .. }));
    }

    #[test]
    fn rejects_wrong_segment_count() {
        let err = parse_segments("Sku", SEGMENTS, "/subscriptions/abc", false).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("the number of segments didn't match"));
        assert!(message.contains("containing 7 segments"));
        assert!(message.contains("which was parsed into 2 segments"));
        assert!(message.contains("* Segment 1 - this should be the UUID of the Azure Subscription"));
    }

    #[test]
    fn rejects_empty_values() {
        assert_eq!(
            parse_segments("Sku", SEGMENTS, "", false).unwrap_err(),
            ParseError::Empty { description: "Sku" }
        );

        let err = parse_segments(
            "Sku",
            SEGMENTS,
            "/subscriptions//providers/Microsoft.Compute/skus/Basic/small",
            false,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ParseError::EmptySegment {
                name: "subscriptionId",
                index: 1,
                ..
            }
        ));
    }

    #[test]
    fn trailing_slash_is_rejected() {
        let err = parse_segments(
            "Sku",
            SEGMENTS,
            "/subscriptions/abc/providers/Microsoft.Compute/skus/Basic/small/",
            false,
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::SegmentCount { .. }));
    }
}

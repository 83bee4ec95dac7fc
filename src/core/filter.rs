//! Filter stacks and their query-string encoding.
//!
//! A stack is encoded in the OpenCost filter language as equality clauses
//! joined by `+`, e.g. `namespace:"prod"+controllerName:"api"`. Entry order is
//! drill-down depth and is preserved. Properties may not contain `:`, `"` or
//! `+`; values may not contain `"` or `+`.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

const SEPARATOR: char = '+';
const QUOTE: char = '"';

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterEntry {
    pub property: String,
    pub value: String,
}

impl FilterEntry {
    pub fn new(property: &str, value: &str) -> Self {
        Self {
            property: property.to_string(),
            value: value.to_string(),
        }
    }
}

impl Display for FilterEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{QUOTE}{}{QUOTE}", self.property, self.value)
    }
}

pub fn encode(filters: &[FilterEntry]) -> String {
    filters
        .iter()
        .map(FilterEntry::to_string)
        .collect::<Vec<_>>()
        .join(&SEPARATOR.to_string())
}

/// Decodes an encoded stack. Empty or malformed input yields an empty stack.
pub fn decode(encoded: &str) -> Vec<FilterEntry> {
    parse(encoded.trim()).unwrap_or_default()
}

fn parse(input: &str) -> Option<Vec<FilterEntry>> {
    let mut filters = Vec::new();
    let mut rest = input;

    while !rest.is_empty() {
        let (property, after_colon) = rest.split_once(':')?;
        if property.is_empty() || property.contains([QUOTE, SEPARATOR]) {
            return None;
        }

        let quoted = after_colon.strip_prefix(QUOTE)?;
        let (value, after_value) = quoted.split_once(QUOTE)?;

        filters.push(FilterEntry::new(property, value));

        rest = match after_value.strip_prefix(SEPARATOR) {
            // A trailing separator with nothing after it is malformed.
            Some("") => return None,
            Some(next) => next,
            None if after_value.is_empty() => after_value,
            None => return None,
        };
    }

    Some(filters)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        let filters = vec![
            FilterEntry::new("namespace", "prod"),
            FilterEntry::new("controllerName", "api-gateway"),
        ];
        assert_eq!(
            encode(&filters),
            r#"namespace:"prod"+controllerName:"api-gateway""#
        );
        assert_eq!(encode(&[]), "");
    }

    #[test]
    fn test_round_trip_preserves_order() {
        let filters = vec![
            FilterEntry::new("namespace", "checkout"),
            FilterEntry::new("controllerKind", "deployment"),
            FilterEntry::new("controllerName", "cart:v2"),
            FilterEntry::new("pod", "cart-7b8f9c6d5-x2k4m"),
            FilterEntry::new("container", "with space"),
        ];
        assert_eq!(decode(&encode(&filters)), filters);
    }

    #[test]
    fn test_decode_empty_and_garbage() {
        assert!(decode("").is_empty());
        assert!(decode("   ").is_empty());
        assert!(decode("garbage").is_empty());
        assert!(decode("namespace:prod").is_empty());
        assert!(decode(r#"namespace:"prod"#).is_empty());
        assert!(decode(r#":"prod""#).is_empty());
        assert!(decode(r#"namespace:"prod"+"#).is_empty());
        assert!(decode(r#"namespace:"prod"pod:"x""#).is_empty());
        assert!(decode("%%%+++:::").is_empty());
    }

    #[test]
    fn test_decode_allows_empty_value() {
        assert_eq!(
            decode(r#"namespace:"""#),
            vec![FilterEntry::new("namespace", "")]
        );
    }
}

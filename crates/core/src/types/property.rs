//! Product property model.
//!
//! Products carry an open-ended map of named properties ("Size" -> "XL",
//! "Colors" -> ["Red", "Blue"]). A value on the wire is either a single
//! string or a list of strings, so the type is a tagged union rather than
//! a raw JSON value inspected at runtime.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A property value: a single scalar or a list of options.
///
/// Serialized untagged so the wire form stays a plain string or array,
/// matching what clients store in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// A single value, e.g. `"XL"`.
    Scalar(String),
    /// A list of values, e.g. `["Red", "Blue"]`.
    List(Vec<String>),
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => f.write_str(s),
            Self::List(items) => f.write_str(&items.join(",")),
        }
    }
}

/// A mapping from property name to value, ordered by name so derived
/// strings are stable.
pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// Format a buyer's selected properties as a human-readable line-item
/// description: `"key : value, key : value"`.
///
/// This exact shape flows into the payment gateway and onto persisted
/// orders, so both the checkout builder and the reconciler must derive
/// it through this one function.
#[must_use]
pub fn format_selected_properties(properties: &PropertyMap) -> String {
    properties
        .iter()
        .map(|(key, value)| format!("{key} : {value}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, PropertyValue)]) -> PropertyMap {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    #[test]
    fn test_format_empty() {
        assert_eq!(format_selected_properties(&PropertyMap::new()), "");
    }

    #[test]
    fn test_format_scalar_properties() {
        let props = map(&[
            ("Size", PropertyValue::Scalar("XL".into())),
            ("Color", PropertyValue::Scalar("Red".into())),
        ]);
        // BTreeMap orders by key
        assert_eq!(
            format_selected_properties(&props),
            "Color : Red, Size : XL"
        );
    }

    #[test]
    fn test_format_list_property() {
        let props = map(&[(
            "Colors",
            PropertyValue::List(vec!["Red".into(), "Blue".into()]),
        )]);
        assert_eq!(format_selected_properties(&props), "Colors : Red,Blue");
    }

    #[test]
    fn test_deserialize_untagged() {
        let json = r#"{"Size":"XL","Colors":["Red","Blue"]}"#;
        let props: PropertyMap = serde_json::from_str(json).unwrap();
        assert_eq!(
            props.get("Size"),
            Some(&PropertyValue::Scalar("XL".into()))
        );
        assert_eq!(
            props.get("Colors"),
            Some(&PropertyValue::List(vec!["Red".into(), "Blue".into()]))
        );
    }

    #[test]
    fn test_serialize_untagged() {
        let props = map(&[("Size", PropertyValue::Scalar("XL".into()))]);
        assert_eq!(serde_json::to_string(&props).unwrap(), r#"{"Size":"XL"}"#);
    }
}

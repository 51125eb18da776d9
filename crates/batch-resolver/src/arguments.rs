// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::BTreeMap;

use async_graphql_value::{ConstValue, Name, indexmap::IndexMap};

/// The resolved arguments of one field occurrence.
///
/// Argument order carries no meaning, so the values are kept sorted by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: BTreeMap<String, ConstValue>,
}

/// Canonical form of [Arguments] used to group calls.
///
/// Equal for any two argument maps with the same name/value pairs, regardless of the order
/// the maps (or nested input objects) were built in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArgumentsFingerprint(String);

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ConstValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&ConstValue> {
        self.values.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(ConstValue::String(value)) => Some(value),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConstValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn fingerprint(&self) -> ArgumentsFingerprint {
        let mut out = String::new();
        out.push('{');
        for (index, (name, value)) in self.values.iter().enumerate() {
            if index > 0 {
                out.push(',');
            }
            write_quoted(name, &mut out);
            out.push(':');
            write_canonical(value, &mut out);
        }
        out.push('}');
        ArgumentsFingerprint(out)
    }
}

impl<K: Into<String>, V: Into<ConstValue>> FromIterator<(K, V)> for Arguments {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

impl From<IndexMap<Name, ConstValue>> for Arguments {
    fn from(values: IndexMap<Name, ConstValue>) -> Self {
        values
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }
}

fn write_quoted(value: &str, out: &mut String) {
    out.push_str(&serde_json::Value::String(value.to_string()).to_string());
}

fn write_canonical(value: &ConstValue, out: &mut String) {
    match value {
        ConstValue::Null => out.push_str("null"),
        ConstValue::Boolean(value) => out.push_str(if *value { "true" } else { "false" }),
        ConstValue::Number(number) => out.push_str(&number.to_string()),
        ConstValue::String(value) => write_quoted(value, out),
        // Enums are prefixed so that `ASC` and `"ASC"` stay distinct
        ConstValue::Enum(name) => {
            out.push('#');
            out.push_str(name.as_str());
        }
        ConstValue::Binary(bytes) => {
            out.push_str("0x");
            for byte in bytes.iter() {
                out.push_str(&format!("{byte:02x}"));
            }
        }
        ConstValue::List(items) => {
            out.push('[');
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        ConstValue::Object(fields) => {
            let mut entries: Vec<_> = fields.iter().collect();
            entries.sort_by(|(left, _), (right, _)| left.as_str().cmp(right.as_str()));

            out.push('{');
            for (index, (name, value)) in entries.into_iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                write_quoted(name.as_str(), out);
                out.push(':');
                write_canonical(value, out);
            }
            out.push('}');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(entries: &[(&str, ConstValue)]) -> ConstValue {
        ConstValue::Object(
            entries
                .iter()
                .map(|(name, value)| (Name::new(name), value.clone()))
                .collect(),
        )
    }

    #[test]
    fn construction_order_is_irrelevant() {
        let first = Arguments::new()
            .with("suffix", "foo")
            .with("limit", ConstValue::Number(10.into()));
        let second = Arguments::new()
            .with("limit", ConstValue::Number(10.into()))
            .with("suffix", "foo");

        assert_eq!(first.fingerprint(), second.fingerprint());
    }

    #[test]
    fn nested_input_objects_are_canonical() {
        let first = Arguments::new().with(
            "filter",
            object(&[
                ("name", ConstValue::String("a".into())),
                ("age", ConstValue::Number(3.into())),
            ]),
        );
        let second = Arguments::new().with(
            "filter",
            object(&[
                ("age", ConstValue::Number(3.into())),
                ("name", ConstValue::String("a".into())),
            ]),
        );

        assert_eq!(first.fingerprint(), second.fingerprint());
    }

    #[test]
    fn different_values_differ() {
        let foo = Arguments::new().with("suffix", "foo");
        let bar = Arguments::new().with("suffix", "bar");
        let none = Arguments::new();

        assert_ne!(foo.fingerprint(), bar.fingerprint());
        assert_ne!(foo.fingerprint(), none.fingerprint());
    }

    #[test]
    fn enum_and_string_differ() {
        let as_enum = Arguments::new().with("order", ConstValue::Enum(Name::new("ASC")));
        let as_string = Arguments::new().with("order", "ASC");

        assert_ne!(as_enum.fingerprint(), as_string.fingerprint());
    }

    #[test]
    fn list_order_matters() {
        let first = Arguments::new().with(
            "ids",
            ConstValue::List(vec![ConstValue::Number(1.into()), ConstValue::Number(2.into())]),
        );
        let second = Arguments::new().with(
            "ids",
            ConstValue::List(vec![ConstValue::Number(2.into()), ConstValue::Number(1.into())]),
        );

        assert_ne!(first.fingerprint(), second.fingerprint());
    }

    #[test]
    fn converts_from_engine_arguments() {
        let mut raw = IndexMap::new();
        raw.insert(Name::new("suffix"), ConstValue::String("foo".into()));

        let arguments = Arguments::from(raw);

        assert_eq!(arguments.get_str("suffix"), Some("foo"));
        assert_eq!(arguments.len(), 1);
        assert!(arguments.get("other").is_none());
    }
}

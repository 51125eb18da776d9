// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::{BTreeSet, VecDeque};

use async_graphql_value::ConstValue;

use crate::arguments::Arguments;

/// A field requested by a query, as handed over by the execution engine.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedField {
    pub alias: Option<String>,
    /// The name of the field.
    pub name: String,
    /// The arguments to the field, empty if no arguments are provided.
    pub arguments: Arguments,
    /// The subfields being selected in this field, if it is an object. Empty if no fields are
    /// being selected.
    pub subfields: Vec<SelectedField>,
}

impl SelectedField {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            alias: None,
            name: name.into(),
            arguments: Arguments::default(),
            subfields: vec![],
        }
    }

    #[must_use]
    pub fn aliased(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    #[must_use]
    pub fn argument(mut self, name: impl Into<String>, value: impl Into<ConstValue>) -> Self {
        self.arguments = self.arguments.with(name, value);
        self
    }

    #[must_use]
    pub fn select(mut self, subfields: impl IntoIterator<Item = SelectedField>) -> Self {
        self.subfields.extend(subfields);
        self
    }

    pub fn output_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// The part of a field's sub-selection a resolver asked to see.
///
/// Holds every field path reachable within `depth` levels below the resolved field: root-level
/// names such as `value`, then slash-joined paths such as `self/value`. Aliases are ignored, so
/// selecting the same field twice under different aliases yields one path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    depth: usize,
    paths: BTreeSet<String>,
}

/// Canonical form of a [Selection] used to group calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectionFingerprint(BTreeSet<String>);

impl Selection {
    /// Collect the paths of `subfields` breadth-first, stopping at `depth`.
    ///
    /// Traversal is bounded by depth alone, so a field that selects its own type again
    /// (`self { self { ... } }`) stops at the same level as any other field.
    pub fn from_subfields(subfields: &[SelectedField], depth: usize) -> Self {
        let mut paths = BTreeSet::new();
        let mut queue: VecDeque<(String, &[SelectedField], usize)> = VecDeque::new();

        if depth > 0 {
            queue.push_back((String::new(), subfields, 1));
        }

        while let Some((prefix, fields, level)) = queue.pop_front() {
            for field in fields {
                let path = if prefix.is_empty() {
                    field.name.clone()
                } else {
                    format!("{prefix}/{}", field.name)
                };

                if level < depth && !field.subfields.is_empty() {
                    queue.push_back((path.clone(), field.subfields.as_slice(), level + 1));
                }
                paths.insert(path);
            }
        }

        Self { depth, paths }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    /// Total number of distinct paths in the selection.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    pub fn fingerprint(&self) -> SelectionFingerprint {
        SelectionFingerprint(self.paths.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str) -> SelectedField {
        SelectedField::new(name)
    }

    // name { value self { value content self { value self { value } } } }
    fn self_referential() -> Vec<SelectedField> {
        vec![
            field("value"),
            field("self").select([
                field("value"),
                field("content"),
                field("self").select([field("value"), field("self").select([field("value")])]),
            ]),
        ]
    }

    #[test]
    fn depth_one_keeps_root_names() {
        let selection = Selection::from_subfields(&self_referential(), 1);

        assert_eq!(selection.len(), 2);
        assert!(selection.contains("value"));
        assert!(selection.contains("self"));
        assert!(!selection.contains("self/value"));
    }

    #[test]
    fn depth_two_with_self_reference() {
        let selection = Selection::from_subfields(&self_referential(), 2);

        assert_eq!(selection.len(), 5);
        for path in ["value", "self", "self/value", "self/content", "self/self"] {
            assert!(selection.contains(path), "missing {path}");
        }
        assert!(!selection.contains("self/self/value"));
    }

    #[test]
    fn depth_three_and_beyond() {
        let depth_three = Selection::from_subfields(&self_referential(), 3);
        assert_eq!(depth_three.len(), 7);
        assert!(depth_three.contains("self/self/value"));
        assert!(depth_three.contains("self/self/self"));
        assert!(!depth_three.contains("self/self/self/value"));

        let depth_four = Selection::from_subfields(&self_referential(), 4);
        assert_eq!(depth_four.len(), 8);
        assert!(depth_four.contains("self/self/self/value"));

        // Nothing lies deeper, so larger depths see the same paths
        let depth_ten = Selection::from_subfields(&self_referential(), 10);
        assert_eq!(depth_four.fingerprint(), depth_ten.fingerprint());
    }

    #[test]
    fn differences_beyond_depth_are_invisible() {
        let first = vec![field("self").select([field("self").select([field("value")])])];
        let second = vec![field("self").select([field("self").select([field("content")])])];

        let at_two = |fields: &[SelectedField]| Selection::from_subfields(fields, 2).fingerprint();
        let at_three =
            |fields: &[SelectedField]| Selection::from_subfields(fields, 3).fingerprint();

        assert_eq!(at_two(&first[..]), at_two(&second[..]));
        assert_ne!(at_three(&first[..]), at_three(&second[..]));
    }

    #[test]
    fn same_name_at_different_levels_do_not_collide() {
        // { a { b } } vs { b { a } } share names but not paths
        let first = vec![field("a").select([field("b")])];
        let second = vec![field("b").select([field("a")])];

        assert_ne!(
            Selection::from_subfields(&first, 2).fingerprint(),
            Selection::from_subfields(&second, 2).fingerprint()
        );
    }

    #[test]
    fn aliases_and_order_are_ignored() {
        let first = vec![field("id"), field("value").aliased("v1"), field("value")];
        let second = vec![field("value"), field("id")];

        assert_eq!(
            Selection::from_subfields(&first, 1).fingerprint(),
            Selection::from_subfields(&second, 1).fingerprint()
        );
    }

    #[test]
    fn empty_selection() {
        let selection = Selection::from_subfields(&[], 2);
        assert!(selection.is_empty());
        assert_eq!(selection.depth(), 2);
    }
}

// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{fmt::Debug, hash::Hash};

use async_graphql_value::ConstValue;
use indexmap::IndexSet;

/// A source object a field is resolved against.
///
/// Sources are compared by value: two submissions with equal sources are the same logical
/// request, and batched results are looked up by source, never by position.
pub trait Source: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> Source for T where T: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

/// A source the execution driver can walk: it knows its GraphQL type and can resolve plain
/// properties of itself when no resolver is registered for a field.
pub trait SourceObject: Source {
    fn type_name(&self) -> &str;

    fn property(&self, _field_name: &str) -> Option<FieldValue<Self>> {
        None
    }
}

/// The distinct set of sources handed to a batched resolver, in submission order.
pub type Sources<S> = IndexSet<S>;

/// The value a resolver produces for one source.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<S> {
    Null,
    Scalar(ConstValue),
    /// A nested object whose own fields get resolved at the next level.
    Object(S),
    List(Vec<FieldValue<S>>),
}

impl<S> FieldValue<S> {
    pub fn scalar(value: impl Into<ConstValue>) -> Self {
        FieldValue::Scalar(value.into())
    }

    pub fn string(value: impl Into<String>) -> Self {
        FieldValue::Scalar(ConstValue::String(value.into()))
    }

    pub fn objects(sources: impl IntoIterator<Item = S>) -> Self {
        FieldValue::List(sources.into_iter().map(FieldValue::Object).collect())
    }

    pub fn optional(value: Option<FieldValue<S>>) -> Self {
        value.unwrap_or(FieldValue::Null)
    }
}

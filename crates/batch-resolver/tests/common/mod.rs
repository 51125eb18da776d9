// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

#![allow(dead_code)]

pub mod blog;

use std::sync::Arc;

use async_graphql_value::ConstValue;
use batch_resolver::{
    ExecutionResponse, Executor, FieldValue, ResolverRegistry, SelectedField, SourceObject,
    Sources, registry::BatchOutput,
};

pub fn field(name: &str) -> SelectedField {
    SelectedField::new(name)
}

/// The objects of a tiny schema:
///
/// ```graphql
/// type Query { myTypes: [MyType] }
/// type MyType { name: ... }           # resolved by the resolver under test
/// type MyName { id: Int, value: String, content: String, self: MyName }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    Query { foo_first: bool },
    MyType { name: String },
    MyName {
        id: Option<i64>,
        value: String,
        content: String,
    },
}

impl Node {
    pub fn my_type(name: &str) -> Self {
        Node::MyType {
            name: name.to_string(),
        }
    }

    pub fn my_name(id: Option<i64>, value: impl Into<String>) -> Self {
        let value = value.into();
        Node::MyName {
            id,
            content: value.clone(),
            value,
        }
    }
}

impl SourceObject for Node {
    fn type_name(&self) -> &str {
        match self {
            Node::Query { .. } => "Query",
            Node::MyType { .. } => "MyType",
            Node::MyName { .. } => "MyName",
        }
    }

    fn property(&self, field_name: &str) -> Option<FieldValue<Self>> {
        match (self, field_name) {
            (Node::Query { foo_first }, "myTypes") => {
                let names = if *foo_first {
                    ["foo", "bar"]
                } else {
                    ["bar", "foo"]
                };
                Some(FieldValue::objects(names.map(Node::my_type)))
            }
            (Node::MyName { id, .. }, "id") => {
                let id = id.map(|id| FieldValue::Scalar(ConstValue::Number(id.into())));
                Some(FieldValue::optional(id))
            }
            (Node::MyName { value, .. }, "value") => Some(FieldValue::string(value.clone())),
            (Node::MyName { content, .. }, "content") => Some(FieldValue::string(content.clone())),
            (Node::MyName { .. }, "self") => Some(FieldValue::Object(self.clone())),
            _ => None,
        }
    }
}

/// Apply `value` to the name of every `MyType` source.
pub fn by_name(
    sources: Sources<Node>,
    value: impl Fn(&str) -> FieldValue<Node>,
) -> BatchOutput<Node> {
    sources
        .into_iter()
        .filter_map(|source| match &source {
            Node::MyType { name } => {
                let result = value(name);
                Some((source, result))
            }
            _ => None,
        })
        .collect()
}

pub async fn execute(
    registry: &ResolverRegistry<Node, ()>,
    foo_first: bool,
    selection: Vec<SelectedField>,
) -> ExecutionResponse {
    Executor::new(registry)
        .execute(Node::Query { foo_first }, &selection, Arc::new(()))
        .await
        .unwrap()
}

/// Execute and expect no field errors.
pub async fn execute_data(
    registry: &ResolverRegistry<Node, ()>,
    foo_first: bool,
    selection: Vec<SelectedField>,
) -> serde_json::Value {
    let response = execute(registry, foo_first, selection).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    response.data
}

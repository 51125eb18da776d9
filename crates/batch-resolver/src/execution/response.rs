// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResponse {
    pub data: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

/// A field that could not be resolved. Its value in `data` is null.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub message: String,
    pub path: Vec<PathSegment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct NodeId(usize);

enum Node {
    /// Not resolved (yet). Rendered as null.
    Pending,
    Null,
    Scalar(Value),
    Object(Vec<(String, NodeId)>),
    List(Vec<NodeId>),
}

/// The response being assembled, as an arena of nodes.
///
/// Positions are reserved in traversal order before any value is known, so the rendered
/// output follows the query, not the order in which results arrive.
pub(super) struct ResponseTree {
    nodes: Vec<Node>,
}

impl ResponseTree {
    /// A tree with an empty root object.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::Object(vec![])],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Reserve an unresolved entry `key` in the object at `parent`.
    pub fn add_entry(&mut self, parent: NodeId, key: &str) -> NodeId {
        let child = self.alloc(Node::Pending);
        if let Node::Object(entries) = &mut self.nodes[parent.0] {
            entries.push((key.to_string(), child));
        }
        child
    }

    /// Turn `node` into an empty object whose entries get added next.
    pub fn set_object(&mut self, node: NodeId) {
        self.nodes[node.0] = Node::Object(vec![]);
    }

    /// Turn `node` into a list of `len` unresolved items.
    pub fn set_list(&mut self, node: NodeId, len: usize) -> Vec<NodeId> {
        let items: Vec<_> = (0..len).map(|_| self.alloc(Node::Pending)).collect();
        self.nodes[node.0] = Node::List(items.clone());
        items
    }

    pub fn set_null(&mut self, node: NodeId) {
        self.nodes[node.0] = Node::Null;
    }

    pub fn set_scalar(&mut self, node: NodeId, value: Value) {
        self.nodes[node.0] = Node::Scalar(value);
    }

    pub fn into_json(self) -> Value {
        self.render(self.root())
    }

    fn render(&self, node: NodeId) -> Value {
        match &self.nodes[node.0] {
            Node::Pending | Node::Null => Value::Null,
            Node::Scalar(value) => value.clone(),
            Node::Object(entries) => {
                let mut object = Map::new();
                for (key, child) in entries {
                    object.insert(key.clone(), self.render(*child));
                }
                Value::Object(object)
            }
            Node::List(items) => {
                Value::Array(items.iter().map(|item| self.render(*item)).collect())
            }
        }
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }
}

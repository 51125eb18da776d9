// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! A small execution driver that walks a selection over [SourceObject]s, resolving fields
//! through a [ResolverRegistry].
//!
//! Fields are resolved level by level. All field occurrences of a level are submitted before
//! the level's dispatch tick, so siblings across the whole level share batches.

mod response;

use std::sync::Arc;

use futures::{
    FutureExt,
    future::{BoxFuture, join_all, ready},
};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::{
    coordinator::ExecutionCoordinators,
    error::ExecutionError,
    invocation::invoke_simple,
    observer::{BatchObserver, NoopObserver},
    registry::{ResolverFunction, ResolverRegistry},
    selection::SelectedField,
    value::{FieldValue, SourceObject},
};

pub use response::{ExecutionResponse, FieldError, PathSegment};
use response::{NodeId, ResponseTree};

type FieldOutcome<S> = Result<Option<FieldValue<S>>, String>;

/// One field occurrence waiting to be resolved against `source`.
struct FieldTask<'q, S> {
    node: NodeId,
    source: S,
    field: &'q SelectedField,
    path: Vec<PathSegment>,
}

pub struct Executor<'r, S, C> {
    registry: &'r ResolverRegistry<S, C>,
    observer: Arc<dyn BatchObserver>,
}

impl<'r, S: SourceObject, C: Send + Sync + 'static> Executor<'r, S, C> {
    pub fn new(registry: &'r ResolverRegistry<S, C>) -> Self {
        Self {
            registry,
            observer: Arc::new(NoopObserver),
        }
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn BatchObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Resolve `selection` against `root`.
    ///
    /// A field whose resolver fails is null in the response and reported in `errors`; the rest
    /// of the response is unaffected.
    #[instrument(name = "Executor::execute", skip_all, fields(root = root.type_name()))]
    pub async fn execute(
        &self,
        root: S,
        selection: &[SelectedField],
        context: Arc<C>,
    ) -> Result<ExecutionResponse, ExecutionError> {
        let depth = selection_depth(selection);
        let limit = self.registry.config().query_depth_limit;
        if depth > limit {
            return Err(ExecutionError::DepthLimitExceeded { depth, limit });
        }

        let coordinators = self
            .registry
            .new_execution_with_observer(self.observer.clone());
        let mut tree = ResponseTree::new();
        let mut errors = vec![];

        let mut level = vec![];
        let root_node = tree.root();
        schedule_fields(&mut tree, root_node, &root, selection, &[], &mut level);

        let mut level_index = 0;
        while !level.is_empty() {
            level_index += 1;
            debug!(level = level_index, fields = level.len(), "Resolving level");

            let resolutions: Vec<_> = level
                .iter()
                .map(|task| self.resolve_field(task, &coordinators, &context))
                .collect();

            let (dispatched, outcomes) =
                futures::join!(coordinators.dispatch_all(), join_all(resolutions));
            dispatched?;

            let mut next = vec![];
            for (task, outcome) in level.into_iter().zip(outcomes) {
                match outcome {
                    Ok(value) => place_value(
                        &mut tree,
                        task.node,
                        FieldValue::optional(value),
                        task.field,
                        task.path,
                        &mut next,
                        &mut errors,
                    ),
                    Err(message) => {
                        tree.set_null(task.node);
                        errors.push(FieldError {
                            message,
                            path: task.path,
                        });
                    }
                }
            }
            level = next;
        }

        Ok(ExecutionResponse {
            data: tree.into_json(),
            errors,
        })
    }

    /// Start resolving one field. Batched fields are submitted right away, so that the
    /// returned future only completes after the level's dispatch.
    fn resolve_field(
        &self,
        task: &FieldTask<'_, S>,
        coordinators: &ExecutionCoordinators<S, C>,
        context: &Arc<C>,
    ) -> BoxFuture<'static, FieldOutcome<S>> {
        let field = task.field;
        let Some(definition) = self
            .registry
            .lookup(task.source.type_name(), &field.name)
        else {
            return ready(Ok(task.source.property(&field.name))).boxed();
        };

        match &definition.function {
            ResolverFunction::Batched(_) => {
                let Some(coordinator) = coordinators.get(definition.id) else {
                    let message = format!("No coordinator for '{}'", definition.qualified_name());
                    return ready(Err(message)).boxed();
                };
                coordinator
                    .submit(
                        task.source.clone(),
                        &field.arguments,
                        &field.subfields,
                        context,
                    )
                    .map(|result| result.map_err(|error| error.to_string()))
                    .boxed()
            }
            ResolverFunction::Simple(shape) => invoke_simple(
                definition,
                shape,
                task.source.clone(),
                &field.arguments,
                &field.subfields,
                context.clone(),
            )
            .map(|result| result.map(Some).map_err(|error| error.to_string()))
            .boxed(),
        }
    }
}

/// Reserve a response entry for each of `fields` under `parent` and queue it for resolution.
fn schedule_fields<'q, S: SourceObject>(
    tree: &mut ResponseTree,
    parent: NodeId,
    source: &S,
    fields: &'q [SelectedField],
    path: &[PathSegment],
    tasks: &mut Vec<FieldTask<'q, S>>,
) {
    for field in fields {
        let key = field.output_name();
        let node = tree.add_entry(parent, key);

        let mut field_path = path.to_vec();
        field_path.push(PathSegment::Field(key.to_string()));

        tasks.push(FieldTask {
            node,
            source: source.clone(),
            field,
            path: field_path,
        });
    }
}

fn place_value<'q, S: SourceObject>(
    tree: &mut ResponseTree,
    node: NodeId,
    value: FieldValue<S>,
    field: &'q SelectedField,
    path: Vec<PathSegment>,
    next: &mut Vec<FieldTask<'q, S>>,
    errors: &mut Vec<FieldError>,
) {
    match value {
        FieldValue::Null => tree.set_null(node),
        FieldValue::Scalar(value) => place_scalar(tree, node, value.into_json(), path, errors),
        FieldValue::Object(source) => {
            tree.set_object(node);
            schedule_fields(tree, node, &source, &field.subfields, &path, next);
        }
        FieldValue::List(items) => {
            let item_nodes = tree.set_list(node, items.len());
            for (index, (item, item_node)) in items.into_iter().zip(item_nodes).enumerate() {
                let mut item_path = path.clone();
                item_path.push(PathSegment::Index(index));
                place_value(tree, item_node, item, field, item_path, next, errors);
            }
        }
    }
}

/// A scalar that cannot be rendered as JSON is null in the response and reported in `errors`.
fn place_scalar(
    tree: &mut ResponseTree,
    node: NodeId,
    converted: serde_json::Result<Value>,
    path: Vec<PathSegment>,
    errors: &mut Vec<FieldError>,
) {
    match converted {
        Ok(value) => tree.set_scalar(node, value),
        Err(error) => {
            tree.set_null(node);
            errors.push(FieldError {
                message: format!("Could not serialize value: {error}"),
                path,
            });
        }
    }
}

/// Number of nested levels in `fields`; 0 for an empty selection.
fn selection_depth(fields: &[SelectedField]) -> usize {
    let mut depth = 0;
    let mut level: Vec<&SelectedField> = fields.iter().collect();
    while !level.is_empty() {
        depth += 1;
        level = level
            .into_iter()
            .flat_map(|field| field.subfields.iter())
            .collect();
    }
    depth
}

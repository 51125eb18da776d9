// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    arguments::Arguments,
    error::ResolverError,
    registry::{
        BatchOutput, BatchedShape, ResolverDefinition, ResolverFuture, ResolverShape, SimpleShape,
    },
    selection::{SelectedField, Selection},
    value::{FieldValue, Source, Sources},
};

/// Build the call for whichever shape the function has, passing only what it asked for.
fn call_shape<I, O, C>(
    shape: &ResolverShape<I, O, C>,
    input: I,
    arguments: Arguments,
    selection: Option<Selection>,
    context: Arc<C>,
) -> ResolverFuture<O> {
    match shape {
        ResolverShape::NoArgsNoSelection(function) => function(input, context),
        ResolverShape::ArgsOnly(function) => function(input, arguments, context),
        ResolverShape::SelectionOnly(function) => {
            function(input, selection.unwrap_or_default(), context)
        }
        ResolverShape::ArgsAndSelection(function) => {
            function(input, arguments, selection.unwrap_or_default(), context)
        }
    }
}

/// Call a batched function once for a group of sources.
///
/// The result only ever holds entries for `sources`: values for sources the function was not
/// given are dropped, and sources it omitted are simply absent (the caller sees no value).
pub(crate) async fn invoke_batched<S: Source, C>(
    definition: &ResolverDefinition<S, C>,
    shape: &BatchedShape<S, C>,
    sources: Sources<S>,
    arguments: Arguments,
    selection: Option<Selection>,
    context: Arc<C>,
) -> Result<BatchOutput<S>, ResolverError> {
    let requested = sources.clone();
    let results = call_shape(shape, sources, arguments, selection, context).await?;

    Ok(restrict_to_requested(definition, &requested, results))
}

fn restrict_to_requested<S: Source, C>(
    definition: &ResolverDefinition<S, C>,
    requested: &Sources<S>,
    mut results: BatchOutput<S>,
) -> BatchOutput<S> {
    let returned = results.len();
    results.retain(|source, _| requested.contains(source));

    if results.len() < returned {
        warn!(
            resolver = %definition.qualified_name(),
            unrequested = returned - results.len(),
            "Resolver returned values for sources it was not given; ignoring them"
        );
    }

    let missing = requested.len() - results.len();
    if missing > 0 {
        debug!(
            resolver = %definition.qualified_name(),
            missing,
            "Resolver omitted some sources; they resolve to no value"
        );
    }

    results
}

/// Call a per-source function for one field occurrence.
///
/// The selection is computed here at the resolver's declared depth, since simple resolvers
/// bypass the coordinator.
pub fn invoke_simple<S: Source, C>(
    definition: &ResolverDefinition<S, C>,
    shape: &SimpleShape<S, C>,
    source: S,
    arguments: &Arguments,
    subfields: &[SelectedField],
    context: Arc<C>,
) -> ResolverFuture<FieldValue<S>> {
    let selection = definition
        .wants_selection
        .then(|| Selection::from_subfields(subfields, definition.selection_depth));

    call_shape(shape, source, arguments.clone(), selection, context)
}

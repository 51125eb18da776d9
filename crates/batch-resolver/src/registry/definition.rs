// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{collections::HashMap, sync::Arc};

use futures::future::BoxFuture;

use crate::{
    arguments::Arguments,
    error::{ConfigurationError, ResolverError},
    selection::Selection,
    value::{FieldValue, Sources},
};

pub type ResolverFuture<T> = BoxFuture<'static, Result<T, ResolverError>>;

/// What a batched resolver returns: one value per source it was given.
pub type BatchOutput<S> = HashMap<S, FieldValue<S>>;

/// Deterministic identifier of a binding, assigned in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResolverId(pub(crate) usize);

/// One parameter a resolution function declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parameter {
    /// The distinct set of sources (batched resolvers only).
    Sources,
    /// The single source (simple resolvers only).
    Source,
    Arguments,
    Selection { depth: usize },
}

type Function1<I, O, C> = Arc<dyn Fn(I, Arc<C>) -> ResolverFuture<O> + Send + Sync>;
type Function2<I, A, O, C> = Arc<dyn Fn(I, A, Arc<C>) -> ResolverFuture<O> + Send + Sync>;
type Function3<I, O, C> =
    Arc<dyn Fn(I, Arguments, Selection, Arc<C>) -> ResolverFuture<O> + Send + Sync>;

/// The closed set of function shapes a resolver can take.
///
/// `I` is what the resolver receives as its source input ([Sources] when batched, a single
/// source otherwise) and `O` what it produces.
pub enum ResolverShape<I, O, C> {
    NoArgsNoSelection(Function1<I, O, C>),
    ArgsOnly(Function2<I, Arguments, O, C>),
    SelectionOnly(Function2<I, Selection, O, C>),
    ArgsAndSelection(Function3<I, O, C>),
}

impl<I, O, C> Clone for ResolverShape<I, O, C> {
    fn clone(&self) -> Self {
        match self {
            ResolverShape::NoArgsNoSelection(f) => ResolverShape::NoArgsNoSelection(f.clone()),
            ResolverShape::ArgsOnly(f) => ResolverShape::ArgsOnly(f.clone()),
            ResolverShape::SelectionOnly(f) => ResolverShape::SelectionOnly(f.clone()),
            ResolverShape::ArgsAndSelection(f) => ResolverShape::ArgsAndSelection(f.clone()),
        }
    }
}

impl<I, O, C> ResolverShape<I, O, C> {
    pub fn wants_arguments(&self) -> bool {
        matches!(
            self,
            ResolverShape::ArgsOnly(_) | ResolverShape::ArgsAndSelection(_)
        )
    }

    pub fn wants_selection(&self) -> bool {
        matches!(
            self,
            ResolverShape::SelectionOnly(_) | ResolverShape::ArgsAndSelection(_)
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            ResolverShape::NoArgsNoSelection(_) => "NoArgsNoSelection",
            ResolverShape::ArgsOnly(_) => "ArgsOnly",
            ResolverShape::SelectionOnly(_) => "SelectionOnly",
            ResolverShape::ArgsAndSelection(_) => "ArgsAndSelection",
        }
    }
}

pub type BatchedShape<S, C> = ResolverShape<Sources<S>, BatchOutput<S>, C>;
pub type SimpleShape<S, C> = ResolverShape<S, FieldValue<S>, C>;

pub enum ResolverFunction<S, C> {
    Batched(BatchedShape<S, C>),
    Simple(SimpleShape<S, C>),
}

impl<S, C> Clone for ResolverFunction<S, C> {
    fn clone(&self) -> Self {
        match self {
            ResolverFunction::Batched(shape) => ResolverFunction::Batched(shape.clone()),
            ResolverFunction::Simple(shape) => ResolverFunction::Simple(shape.clone()),
        }
    }
}

impl<S, C> ResolverFunction<S, C> {
    fn is_batched(&self) -> bool {
        matches!(self, ResolverFunction::Batched(_))
    }

    fn shape_flags(&self) -> (bool, bool, &'static str) {
        match self {
            ResolverFunction::Batched(shape) => {
                (shape.wants_arguments(), shape.wants_selection(), shape.name())
            }
            ResolverFunction::Simple(shape) => {
                (shape.wants_arguments(), shape.wants_selection(), shape.name())
            }
        }
    }
}

/// A registration as written by a resolver author, before validation.
pub struct ResolverDeclaration<S, C> {
    pub type_name: String,
    pub field_name: String,
    pub parameters: Vec<Parameter>,
    pub function: ResolverFunction<S, C>,
}

/// A validated, immutable binding of (type, field) to a resolution function.
pub struct ResolverDefinition<S, C> {
    pub id: ResolverId,
    pub type_name: String,
    pub field_name: String,
    pub is_batched: bool,
    pub wants_arguments: bool,
    pub wants_selection: bool,
    pub selection_depth: usize,
    pub parameters: Vec<Parameter>,
    pub function: ResolverFunction<S, C>,
}

impl<S, C> ResolverDefinition<S, C> {
    /// `Type.field`, as used in logs and errors.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.type_name, self.field_name)
    }
}

struct Signature {
    wants_arguments: bool,
    selection_depth: Option<usize>,
}

/// Accepts `[source, Arguments?, Selection?]` in that order, where the source parameter is
/// `Sources` for batched resolvers and `Source` otherwise.
fn parse_signature(parameters: &[Parameter], batched: bool) -> Result<Signature, String> {
    let (expected_source, other_source) = if batched {
        (Parameter::Sources, Parameter::Source)
    } else {
        (Parameter::Source, Parameter::Sources)
    };

    let mut rest = match parameters.split_first() {
        Some((first, rest)) if *first == expected_source => rest,
        Some((first, _)) if *first == other_source => {
            return Err(if batched {
                "a batched resolver takes the set of sources, not a single source".to_string()
            } else {
                "only batched resolvers take a set of sources".to_string()
            });
        }
        _ => return Err(format!("the first parameter must be {expected_source:?}")),
    };

    let mut signature = Signature {
        wants_arguments: false,
        selection_depth: None,
    };

    if let Some((Parameter::Arguments, tail)) = rest.split_first() {
        signature.wants_arguments = true;
        rest = tail;
    }

    if let Some((Parameter::Selection { depth }, tail)) = rest.split_first() {
        if *depth == 0 {
            return Err("selection depth must be at least 1".to_string());
        }
        signature.selection_depth = Some(*depth);
        rest = tail;
    }

    match rest.first() {
        None => Ok(signature),
        Some(parameter) => Err(format!(
            "unexpected {parameter:?}; parameters must be the source, then Arguments, then Selection, each at most once"
        )),
    }
}

impl<S, C> ResolverDeclaration<S, C> {
    pub(crate) fn validate(
        self,
        id: ResolverId,
    ) -> Result<ResolverDefinition<S, C>, ConfigurationError> {
        let ResolverDeclaration {
            type_name,
            field_name,
            parameters,
            function,
        } = self;

        if type_name.is_empty() || field_name.is_empty() {
            return Err(ConfigurationError::EmptyName {
                type_name,
                field_name,
            });
        }

        let is_batched = function.is_batched();
        let signature = match parse_signature(&parameters, is_batched) {
            Ok(signature) => signature,
            Err(reason) => {
                return Err(ConfigurationError::UnsupportedSignature {
                    type_name,
                    field_name,
                    parameters,
                    reason,
                });
            }
        };

        let (wants_arguments, wants_selection, shape) = function.shape_flags();
        if wants_arguments != signature.wants_arguments
            || wants_selection != signature.selection_depth.is_some()
        {
            return Err(ConfigurationError::SignatureMismatch {
                type_name,
                field_name,
                parameters,
                shape,
            });
        }

        Ok(ResolverDefinition {
            id,
            type_name,
            field_name,
            is_batched,
            wants_arguments,
            wants_selection,
            selection_depth: signature.selection_depth.unwrap_or(0),
            parameters,
            function,
        })
    }
}

// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use thiserror::Error;

use crate::registry::Parameter;

/// Problems with resolver registrations, reported when the registry is built.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Resolver for '{type_name}.{field_name}' is registered more than once")]
    DuplicateResolver {
        type_name: String,
        field_name: String,
    },

    #[error("Resolver must name a type and a field (got '{type_name}.{field_name}')")]
    EmptyName {
        type_name: String,
        field_name: String,
    },

    #[error(
        "Resolver for '{type_name}.{field_name}' has unsupported parameters {parameters:?}: {reason}"
    )]
    UnsupportedSignature {
        type_name: String,
        field_name: String,
        parameters: Vec<Parameter>,
        reason: String,
    },

    #[error(
        "Resolver for '{type_name}.{field_name}' declares {parameters:?}, but its function is {shape}"
    )]
    SignatureMismatch {
        type_name: String,
        field_name: String,
        parameters: Vec<Parameter>,
        shape: &'static str,
    },
}

/// Failure reported by a user-supplied resolution function.
#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ResolverError {
    pub fn new(message: impl Into<String>) -> Self {
        ResolverError::Message(message.into())
    }
}

/// The error a pending field result settles with.
#[derive(Error, Debug, Clone)]
pub enum BatchError {
    #[error("Resolver '{resolver}' failed: {error}")]
    ResolverFailed {
        resolver: String,
        error: Arc<ResolverError>,
    },

    #[error("Pending calls for '{resolver}' carry different execution contexts")]
    ContextDivergence { resolver: String },

    #[error("Pending call for '{resolver}' was dropped before it was resolved")]
    Abandoned { resolver: String },
}

/// Failure of a dispatch tick as a whole.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Pending calls for '{resolver}' carry different execution contexts")]
    ContextDivergence { resolver: String },
}

/// Failure of a whole query execution in [crate::execution::Executor].
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Selection depth {depth} exceeds the limit of {limit}")]
    DepthLimitExceeded { depth: usize, limit: usize },

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

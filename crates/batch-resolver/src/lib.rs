// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Batched field resolution.
//!
//! Resolver authors declare field resolvers in a [ResolverRegistry]. For every query
//! execution, [ResolverRegistry::new_execution] creates one [BatchCoordinator] per batched
//! field. The execution engine submits each field occurrence to its coordinator and, once a
//! traversal level is fully submitted, runs the dispatch tick
//! ([ExecutionCoordinators::dispatch_all]). Each coordinator then calls its resolver once per
//! distinct (arguments, selection) combination and hands every caller its own result.

pub mod arguments;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod execution;
pub mod invocation;
pub mod observer;
pub mod registry;
pub mod selection;
pub mod value;

pub use arguments::Arguments;
pub use config::BatchingConfig;
pub use coordinator::{BatchCoordinator, ExecutionCoordinators, PendingField};
pub use error::{BatchError, ConfigurationError, DispatchError, ExecutionError, ResolverError};
pub use execution::{ExecutionResponse, Executor};
pub use registry::{ResolverId, ResolverRegistry};
pub use selection::{SelectedField, Selection};
pub use value::{FieldValue, Source, SourceObject, Sources};

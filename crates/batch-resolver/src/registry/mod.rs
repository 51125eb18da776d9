// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The static catalogue of field resolvers.
//!
//! A [ResolverRegistry] is built once at startup and never mutated afterwards. Every binding
//! gets a [ResolverId] from its registration position, which is what per-execution state (see
//! [ExecutionCoordinators]) is keyed by.

mod builder;
mod definition;

use std::{collections::HashMap, sync::Arc};

use indexmap::IndexMap;

use crate::{
    config::BatchingConfig,
    coordinator::ExecutionCoordinators,
    observer::{BatchObserver, NoopObserver},
    value::Source,
};

pub use builder::{FieldRegistration, ResolverRegistryBuilder};
pub use definition::{
    BatchOutput, BatchedShape, Parameter, ResolverDeclaration, ResolverDefinition,
    ResolverFunction, ResolverFuture, ResolverId, ResolverShape, SimpleShape,
};

pub struct ResolverRegistry<S, C> {
    config: BatchingConfig,
    definitions: Vec<Arc<ResolverDefinition<S, C>>>,
    index: HashMap<String, HashMap<String, ResolverId>>,
}

/// One row of the table handed to the execution engine at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldWiring {
    pub field_name: String,
    pub id: ResolverId,
    pub batched: bool,
}

impl<S: Source, C: Send + Sync + 'static> ResolverRegistry<S, C> {
    pub fn builder(config: BatchingConfig) -> ResolverRegistryBuilder<S, C> {
        ResolverRegistryBuilder::new(config)
    }

    pub fn config(&self) -> &BatchingConfig {
        &self.config
    }

    pub fn lookup(
        &self,
        type_name: &str,
        field_name: &str,
    ) -> Option<&Arc<ResolverDefinition<S, C>>> {
        let id = self.index.get(type_name)?.get(field_name)?;
        self.get(*id)
    }

    pub fn get(&self, id: ResolverId) -> Option<&Arc<ResolverDefinition<S, C>>> {
        self.definitions.get(id.0)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &Arc<ResolverDefinition<S, C>>> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Bindings grouped by type name, types and fields in registration order.
    pub fn wirings(&self) -> IndexMap<String, Vec<FieldWiring>> {
        let mut wirings: IndexMap<String, Vec<FieldWiring>> = IndexMap::new();
        for definition in &self.definitions {
            wirings
                .entry(definition.type_name.clone())
                .or_default()
                .push(FieldWiring {
                    field_name: definition.field_name.clone(),
                    id: definition.id,
                    batched: definition.is_batched,
                });
        }
        wirings
    }

    /// A fresh set of coordinators for one query execution.
    pub fn new_execution(&self) -> ExecutionCoordinators<S, C> {
        self.new_execution_with_observer(Arc::new(NoopObserver))
    }

    pub fn new_execution_with_observer(
        &self,
        observer: Arc<dyn BatchObserver>,
    ) -> ExecutionCoordinators<S, C> {
        ExecutionCoordinators::new(self, observer)
    }
}

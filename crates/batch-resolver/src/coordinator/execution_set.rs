// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use futures::future::join_all;
use indexmap::IndexMap;

use crate::{
    error::DispatchError,
    observer::BatchObserver,
    registry::{ResolverFunction, ResolverId, ResolverRegistry},
    value::Source,
};

use super::{BatchCoordinator, DispatchSummary};

/// The coordinators of one query execution, one per batched binding.
///
/// Created through [ResolverRegistry::new_execution] and dropped with the execution; batching
/// state never crosses executions.
pub struct ExecutionCoordinators<S: Source, C> {
    coordinators: IndexMap<ResolverId, BatchCoordinator<S, C>>,
}

impl<S: Source, C: Send + Sync + 'static> ExecutionCoordinators<S, C> {
    pub(crate) fn new(
        registry: &ResolverRegistry<S, C>,
        observer: Arc<dyn BatchObserver>,
    ) -> Self {
        let max_concurrent_groups = registry.config().max_concurrent_groups;

        let coordinators = registry
            .definitions()
            .filter_map(|definition| match &definition.function {
                ResolverFunction::Batched(shape) => Some((
                    definition.id,
                    BatchCoordinator::new(
                        definition.clone(),
                        shape.clone(),
                        max_concurrent_groups,
                        observer.clone(),
                    ),
                )),
                ResolverFunction::Simple(_) => None,
            })
            .collect();

        Self { coordinators }
    }

    /// The coordinator for a batched binding. `None` for simple or unknown bindings.
    pub fn get(&self, id: ResolverId) -> Option<&BatchCoordinator<S, C>> {
        self.coordinators.get(&id)
    }

    pub fn has_pending(&self) -> bool {
        self.coordinators
            .values()
            .any(|coordinator| coordinator.pending_len() > 0)
    }

    /// The dispatch tick: dispatch every coordinator with pending calls, concurrently.
    ///
    /// Every such coordinator runs its tick even if another one fails; the first failure is
    /// returned.
    pub async fn dispatch_all(&self) -> Result<Vec<DispatchSummary>, DispatchError> {
        let dispatches = self
            .coordinators
            .values()
            .filter(|coordinator| coordinator.pending_len() > 0)
            .map(|coordinator| coordinator.dispatch());

        join_all(dispatches).await.into_iter().collect()
    }
}

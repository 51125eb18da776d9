// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Per-execution batching of one batched field.
//!
//! A [BatchCoordinator] cycles through three phases. While *collecting*, every
//! [BatchCoordinator::submit] records a call and hands back a shared handle to its eventual
//! result; identical calls share one handle. [BatchCoordinator::dispatch] moves it to
//! *dispatching*: pending calls are partitioned by their argument and selection fingerprints,
//! each partition is handed to the resolver in one call, and the groups run concurrently. Once
//! every handle of every running tick is settled the coordinator is *completed* and the next
//! submission starts a new tick.

mod directory;
mod execution_set;

use std::{
    mem,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use futures::{
    FutureExt, StreamExt,
    channel::oneshot,
    future::{BoxFuture, Shared},
    stream,
};
use indexmap::IndexMap;
use tracing::{debug, error, instrument, warn};

use crate::{
    arguments::{Arguments, ArgumentsFingerprint},
    error::{BatchError, DispatchError},
    invocation::invoke_batched,
    observer::BatchObserver,
    registry::{BatchedShape, ResolverDefinition, ResolverId},
    selection::{SelectedField, Selection, SelectionFingerprint},
    value::{FieldValue, Source, Sources},
};

use directory::PromiseDirectory;

pub use execution_set::ExecutionCoordinators;

/// What a pending field settles with. `Ok(None)` means the resolver produced no value for the
/// source.
pub type FieldResult<S> = Result<Option<FieldValue<S>>, BatchError>;

/// A handle to a submitted call. Cloning it is cheap; all clones see the same result.
pub type PendingField<S> = Shared<BoxFuture<'static, FieldResult<S>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorPhase {
    Collecting,
    Dispatching,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSummary {
    pub resolver: ResolverId,
    /// Distinct calls taken by this tick.
    pub keys: usize,
    pub groups: usize,
    pub failed_groups: usize,
}

impl DispatchSummary {
    fn empty(resolver: ResolverId) -> Self {
        Self {
            resolver,
            keys: 0,
            groups: 0,
            failed_groups: 0,
        }
    }
}

/// Identity of an execution context, taken from the address of its shared allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ContextId(usize);

impl ContextId {
    fn of<C>(context: &Arc<C>) -> Self {
        ContextId(Arc::as_ptr(context) as *const () as usize)
    }
}

/// The address a result is delivered to. The fingerprints are present only for the
/// dimensions the resolver declared interest in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct CallKey<S> {
    source: S,
    arguments: Option<ArgumentsFingerprint>,
    selection: Option<SelectionFingerprint>,
    context: ContextId,
}

type GroupKey = (Option<ArgumentsFingerprint>, Option<SelectionFingerprint>);

struct PendingCall<S, C> {
    arguments: Arguments,
    selection: Option<Selection>,
    context: Arc<C>,
    sender: oneshot::Sender<FieldResult<S>>,
    handle: PendingField<S>,
}

/// Calls that share argument and selection fingerprints within one tick.
struct BatchGroup<S: Source> {
    arguments: Arguments,
    selection: Option<Selection>,
    sources: Sources<S>,
    keys: Vec<CallKey<S>>,
}

struct CoordinatorState<S, C> {
    phase: CoordinatorPhase,
    pending: IndexMap<CallKey<S>, PendingCall<S, C>>,
    ticks: usize,
    /// Ticks taken but not yet finished. The coordinator is completed only when this is 0.
    in_flight: usize,
}

impl<S, C> CoordinatorState<S, C> {
    fn settled_phase(&self) -> CoordinatorPhase {
        if self.in_flight > 0 {
            CoordinatorPhase::Dispatching
        } else if !self.pending.is_empty() {
            CoordinatorPhase::Collecting
        } else {
            CoordinatorPhase::Completed
        }
    }
}

/// Marks the end of one tick when dropped, including when the dispatch future is dropped
/// before it finishes.
struct TickGuard<'a, S: Source, C: Send + Sync + 'static> {
    coordinator: &'a BatchCoordinator<S, C>,
}

impl<S: Source, C: Send + Sync + 'static> Drop for TickGuard<'_, S, C> {
    fn drop(&mut self) {
        let mut state = self.coordinator.lock_state();
        state.in_flight -= 1;
        state.phase = state.settled_phase();
    }
}

pub struct BatchCoordinator<S: Source, C> {
    definition: Arc<ResolverDefinition<S, C>>,
    shape: BatchedShape<S, C>,
    max_concurrent_groups: Option<usize>,
    observer: Arc<dyn BatchObserver>,
    state: Mutex<CoordinatorState<S, C>>,
}

impl<S: Source, C: Send + Sync + 'static> BatchCoordinator<S, C> {
    pub(crate) fn new(
        definition: Arc<ResolverDefinition<S, C>>,
        shape: BatchedShape<S, C>,
        max_concurrent_groups: Option<usize>,
        observer: Arc<dyn BatchObserver>,
    ) -> Self {
        Self {
            definition,
            shape,
            max_concurrent_groups,
            observer,
            state: Mutex::new(CoordinatorState {
                phase: CoordinatorPhase::Collecting,
                pending: IndexMap::new(),
                ticks: 0,
                in_flight: 0,
            }),
        }
    }

    pub fn definition(&self) -> &ResolverDefinition<S, C> {
        &self.definition
    }

    pub fn phase(&self) -> CoordinatorPhase {
        self.lock_state().phase
    }

    /// Number of distinct calls waiting for the next dispatch.
    pub fn pending_len(&self) -> usize {
        self.lock_state().pending.len()
    }

    /// Number of dispatch ticks that took at least one call.
    pub fn ticks(&self) -> usize {
        self.lock_state().ticks
    }

    /// Record a call for `source` and return a handle to its result.
    ///
    /// `subfields` is the sub-selection of the field occurrence; it only matters if the
    /// resolver wants a selection.
    pub fn submit(
        &self,
        source: S,
        arguments: &Arguments,
        subfields: &[SelectedField],
        context: &Arc<C>,
    ) -> PendingField<S> {
        let definition = &self.definition;
        let selection = definition
            .wants_selection
            .then(|| Selection::from_subfields(subfields, definition.selection_depth));

        let key = CallKey {
            source,
            arguments: definition.wants_arguments.then(|| arguments.fingerprint()),
            selection: selection.as_ref().map(Selection::fingerprint),
            context: ContextId::of(context),
        };

        let mut state = self.lock_state();
        if state.phase == CoordinatorPhase::Completed {
            state.phase = CoordinatorPhase::Collecting;
        }

        if let Some(existing) = state.pending.get(&key) {
            let handle = existing.handle.clone();
            drop(state);
            self.observer.on_submit(definition.id, true);
            return handle;
        }

        let (sender, receiver) = oneshot::channel();
        let resolver = definition.qualified_name();
        let handle = receiver
            .map(move |received| {
                received.unwrap_or_else(|_| Err(BatchError::Abandoned { resolver }))
            })
            .boxed()
            .shared();

        state.pending.insert(
            key,
            PendingCall {
                arguments: arguments.clone(),
                selection,
                context: context.clone(),
                sender,
                handle: handle.clone(),
            },
        );
        drop(state);

        self.observer.on_submit(definition.id, false);
        handle
    }

    /// Run one tick: group everything submitted so far, invoke the resolver once per group and
    /// settle every handle of the tick.
    ///
    /// Fails without invoking anything if the pending calls carry more than one execution
    /// context; every handle of the tick is then rejected.
    #[instrument(
        name = "BatchCoordinator::dispatch",
        skip_all,
        fields(resolver = %self.definition.qualified_name())
    )]
    pub async fn dispatch(&self) -> Result<DispatchSummary, DispatchError> {
        let pending = {
            let mut state = self.lock_state();
            if state.pending.is_empty() {
                // Nothing to take; leaves phase and tick count alone
                return Ok(DispatchSummary::empty(self.definition.id));
            }
            state.phase = CoordinatorPhase::Dispatching;
            state.ticks += 1;
            state.in_flight += 1;
            mem::take(&mut state.pending)
        };

        let _tick = TickGuard { coordinator: self };
        self.run_tick(pending).await
    }

    async fn run_tick(
        &self,
        pending: IndexMap<CallKey<S>, PendingCall<S, C>>,
    ) -> Result<DispatchSummary, DispatchError> {
        let id = self.definition.id;
        let resolver = self.definition.qualified_name();
        let keys = pending.len();

        let Some(context) = pending.values().next().map(|call| call.context.clone()) else {
            return Ok(DispatchSummary::empty(id));
        };

        let context_id = ContextId::of(&context);
        if pending.keys().any(|key| key.context != context_id) {
            error!(
                keys,
                "Pending calls carry different execution contexts; rejecting the whole tick"
            );
            for (_, call) in pending {
                let _ = call.sender.send(Err(BatchError::ContextDivergence {
                    resolver: resolver.clone(),
                }));
            }
            return Err(DispatchError::ContextDivergence { resolver });
        }

        let directory = PromiseDirectory::new();
        let mut groups: IndexMap<GroupKey, BatchGroup<S>> = IndexMap::new();

        for (key, call) in pending {
            let PendingCall {
                arguments,
                selection,
                sender,
                ..
            } = call;

            let group = groups
                .entry((key.arguments.clone(), key.selection.clone()))
                .or_insert_with(|| BatchGroup {
                    arguments,
                    selection,
                    sources: Sources::new(),
                    keys: vec![],
                });
            group.sources.insert(key.source.clone());
            group.keys.push(key.clone());
            directory.insert(key, sender);
        }

        let group_count = groups.len();
        self.observer.on_dispatch(id, keys, group_count);
        debug!(keys, groups = group_count, "Dispatching batch");

        let limit = self.max_concurrent_groups.unwrap_or(group_count).max(1);
        let outcomes: Vec<bool> = stream::iter(groups.into_values())
            .map(|group| self.run_group(group, context.clone(), &directory))
            .buffer_unordered(limit)
            .collect()
            .await;
        let failed_groups = outcomes.into_iter().filter(|succeeded| !succeeded).count();

        let abandoned = directory.reject_remaining(BatchError::Abandoned {
            resolver: resolver.clone(),
        });
        if abandoned > 0 {
            warn!(abandoned, "Some calls were left unsettled by their group");
        }

        Ok(DispatchSummary {
            resolver: id,
            keys,
            groups: group_count,
            failed_groups,
        })
    }

    /// Invoke the resolver for one group and settle the group's handles. Returns whether the
    /// call succeeded.
    async fn run_group(
        &self,
        group: BatchGroup<S>,
        context: Arc<C>,
        directory: &PromiseDirectory<S>,
    ) -> bool {
        let BatchGroup {
            arguments,
            selection,
            sources,
            keys,
        } = group;

        self.observer.on_invoke(self.definition.id, sources.len());
        debug!(sources = sources.len(), "Invoking batched resolver");

        let result = invoke_batched(
            &self.definition,
            &self.shape,
            sources,
            arguments,
            selection,
            context,
        )
        .await;

        match result {
            Ok(mut values) => {
                for key in &keys {
                    directory.settle(key, Ok(values.remove(&key.source)));
                }
                true
            }
            Err(resolver_error) => {
                error!(
                    error = %resolver_error,
                    sources = keys.len(),
                    "Batched resolver failed; rejecting its group"
                );
                self.observer.on_group_failure(self.definition.id);

                let resolver_error = Arc::new(resolver_error);
                let resolver = self.definition.qualified_name();
                for key in &keys {
                    directory.reject(
                        key,
                        BatchError::ResolverFailed {
                            resolver: resolver.clone(),
                            error: resolver_error.clone(),
                        },
                    );
                }
                false
            }
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, CoordinatorState<S, C>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

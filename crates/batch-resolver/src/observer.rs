// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{
    collections::HashMap,
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
};

use crate::registry::ResolverId;

/// Hooks into the life of a batch, injected per execution.
///
/// All methods default to doing nothing.
pub trait BatchObserver: Send + Sync {
    /// A call was submitted. `deduplicated` is set when it joined an already pending call.
    fn on_submit(&self, _resolver: ResolverId, _deduplicated: bool) {}

    fn on_dispatch(&self, _resolver: ResolverId, _keys: usize, _groups: usize) {}

    /// The underlying function is about to be called with `sources` distinct sources.
    fn on_invoke(&self, _resolver: ResolverId, _sources: usize) {}

    fn on_group_failure(&self, _resolver: ResolverId) {}
}

pub struct NoopObserver;

impl BatchObserver for NoopObserver {}

/// Counts every event it sees.
#[derive(Default)]
pub struct CountingObserver {
    submissions: AtomicUsize,
    deduplicated: AtomicUsize,
    dispatches: AtomicUsize,
    invocations: AtomicUsize,
    failed_groups: AtomicUsize,
    invocations_by_resolver: Mutex<HashMap<ResolverId, usize>>,
}

impl CountingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submissions(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }

    pub fn deduplicated(&self) -> usize {
        self.deduplicated.load(Ordering::SeqCst)
    }

    pub fn dispatches(&self) -> usize {
        self.dispatches.load(Ordering::SeqCst)
    }

    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    pub fn failed_groups(&self) -> usize {
        self.failed_groups.load(Ordering::SeqCst)
    }

    pub fn invocations_of(&self, resolver: ResolverId) -> usize {
        self.invocations_by_resolver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&resolver)
            .copied()
            .unwrap_or(0)
    }
}

impl BatchObserver for CountingObserver {
    fn on_submit(&self, _resolver: ResolverId, deduplicated: bool) {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        if deduplicated {
            self.deduplicated.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn on_dispatch(&self, _resolver: ResolverId, _keys: usize, _groups: usize) {
        self.dispatches.fetch_add(1, Ordering::SeqCst);
    }

    fn on_invoke(&self, resolver: ResolverId, _sources: usize) {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        *self
            .invocations_by_resolver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(resolver)
            .or_insert(0) += 1;
    }

    fn on_group_failure(&self, _resolver: ResolverId) {
        self.failed_groups.fetch_add(1, Ordering::SeqCst);
    }
}

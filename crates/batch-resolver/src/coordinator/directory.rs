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
    sync::{Mutex, PoisonError},
};

use futures::channel::oneshot;

use crate::{error::BatchError, value::Source};

use super::{CallKey, FieldResult};

/// The senders of one dispatch tick, addressed by call key.
///
/// Concurrent groups settle disjoint keys, so a single lock over the whole map is enough.
pub(super) struct PromiseDirectory<S: Source> {
    senders: Mutex<HashMap<CallKey<S>, oneshot::Sender<FieldResult<S>>>>,
}

impl<S: Source> PromiseDirectory<S> {
    pub fn new() -> Self {
        Self {
            senders: Mutex::new(HashMap::new()),
        }
    }

    pub fn insert(&self, key: CallKey<S>, sender: oneshot::Sender<FieldResult<S>>) {
        self.senders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, sender);
    }

    /// Settle the promise at `key`. Returns false if it was already settled.
    pub fn settle(&self, key: &CallKey<S>, result: FieldResult<S>) -> bool {
        let sender = self
            .senders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);

        match sender {
            // A dropped receiver means nobody is waiting anymore, which is fine
            Some(sender) => {
                let _ = sender.send(result);
                true
            }
            None => false,
        }
    }

    pub fn reject(&self, key: &CallKey<S>, error: BatchError) -> bool {
        self.settle(key, Err(error))
    }

    /// Reject every promise still unsettled. Returns how many there were.
    pub fn reject_remaining(&self, error: BatchError) -> usize {
        let remaining: Vec<_> = self
            .senders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .collect();

        let count = remaining.len();
        for (_, sender) in remaining {
            let _ = sender.send(Err(error.clone()));
        }
        count
    }
}

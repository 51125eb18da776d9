// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use common::env::{EnvError, Environment};
use common::env_const::{
    FIELDBATCH_DEFAULT_SELECTION_DEPTH, FIELDBATCH_MAX_CONCURRENT_GROUPS,
    FIELDBATCH_QUERY_DEPTH_LIMIT,
};

const DEFAULT_SELECTION_DEPTH: usize = 1;
const DEFAULT_QUERY_DEPTH_LIMIT: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchingConfig {
    /// How many groups of one dispatch tick may run at once. `None` runs every group of the
    /// tick concurrently.
    pub max_concurrent_groups: Option<usize>,
    /// Depth used for resolvers that want a selection but do not declare a depth.
    pub default_selection_depth: usize,
    /// Deepest query the execution driver will walk.
    pub query_depth_limit: usize,
}

impl Default for BatchingConfig {
    fn default() -> Self {
        Self {
            max_concurrent_groups: None,
            default_selection_depth: DEFAULT_SELECTION_DEPTH,
            query_depth_limit: DEFAULT_QUERY_DEPTH_LIMIT,
        }
    }
}

impl BatchingConfig {
    pub fn from_env(env: &dyn Environment) -> Result<Self, EnvError> {
        Ok(Self {
            max_concurrent_groups: env.get_positive_usize(FIELDBATCH_MAX_CONCURRENT_GROUPS)?,
            default_selection_depth: env
                .get_positive_usize(FIELDBATCH_DEFAULT_SELECTION_DEPTH)?
                .unwrap_or(DEFAULT_SELECTION_DEPTH),
            query_depth_limit: env
                .get_positive_usize(FIELDBATCH_QUERY_DEPTH_LIMIT)?
                .unwrap_or(DEFAULT_QUERY_DEPTH_LIMIT),
        })
    }
}

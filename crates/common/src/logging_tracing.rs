// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! # Tracing configuration setup.
//!
//! The batching engine is instrumented with Rust's `tracing` framework.
//!
//! Calling the `init` function will initialize a global tracing subscriber based on the value of
//! the `FIELDBATCH_LOG` environment variable, which follows the same conventions as `RUST_LOG`.
//! Without it, only warnings and errors are printed.
//!
//! For example, to see every dispatch tick and group invocation:
//!
//! ```shell
//! $ FIELDBATCH_LOG=batch_resolver=debug cargo test
//! ```

use thiserror::Error;
use tracing_subscriber::{EnvFilter, filter::LevelFilter, prelude::*};

use crate::env::Environment;
use crate::env_const::FIELDBATCH_LOG;

/// Initialize the tracing subscriber.
///
/// Installs a compact `tracing_subscriber::fmt` layer filtered by `FIELDBATCH_LOG`.
pub fn init(env: &dyn Environment) -> Result<(), LoggingError> {
    let fmt_layer = tracing_subscriber::fmt::layer().compact();

    tracing_subscriber::registry()
        .with(env_filter(env))
        .with(fmt_layer)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))
}

fn env_filter(env: &dyn Environment) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .parse_lossy(env.get_or_else(FIELDBATCH_LOG, ""))
}

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Tracing subscriber could not be installed: {0}")]
    AlreadyInitialized(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MapEnvironment;

    #[test]
    fn default_filter_is_warn() {
        let filter = env_filter(&MapEnvironment::new());
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn filter_follows_env() {
        let filter = env_filter(&MapEnvironment::from([(FIELDBATCH_LOG, "debug")]));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn second_init_is_an_error() {
        let env = MapEnvironment::new();
        let _ = init(&env);
        assert!(matches!(
            init(&env),
            Err(LoggingError::AlreadyInitialized(_))
        ));
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for the module loader

use std::time::Duration;
use thiserror::Error;

/// Result type for loader operations
pub type Result<T> = std::result::Result<T, LoaderError>;

/// Errors that can occur while loading modules.
///
/// The error is `Clone` because every caller sharing an in-flight load
/// observes the same outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoaderError {
    /// The host did not signal completion within the configured timeout
    #[error("Module '{module}' did not load within {after:?}")]
    Timeout {
        /// Module name
        module: String,
        /// Configured timeout
        after: Duration,
    },

    /// Empty or otherwise unusable module name
    #[error("Invalid module name: '{0}'")]
    InvalidModuleName(String),

    /// Loader configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LoaderError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for the client extensions

use crate::context::RequestFailed;
use spext_loader::LoaderError;
use thiserror::Error;

/// Result type for client extension operations
pub type Result<T> = std::result::Result<T, SpextError>;

/// Errors that can occur while bringing the runtime online or using it
#[derive(Debug, Error)]
pub enum SpextError {
    /// Module loading failed
    #[error("{0}")]
    Loader(#[from] LoaderError),

    /// A remote query failed
    #[error("{0}")]
    Query(#[from] QueryError),

    /// The bootstrap module has not loaded yet
    #[error("Client runtime is not online; bring the bootstrap module online first")]
    NotOnline,

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file parse error
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// File system error
    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed GUID text
    #[error("Invalid GUID: {0}")]
    InvalidGuid(#[from] uuid::Error),
}

impl SpextError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Outcome of a failed `execute_query`
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// The host reported a failure that no handler recovered
    #[error("Query failed: {}", .0.message)]
    Failed(RequestFailed),

    /// The host dropped both callbacks without calling either
    #[error("Query abandoned by the host before completing")]
    Abandoned,
}

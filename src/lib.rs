// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # spext
//!
//! Extensions for a remote client object model.
//!
//! - [`collections`]: functional operations (`for_each`, `filter_by`,
//!   `group_by`, ...) over the host's cursor-based collections
//! - [`Runtime`]: brings host modules online through a deduplicating
//!   loader and hands out [`ClientContext`]s with an awaitable
//!   `execute_query`
//! - [`ListExt`], [`Guid`]: small conveniences around lists and ids
//!
//! ```rust,ignore
//! use spext::{CollectionExt, Config, ListExt, Runtime};
//!
//! let runtime = Runtime::new(page, Config::load(None)?)?;
//! runtime.bring_online().await?;
//!
//! let context = runtime.client_context(host_context)?;
//! let items = documents.query_result(None);
//! context.execute_query().await?;
//! let drafts = items.filter_by(spext::fields! { "Status" => "Draft" });
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod context;
pub mod error;
pub mod guid;
pub mod list;
pub mod runtime;

pub use config::Config;
pub use context::{
    ClientContext, ClientRuntime, ErrorHandlers, FailureCallback, QueryResponse, RequestFailed,
    RequestSucceeded, SuccessCallback, UnhandledErrorHandler,
};
pub use error::{QueryError, Result, SpextError};
pub use guid::Guid;
pub use list::{CamlQuery, ListExt, ListSource, DEFAULT_VIEW_XML};
pub use runtime::Runtime;

pub use spext_collections as collections;
pub use spext_collections::{fields, CollectionExt, Cursor, Enumerable, FieldValue, Fields};
pub use spext_loader as loader;
pub use spext_loader::{LoaderConfig, LoaderError, ModuleStatus, ScriptRegistry};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install a `fmt` subscriber filtered by `filter` (e.g. `"spext=debug"`).
///
/// A subscriber installed earlier, by this function or the application,
/// is left in place.
pub fn init_logging(filter: &str) -> Result<()> {
    let filter = EnvFilter::try_new(filter)
        .map_err(|e| SpextError::config(format!("invalid log filter '{filter}': {e}")))?;
    if tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .try_init()
        .is_err()
    {
        tracing::debug!("global subscriber already installed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_repeatable() {
        assert!(init_logging("spext=debug").is_ok());
        assert!(init_logging("spext=info").is_ok());
    }

    #[test]
    fn test_init_logging_rejects_bad_filter() {
        assert!(matches!(init_logging("spext=notalevel"), Err(SpextError::Config(_))));
    }
}

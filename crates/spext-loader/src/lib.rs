// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # spext-loader
//!
//! Brings host runtime modules online on demand.
//!
//! The host page owns an on-demand script registry (register a module at an
//! address, declare dependency edges, run a callback once loaded). This
//! crate drives it through the [`ScriptRegistry`] trait and adds:
//!
//! - case-normalized module names
//! - dependency edges buffered until the host knows the module
//! - one shared in-flight load per module, however many callers ask
//! - a one-time bootstrap side effect when the root module first loads
//!
//! ```rust,ignore
//! use spext_loader::{LoaderConfig, ModuleLoader};
//!
//! let loader = ModuleLoader::new(host, LoaderConfig::default())?;
//! loader.register_dependency("sp.taxonomy.js", "sp.js")?;
//! loader.load(["sp.js", "sp.taxonomy.js"]).await?;
//! ```

#![warn(missing_docs)]

pub mod base_address;
pub mod config;
pub mod error;
pub mod host;
pub mod loader;
pub mod state;

pub use base_address::BaseAddress;
pub use config::LoaderConfig;
pub use error::{LoaderError, Result};
pub use host::{LoadedCallback, ScriptRegistry};
pub use loader::{LoadFuture, ModuleLoader, ModuleRequest};
pub use state::{BootstrapHook, LoaderState, ModuleStatus};

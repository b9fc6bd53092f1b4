// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Client runtime: module loading plus the query error hook.

use crate::config::Config;
use crate::context::{ClientContext, ClientRuntime, ErrorHandlers, RequestFailed};
use crate::error::{Result, SpextError};
use spext_loader::{BootstrapHook, LoadFuture, LoaderState, ModuleLoader, ModuleRequest, ModuleStatus, ScriptRegistry};
use std::future::Future;
use std::sync::Arc;
use tracing::{info, instrument};

/// Entry point that brings the host runtime online and hands out contexts.
///
/// Owns the module loader, its state table and the unhandled-error handler
/// slot. Clones share all three.
pub struct Runtime<H: ScriptRegistry> {
    loader: ModuleLoader<H>,
    handlers: Arc<ErrorHandlers>,
    announce: bool,
}

impl<H: ScriptRegistry> Clone for Runtime<H> {
    fn clone(&self) -> Self {
        Self {
            loader: self.loader.clone(),
            handlers: Arc::clone(&self.handlers),
            announce: self.announce,
        }
    }
}

impl<H: ScriptRegistry> Runtime<H> {
    /// Create a runtime over `host` with a fresh loader state
    pub fn new(host: Arc<H>, config: Config) -> Result<Self> {
        Self::with_state(host, config, Arc::new(LoaderState::new()))
    }

    /// Create a runtime over an existing loader state
    pub fn with_state(host: Arc<H>, config: Config, state: Arc<LoaderState>) -> Result<Self> {
        let Config { loader, announce, .. } = config;
        let loader = ModuleLoader::with_state(host, loader, state)?;
        let bootstrap = loader.bootstrap_module().to_string();
        loader.add_bootstrap_hook(move || {
            info!(module = %bootstrap, "client extensions registered");
        });

        Ok(Self {
            loader,
            handlers: Arc::new(ErrorHandlers::new()),
            announce,
        })
    }

    /// The module loader
    pub fn loader(&self) -> &ModuleLoader<H> {
        &self.loader
    }

    /// Whether the bootstrap module has loaded
    pub fn is_online(&self) -> bool {
        self.loader.is_bootstrapped()
    }

    /// Load the bootstrap module, logging a confirmation when configured to.
    #[instrument(skip(self))]
    pub async fn bring_online(&self) -> Result<()> {
        self.loader.load(self.loader.bootstrap_module()).await?;
        if self.announce {
            info!("client extensions loaded");
        }
        Ok(())
    }

    /// Load one module or several; see [`ModuleLoader::load`]
    pub fn import(&self, request: impl Into<ModuleRequest>) -> LoadFuture {
        self.loader.load(request)
    }

    /// Declare that `module` needs `dependencies` loaded first
    pub fn register_dependency(&self, module: &str, dependencies: impl Into<ModuleRequest>) -> Result<()> {
        Ok(self.loader.register_dependency(module, dependencies)?)
    }

    /// Status of `module`
    pub fn status(&self, module: &str) -> ModuleStatus {
        self.loader.status(module)
    }

    /// Run `hook` once the runtime is online (immediately if it already is)
    pub fn on_online(&self, hook: impl BootstrapHook) {
        self.loader.add_bootstrap_hook(hook);
    }

    /// Install the interceptor for failed queries, replacing any previous one.
    ///
    /// Returning `Ok(value)` turns the failure into a success carrying
    /// `value`; returning `Err` fails the query with that failure.
    pub fn register_unhandled_error_handler<F, Fut>(&self, handler: F)
    where
        F: Fn(RequestFailed) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<serde_json::Value, RequestFailed>> + Send + 'static,
    {
        self.handlers.register(handler);
    }

    /// Wrap a host context; only available once the runtime is online.
    pub fn client_context<R: ClientRuntime>(&self, runtime: Arc<R>) -> Result<ClientContext<R>> {
        if !self.is_online() {
            return Err(SpextError::NotOnline);
        }
        Ok(ClientContext::new(runtime, Arc::clone(&self.handlers)))
    }
}

impl<H: ScriptRegistry> std::fmt::Debug for Runtime<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("loader", &self.loader)
            .field("handlers", &self.handlers)
            .finish()
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! On-demand module loader.
//!
//! `load` asks the host to bring a module in and hands back a future that
//! completes when the host signals it. Concurrent requests for the same
//! module share one in-flight future, so the host's `execute` runs once
//! per load no matter how many callers are waiting.

use crate::base_address::BaseAddress;
use crate::config::LoaderConfig;
use crate::error::{LoaderError, Result};
use crate::host::ScriptRegistry;
use crate::state::{BootstrapHook, LoadStart, LoaderState, ModuleStatus, SharedLoad};
use futures::future::{self, BoxFuture, FutureExt, try_join_all};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, instrument, warn};

/// Future returned by [`ModuleLoader::load`]
pub type LoadFuture = BoxFuture<'static, Result<()>>;

/// One module name or an ordered list of them
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleRequest {
    /// A single module
    One(String),
    /// Several modules, loaded together
    Many(Vec<String>),
}

impl ModuleRequest {
    /// Module names in request order
    pub fn into_names(self) -> Vec<String> {
        match self {
            ModuleRequest::One(name) => vec![name],
            ModuleRequest::Many(names) => names,
        }
    }
}

impl From<&str> for ModuleRequest {
    fn from(name: &str) -> Self {
        ModuleRequest::One(name.to_string())
    }
}

impl From<String> for ModuleRequest {
    fn from(name: String) -> Self {
        ModuleRequest::One(name)
    }
}

impl From<Vec<String>> for ModuleRequest {
    fn from(names: Vec<String>) -> Self {
        ModuleRequest::Many(names)
    }
}

impl From<Vec<&str>> for ModuleRequest {
    fn from(names: Vec<&str>) -> Self {
        ModuleRequest::Many(names.into_iter().map(String::from).collect())
    }
}

impl From<&[&str]> for ModuleRequest {
    fn from(names: &[&str]) -> Self {
        ModuleRequest::Many(names.iter().map(|n| n.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for ModuleRequest {
    fn from(names: [&str; N]) -> Self {
        ModuleRequest::Many(names.iter().map(|n| n.to_string()).collect())
    }
}

/// Lower-case a module name, rejecting empty ones
fn normalize(name: &str) -> Result<String> {
    if name.trim().is_empty() {
        return Err(LoaderError::InvalidModuleName(name.to_string()));
    }
    Ok(name.to_lowercase())
}

/// Loads modules through a host [`ScriptRegistry`].
///
/// Cloning is cheap; clones share the host, the state table and the cached
/// base address.
pub struct ModuleLoader<H: ScriptRegistry> {
    host: Arc<H>,
    state: Arc<LoaderState>,
    config: Arc<LoaderConfig>,
    base_address: Arc<BaseAddress>,
    bootstrap: String,
}

impl<H: ScriptRegistry> Clone for ModuleLoader<H> {
    fn clone(&self) -> Self {
        Self {
            host: Arc::clone(&self.host),
            state: Arc::clone(&self.state),
            config: Arc::clone(&self.config),
            base_address: Arc::clone(&self.base_address),
            bootstrap: self.bootstrap.clone(),
        }
    }
}

impl<H: ScriptRegistry> ModuleLoader<H> {
    /// Create a loader with a fresh state table
    pub fn new(host: Arc<H>, config: LoaderConfig) -> Result<Self> {
        Self::with_state(host, config, Arc::new(LoaderState::new()))
    }

    /// Create a loader over an existing state table
    pub fn with_state(host: Arc<H>, config: LoaderConfig, state: Arc<LoaderState>) -> Result<Self> {
        let bootstrap = normalize(&config.bootstrap_module)
            .map_err(|_| LoaderError::config("bootstrap module name is empty"))?;
        let base_address = BaseAddress::new(&bootstrap, config.default_base_address.clone())?;

        Ok(Self {
            host,
            state,
            config: Arc::new(config),
            base_address: Arc::new(base_address),
            bootstrap,
        })
    }

    /// The host registry
    pub fn host(&self) -> &Arc<H> {
        &self.host
    }

    /// The shared state table
    pub fn state(&self) -> &Arc<LoaderState> {
        &self.state
    }

    /// Loader settings
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Lower-cased name of the bootstrap module
    pub fn bootstrap_module(&self) -> &str {
        &self.bootstrap
    }

    /// Status of `module`
    pub fn status(&self, module: &str) -> ModuleStatus {
        self.state.status(&module.to_lowercase())
    }

    /// Whether the bootstrap module has loaded and its hooks have run
    pub fn is_bootstrapped(&self) -> bool {
        self.state.is_bootstrapped()
    }

    /// Register a side effect for the first bootstrap load.
    ///
    /// Runs immediately when bootstrap already happened.
    pub fn add_bootstrap_hook(&self, hook: impl BootstrapHook) {
        self.state.add_bootstrap_hook(Arc::new(hook));
    }

    /// Declare that `module` needs `dependencies` loaded first.
    ///
    /// Edges go straight to the host when it already knows `module`;
    /// otherwise they are kept until the host does, and pushed by the next
    /// `load` or `register_dependency` call that finds it registered. Edges
    /// for a module the host never learns about never reach it.
    ///
    /// Every name is validated before any edge is recorded.
    pub fn register_dependency(&self, module: &str, dependencies: impl Into<ModuleRequest>) -> Result<()> {
        let module = normalize(module)?;
        let dependencies = dependencies
            .into()
            .into_names()
            .iter()
            .map(|dependency| normalize(dependency))
            .collect::<Result<Vec<_>>>()?;
        for dependency in dependencies {
            debug!(module, dependency, "buffering dependency");
            self.state.buffer_dependency(&module, dependency);
        }
        self.flush_dependencies(&module);
        Ok(())
    }

    /// Push buffered edges for `module` once the host knows it
    fn flush_dependencies(&self, module: &str) {
        if !self.host.is_registered(module) {
            return;
        }
        for dependency in self.state.take_dependencies(module) {
            debug!(module, dependency, "registering dependency with host");
            self.host.register_dependency(module, &dependency);
        }
    }

    /// Load one module or several.
    ///
    /// Host registration happens before this returns; the future completes
    /// once the host signals the load. A list completes when every entry
    /// has, and fails on the first failure.
    ///
    /// Without `load_timeout_ms`, a host that never signals leaves the
    /// future pending forever.
    pub fn load(&self, request: impl Into<ModuleRequest>) -> LoadFuture {
        match request.into() {
            ModuleRequest::One(name) => self.load_one(&name),
            ModuleRequest::Many(names) => {
                let loads: Vec<LoadFuture> = names.iter().map(|name| self.load_one(name)).collect();
                async move { try_join_all(loads).await.map(|_| ()) }.boxed()
            }
        }
    }

    #[instrument(level = "debug", skip(self))]
    fn load_one(&self, name: &str) -> LoadFuture {
        let module = match normalize(name) {
            Ok(module) => module,
            Err(e) => return future::ready(Err(e)).boxed(),
        };

        let (done, signal) = oneshot::channel();
        match self.state.begin_load(&module, || self.completion(&module, signal)) {
            LoadStart::Loaded => {
                debug!(module, "already loaded");
                self.flush_dependencies(&module);
                future::ready(Ok(())).boxed()
            }
            LoadStart::InFlight(load) => {
                debug!(module, "joining in-flight load");
                load.boxed()
            }
            LoadStart::Started(load) => {
                self.start(&module, done);
                load.boxed()
            }
        }
    }

    /// Shared future resolving when `signal` fires
    fn completion(&self, module: &str, signal: oneshot::Receiver<()>) -> SharedLoad {
        let module = module.to_string();
        let state = Arc::clone(&self.state);
        let timeout = self.config.load_timeout();

        async move {
            let wait = async {
                if signal.await.is_err() {
                    warn!(module, "host dropped the load callback, module will never load");
                    future::pending::<()>().await;
                }
            };

            let Some(after) = timeout else {
                wait.await;
                return Ok(());
            };
            match tokio::time::timeout(after, wait).await {
                Ok(()) => Ok(()),
                Err(_) => {
                    warn!(module, ?after, "module load timed out");
                    state.abandon(&module);
                    Err(LoaderError::Timeout { module, after })
                }
            }
        }
        .boxed()
        .shared()
    }

    /// Register with the host if needed, then ask it to load
    fn start(&self, module: &str, done: oneshot::Sender<()>) {
        if !self.config.is_external(module) && !self.host.is_registered(module) {
            let url = format!("{}{}", self.base_address.resolve(&*self.host), module);
            debug!(module, url, "registering module with host");
            self.host.register(module, &url);
        }
        self.flush_dependencies(module);

        let state = Arc::clone(&self.state);
        let name = module.to_string();
        let is_bootstrap = module == self.bootstrap;
        self.host.execute_or_delay_until_loaded(
            module,
            Box::new(move || {
                state.mark_loaded(&name);
                if is_bootstrap {
                    state.run_bootstrap_hooks();
                }
                // Nobody is listening after a timeout.
                let _ = done.send(());
            }),
        );
        self.host.execute(module);
    }
}

impl<H: ScriptRegistry> std::fmt::Debug for ModuleLoader<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleLoader")
            .field("bootstrap", &self.bootstrap)
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_conversions() {
        assert_eq!(ModuleRequest::from("sp.js").into_names(), vec!["sp.js"]);
        assert_eq!(
            ModuleRequest::from(["sp.js", "sp.runtime.js"]).into_names(),
            vec!["sp.js", "sp.runtime.js"]
        );
        assert!(matches!(ModuleRequest::from(vec!["a.js"]), ModuleRequest::Many(_)));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("SP.Taxonomy.JS").unwrap(), "sp.taxonomy.js");
        assert!(matches!(normalize("  "), Err(LoaderError::InvalidModuleName(_))));
    }
}

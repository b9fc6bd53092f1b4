// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Per-module state table and the one-time bootstrap flag.

use crate::error::LoaderError;
use dashmap::DashMap;
use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

/// In-flight load shared by every concurrent requester
pub(crate) type SharedLoad = Shared<BoxFuture<'static, Result<(), LoaderError>>>;

/// Side effect run once, when the bootstrap module first loads.
pub trait BootstrapHook: Send + Sync + 'static {
    /// Called after the bootstrap module is marked loaded
    fn on_bootstrap(&self);
}

impl<F> BootstrapHook for F
where
    F: Fn() + Send + Sync + 'static,
{
    fn on_bootstrap(&self) {
        self()
    }
}

/// Observable lifecycle of a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleStatus {
    /// Never handed to the host (dependency edges may be buffered)
    Unknown,
    /// Known to the host, not loading
    Registered,
    /// Waiting for the host to signal completion
    Loading,
    /// Loaded; further requests complete immediately
    Loaded,
}

#[derive(Default)]
enum Phase {
    #[default]
    Idle,
    Loading(SharedLoad),
    Loaded,
}

#[derive(Default)]
struct ModuleEntry {
    /// Dependency edges not yet pushed to the host
    pending_dependencies: Vec<String>,
    registered: bool,
    phase: Phase,
}

/// Outcome of asking the table to start a load
pub(crate) enum LoadStart {
    Loaded,
    InFlight(SharedLoad),
    Started(SharedLoad),
}

/// Module table plus the bootstrap flag.
///
/// Owned explicitly and shared through an `Arc`, so tests (and separate
/// hosts) get isolated instances. Entries are never removed.
#[derive(Default)]
pub struct LoaderState {
    modules: DashMap<String, ModuleEntry>,
    bootstrapped: AtomicBool,
    hooks: Mutex<Vec<Arc<dyn BootstrapHook>>>,
}

impl LoaderState {
    /// Create an empty state table
    pub fn new() -> Self {
        Self::default()
    }

    /// Current status of `module` (lower-cased name)
    pub fn status(&self, module: &str) -> ModuleStatus {
        match self.modules.get(module) {
            None => ModuleStatus::Unknown,
            Some(entry) => match entry.phase {
                Phase::Loaded => ModuleStatus::Loaded,
                Phase::Loading(_) => ModuleStatus::Loading,
                Phase::Idle if entry.registered => ModuleStatus::Registered,
                Phase::Idle => ModuleStatus::Unknown,
            },
        }
    }

    /// Whether the bootstrap hooks have run
    pub fn is_bootstrapped(&self) -> bool {
        self.bootstrapped.load(Ordering::Acquire)
    }

    /// Number of modules the table knows about
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Register a hook for the bootstrap side effect.
    ///
    /// Runs immediately if bootstrap already happened.
    pub fn add_bootstrap_hook(&self, hook: Arc<dyn BootstrapHook>) {
        {
            let mut hooks = self.hooks.lock();
            if !self.is_bootstrapped() {
                hooks.push(hook);
                return;
            }
        }
        hook.on_bootstrap();
    }

    pub(crate) fn buffer_dependency(&self, module: &str, dependency: String) {
        let mut entry = self.modules.entry(module.to_string()).or_default();
        if !entry.pending_dependencies.contains(&dependency) {
            entry.pending_dependencies.push(dependency);
        }
    }

    /// Mark `module` as handed to the host and drain its buffered edges
    pub(crate) fn take_dependencies(&self, module: &str) -> Vec<String> {
        let mut entry = self.modules.entry(module.to_string()).or_default();
        entry.registered = true;
        std::mem::take(&mut entry.pending_dependencies)
    }

    /// Start a load unless one is running or finished.
    ///
    /// `start` builds the shared outcome and is only called when the module
    /// is idle; the entry stays locked meanwhile, so concurrent callers
    /// cannot both start.
    pub(crate) fn begin_load(&self, module: &str, start: impl FnOnce() -> SharedLoad) -> LoadStart {
        let mut entry = self.modules.entry(module.to_string()).or_default();
        match &entry.phase {
            Phase::Loaded => return LoadStart::Loaded,
            Phase::Loading(load) => return LoadStart::InFlight(load.clone()),
            Phase::Idle => {}
        }
        let load = start();
        entry.phase = Phase::Loading(load.clone());
        LoadStart::Started(load)
    }

    pub(crate) fn mark_loaded(&self, module: &str) {
        let mut entry = self.modules.entry(module.to_string()).or_default();
        entry.registered = true;
        entry.phase = Phase::Loaded;
        debug!(module, "module loaded");
    }

    /// Forget an in-flight load so the next request starts over
    pub(crate) fn abandon(&self, module: &str) {
        if let Some(mut entry) = self.modules.get_mut(module) {
            if matches!(entry.phase, Phase::Loading(_)) {
                entry.phase = Phase::Idle;
            }
        }
    }

    /// Run the bootstrap hooks unless they already ran
    pub(crate) fn run_bootstrap_hooks(&self) {
        let hooks = {
            let hooks = self.hooks.lock();
            if self.bootstrapped.swap(true, Ordering::AcqRel) {
                return;
            }
            hooks.clone()
        };
        info!(hooks = hooks.len(), "bootstrap module loaded, running extension hooks");
        for hook in hooks {
            hook.on_bootstrap();
        }
    }
}

impl std::fmt::Debug for LoaderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoaderState")
            .field("modules", &self.modules.len())
            .field("bootstrapped", &self.is_bootstrapped())
            .finish()
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Host script registry contract.
//!
//! The loader never fetches or evaluates scripts itself. It drives the
//! host's on-demand registry through this trait: register a module at an
//! address, declare dependency edges, then ask the host to run a callback
//! once the module (and everything it depends on) has loaded.

/// Callback invoked by the host once a module has loaded.
pub type LoadedCallback = Box<dyn FnOnce() + Send + 'static>;

/// Script registry provided by the host page.
///
/// Module names passed in are already lower-cased.
pub trait ScriptRegistry: Send + Sync + 'static {
    /// Whether the host knows about `module`
    fn is_registered(&self, module: &str) -> bool;

    /// Whether the host reports `module` as loaded
    fn is_loaded(&self, module: &str) -> bool;

    /// Address `module` was registered at, if known
    fn module_url(&self, module: &str) -> Option<String>;

    /// `src` attributes of the scripts present on the page
    fn script_sources(&self) -> Vec<String>;

    /// Register `module` to be fetched from `url`
    fn register(&self, module: &str, url: &str);

    /// Declare that `module` needs `dependency` loaded first
    fn register_dependency(&self, module: &str, dependency: &str);

    /// Run `callback` once `module` has loaded, immediately if it already has.
    ///
    /// The host may never call `callback`, or may drop it unused.
    fn execute_or_delay_until_loaded(&self, module: &str, callback: LoadedCallback);

    /// Start loading `module` now
    fn execute(&self, module: &str);
}

impl<T: ScriptRegistry + ?Sized> ScriptRegistry for std::sync::Arc<T> {
    fn is_registered(&self, module: &str) -> bool {
        (**self).is_registered(module)
    }

    fn is_loaded(&self, module: &str) -> bool {
        (**self).is_loaded(module)
    }

    fn module_url(&self, module: &str) -> Option<String> {
        (**self).module_url(module)
    }

    fn script_sources(&self) -> Vec<String> {
        (**self).script_sources()
    }

    fn register(&self, module: &str, url: &str) {
        (**self).register(module, url)
    }

    fn register_dependency(&self, module: &str, dependency: &str) {
        (**self).register_dependency(module, dependency)
    }

    fn execute_or_delay_until_loaded(&self, module: &str, callback: LoadedCallback) {
        (**self).execute_or_delay_until_loaded(module, callback)
    }

    fn execute(&self, module: &str) {
        (**self).execute(module)
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Loader configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Module loader settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Root runtime module every other module depends on
    pub bootstrap_module: String,

    /// Modules the host always registers itself; never self-registered
    pub external_modules: Vec<String>,

    /// Address used when the bootstrap script cannot be located
    pub default_base_address: String,

    /// Give up waiting for the host after this many milliseconds.
    ///
    /// Unset means a stalled load never completes.
    pub load_timeout_ms: Option<u64>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            bootstrap_module: "sp.js".to_string(),
            external_modules: vec!["sp.ribbon.js".to_string()],
            default_base_address: "/_layouts/15/".to_string(),
            load_timeout_ms: None,
        }
    }
}

impl LoaderConfig {
    /// Configured load timeout
    pub fn load_timeout(&self) -> Option<Duration> {
        self.load_timeout_ms.map(Duration::from_millis)
    }

    /// Whether `module` must never be registered by the loader
    pub fn is_external(&self, module: &str) -> bool {
        self.external_modules
            .iter()
            .any(|external| external.eq_ignore_ascii_case(module))
    }
}

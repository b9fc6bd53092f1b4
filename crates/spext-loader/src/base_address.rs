// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Address self-registered modules are fetched from.

use crate::error::{LoaderError, Result};
use crate::host::ScriptRegistry;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Resolves (once) the folder the bootstrap script was served from.
///
/// Lookup order: the bootstrap module's registered url when the host
/// reports it loaded, then the first page script whose path ends in the
/// bootstrap file name, then the configured default. A query string after
/// the file name is dropped along with it.
#[derive(Debug)]
pub struct BaseAddress {
    bootstrap: String,
    file_suffix: Regex,
    script_path: Regex,
    fallback: String,
    resolved: OnceLock<String>,
}

impl BaseAddress {
    /// Build the resolver for `bootstrap` with `fallback` as last resort
    pub fn new(bootstrap: &str, fallback: impl Into<String>) -> Result<Self> {
        if bootstrap.is_empty() {
            return Err(LoaderError::config("bootstrap module name is empty"));
        }
        let escaped = regex::escape(bootstrap);
        let file_suffix = Regex::new(&format!(r"{escaped}(\?.+)?$"))
            .map_err(|e| LoaderError::config(e.to_string()))?;
        let script_path = Regex::new(&format!(r"/{escaped}(\?.+)?$"))
            .map_err(|e| LoaderError::config(e.to_string()))?;

        Ok(Self {
            bootstrap: bootstrap.to_string(),
            file_suffix,
            script_path,
            fallback: fallback.into(),
            resolved: OnceLock::new(),
        })
    }

    /// The base address, discovered on first use and cached afterwards
    pub fn resolve<H: ScriptRegistry + ?Sized>(&self, host: &H) -> &str {
        self.resolved.get_or_init(|| {
            let address = self.discover(host);
            debug!(address, "resolved module base address");
            address
        })
    }

    fn discover<H: ScriptRegistry + ?Sized>(&self, host: &H) -> String {
        if host.is_registered(&self.bootstrap) && host.is_loaded(&self.bootstrap) {
            if let Some(url) = host.module_url(&self.bootstrap) {
                return self.strip(&url);
            }
        }

        host.script_sources()
            .iter()
            .find(|src| self.script_path.is_match(src))
            .map(|src| self.strip(src))
            .unwrap_or_else(|| self.fallback.clone())
    }

    fn strip(&self, url: &str) -> String {
        self.file_suffix.replace(url, "").into_owned()
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Runtime configuration.
//!
//! Settings come from defaults, then an optional TOML file, then `SPEXT_*`
//! environment variables:
//!
//! ```toml
//! announce = false
//! log_filter = "spext=debug"
//!
//! [loader]
//! bootstrap_module = "sp.js"
//! default_base_address = "/_layouts/15/"
//! load_timeout_ms = 30000
//! ```

use crate::error::{Result, SpextError};
use serde::{Deserialize, Serialize};
use spext_loader::LoaderConfig;
use std::path::Path;

/// Prefix of the environment variables read by [`Config::apply_env`]
pub const ENV_PREFIX: &str = "SPEXT_";

/// Configuration for the client runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Module loader settings
    pub loader: LoaderConfig,

    /// Log a confirmation once the runtime is online
    pub announce: bool,

    /// `tracing` filter directive used by [`init_logging`](crate::init_logging)
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            loader: LoaderConfig::default(),
            announce: true,
            log_filter: "spext=info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from `path` (if given), then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Config::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Apply `SPEXT_*` environment variables.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_vars(std::env::vars())
    }

    /// Apply `SPEXT_*` pairs from `vars`; other names are ignored.
    pub fn apply_vars<I, K, V>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            if let Some(config_key) = key.as_ref().strip_prefix(ENV_PREFIX) {
                let config_key = config_key.to_lowercase().replace('_', "-");
                self.set(&config_key, value.as_ref())?;
            }
        }
        Ok(())
    }

    /// Set a configuration value by key.
    ///
    /// Unknown keys are ignored.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "bootstrap-module" => self.loader.bootstrap_module = value.to_string(),
            "base-address" => self.loader.default_base_address = value.to_string(),
            "external-modules" => {
                self.loader.external_modules = value
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(String::from)
                    .collect();
            }
            "load-timeout-ms" => {
                self.loader.load_timeout_ms = match value.trim() {
                    "" | "none" => None,
                    ms => Some(ms.parse().map_err(|_| {
                        SpextError::config(format!("load-timeout-ms: '{ms}' is not a number"))
                    })?),
                };
            }
            "announce" => self.announce = parse_bool(key, value)?,
            "log" => self.log_filter = value.to_string(),
            _ => {}
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(SpextError::config(format!("{key}: '{other}' is not a boolean"))),
    }
}

// Dweve MLS - MATLAB Code Intelligence
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Server configuration.
//!
//! Settings come from an optional `.mlsrc.json` in the working directory,
//! with the `MLS_ANALYZER_PATH` environment variable taking precedence for
//! the analyzer location. Every field has a default, so a missing file is
//! not an error; a malformed one is.
//!
//! ```json
//! {
//!   "analyzerPath": "/opt/matlab/bin/glnxa64/mlint",
//!   "debounceMs": 500,
//!   "maxCompletions": 50,
//!   "rules": { "unusedVariable": false }
//! }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::constants::{
    DEFAULT_ANALYZER_TIMEOUT_SECS, DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL_SECS,
    DEFAULT_DEBOUNCE_MS, DEFAULT_MAX_COMPLETIONS,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Per-rule diagnostic toggles. `all = false` disables analyzer findings
/// entirely; the named toggles drop individual mlint rule codes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RuleToggles {
    pub all: bool,
    pub unused_variable: bool,
    pub missing_semicolon: bool,
}

impl Default for RuleToggles {
    fn default() -> Self {
        Self {
            all: true,
            unused_variable: true,
            missing_semicolon: true,
        }
    }
}

/// Configuration surface consumed by the server core.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerConfig {
    /// Analyzer executable. `None` falls back to a `PATH` lookup; if that
    /// also fails, diagnostics degrade to parse checks only.
    pub analyzer_path: Option<PathBuf>,
    pub debounce_ms: u64,
    pub cache_capacity: usize,
    pub cache_ttl_secs: u64,
    pub max_completions: usize,
    pub analyzer_timeout_secs: u64,
    pub rules: RuleToggles,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            analyzer_path: None,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            max_completions: DEFAULT_MAX_COMPLETIONS,
            analyzer_timeout_secs: DEFAULT_ANALYZER_TIMEOUT_SECS,
            rules: RuleToggles::default(),
        }
    }
}

impl ServerConfig {
    pub const FILE_NAME: &'static str = ".mlsrc.json";

    /// Load configuration from `dir/.mlsrc.json`, defaulting every field
    /// the file omits. A missing file yields the defaults.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(Self::FILE_NAME);
        if !path.exists() {
            debug!("no {} found, using defaults", Self::FILE_NAME);
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config: Self =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse { path, source })?;
        Ok(config)
    }

    /// Apply environment overrides. `MLS_ANALYZER_PATH` replaces the
    /// configured analyzer; an empty value disables it.
    pub fn apply_env(&mut self) {
        if let Ok(path) = std::env::var("MLS_ANALYZER_PATH") {
            self.analyzer_path = if path.is_empty() {
                None
            } else {
                Some(PathBuf::from(path))
            };
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn analyzer_timeout(&self) -> Duration {
        Duration::from_secs(self.analyzer_timeout_secs)
    }
}

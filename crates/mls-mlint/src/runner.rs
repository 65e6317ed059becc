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

//! Analyzer process invocation.
//!
//! The executable is resolved once at construction: an explicitly
//! configured path wins, otherwise `mlint` is looked up on `PATH`. Each run
//! snapshots the in-memory buffer to a temp `.m` file so findings always
//! reflect unsaved edits, then invokes the analyzer with a timeout.
//!
//! mlint writes its report to stderr and exits non-zero when it has
//! findings; neither is treated as a failure.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::report::{parse_report, Finding};

/// Ways an analyzer invocation can fail. All of these are recoverable:
/// the caller publishes an empty finding set and keeps serving.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("analyzer executable is not available")]
    Unavailable,
    #[error("analyzer timed out after {0:?}")]
    Timeout(Duration),
    #[error("analyzer I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalyzerError {
    /// Stable label for once-per-class failure logging.
    pub fn class(&self) -> &'static str {
        match self {
            Self::Unavailable => "unavailable",
            Self::Timeout(_) => "timeout",
            Self::Io(_) => "io",
        }
    }
}

/// Handle to the external mlint executable.
#[derive(Debug, Clone)]
pub struct MlintRunner {
    path: Option<PathBuf>,
    timeout: Duration,
}

impl MlintRunner {
    /// Resolve the analyzer executable and build a runner.
    ///
    /// A configured path that does not point at a file is ignored (with a
    /// warning) and the `PATH` lookup runs instead, so a stale config entry
    /// degrades rather than disabling diagnostics outright.
    pub fn new(configured: Option<PathBuf>, timeout: Duration) -> Self {
        let path = Self::discover(configured);
        match &path {
            Some(p) => debug!("analyzer resolved to {}", p.display()),
            None => debug!("no analyzer executable found, diagnostics limited to parse checks"),
        }
        Self { path, timeout }
    }

    /// A runner with no executable; every run reports `Unavailable`.
    pub fn disabled() -> Self {
        Self {
            path: None,
            timeout: Duration::from_secs(0),
        }
    }

    fn discover(configured: Option<PathBuf>) -> Option<PathBuf> {
        if let Some(p) = configured {
            if p.is_file() {
                return Some(p);
            }
            warn!(
                "configured analyzer path {} does not exist, falling back to PATH lookup",
                p.display()
            );
        }
        which::which("mlint").ok()
    }

    pub fn is_available(&self) -> bool {
        self.path.is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run the analyzer on a source snapshot and parse its report.
    ///
    /// The spawned process is allowed to outlive a superseded request; the
    /// caller discards stale output. On timeout the child is killed via
    /// `kill_on_drop`.
    pub async fn analyze_source(&self, content: &str) -> Result<Vec<Finding>, AnalyzerError> {
        let Some(path) = &self.path else {
            return Err(AnalyzerError::Unavailable);
        };

        // mlint reads files, not stdin: snapshot the buffer.
        let snapshot = tempfile::Builder::new()
            .prefix("mls-")
            .suffix(".m")
            .tempfile()?;
        tokio::fs::write(snapshot.path(), content).await?;

        let invocation = Command::new(path)
            .arg("-id")
            .arg(snapshot.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, invocation)
            .await
            .map_err(|_| AnalyzerError::Timeout(self.timeout))??;

        // The report goes to stderr; some builds use stdout.
        let raw = if output.stderr.is_empty() {
            &output.stdout
        } else {
            &output.stderr
        };
        let findings = parse_report(&String::from_utf8_lossy(raw));
        debug!(
            "analyzer produced {} findings ({} report bytes)",
            findings.len(),
            raw.len()
        );
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_executable_reports_unavailable() {
        let runner = MlintRunner::disabled();
        assert!(!runner.is_available());
        let err = runner.analyze_source("x = 1").await.unwrap_err();
        assert!(matches!(err, AnalyzerError::Unavailable));
        assert_eq!(err.class(), "unavailable");
    }

    #[tokio::test]
    async fn nonexistent_configured_path_falls_back() {
        let runner = MlintRunner::new(
            Some(PathBuf::from("/nonexistent/mlint-binary")),
            Duration::from_secs(5),
        );
        // Either PATH has a real mlint or the runner is disabled; the bogus
        // configured path must not be kept.
        if let Some(p) = runner.path() {
            assert_ne!(p, Path::new("/nonexistent/mlint-binary"));
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn fake_analyzer_report_is_parsed() {
        use std::io::Write;
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script_path = dir.path().join("fake-mlint");
        {
            let mut script = std::fs::File::create(&script_path).unwrap();
            writeln!(script, "#!/bin/sh").unwrap();
            writeln!(
                script,
                "echo 'L 2 (NASGU): Value assigned to x might be unused.' >&2"
            )
            .unwrap();
            writeln!(script, "exit 1").unwrap();
        }
        std::fs::set_permissions(&script_path, std::fs::Permissions::from_mode(0o755)).unwrap();

        let runner = MlintRunner::new(Some(script_path), Duration::from_secs(5));
        assert!(runner.is_available());

        let findings = runner.analyze_source("x = 1\n").await.unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, 2);
        assert_eq!(findings[0].code, "NASGU");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn hung_analyzer_times_out() {
        use std::io::Write;
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script_path = dir.path().join("hung-mlint");
        {
            let mut script = std::fs::File::create(&script_path).unwrap();
            writeln!(script, "#!/bin/sh").unwrap();
            writeln!(script, "sleep 30").unwrap();
        }
        std::fs::set_permissions(&script_path, std::fs::Permissions::from_mode(0o755)).unwrap();

        let runner = MlintRunner::new(Some(script_path), Duration::from_millis(100));
        let err = runner.analyze_source("x = 1\n").await.unwrap_err();
        assert!(matches!(err, AnalyzerError::Timeout(_)));
        assert_eq!(err.class(), "timeout");
    }
}

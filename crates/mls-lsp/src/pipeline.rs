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

//! Diagnostics pipeline.
//!
//! Per file, the pipeline runs a debounce task: a content change bumps the
//! file's generation counter and signals the task, which sleeps out the
//! debounce window, drains any further signals, snapshots the generation,
//! and runs the analyzer on the current buffer. If the generation moved
//! while the run was in flight, the result is stale and is discarded — the
//! analyzer process is allowed to finish, only its output is dropped. This
//! preserves per-file ordering of published diagnostics regardless of
//! analyzer latency.
//!
//! Analyzer failures degrade: the file gets an empty finding set (parse
//! diagnostics still publish), one warning is logged per file per failure
//! class, and the pipeline returns to idle. A later successful run clears
//! the logged classes so a new failure mode logs again.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tower_lsp::lsp_types::{
    Diagnostic, DiagnosticSeverity, NumberOrString, Position, Range, Url,
};
use tracing::{debug, warn};

use mls_core::{ParseDiagnostic, ParseSeverity};
use mls_mlint::{Finding, FindingSeverity, MlintRunner};

use crate::cache::ResultCache;
use crate::config::{RuleToggles, ServerConfig};
use crate::constants::{LINE_END_CHAR, LINE_NUMBER_OFFSET};
use crate::documents::{hash_source, DocumentStore};
use crate::index::SymbolIndex;

/// Where published diagnostics go. The live implementation is the LSP
/// client notification channel; tests capture publications instead.
#[tower_lsp::async_trait]
pub trait DiagnosticsSink: Send + Sync + 'static {
    async fn publish(&self, uri: Url, diagnostics: Vec<Diagnostic>);
}

#[tower_lsp::async_trait]
impl DiagnosticsSink for tower_lsp::Client {
    async fn publish(&self, uri: Url, diagnostics: Vec<Diagnostic>) {
        self.publish_diagnostics(uri, diagnostics, None).await;
    }
}

struct FileEntry {
    generation: Arc<AtomicU64>,
    tx: mpsc::UnboundedSender<()>,
}

/// State shared with the per-file debounce tasks.
struct Shared<S> {
    sink: S,
    store: Arc<DocumentStore>,
    index: Arc<SymbolIndex>,
    runner: MlintRunner,
    findings_cache: ResultCache<Vec<Finding>>,
    rules: RuleToggles,
}

/// Debounced, generation-checked analyzer scheduling.
pub struct DiagnosticsPipeline<S> {
    shared: Arc<Shared<S>>,
    files: DashMap<Url, FileEntry>,
    debounce: Duration,
}

impl<S: DiagnosticsSink> DiagnosticsPipeline<S> {
    pub fn new(
        sink: S,
        store: Arc<DocumentStore>,
        index: Arc<SymbolIndex>,
        runner: MlintRunner,
        config: &ServerConfig,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                sink,
                store,
                index,
                runner,
                findings_cache: ResultCache::new(
                    "mlint",
                    config.cache_capacity,
                    config.cache_ttl(),
                ),
                rules: config.rules.clone(),
            }),
            files: DashMap::new(),
            debounce: config.debounce(),
        }
    }

    /// Note a content change: bump the file's generation and (re)start its
    /// debounce window. Repeated calls within the window collapse into one
    /// analyzer run on the latest content.
    pub fn schedule(&self, uri: &Url) {
        let (generation, tx) = if let Some(entry) = self.files.get(uri) {
            (entry.generation.clone(), entry.tx.clone())
        } else {
            let (tx, rx) = mpsc::unbounded_channel();
            let generation = Arc::new(AtomicU64::new(0));
            self.spawn_task(uri.clone(), rx, generation.clone());
            self.files.insert(
                uri.clone(),
                FileEntry {
                    generation: generation.clone(),
                    tx: tx.clone(),
                },
            );
            (generation, tx)
        };

        generation.fetch_add(1, Ordering::SeqCst);
        let _ = tx.send(());
    }

    fn spawn_task(
        &self,
        uri: Url,
        mut rx: mpsc::UnboundedReceiver<()>,
        generation: Arc<AtomicU64>,
    ) {
        let shared = Arc::clone(&self.shared);
        let debounce = self.debounce;
        let logged: Arc<Mutex<HashSet<&'static str>>> = Arc::default();

        tokio::spawn(async move {
            while rx.recv().await.is_some() {
                sleep(debounce).await;
                // Collapse signals that arrived during the window.
                while rx.try_recv().is_ok() {}

                let snapshot = generation.load(Ordering::SeqCst);
                shared.run(&uri, snapshot, &generation, &logged).await;
            }
            debug!("diagnostics task for {} stopped", uri);
        });
    }

    /// Forget a closed file and clear its published diagnostics. Dropping
    /// the sender ends the file's debounce task.
    pub async fn clear(&self, uri: &Url) {
        self.files.remove(uri);
        self.shared.sink.publish(uri.clone(), Vec::new()).await;
    }

    pub fn cache_statistics(&self) -> crate::cache::CacheStatistics {
        self.shared.findings_cache.statistics()
    }

    #[cfg(test)]
    fn generation_of(&self, uri: &Url) -> Option<u64> {
        self.files
            .get(uri)
            .map(|e| e.generation.load(Ordering::SeqCst))
    }
}

impl<S: DiagnosticsSink> Shared<S> {
    async fn run(
        &self,
        uri: &Url,
        snapshot: u64,
        generation: &AtomicU64,
        logged: &Mutex<HashSet<&'static str>>,
    ) {
        let Some(content) = self.store.content(uri) else {
            // Closed between scheduling and the window elapsing.
            return;
        };
        let hash = hash_source(&content);

        let findings = if !self.rules.all {
            Vec::new()
        } else if let Some(cached) = self.findings_cache.get(hash) {
            cached
        } else {
            match self.runner.analyze_source(&content).await {
                Ok(findings) => {
                    self.findings_cache.put(hash, findings.clone());
                    logged.lock().clear();
                    findings
                }
                Err(error) => {
                    if logged.lock().insert(error.class()) {
                        warn!("analyzer failed for {}: {}", uri, error);
                    }
                    Vec::new()
                }
            }
        };

        // A newer edit supersedes this run; its output is discarded and
        // the cycle the edit started will publish instead.
        if generation.load(Ordering::SeqCst) != snapshot {
            debug!("discarding stale analysis for {}", uri);
            return;
        }

        let mut diagnostics: Vec<Diagnostic> = self
            .index
            .symbols_in(uri)
            .map(|file| {
                file.outline
                    .diagnostics
                    .iter()
                    .map(parse_diag_to_lsp)
                    .collect()
            })
            .unwrap_or_default();
        diagnostics.extend(
            findings
                .iter()
                .filter(|f| rule_allows(&self.rules, &f.code))
                .map(finding_to_lsp),
        );

        debug!("publishing {} diagnostics for {}", diagnostics.len(), uri);
        self.sink.publish(uri.clone(), diagnostics).await;
    }
}

fn rule_allows(rules: &RuleToggles, code: &str) -> bool {
    // NASGU: value assigned but unused; NOPRT: output not suppressed.
    if !rules.unused_variable && code == "NASGU" {
        return false;
    }
    if !rules.missing_semicolon && code == "NOPRT" {
        return false;
    }
    true
}

fn parse_diag_to_lsp(diag: &ParseDiagnostic) -> Diagnostic {
    let line = diag.line.saturating_sub(LINE_NUMBER_OFFSET);
    Diagnostic {
        range: Range {
            start: Position { line, character: 0 },
            end: Position {
                line,
                character: LINE_END_CHAR,
            },
        },
        severity: Some(match diag.severity {
            ParseSeverity::Warning => DiagnosticSeverity::WARNING,
            ParseSeverity::Info => DiagnosticSeverity::INFORMATION,
        }),
        source: Some("mls".to_string()),
        message: diag.message.clone(),
        ..Default::default()
    }
}

fn finding_to_lsp(finding: &Finding) -> Diagnostic {
    let line = finding.line.saturating_sub(LINE_NUMBER_OFFSET);
    let column = finding.column.saturating_sub(1);
    Diagnostic {
        range: Range {
            start: Position {
                line,
                character: column,
            },
            end: Position {
                line,
                character: column + 1,
            },
        },
        severity: Some(match finding.severity {
            FindingSeverity::Error => DiagnosticSeverity::ERROR,
            FindingSeverity::Warning => DiagnosticSeverity::WARNING,
            FindingSeverity::Info => DiagnosticSeverity::INFORMATION,
            FindingSeverity::Hint => DiagnosticSeverity::HINT,
        }),
        code: if finding.code.is_empty() {
            None
        } else {
            Some(NumberOrString::String(finding.code.clone()))
        },
        source: Some("mlint".to_string()),
        message: finding.message.clone(),
        ..Default::default()
    }
}

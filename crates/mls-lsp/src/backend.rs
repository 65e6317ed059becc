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

//! LSP backend: protocol wiring over the document store, parse cache,
//! symbol index and diagnostics pipeline.
//!
//! Every content change runs the same path: store the text, parse it
//! (cache-checked by content hash), atomically swap the file's symbols in
//! the index, and schedule the diagnostics pipeline. Query handlers are
//! read-only over the index; they validate positions at this boundary and
//! treat unknown files as empty results, not errors.

use std::sync::Arc;

use tower_lsp::jsonrpc::{Error, Result};
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};
use tracing::{debug, info, warn};

use mls_core::{parse, Outline};
use mls_mlint::MlintRunner;

use crate::cache::ResultCache;
use crate::completion::get_completions;
use crate::config::ServerConfig;
use crate::constants::MAX_DOCUMENT_SIZE;
use crate::documents::DocumentStore;
use crate::hover::get_hover;
use crate::index::SymbolIndex;
use crate::navigation::{get_definitions, get_references};
use crate::pipeline::DiagnosticsPipeline;
use crate::symbols::{get_document_symbols, get_workspace_symbols};
use crate::utils::prefix_at;

/// MATLAB language server backend.
pub struct MatlabLanguageServer {
    config: ServerConfig,
    store: Arc<DocumentStore>,
    index: Arc<SymbolIndex>,
    outlines: ResultCache<Arc<Outline>>,
    pipeline: DiagnosticsPipeline<Client>,
}

impl MatlabLanguageServer {
    /// Build a server with configuration from the working directory.
    pub fn new(client: Client) -> Self {
        let mut config = ServerConfig::load(
            &std::env::current_dir().unwrap_or_else(|_| ".".into()),
        )
        .unwrap_or_else(|error| {
            warn!("{}; using defaults", error);
            ServerConfig::default()
        });
        config.apply_env();
        Self::with_config(client, config)
    }

    pub fn with_config(client: Client, config: ServerConfig) -> Self {
        let store = Arc::new(DocumentStore::new(MAX_DOCUMENT_SIZE));
        let index = Arc::new(SymbolIndex::new());
        let runner = MlintRunner::new(config.analyzer_path.clone(), config.analyzer_timeout());
        let pipeline =
            DiagnosticsPipeline::new(client, store.clone(), index.clone(), runner, &config);
        Self {
            outlines: ResultCache::new("parse", config.cache_capacity, config.cache_ttl()),
            config,
            store,
            index,
            pipeline,
        }
    }

    /// Shared change path for open/change/save.
    fn notify_change(&self, uri: &Url, content: &str) {
        if !self.store.insert_or_update(uri, content) {
            warn!("ignoring oversized update for {}", uri);
            return;
        }

        let hash = mls_core::hash_source(content);
        let outline = match self.outlines.get(hash) {
            Some(outline) => outline,
            None => {
                let outline = Arc::new(parse(content));
                self.outlines.put(hash, outline.clone());
                outline
            }
        };

        self.index.update(uri, outline);
        self.pipeline.schedule(uri);
    }

    async fn notify_close(&self, uri: &Url) {
        self.store.remove(uri);
        self.index.remove(uri);
        self.pipeline.clear(uri).await;
    }

    /// Reject positions beyond the document before they reach the index.
    /// An unknown document is not an error (the file may simply not be
    /// open); the caller returns an empty result for it.
    fn validate_position(&self, uri: &Url, position: Position) -> Result<()> {
        if let Some(lines) = self.store.line_count(uri) {
            if position.line as usize >= lines {
                return Err(Error::invalid_params(format!(
                    "line {} is beyond the end of {} ({} lines)",
                    position.line, uri, lines
                )));
            }
        }
        Ok(())
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for MatlabLanguageServer {
    async fn initialize(&self, _params: InitializeParams) -> Result<InitializeResult> {
        info!("MATLAB language server initializing");

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(
                    TextDocumentSyncOptions {
                        open_close: Some(true),
                        change: Some(TextDocumentSyncKind::FULL),
                        will_save: None,
                        will_save_wait_until: None,
                        save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
                            include_text: Some(true),
                        })),
                    },
                )),
                completion_provider: Some(CompletionOptions {
                    resolve_provider: Some(false),
                    trigger_characters: None,
                    work_done_progress_options: Default::default(),
                    all_commit_characters: None,
                    completion_item: None,
                }),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                definition_provider: Some(OneOf::Left(true)),
                references_provider: Some(OneOf::Left(true)),
                document_symbol_provider: Some(OneOf::Left(true)),
                workspace_symbol_provider: Some(OneOf::Left(true)),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "mls-lsp".to_string(),
                version: Some(crate::VERSION.to_string()),
            }),
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        info!(
            "MATLAB language server initialized (analyzer: {})",
            if self.config.analyzer_path.is_some() {
                "configured"
            } else {
                "auto-discovered or disabled"
            }
        );
    }

    async fn shutdown(&self) -> Result<()> {
        info!("MATLAB language server shutting down");
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        debug!(
            "document opened: {} ({} bytes)",
            uri,
            params.text_document.text.len()
        );
        self.notify_change(&uri, &params.text_document.text);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        // Full sync: the last change carries the whole document.
        if let Some(change) = params.content_changes.into_iter().last() {
            self.notify_change(&uri, &change.text);
        } else {
            warn!("change event for {} had no content", uri);
        }
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        if let Some(text) = params.text {
            self.notify_change(&params.text_document.uri, &text);
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        debug!("document closed: {}", params.text_document.uri);
        self.notify_close(&params.text_document.uri).await;
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = &params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;
        self.validate_position(uri, position)?;

        let Some(content) = self.store.content(uri) else {
            return Ok(None);
        };
        let prefix = content
            .lines()
            .nth(position.line as usize)
            .map(|line| prefix_at(line, position.character as usize))
            .unwrap_or_default();

        let items = get_completions(&self.index, &prefix, self.config.max_completions);
        debug!(
            "completion for {} with prefix '{}': {} items",
            uri,
            prefix,
            items.len()
        );
        Ok(Some(CompletionResponse::Array(items)))
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        self.validate_position(uri, position)?;

        let Some(content) = self.store.content(uri) else {
            return Ok(None);
        };
        Ok(get_hover(&self.index, &content, uri, position))
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        self.validate_position(uri, position)?;

        let Some(content) = self.store.content(uri) else {
            return Ok(None);
        };
        Ok(get_definitions(&self.index, &content, position))
    }

    async fn references(&self, params: ReferenceParams) -> Result<Option<Vec<Location>>> {
        let uri = &params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;
        self.validate_position(uri, position)?;

        let Some(content) = self.store.content(uri) else {
            return Ok(None);
        };
        let documents = self.store.snapshot();
        Ok(Some(get_references(
            &self.index,
            &documents,
            &content,
            position,
            params.context.include_declaration,
        )))
    }

    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> Result<Option<DocumentSymbolResponse>> {
        let uri = &params.text_document.uri;
        let Some(file) = self.index.symbols_in(uri) else {
            return Ok(None);
        };
        Ok(Some(DocumentSymbolResponse::Nested(get_document_symbols(
            &file.outline,
        ))))
    }

    async fn symbol(
        &self,
        params: WorkspaceSymbolParams,
    ) -> Result<Option<Vec<SymbolInformation>>> {
        Ok(Some(get_workspace_symbols(&self.index, &params.query)))
    }
}

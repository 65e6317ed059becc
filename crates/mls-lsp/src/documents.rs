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

//! Open-document store.
//!
//! Holds the current in-memory text for every open buffer, keyed by URI.
//! The host protocol controls the set of open documents (open/close), so
//! there is no eviction here; capacity pressure is the result cache's
//! concern. Content is stored as a `ropey::Rope` with a content hash for
//! change detection.

use dashmap::DashMap;
use parking_lot::Mutex;
use ropey::Rope;
use std::sync::Arc;
use tower_lsp::lsp_types::Url;
use tracing::{debug, warn};

pub use mls_core::hash_source;

/// State of one open buffer.
pub struct DocumentState {
    pub rope: Rope,
    pub content_hash: u64,
}

/// Store of open documents. Safe to share across tasks.
pub struct DocumentStore {
    documents: DashMap<Url, Arc<Mutex<DocumentState>>>,
    max_document_size: usize,
}

impl DocumentStore {
    pub fn new(max_document_size: usize) -> Self {
        Self {
            documents: DashMap::new(),
            max_document_size,
        }
    }

    /// Insert or replace a document's content. Returns `false` when the
    /// buffer exceeds the size limit and was rejected.
    pub fn insert_or_update(&self, uri: &Url, content: &str) -> bool {
        if content.len() > self.max_document_size {
            warn!(
                "document {} rejected: {} bytes > {} byte limit",
                uri,
                content.len(),
                self.max_document_size
            );
            return false;
        }

        let hash = hash_source(content);
        if let Some(entry) = self.documents.get(uri) {
            let mut state = entry.lock();
            if state.content_hash != hash {
                state.rope = Rope::from_str(content);
                state.content_hash = hash;
            }
        } else {
            debug!("document opened: {} ({} bytes)", uri, content.len());
            self.documents.insert(
                uri.clone(),
                Arc::new(Mutex::new(DocumentState {
                    rope: Rope::from_str(content),
                    content_hash: hash,
                })),
            );
        }
        true
    }

    pub fn contains(&self, uri: &Url) -> bool {
        self.documents.contains_key(uri)
    }

    pub fn content(&self, uri: &Url) -> Option<String> {
        self.documents.get(uri).map(|entry| {
            let state = entry.lock();
            state.rope.to_string()
        })
    }

    pub fn content_hash(&self, uri: &Url) -> Option<u64> {
        self.documents.get(uri).map(|entry| entry.lock().content_hash)
    }

    pub fn line_count(&self, uri: &Url) -> Option<usize> {
        self.documents
            .get(uri)
            .map(|entry| entry.lock().rope.len_lines())
    }

    /// Remove a closed document. Idempotent.
    pub fn remove(&self, uri: &Url) -> bool {
        self.documents.remove(uri).is_some()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Snapshot of all open documents, for workspace-wide text scans.
    pub fn snapshot(&self) -> Vec<(Url, String)> {
        self.documents
            .iter()
            .map(|entry| {
                let state = entry.value().lock();
                (entry.key().clone(), state.rope.to_string())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(name: &str) -> Url {
        Url::parse(&format!("file:///{name}")).unwrap()
    }

    #[test]
    fn insert_get_remove() {
        let store = DocumentStore::new(1024);
        let u = uri("a.m");
        assert!(store.insert_or_update(&u, "x = 1;\n"));
        assert_eq!(store.content(&u).as_deref(), Some("x = 1;\n"));
        assert!(store.contains(&u));
        assert!(store.remove(&u));
        assert!(!store.remove(&u));
        assert!(store.content(&u).is_none());
    }

    #[test]
    fn update_changes_hash_only_on_new_content() {
        let store = DocumentStore::new(1024);
        let u = uri("a.m");
        store.insert_or_update(&u, "x = 1;");
        let h1 = store.content_hash(&u).unwrap();
        store.insert_or_update(&u, "x = 1;");
        assert_eq!(store.content_hash(&u).unwrap(), h1);
        store.insert_or_update(&u, "x = 2;");
        assert_ne!(store.content_hash(&u).unwrap(), h1);
    }

    #[test]
    fn size_limit_rejects() {
        let store = DocumentStore::new(8);
        let u = uri("big.m");
        assert!(!store.insert_or_update(&u, "a very long buffer"));
        assert!(!store.contains(&u));
    }

    #[test]
    fn snapshot_covers_all_documents() {
        let store = DocumentStore::new(1024);
        store.insert_or_update(&uri("a.m"), "a");
        store.insert_or_update(&uri("b.m"), "b");
        let snap = store.snapshot();
        assert_eq!(snap.len(), 2);
    }

    #[test]
    fn line_count_reflects_content() {
        let store = DocumentStore::new(1024);
        let u = uri("a.m");
        store.insert_or_update(&u, "one\ntwo\nthree");
        assert_eq!(store.line_count(&u), Some(3));
    }
}

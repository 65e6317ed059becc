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

//! Cross-module tests exercising the change path the backend drives:
//! store text, parse through the cache, swap the index, query.

#[cfg(test)]
mod change_path_tests {
    use crate::cache::ResultCache;
    use crate::completion::get_completions;
    use crate::documents::DocumentStore;
    use crate::index::{MatchMode, SymbolIndex};
    use mls_core::{hash_source, parse, Outline};
    use std::sync::Arc;
    use std::time::Duration;
    use tower_lsp::lsp_types::Url;

    struct Harness {
        store: DocumentStore,
        index: SymbolIndex,
        outlines: ResultCache<Arc<Outline>>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                store: DocumentStore::new(1024 * 1024),
                index: SymbolIndex::new(),
                outlines: ResultCache::new("parse", 16, Duration::from_secs(60)),
            }
        }

        /// The backend's notify_change, minus the pipeline.
        fn change(&self, uri: &Url, content: &str) {
            assert!(self.store.insert_or_update(uri, content));
            let hash = hash_source(content);
            let outline = match self.outlines.get(hash) {
                Some(outline) => outline,
                None => {
                    let outline = Arc::new(parse(content));
                    self.outlines.put(hash, outline.clone());
                    outline
                }
            };
            self.index.update(uri, outline);
        }

        fn close(&self, uri: &Url) {
            self.store.remove(uri);
            self.index.remove(uri);
        }
    }

    fn uri(name: &str) -> Url {
        Url::parse(&format!("file:///{name}")).unwrap()
    }

    #[test]
    fn open_change_close_lifecycle() {
        let h = Harness::new();
        let u = uri("a.m");

        h.change(&u, "function first()\nend");
        assert_eq!(h.index.find_by_name("first", MatchMode::Exact).len(), 1);

        h.change(&u, "function second()\nend");
        assert!(h.index.find_by_name("first", MatchMode::Exact).is_empty());
        assert_eq!(h.index.find_by_name("second", MatchMode::Exact).len(), 1);

        h.close(&u);
        assert!(h.index.find_by_name("second", MatchMode::Exact).is_empty());
        assert_eq!(h.index.stats().files, 0);
    }

    #[test]
    fn reopening_identical_content_hits_the_parse_cache() {
        let h = Harness::new();
        let src = "function cached()\nend";

        h.change(&uri("a.m"), src);
        h.change(&uri("b.m"), src);

        let stats = h.outlines.statistics();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);

        // Both files are indexed independently despite the shared outline.
        assert_eq!(h.index.find_by_name("cached", MatchMode::Exact).len(), 2);
    }

    #[test]
    fn changed_content_is_a_new_cache_key() {
        let h = Harness::new();
        let u = uri("a.m");
        h.change(&u, "function v1()\nend");
        h.change(&u, "function v2()\nend");

        let stats = h.outlines.statistics();
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.hits, 0);
    }

    #[test]
    fn completion_sees_symbols_from_all_open_files() {
        let h = Harness::new();
        h.change(&uri("a.m"), "function alpha_one()\nend");
        h.change(&uri("b.m"), "function alpha_two()\nend");

        let items = get_completions(&h.index, "alpha", 50);
        let labels: Vec<_> = items.iter().map(|i| i.label.as_str()).collect();
        assert!(labels.contains(&"alpha_one"));
        assert!(labels.contains(&"alpha_two"));
    }

    #[test]
    fn parse_diagnostics_travel_with_the_outline() {
        let h = Harness::new();
        let u = uri("broken.m");
        h.change(&u, "function truncated()\nx = 1;");

        let file = h.index.symbols_in(&u).unwrap();
        assert_eq!(file.outline.diagnostics.len(), 1);
        // The entry is still indexed with its end defaulted to EOF.
        let sym = &h.index.find_by_name("truncated", MatchMode::Exact)[0];
        assert_eq!(sym.end_line, 2);
    }
}

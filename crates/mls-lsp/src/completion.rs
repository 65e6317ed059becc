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

//! Code completion.
//!
//! Candidates come from three pools: indexed symbols across all open
//! files, the built-in function table, and the keyword table. Ranking is
//! exact match first, then prefix match, then substring match, ties broken
//! alphabetically; the result is capped at the configured maximum.

use tower_lsp::lsp_types::{
    CompletionItem, CompletionItemKind, Documentation, MarkupContent, MarkupKind,
};

use mls_core::{Builtin, BUILTIN_FUNCTIONS, KEYWORDS};

use crate::index::{MatchMode, SymbolIndex, SymbolKind};

/// Relevance tier: 0 exact, 1 prefix, 2 substring. Candidates that do not
/// even contain the prefix are filtered before ranking.
fn rank(label: &str, prefix: &str) -> u8 {
    let label = label.to_lowercase();
    let prefix = prefix.to_lowercase();
    if label == prefix {
        0
    } else if label.starts_with(&prefix) {
        1
    } else {
        2
    }
}

fn symbol_completion_kind(kind: SymbolKind) -> CompletionItemKind {
    match kind {
        SymbolKind::Function => CompletionItemKind::FUNCTION,
        SymbolKind::Method => CompletionItemKind::METHOD,
        SymbolKind::Class => CompletionItemKind::CLASS,
        SymbolKind::Property => CompletionItemKind::PROPERTY,
        SymbolKind::Variable => CompletionItemKind::VARIABLE,
    }
}

/// Collect, rank and cap completion candidates for a prefix.
pub fn get_completions(index: &SymbolIndex, prefix: &str, max_results: usize) -> Vec<CompletionItem> {
    let mut items = Vec::new();

    for symbol in index.find_by_name(prefix, MatchMode::Substring) {
        items.push(CompletionItem {
            label: symbol.name.clone(),
            kind: Some(symbol_completion_kind(symbol.kind)),
            detail: Some(symbol.detail.clone()),
            documentation: symbol.documentation.clone().map(|doc| {
                Documentation::MarkupContent(MarkupContent {
                    kind: MarkupKind::Markdown,
                    value: doc,
                })
            }),
            filter_text: Some(symbol.name.clone()),
            ..Default::default()
        });
    }

    let prefix_lower = prefix.to_lowercase();
    for Builtin { name, detail } in BUILTIN_FUNCTIONS {
        if prefix.is_empty() || name.contains(prefix_lower.as_str()) {
            items.push(CompletionItem {
                label: (*name).to_string(),
                kind: Some(CompletionItemKind::FUNCTION),
                detail: Some((*detail).to_string()),
                filter_text: Some((*name).to_string()),
                ..Default::default()
            });
        }
    }
    for keyword in KEYWORDS {
        if prefix.is_empty() || keyword.contains(prefix_lower.as_str()) {
            items.push(CompletionItem {
                label: (*keyword).to_string(),
                kind: Some(CompletionItemKind::KEYWORD),
                detail: Some("keyword".to_string()),
                filter_text: Some((*keyword).to_string()),
                ..Default::default()
            });
        }
    }

    // Same label from several pools (a shadowed builtin, the same name in
    // two files): keep the first occurrence, which prefers index symbols.
    items.sort_by(|a, b| {
        (rank(&a.label, prefix), a.label.to_lowercase())
            .cmp(&(rank(&b.label, prefix), b.label.to_lowercase()))
    });
    items.dedup_by(|a, b| a.label == b.label);

    for item in &mut items {
        item.sort_text = Some(format!("{}:{}", rank(&item.label, prefix), item.label));
    }

    items.truncate(max_results);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use mls_core::parse;
    use std::sync::Arc;
    use tower_lsp::lsp_types::Url;

    fn index_with(src: &str) -> SymbolIndex {
        let index = SymbolIndex::new();
        let uri = Url::parse("file:///a.m").unwrap();
        index.update(&uri, Arc::new(parse(src)));
        index
    }

    #[test]
    fn ranking_exact_then_prefix_then_substring() {
        let index = index_with(
            "function plot()\nend\nfunction plot3(x)\nend\nfunction my_plot()\nend",
        );
        let items = get_completions(&index, "plot", 50);
        let labels: Vec<_> = items.iter().map(|i| i.label.as_str()).collect();

        let plot = labels.iter().position(|&l| l == "plot").unwrap();
        let plot3 = labels.iter().position(|&l| l == "plot3").unwrap();
        let my_plot = labels.iter().position(|&l| l == "my_plot").unwrap();
        assert!(plot < plot3);
        assert!(plot3 < my_plot);
    }

    #[test]
    fn result_cap_is_enforced() {
        let index = index_with("function f()\nend");
        let items = get_completions(&index, "", 5);
        assert_eq!(items.len(), 5);
    }

    #[test]
    fn builtins_and_keywords_are_offered() {
        let index = SymbolIndex::new();
        let items = get_completions(&index, "whi", 50);
        let labels: Vec<_> = items.iter().map(|i| i.label.as_str()).collect();
        assert!(labels.contains(&"while"));
        assert!(labels.contains(&"which"));
    }

    #[test]
    fn index_symbol_shadows_builtin_of_same_name() {
        let index = index_with("function plot(x)\nend");
        let items = get_completions(&index, "plot", 50);
        let plot_items: Vec<_> = items.iter().filter(|i| i.label == "plot").collect();
        assert_eq!(plot_items.len(), 1);
        // The indexed symbol's signature wins over the builtin detail.
        assert_eq!(plot_items[0].detail.as_deref(), Some("function plot(x)"));
    }

    #[test]
    fn empty_prefix_returns_capped_everything() {
        let index = index_with("function alpha()\nend");
        let items = get_completions(&index, "", 1000);
        assert!(items.iter().any(|i| i.label == "alpha"));
        assert!(items.iter().any(|i| i.label == "end"));
        assert!(items.iter().any(|i| i.label == "plot"));
    }

    #[test]
    fn sort_text_encodes_rank() {
        let index = index_with("function plot3(x)\nend");
        let items = get_completions(&index, "plot3", 10);
        let first = &items[0];
        assert_eq!(first.label, "plot3");
        assert_eq!(first.sort_text.as_deref(), Some("0:plot3"));
    }
}

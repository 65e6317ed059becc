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

//! Symbol index: outlines from many files aggregated into queryable tables.
//!
//! Two complementary tables are layered over the same `Arc<Symbol>`
//! records: by-file (update, removal, outline queries) and by-name
//! (search). `update` builds the full replacement for a file locally and
//! swaps it in under a single write guard, so a concurrent reader sees
//! either the old complete symbol set or the new one — never a partial
//! mix. Name matching is case-insensitive throughout, following MATLAB's
//! tooling conventions for lookup.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tower_lsp::lsp_types::Url;
use tracing::debug;

use mls_core::{ClassEntry, FunctionEntry, Outline, VariableEntry};

/// Kind discriminant for an indexed symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Function,
    Method,
    Class,
    Property,
    Variable,
}

impl SymbolKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Method => "method",
            Self::Class => "class",
            Self::Property => "property",
            Self::Variable => "variable",
        }
    }
}

/// A named, positioned entity derived from an outline.
///
/// Lines and columns are 1-based (outline convention); handlers convert to
/// 0-based LSP positions at the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    /// Qualified path: `Class.method` for methods, `outer>inner` for
    /// nested functions, the plain name otherwise.
    pub qualified: String,
    pub kind: SymbolKind,
    pub uri: Url,
    pub line: u32,
    pub column: u32,
    pub end_line: u32,
    /// Signature text, e.g. `function [a, b] = pair(x)`.
    pub detail: String,
    pub documentation: Option<String>,
    /// Enclosing scope name (class or parent function).
    pub container: Option<String>,
}

/// How `find_by_name` matches the query against symbol names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Exact,
    Prefix,
    Substring,
}

/// Counts per kind, for the stats query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub files: usize,
    pub total: usize,
    pub functions: usize,
    pub methods: usize,
    pub classes: usize,
    pub properties: usize,
    pub variables: usize,
}

/// Per-file view: the outline a file's symbols were derived from plus the
/// derived records themselves.
pub struct FileSymbols {
    pub outline: Arc<Outline>,
    pub symbols: Vec<Arc<Symbol>>,
}

#[derive(Default)]
struct IndexInner {
    by_file: HashMap<Url, Arc<FileSymbols>>,
    /// Lowercased name -> records across all files.
    by_name: HashMap<String, Vec<Arc<Symbol>>>,
}

/// The aggregate index. Shared behind `Arc`; all operations take a single
/// lock guard, so no reader can observe a half-applied update.
#[derive(Default)]
pub struct SymbolIndex {
    inner: RwLock<IndexInner>,
}

impl SymbolIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically replace all symbols owned by `uri` with the ones derived
    /// from `outline`.
    pub fn update(&self, uri: &Url, outline: Arc<Outline>) {
        let symbols = symbols_from_outline(uri, &outline);
        debug!("indexing {}: {} symbols", uri, symbols.len());
        let file = Arc::new(FileSymbols {
            outline,
            symbols: symbols.clone(),
        });

        let mut inner = self.inner.write();
        Self::remove_locked(&mut inner, uri);
        for symbol in symbols {
            inner
                .by_name
                .entry(symbol.name.to_lowercase())
                .or_default()
                .push(symbol);
        }
        inner.by_file.insert(uri.clone(), file);
    }

    /// Delete all symbols owned by `uri`. Idempotent.
    pub fn remove(&self, uri: &Url) {
        let mut inner = self.inner.write();
        Self::remove_locked(&mut inner, uri);
    }

    fn remove_locked(inner: &mut IndexInner, uri: &Url) {
        if inner.by_file.remove(uri).is_none() {
            return;
        }
        inner.by_name.retain(|_, records| {
            records.retain(|s| &s.uri != uri);
            !records.is_empty()
        });
    }

    /// All symbols whose name matches `query` under `mode`, across all
    /// files, in a stable order.
    pub fn find_by_name(&self, query: &str, mode: MatchMode) -> Vec<Arc<Symbol>> {
        let needle = query.to_lowercase();
        let inner = self.inner.read();

        let mut result: Vec<Arc<Symbol>> = match mode {
            MatchMode::Exact => inner.by_name.get(&needle).cloned().unwrap_or_default(),
            MatchMode::Prefix => inner
                .by_name
                .iter()
                .filter(|(name, _)| name.starts_with(&needle))
                .flat_map(|(_, records)| records.iter().cloned())
                .collect(),
            MatchMode::Substring => inner
                .by_name
                .iter()
                .filter(|(name, _)| name.contains(&needle))
                .flat_map(|(_, records)| records.iter().cloned())
                .collect(),
        };

        result.sort_by(|a, b| {
            (a.name.as_str(), a.uri.as_str(), a.line).cmp(&(b.name.as_str(), b.uri.as_str(), b.line))
        });
        result
    }

    /// The innermost symbol whose declared range contains the position, or
    /// `None`. Position is 1-based.
    pub fn find_at_position(&self, uri: &Url, line: u32, _column: u32) -> Option<Arc<Symbol>> {
        let inner = self.inner.read();
        let file = inner.by_file.get(uri)?;
        file.symbols
            .iter()
            .filter(|s| s.line <= line && line <= s.end_line)
            .min_by_key(|s| s.end_line - s.line)
            .cloned()
    }

    /// Per-file symbols plus the outline they came from, for structure
    /// views. `None` for files that were never indexed.
    pub fn symbols_in(&self, uri: &Url) -> Option<Arc<FileSymbols>> {
        self.inner.read().by_file.get(uri).cloned()
    }

    pub fn stats(&self) -> IndexStats {
        let inner = self.inner.read();
        let mut stats = IndexStats {
            files: inner.by_file.len(),
            ..IndexStats::default()
        };
        for file in inner.by_file.values() {
            for symbol in &file.symbols {
                stats.total += 1;
                match symbol.kind {
                    SymbolKind::Function => stats.functions += 1,
                    SymbolKind::Method => stats.methods += 1,
                    SymbolKind::Class => stats.classes += 1,
                    SymbolKind::Property => stats.properties += 1,
                    SymbolKind::Variable => stats.variables += 1,
                }
            }
        }
        stats
    }
}

// --- Outline -> symbol derivation ---

fn symbols_from_outline(uri: &Url, outline: &Outline) -> Vec<Arc<Symbol>> {
    let mut symbols = Vec::with_capacity(outline.symbol_count());

    for function in &outline.functions {
        symbols.push(Arc::new(function_symbol(uri, function)));
    }

    for class in &outline.classes {
        symbols.push(Arc::new(class_symbol(uri, class)));
        for property in &class.properties {
            symbols.push(Arc::new(Symbol {
                name: property.name.clone(),
                qualified: format!("{}.{}", class.name, property.name),
                kind: SymbolKind::Property,
                uri: uri.clone(),
                line: property.line,
                column: property.column,
                end_line: property.line,
                detail: format!("property {}", property.name),
                documentation: None,
                container: Some(class.name.clone()),
            }));
        }
        for method in &class.methods {
            symbols.push(Arc::new(function_symbol(uri, method)));
        }
    }

    for variable in &outline.variables {
        symbols.push(Arc::new(variable_symbol(uri, variable)));
    }

    symbols
}

fn function_symbol(uri: &Url, entry: &FunctionEntry) -> Symbol {
    let (kind, qualified, container) = match (&entry.class, &entry.parent_function) {
        (Some(class), _) => (
            SymbolKind::Method,
            format!("{}.{}", class, entry.name),
            Some(class.clone()),
        ),
        (None, Some(parent)) => (
            SymbolKind::Function,
            format!("{}>{}", parent, entry.name),
            Some(parent.clone()),
        ),
        (None, None) => (SymbolKind::Function, entry.name.clone(), None),
    };
    Symbol {
        name: entry.name.clone(),
        qualified,
        kind,
        uri: uri.clone(),
        line: entry.line,
        column: entry.column,
        end_line: entry.end_line,
        detail: format!("function {}", entry.signature()),
        documentation: entry.doc.clone(),
        container,
    }
}

fn class_symbol(uri: &Url, entry: &ClassEntry) -> Symbol {
    let detail = if entry.superclasses.is_empty() {
        format!("classdef {}", entry.name)
    } else {
        format!("classdef {} < {}", entry.name, entry.superclasses.join(" & "))
    };
    Symbol {
        name: entry.name.clone(),
        qualified: entry.name.clone(),
        kind: SymbolKind::Class,
        uri: uri.clone(),
        line: entry.line,
        column: entry.column,
        end_line: entry.end_line,
        detail,
        documentation: entry.doc.clone(),
        container: None,
    }
}

fn variable_symbol(uri: &Url, entry: &VariableEntry) -> Symbol {
    Symbol {
        name: entry.name.clone(),
        qualified: entry.name.clone(),
        kind: SymbolKind::Variable,
        uri: uri.clone(),
        line: entry.line,
        column: entry.column,
        end_line: entry.line,
        detail: format!("{} {}", entry.scope, entry.name),
        documentation: None,
        container: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mls_core::parse;

    fn uri(name: &str) -> Url {
        Url::parse(&format!("file:///{name}")).unwrap()
    }

    fn index_source(index: &SymbolIndex, name: &str, src: &str) -> Url {
        let u = uri(name);
        index.update(&u, Arc::new(parse(src)));
        u
    }

    #[test]
    fn update_then_query_round_trip() {
        let index = SymbolIndex::new();
        let u = index_source(&index, "a.m", "function foo()\nend\nfunction bar()\nend");

        let found = index.find_by_name("foo", MatchMode::Exact);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].uri, u);
        assert_eq!(found[0].kind, SymbolKind::Function);

        let file = index.symbols_in(&u).unwrap();
        assert_eq!(file.symbols.len(), 2);
    }

    #[test]
    fn index_mirrors_outline_after_update() {
        let index = SymbolIndex::new();
        let src = "classdef C\nproperties\np\nend\nmethods\nfunction m(obj)\nend\nend\nend";
        let u = index_source(&index, "c.m", src);

        let file = index.symbols_in(&u).unwrap();
        let names: Vec<_> = file.symbols.iter().map(|s| s.qualified.clone()).collect();
        assert!(names.contains(&"C".to_string()));
        assert!(names.contains(&"C.p".to_string()));
        assert!(names.contains(&"C.m".to_string()));
        assert_eq!(file.symbols.len(), file.outline.symbol_count());
    }

    #[test]
    fn update_replaces_wholesale() {
        let index = SymbolIndex::new();
        let u = index_source(&index, "a.m", "function old_name()\nend");
        index.update(&u, Arc::new(parse("function new_name()\nend")));

        assert!(index.find_by_name("old_name", MatchMode::Exact).is_empty());
        assert_eq!(index.find_by_name("new_name", MatchMode::Exact).len(), 1);
        assert_eq!(index.symbols_in(&u).unwrap().symbols.len(), 1);
    }

    #[test]
    fn remove_is_idempotent_and_complete() {
        let index = SymbolIndex::new();
        let u = index_source(&index, "a.m", "function foo()\nend");
        index.remove(&u);
        index.remove(&u);

        assert!(index.find_by_name("foo", MatchMode::Exact).is_empty());
        assert!(index.symbols_in(&u).is_none());
        assert_eq!(index.stats().files, 0);
    }

    #[test]
    fn unknown_file_yields_empty_results() {
        let index = SymbolIndex::new();
        assert!(index.symbols_in(&uri("ghost.m")).is_none());
        assert!(index.find_at_position(&uri("ghost.m"), 1, 1).is_none());
    }

    #[test]
    fn match_modes() {
        let index = SymbolIndex::new();
        index_source(
            &index,
            "a.m",
            "function plot_data()\nend\nfunction replot()\nend\nfunction zoom()\nend",
        );

        assert_eq!(index.find_by_name("plot_data", MatchMode::Exact).len(), 1);
        assert_eq!(index.find_by_name("plot", MatchMode::Prefix).len(), 1);
        assert_eq!(index.find_by_name("plot", MatchMode::Substring).len(), 2);
        assert!(index.find_by_name("plot", MatchMode::Exact).is_empty());
    }

    #[test]
    fn name_matching_is_case_insensitive() {
        let index = SymbolIndex::new();
        index_source(&index, "a.m", "function MyFunc()\nend");
        assert_eq!(index.find_by_name("myfunc", MatchMode::Exact).len(), 1);
        assert_eq!(index.find_by_name("MYFUNC", MatchMode::Exact).len(), 1);
    }

    #[test]
    fn matches_across_files_are_tagged_with_owner() {
        let index = SymbolIndex::new();
        let a = index_source(&index, "a.m", "function shared()\nend");
        let b = index_source(&index, "b.m", "function shared()\nend");

        let found = index.find_by_name("shared", MatchMode::Exact);
        assert_eq!(found.len(), 2);
        let owners: Vec<_> = found.iter().map(|s| s.uri.clone()).collect();
        assert!(owners.contains(&a));
        assert!(owners.contains(&b));
    }

    #[test]
    fn innermost_symbol_wins_at_position() {
        let index = SymbolIndex::new();
        let src = "function outer()\nfunction inner()\nx = 1;\nend\nend";
        let u = index_source(&index, "a.m", src);

        let at_inner = index.find_at_position(&u, 3, 1).unwrap();
        assert_eq!(at_inner.name, "inner");
        let at_outer = index.find_at_position(&u, 5, 1).unwrap();
        assert_eq!(at_outer.name, "outer");
        assert!(index.find_at_position(&u, 40, 1).is_none());
    }

    #[test]
    fn stats_count_by_kind() {
        let index = SymbolIndex::new();
        index_source(
            &index,
            "a.m",
            "classdef C\nproperties\np\nend\nmethods\nfunction m(obj)\nend\nend\nend",
        );
        index_source(&index, "b.m", "function f()\nglobal g\nend");

        let stats = index.stats();
        assert_eq!(stats.files, 2);
        assert_eq!(stats.classes, 1);
        assert_eq!(stats.properties, 1);
        assert_eq!(stats.methods, 1);
        assert_eq!(stats.functions, 1);
        assert_eq!(stats.variables, 1);
        assert_eq!(stats.total, 5);
    }

    #[test]
    fn method_qualification_and_detail() {
        let index = SymbolIndex::new();
        let u = index_source(
            &index,
            "c.m",
            "classdef C\nmethods\nfunction out = go(obj, x)\nend\nend\nend",
        );
        let file = index.symbols_in(&u).unwrap();
        let method = file
            .symbols
            .iter()
            .find(|s| s.kind == SymbolKind::Method)
            .unwrap();
        assert_eq!(method.qualified, "C.go");
        assert_eq!(method.detail, "function out = go(obj, x)");
        assert_eq!(method.container.as_deref(), Some("C"));
    }
}

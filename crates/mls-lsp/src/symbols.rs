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

//! Document and workspace symbol providers.
//!
//! Document symbols reconstruct the outline hierarchy: classes contain
//! their properties and methods, functions contain their nested functions.
//! Workspace symbols are a flat, query-filtered list over the whole index.

use tower_lsp::lsp_types::{
    DocumentSymbol, Location, Position, Range, SymbolInformation, SymbolKind as LspSymbolKind,
};

use mls_core::{ClassEntry, FunctionEntry, Outline};

use crate::constants::{LINE_END_CHAR, LINE_NUMBER_OFFSET};
use crate::index::{MatchMode, SymbolIndex, SymbolKind};

fn lsp_kind(kind: SymbolKind) -> LspSymbolKind {
    match kind {
        SymbolKind::Function => LspSymbolKind::FUNCTION,
        SymbolKind::Method => LspSymbolKind::METHOD,
        SymbolKind::Class => LspSymbolKind::CLASS,
        SymbolKind::Property => LspSymbolKind::PROPERTY,
        SymbolKind::Variable => LspSymbolKind::VARIABLE,
    }
}

fn span_range(line: u32, end_line: u32) -> Range {
    Range {
        start: Position {
            line: line.saturating_sub(LINE_NUMBER_OFFSET),
            character: 0,
        },
        end: Position {
            line: end_line.saturating_sub(LINE_NUMBER_OFFSET),
            character: LINE_END_CHAR,
        },
    }
}

fn selection_range(line: u32, column: u32, name: &str) -> Range {
    let line = line.saturating_sub(LINE_NUMBER_OFFSET);
    let start = column.saturating_sub(1);
    Range {
        start: Position {
            line,
            character: start,
        },
        end: Position {
            line,
            character: start + name.chars().count() as u32,
        },
    }
}

#[allow(deprecated)]
fn function_symbol(entry: &FunctionEntry, children: Vec<DocumentSymbol>) -> DocumentSymbol {
    DocumentSymbol {
        name: entry.name.clone(),
        detail: Some(entry.signature()),
        kind: if entry.class.is_some() {
            LspSymbolKind::METHOD
        } else {
            LspSymbolKind::FUNCTION
        },
        tags: None,
        deprecated: None,
        range: span_range(entry.line, entry.end_line),
        selection_range: selection_range(entry.line, entry.column, &entry.name),
        children: if children.is_empty() {
            None
        } else {
            Some(children)
        },
    }
}

#[allow(deprecated)]
fn class_symbol(entry: &ClassEntry) -> DocumentSymbol {
    let mut children = Vec::new();

    for property in &entry.properties {
        children.push(DocumentSymbol {
            name: property.name.clone(),
            detail: None,
            kind: LspSymbolKind::PROPERTY,
            tags: None,
            deprecated: None,
            range: span_range(property.line, property.line),
            selection_range: selection_range(property.line, property.column, &property.name),
            children: None,
        });
    }
    for method in &entry.methods {
        children.push(function_symbol(method, Vec::new()));
    }
    children.sort_by_key(|s| s.range.start.line);

    DocumentSymbol {
        name: entry.name.clone(),
        detail: Some(format!("{} properties, {} methods", entry.properties.len(), entry.methods.len())),
        kind: LspSymbolKind::CLASS,
        tags: None,
        deprecated: None,
        range: span_range(entry.line, entry.end_line),
        selection_range: selection_range(entry.line, entry.column, &entry.name),
        children: if children.is_empty() {
            None
        } else {
            Some(children)
        },
    }
}

/// Hierarchical outline view for one file.
#[allow(deprecated)]
pub fn get_document_symbols(outline: &Outline) -> Vec<DocumentSymbol> {
    let mut symbols = Vec::new();

    for class in &outline.classes {
        symbols.push(class_symbol(class));
    }

    // Nested functions hang under their parent; only top-level functions
    // appear at the root.
    for function in outline.functions.iter().filter(|f| f.parent_function.is_none()) {
        let children: Vec<DocumentSymbol> = outline
            .functions
            .iter()
            .filter(|f| f.parent_function.as_deref() == Some(function.name.as_str()))
            .map(|f| function_symbol(f, Vec::new()))
            .collect();
        symbols.push(function_symbol(function, children));
    }

    for variable in &outline.variables {
        symbols.push(DocumentSymbol {
            name: variable.name.clone(),
            detail: Some(variable.scope.to_string()),
            kind: LspSymbolKind::VARIABLE,
            tags: None,
            deprecated: None,
            range: span_range(variable.line, variable.line),
            selection_range: selection_range(variable.line, variable.column, &variable.name),
            children: None,
        });
    }

    symbols.sort_by_key(|s| s.range.start.line);
    symbols
}

/// Flat, fuzzy-filtered symbol list across the workspace. An empty query
/// matches everything.
#[allow(deprecated)]
pub fn get_workspace_symbols(index: &SymbolIndex, query: &str) -> Vec<SymbolInformation> {
    index
        .find_by_name(query, MatchMode::Substring)
        .into_iter()
        .map(|symbol| SymbolInformation {
            name: symbol.name.clone(),
            kind: lsp_kind(symbol.kind),
            tags: None,
            deprecated: None,
            location: Location {
                uri: symbol.uri.clone(),
                range: selection_range(symbol.line, symbol.column, &symbol.name),
            },
            container_name: symbol.container.clone(),
        })
        .collect()
}

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

//! Go-to-definition and find-references.
//!
//! Definition resolves the identifier under the cursor to all exact-name
//! matches in the index; an ambiguous result (the same name defined in
//! several files) returns every candidate rather than erroring.
//!
//! References combine the index's declarations with a word-boundary text
//! scan across all open documents, since the index only records
//! declarations, not uses.

use std::collections::HashSet;

use tower_lsp::lsp_types::{GotoDefinitionResponse, Location, Position, Range, Url};

use crate::constants::LINE_NUMBER_OFFSET;
use crate::index::{MatchMode, SymbolIndex};
use crate::utils::word_at;

fn declaration_location(symbol: &crate::index::Symbol) -> Location {
    let line = symbol.line.saturating_sub(LINE_NUMBER_OFFSET);
    let column = symbol.column.saturating_sub(1);
    Location {
        uri: symbol.uri.clone(),
        range: Range {
            start: Position {
                line,
                character: column,
            },
            end: Position {
                line,
                character: column + symbol.name.chars().count() as u32,
            },
        },
    }
}

/// Definitions of the identifier under the cursor, across all files.
pub fn get_definitions(
    index: &SymbolIndex,
    content: &str,
    position: Position,
) -> Option<GotoDefinitionResponse> {
    let line = content.lines().nth(position.line as usize)?;
    let (word, _, _) = word_at(line, position.character as usize)?;

    let matches = index.find_by_name(&word, MatchMode::Exact);
    let locations: Vec<Location> = matches.iter().map(|s| declaration_location(s)).collect();

    match locations.len() {
        0 => None,
        1 => Some(GotoDefinitionResponse::Scalar(locations.into_iter().next()?)),
        _ => Some(GotoDefinitionResponse::Array(locations)),
    }
}

/// All references to the identifier under the cursor: declarations from
/// the index plus textual occurrences in every open document.
pub fn get_references(
    index: &SymbolIndex,
    documents: &[(Url, String)],
    content: &str,
    position: Position,
    include_declaration: bool,
) -> Vec<Location> {
    let Some(line) = content.lines().nth(position.line as usize) else {
        return Vec::new();
    };
    let Some((word, _, _)) = word_at(line, position.character as usize) else {
        return Vec::new();
    };

    let declarations = index.find_by_name(&word, MatchMode::Exact);
    let declaration_keys: HashSet<(String, u32)> = declarations
        .iter()
        .map(|s| (s.uri.to_string(), s.line.saturating_sub(LINE_NUMBER_OFFSET)))
        .collect();

    let mut locations = Vec::new();
    let mut seen = HashSet::new();

    if include_declaration {
        for symbol in &declarations {
            let loc = declaration_location(symbol);
            if seen.insert((loc.uri.to_string(), loc.range.start.line, loc.range.start.character)) {
                locations.push(loc);
            }
        }
    }

    let needle = word.to_lowercase();
    for (uri, text) in documents {
        for (line_idx, line_text) in text.lines().enumerate() {
            for start in word_occurrences(line_text, &needle) {
                let line_no = line_idx as u32;
                // Occurrences on a declaration line are the declaration
                // itself; honor the include_declaration flag for them.
                if !include_declaration
                    && declaration_keys.contains(&(uri.to_string(), line_no))
                {
                    continue;
                }
                let key = (uri.to_string(), line_no, start as u32);
                if seen.insert(key) {
                    locations.push(Location {
                        uri: uri.clone(),
                        range: Range {
                            start: Position {
                                line: line_no,
                                character: start as u32,
                            },
                            end: Position {
                                line: line_no,
                                character: (start + needle.chars().count()) as u32,
                            },
                        },
                    });
                }
            }
        }
    }

    locations.sort_by(|a, b| {
        (a.uri.as_str(), a.range.start.line, a.range.start.character).cmp(&(
            b.uri.as_str(),
            b.range.start.line,
            b.range.start.character,
        ))
    });
    locations
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Character offsets of whole-word occurrences of `needle` (lowercase) in
/// `line`, compared case-insensitively.
fn word_occurrences(line: &str, needle: &str) -> Vec<usize> {
    let chars: Vec<char> = line.chars().collect();
    let needle_chars: Vec<char> = needle.chars().collect();
    let n = needle_chars.len();
    if n == 0 || chars.len() < n {
        return Vec::new();
    }

    let mut result = Vec::new();
    for start in 0..=chars.len() - n {
        let matches = chars[start..start + n]
            .iter()
            .zip(&needle_chars)
            .all(|(a, b)| a.to_ascii_lowercase() == *b);
        if !matches {
            continue;
        }
        let boundary_before = start == 0 || !is_ident_char(chars[start - 1]);
        let boundary_after = start + n == chars.len() || !is_ident_char(chars[start + n]);
        if boundary_before && boundary_after {
            result.push(start);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use mls_core::parse;
    use std::sync::Arc;

    fn uri(name: &str) -> Url {
        Url::parse(&format!("file:///{name}")).unwrap()
    }

    #[test]
    fn word_occurrences_respect_boundaries() {
        assert_eq!(word_occurrences("plot(x); plot3(y); my_plot", "plot"), vec![0]);
        assert_eq!(word_occurrences("x = foo + foo2 + foo", "foo"), vec![4, 17]);
        assert_eq!(word_occurrences("", "foo"), Vec::<usize>::new());
    }

    #[test]
    fn definition_single_match_is_scalar() {
        let index = SymbolIndex::new();
        let u = uri("a.m");
        index.update(&u, Arc::new(parse("function tally()\nend")));

        let content = "tally();";
        let resp = get_definitions(&index, content, Position { line: 0, character: 2 }).unwrap();
        match resp {
            GotoDefinitionResponse::Scalar(loc) => {
                assert_eq!(loc.uri, u);
                assert_eq!(loc.range.start.line, 0);
            }
            other => panic!("expected scalar, got {:?}", other),
        }
    }

    #[test]
    fn ambiguous_definition_returns_all() {
        let index = SymbolIndex::new();
        index.update(&uri("a.m"), Arc::new(parse("function dup()\nend")));
        index.update(&uri("b.m"), Arc::new(parse("function dup()\nend")));

        let resp = get_definitions(&index, "dup();", Position { line: 0, character: 1 }).unwrap();
        match resp {
            GotoDefinitionResponse::Array(locs) => assert_eq!(locs.len(), 2),
            other => panic!("expected array, got {:?}", other),
        }
    }

    #[test]
    fn unknown_word_has_no_definition() {
        let index = SymbolIndex::new();
        assert!(get_definitions(&index, "mystery();", Position { line: 0, character: 1 }).is_none());
    }

    #[test]
    fn references_include_uses_across_documents() {
        let index = SymbolIndex::new();
        let a = uri("a.m");
        let b = uri("b.m");
        let src_a = "function tally()\nend";
        let src_b = "x = tally();\ny = tally();";
        index.update(&a, Arc::new(parse(src_a)));

        let documents = vec![(a.clone(), src_a.to_string()), (b.clone(), src_b.to_string())];
        let refs = get_references(
            &index,
            &documents,
            src_b,
            Position { line: 0, character: 5 },
            true,
        );

        // Declaration in a.m plus two uses in b.m.
        assert_eq!(refs.len(), 3);
        assert!(refs.iter().any(|l| l.uri == a && l.range.start.line == 0));
        assert_eq!(refs.iter().filter(|l| l.uri == b).count(), 2);
    }

    #[test]
    fn exclude_declaration_drops_the_defining_line() {
        let index = SymbolIndex::new();
        let a = uri("a.m");
        let src_a = "function tally()\nend\nx = tally();";
        index.update(&a, Arc::new(parse(src_a)));

        let documents = vec![(a.clone(), src_a.to_string())];
        let refs = get_references(
            &index,
            &documents,
            src_a,
            Position { line: 2, character: 5 },
            false,
        );

        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].range.start.line, 2);
    }
}

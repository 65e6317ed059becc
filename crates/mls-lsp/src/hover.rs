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

//! Hover information.
//!
//! Resolution order: the identifier under the cursor against the index
//! (exact match), then the enclosing symbol at the position, then the
//! built-in function table. The rendered content is the signature in a
//! code block followed by the attached doc text.

use tower_lsp::lsp_types::{
    Hover, HoverContents, MarkupContent, MarkupKind, Position, Range, Url,
};

use mls_core::builtin_detail;

use crate::index::{MatchMode, Symbol, SymbolIndex};
use crate::utils::word_at;

/// Hover for a position in a document. `None` when nothing is known about
/// the position.
pub fn get_hover(
    index: &SymbolIndex,
    content: &str,
    uri: &Url,
    position: Position,
) -> Option<Hover> {
    let line = content.lines().nth(position.line as usize)?;
    let word = word_at(line, position.character as usize);

    if let Some((name, start, end)) = &word {
        let matches = index.find_by_name(name, MatchMode::Exact);
        if let Some(symbol) = matches.first() {
            return Some(Hover {
                contents: HoverContents::Markup(render_symbol(symbol)),
                range: Some(Range {
                    start: Position {
                        line: position.line,
                        character: *start as u32,
                    },
                    end: Position {
                        line: position.line,
                        character: *end as u32,
                    },
                }),
            });
        }
    }

    // No named match: fall back to the innermost enclosing symbol, so
    // hovering inside a function body still identifies the function.
    if let Some(symbol) =
        index.find_at_position(uri, position.line + 1, position.character + 1)
    {
        return Some(Hover {
            contents: HoverContents::Markup(render_symbol(&symbol)),
            range: None,
        });
    }

    let (name, start, end) = word?;
    let detail = builtin_detail(&name)?;
    Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: format!("```matlab\n{}\n```\n\n---\n\n{} (built-in)", name, detail),
        }),
        range: Some(Range {
            start: Position {
                line: position.line,
                character: start as u32,
            },
            end: Position {
                line: position.line,
                character: end as u32,
            },
        }),
    })
}

fn render_symbol(symbol: &Symbol) -> MarkupContent {
    let mut value = format!("```matlab\n{}\n```", symbol.detail);
    if let Some(container) = &symbol.container {
        value.push_str(&format!("\n\n{} in `{}`", symbol.kind.label(), container));
    }
    if let Some(doc) = &symbol.documentation {
        value.push_str("\n\n---\n\n");
        value.push_str(doc);
    }
    MarkupContent {
        kind: MarkupKind::Markdown,
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mls_core::parse;
    use std::sync::Arc;

    fn setup(src: &str) -> (SymbolIndex, Url) {
        let index = SymbolIndex::new();
        let uri = Url::parse("file:///a.m").unwrap();
        index.update(&uri, Arc::new(parse(src)));
        (index, uri)
    }

    fn hover_text(hover: &Hover) -> &str {
        match &hover.contents {
            HoverContents::Markup(m) => &m.value,
            _ => panic!("expected markup hover"),
        }
    }

    #[test]
    fn hover_on_known_function_shows_signature_and_doc() {
        let src = "% Adds one.\nfunction y = incr(x)\ny = x + 1;\nend\nz = incr(3);";
        let (index, uri) = setup(src);
        // Cursor on "incr" in the call on line 5 (0-based 4).
        let hover = get_hover(&index, src, &uri, Position { line: 4, character: 5 }).unwrap();
        let text = hover_text(&hover);
        assert!(text.contains("function y = incr(x)"));
        assert!(text.contains("Adds one."));
        assert!(hover.range.is_some());
    }

    #[test]
    fn hover_inside_body_falls_back_to_enclosing_symbol() {
        let src = "function y = incr(x)\ny = 1;\nend";
        let (index, uri) = setup(src);
        // Column 2 sits on the assignment operator, so there is no word to
        // resolve and the enclosing function is reported instead.
        let hover = get_hover(&index, src, &uri, Position { line: 1, character: 2 }).unwrap();
        assert!(hover_text(&hover).contains("incr"));
    }

    #[test]
    fn hover_on_builtin_uses_static_table() {
        let src = "plot3(x, y, z);";
        let (index, uri) = setup("");
        let hover = get_hover(&index, src, &uri, Position { line: 0, character: 2 }).unwrap();
        assert!(hover_text(&hover).contains("3-D line plot"));
    }

    #[test]
    fn hover_on_unknown_position_is_none() {
        let (index, uri) = setup("");
        assert!(get_hover(&index, "", &uri, Position { line: 0, character: 0 }).is_none());
        assert!(get_hover(&index, "x", &uri, Position { line: 5, character: 0 }).is_none());
    }

    #[test]
    fn method_hover_names_its_class() {
        let src = "classdef C\nmethods\nfunction go(obj)\nend\nend\nend\n";
        let (index, uri) = setup(src);
        let hover = get_hover(&index, src, &uri, Position { line: 2, character: 10 }).unwrap();
        let text = hover_text(&hover);
        assert!(text.contains("method in `C`"));
    }
}

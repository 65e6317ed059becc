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

//! Line-oriented structural parser.
//!
//! A single forward pass over the source maintains a stack of open blocks.
//! Statement-start keywords push frames; a bare `end` (or an `endfunction`
//! style synonym) pops the innermost frame. Function and class entries are
//! finalized when their frame pops, so their end line is the line of the
//! matching terminator.
//!
//! Block comments (`%{` .. `%}` on their own lines) run through a separate
//! state machine: while one is open, every line belongs to it, including
//! lines that look like code.
//!
//! Anonymous functions (`f = @(x) x + 1`) are value expressions with no
//! terminator and are never pushed onto the block stack.

use crate::outline::{
    hash_source, ClassEntry, CommentEntry, CommentKind, FunctionEntry, Outline, ParseDiagnostic,
    PropertyEntry, VariableEntry, VariableScope,
};

/// Block kinds tracked on the scanner stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Properties,
    Methods,
    Events,
    Enumeration,
    Arguments,
    If,
    For,
    Parfor,
    While,
    Switch,
    Try,
}

impl BlockKind {
    fn keyword(self) -> &'static str {
        match self {
            Self::Properties => "properties",
            Self::Methods => "methods",
            Self::Events => "events",
            Self::Enumeration => "enumeration",
            Self::Arguments => "arguments",
            Self::If => "if",
            Self::For => "for",
            Self::Parfor => "parfor",
            Self::While => "while",
            Self::Switch => "switch",
            Self::Try => "try",
        }
    }

    fn control(word: &str) -> Option<Self> {
        match word {
            "if" => Some(Self::If),
            "for" => Some(Self::For),
            "parfor" => Some(Self::Parfor),
            "while" => Some(Self::While),
            "switch" => Some(Self::Switch),
            "try" => Some(Self::Try),
            _ => None,
        }
    }

    fn class_section(word: &str) -> Option<Self> {
        match word {
            "properties" => Some(Self::Properties),
            "methods" => Some(Self::Methods),
            "events" => Some(Self::Events),
            "enumeration" => Some(Self::Enumeration),
            _ => None,
        }
    }
}

/// Terminator keywords. A typed synonym pops the innermost frame exactly
/// like a bare `end`.
const TERMINATORS: &[&str] = &[
    "end",
    "endfunction",
    "endclassdef",
    "endif",
    "endfor",
    "endparfor",
    "endwhile",
    "endswitch",
    "endproperties",
    "endmethods",
    "endevents",
    "endenumeration",
];

enum Frame {
    Function(FunctionEntry),
    Class(ClassEntry),
    Other { kind: BlockKind, line: u32 },
}

struct PendingComment {
    line: u32,
    end_line: u32,
    column: u32,
    lines: Vec<String>,
}

struct BlockComment {
    line: u32,
    column: u32,
    lines: Vec<String>,
}

struct Scanner {
    stack: Vec<Frame>,
    outline: Outline,
    pending: Option<PendingComment>,
    block: Option<BlockComment>,
}

/// Parse MATLAB source into an [`Outline`].
///
/// Never fails: malformed input produces diagnostics, not errors, and
/// identical input always yields an identical outline.
pub fn parse(content: &str) -> Outline {
    let mut scanner = Scanner {
        stack: Vec::new(),
        outline: Outline {
            content_hash: hash_source(content),
            ..Outline::default()
        },
        pending: None,
        block: None,
    };

    let mut last_line = 0u32;
    for (idx, raw) in content.lines().enumerate() {
        last_line = (idx + 1) as u32;
        scanner.scan_line(raw, last_line);
    }
    scanner.finish(last_line.max(1));
    scanner.outline
}

impl Scanner {
    fn scan_line(&mut self, raw: &str, line_no: u32) {
        // Block comments swallow everything until their closing marker.
        if self.block.is_some() {
            let trimmed = raw.trim();
            if trimmed == "%}" {
                self.close_block_comment(line_no);
            } else if let Some(block) = self.block.as_mut() {
                block.lines.push(trimmed.to_string());
            }
            return;
        }

        let trimmed = raw.trim();

        if trimmed == "%{" {
            self.flush_pending();
            self.block = Some(BlockComment {
                line: line_no,
                column: column_of(raw, "%{"),
                lines: Vec::new(),
            });
            return;
        }

        if trimmed.is_empty() {
            self.flush_pending();
            return;
        }

        if let Some(text) = trimmed.strip_prefix('%') {
            self.push_comment_line(text, raw, line_no);
            return;
        }

        self.flush_pending();

        let code = strip_trailing_comment(raw);
        let Some(word) = leading_word(code) else {
            return;
        };

        if is_terminator(code, word) {
            self.pop_frame(word, line_no);
            return;
        }

        match word {
            "function" => self.open_function(code, raw, line_no),
            "classdef" => self.open_class(code, raw, line_no),
            "global" => self.declare_variables(VariableScope::Global, raw, line_no),
            "persistent" => self.declare_variables(VariableScope::Persistent, raw, line_no),
            _ => {
                if let Some(kind) = BlockKind::control(word) {
                    self.stack.push(Frame::Other { kind, line: line_no });
                } else if let Some(kind) = BlockKind::class_section(word) {
                    // Section keywords only open blocks directly inside a
                    // classdef; elsewhere they are ordinary identifiers
                    // (e.g. a call to properties(obj)).
                    if matches!(self.stack.last(), Some(Frame::Class(_))) {
                        self.stack.push(Frame::Other { kind, line: line_no });
                    }
                } else if word == "arguments"
                    && matches!(self.stack.last(), Some(Frame::Function(_)))
                {
                    self.stack.push(Frame::Other {
                        kind: BlockKind::Arguments,
                        line: line_no,
                    });
                } else if matches!(
                    self.stack.last(),
                    Some(Frame::Other { kind: BlockKind::Properties, .. })
                ) {
                    self.declare_property(word, raw, line_no);
                }
                // Anything else is an ordinary statement; anonymous
                // functions land here and open no block.
            }
        }
    }

    fn push_comment_line(&mut self, text: &str, raw: &str, line_no: u32) {
        let text = text.trim_start_matches('%').trim().to_string();
        let contiguous = self
            .pending
            .as_ref()
            .is_some_and(|p| p.end_line + 1 == line_no);
        if contiguous {
            if let Some(pending) = self.pending.as_mut() {
                pending.end_line = line_no;
                pending.lines.push(text);
            }
        } else {
            self.flush_pending();
            self.pending = Some(PendingComment {
                line: line_no,
                end_line: line_no,
                column: column_of(raw, "%"),
                lines: vec![text],
            });
        }
    }

    fn flush_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.outline.comments.push(CommentEntry {
                text: pending.lines.join("\n"),
                line: pending.line,
                end_line: pending.end_line,
                column: pending.column,
                kind: CommentKind::Line,
            });
        }
    }

    fn close_block_comment(&mut self, end_line: u32) {
        if let Some(block) = self.block.take() {
            self.outline.comments.push(CommentEntry {
                text: block.lines.join("\n").trim().to_string(),
                line: block.line,
                end_line,
                column: block.column,
                kind: CommentKind::Block,
            });
        }
    }

    /// Doc text is the comment block ending on the line directly above the
    /// declaration; a blank or code line in between severs the association.
    fn doc_for(&self, decl_line: u32) -> Option<String> {
        self.outline
            .comments
            .iter()
            .rev()
            .find(|c| c.end_line + 1 == decl_line && !c.text.is_empty())
            .map(|c| c.text.clone())
    }

    fn open_function(&mut self, code: &str, raw: &str, line_no: u32) {
        let rest = after_keyword(code, "function");
        let Some((outputs, name, inputs)) = parse_signature(rest) else {
            self.outline.diagnostics.push(ParseDiagnostic::info(
                line_no,
                "function declaration without a name",
            ));
            return;
        };

        let class = self.stack.iter().rev().find_map(|f| match f {
            Frame::Class(c) => Some(c.name.clone()),
            _ => None,
        });
        let parent_function = self.stack.iter().rev().find_map(|f| match f {
            Frame::Function(e) => Some(e.name.clone()),
            _ => None,
        });
        let depth = self
            .stack
            .iter()
            .filter(|f| matches!(f, Frame::Function(_)))
            .count();

        let entry = FunctionEntry {
            column: name_column(raw, "function", &name),
            doc: self.doc_for(line_no),
            name,
            line: line_no,
            end_line: line_no,
            inputs,
            outputs,
            depth,
            class,
            parent_function,
        };
        self.stack.push(Frame::Function(entry));
    }

    fn open_class(&mut self, code: &str, raw: &str, line_no: u32) {
        let mut rest = after_keyword(code, "classdef").trim_start();
        // Skip class attributes: classdef (Sealed) Name
        if rest.starts_with('(') {
            match rest.find(')') {
                Some(close) => rest = rest[close + 1..].trim_start(),
                None => rest = "",
            }
        }

        let name = take_identifier(rest);
        if name.is_empty() {
            self.outline.diagnostics.push(ParseDiagnostic::info(
                line_no,
                "classdef declaration without a name",
            ));
            return;
        }

        let superclasses = rest
            .split_once('<')
            .map(|(_, supers)| {
                supers
                    .split('&')
                    .map(|s| take_identifier(s.trim()))
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let entry = ClassEntry {
            column: name_column(raw, "classdef", &name),
            doc: self.doc_for(line_no),
            name,
            line: line_no,
            end_line: line_no,
            superclasses,
            properties: Vec::new(),
            methods: Vec::new(),
        };
        self.stack.push(Frame::Class(entry));
    }

    fn declare_variables(&mut self, scope: VariableScope, raw: &str, line_no: u32) {
        let keyword = match scope {
            VariableScope::Global => "global",
            VariableScope::Persistent => "persistent",
        };
        let start = raw.find(keyword).map(|p| p + keyword.len()).unwrap_or(0);
        for (offset, name) in identifiers_with_offsets(&raw[start..]) {
            self.outline.variables.push(VariableEntry {
                name,
                line: line_no,
                column: (start + offset + 1) as u32,
                scope,
            });
        }
    }

    fn declare_property(&mut self, word: &str, raw: &str, line_no: u32) {
        let property = PropertyEntry {
            name: word.to_string(),
            line: line_no,
            column: column_of(raw, word),
        };
        if let Some(class) = self.stack.iter_mut().rev().find_map(|f| match f {
            Frame::Class(c) => Some(c),
            _ => None,
        }) {
            class.properties.push(property);
        }
    }

    fn pop_frame(&mut self, word: &str, line_no: u32) {
        match self.stack.pop() {
            Some(frame) => self.close_frame(frame, line_no),
            None => self.outline.diagnostics.push(ParseDiagnostic::warning(
                line_no,
                format!("unmatched '{}' with no open block", word),
            )),
        }
    }

    fn close_frame(&mut self, frame: Frame, end_line: u32) {
        match frame {
            Frame::Function(mut entry) => {
                entry.end_line = end_line;
                self.place_function(entry);
            }
            Frame::Class(mut entry) => {
                entry.end_line = end_line;
                self.outline.classes.push(entry);
            }
            Frame::Other { .. } => {}
        }
    }

    fn place_function(&mut self, entry: FunctionEntry) {
        if entry.class.is_some() {
            if let Some(class) = self.stack.iter_mut().rev().find_map(|f| match f {
                Frame::Class(c) => Some(c),
                _ => None,
            }) {
                class.methods.push(entry);
                return;
            }
        }
        self.outline.functions.push(entry);
    }

    fn finish(&mut self, last_line: u32) {
        if self.block.is_some() {
            self.outline.diagnostics.push(ParseDiagnostic::info(
                last_line,
                "block comment is not closed with '%}'",
            ));
            self.close_block_comment(last_line);
        }
        self.flush_pending();

        while let Some(frame) = self.stack.pop() {
            let message = match &frame {
                Frame::Function(entry) => {
                    format!("function '{}' is missing its 'end'", entry.name)
                }
                Frame::Class(entry) => {
                    format!("classdef '{}' is missing its 'end'", entry.name)
                }
                Frame::Other { kind, .. } => {
                    format!("unterminated '{}' block", kind.keyword())
                }
            };
            let line = match &frame {
                Frame::Function(entry) => entry.line,
                Frame::Class(entry) => entry.line,
                Frame::Other { line, .. } => *line,
            };
            self.outline
                .diagnostics
                .push(ParseDiagnostic::warning(line, message));
            self.close_frame(frame, last_line);
        }

        // Entries are recorded when their frame pops; restore source order.
        self.outline.functions.sort_by_key(|f| (f.line, f.column));
        self.outline.classes.sort_by_key(|c| (c.line, c.column));
        for class in &mut self.outline.classes {
            class.methods.sort_by_key(|m| (m.line, m.column));
        }
        self.outline.comments.sort_by_key(|c| c.line);
    }
}

// --- Line-level helpers ---

/// Truncate at the first `%` that is outside a quoted string. The quote
/// scan does not model the transpose operator; that imprecision only
/// affects comment stripping on pathological lines.
fn strip_trailing_comment(line: &str) -> &str {
    let mut in_single = false;
    let mut in_double = false;
    for (i, ch) in line.char_indices() {
        match ch {
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            '%' if !in_single && !in_double => return &line[..i],
            _ => {}
        }
    }
    line
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// First identifier-like token at statement start.
fn leading_word(code: &str) -> Option<&str> {
    let t = code.trim_start();
    let end = t.find(|c: char| !is_ident_char(c)).unwrap_or(t.len());
    if end == 0 {
        None
    } else {
        Some(&t[..end])
    }
}

/// A terminator statement is a terminator keyword alone, optionally
/// followed by `;` or `,`. `end` inside an expression (`x(end)`) never
/// starts the statement, so it cannot match here.
fn is_terminator(code: &str, word: &str) -> bool {
    if !TERMINATORS.contains(&word) {
        return false;
    }
    let stmt = code
        .trim()
        .trim_end_matches(|c: char| c == ';' || c == ',' || c.is_whitespace());
    stmt == word
}

fn after_keyword<'a>(code: &'a str, keyword: &str) -> &'a str {
    let t = code.trim_start();
    t.strip_prefix(keyword).unwrap_or(t)
}

/// Leading identifier, allowing dots so `get.Value` and `pkg.Class` parse
/// as one name.
fn take_identifier(s: &str) -> String {
    s.trim_start()
        .chars()
        .take_while(|&c| is_ident_char(c) || c == '.')
        .collect()
}

/// Split `rest` (the text after the `function` keyword) into output names,
/// function name, and input names. Returns `None` when no name is present.
fn parse_signature(rest: &str) -> Option<(Vec<String>, String, Vec<String>)> {
    let rest = rest.trim();
    let paren = rest.find('(').unwrap_or(rest.len());

    let (outputs, name_part) = match rest[..paren].find('=') {
        Some(eq) => {
            let outs = rest[..eq]
                .trim()
                .trim_start_matches('[')
                .trim_end_matches(']')
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            (outs, rest[eq + 1..].trim_start())
        }
        None => (Vec::new(), rest),
    };

    let name = take_identifier(name_part);
    if name.is_empty() {
        return None;
    }

    let inputs = name_part
        .split_once('(')
        .map(|(_, args)| {
            args.split(')')
                .next()
                .unwrap_or("")
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default();

    Some((outputs, name, inputs))
}

/// 1-based column of the declared name, searched after the keyword so an
/// output variable with the same spelling does not shadow it.
fn name_column(raw: &str, keyword: &str, name: &str) -> u32 {
    let search_from = raw
        .find(keyword)
        .map(|p| p + keyword.len())
        .unwrap_or(0);
    match raw[search_from..].find(name) {
        Some(pos) => (search_from + pos + 1) as u32,
        None => 1,
    }
}

fn column_of(raw: &str, needle: &str) -> u32 {
    raw.find(needle).map(|p| (p + 1) as u32).unwrap_or(1)
}

/// Identifiers in a declaration tail with their byte offsets, e.g.
/// `" a b;"` yields `(1, "a"), (3, "b")`. Tokens cannot start on a digit.
fn identifiers_with_offsets(s: &str) -> Vec<(usize, String)> {
    let mut result = Vec::new();
    let mut current: Option<(usize, String)> = None;
    for (i, ch) in s.char_indices() {
        if is_ident_char(ch) {
            match current.as_mut() {
                Some((_, name)) => name.push(ch),
                None if !ch.is_ascii_digit() => current = Some((i, ch.to_string())),
                None => {}
            }
        } else if let Some(done) = current.take() {
            result.push(done);
        }
    }
    if let Some(done) = current.take() {
        result.push(done);
    }
    result
}

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

//! Outline data model: the typed parse result for one file.
//!
//! All line and column numbers are 1-based, matching what MATLAB tooling
//! reports. Entries derive `PartialEq` so outlines can be compared
//! structurally (parse determinism is a plain equality check).

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Scope keyword that introduced a variable declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableScope {
    /// Declared with `global`.
    Global,
    /// Declared with `persistent`.
    Persistent,
}

impl fmt::Display for VariableScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::Persistent => write!(f, "persistent"),
        }
    }
}

/// Comment form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    /// One or more contiguous `%` lines.
    Line,
    /// A `%{` .. `%}` block.
    Block,
}

/// Severity of a structural parse anomaly.
///
/// Parse anomalies never abort the pass; the worst they get is `Warning`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ParseSeverity {
    Info,
    Warning,
}

impl fmt::Display for ParseSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A structural expectation that was violated while scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDiagnostic {
    /// 1-based line the anomaly was detected on.
    pub line: u32,
    pub message: String,
    pub severity: ParseSeverity,
}

impl ParseDiagnostic {
    pub fn warning(line: u32, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
            severity: ParseSeverity::Warning,
        }
    }

    pub fn info(line: u32, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
            severity: ParseSeverity::Info,
        }
    }
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}: {}", self.line, self.severity, self.message)
    }
}

/// A function definition (top-level, nested, or class method).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FunctionEntry {
    pub name: String,
    /// 1-based line of the `function` keyword.
    pub line: u32,
    /// 1-based column of the function name on its declaration line.
    pub column: u32,
    /// Line of the matching `end`; the last line of the file when the
    /// function is unterminated.
    pub end_line: u32,
    /// Input parameter names.
    pub inputs: Vec<String>,
    /// Return value names.
    pub outputs: Vec<String>,
    /// Number of enclosing functions (0 for top-level).
    pub depth: usize,
    /// Enclosing class, when this is a method.
    pub class: Option<String>,
    /// Enclosing function, when nested.
    pub parent_function: Option<String>,
    /// Nearest contiguous comment block immediately above the declaration.
    pub doc: Option<String>,
}

impl FunctionEntry {
    /// Render the declaration as signature text, e.g.
    /// `[y, idx] = find_peak(x, threshold)`.
    pub fn signature(&self) -> String {
        let mut sig = String::new();
        match self.outputs.len() {
            0 => {}
            1 => {
                sig.push_str(&self.outputs[0]);
                sig.push_str(" = ");
            }
            _ => {
                sig.push('[');
                sig.push_str(&self.outputs.join(", "));
                sig.push_str("] = ");
            }
        }
        sig.push_str(&self.name);
        sig.push('(');
        sig.push_str(&self.inputs.join(", "));
        sig.push(')');
        sig
    }
}

/// A property declared inside a `properties` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyEntry {
    pub name: String,
    pub line: u32,
    pub column: u32,
}

/// A `classdef` definition.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClassEntry {
    pub name: String,
    pub line: u32,
    pub column: u32,
    pub end_line: u32,
    /// Names after `<` in `classdef Name < Base`.
    pub superclasses: Vec<String>,
    pub properties: Vec<PropertyEntry>,
    /// Methods carry `class = Some(name)`.
    pub methods: Vec<FunctionEntry>,
    pub doc: Option<String>,
}

/// A `global` or `persistent` declaration. Ordinary assignment does not
/// create entries; only scope-declaring keywords are tracked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableEntry {
    pub name: String,
    pub line: u32,
    pub column: u32,
    pub scope: VariableScope,
}

/// A comment, either a run of `%` lines or a `%{` .. `%}` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentEntry {
    /// Comment text with markers stripped, lines joined by `\n`.
    pub text: String,
    pub line: u32,
    pub end_line: u32,
    pub column: u32,
    pub kind: CommentKind,
}

/// The complete parse result for one file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Outline {
    /// Functions outside any class, in source order.
    pub functions: Vec<FunctionEntry>,
    pub classes: Vec<ClassEntry>,
    pub variables: Vec<VariableEntry>,
    pub comments: Vec<CommentEntry>,
    pub diagnostics: Vec<ParseDiagnostic>,
    /// Hash of the exact source text this outline was built from. Used as
    /// the cache key discriminant by callers.
    pub content_hash: u64,
}

impl Outline {
    /// Total number of named entries (functions, methods, classes,
    /// properties, variables).
    pub fn symbol_count(&self) -> usize {
        self.functions.len()
            + self.variables.len()
            + self
                .classes
                .iter()
                .map(|c| 1 + c.properties.len() + c.methods.len())
                .sum::<usize>()
    }
}

/// Fingerprint of exact source bytes, used for cache keying and change
/// detection. Not a cryptographic hash.
pub fn hash_source(content: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_no_outputs() {
        let entry = FunctionEntry {
            name: "plot_all".into(),
            inputs: vec!["data".into(), "style".into()],
            ..Default::default()
        };
        assert_eq!(entry.signature(), "plot_all(data, style)");
    }

    #[test]
    fn signature_single_output() {
        let entry = FunctionEntry {
            name: "mean2".into(),
            inputs: vec!["x".into()],
            outputs: vec!["m".into()],
            ..Default::default()
        };
        assert_eq!(entry.signature(), "m = mean2(x)");
    }

    #[test]
    fn signature_multiple_outputs() {
        let entry = FunctionEntry {
            name: "find_peak".into(),
            inputs: vec!["x".into(), "threshold".into()],
            outputs: vec!["y".into(), "idx".into()],
            ..Default::default()
        };
        assert_eq!(entry.signature(), "[y, idx] = find_peak(x, threshold)");
    }

    #[test]
    fn hash_source_is_stable_and_content_sensitive() {
        let a = hash_source("function foo()\nend\n");
        let b = hash_source("function foo()\nend\n");
        let c = hash_source("function bar()\nend\n");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn diagnostic_display() {
        let d = ParseDiagnostic::warning(7, "'end' without an open block");
        assert_eq!(format!("{}", d), "line 7: warning: 'end' without an open block");
    }
}

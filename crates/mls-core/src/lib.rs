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

//! Structural parser and outline data model for MATLAB source.
//!
//! This crate turns raw MATLAB text into a typed [`Outline`] of functions,
//! classes, variables and comments. The parser is deliberately line-oriented
//! and stack-based: it tracks block structure with keyword-prefix matching
//! rather than a full grammar, which is all a structural index needs.
//!
//! `parse` is a pure function of the text. It never fails; structural
//! anomalies (an unmatched `end`, a function without a terminator) are
//! reported as [`ParseDiagnostic`] entries and the pass continues. Identical
//! input always yields a structurally equal outline, which is what makes
//! content-hash caching of parse results correct.
//!
//! File identity is not part of the outline: callers that aggregate outlines
//! across files key them externally.

mod builtins;
mod outline;
mod parser;

pub use builtins::{builtin_detail, is_builtin, is_keyword, Builtin, BUILTIN_FUNCTIONS, KEYWORDS};
pub use outline::{
    hash_source, ClassEntry, CommentEntry, CommentKind, FunctionEntry, Outline, ParseDiagnostic,
    ParseSeverity, PropertyEntry, VariableEntry, VariableScope,
};
pub use parser::parse;

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

//! MATLAB Language Server Protocol (LSP) implementation.
//!
//! This crate provides IDE integration for MATLAB code through the Language
//! Server Protocol, backed by the structural parser in `mls-core` and the
//! external mlint driver in `mls-mlint`.
//!
//! # Features
//!
//! - **Diagnostics**: structural parse checks plus mlint findings, pushed
//!   asynchronously with debouncing and stale-result suppression
//! - **Completion**: workspace symbols, built-in functions, and keywords,
//!   ranked exact > prefix > substring
//! - **Hover**: signatures and leading-comment documentation
//! - **Go to Definition / Find References**: across all open documents
//! - **Document / Workspace Symbols**: hierarchical outline and
//!   query-filtered search
//!
//! # Architecture
//!
//! - `backend`: tower-lsp server wiring and request validation
//! - [`documents`]: open-buffer store (rope text, content hashes)
//! - [`cache`]: generic content-hash keyed LRU/TTL result cache
//! - [`index`]: symbol index with by-file and by-name tables
//! - [`pipeline`]: debounced analyzer scheduling and publication
//! - [`completion`], [`hover`], [`navigation`], [`symbols`]: read-only
//!   query handlers over the index
//!
//! Parse results and analyzer findings are cached by a hash of the exact
//! buffer text, so re-opening unchanged content or duplicating a file never
//! re-runs work. All shared state sits behind single-guard locks; index
//! updates build their replacement tables first and swap them in one write,
//! so readers observe either the old or the new complete symbol set.

mod backend;
pub mod cache;
pub mod completion;
pub mod config;
pub mod constants;
pub mod documents;
pub mod hover;
pub mod index;
pub mod navigation;
pub mod pipeline;
pub mod symbols;
pub mod utils;

#[cfg(test)]
mod tests;

pub use backend::MatlabLanguageServer;
pub use config::ServerConfig;

/// LSP server version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

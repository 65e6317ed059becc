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

//! Server constants and tunable defaults.
//!
//! Everything here can be overridden through [`crate::ServerConfig`] where
//! a matching field exists; the constants are the fallback values.

/// Debounce window for analyzer scheduling (milliseconds). Edits arrive
/// per keystroke; the window collapses a burst into one analyzer run.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Capacity of each result cache (parse outlines, analyzer findings).
/// Entries beyond this evict least-recently-used first.
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Time-to-live for cached results (seconds). An entry older than this is
/// treated as a miss and evicted lazily.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Upper bound on completion items returned for one request.
pub const DEFAULT_MAX_COMPLETIONS: usize = 50;

/// Wall-clock budget for one external analyzer invocation (seconds).
pub const DEFAULT_ANALYZER_TIMEOUT_SECS: u64 = 10;

/// Maximum document size in bytes (50 MB). Larger buffers are rejected at
/// the sync boundary to keep rope storage and analysis bounded.
pub const MAX_DOCUMENT_SIZE: usize = 50 * 1024 * 1024;

/// Outline positions are 1-based, LSP positions 0-based.
/// `lsp_line = outline_line - LINE_NUMBER_OFFSET`.
pub const LINE_NUMBER_OFFSET: u32 = 1;

/// End-of-range column used when the exact extent of a line is not
/// tracked. Editors clamp to the actual line length.
pub const LINE_END_CHAR: u32 = 1000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_are_sane() {
        assert!(DEFAULT_DEBOUNCE_MS >= 50);
        assert!(DEFAULT_DEBOUNCE_MS <= 2000);
        assert!(DEFAULT_CACHE_CAPACITY >= 16);
        assert!(DEFAULT_MAX_COMPLETIONS >= 20);
        assert!(MAX_DOCUMENT_SIZE >= 1024 * 1024);
    }

    #[test]
    fn position_conversion_offset() {
        assert_eq!(LINE_NUMBER_OFFSET, 1);
    }
}

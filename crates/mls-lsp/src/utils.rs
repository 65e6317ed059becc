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

//! String utilities shared by the query handlers.

/// Safely slice a string up to a byte position, rounding down to the
/// nearest UTF-8 boundary so cursor positions inside multi-byte characters
/// never panic.
pub fn safe_slice_to(s: &str, pos: usize) -> &str {
    if pos >= s.len() {
        return s;
    }
    let mut pos = pos;
    while pos > 0 && !s.is_char_boundary(pos) {
        pos -= 1;
    }
    &s[..pos]
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Identifier under the cursor, with its character-index bounds.
///
/// `character` is a character index (LSP column). Returns `None` when the
/// cursor is not on an identifier.
pub fn word_at(line: &str, character: usize) -> Option<(String, usize, usize)> {
    let chars: Vec<char> = line.chars().collect();
    if chars.is_empty() {
        return None;
    }
    // A cursor at end-of-word sits one past the last character.
    let pos = character.min(chars.len().saturating_sub(1));
    let pos = if !is_ident_char(chars[pos]) && pos > 0 && is_ident_char(chars[pos - 1]) {
        pos - 1
    } else {
        pos
    };
    if !is_ident_char(chars[pos]) {
        return None;
    }

    let mut start = pos;
    while start > 0 && is_ident_char(chars[start - 1]) {
        start -= 1;
    }
    let mut end = pos;
    while end < chars.len() && is_ident_char(chars[end]) {
        end += 1;
    }

    Some((chars[start..end].iter().collect(), start, end))
}

/// Identifier fragment directly before the cursor, used as the completion
/// prefix. Empty when the cursor does not follow identifier characters.
pub fn prefix_at(line: &str, character: usize) -> String {
    let chars: Vec<char> = line.chars().collect();
    let end = character.min(chars.len());
    let mut start = end;
    while start > 0 && is_ident_char(chars[start - 1]) {
        start -= 1;
    }
    chars[start..end].iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_slice_ascii() {
        let s = "hello world";
        assert_eq!(safe_slice_to(s, 5), "hello");
        assert_eq!(safe_slice_to(s, 0), "");
        assert_eq!(safe_slice_to(s, 100), s);
    }

    #[test]
    fn safe_slice_multibyte() {
        let s = "ab\u{4e16}cd";
        // Position 3 is inside the 3-byte character starting at 2.
        assert_eq!(safe_slice_to(s, 3), "ab");
        assert_eq!(safe_slice_to(s, 2), "ab");
        assert_eq!(safe_slice_to(s, 5), "ab\u{4e16}");
    }

    #[test]
    fn word_at_middle_and_edges() {
        let line = "y = plot3(x);";
        assert_eq!(word_at(line, 5), Some(("plot3".into(), 4, 9)));
        assert_eq!(word_at(line, 4), Some(("plot3".into(), 4, 9)));
        // Cursor just past the word still resolves it.
        assert_eq!(word_at(line, 9), Some(("plot3".into(), 4, 9)));
        assert_eq!(word_at(line, 2), None);
    }

    #[test]
    fn word_at_empty_line() {
        assert_eq!(word_at("", 0), None);
        assert_eq!(word_at("   ", 1), None);
    }

    #[test]
    fn prefix_extraction() {
        assert_eq!(prefix_at("x = plo", 7), "plo");
        assert_eq!(prefix_at("x = plo", 5), "p");
        assert_eq!(prefix_at("x = ", 4), "");
        assert_eq!(prefix_at("", 0), "");
        assert_eq!(prefix_at("plot", 99), "plot");
    }
}

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

//! mlint report parsing.
//!
//! Two line layouts exist, depending on whether mlint was invoked with
//! `-id`:
//!
//! ```text
//! L <line> (<ID>): <message>
//! L <line>: <message>
//! ```
//!
//! `==========` file banners and anything else that does not match are
//! skipped; a garbled report degrades to fewer findings, never to an error.

use std::fmt;

/// Severity of an analyzer finding, mapped from the mlint message-ID
/// prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FindingSeverity {
    Hint,
    Info,
    Warning,
    Error,
}

impl fmt::Display for FindingSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hint => write!(f, "hint"),
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// One structured finding from an analyzer report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// 1-based line number reported by the analyzer.
    pub line: u32,
    /// 1-based column. mlint does not report columns in this layout, so
    /// this is 1 unless a future analyzer provides one.
    pub column: u32,
    /// Message ID token, e.g. `NASGU`; empty in the simple layout.
    pub code: String,
    pub message: String,
    pub severity: FindingSeverity,
}

/// Map an mlint message ID to a severity.
///
/// E/F prefixes are errors, C/W warnings, I info, H hints; unknown or
/// missing IDs default to warning.
pub fn map_severity(code: &str) -> FindingSeverity {
    match code.chars().next().map(|c| c.to_ascii_uppercase()) {
        Some('E') | Some('F') => FindingSeverity::Error,
        Some('C') | Some('W') => FindingSeverity::Warning,
        Some('I') => FindingSeverity::Info,
        Some('H') => FindingSeverity::Hint,
        _ => FindingSeverity::Warning,
    }
}

/// Parse a full analyzer report into findings, skipping banners and
/// unparseable lines.
pub fn parse_report(output: &str) -> Vec<Finding> {
    output.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<Finding> {
    let line = line.trim();
    if line.is_empty() || line.starts_with("==========") {
        return None;
    }

    let rest = line.strip_prefix('L')?.trim_start();
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }
    let line_no: u32 = rest[..digits_end].parse().ok()?;
    let rest = rest[digits_end..].trim_start();

    let (code, rest) = match rest.strip_prefix('(') {
        Some(inner) => {
            let close = inner.find(')')?;
            (inner[..close].trim().to_string(), inner[close + 1..].trim_start())
        }
        None => (String::new(), rest),
    };

    let message = rest.strip_prefix(':')?.trim();
    if message.is_empty() {
        return None;
    }

    Some(Finding {
        line: line_no,
        column: 1,
        severity: map_severity(&code),
        code,
        message: message.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_line_with_id() {
        let findings = parse_report("L 4 (NOPRT): Terminate statement with semicolon.");
        assert_eq!(findings.len(), 1);
        let f = &findings[0];
        assert_eq!(f.line, 4);
        assert_eq!(f.code, "NOPRT");
        assert_eq!(f.message, "Terminate statement with semicolon.");
        assert_eq!(f.severity, FindingSeverity::Warning);
    }

    #[test]
    fn parses_simple_line() {
        let findings = parse_report("L 9: Invalid syntax at end of line.");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, 9);
        assert!(findings[0].code.is_empty());
        assert_eq!(findings[0].severity, FindingSeverity::Warning);
    }

    #[test]
    fn skips_banners_and_garbage() {
        let output = "========== /tmp/check.m ==========\n\
                      L 2 (NASGU): Value assigned to 'x' might be unused.\n\
                      some stray diagnostic text\n\
                      L: missing line number\n";
        let findings = parse_report(output);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].code, "NASGU");
    }

    #[test]
    fn parses_column_style_id() {
        // Older mlint builds emit "(C 5-10)" in the ID slot.
        let findings = parse_report("L 12 (C 5-10): Use of tab characters.");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].code, "C 5-10");
        assert_eq!(findings[0].severity, FindingSeverity::Warning);
    }

    #[test]
    fn severity_mapping() {
        assert_eq!(map_severity("E123"), FindingSeverity::Error);
        assert_eq!(map_severity("FNDEF"), FindingSeverity::Error);
        assert_eq!(map_severity("C 5-10"), FindingSeverity::Warning);
        assert_eq!(map_severity("WLAST"), FindingSeverity::Warning);
        assert_eq!(map_severity("INUSD"), FindingSeverity::Info);
        assert_eq!(map_severity("HXYZ"), FindingSeverity::Hint);
        assert_eq!(map_severity(""), FindingSeverity::Warning);
        assert_eq!(map_severity("ZZZ"), FindingSeverity::Warning);
    }

    #[test]
    fn multiple_findings_keep_order() {
        let output = "L 1 (NASGU): first.\nL 5: second.\nL 3 (E99): third.";
        let findings = parse_report(output);
        assert_eq!(findings.len(), 3);
        assert_eq!(findings[0].line, 1);
        assert_eq!(findings[1].line, 5);
        assert_eq!(findings[2].line, 3);
        assert_eq!(findings[2].severity, FindingSeverity::Error);
    }

    #[test]
    fn empty_report_is_empty() {
        assert!(parse_report("").is_empty());
        assert!(parse_report("\n\n").is_empty());
    }
}

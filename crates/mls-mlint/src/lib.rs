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

//! Driver for MATLAB's `mlint` Code Analyzer.
//!
//! mlint is invoked as a separate process on a file and writes one finding
//! per line, e.g.
//!
//! ```text
//! L 4 (C 12): NOPRT: Terminate statement with semicolon to suppress output.
//! L 9: Invalid syntax at end of line.
//! ```
//!
//! This crate locates the executable, runs it with a timeout on a temp-file
//! snapshot of the buffer, and parses the textual report into structured
//! [`Finding`]s. Absence of the executable and unparseable report lines are
//! expected conditions, not failures: the server degrades to fewer
//! diagnostics rather than erroring.

mod report;
mod runner;

pub use report::{map_severity, parse_report, Finding, FindingSeverity};
pub use runner::{AnalyzerError, MlintRunner};

// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Cheap per-line pre-filter
//!
//! Build logs are dominated by lines that cannot possibly be diagnostics.
//! [`could_match_diagnostic`] rejects those in near-constant time so the
//! regex patterns in `diagnostics` and `testing` only ever run on candidate
//! lines. The filter is a conservative over-approximation: a false positive
//! costs one wasted regex attempt, a false negative would lose a diagnostic,
//! so every pattern in this crate must be reachable through the keyword set
//! below.

/// Lines longer than this are never treated as diagnostics. Real compiler
/// and linker output stays far below it; longer lines are echoed data and a
/// regex backtracking hazard.
pub const MAX_DIAGNOSTIC_LINE_LEN: usize = 4096;

/// Keyword set covering every pattern the extractors recognize.
const KEYWORDS: &[&str] = &[
    "error:",
    "warning:",
    "note:",
    "Test Suite",
    "Test Case",
    "Test ",
    "\u{2714}", // ✔
    "\u{2718}", // ✘
    "\u{2713}", // ✓
    "\u{2717}", // ✗
    "Undefined symbols",
    "duplicate symbol",
    "referenced from",
    "ld:",
    "Build complete",
    "** BUILD",
    "** TEST",
];

/// Decide whether a line could match any diagnostic pattern.
///
/// Rejects empty lines, over-long lines, and lines containing none of the
/// keywords the extractors anchor on.
#[must_use]
pub fn could_match_diagnostic(line: &str) -> bool {
    if line.is_empty() || line.len() > MAX_DIAGNOSTIC_LINE_LEN {
        return false;
    }
    KEYWORDS.iter().any(|keyword| line.contains(keyword))
}

/// Decide whether a line looks like embedded structured data rather than a
/// diagnostic.
///
/// Compilers echo offending source inside `note:` and `warning:`
/// explanations; a source line such as `print("error: \(reason)")` contains
/// the `error:` keyword and would otherwise match the bare-error pattern.
/// Interpolation escapes, bracketed openings, and key/value shapes mark a
/// line as data. Applied to locationless patterns only — a real
/// `path:line:col:` header is kept even when its message quotes such syntax.
#[must_use]
pub fn looks_structured_data(line: &str) -> bool {
    let trimmed = line.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return true;
    }
    // Swift string interpolation inside echoed source
    if line.contains("\\(") {
        return true;
    }
    // JSON-ish key/value or bracketed structure embedded mid-line
    line.contains("{\"") || line.contains("[\"") || line.contains("\": ")
}

/// Detect a caret/tilde visual pointer line.
///
/// These restate the preceding diagnostic for human readers and must not be
/// counted a second time.
#[must_use]
pub fn is_visual_pointer(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| c == '^' || c == '~')
}

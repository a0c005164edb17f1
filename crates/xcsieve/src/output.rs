// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Result encoders
//!
//! The parse core hands over the full [`BuildResult`]; what to omit and how
//! to serialize it is decided here, per format: a structured JSON object,
//! a token-dense line format for agents, or GitHub Actions workflow
//! annotations.

use std::fmt::Write as _;

use xcsieve_parse::{BuildResult, LinkerError};

use crate::config::OutputFormat;

/// Render a result in the requested format.
///
/// # Errors
///
/// Returns a `serde_json::Error` only for the JSON encoder; the line-based
/// encoders are infallible.
pub fn render(result: &BuildResult, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(result),
        OutputFormat::Compact => Ok(render_compact(result)),
        OutputFormat::GithubActions => Ok(render_github_actions(result)),
    }
}

/// One header line of `key=value` tokens, then one line per record.
///
/// Coverage file detail and warning bodies are deliberately omitted; the
/// header carries their aggregates. Writing into a `String` cannot fail, so
/// the write results are discarded.
fn render_compact(result: &BuildResult) -> String {
    let mut out = String::new();
    let summary = &result.summary;

    let status = if result.succeeded() { "succeeded" } else { "failed" };
    let _ = write!(
        out,
        "status={status} errors={} warnings={} linker={} failed={} passed={}",
        summary.errors, summary.warnings, summary.linker_errors, summary.failed_tests,
        summary.passed_tests
    );
    if let Some(secs) = summary.build_time_seconds {
        let _ = write!(out, " time={secs:.2}s");
    }
    if let Some(percent) = summary.coverage_percent {
        let _ = write!(out, " coverage={percent:.1}%");
    }
    out.push('\n');

    for error in &result.errors {
        let _ = writeln!(
            out,
            "E {} {}",
            location_token(&error.file, error.line),
            error.message
        );
    }
    for warning in &result.warnings {
        let _ = writeln!(
            out,
            "W {} {}",
            location_token(&warning.file, warning.line),
            warning.message
        );
    }
    for linker_error in &result.linker_errors {
        let _ = match linker_error {
            LinkerError::UndefinedSymbol {
                symbol,
                architecture,
                referenced_from,
            } => writeln!(out, "L undefined {symbol} {architecture} {referenced_from}"),
            LinkerError::DuplicateSymbol {
                symbol,
                architecture,
                conflicting_files,
            } => writeln!(
                out,
                "L duplicate {symbol} {architecture} {}",
                conflicting_files.join(", ")
            ),
        };
    }
    for test in &result.failed_tests {
        let _ = match test.duration_seconds {
            Some(secs) => writeln!(
                out,
                "F {} ({secs:.2}s) {}",
                test.test_identifier, test.message
            ),
            None => writeln!(out, "F {} {}", test.test_identifier, test.message),
        };
    }
    for slow in &result.slow_tests {
        let _ = writeln!(
            out,
            "S {} {:.2}s",
            slow.test_identifier, slow.duration_seconds
        );
    }

    out
}

fn location_token(file: &str, line: Option<u32>) -> String {
    match (file.is_empty(), line) {
        (true, _) => "-".to_string(),
        (false, Some(line)) => format!("{file}:{line}"),
        (false, None) => file.to_string(),
    }
}

/// `::error`/`::warning` workflow commands, one per record, closed by a
/// `::notice` summary line.
fn render_github_actions(result: &BuildResult) -> String {
    let mut out = String::new();

    for error in &result.errors {
        out.push_str(&annotation("error", &error.file, error.line, &error.message));
    }
    for warning in &result.warnings {
        out.push_str(&annotation(
            "warning",
            &warning.file,
            warning.line,
            &warning.message,
        ));
    }
    for linker_error in &result.linker_errors {
        let message = match linker_error {
            LinkerError::UndefinedSymbol {
                symbol,
                architecture,
                referenced_from,
            } => format!(
                "Undefined symbol {symbol} for architecture {architecture} (referenced from {referenced_from})"
            ),
            LinkerError::DuplicateSymbol {
                symbol,
                architecture,
                conflicting_files,
            } => format!(
                "Duplicate symbol {symbol} for architecture {architecture} in {}",
                conflicting_files.join(", ")
            ),
        };
        out.push_str(&annotation("error", "", None, &message));
    }
    for test in &result.failed_tests {
        let message = format!("Test {} failed: {}", test.test_identifier, test.message);
        out.push_str(&annotation("error", "", None, &message));
    }

    let summary = &result.summary;
    let status = if result.succeeded() { "succeeded" } else { "failed" };
    let mut line = format!(
        "Build {status}: {} errors, {} warnings, {} linker errors, {} failed tests, {} passed tests",
        summary.errors, summary.warnings, summary.linker_errors, summary.failed_tests,
        summary.passed_tests
    );
    if let Some(percent) = summary.coverage_percent {
        let _ = write!(line, ", {percent:.1}% line coverage");
    }
    let _ = writeln!(out, "::notice::{}", escape_data(&line));

    out
}

fn annotation(level: &str, file: &str, line: Option<u32>, message: &str) -> String {
    let mut properties = String::new();
    if !file.is_empty() {
        let _ = write!(properties, " file={}", escape_property(file));
        if let Some(line) = line {
            let _ = write!(properties, ",line={line}");
        }
    }
    format!("::{level}{properties}::{}\n", escape_data(message))
}

/// Escaping for workflow-command message data.
fn escape_data(text: &str) -> String {
    text.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Escaping for workflow-command property values.
fn escape_property(text: &str) -> String {
    escape_data(text).replace(':', "%3A").replace(',', "%2C")
}

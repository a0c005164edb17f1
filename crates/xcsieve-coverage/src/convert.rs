// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Coverage conversion pipelines
//!
//! Two external pipelines converge on the same [`CodeCoverage`] value:
//!
//! - *raw profile*: `llvm-profdata merge` produces an indexed profile,
//!   `llvm-cov export` emits a JSON summary over it;
//! - *result bundle*: `xccov view --report --json` emits a structurally
//!   different JSON report directly from an `.xcresult` bundle.
//!
//! Each schema gets its own serde decode; [`normalize_percent`] reconciles
//! the fraction-vs-percentage ambiguity in xccov numbers.

use std::path::Path;

use serde::Deserialize;

use xcsieve_parse::result::{CodeCoverage, FileCoverage};

use crate::command::CommandRunner;
use crate::error::CoverageError;
use crate::locate::RawProfileArtifacts;

// ============================================================================
// llvm-cov export schema (raw-profile pipeline)
// ============================================================================

#[derive(Debug, Deserialize)]
struct LlvmExport {
    data: Vec<LlvmData>,
}

#[derive(Debug, Deserialize)]
struct LlvmData {
    files: Vec<LlvmFile>,
    totals: Option<LlvmSummary>,
}

#[derive(Debug, Deserialize)]
struct LlvmFile {
    filename: String,
    summary: LlvmSummary,
}

#[derive(Debug, Deserialize)]
struct LlvmSummary {
    lines: LlvmLines,
}

#[derive(Debug, Deserialize)]
struct LlvmLines {
    count: u64,
    covered: u64,
    percent: f64,
}

// ============================================================================
// xccov report schema (result-bundle pipeline)
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct XccovReport {
    line_coverage: f64,
    #[serde(default)]
    targets: Vec<XccovTarget>,
}

#[derive(Debug, Deserialize)]
struct XccovTarget {
    #[serde(default)]
    files: Vec<XccovFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct XccovFile {
    path: String,
    name: String,
    line_coverage: f64,
    covered_lines: u64,
    executable_lines: u64,
}

// ============================================================================
// Conversion
// ============================================================================

/// Normalize a coverage number to the 0–100 percentage convention.
///
/// xccov reports fractions (`0.84`) in some schema versions and
/// pre-multiplied percentages (`84.0`) in others. Values at or below 1.0
/// are fractions; 1.0 itself means a fully covered file.
#[must_use]
pub fn normalize_percent(value: f64) -> f64 {
    if value <= 1.0 { value * 100.0 } else { value }
}

/// Run the raw-profile pipeline: merge, export, decode.
///
/// # Errors
///
/// Returns `CoverageError::ToolFailed` when a step exits nonzero,
/// `CoverageError::Io` when a tool cannot be spawned, and
/// `CoverageError::Json`/`EmptyReport` for malformed or empty output.
pub fn convert_raw_profile(
    runner: &dyn CommandRunner,
    artifacts: &RawProfileArtifacts,
) -> Result<CodeCoverage, CoverageError> {
    let profile = artifacts.profile.display().to_string();
    let indexed_path = artifacts.profile.with_extension("profdata");
    let indexed = indexed_path.display().to_string();
    let binary = artifacts.test_binary.display().to_string();

    let merge = runner.run(
        "xcrun",
        &["llvm-profdata", "merge", "-sparse", &profile, "-o", &indexed],
    )?;
    if !merge.success() {
        return Err(CoverageError::ToolFailed {
            tool: "llvm-profdata merge".to_string(),
            status: merge.status,
            stderr: merge.stderr.trim().to_string(),
        });
    }

    let export = runner.run(
        "xcrun",
        &[
            "llvm-cov",
            "export",
            "-summary-only",
            &binary,
            "-instr-profile",
            &indexed,
        ],
    )?;
    if !export.success() {
        return Err(CoverageError::ToolFailed {
            tool: "llvm-cov export".to_string(),
            status: export.status,
            stderr: export.stderr.trim().to_string(),
        });
    }

    parse_llvm_cov_json(&export.stdout)
}

/// Run the result-bundle pipeline: export the bundle report and decode it.
///
/// # Errors
///
/// Same failure modes as [`convert_raw_profile`].
pub fn convert_result_bundle(
    runner: &dyn CommandRunner,
    bundle: &Path,
) -> Result<CodeCoverage, CoverageError> {
    let bundle = bundle.display().to_string();
    let report = runner.run("xcrun", &["xccov", "view", "--report", "--json", &bundle])?;
    if !report.success() {
        return Err(CoverageError::ToolFailed {
            tool: "xccov view".to_string(),
            status: report.status,
            stderr: report.stderr.trim().to_string(),
        });
    }
    parse_xccov_json(&report.stdout)
}

/// Decode an `llvm-cov export -summary-only` payload.
///
/// # Errors
///
/// Returns `CoverageError::Json` on schema mismatch, `EmptyReport` when the
/// payload carries no files.
pub fn parse_llvm_cov_json(json: &str) -> Result<CodeCoverage, CoverageError> {
    let export: LlvmExport = serde_json::from_str(json)?;
    let data = export.data.into_iter().next().ok_or(CoverageError::EmptyReport)?;
    if data.files.is_empty() {
        return Err(CoverageError::EmptyReport);
    }

    let files = data
        .files
        .into_iter()
        .map(|file| {
            let covered = file.summary.lines.covered.min(file.summary.lines.count);
            FileCoverage {
                name: file_name_of(&file.filename),
                path: file.filename,
                line_coverage_percent: file.summary.lines.percent,
                covered_lines: covered,
                executable_lines: file.summary.lines.count,
            }
        })
        .collect();

    let mut coverage = CodeCoverage::from_files(files);
    if let Some(totals) = data.totals {
        coverage.line_coverage_percent = totals.lines.percent;
    }
    Ok(coverage)
}

/// Decode an `xccov view --report --json` payload, normalizing its
/// fraction-or-percentage numbers.
///
/// # Errors
///
/// Returns `CoverageError::Json` on schema mismatch, `EmptyReport` when no
/// target carries files.
pub fn parse_xccov_json(json: &str) -> Result<CodeCoverage, CoverageError> {
    let report: XccovReport = serde_json::from_str(json)?;

    let files: Vec<FileCoverage> = report
        .targets
        .into_iter()
        .flat_map(|target| target.files)
        .map(|file| {
            let covered = file.covered_lines.min(file.executable_lines);
            FileCoverage {
                path: file.path,
                name: file.name,
                line_coverage_percent: normalize_percent(file.line_coverage),
                covered_lines: covered,
                executable_lines: file.executable_lines,
            }
        })
        .collect();

    if files.is_empty() {
        return Err(CoverageError::EmptyReport);
    }

    Ok(CodeCoverage {
        line_coverage_percent: normalize_percent(report.line_coverage),
        files,
    })
}

fn file_name_of(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Single-pass result aggregation
//!
//! [`parse_build_output`] folds every line of a buffered build log into one
//! [`BuildResult`]. The input is consumed in full before parsing begins;
//! there is exactly one writer of the result under construction. Status and
//! summary counts are derived from the final collections in the terminal
//! step, never tracked independently, so the counts always equal the
//! cardinality of the detail collections.

use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::sync::LazyLock;

use regex::Regex;

use crate::classify;
use crate::diagnostics::{self, LinkerBlock};
use crate::error::ParseError;
use crate::result::{
    BuildError, BuildResult, BuildStatus, BuildSummary, BuildWarning, FailedTest, LinkerError,
    SlowTest,
};
use crate::testing;

static BUILD_COMPLETE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Build complete!\s*\((?P<secs>[\d.]+)s\)$").expect("pattern compiles")
});

static XCODEBUILD_RESULT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\*\* (?:BUILD|TEST|CLEAN) (?:SUCCEEDED|FAILED) \*\*(?:\s*\[(?P<secs>[\d.]+) sec\])?$")
        .expect("pattern compiles")
});

/// Options controlling one parse invocation
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Parse per-test durations and collect slow tests
    pub track_durations: bool,
    /// Threshold in seconds above which a test is reported as slow
    pub slow_test_threshold: f64,
    /// Treat any warning as failing the build (externally requested)
    pub warnings_as_errors: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            track_durations: false,
            slow_test_threshold: 1.0,
            warnings_as_errors: false,
        }
    }
}

impl ParseOptions {
    /// Validate option values that the type system cannot.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InvalidOption` when the slow-test threshold is
    /// negative or not a number.
    pub fn validate(&self) -> Result<(), ParseError> {
        if !self.slow_test_threshold.is_finite() || self.slow_test_threshold < 0.0 {
            return Err(ParseError::InvalidOption {
                message: format!(
                    "slow test threshold must be a non-negative number, got {}",
                    self.slow_test_threshold
                ),
            });
        }
        Ok(())
    }
}

/// Transient extraction state, owned exclusively by one parse invocation
/// and destroyed when it completes.
#[derive(Debug, Default)]
pub struct ParseState {
    /// Fingerprints of diagnostics already emitted, for de-duplication
    pub(crate) seen_diagnostics: HashSet<String>,
    /// The currently-open multi-line linker block, if any
    pub(crate) linker_block: LinkerBlock,
    /// Index into the failed-test collection by identifier, so assertion
    /// and outcome lines for the same test merge into one record
    pub(crate) failed_by_identifier: HashMap<String, usize>,
}

impl ParseState {
    /// Record a diagnostic fingerprint; returns `true` on first occurrence.
    pub(crate) fn remember_diagnostic(
        &mut self,
        file: &str,
        line: Option<u32>,
        message: &str,
    ) -> bool {
        self.seen_diagnostics
            .insert(diagnostics::diagnostic_fingerprint(file, line, message))
    }
}

/// The growing result, written only by this module and the extractors it
/// drives.
#[derive(Debug, Default)]
pub(crate) struct ResultBuilder {
    pub(crate) errors: Vec<BuildError>,
    pub(crate) warnings: Vec<BuildWarning>,
    pub(crate) linker_errors: Vec<LinkerError>,
    pub(crate) failed_tests: Vec<FailedTest>,
    pub(crate) slow_tests: Vec<SlowTest>,
    pub(crate) passed_tests: usize,
    pub(crate) build_time_seconds: Option<f64>,
    pub(crate) tested_target: Option<String>,
}

impl ResultBuilder {
    /// Terminal step: derive status and counts from the final collections.
    fn finish(self, options: &ParseOptions) -> BuildResult {
        let failed = !self.errors.is_empty()
            || !self.linker_errors.is_empty()
            || !self.failed_tests.is_empty()
            || (options.warnings_as_errors && !self.warnings.is_empty());

        let summary = BuildSummary {
            errors: self.errors.len(),
            warnings: self.warnings.len(),
            linker_errors: self.linker_errors.len(),
            failed_tests: self.failed_tests.len(),
            passed_tests: self.passed_tests,
            build_time_seconds: self.build_time_seconds,
            coverage_percent: None,
        };

        BuildResult {
            status: if failed {
                BuildStatus::Failed
            } else {
                BuildStatus::Succeeded
            },
            summary,
            errors: self.errors,
            warnings: self.warnings,
            linker_errors: self.linker_errors,
            failed_tests: self.failed_tests,
            slow_tests: self.slow_tests,
            tested_target: self.tested_target,
            coverage: None,
            parsed_at: chrono::Utc::now(),
        }
    }
}

/// Parse a complete build/test log into a [`BuildResult`].
///
/// One linear pass: an open linker block consumes continuation lines first
/// (they carry no keywords), then the classifier gates the extractors, which
/// run in priority order — test outcomes, diagnostics, then the
/// aggregator's own timing markers. Lines matching nothing are dropped
/// silently.
#[must_use]
pub fn parse_build_output(input: &str, options: &ParseOptions) -> BuildResult {
    let mut state = ParseState::default();
    let mut builder = ResultBuilder::default();

    for line in input.lines() {
        if diagnostics::continue_linker_block(line, &mut state, &mut builder) {
            continue;
        }
        if !classify::could_match_diagnostic(line) {
            continue;
        }
        if testing::extract(line, &mut state, &mut builder, options) {
            continue;
        }
        if diagnostics::extract(line, &mut state, &mut builder) {
            continue;
        }
        if let Some(caps) = BUILD_COMPLETE.captures(line) {
            builder.build_time_seconds = caps["secs"].parse().ok();
            continue;
        }
        if let Some(caps) = XCODEBUILD_RESULT.captures(line) {
            if let Some(secs) = caps.name("secs") {
                builder.build_time_seconds = secs.as_str().parse().ok();
            }
            continue;
        }
    }

    diagnostics::finish_linker_block(&mut state, &mut builder);

    tracing::debug!(
        errors = builder.errors.len(),
        warnings = builder.warnings.len(),
        linker_errors = builder.linker_errors.len(),
        failed_tests = builder.failed_tests.len(),
        passed_tests = builder.passed_tests,
        "Parse complete"
    );
    builder.finish(options)
}

/// Read a build log to completion and parse it.
///
/// The whole stream is buffered before parsing begins; end-of-stream over a
/// pipe is the only reliable completion signal the upstream tools provide.
///
/// # Errors
///
/// Returns `ParseError::Io` when the stream cannot be read.
pub fn parse_build_reader(
    mut reader: impl Read,
    options: &ParseOptions,
) -> Result<BuildResult, ParseError> {
    let mut input = String::new();
    reader.read_to_string(&mut input)?;
    Ok(parse_build_output(&input, options))
}

//! Typed build result records
//!
//! Everything the extraction pass produces ends up in a [`BuildResult`]: the
//! root aggregate handed to the output encoders. The formatting layer decides
//! what to omit; nothing here is dropped for the sake of rendering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A compiler error with an optional source location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildError {
    /// Source file path ("" for locationless diagnostics)
    pub file: String,
    /// 1-based line number, absent for bare `error:` lines
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub line: Option<u32>,
    /// Diagnostic message, never empty
    pub message: String,
}

/// A compiler warning with an optional source location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildWarning {
    /// Source file path ("" for locationless diagnostics)
    pub file: String,
    /// 1-based line number, absent for bare `warning:` lines
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub line: Option<u32>,
    /// Diagnostic message, never empty
    pub message: String,
}

/// A linker diagnostic, one variant per ld block kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LinkerError {
    /// An undefined symbol report
    UndefinedSymbol {
        /// Mangled or quoted symbol name
        symbol: String,
        /// Target architecture from the block header
        architecture: String,
        /// The "referenced from" site, verbatim (e.g. `_main in main.o`)
        referenced_from: String,
    },
    /// A duplicate symbol report
    DuplicateSymbol {
        /// Mangled or quoted symbol name
        symbol: String,
        /// Target architecture from the closing ld line, "unknown" if the
        /// block was truncated before it
        architecture: String,
        /// Object files defining the symbol, at least two
        conflicting_files: Vec<String>,
    },
}

/// A single failed test, normalized across XCTest and Swift Testing output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedTest {
    /// Test identifier, e.g. `SomeTests.testExample` or `example()`
    pub test_identifier: String,
    /// Assertion or issue message, captured verbatim
    pub message: String,
    /// Wall-clock duration, present when duration tracking is enabled
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub duration_seconds: Option<f64>,
}

/// A test whose duration exceeded the configured slow-test threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlowTest {
    /// Test identifier
    pub test_identifier: String,
    /// Wall-clock duration in seconds
    pub duration_seconds: f64,
}

/// Overall build status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStatus {
    /// No errors, linker errors, or failed tests
    Succeeded,
    /// At least one error, linker error, or failed test
    Failed,
}

/// Derived, read-only counts over the detail collections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildSummary {
    /// Number of compiler errors
    pub errors: usize,
    /// Number of compiler warnings
    pub warnings: usize,
    /// Number of linker errors
    pub linker_errors: usize,
    /// Number of failed tests
    pub failed_tests: usize,
    /// Number of passed tests (tracked in aggregate, not per test)
    pub passed_tests: usize,
    /// Build wall-clock time from the toolchain's completion marker
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub build_time_seconds: Option<f64>,
    /// Aggregate line coverage, present when coverage was collected
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub coverage_percent: Option<f64>,
}

/// Line coverage for one source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileCoverage {
    /// Full path to the source file
    pub path: String,
    /// File name component
    pub name: String,
    /// Covered-line percentage, 0 to 100
    pub line_coverage_percent: f64,
    /// Number of executed executable lines
    pub covered_lines: u64,
    /// Number of executable lines
    pub executable_lines: u64,
}

impl FileCoverage {
    /// The defined coverage ratio: `100 * covered / executable`, 0 when
    /// there are no executable lines.
    #[must_use]
    pub fn percent(covered_lines: u64, executable_lines: u64) -> f64 {
        if executable_lines == 0 {
            0.0
        } else {
            covered_lines as f64 * 100.0 / executable_lines as f64
        }
    }
}

/// Converted, target-filtered code coverage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeCoverage {
    /// Aggregate covered-line percentage over `files`
    pub line_coverage_percent: f64,
    /// Per-file coverage, in report order
    pub files: Vec<FileCoverage>,
}

impl CodeCoverage {
    /// Build a report from per-file entries, deriving the aggregate
    /// percentage from the summed line counts.
    #[must_use]
    pub fn from_files(files: Vec<FileCoverage>) -> Self {
        let mut coverage = Self {
            line_coverage_percent: 0.0,
            files,
        };
        coverage.recompute_totals();
        coverage
    }

    /// Recompute the aggregate percentage from the current file set.
    pub fn recompute_totals(&mut self) {
        let covered: u64 = self.files.iter().map(|f| f.covered_lines).sum();
        let executable: u64 = self.files.iter().map(|f| f.executable_lines).sum();
        self.line_coverage_percent = FileCoverage::percent(covered, executable);
    }
}

/// The root aggregate produced by one parse invocation
///
/// Constructed once per input stream and immutable once handed to the
/// formatting collaborator, except for [`BuildResult::attach_coverage`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildResult {
    /// Overall status, derived from the detail collections
    pub status: BuildStatus,
    /// Derived counts
    pub summary: BuildSummary,
    /// Compiler errors, in input order
    pub errors: Vec<BuildError>,
    /// Compiler warnings, in input order
    pub warnings: Vec<BuildWarning>,
    /// Linker errors, in input order
    pub linker_errors: Vec<LinkerError>,
    /// Failed tests, in input order
    pub failed_tests: Vec<FailedTest>,
    /// Tests exceeding the slow-test threshold (empty when duration
    /// tracking is disabled)
    pub slow_tests: Vec<SlowTest>,
    /// Name of the tested target, when the input stream revealed one
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tested_target: Option<String>,
    /// Code coverage, when collected and merged
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub coverage: Option<CodeCoverage>,
    /// Timestamp of the parse invocation
    pub parsed_at: DateTime<Utc>,
}

impl BuildResult {
    /// Check whether the build succeeded
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.status == BuildStatus::Succeeded
    }

    /// Merge a converted coverage report into the result
    ///
    /// The aggregator is the only writer of the root result; the coverage
    /// subsystem produces the value and hands it over here.
    pub fn attach_coverage(&mut self, coverage: CodeCoverage) {
        self.summary.coverage_percent = Some(coverage.line_coverage_percent);
        self.coverage = Some(coverage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn test_file_coverage_percent() {
        assert_eq!(FileCoverage::percent(50, 100), 50.0);
        assert_eq!(FileCoverage::percent(3, 4), 75.0);
        assert_eq!(FileCoverage::percent(0, 0), 0.0);
        assert_eq!(FileCoverage::percent(10, 10), 100.0);
    }

    #[test]
    fn test_code_coverage_from_files() {
        let coverage = CodeCoverage::from_files(vec![
            FileCoverage {
                path: "/pkg/Sources/Lib/A.swift".to_string(),
                name: "A.swift".to_string(),
                line_coverage_percent: 50.0,
                covered_lines: 10,
                executable_lines: 20,
            },
            FileCoverage {
                path: "/pkg/Sources/Lib/B.swift".to_string(),
                name: "B.swift".to_string(),
                line_coverage_percent: 100.0,
                covered_lines: 20,
                executable_lines: 20,
            },
        ]);

        assert_eq!(coverage.line_coverage_percent, 75.0);
    }

    #[test]
    fn test_code_coverage_empty_files() {
        let coverage = CodeCoverage::from_files(Vec::new());
        assert_eq!(coverage.line_coverage_percent, 0.0);
    }

    #[test]
    fn test_linker_error_serialization_tags() {
        let undefined = LinkerError::UndefinedSymbol {
            symbol: "_missing".to_string(),
            architecture: "arm64".to_string(),
            referenced_from: "_main in main.o".to_string(),
        };
        let json = serde_json::to_string(&undefined).expect("Should serialize");
        assert!(json.contains("\"kind\":\"undefined_symbol\""));

        let duplicate = LinkerError::DuplicateSymbol {
            symbol: "_shared".to_string(),
            architecture: "arm64".to_string(),
            conflicting_files: vec!["a.o".to_string(), "b.o".to_string()],
        };
        let json = serde_json::to_string(&duplicate).expect("Should serialize");
        assert!(json.contains("\"kind\":\"duplicate_symbol\""));

        let roundtrip: LinkerError = serde_json::from_str(&json).expect("Should deserialize");
        assert_eq!(roundtrip, duplicate);
    }

    #[test]
    fn test_build_status_serialization() {
        assert_eq!(
            serde_json::to_string(&BuildStatus::Succeeded).expect("serialize"),
            "\"succeeded\""
        );
        assert_eq!(
            serde_json::to_string(&BuildStatus::Failed).expect("serialize"),
            "\"failed\""
        );
    }

    #[test]
    fn test_attach_coverage_updates_summary() {
        let mut result = BuildResult {
            status: BuildStatus::Succeeded,
            summary: BuildSummary {
                errors: 0,
                warnings: 0,
                linker_errors: 0,
                failed_tests: 0,
                passed_tests: 1,
                build_time_seconds: None,
                coverage_percent: None,
            },
            errors: Vec::new(),
            warnings: Vec::new(),
            linker_errors: Vec::new(),
            failed_tests: Vec::new(),
            slow_tests: Vec::new(),
            tested_target: None,
            coverage: None,
            parsed_at: Utc::now(),
        };

        result.attach_coverage(CodeCoverage::from_files(vec![FileCoverage {
            path: "/pkg/Sources/Lib/A.swift".to_string(),
            name: "A.swift".to_string(),
            line_coverage_percent: 80.0,
            covered_lines: 8,
            executable_lines: 10,
        }]));

        assert_eq!(result.summary.coverage_percent, Some(80.0));
        assert!(result.coverage.is_some());
    }
}

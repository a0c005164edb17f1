// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Integration tests for xcsieve-parse
//!
//! End-to-end scenarios over realistic build logs, plus a scale guard
//! against regex backtracking regressions on large inputs.

use std::fmt::Write as _;
use std::time::{Duration, Instant};

use proptest::prelude::*;
use xcsieve_parse::{BuildStatus, LinkerError, ParseOptions, parse_build_output};

#[test]
fn test_single_compiler_error_scenario() {
    let result = parse_build_output(
        "main.swift:15:5: error: use of undeclared identifier 'unknown'\n",
        &ParseOptions::default(),
    );

    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].file, "main.swift");
    assert_eq!(result.errors[0].line, Some(15));
    assert_eq!(
        result.errors[0].message,
        "use of undeclared identifier 'unknown'"
    );
    assert_eq!(result.status, BuildStatus::Failed);
    assert_eq!(result.summary.errors, 1);
}

#[test]
fn test_warning_with_interpolated_echo_scenario() {
    // a real warning header, the offending source line (which itself
    // contains a keyword and interpolation syntax), and the caret pointer
    let log = "\
/pkg/Sources/App/main.swift:10:11: warning: string interpolation produces a debug description for an optional value
        print(\"warning: \\(message)\")
                         ^~~~~~~~~~
";
    let result = parse_build_output(log, &ParseOptions::default());

    assert_eq!(result.summary.warnings, 1);
    assert_eq!(result.summary.errors, 0);
    assert_eq!(result.status, BuildStatus::Succeeded);
}

#[test]
fn test_undefined_symbol_scenario() {
    let log = "\
Undefined symbols for architecture arm64:
  \"_curl_easy_init\", referenced from:
      _fetch in network.o
ld: symbol(s) not found for architecture arm64
clang: error: linker command failed with exit code 1 (use -v to see invocation)
";
    let result = parse_build_output(log, &ParseOptions::default());

    assert_eq!(result.linker_errors.len(), 1);
    match &result.linker_errors[0] {
        LinkerError::UndefinedSymbol {
            symbol,
            architecture,
            referenced_from,
        } => {
            assert_eq!(symbol, "_curl_easy_init");
            assert_eq!(architecture, "arm64");
            assert_eq!(referenced_from, "_fetch in network.o");
        }
        other => panic!("Expected undefined symbol variant, got {other:?}"),
    }
    assert_eq!(result.status, BuildStatus::Failed);
}

#[test]
fn test_full_swift_test_session() {
    let log = "\
Building for debugging...
[1/3] Compiling MyLib Calculator.swift
[2/3] Compiling MyLibTests CalculatorTests.swift
Build complete! (3.21s)
Test Suite 'All tests' started at 2026-01-10 09:00:00.000
Test Suite 'MyLibTests.xctest' started at 2026-01-10 09:00:00.001
Test Suite 'CalculatorTests' started at 2026-01-10 09:00:00.002
Test Case '-[MyLibTests.CalculatorTests testAdd]' started.
Test Case '-[MyLibTests.CalculatorTests testAdd]' passed (0.001 seconds).
Test Case '-[MyLibTests.CalculatorTests testDivide]' started.
/pkg/Tests/MyLibTests/CalculatorTests.swift:28: error: -[MyLibTests.CalculatorTests testDivide] : XCTAssertEqual failed: (\"inf\") is not equal to (\"2\")
Test Case '-[MyLibTests.CalculatorTests testDivide]' failed (0.004 seconds).
Test Suite 'CalculatorTests' failed at 2026-01-10 09:00:00.010
Test Suite 'MyLibTests.xctest' failed at 2026-01-10 09:00:00.011
Test Suite 'All tests' failed at 2026-01-10 09:00:00.012
";
    let result = parse_build_output(log, &ParseOptions::default());

    assert_eq!(result.summary.passed_tests, 1);
    assert_eq!(result.summary.failed_tests, 1);
    assert_eq!(
        result.failed_tests[0].test_identifier,
        "CalculatorTests.testDivide"
    );
    assert_eq!(result.summary.build_time_seconds, Some(3.21));
    assert_eq!(result.tested_target.as_deref(), Some("MyLibTests"));
    assert_eq!(result.status, BuildStatus::Failed);
}

#[test]
fn test_status_derivation_over_mixed_outcomes() {
    // warnings alone succeed
    let warnings_only = parse_build_output(
        "/pkg/A.swift:1:1: warning: something minor\n",
        &ParseOptions::default(),
    );
    assert_eq!(warnings_only.status, BuildStatus::Succeeded);

    // any single failing collection fails the build
    for log in [
        "error: no such module 'Foo'\n",
        "Test Case '-[T.S testX]' failed (0.001 seconds).\n",
        "duplicate symbol '_x' in:\n    a.o\n    b.o\nld: 1 duplicate symbol for architecture arm64\n",
    ] {
        let result = parse_build_output(log, &ParseOptions::default());
        assert_eq!(result.status, BuildStatus::Failed, "log: {log}");
    }
}

#[test]
fn test_serialized_result_roundtrip() {
    let log = "\
main.swift:15:5: error: use of undeclared identifier 'unknown'
Test Case '-[T.S testX]' failed (0.001 seconds).
";
    let result = parse_build_output(log, &ParseOptions::default());
    let json = serde_json::to_string(&result).expect("Should serialize");
    let roundtrip: xcsieve_parse::BuildResult =
        serde_json::from_str(&json).expect("Should deserialize");
    assert_eq!(result, roundtrip);
}

#[test]
fn test_multi_megabyte_log_parses_quickly() {
    // several thousand lines, a small minority of which are diagnostics,
    // padded with realistic non-matching compiler chatter
    let mut log = String::new();
    for i in 0..30_000 {
        if i % 1000 == 0 {
            writeln!(
                log,
                "/pkg/Sources/App/File{i}.swift:10:5: warning: variable 'x{i}' was never used"
            )
            .expect("write to string");
        } else {
            writeln!(
                log,
                "[{i}/30000] Compiling module App source file number {i} with some flags -Onone -g"
            )
            .expect("write to string");
        }
    }
    assert!(log.len() > 2_000_000, "fixture should be multi-megabyte");

    let started = Instant::now();
    let result = parse_build_output(&log, &ParseOptions::default());
    let elapsed = started.elapsed();

    assert_eq!(result.summary.warnings, 30);
    assert_eq!(result.status, BuildStatus::Succeeded);
    assert!(
        elapsed < Duration::from_secs(2),
        "parse took {elapsed:?} on a {} byte log",
        log.len()
    );
}

proptest! {
    /// Arbitrary text never panics the parser and never yields records
    /// violating the data-model invariants.
    #[test]
    fn prop_arbitrary_input_never_panics(input in "\\PC{0,200}") {
        let result = parse_build_output(&input, &ParseOptions::default());
        for error in &result.errors {
            prop_assert!(!error.message.is_empty());
            if let Some(line) = error.line {
                prop_assert!(line >= 1);
            }
        }
        prop_assert_eq!(result.summary.errors, result.errors.len());
        prop_assert_eq!(result.summary.warnings, result.warnings.len());
    }

    /// Duplicate-symbol records always carry at least two files.
    #[test]
    fn prop_duplicate_symbol_file_floor(count in 0usize..5) {
        let mut log = String::from("duplicate symbol '_x' in:\n");
        for i in 0..count {
            log.push_str(&format!("    /build/file{i}.o\n"));
        }
        let result = parse_build_output(&log, &ParseOptions::default());
        if count >= 2 {
            prop_assert_eq!(result.linker_errors.len(), 1);
        } else {
            prop_assert!(result.linker_errors.is_empty());
        }
    }
}

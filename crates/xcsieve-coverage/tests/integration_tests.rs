// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Integration tests for xcsieve-coverage
//!
//! Pipelines are exercised end-to-end against a scripted command runner
//! returning canned tool output, over real temporary directory layouts.

use std::cell::RefCell;
use std::fs;
use std::path::Path;

use xcsieve_coverage::{
    CommandRunner, CoverageError, CoverageOptions, ToolOutput, collect_coverage,
};

struct ScriptedRunner {
    outputs: RefCell<Vec<ToolOutput>>,
}

impl ScriptedRunner {
    fn new(outputs: Vec<ToolOutput>) -> Self {
        let mut outputs = outputs;
        outputs.reverse();
        Self {
            outputs: RefCell::new(outputs),
        }
    }

    fn ok(stdout: &str) -> ToolOutput {
        ToolOutput {
            status: 0,
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    fn failed(stderr: &str) -> ToolOutput {
        ToolOutput {
            status: 1,
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, _program: &str, _args: &[&str]) -> Result<ToolOutput, CoverageError> {
        Ok(self
            .outputs
            .borrow_mut()
            .pop()
            .expect("unexpected extra invocation"))
    }
}

const LLVM_JSON: &str = r#"{
    "data": [{
        "files": [
            {"filename": "/pkg/Sources/MyLib/Calculator.swift",
             "summary": {"lines": {"count": 40, "covered": 30, "percent": 75.0}}}
        ],
        "totals": {"lines": {"count": 40, "covered": 30, "percent": 75.0}}
    }],
    "type": "llvm.coverage.json.export",
    "version": "2.0.1"
}"#;

const XCCOV_TWO_TARGETS: &str = r#"{
    "lineCoverage": 0.55,
    "targets": [{
        "name": "MyLib.framework",
        "lineCoverage": 0.55,
        "files": [
            {"path": "/pkg/Sources/MyLib/Calculator.swift", "name": "Calculator.swift",
             "lineCoverage": 0.9, "coveredLines": 90, "executableLines": 100},
            {"path": "/pkg/Sources/Helpers/Util.swift", "name": "Util.swift",
             "lineCoverage": 0.2, "coveredLines": 20, "executableLines": 100}
        ]
    }]
}"#;

/// Lay down the SPM debug codecov layout inside a tempdir.
fn spm_package_with_profile() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("Should create tempdir");
    let build = dir.path().join(".build/debug");
    let codecov = build.join("codecov");
    fs::create_dir_all(&codecov).expect("Should create dirs");
    fs::write(codecov.join("default.profraw"), b"").expect("Should write");
    fs::write(build.join("MyLibPackageTests.xctest"), b"").expect("Should write");
    dir
}

#[test]
fn test_raw_profile_pipeline_end_to_end() {
    let package = spm_package_with_profile();
    let runner = ScriptedRunner::new(vec![
        ScriptedRunner::ok(""),        // merge
        ScriptedRunner::ok(LLVM_JSON), // export
    ]);

    let coverage = collect_coverage(&runner, &CoverageOptions::for_package(package.path()))
        .expect("Should collect")
        .expect("Should find coverage");

    // the aggregate equals the ratio reported by the export step
    assert_eq!(coverage.line_coverage_percent, 75.0);
    assert_eq!(coverage.files.len(), 1);
    assert_eq!(coverage.files[0].covered_lines, 30);
}

#[test]
fn test_no_artifacts_yields_none() {
    let empty = tempfile::tempdir().expect("Should create tempdir");
    let runner = ScriptedRunner::new(Vec::new());

    let coverage = collect_coverage(&runner, &CoverageOptions::for_package(empty.path()))
        .expect("Should collect");
    assert!(coverage.is_none());
}

#[test]
fn test_tool_failure_degrades_to_none() {
    let package = spm_package_with_profile();
    let runner = ScriptedRunner::new(vec![ScriptedRunner::failed("cannot merge profile")]);

    let coverage = collect_coverage(&runner, &CoverageOptions::for_package(package.path()))
        .expect("Should not be fatal");
    assert!(coverage.is_none());
}

#[test]
fn test_malformed_json_degrades_to_none() {
    let package = spm_package_with_profile();
    let runner = ScriptedRunner::new(vec![
        ScriptedRunner::ok(""),
        ScriptedRunner::ok("this is not json"),
    ]);

    let coverage = collect_coverage(&runner, &CoverageOptions::for_package(package.path()))
        .expect("Should not be fatal");
    assert!(coverage.is_none());
}

#[test]
fn test_result_bundle_filtered_to_tested_target() {
    let dir = tempfile::tempdir().expect("Should create tempdir");
    let bundle = dir.path().join("Run.xcresult");
    fs::create_dir_all(&bundle).expect("Should create dirs");

    let runner = ScriptedRunner::new(vec![ScriptedRunner::ok(XCCOV_TWO_TARGETS)]);
    let options = CoverageOptions::for_package(dir.path())
        .with_override(&bundle)
        .with_target("MyLibTests");

    let coverage = collect_coverage(&runner, &options)
        .expect("Should collect")
        .expect("Should find coverage");

    // only the MyLib file survives and the aggregate is recomputed from it
    assert_eq!(coverage.files.len(), 1);
    assert_eq!(coverage.files[0].name, "Calculator.swift");
    assert_eq!(coverage.line_coverage_percent, 90.0);
}

#[test]
fn test_unmatched_target_keeps_full_report() {
    let dir = tempfile::tempdir().expect("Should create tempdir");
    let bundle = dir.path().join("Run.xcresult");
    fs::create_dir_all(&bundle).expect("Should create dirs");

    let runner = ScriptedRunner::new(vec![ScriptedRunner::ok(XCCOV_TWO_TARGETS)]);
    let options = CoverageOptions::for_package(dir.path())
        .with_override(&bundle)
        .with_target("SomethingElseTests");

    let coverage = collect_coverage(&runner, &options)
        .expect("Should collect")
        .expect("Should find coverage");

    // no file matched: the report comes back unfiltered
    assert_eq!(coverage.files.len(), 2);
    assert_eq!(coverage.line_coverage_percent, 55.0);
}

#[test]
fn test_missing_override_path_is_fatal() {
    let dir = tempfile::tempdir().expect("Should create tempdir");
    let runner = ScriptedRunner::new(Vec::new());
    let options = CoverageOptions::for_package(dir.path())
        .with_override(Path::new("/nonexistent/Run.xcresult"));

    let result = collect_coverage(&runner, &options);
    assert!(matches!(
        result,
        Err(CoverageError::OverrideNotFound { .. })
    ));
}

#[test]
fn test_override_codecov_directory() {
    let package = spm_package_with_profile();
    let codecov = package.path().join(".build/debug/codecov");

    let runner = ScriptedRunner::new(vec![
        ScriptedRunner::ok(""),
        ScriptedRunner::ok(LLVM_JSON),
    ]);
    let options = CoverageOptions::for_package(package.path()).with_override(&codecov);

    let coverage = collect_coverage(&runner, &options)
        .expect("Should collect")
        .expect("Should find coverage");
    assert_eq!(coverage.line_coverage_percent, 75.0);
}

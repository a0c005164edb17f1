//! Test outcome extraction
//!
//! Two independent report conventions are normalized into the same
//! [`FailedTest`] shape plus an aggregate passed count: the XCTest runner
//! (`Test Suite` / `Test Case` lines and assertion dumps) and the newer
//! Swift Testing runner (checkmark-prefixed `Test … passed/failed` lines
//! with separate `recorded an issue` lines). Assertion messages are captured
//! verbatim; no attempt is made to parse assertion semantics.

use std::sync::LazyLock;

use regex::Regex;

use crate::aggregate::{ParseOptions, ParseState, ResultBuilder};
use crate::result::{FailedTest, SlowTest};

static TEST_SUITE_STARTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Test Suite '(?P<name>.+)' started at").expect("pattern compiles")
});

static TEST_SUITE_RESULT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Test Suite '.+' (?:passed|failed) at").expect("pattern compiles")
});

static TEST_CASE_STARTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Test Case '.+' started\.?$").expect("pattern compiles"));

static TEST_CASE_OBJC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^Test Case '-\[(?P<class>[\w.]+) (?P<method>\w+)\]' (?P<outcome>passed|failed) \((?P<dur>[\d.]+) seconds\)\.?$",
    )
    .expect("pattern compiles")
});

static TEST_CASE_PLAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^Test Case '(?P<id>[\w.]+)' (?P<outcome>passed|failed) \((?P<dur>[\d.]+) seconds\)\.?$",
    )
    .expect("pattern compiles")
});

static XCTEST_ASSERT_OBJC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<file>.+?):(?P<line>\d+): error: -\[(?P<class>[\w.]+) (?P<method>\w+)\] : (?P<msg>.+)$",
    )
    .expect("pattern compiles")
});

static XCTEST_ASSERT_PLAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<file>.+?):(?P<line>\d+): error: (?P<id>[\w.]+) : (?P<msg>.+)$")
        .expect("pattern compiles")
});

static ST_PASSED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^[\u{2713}\u{2714}] Test (?:"(?P<name>[^"]+)"|(?P<func>\S+)) passed after (?P<dur>[\d.]+) seconds\.?$"#,
    )
    .expect("pattern compiles")
});

static ST_FAILED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^[\u{2717}\u{2718}] Test (?:"(?P<name>[^"]+)"|(?P<func>\S+)) failed after (?P<dur>[\d.]+) seconds with (?P<count>\d+) issues?\.?$"#,
    )
    .expect("pattern compiles")
});

static ST_ISSUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^[\u{2717}\u{2718}] Test (?:"(?P<name>[^"]+)"|(?P<func>\S+)) recorded an issue at (?P<file>\S+):(?P<line>\d+):(?P<col>\d+): (?P<msg>.+)$"#,
    )
    .expect("pattern compiles")
});

/// Placeholder message for a test that failed without a captured assertion
/// (a crash, or output where the assertion line was lost).
const NO_MESSAGE: &str = "no failure message captured";

/// Try the test-outcome patterns against one classified line.
pub(crate) fn extract(
    line: &str,
    state: &mut ParseState,
    builder: &mut ResultBuilder,
    options: &ParseOptions,
) -> bool {
    if let Some(caps) = TEST_SUITE_STARTED.captures(line) {
        capture_target(&caps["name"], builder);
        return true;
    }

    if TEST_SUITE_RESULT.is_match(line) || TEST_CASE_STARTED.is_match(line) {
        return true;
    }

    if let Some(caps) = TEST_CASE_OBJC.captures(line) {
        let identifier = class_method_identifier(&caps["class"], &caps["method"]);
        let passed = &caps["outcome"] == "passed";
        record_outcome(&identifier, passed, parse_duration(&caps["dur"]), state, builder, options);
        return true;
    }

    if let Some(caps) = TEST_CASE_PLAIN.captures(line) {
        let identifier = caps["id"].to_string();
        let passed = &caps["outcome"] == "passed";
        record_outcome(&identifier, passed, parse_duration(&caps["dur"]), state, builder, options);
        return true;
    }

    if let Some(caps) = XCTEST_ASSERT_OBJC.captures(line) {
        let identifier = class_method_identifier(&caps["class"], &caps["method"]);
        record_failure_message(&identifier, &caps["msg"], state, builder);
        return true;
    }

    if let Some(caps) = XCTEST_ASSERT_PLAIN.captures(line) {
        // the Linux runner writes `Class.method` here; a bare word is more
        // likely a compiler message and is left for the other extractors
        let identifier = caps["id"].to_string();
        if identifier.contains('.') {
            record_failure_message(&identifier, &caps["msg"], state, builder);
            return true;
        }
        return false;
    }

    if let Some(caps) = ST_ISSUE.captures(line) {
        let identifier = swift_testing_identifier(&caps);
        record_failure_message(&identifier, &caps["msg"], state, builder);
        return true;
    }

    if let Some(caps) = ST_FAILED.captures(line) {
        let identifier = swift_testing_identifier(&caps);
        let count: usize = caps["count"].parse().unwrap_or(1);
        let message = if count == 1 {
            "1 issue recorded".to_string()
        } else {
            format!("{count} issues recorded")
        };
        ensure_failed(&identifier, &message, state, builder);
        note_failed_duration(&identifier, parse_duration(&caps["dur"]), state, builder, options);
        return true;
    }

    if let Some(caps) = ST_PASSED.captures(line) {
        let identifier = swift_testing_identifier(&caps);
        builder.passed_tests += 1;
        note_slow(&identifier, parse_duration(&caps["dur"]), builder, options);
        return true;
    }

    false
}

/// Keep the first non-synthetic suite name as the tested target.
///
/// The runner opens with `All tests` / `Selected tests` wrappers and then
/// the bundle (`Something.xctest`); the bundle name minus its extension is
/// the target.
fn capture_target(name: &str, builder: &mut ResultBuilder) {
    if builder.tested_target.is_some() {
        return;
    }
    if name == "All tests" || name == "Selected tests" {
        return;
    }
    let name = name.strip_suffix(".xctest").unwrap_or(name);
    builder.tested_target = Some(name.to_string());
}

/// `-[ModuleTests.SomeTests testExample]` carries the module prefix on the
/// class; drop it, keeping `SomeTests.testExample`.
fn class_method_identifier(class_path: &str, method: &str) -> String {
    let class = class_path.rsplit('.').next().unwrap_or(class_path);
    format!("{class}.{method}")
}

fn swift_testing_identifier(caps: &regex::Captures<'_>) -> String {
    caps.name("name")
        .or_else(|| caps.name("func"))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

fn parse_duration(text: &str) -> Option<f64> {
    text.parse().ok()
}

fn record_outcome(
    identifier: &str,
    passed: bool,
    duration: Option<f64>,
    state: &mut ParseState,
    builder: &mut ResultBuilder,
    options: &ParseOptions,
) {
    if passed {
        builder.passed_tests += 1;
        note_slow(identifier, duration, builder, options);
    } else {
        ensure_failed(identifier, NO_MESSAGE, state, builder);
        note_failed_duration(identifier, duration, state, builder, options);
    }
}

/// Get-or-create the failed record for an identifier, preserving the first
/// captured assertion message.
fn ensure_failed(
    identifier: &str,
    message: &str,
    state: &mut ParseState,
    builder: &mut ResultBuilder,
) {
    if state.failed_by_identifier.contains_key(identifier) {
        return;
    }
    builder.failed_tests.push(FailedTest {
        test_identifier: identifier.to_string(),
        message: message.to_string(),
        duration_seconds: None,
    });
    state
        .failed_by_identifier
        .insert(identifier.to_string(), builder.failed_tests.len() - 1);
}

/// An assertion line carries the real message; it may arrive before or
/// after the outcome line for the same test.
fn record_failure_message(
    identifier: &str,
    message: &str,
    state: &mut ParseState,
    builder: &mut ResultBuilder,
) {
    if let Some(&index) = state.failed_by_identifier.get(identifier) {
        if builder.failed_tests[index].message == NO_MESSAGE {
            builder.failed_tests[index].message = message.to_string();
        }
        return;
    }
    ensure_failed(identifier, message, state, builder);
}

fn note_failed_duration(
    identifier: &str,
    duration: Option<f64>,
    state: &mut ParseState,
    builder: &mut ResultBuilder,
    options: &ParseOptions,
) {
    if !options.track_durations {
        return;
    }
    if let Some(&index) = state.failed_by_identifier.get(identifier) {
        builder.failed_tests[index].duration_seconds = duration;
    }
    note_slow(identifier, duration, builder, options);
}

fn note_slow(
    identifier: &str,
    duration: Option<f64>,
    builder: &mut ResultBuilder,
    options: &ParseOptions,
) {
    if !options.track_durations {
        return;
    }
    if let Some(duration) = duration
        && duration >= options.slow_test_threshold
    {
        builder.slow_tests.push(SlowTest {
            test_identifier: identifier.to_string(),
            duration_seconds: duration,
        });
    }
}

//! Tested-target coverage filtering
//!
//! A result bundle reports every target the scheme built; agents only care
//! about the module under test. When the parse pass surfaced a tested
//! target, the report is narrowed to files whose path contains that
//! module's name as a whole path segment, and the aggregate percentage is
//! recomputed over the retained subset.

use std::path::Path;

use xcsieve_parse::result::CodeCoverage;

/// Outcome of applying the target filter
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOutcome {
    /// At least one file matched; the report was narrowed and its
    /// aggregate recomputed
    Filtered(CodeCoverage),
    /// The target was known but no file path matched; the report is
    /// returned untouched so the caller can surface the mismatch
    NoMatch(CodeCoverage),
}

use FilterOutcome::{Filtered, NoMatch};

/// Derive the module name from a tested-target name.
///
/// Test targets are conventionally named after the module under test with
/// a `Tests` suffix (`MyLibTests` tests `MyLib`).
#[must_use]
pub fn module_name(target: &str) -> &str {
    match target.strip_suffix("Tests") {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => target,
    }
}

/// Narrow a report to the files belonging to `target`'s module.
#[must_use]
pub fn filter_to_target(coverage: CodeCoverage, target: &str) -> FilterOutcome {
    let module = module_name(target);
    let matched: Vec<_> = coverage
        .files
        .iter()
        .filter(|file| path_has_segment(&file.path, module))
        .cloned()
        .collect();

    if matched.is_empty() {
        NoMatch(coverage)
    } else {
        Filtered(CodeCoverage::from_files(matched))
    }
}

fn path_has_segment(path: &str, segment: &str) -> bool {
    Path::new(path)
        .components()
        .any(|component| component.as_os_str() == segment)
}

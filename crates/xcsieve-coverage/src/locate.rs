// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Coverage artifact discovery
//!
//! Read-only search of the standard build-output locations for the two
//! artifact kinds: raw-profile directories produced by instrumented SPM
//! test runs, and result bundles produced by xcodebuild. Missing
//! directories are tolerated silently; recursive search is bounded to the
//! configured roots and depth.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use walkdir::WalkDir;

/// Per-architecture/configuration codecov directories, in search order.
const CODECOV_SUBDIRS: &[&str] = &[
    ".build/debug/codecov",
    ".build/arm64-apple-macosx/debug/codecov",
    ".build/x86_64-apple-macosx/debug/codecov",
];

/// Result bundles live a few levels below a derived-data root
/// (`<project>-<hash>/Logs/Test/<run>.xcresult`).
const BUNDLE_SEARCH_DEPTH: usize = 6;

/// The raw-profile pipeline's inputs: the newest raw profile and the test
/// binary it was produced by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProfileArtifacts {
    /// Newest `*.profraw` in the codecov directory
    pub profile: PathBuf,
    /// The `*PackageTests.xctest` binary beside it
    pub test_binary: PathBuf,
}

/// Search the fixed codecov locations under a package root.
///
/// Returns the first directory that yields both a raw profile and a test
/// binary, or `None`.
#[must_use]
pub fn locate_raw_profile(package_root: &Path) -> Option<RawProfileArtifacts> {
    for subdir in CODECOV_SUBDIRS {
        let dir = package_root.join(subdir);
        if !dir.is_dir() {
            continue;
        }
        let Some(build_dir) = dir.parent() else {
            continue;
        };
        if let Some(artifacts) = raw_profile_artifacts(&dir, build_dir) {
            return Some(artifacts);
        }
    }
    None
}

/// Inspect one codecov directory, pairing its newest raw profile with the
/// test binary found under `binary_search_dir`.
#[must_use]
pub fn raw_profile_artifacts(
    codecov_dir: &Path,
    binary_search_dir: &Path,
) -> Option<RawProfileArtifacts> {
    let profile = newest_with_extension(codecov_dir, "profraw")?;
    let test_binary = locate_test_binary(binary_search_dir)?;
    Some(RawProfileArtifacts {
        profile,
        test_binary,
    })
}

/// The default result-bundle search roots, in order: a project-local
/// DerivedData directory, then the user-level Xcode one.
#[must_use]
pub fn default_bundle_roots(package_root: &Path) -> Vec<PathBuf> {
    let mut roots = vec![package_root.join("DerivedData")];
    if let Some(home) = dirs::home_dir() {
        roots.push(home.join("Library/Developer/Xcode/DerivedData"));
    }
    roots
}

/// Search the given roots for `*.xcresult` bundles.
///
/// The first root containing any bundle wins; within a root, the newest
/// modification time wins. Bundles are directories and are not descended
/// into.
#[must_use]
pub fn locate_result_bundle(roots: &[PathBuf]) -> Option<PathBuf> {
    for root in roots {
        if !root.is_dir() {
            continue;
        }
        if let Some(bundle) = newest_bundle_under(root) {
            return Some(bundle);
        }
    }
    None
}

fn newest_bundle_under(root: &Path) -> Option<PathBuf> {
    let mut best: Option<(SystemTime, PathBuf)> = None;
    let mut walker = WalkDir::new(root).max_depth(BUNDLE_SEARCH_DEPTH).into_iter();
    while let Some(entry) = walker.next() {
        let Ok(entry) = entry else {
            continue;
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        if entry.path().extension().is_some_and(|ext| ext == "xcresult") {
            let modified = entry
                .metadata()
                .ok()
                .and_then(|meta| meta.modified().ok())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            if best.as_ref().is_none_or(|(when, _)| modified > *when) {
                best = Some((modified, entry.path().to_path_buf()));
            }
            walker.skip_current_dir();
        }
    }
    best.map(|(_, path)| path)
}

/// Newest file with the given extension directly inside `dir`.
fn newest_with_extension(dir: &Path, extension: &str) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    let mut best: Option<(SystemTime, PathBuf)> = None;
    for entry in entries.filter_map(Result::ok) {
        let path = entry.path();
        if !path.is_file() || path.extension().is_none_or(|ext| ext != extension) {
            continue;
        }
        let modified = entry
            .metadata()
            .ok()
            .and_then(|meta| meta.modified().ok())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        if best.as_ref().is_none_or(|(when, _)| modified > *when) {
            best = Some((modified, path));
        }
    }
    best.map(|(_, path)| path)
}

/// Find the test binary inside a build directory.
///
/// On macOS the `.xctest` bundle is a directory wrapping
/// `Contents/MacOS/<name>`; on Linux it is the executable itself.
fn locate_test_binary(build_dir: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(build_dir).ok()?;
    for entry in entries.filter_map(Result::ok) {
        let path = entry.path();
        if path.extension().is_none_or(|ext| ext != "xctest") {
            continue;
        }
        if path.is_file() {
            return Some(path);
        }
        let stem = path.file_stem()?.to_os_string();
        let inner = path.join("Contents/MacOS").join(&stem);
        if inner.is_file() {
            return Some(inner);
        }
    }
    None
}

// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! xcsieve-coverage: Coverage artifact discovery and conversion for xcsieve
//!
//! This library crate locates coverage artifacts left behind by a Swift
//! build (raw profiles under `.build`, result bundles under DerivedData),
//! drives the external conversion tools, and narrows the converted report
//! to the tested target. Everything degrades: a missing artifact or a
//! failing tool yields "no coverage" plus a diagnostic on the tracing side
//! channel, never a failed result.
//!
//! # Example
//!
//! ```no_run
//! use xcsieve_coverage::{CoverageOptions, ProcessRunner, collect_coverage};
//!
//! let options = CoverageOptions::for_package(".");
//! let coverage = collect_coverage(&ProcessRunner, &options).unwrap();
//! ```

pub mod command;
pub mod convert;
pub mod error;
pub mod filter;
pub mod locate;

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use xcsieve_parse::result::CodeCoverage;

pub use command::{CommandRunner, ProcessRunner, ToolOutput};
pub use convert::{convert_raw_profile, convert_result_bundle, normalize_percent};
pub use error::CoverageError;
pub use filter::{FilterOutcome, filter_to_target, module_name};
pub use locate::{RawProfileArtifacts, default_bundle_roots, locate_raw_profile, locate_result_bundle};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::command::{CommandRunner, ProcessRunner};
    pub use crate::error::CoverageError;
    pub use crate::{CoverageOptions, collect_coverage};
}

/// Inputs to one coverage collection run
#[derive(Debug, Clone, Default)]
pub struct CoverageOptions {
    /// Package root under which artifacts are searched
    pub package_root: PathBuf,
    /// Explicit artifact path (an `.xcresult` bundle or a codecov
    /// directory); when set, discovery is skipped and the path must exist
    pub override_path: Option<PathBuf>,
    /// Tested-target name surfaced by the parse pass, used to narrow
    /// result-bundle reports
    pub tested_target: Option<String>,
}

impl CoverageOptions {
    /// Options for discovering artifacts under a package root
    #[must_use]
    pub fn for_package(package_root: impl AsRef<Path>) -> Self {
        Self {
            package_root: package_root.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// Set the tested-target name
    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.tested_target = Some(target.into());
        self
    }

    /// Set an explicit artifact path
    #[must_use]
    pub fn with_override(mut self, path: impl Into<PathBuf>) -> Self {
        self.override_path = Some(path.into());
        self
    }
}

/// Locate, convert, and filter coverage for one build.
///
/// Searches raw profiles first (the most specific artifact a `swift test`
/// run leaves behind), then result bundles. The target filter applies to
/// the result-bundle pipeline only; raw-profile exports are already scoped
/// to the test binary. Conversion failures are logged and degrade to
/// `Ok(None)`.
///
/// # Errors
///
/// Returns `CoverageError::OverrideNotFound` when an explicitly specified
/// artifact path does not exist or holds no usable artifacts; this is the
/// one condition the caller is expected to treat as fatal.
pub fn collect_coverage(
    runner: &dyn CommandRunner,
    options: &CoverageOptions,
) -> Result<Option<CodeCoverage>, CoverageError> {
    if let Some(path) = &options.override_path {
        return collect_from_override(runner, path, options);
    }

    if let Some(artifacts) = locate::locate_raw_profile(&options.package_root) {
        debug!(profile = %artifacts.profile.display(), "Found raw coverage profile");
        match convert::convert_raw_profile(runner, &artifacts) {
            Ok(coverage) => return Ok(Some(coverage)),
            Err(err) => {
                warn!(error = %err, "Raw-profile conversion failed; coverage omitted");
                return Ok(None);
            }
        }
    }

    let roots = locate::default_bundle_roots(&options.package_root);
    if let Some(bundle) = locate::locate_result_bundle(&roots) {
        debug!(bundle = %bundle.display(), "Found result bundle");
        match convert::convert_result_bundle(runner, &bundle) {
            Ok(coverage) => return Ok(Some(apply_target_filter(coverage, options))),
            Err(err) => {
                warn!(error = %err, "Result-bundle conversion failed; coverage omitted");
                return Ok(None);
            }
        }
    }

    debug!("No coverage artifacts found");
    Ok(None)
}

fn collect_from_override(
    runner: &dyn CommandRunner,
    path: &Path,
    options: &CoverageOptions,
) -> Result<Option<CodeCoverage>, CoverageError> {
    if !path.exists() {
        return Err(CoverageError::OverrideNotFound {
            path: path.to_path_buf(),
        });
    }

    if path.extension().is_some_and(|ext| ext == "xcresult") {
        return match convert::convert_result_bundle(runner, path) {
            Ok(coverage) => Ok(Some(apply_target_filter(coverage, options))),
            Err(err) => {
                warn!(error = %err, "Result-bundle conversion failed; coverage omitted");
                Ok(None)
            }
        };
    }

    // anything else must be a codecov directory of raw profiles, with the
    // test binary one level up
    let binary_search_dir = path.parent().unwrap_or(path);
    let Some(artifacts) = locate::raw_profile_artifacts(path, binary_search_dir) else {
        return Err(CoverageError::OverrideNotFound {
            path: path.to_path_buf(),
        });
    };

    match convert::convert_raw_profile(runner, &artifacts) {
        Ok(coverage) => Ok(Some(coverage)),
        Err(err) => {
            warn!(error = %err, "Raw-profile conversion failed; coverage omitted");
            Ok(None)
        }
    }
}

/// Apply the tested-target filter, surfacing the no-match condition on the
/// diagnostic channel and returning the report unfiltered in that case.
fn apply_target_filter(coverage: CodeCoverage, options: &CoverageOptions) -> CodeCoverage {
    let Some(target) = &options.tested_target else {
        return coverage;
    };
    match filter::filter_to_target(coverage, target) {
        FilterOutcome::Filtered(filtered) => filtered,
        FilterOutcome::NoMatch(unfiltered) => {
            warn!(
                target = %target,
                "Tested target detected but no coverage files matched; returning unfiltered report"
            );
            unfiltered
        }
    }
}

//! Configuration for the xcsieve CLI
//!
//! Settings come from three layers with a fixed precedence: command-line
//! flags (and their environment variables) win over the optional TOML
//! config file, which wins over built-in defaults. The merged [`Settings`]
//! value is what the rest of the binary consumes.

use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use serde::Deserialize;
use xcsieve_coverage::CoverageOptions;
use xcsieve_parse::ParseOptions;

/// Config file looked up in the working directory when `--config` is not
/// given.
pub const DEFAULT_CONFIG_FILE: &str = ".xcsieve.toml";

/// Default slow-test threshold in seconds
pub const DEFAULT_SLOW_TEST_THRESHOLD: f64 = 1.0;

/// xcsieve - structured results from Swift build and test output
///
/// Pipe the combined stdout/stderr of `swift build`, `swift test`, or
/// `xcodebuild` into xcsieve to get a machine-consumable result record.
///
/// Example:
///   swift test 2>&1 | xcsieve --format compact
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "xcsieve")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Output format for the result record
    #[arg(short, long, value_enum, env = "XCSIEVE_FORMAT")]
    pub format: Option<OutputFormat>,

    /// Collect code coverage after parsing
    ///
    /// Searches the standard SPM and DerivedData locations unless
    /// --coverage-path points at a specific artifact.
    #[arg(long, default_value = "false")]
    pub coverage: bool,

    /// Explicit coverage artifact path
    ///
    /// Either an .xcresult bundle or a codecov directory of raw profiles.
    /// The path must exist; implies --coverage.
    #[arg(long, env = "XCSIEVE_COVERAGE_PATH")]
    pub coverage_path: Option<PathBuf>,

    /// Package root searched for coverage artifacts
    ///
    /// Defaults to the current working directory.
    #[arg(long)]
    pub package_root: Option<PathBuf>,

    /// Track per-test durations and report slow tests
    #[arg(long, default_value = "false")]
    pub test_durations: bool,

    /// Seconds above which a test is reported as slow
    #[arg(long)]
    pub slow_test_threshold: Option<f64>,

    /// Treat warnings as build failures
    #[arg(long, default_value = "false")]
    pub warnings_as_errors: bool,

    /// Path to a TOML config file
    ///
    /// Defaults to .xcsieve.toml in the working directory if present.
    #[arg(short, long, env = "XCSIEVE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    ///
    /// Logs are written to stderr so they never mix with the structured
    /// result on stdout.
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,
}

/// The three result renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Structured JSON object
    Json,
    /// Token-dense line format for agents
    Compact,
    /// GitHub Actions workflow annotations
    GithubActions,
}

impl Config {
    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

/// Values read from the TOML config file; every field optional so the file
/// only has to name what it overrides
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    /// Output format ("json", "compact", "github-actions")
    pub format: Option<OutputFormat>,
    /// Collect coverage by default
    pub coverage: Option<bool>,
    /// Explicit coverage artifact path
    pub coverage_path: Option<PathBuf>,
    /// Package root for artifact discovery
    pub package_root: Option<PathBuf>,
    /// Track per-test durations
    pub test_durations: Option<bool>,
    /// Slow-test threshold in seconds
    pub slow_test_threshold: Option<f64>,
    /// Treat warnings as build failures
    pub warnings_as_errors: Option<bool>,
}

impl FileConfig {
    /// Load the config file.
    ///
    /// An explicitly given path must exist; the default path is optional
    /// and silently falls back to an empty config.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::FileNotFound` for an explicit path that does
    /// not exist, and read/parse variants for an unreadable or invalid
    /// file.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::FileNotFound(path.to_path_buf()));
                }
                path.to_path_buf()
            }
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let text = std::fs::read_to_string(&path)
            .map_err(|err| ConfigError::ReadFailed(path.clone(), err))?;
        toml::from_str(&text).map_err(|err| ConfigError::ParseFailed(path, err))
    }
}

/// The merged, fully-resolved settings consumed by the binary
#[derive(Debug, Clone)]
pub struct Settings {
    /// Output format
    pub format: OutputFormat,
    /// Collect coverage
    pub coverage: bool,
    /// Explicit coverage artifact path
    pub coverage_path: Option<PathBuf>,
    /// Package root for artifact discovery
    pub package_root: PathBuf,
    /// Track per-test durations
    pub test_durations: bool,
    /// Slow-test threshold in seconds
    pub slow_test_threshold: f64,
    /// Treat warnings as build failures
    pub warnings_as_errors: bool,
}

impl Settings {
    /// Merge CLI flags over file values over defaults.
    ///
    /// Boolean flags can only be switched on from the CLI, so a `true`
    /// from either layer wins; optional values take the first layer that
    /// sets them.
    #[must_use]
    pub fn resolve(cli: &Config, file: &FileConfig) -> Self {
        let coverage_path = cli
            .coverage_path
            .clone()
            .or_else(|| file.coverage_path.clone());
        Self {
            format: cli.format.or(file.format).unwrap_or(OutputFormat::Json),
            // an explicit artifact path implies coverage collection
            coverage: cli.coverage || file.coverage.unwrap_or(false) || coverage_path.is_some(),
            coverage_path,
            package_root: cli
                .package_root
                .clone()
                .or_else(|| file.package_root.clone())
                .unwrap_or_else(|| PathBuf::from(".")),
            test_durations: cli.test_durations || file.test_durations.unwrap_or(false),
            slow_test_threshold: cli
                .slow_test_threshold
                .or(file.slow_test_threshold)
                .unwrap_or(DEFAULT_SLOW_TEST_THRESHOLD),
            warnings_as_errors: cli.warnings_as_errors || file.warnings_as_errors.unwrap_or(false),
        }
    }

    /// Options for the parse pass
    #[must_use]
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            track_durations: self.test_durations,
            slow_test_threshold: self.slow_test_threshold,
            warnings_as_errors: self.warnings_as_errors,
        }
    }

    /// Options for the coverage pipeline, threading through the tested
    /// target the parse pass surfaced
    #[must_use]
    pub fn coverage_options(&self, tested_target: Option<&str>) -> CoverageOptions {
        CoverageOptions {
            package_root: self.package_root.clone(),
            override_path: self.coverage_path.clone(),
            tested_target: tested_target.map(str::to_string),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Explicitly specified config file not found
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    /// Config file could not be read
    #[error("Failed to read config file {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),

    /// Config file is not valid TOML
    #[error("Failed to parse config file {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
}

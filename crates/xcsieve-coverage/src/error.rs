// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for xcsieve-coverage

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during coverage discovery and conversion
#[derive(Debug, Error)]
pub enum CoverageError {
    /// Error reading artifacts or spawning tools
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing a tool's JSON report
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// An external conversion step exited nonzero
    #[error("{tool} exited with status {status}: {stderr}")]
    ToolFailed {
        /// The tool that failed (e.g. "llvm-profdata merge")
        tool: String,
        /// Process exit status
        status: i32,
        /// Captured stderr, trimmed
        stderr: String,
    },

    /// A user-specified coverage path does not exist
    #[error("Coverage path not found: {path}")]
    OverrideNotFound {
        /// The path the user specified
        path: PathBuf,
    },

    /// The converted report contained no files
    #[error("Coverage report is empty")]
    EmptyReport,
}

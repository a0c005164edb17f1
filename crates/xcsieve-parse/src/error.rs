// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for xcsieve-parse

use thiserror::Error;

/// Errors that can occur during build log processing
#[derive(Debug, Error)]
pub enum ParseError {
    /// Error reading build output
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid parse option
    #[error("Invalid parse option: {message}")]
    InvalidOption {
        /// Description of the option error
        message: String,
    },
}

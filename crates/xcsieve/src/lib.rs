// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! xcsieve: structured, agent-friendly results from Swift build/test output
//!
//! The binary reads a build log on stdin, extracts a typed result with
//! `xcsieve-parse`, optionally merges coverage located and converted by
//! `xcsieve-coverage`, and renders the result in one of three formats for
//! downstream automation.

pub mod config;
pub mod output;

// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Compiler and linker diagnostic extraction
//!
//! Patterns are tried in a fixed priority order (error, warning, linker,
//! note) against lines that already passed the classifier. A line matching a
//! keyword but none of the patterns is dropped silently: precision over
//! completeness.

use std::sync::LazyLock;

use regex::Regex;

use crate::aggregate::{ParseState, ResultBuilder};
use crate::classify;
use crate::result::{BuildError, BuildWarning, LinkerError};

static LOCATED_ERROR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<file>.+?):(?P<line>\d+):(?P<col>\d+): error: (?P<msg>.+)$")
        .expect("pattern compiles")
});

static LOCATED_WARNING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<file>.+?):(?P<line>\d+):(?P<col>\d+): warning: (?P<msg>.+)$")
        .expect("pattern compiles")
});

static LOCATED_NOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.+?:\d+:\d+: note: ").expect("pattern compiles"));

static BARE_ERROR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^error: (?P<msg>.+)$").expect("pattern compiles"));

static BARE_WARNING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^warning: (?P<msg>.+)$").expect("pattern compiles"));

static BARE_NOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^note: ").expect("pattern compiles"));

static UNDEFINED_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Undefined symbols for architecture (?P<arch>\S+):$").expect("pattern compiles")
});

static UNDEF_SYMBOL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s+"(?P<symbol>.+)", referenced from:$"#).expect("pattern compiles")
});

static DUP_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^duplicate symbol '(?P<symbol>.+)' in:$").expect("pattern compiles")
});

static LD_CLOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ld: .* for architecture (?P<arch>\S+)$").expect("pattern compiles")
});

/// Per-block-kind state for multi-line linker reports, carried in
/// [`ParseState`] between lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) enum LinkerBlock {
    /// No block open
    #[default]
    Idle,
    /// Inside an undefined-symbols block, before a symbol line
    UndefinedAwaitingSymbol { architecture: String },
    /// Symbol seen, waiting for its first "referenced from" site
    UndefinedAwaitingReference {
        architecture: String,
        symbol: String,
    },
    /// Inside a duplicate-symbol block, accumulating object files
    CollectingDuplicates { symbol: String, files: Vec<String> },
}

/// Feed a line to the open linker block, if any.
///
/// Returns `true` when the line was consumed by the block. Returns `false`
/// with the block closed when the line does not continue it, so the caller
/// reprocesses the line through the normal extractors. Continuation lines
/// carry no diagnostic keywords, which is why this runs before the
/// classifier.
pub(crate) fn continue_linker_block(
    line: &str,
    state: &mut ParseState,
    builder: &mut ResultBuilder,
) -> bool {
    match std::mem::take(&mut state.linker_block) {
        LinkerBlock::Idle => false,
        LinkerBlock::UndefinedAwaitingSymbol { architecture } => {
            if let Some(caps) = UNDEF_SYMBOL.captures(line) {
                state.linker_block = LinkerBlock::UndefinedAwaitingReference {
                    architecture,
                    symbol: caps["symbol"].to_string(),
                };
                true
            } else if LD_CLOSE.is_match(line) {
                // summary line terminates the block
                true
            } else if is_indented_content(line) {
                // additional reference sites beyond the first; part of the
                // block but already represented
                state.linker_block = LinkerBlock::UndefinedAwaitingSymbol { architecture };
                true
            } else {
                false
            }
        }
        LinkerBlock::UndefinedAwaitingReference {
            architecture,
            symbol,
        } => {
            if let Some(caps) = UNDEF_SYMBOL.captures(line) {
                // new symbol before any reference site: the pending record is
                // missing a mandatory field and is dropped
                state.linker_block = LinkerBlock::UndefinedAwaitingReference {
                    architecture,
                    symbol: caps["symbol"].to_string(),
                };
                true
            } else if is_indented_content(line) {
                builder.linker_errors.push(LinkerError::UndefinedSymbol {
                    symbol,
                    architecture: architecture.clone(),
                    referenced_from: line.trim().to_string(),
                });
                state.linker_block = LinkerBlock::UndefinedAwaitingSymbol { architecture };
                true
            } else if LD_CLOSE.is_match(line) {
                true
            } else {
                false
            }
        }
        LinkerBlock::CollectingDuplicates { symbol, mut files } => {
            if let Some(caps) = LD_CLOSE.captures(line) {
                close_duplicate_block(builder, symbol, files, caps["arch"].to_string());
                true
            } else if is_indented_content(line) {
                files.push(line.trim().to_string());
                state.linker_block = LinkerBlock::CollectingDuplicates { symbol, files };
                true
            } else {
                close_duplicate_block(builder, symbol, files, "unknown".to_string());
                false
            }
        }
    }
}

/// Close any block left open at end of input, emitting a partial record
/// only when its mandatory fields were captured.
pub(crate) fn finish_linker_block(state: &mut ParseState, builder: &mut ResultBuilder) {
    if let LinkerBlock::CollectingDuplicates { symbol, files } =
        std::mem::take(&mut state.linker_block)
    {
        close_duplicate_block(builder, symbol, files, "unknown".to_string());
    }
    // a truncated undefined-symbols block has no complete record to emit
}

fn close_duplicate_block(
    builder: &mut ResultBuilder,
    symbol: String,
    files: Vec<String>,
    architecture: String,
) {
    // conflicting_files must have at least two entries
    if files.len() >= 2 {
        builder.linker_errors.push(LinkerError::DuplicateSymbol {
            symbol,
            architecture,
            conflicting_files: files,
        });
    }
}

fn is_indented_content(line: &str) -> bool {
    line.starts_with([' ', '\t']) && !line.trim().is_empty()
}

/// Try the diagnostic patterns against one classified line.
///
/// Returns `true` when the line was consumed, whether or not it produced a
/// record (notes and de-duplicated restatements are consumed silently).
pub(crate) fn extract(line: &str, state: &mut ParseState, builder: &mut ResultBuilder) -> bool {
    if let Some(caps) = LOCATED_ERROR.captures(line) {
        let file = caps["file"].to_string();
        let line_no = caps["line"].parse().ok().filter(|&n: &u32| n >= 1);
        let message = caps["msg"].to_string();
        if state.remember_diagnostic(&file, line_no, &message) {
            builder.errors.push(BuildError {
                file,
                line: line_no,
                message,
            });
        }
        return true;
    }

    if let Some(caps) = LOCATED_WARNING.captures(line) {
        let file = caps["file"].to_string();
        let line_no = caps["line"].parse().ok().filter(|&n: &u32| n >= 1);
        let message = caps["msg"].to_string();
        if state.remember_diagnostic(&file, line_no, &message) {
            builder.warnings.push(BuildWarning {
                file,
                line: line_no,
                message,
            });
        }
        return true;
    }

    if let Some(caps) = UNDEFINED_HEADER.captures(line) {
        state.linker_block = LinkerBlock::UndefinedAwaitingSymbol {
            architecture: caps["arch"].to_string(),
        };
        return true;
    }

    if let Some(caps) = DUP_HEADER.captures(line) {
        state.linker_block = LinkerBlock::CollectingDuplicates {
            symbol: caps["symbol"].to_string(),
            files: Vec::new(),
        };
        return true;
    }

    if LOCATED_NOTE.is_match(line) {
        return true;
    }

    // Locationless patterns are weakly anchored; echoed source and embedded
    // data must not reach them.
    if classify::looks_structured_data(line) {
        return false;
    }

    if let Some(caps) = BARE_ERROR.captures(line) {
        let message = caps["msg"].to_string();
        if state.remember_diagnostic("", None, &message) {
            builder.errors.push(BuildError {
                file: String::new(),
                line: None,
                message,
            });
        }
        return true;
    }

    if let Some(caps) = BARE_WARNING.captures(line) {
        let message = caps["msg"].to_string();
        if state.remember_diagnostic("", None, &message) {
            builder.warnings.push(BuildWarning {
                file: String::new(),
                line: None,
                message,
            });
        }
        return true;
    }

    if BARE_NOTE.is_match(line) {
        return true;
    }

    false
}

/// De-duplication fingerprint for a `(file, line, message)` triple.
///
/// Trailing caret/tilde pointer artifacts are stripped so a visual
/// restatement normalizes to the same key as its header.
pub(crate) fn diagnostic_fingerprint(file: &str, line: Option<u32>, message: &str) -> String {
    let message = message
        .trim()
        .trim_end_matches(|c| c == '^' || c == '~' || c == ' ');
    format!("{file}|{}|{message}", line.unwrap_or(0))
}

// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! xcsieve: structured results from Swift build/test output
//!
//! Reads a complete build log on stdin, extracts a typed result, optionally
//! merges coverage, and writes the encoded result to stdout. Exit code 1
//! signals a failed build so CI can gate on it; code 2 signals a tool
//! error (unreadable input, bad config, absent user-specified paths).

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::warn;

use xcsieve::config::{Config, FileConfig, Settings};
use xcsieve::output;
use xcsieve_coverage::{ProcessRunner, collect_coverage};
use xcsieve_parse::parse_build_reader;

fn main() -> ExitCode {
    let config = Config::parse();

    // logs go to stderr; stdout carries only the encoded result
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.log_level().into()),
        )
        .init();

    match run(&config) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("xcsieve: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run(config: &Config) -> anyhow::Result<ExitCode> {
    let file = FileConfig::load(config.config.as_deref())?;
    let settings = Settings::resolve(config, &file);

    let parse_options = settings.parse_options();
    parse_options.validate()?;

    let mut result = parse_build_reader(std::io::stdin().lock(), &parse_options)
        .context("Failed to read build output from stdin")?;

    if settings.coverage {
        let options = settings.coverage_options(result.tested_target.as_deref());
        match collect_coverage(&ProcessRunner, &options) {
            Ok(Some(coverage)) => result.attach_coverage(coverage),
            Ok(None) => warn!("Coverage requested but no report could be produced"),
            Err(err) => return Err(err).context("Coverage collection failed"),
        }
    }

    let rendered = output::render(&result, settings.format).context("Failed to encode result")?;
    print!("{rendered}");
    if !rendered.ends_with('\n') {
        println!();
    }

    Ok(if result.succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

use criterion::{Criterion, criterion_group, criterion_main};
use std::fmt::Write as _;
use xcsieve_coverage::convert::parse_xccov_json;

/// An xccov report with many files, as a large app target would produce.
fn synthetic_report(files: usize) -> String {
    let mut entries = String::new();
    for i in 0..files {
        if i > 0 {
            entries.push(',');
        }
        write!(
            entries,
            r#"{{"path": "/pkg/Sources/App/File{i}.swift", "name": "File{i}.swift",
               "lineCoverage": 0.5, "coveredLines": 50, "executableLines": 100}}"#
        )
        .expect("write to string");
    }
    format!(
        r#"{{"lineCoverage": 0.5, "targets": [{{"files": [{entries}]}}]}}"#
    )
}

fn coverage_benchmark(c: &mut Criterion) {
    let report = synthetic_report(2_000);

    c.bench_function("parse_xccov_2k_files", |b| {
        b.iter(|| parse_xccov_json(std::hint::black_box(&report)).expect("Should parse"))
    });
}

criterion_group!(benches, coverage_benchmark);
criterion_main!(benches);

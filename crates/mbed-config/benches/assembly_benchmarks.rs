use criterion::{Criterion, black_box, criterion_group, criterion_main};
use mbed_config::{ConfigAssembler, Setting, Source, merge};
use mbed_fs::NormalizedPath;
use mbed_test_utils::program::TestProgram;
use serde_json::json;
use std::collections::BTreeSet;

fn library_sources(count: usize) -> Vec<Source> {
    (0..count)
        .map(|i| {
            Source::new(format!("lib{i}"), format!("lib{i}"))
                .with_config("size", Setting::bare(i))
                .with_config("enabled", Setting::bare(true))
                .with_override("*", "target.features_add", json!([format!("F{i}")]))
                .with_override("K64F", "size", i * 2)
        })
        .collect()
}

fn merge_benchmark(c: &mut Criterion) {
    let sources = library_sources(200);
    let labels: BTreeSet<String> = ["K64F".to_string()].into();

    c.bench_function("merge (200 sources)", |b| {
        b.iter(|| {
            merge(black_box(&sources), black_box(&labels)).unwrap();
        })
    });
}

fn assemble_benchmark(c: &mut Criterion) {
    // A chain of feature-gated libraries: each pass enables the next one.
    c.bench_function("ConfigAssembler::assemble (chain of 10)", |b| {
        let program = TestProgram::new();
        let mut candidates: Vec<NormalizedPath> = Vec::new();
        for i in 0..10 {
            candidates.push(program.write_library(
                &format!("FEATURE_F{i}/lib{i}"),
                json!({
                    "name": format!("lib{i}"),
                    "config": {"level": i},
                    "target_overrides": {"*": {"target.features_add": [format!("F{}", i + 1)]}}
                }),
            ));
        }
        let target = Source::from_target_str("bench", &json!({"features": ["F0"]}).to_string()).unwrap();
        let assembler = ConfigAssembler::new(target);

        b.iter(|| {
            assembler.assemble(black_box(&candidates)).unwrap();
        })
    });
}

criterion_group!(benches, merge_benchmark, assemble_benchmark);
criterion_main!(benches);

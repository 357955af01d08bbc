use std::hint::black_box;
use std::path::Path;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use doxypub::{DoxyfileLoader, Environment};
use tempfile::TempDir;

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("load_doxyfile");
    for entries in [100usize, 1_000, 10_000] {
        let dir = TempDir::new().expect("failed to create temp dir");
        write_file(&dir.path().join("common.cfg"), &make_doxyfile(entries / 2));
        write_file(
            &dir.path().join("Doxyfile"),
            &format!("@INCLUDE = common.cfg\n{}", make_doxyfile(entries / 2)),
        );
        let env = Environment::memory().with_var("SRC_ROOT", "/work/src");

        group.bench_with_input(BenchmarkId::from_parameter(entries), &dir, |b, dir| {
            b.iter(|| {
                DoxyfileLoader::new()
                    .base_dir(black_box(dir.path()))
                    .environment(env.clone())
                    .load()
                    .expect("load should succeed")
            });
        });
    }
    group.finish();
}

fn make_doxyfile(entries: usize) -> String {
    let mut content = String::with_capacity(entries * 48);
    for idx in 0..entries {
        match idx % 4 {
            0 => content.push_str("# ---------------------------------------\n"),
            1 => content.push_str(&format!("KEY_{idx} = \"quoted value {idx}\" tail\n")),
            2 => content.push_str(&format!("INPUT_{idx} = $(SRC_ROOT)/dir{idx} \\\n")),
            _ => content.push_str(&format!("FLAG_{idx} = YES\n")),
        }
    }
    content
}

fn write_file(path: &Path, content: &str) {
    std::fs::write(path, content).expect("failed to write bench file");
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);

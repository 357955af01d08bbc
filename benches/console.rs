use std::hint::black_box;
use std::io::{Write, sink};

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use doxypub::{ConsoleParser, NoteStyle};

fn bench_console(c: &mut Criterion) {
    let mut group = c.benchmark_group("console");
    for lines in [1_000usize, 10_000] {
        let input = make_output(lines);
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(lines), &input, |b, input| {
            b.iter(|| {
                let mut parser = ConsoleParser::new(sink()).notes(NoteStyle::Concealed);
                for chunk in input.chunks(4096) {
                    parser.write_all(black_box(chunk)).expect("write should succeed");
                }
                parser.finish().expect("finish should succeed").1
            });
        });
    }
    group.finish();
}

fn make_output(lines: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(lines * 40);
    for idx in 0..lines {
        let line = match idx % 10 {
            0 => format!("src/file{idx}.h:{idx}: warning: member not documented\n"),
            5 => format!("error: problem {idx}\n"),
            _ => format!("Generating docs for compound Foo{idx}...\n"),
        };
        out.extend_from_slice(line.as_bytes());
    }
    out
}

criterion_group!(benches, bench_console);
criterion_main!(benches);

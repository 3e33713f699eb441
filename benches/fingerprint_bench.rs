use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use secure_workspace::filter::{FilterConfig, PathFilter};
use secure_workspace::fingerprint::Fingerprinter;
use std::fs;
use std::hint::black_box;
use std::path::Path;
use tempfile::tempdir;

fn benchmark_fingerprinting(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let sizes: [(&str, usize); 3] = [
        ("1kb", 1024),
        ("100kb", 1024 * 100),
        ("10mb", 1024 * 1024 * 10),
    ];

    let mut group = c.benchmark_group("fingerprint");
    for (label, size) in sizes {
        let path = dir.path().join(format!("{label}.bin"));
        fs::write(&path, vec![b'x'; size]).unwrap();
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("streamed", label), &path, |b, path| {
            let fp = Fingerprinter::new(u64::MAX);
            b.iter(|| fp.fingerprint(black_box(path)));
        });
        group.bench_with_input(BenchmarkId::new("mapped", label), &path, |b, path| {
            let fp = Fingerprinter::new(1);
            b.iter(|| fp.fingerprint(black_box(path)));
        });
    }
    group.finish();
}

fn benchmark_filter(c: &mut Criterion) {
    let filter = PathFilter::new(FilterConfig::default(), Path::new("/home/me"));
    let paths = [
        Path::new("documents/report.md"),
        Path::new("projects/app/node_modules/left-pad/index.js"),
        Path::new(".mozilla/firefox/abc.default/cache2/entries/x"),
        Path::new("src/very/deep/tree/of/modules/lib.rs"),
    ];

    c.bench_function("filter_is_excluded", |b| {
        b.iter(|| {
            for path in &paths {
                black_box(filter.is_excluded(black_box(path)));
            }
        });
    });
}

criterion_group!(benches, benchmark_fingerprinting, benchmark_filter);
criterion_main!(benches);

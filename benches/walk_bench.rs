//! Throughput benchmark for the parallel traversal engine.
//!
//! Grounded on the teacher's `benches/dirent_bench.rs`: same
//! `criterion_group!`/`criterion_main!` harness and `Throughput::Elements`
//! reporting, retargeted from raw `dirent64` parsing to an end-to-end
//! `enumerate` pass over a synthetic tree built with `tempfile`.

use std::fs;
use std::path::Path;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ntacl_walk::{enumerate, enumerate_paths, Options};
use tempfile::TempDir;

/// Builds a tree with `subdirs` subdirectories, each holding
/// `files_per_subdir` files, and returns the owning `TempDir` so it outlives
/// the benchmark iteration.
fn build_tree(subdirs: usize, files_per_subdir: usize) -> TempDir {
    let dir = TempDir::new().expect("create temp dir for benchmark tree");
    for dir_index in 0..subdirs {
        let sub = dir.path().join(format!("dir_{dir_index}"));
        fs::create_dir(&sub).expect("create benchmark subdirectory");
        for file_index in 0..files_per_subdir {
            fs::write(sub.join(format!("file_{file_index}.dat")), b"x").expect("write benchmark file");
        }
    }
    dir
}

fn bench_enumerate_with_security(c: &mut Criterion) {
    let mut group = c.benchmark_group("enumerate_with_security");

    for &(subdirs, files_per_subdir) in &[(8usize, 64usize), (32, 64), (64, 128)] {
        let tree = build_tree(subdirs, files_per_subdir);
        let total = (subdirs * files_per_subdir) as u64;
        group.throughput(Throughput::Elements(total));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{subdirs}x{files_per_subdir}")),
            tree.path(),
            |b, root: &Path| {
                b.iter(|| {
                    let count = enumerate(root, Options::default()).unwrap().count();
                    std::hint::black_box(count)
                });
            },
        );
    }

    group.finish();
}

fn bench_enumerate_paths_without_security(c: &mut Criterion) {
    let mut group = c.benchmark_group("enumerate_paths_without_security");

    for &(subdirs, files_per_subdir) in &[(8usize, 64usize), (32, 64), (64, 128)] {
        let tree = build_tree(subdirs, files_per_subdir);
        let total = (subdirs * files_per_subdir) as u64;
        group.throughput(Throughput::Elements(total));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{subdirs}x{files_per_subdir}")),
            tree.path(),
            |b, root: &Path| {
                b.iter(|| {
                    let count = enumerate_paths(root, Options::default()).unwrap().count();
                    std::hint::black_box(count)
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_enumerate_with_security, bench_enumerate_paths_without_security);
criterion_main!(benches);

//! Indexing and search benchmarks
//!
//! Run with: `cargo bench`
//! Save baseline: `cargo bench -- --save-baseline main`
//! Compare: `cargo bench -- --baseline main`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use stemdex::index::{
    build, build_concurrent, ConcurrentIndex, InvertedIndex, SearchIndex, TextFilter,
};
use stemdex::pool::WorkQueue;
use stemdex::utils::{unique_stems, SnowballStemmer};
use tempfile::TempDir;

const WORDS: &[&str] = &[
    "running", "jumping", "quickly", "foxes", "lazy", "dogs", "searching", "indexes",
    "concurrent", "threads", "walking", "documents", "stemming", "queries", "ranked",
];

/// Directory of generated text files spread over a few subdirectories
fn create_corpus(files: usize, words_per_file: usize) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path().to_path_buf();

    for i in 0..files {
        let dir = root.join(format!("part{}", i % 4));
        fs::create_dir_all(&dir).expect("Failed to create dir");

        let mut content = String::with_capacity(words_per_file * 10);
        for w in 0..words_per_file {
            content.push_str(WORDS[(i * 7 + w * 13) % WORDS.len()]);
            content.push(if w % 12 == 11 { '\n' } else { ' ' });
        }
        fs::write(dir.join(format!("doc_{i}.txt")), content).expect("Failed to write file");
    }

    (temp_dir, root)
}

fn bench_build(c: &mut Criterion) {
    let (_temp, root) = create_corpus(200, 500);
    let filter = TextFilter::default();
    let mut group = c.benchmark_group("build");
    group.sample_size(20);

    group.bench_function("sequential", |b| {
        let stemmer = SnowballStemmer::default();
        b.iter(|| {
            let mut index = InvertedIndex::new();
            build(&root, &mut index, &filter, &stemmer).expect("build failed");
            black_box(index.size())
        })
    });

    for threads in [1, 2, 5, 8] {
        let queue = WorkQueue::new(threads).expect("Failed to start pool");
        group.bench_with_input(BenchmarkId::new("concurrent", threads), &threads, |b, _| {
            b.iter(|| {
                let index = Arc::new(ConcurrentIndex::new());
                build_concurrent(&root, &index, &queue, &filter, Arc::new(SnowballStemmer::default()))
                    .expect("build failed");
                black_box(index.size())
            })
        });
    }

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let (_temp, root) = create_corpus(200, 500);
    let stemmer = SnowballStemmer::default();
    let mut index = InvertedIndex::new();
    build(&root, &mut index, &TextFilter::default(), &stemmer).expect("build failed");

    let mut group = c.benchmark_group("search");
    for query in ["running dogs", "search", "j"] {
        let stems = unique_stems(query, &stemmer);
        group.bench_with_input(BenchmarkId::new("exact", query), &stems, |b, stems| {
            b.iter(|| black_box(index.exact_search(stems)))
        });
        group.bench_with_input(BenchmarkId::new("partial", query), &stems, |b, stems| {
            b.iter(|| black_box(index.partial_search(stems)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_search);
criterion_main!(benches);

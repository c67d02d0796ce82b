//! Sequential and pooled builds must produce identical output.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use stemdex::index::{build, build_concurrent, ConcurrentIndex, InvertedIndex, TextFilter};
use stemdex::pool::WorkQueue;
use stemdex::utils::SnowballStemmer;
use tempfile::TempDir;

fn three_file_corpus() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("sub")).unwrap();
    fs::write(
        dir.path().join("alpha.txt"),
        "The quick brown fox jumps\nover the lazy dog.\nRunning foxes, jumping dogs!",
    )
    .unwrap();
    fs::write(
        dir.path().join("beta.text"),
        "Dogs run. Cats sleep.\n\nRunners keep running and running.",
    )
    .unwrap();
    fs::write(
        dir.path().join("sub/gamma.txt"),
        "Señor Müller's café serves crêpes; 42 of them!",
    )
    .unwrap();
    dir
}

fn concurrent_json(root: &Path, threads: usize) -> (String, String) {
    let queue = WorkQueue::new(threads).unwrap();
    let index = Arc::new(ConcurrentIndex::new());
    let summary = build_concurrent(
        root,
        &index,
        &queue,
        &TextFilter::default(),
        Arc::new(SnowballStemmer::default()),
    )
    .unwrap();
    assert_eq!(summary.files, 3);
    assert_eq!(queue.pending(), 0);
    queue.join();

    (index.index_json().unwrap(), index.counts_json().unwrap())
}

#[test]
fn one_and_eight_threads_write_identical_bytes() {
    let corpus = three_file_corpus();
    let one = concurrent_json(corpus.path(), 1);
    let eight = concurrent_json(corpus.path(), 8);
    assert_eq!(one, eight);
}

#[test]
fn sequential_and_concurrent_agree() {
    let corpus = three_file_corpus();

    let mut sequential = InvertedIndex::new();
    build(
        corpus.path(),
        &mut sequential,
        &TextFilter::default(),
        &SnowballStemmer::default(),
    )
    .unwrap();

    for threads in [1, 2, 5, 8] {
        let (index_json, counts_json) = concurrent_json(corpus.path(), threads);
        assert_eq!(index_json, sequential.index_json().unwrap(), "{threads} threads");
        assert_eq!(counts_json, sequential.counts_json().unwrap(), "{threads} threads");
    }
}

#[test]
fn repeated_builds_are_stable() {
    let corpus = three_file_corpus();
    let first = concurrent_json(corpus.path(), 5);
    for _ in 0..10 {
        assert_eq!(concurrent_json(corpus.path(), 5), first);
    }
}

#[test]
fn accents_are_folded_and_digits_dropped() {
    let corpus = three_file_corpus();
    let mut index = InvertedIndex::new();
    build(
        corpus.path(),
        &mut index,
        &TextFilter::default(),
        &SnowballStemmer::default(),
    )
    .unwrap();

    let gamma = corpus.path().join("sub/gamma.txt").to_string_lossy().into_owned();
    assert!(index.contains_location("cafe", &gamma));
    assert!(index.contains_location("muller", &gamma));
    assert_eq!(index.word_count(&gamma), 7);
}

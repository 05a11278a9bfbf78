use chunky::search::SearchEngine;
use chunky::source::{InputSource, LineIndex, SeekableFileSource};
use chunky::window::ChunkWindow;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn create_test_file(size_kb: usize) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    let target_size = size_kb * 1024;
    let mut current_size = 0;
    let mut line_num = 0;

    while current_size < target_size {
        let log_line = format!(
            "[2024-09-02T10:{:02}:{:02}] INFO: Request {} user_{}\n",
            (line_num / 60) % 60,
            line_num % 60,
            line_num,
            line_num % 1000
        );
        temp_file.write_all(log_line.as_bytes()).unwrap();
        current_size += log_line.len();
        line_num += 1;
    }

    // A single needle near the end for the search benchmark
    temp_file
        .write_all(b"[2024-09-02T23:59:59] ERROR: disk quota exceeded\n")
        .unwrap();
    temp_file.flush().unwrap();
    temp_file
}

fn size_label(size_kb: usize) -> String {
    if size_kb < 1024 {
        format!("{size_kb}KB")
    } else {
        format!("{}MB", size_kb / 1024)
    }
}

fn bench_index_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_build");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(5));

    for &size_kb in &[500, 5000, 20000] {
        let temp_file = create_test_file(size_kb);
        let data = std::fs::read(temp_file.path()).unwrap();

        group.bench_with_input(
            BenchmarkId::new("memchr_scan", size_label(size_kb)),
            &data,
            |b, data| {
                b.iter(|| {
                    let mut index = LineIndex::new();
                    index.build_from_reader(data.as_slice()).unwrap();
                    black_box(index.line_count());
                });
            },
        );
    }

    group.finish();
}

fn bench_chunk_jumps(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunk_jumps");
    group.sample_size(20);

    let temp_file = create_test_file(20000);
    let mut source = SeekableFileSource::open(temp_file.path()).unwrap();
    let total = source.total_lines().unwrap().unwrap_or(0);

    for &chunk_size in &[100, 1000, 10000] {
        let mut window = ChunkWindow::new(chunk_size, 50).unwrap();
        let chunks = (total / chunk_size as u64).max(1);

        group.bench_with_input(
            BenchmarkId::new("jump_to_chunk", chunk_size),
            &chunk_size,
            |b, _| {
                let mut k = 0u64;
                b.iter(|| {
                    // Stride through the file so every jump is a cold seek
                    k = (k + 7) % chunks;
                    window.jump_to_chunk(&mut source, k).unwrap();
                    black_box(window.lines().len());
                });
            },
        );
    }

    group.finish();
}

fn bench_search_to_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(10));

    for &size_kb in &[500, 5000] {
        let temp_file = create_test_file(size_kb);
        let mut source = SeekableFileSource::open(temp_file.path()).unwrap();
        source.total_lines().unwrap();

        group.bench_with_input(
            BenchmarkId::new("forward_scan", size_label(size_kb)),
            &size_kb,
            |b, _| {
                b.iter(|| {
                    let mut window = ChunkWindow::new(1000, 50).unwrap();
                    window.load_chunk(&mut source, 0).unwrap();
                    let mut engine = SearchEngine::new();
                    let hit = engine.search("quota", &mut window, &mut source).unwrap();
                    black_box(hit.line);
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_index_build,
    bench_chunk_jumps,
    bench_search_to_end
);
criterion_main!(benches);

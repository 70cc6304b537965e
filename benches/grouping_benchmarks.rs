use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use namedupe::duplicates::{group_by_key, DuplicateFinder, FinderConfig, NameNormalizer};
use namedupe::scanner::{FileEntry, TimeSource, Walker, WalkerConfig};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, UNIX_EPOCH};
use tempfile::TempDir;

const MARKERS: [&str; 5] = ["", " (1)", " (2)", ".copy", " - Copy"];

// Synthetic entries: `n` files over 10 directories, every fifth one a base name.
fn synthetic_entries(n: usize) -> Vec<FileEntry> {
    (0..n)
        .map(|i| {
            let name = format!("file_{}{}.txt", i / 5, MARKERS[i % MARKERS.len()]);
            FileEntry::new(
                PathBuf::from(format!("/bench/dir_{}/{}", i % 10, name)),
                1024,
                UNIX_EPOCH + Duration::from_secs(i as u64),
            )
        })
        .collect()
}

fn setup_test_dir(dirs: usize, bases_per_dir: usize) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    for d in 0..dirs {
        let dir = temp_dir.path().join(format!("dir_{}", d));
        fs::create_dir_all(&dir).expect("Failed to create dir");
        write_family(&dir, bases_per_dir);
    }
    temp_dir
}

fn write_family(dir: &Path, bases: usize) {
    for i in 0..bases {
        for marker in MARKERS {
            let path = dir.join(format!("file_{}{}.txt", i, marker));
            fs::write(path, "some content to make it a real file").expect("Failed to write file");
        }
    }
}

// 1. Key derivation
fn bench_group_key(c: &mut Criterion) {
    let plain = NameNormalizer::default();
    let with_copy = NameNormalizer::new(r"\s*\(\d+\)", true).unwrap();

    c.bench_function("group_key_numbered", |b| {
        b.iter(|| black_box(plain.group_key(black_box("quarterly report (3) (12).xlsx"))))
    });
    c.bench_function("group_key_copy", |b| {
        b.iter(|| black_box(with_copy.group_key(black_box("holiday photo - Copy (2).jpg"))))
    });
}

// 2. In-memory grouping
fn bench_group_by_key(c: &mut Criterion) {
    let mut group = c.benchmark_group("group_by_key");
    let normalizer = NameNormalizer::new(r"\s*\(\d+\)", true).unwrap();

    for n in [1_000, 10_000, 100_000] {
        let entries = synthetic_entries(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &entries, |b, entries| {
            b.iter(|| black_box(group_by_key(entries.clone(), &normalizer)))
        });
    }
    group.finish();
}

// 3. Walk and full pipeline on disk
fn bench_pipeline(c: &mut Criterion) {
    let temp_dir = setup_test_dir(4, 20); // 4 dirs x 20 bases x 5 names -> 400 files
    let walker_config = WalkerConfig::new(true, false, TimeSource::Modified);

    c.bench_function("walker_400_files", |b| {
        b.iter(|| {
            let walker = Walker::new(temp_dir.path(), walker_config.clone());
            black_box(walker.scan());
        })
    });

    let finder = DuplicateFinder::new(
        FinderConfig::default()
            .with_detect_copy(true)
            .with_walker(walker_config.clone()),
    )
    .unwrap();
    c.bench_function("find_duplicates_400_files", |b| {
        b.iter(|| black_box(finder.find_duplicates(temp_dir.path()).unwrap()))
    });
}

criterion_group!(benches, bench_group_key, bench_group_by_key, bench_pipeline);
criterion_main!(benches);

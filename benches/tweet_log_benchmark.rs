/// Benchmark for tweet lookups while rendering a page of items.
/// Measures the cost of merging a large tweet log into the displayed items.
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use markai::storage::SlotStore;
use markai::tweets::TweetLog;

/// Build a log with `records` entries spread over `keys` distinct item URLs,
/// so most keys are shadowed several times.
fn setup_large_log(records: usize, keys: usize) -> TweetLog {
    let mut log = TweetLog::load(SlotStore::in_memory());
    for i in 0..records {
        log.append(
            format!("https://github.com/owner/repo/pull/{}", i % keys),
            format!("Tweet number {i} #release"),
        );
    }
    log
}

fn bench_resolve(c: &mut Criterion) {
    let log = setup_large_log(5_000, 500);
    let page: Vec<String> = (0..30)
        .map(|i| format!("https://github.com/owner/repo/pull/{}", i * 7))
        .collect();

    c.bench_function("resolve_page_of_30", |b| {
        b.iter(|| {
            for key in &page {
                black_box(log.resolve(black_box(key)));
            }
        })
    });

    c.bench_function("resolve_missing_key", |b| {
        b.iter(|| black_box(log.resolve(black_box("https://github.com/owner/repo/pull/999999"))))
    });
}

fn bench_load(c: &mut Criterion) {
    let store = SlotStore::in_memory();
    {
        let mut log = TweetLog::load(store.clone());
        for i in 0..2_000 {
            log.append(format!("https://github.com/owner/repo/commit/{}", i % 200), "text");
        }
    }

    c.bench_function("load_2000_records", |b| {
        b.iter(|| black_box(TweetLog::load(store.clone())))
    });
}

criterion_group!(benches, bench_resolve, bench_load);
criterion_main!(benches);

//! Benchmarks comparing the redb and LSM stores through the shared facade.

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};

use kvbridge::backends::{LsmStore, RedbStore};
use kvbridge::{Cursor, Db, StorageError, Txn};
use tempfile::TempDir;

fn redb_store() -> (Option<TempDir>, RedbStore) {
    (None, RedbStore::in_memory().unwrap())
}

fn lsm_store() -> (Option<TempDir>, LsmStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = LsmStore::open(dir.path().join("store")).unwrap();
    (Some(dir), store)
}

fn fill<D: Db>(store: &D, count: u64) {
    let mut txn = store.txn().unwrap();
    for i in 0..count {
        let key = format!("key:{i:05}");
        let value = format!("value:{i:05}");
        txn.put(key.as_bytes(), value.as_bytes()).unwrap();
    }
    txn.commit().unwrap();
}

/// Benchmark transactions of a growing number of puts.
fn bench_put_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("put_batch");
    group.sample_size(20);

    for size in [10, 100, 1000] {
        group.throughput(Throughput::Elements(size));
        group.bench_function(format!("redb_{size}"), |b| {
            b.iter_batched(redb_store, |(_dir, store)| fill(&store, size), BatchSize::SmallInput);
        });
        group.bench_function(format!("lsm_{size}"), |b| {
            b.iter_batched(lsm_store, |(_dir, store)| fill(&store, size), BatchSize::SmallInput);
        });
    }

    group.finish();
}

/// Benchmark facade point reads.
fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("get");
    group.throughput(Throughput::Elements(1));

    let (_redb_dir, redb) = redb_store();
    fill(&redb, 1000);
    group.bench_function("redb", |b| {
        b.iter(|| {
            redb.get(black_box(&b"key:00500"[..]), |value| {
                black_box(value);
                Ok::<_, StorageError>(())
            })
            .unwrap()
        });
    });

    let (_lsm_dir, lsm) = lsm_store();
    fill(&lsm, 1000);
    group.bench_function("lsm", |b| {
        b.iter(|| {
            lsm.get(black_box(&b"key:00500"[..]), |value| {
                black_box(value);
                Ok::<_, StorageError>(())
            })
            .unwrap()
        });
    });

    group.finish();
}

fn scan<D: Db>(store: &D) -> usize {
    let mut cursor = store.iterator().unwrap();
    let mut count = 0;
    let mut entry = cursor.seek_first().unwrap();
    while entry.is_some() {
        count += 1;
        entry = cursor.next().unwrap();
    }
    count
}

/// Benchmark a full forward scan.
fn bench_cursor_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("cursor_scan");

    for size in [100, 1000, 10000] {
        group.throughput(Throughput::Elements(size));

        let (_redb_dir, redb) = redb_store();
        fill(&redb, size);
        group.bench_function(format!("redb_{size}"), |b| {
            b.iter(|| black_box(scan(&redb)));
        });

        let (_lsm_dir, lsm) = lsm_store();
        fill(&lsm, size);
        group.bench_function(format!("lsm_{size}"), |b| {
            b.iter(|| black_box(scan(&lsm)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_put_batch, bench_get, bench_cursor_scan);
criterion_main!(benches);

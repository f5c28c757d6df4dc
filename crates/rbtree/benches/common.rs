use std::collections::BTreeSet;
use std::hint::black_box;
use std::time::{Duration, Instant};

use criterion::measurement::Measurement;
use criterion::{BenchmarkGroup, BenchmarkId};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use rbtree::{NodeId, RbTree};

const SIZES: [usize; 4] = [1_000, 8_000, 64_000, 256_000];
const CHURN_OPS_PER_ITER: usize = 200;

const SAMPLE_SIZE: usize = 15;
const WARM_UP_MS: u64 = 300;
const MEASURE_MS: u64 = 700;

pub fn apply_runtime_config<M: Measurement>(group: &mut BenchmarkGroup<'_, M>) {
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(Duration::from_millis(WARM_UP_MS));
    group.measurement_time(Duration::from_millis(MEASURE_MS));
}

fn generate_keys(size: usize, base_seed: u64) -> Vec<u64> {
    (0..size)
        .map(|i| mix_seed(base_seed ^ (i as u64)))
        .collect()
}

/// Indices into the live-handle vector, drawn ahead of the timed section.
fn generate_churn_picks(size: usize, seed: u64) -> Vec<usize> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut picks: Vec<usize> = (0..size).cycle().take(CHURN_OPS_PER_ITER).collect();
    picks.shuffle(&mut rng);
    picks
}

pub fn bench_all_build<T>(group: &mut BenchmarkGroup<'_, T>)
where
    T: Measurement<Value = Duration>,
{
    for &size in &SIZES {
        apply_runtime_config(group);
        let keys = generate_keys(size, seed_base(1, size as u64));

        group.bench_function(BenchmarkId::new("rb", size), |bencher| {
            bencher.iter_custom(|iters| {
                let mut total = Duration::ZERO;
                for _ in 0..iters {
                    let start = Instant::now();
                    let mut tree = RbTree::with_capacity(size);
                    for &k in &keys {
                        black_box(tree.insert(k));
                    }
                    black_box(tree.len());
                    total += start.elapsed();
                }
                total
            })
        });

        group.bench_function(BenchmarkId::new("std_btree", size), |bencher| {
            bencher.iter_custom(|iters| {
                let mut total = Duration::ZERO;
                for _ in 0..iters {
                    let start = Instant::now();
                    let mut set = BTreeSet::new();
                    for &k in &keys {
                        black_box(set.insert(k));
                    }
                    black_box(set.len());
                    total += start.elapsed();
                }
                total
            })
        });
    }
}

pub fn bench_all_churn<T>(group: &mut BenchmarkGroup<'_, T>)
where
    T: Measurement<Value = Duration>,
{
    for &size in &SIZES {
        apply_runtime_config(group);
        let base_seed = seed_base(2, size as u64);
        let keys = generate_keys(size, base_seed);

        let mut tree = RbTree::with_capacity(size);
        let mut handles: Vec<NodeId> = keys.iter().map(|&k| tree.insert(k)).collect();
        group.bench_function(BenchmarkId::new("rb", size), |bencher| {
            bencher.iter_custom(|iters| {
                let mut total = Duration::ZERO;
                for iter in 0..iters {
                    let picks = generate_churn_picks(size, seed_for_iter(base_seed, iter));
                    let start = Instant::now();
                    for &pick in &picks {
                        let id = handles.swap_remove(pick % handles.len());
                        let key = tree.remove(id);
                        handles.push(tree.insert(black_box(key)));
                    }
                    black_box(tree.len());
                    total += start.elapsed();
                }
                total
            })
        });

        let mut set: BTreeSet<u64> = keys.iter().copied().collect();
        group.bench_function(BenchmarkId::new("std_btree", size), |bencher| {
            bencher.iter_custom(|iters| {
                let mut total = Duration::ZERO;
                for iter in 0..iters {
                    let picks = generate_churn_picks(size, seed_for_iter(base_seed, iter));
                    let start = Instant::now();
                    for &pick in &picks {
                        let key = keys[pick % keys.len()];
                        set.remove(&key);
                        black_box(set.insert(key));
                    }
                    black_box(set.len());
                    total += start.elapsed();
                }
                total
            })
        });
    }
}

pub fn bench_all_scan<T>(group: &mut BenchmarkGroup<'_, T>)
where
    T: Measurement<Value = Duration>,
{
    for &size in &SIZES {
        apply_runtime_config(group);
        let keys = generate_keys(size, seed_base(3, size as u64));

        let mut tree = RbTree::with_capacity(size);
        for &k in &keys {
            tree.insert(k);
        }
        group.bench_function(BenchmarkId::new("rb", size), |bencher| {
            bencher.iter_custom(|iters| {
                let mut total = Duration::ZERO;
                for _ in 0..iters {
                    let start = Instant::now();
                    let sum: u64 = tree.iter().map(|(_, &v)| v).fold(0, u64::wrapping_add);
                    black_box(sum);
                    total += start.elapsed();
                }
                total
            })
        });

        let set: BTreeSet<u64> = keys.iter().copied().collect();
        group.bench_function(BenchmarkId::new("std_btree", size), |bencher| {
            bencher.iter_custom(|iters| {
                let mut total = Duration::ZERO;
                for _ in 0..iters {
                    let start = Instant::now();
                    let sum: u64 = set.iter().copied().fold(0, u64::wrapping_add);
                    black_box(sum);
                    total += start.elapsed();
                }
                total
            })
        });
    }
}

fn seed_base(workload_id: u64, size: u64) -> u64 {
    mix_seed(0x0DDB_A11A_2026_0000_u64 ^ (workload_id << 48) ^ size)
}

fn seed_for_iter(base: u64, iter: u64) -> u64 {
    mix_seed(base ^ iter.wrapping_mul(SEED_MIX))
}

const SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

fn mix_seed(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

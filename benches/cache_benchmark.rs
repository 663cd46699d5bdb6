use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{seq::SliceRandom, thread_rng, Rng};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use travel_aggregator::cache::{CacheConfig, TtlCache};

// Mixed read/write load on the TTL cache shared by the places and currency services
pub fn cache_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("place_lookup_cache");

    for max_entries in [256usize, 1024, 8192].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(max_entries),
            max_entries,
            |b, &max_entries| {
                b.iter(|| {
                    let cache: Arc<TtlCache<String, Option<String>>> =
                        Arc::new(TtlCache::new(CacheConfig {
                            default_ttl: Duration::from_secs(300),
                            max_entries,
                        }));

                    let hotel_names = (0..2_000)
                        .map(|i| format!("hotel {}|48.{:04},2.{:04}", i, i, i))
                        .collect::<Vec<_>>();

                    let mut handles = vec![];
                    for _ in 0..4 {
                        let cache = Arc::clone(&cache);
                        let hotel_names = hotel_names.clone();

                        let handle = thread::spawn(move || {
                            let mut rng = thread_rng();

                            for _ in 0..250 {
                                let Some(key) = hotel_names.choose(&mut rng) else {
                                    continue;
                                };

                                if rng.gen_bool(0.3) {
                                    // 30% writes
                                    let place = format!("place-{}", key.len());
                                    cache.insert(key.clone(), Some(place), None);
                                } else {
                                    // 70% reads
                                    let _ = cache.get(key);
                                }
                            }
                        });

                        handles.push(handle);
                    }

                    for handle in handles {
                        handle.join().unwrap();
                    }

                    black_box(cache.stats())
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, cache_benchmark);
criterion_main!(benches);

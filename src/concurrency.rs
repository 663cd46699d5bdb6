// Bounded-concurrency map used to cap simultaneous outbound enrichment calls

use futures::future::try_join_all;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

// Runs `mapper` over `items` with at most `limit` invocations in flight.
// Workers claim the next index from a shared cursor and write into the slot
// for that index, so results[i] always corresponds to items[i]. The first
// error aborts the remaining work and is returned.
pub async fn map_with_concurrency<T, R, E, F, Fut>(
    items: &[T],
    limit: usize,
    mapper: F,
) -> Result<Vec<R>, E>
where
    F: Fn(&T) -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let worker_count = limit.max(1).min(items.len());
    let cursor = AtomicUsize::new(0);
    let slots: Mutex<Vec<Option<R>>> = Mutex::new((0..items.len()).map(|_| None).collect());

    let cursor = &cursor;
    let slots_ref = &slots;
    let mapper = &mapper;
    let workers = (0..worker_count).map(move |_| async move {
        loop {
            let index = cursor.fetch_add(1, Ordering::SeqCst);
            let Some(item) = items.get(index) else {
                return Ok::<(), E>(());
            };
            let value = mapper(item).await?;
            slots_ref.lock()[index] = Some(value);
        }
    });

    try_join_all(workers).await?;

    Ok(slots.into_inner().into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use test_case::test_case;

    struct Tracker {
        active: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    impl Tracker {
        fn new() -> Self {
            Self {
                active: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
            }
        }

        async fn run(&self, value: u64) -> Result<u64, String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            // Later items finish sooner so completion order differs from input order
            tokio::time::sleep(Duration::from_millis(25 - (value % 5) * 5)).await;

            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(value * 10)
        }
    }

    #[test_case(20, 4; "enrichment default")]
    #[test_case(7, 3; "uneven split")]
    #[test_case(3, 8; "limit above item count")]
    #[test_case(5, 0; "zero limit runs serially")]
    #[tokio::test]
    async fn test_preserves_order_and_caps_concurrency(count: u64, limit: usize) {
        let tracker = Tracker::new();
        let tracker_ref = &tracker;
        let items: Vec<u64> = (0..count).collect();

        let results = map_with_concurrency(&items, limit, move |v| tracker_ref.run(*v))
            .await
            .unwrap();

        let expected: Vec<u64> = items.iter().map(|v| v * 10).collect();
        assert_eq!(results, expected);
        assert_eq!(tracker.calls.load(Ordering::SeqCst), count as usize);

        let peak = tracker.peak.load(Ordering::SeqCst);
        assert!(peak <= limit.max(1), "peak {} exceeded limit {}", peak, limit);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let items: Vec<u32> = vec![];
        let results: Vec<u32> = map_with_concurrency(&items, 4, |v| {
            let v = *v;
            async move { Ok::<_, ()>(v) }
        })
        .await
        .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_first_error_aborts_batch() {
        let started = AtomicUsize::new(0);
        let items: Vec<u32> = (0..50).collect();

        let result = map_with_concurrency(&items, 2, |v| {
            let v = *v;
            started.fetch_add(1, Ordering::SeqCst);
            async move {
                tokio::time::sleep(Duration::from_millis(2)).await;
                if v == 3 {
                    Err(format!("lookup {} failed", v))
                } else {
                    Ok(v)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap_err(), "lookup 3 failed");
        assert!(
            started.load(Ordering::SeqCst) < items.len(),
            "remaining items should not be started after a failure"
        );
    }
}

use std::sync::Arc;
use std::time::Duration;

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use tokio::sync::Semaphore;

use super::control::CancelToken;

/// Drive `worker_fn` over every item with a bounded pool.
///
/// No more than `workers` items are dispatched simultaneously. The optional
/// `dispatch_delay` is applied per worker after it claims a permit, so slots
/// rate-limit independently rather than serializing globally. Items not yet
/// admitted when `cancel` fires are never dispatched; their results simply
/// do not appear in the returned vector. Completion order is arbitrary.
pub async fn run_pool<T, F, Fut, R>(
    items: Vec<T>,
    workers: usize,
    dispatch_delay: Option<Duration>,
    cancel: CancelToken,
    worker_fn: F,
) -> Vec<R>
where
    T: Send + 'static,
    F: Fn(T) -> Fut + Clone + Send + 'static,
    Fut: std::future::Future<Output = R> + Send,
    R: Send + 'static,
{
    let sem = Arc::new(Semaphore::new(workers.max(1)));
    let mut futs: FuturesUnordered<_> = FuturesUnordered::new();

    for item in items {
        let sem = sem.clone();
        let cancel = cancel.clone();
        let worker = worker_fn.clone();

        futs.push(async move {
            let Ok(_permit) = sem.acquire_owned().await else {
                return None;
            };
            if cancel.is_cancelled() {
                return None;
            }
            if let Some(delay) = dispatch_delay {
                tokio::time::sleep(delay).await;
            }
            Some(worker(item).await)
        });
    }

    let mut results = Vec::new();
    while let Some(res) = futs.next().await {
        if let Some(r) = res {
            results.push(r);
        }
    }
    results
}

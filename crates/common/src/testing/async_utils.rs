//! Async testing utilities
//!
//! Helpers for tests that wait on background tasks (scheduler loops, spawned
//! claim runs) without fixed sleeps.

use std::future::Future;
use std::time::Duration;

/// Poll a condition until it returns true or times out
///
/// Returns whether the condition became true.
///
/// # Examples
///
/// ```no_run
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// use hoyosign_common::testing::poll_until;
///
/// # async fn demo() {
/// let flag = Arc::new(AtomicBool::new(true));
/// let done = poll_until(Duration::from_secs(1), Duration::from_millis(10), || {
///     let flag = flag.clone();
///     async move { flag.load(Ordering::SeqCst) }
/// })
/// .await;
/// assert!(done);
/// # }
/// ```
pub async fn poll_until<F, Fut>(timeout: Duration, interval: Duration, mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let start = tokio::time::Instant::now();

    while start.elapsed() < timeout {
        if condition().await {
            return true;
        }
        tokio::time::sleep(interval).await;
    }

    condition().await
}

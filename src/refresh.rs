use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Handle to a display's periodic refresh task.
///
/// Dropping the handle aborts the task, so a display that goes away takes its
/// timer with it and no further store queries are issued.
pub struct RefreshHandle(JoinHandle<()>);

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Runs `tick` immediately and then once per `period`.
pub fn spawn<F, Fut>(period: Duration, mut tick: F) -> RefreshHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send,
{
    RefreshHandle(tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            tick().await;
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn ticks_immediately_and_then_periodically() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let _handle = spawn(Duration::from_secs(5), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_stops_the_timer() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let handle = spawn(Duration::from_secs(5), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_secs(11)).await;
        let before = calls.load(Ordering::SeqCst);
        assert!(before >= 2);

        drop(handle);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(calls.load(Ordering::SeqCst), before);
    }
}

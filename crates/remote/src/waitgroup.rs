//! A counted join point for the worker pools.
//!
//! The increment-before-enqueue discipline matters: a unit of work is
//! counted strictly before it becomes observable on a queue, so the
//! group can never read zero while deeper levels are still pending
//! discovery.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Notify;

#[derive(Debug, Default)]
pub struct WaitGroup {
    count: AtomicUsize,
    notify: Notify,
}

impl WaitGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count `n` new units of work. Call before the corresponding items
    /// are enqueued.
    pub fn add(&self, n: usize) {
        self.count.fetch_add(n, Ordering::SeqCst);
    }

    /// Mark one unit complete
    pub fn done(&self) {
        let previous = self.count.fetch_sub(1, Ordering::SeqCst);
        if previous == 1 {
            self.notify.notify_waiters();
        }
    }

    pub fn pending(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Block until the count drains to zero
    pub async fn wait(&self) {
        loop {
            // register interest before the check so a concurrent done()
            // between the check and the await is not lost
            let notified = self.notify.notified();
            if self.count.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Wait with a deadline. Returns `true` when the group drained in
    /// time, `false` on timeout.
    pub async fn wait_timeout(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, self.wait()).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn waits_for_all_units() {
        let wg = Arc::new(WaitGroup::new());
        wg.add(3);

        for _ in 0..3 {
            let wg = wg.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                wg.done();
            });
        }

        assert!(wg.wait_timeout(Duration::from_secs(1)).await);
        assert_eq!(wg.pending(), 0);
    }

    #[tokio::test]
    async fn empty_group_returns_immediately() {
        let wg = WaitGroup::new();
        assert!(wg.wait_timeout(Duration::from_millis(1)).await);
    }

    #[tokio::test]
    async fn timeout_reports_a_stall() {
        let wg = WaitGroup::new();
        wg.add(1);
        assert!(!wg.wait_timeout(Duration::from_millis(20)).await);
    }

    #[tokio::test]
    async fn late_increments_are_observed() {
        let wg = Arc::new(WaitGroup::new());
        wg.add(1);

        let inner = wg.clone();
        tokio::spawn(async move {
            // one unit spawns another before completing
            inner.add(1);
            inner.done();
            tokio::time::sleep(Duration::from_millis(10)).await;
            inner.done();
        });

        assert!(wg.wait_timeout(Duration::from_secs(1)).await);
    }
}

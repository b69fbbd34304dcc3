use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Swallows rapid repeat submissions (a double-clicked "Pay" button).
/// Acceptance records the new timestamp; rejection leaves it untouched.
#[derive(Debug)]
pub struct DebounceGuard {
    min_interval: Duration,
    last_accepted: Option<Instant>,
}

impl DebounceGuard {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_accepted: None,
        }
    }

    pub fn try_accept(&mut self) -> bool {
        let now = Instant::now();
        if let Some(last) = self.last_accepted {
            if now.duration_since(last) < self.min_interval {
                return false;
            }
        }
        self.last_accepted = Some(now);
        true
    }
}

/// Single-shot armed timer. Arming while armed cancels the previous timer
/// (last-start-wins); disarming or dropping cancels outright, so no callback
/// can fire after teardown.
pub struct TimeoutMonitor {
    duration: Duration,
    armed: Option<JoinHandle<()>>,
}

impl TimeoutMonitor {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            armed: None,
        }
    }

    pub fn arm<F>(&mut self, on_timeout: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.disarm();
        let duration = self.duration;
        self.armed = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            on_timeout();
        }));
    }

    pub fn disarm(&mut self) {
        if let Some(handle) = self.armed.take() {
            handle.abort();
        }
    }
}

impl Drop for TimeoutMonitor {
    fn drop(&mut self) {
        self.disarm();
    }
}

/// Guards a callback so it fires at most once per flow instance.
#[derive(Debug, Default)]
pub struct OneShot(AtomicBool);

impl OneShot {
    /// Returns true exactly once.
    pub fn fire(&self) -> bool {
        !self.0.swap(true, Ordering::SeqCst)
    }

    pub fn fired(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn debounce_rejects_within_interval_and_accepts_after() {
        let mut guard = DebounceGuard::new(Duration::from_millis(2000));
        assert!(guard.try_accept());
        assert!(!guard.try_accept());

        tokio::time::advance(Duration::from_millis(1999)).await;
        assert!(!guard.try_accept());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(guard.try_accept());
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_attempts_do_not_extend_the_window() {
        let mut guard = DebounceGuard::new(Duration::from_millis(2000));
        assert!(guard.try_accept());
        tokio::time::advance(Duration::from_millis(1500)).await;
        assert!(!guard.try_accept());
        tokio::time::advance(Duration::from_millis(500)).await;
        assert!(guard.try_accept());
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_fires_exactly_once() {
        let fired = Arc::new(AtomicU32::new(0));
        let mut monitor = TimeoutMonitor::new(Duration::from_millis(100));
        let counter = Arc::clone(&fired);
        monitor.arm(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(150)).await;
        tokio::task::yield_now().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(150)).await;
        tokio::task::yield_now().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rearming_cancels_the_previous_timer() {
        let fired = Arc::new(AtomicU32::new(0));
        let mut monitor = TimeoutMonitor::new(Duration::from_millis(100));

        let first = Arc::clone(&fired);
        monitor.arm(move || {
            first.fetch_add(1, Ordering::SeqCst);
        });
        let second = Arc::clone(&fired);
        monitor.arm(move || {
            second.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(150)).await;
        tokio::task::yield_now().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn disarm_and_drop_prevent_late_callbacks() {
        let fired = Arc::new(AtomicU32::new(0));

        let mut monitor = TimeoutMonitor::new(Duration::from_millis(100));
        let counter = Arc::clone(&fired);
        monitor.arm(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        monitor.disarm();
        tokio::time::advance(Duration::from_millis(200)).await;
        tokio::task::yield_now().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        let mut dropped = TimeoutMonitor::new(Duration::from_millis(100));
        let counter = Arc::clone(&fired);
        dropped.arm(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        drop(dropped);
        tokio::time::advance(Duration::from_millis(200)).await;
        tokio::task::yield_now().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn one_shot_fires_once() {
        let guard = OneShot::default();
        assert!(!guard.fired());
        assert!(guard.fire());
        assert!(!guard.fire());
        assert!(guard.fired());
    }
}

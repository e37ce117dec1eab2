//! Periodic flush scheduling.
//!
//! The scheduler is the only concurrent actor around a batch policy: it
//! never touches the accumulator itself, it only posts [`FlushTick`]s on
//! a channel the owning caller services. The flush deadline is derived
//! from a last-flush instant shared with the policy, so a manual flush
//! re-arms the period window without any extra signalling.

use crate::metrics;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Marker posted whenever a period elapses without a flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushTick;

#[derive(Debug, Error)]
#[error("flush scheduler did not stop within {timeout:?}")]
pub struct CloseTimedOut {
    pub timeout: Duration,
}

/// Single-timer component that forces a flush every `period` since the
/// last flush.
#[derive(Debug)]
pub struct PeriodicFlushScheduler {
    period: Duration,
    last_flush: Arc<Mutex<Instant>>,
    ticks: mpsc::Receiver<FlushTick>,
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl PeriodicFlushScheduler {
    /// Spawn the timer task. Must be called from within a tokio runtime.
    pub fn spawn(period: Duration, last_flush: Arc<Mutex<Instant>>) -> Self {
        // Capacity 1: ticks coalesce while the owner is busy, and the
        // task parks on `send` instead of spinning on an overdue
        // deadline.
        let (tick_tx, ticks) = mpsc::channel(1);
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let timer_last_flush = Arc::clone(&last_flush);

        let task = tokio::spawn(async move {
            loop {
                let deadline = *timer_last_flush.lock() + period;
                tokio::select! {
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            return;
                        }
                    }
                    _ = tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)) => {
                        // A manual flush may have moved the window while
                        // we slept.
                        if *timer_last_flush.lock() + period > Instant::now() {
                            continue;
                        }
                        tokio::select! {
                            changed = shutdown_rx.changed() => {
                                if changed.is_err() || *shutdown_rx.borrow() {
                                    return;
                                }
                            }
                            sent = tick_tx.send(FlushTick) => {
                                if sent.is_err() {
                                    return;
                                }
                                metrics::FORCED_FLUSH_TICKS.inc();
                            }
                        }
                    }
                }
            }
        });

        Self {
            period,
            last_flush,
            ticks,
            shutdown,
            task: Some(task),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Remaining time until the next forced flush, saturating at zero
    /// when overdue.
    pub fn until_next(&self) -> Duration {
        let deadline = *self.last_flush.lock() + self.period;
        deadline.saturating_duration_since(Instant::now())
    }

    /// Await the next forced-flush tick. Returns `None` once the timer
    /// task has stopped.
    pub async fn tick(&mut self) -> Option<FlushTick> {
        self.ticks.recv().await
    }

    /// Signal the timer task to stop. Non-blocking.
    pub fn close_async(&self) {
        let _ = self.shutdown.send(true);
    }

    /// Wait for the timer task to finish, up to `timeout`.
    pub async fn wait_for_close(&mut self, timeout: Duration) -> Result<(), CloseTimedOut> {
        let Some(task) = self.task.take() else {
            return Ok(());
        };
        match tokio::time::timeout(timeout, task).await {
            Ok(_) => Ok(()),
            Err(_) => Err(CloseTimedOut { timeout }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared_now() -> Arc<Mutex<Instant>> {
        Arc::new(Mutex::new(Instant::now()))
    }

    #[tokio::test]
    async fn posts_tick_after_period() {
        let last_flush = shared_now();
        let mut scheduler =
            PeriodicFlushScheduler::spawn(Duration::from_millis(50), Arc::clone(&last_flush));

        let tick = tokio::time::timeout(Duration::from_secs(2), scheduler.tick())
            .await
            .expect("tick timeout");
        assert_eq!(tick, Some(FlushTick));

        scheduler.close_async();
        scheduler
            .wait_for_close(Duration::from_secs(1))
            .await
            .expect("close");
    }

    #[tokio::test]
    async fn manual_flush_re_arms_the_window() {
        let last_flush = shared_now();
        let mut scheduler =
            PeriodicFlushScheduler::spawn(Duration::from_millis(200), Arc::clone(&last_flush));

        tokio::time::sleep(Duration::from_millis(100)).await;
        *last_flush.lock() = Instant::now();

        // The deadline moved out to ~200ms from now, so nothing should
        // arrive in the next 120ms.
        let early = tokio::time::timeout(Duration::from_millis(120), scheduler.tick()).await;
        assert!(early.is_err(), "tick arrived inside the re-armed window");

        let tick = tokio::time::timeout(Duration::from_secs(2), scheduler.tick())
            .await
            .expect("tick timeout");
        assert_eq!(tick, Some(FlushTick));

        scheduler.close_async();
        scheduler
            .wait_for_close(Duration::from_secs(1))
            .await
            .expect("close");
    }

    #[tokio::test]
    async fn until_next_counts_down_and_saturates() {
        let last_flush = shared_now();
        let mut scheduler =
            PeriodicFlushScheduler::spawn(Duration::from_millis(300), Arc::clone(&last_flush));

        let remaining = scheduler.until_next();
        assert!(remaining <= Duration::from_millis(300));
        assert!(remaining > Duration::from_millis(100));

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(scheduler.until_next(), Duration::ZERO);

        scheduler.close_async();
        scheduler
            .wait_for_close(Duration::from_secs(1))
            .await
            .expect("close");
    }

    #[tokio::test]
    async fn close_stops_the_timer_task() {
        let last_flush = shared_now();
        let mut scheduler =
            PeriodicFlushScheduler::spawn(Duration::from_secs(3600), Arc::clone(&last_flush));
        scheduler.close_async();
        scheduler
            .wait_for_close(Duration::from_secs(1))
            .await
            .expect("close should finish promptly");
        // Second wait is a no-op.
        scheduler
            .wait_for_close(Duration::from_millis(10))
            .await
            .expect("idempotent close");
    }
}

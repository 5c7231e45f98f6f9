//! Repeating frame tick with explicit start/stop

use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior};

#[derive(Debug)]
pub struct FrameTicker {
    period: Duration,
    interval: Option<Interval>,
}

impl FrameTicker {
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            interval: None,
        }
    }

    /// Start ticking. A running ticker is left alone.
    pub fn start(&mut self) {
        if self.interval.is_none() {
            let mut interval = tokio::time::interval(self.period);
            // A slow frame should not cause a burst of catch-up ticks.
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            self.interval = Some(interval);
        }
    }

    pub fn stop(&mut self) {
        self.interval = None;
    }

    pub fn is_running(&self) -> bool {
        self.interval.is_some()
    }

    /// Wait for the next frame. Never resolves while stopped, so it can sit in
    /// a `select!` next to other event sources.
    pub async fn tick(&mut self) -> Instant {
        match self.interval.as_mut() {
            Some(interval) => interval.tick().await,
            None => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_ticks_at_period_while_running() {
        let mut ticker = FrameTicker::new(Duration::from_millis(16));
        ticker.start();
        assert!(ticker.is_running());

        let first = ticker.tick().await;
        let second = ticker.tick().await;
        let third = ticker.tick().await;

        assert_eq!(second - first, Duration::from_millis(16));
        assert_eq!(third - second, Duration::from_millis(16));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_ticker_never_fires() {
        let mut ticker = FrameTicker::new(Duration::from_millis(16));
        ticker.start();
        ticker.tick().await;
        ticker.stop();

        let waited = tokio::time::timeout(Duration::from_secs(1), ticker.tick()).await;
        assert!(waited.is_err());
        assert!(!ticker.is_running());
    }
}

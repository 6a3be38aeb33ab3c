//! Fixed delay between successive post fetches.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Pacer {
    delay: Duration,
    last: Option<Instant>,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, last: None }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Sleep until `delay` has passed since the previous call.
    /// The first call returns immediately.
    pub async fn wait(&mut self) {
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.delay {
                let sleep_duration = self.delay - elapsed;
                tracing::debug!(sleep_ms = %sleep_duration.as_millis(), "Pacing request");
                tokio::time::sleep(sleep_duration).await;
            }
        }
        self.last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_call_does_not_wait() {
        let mut pacer = Pacer::new(Duration::from_millis(200));
        let start = Instant::now();
        pacer.wait().await;
        assert!(start.elapsed() < Duration::from_millis(150));
    }

    #[tokio::test]
    async fn test_enforces_delay_between_calls() {
        let mut pacer = Pacer::new(Duration::from_millis(100));
        let start = Instant::now();
        pacer.wait().await;
        pacer.wait().await;
        pacer.wait().await;
        assert!(
            start.elapsed() >= Duration::from_millis(200),
            "three calls should span two delays, elapsed: {:?}",
            start.elapsed()
        );
    }

    #[tokio::test]
    async fn test_zero_delay() {
        let mut pacer = Pacer::new(Duration::ZERO);
        let start = Instant::now();
        for _ in 0..10 {
            pacer.wait().await;
        }
        assert!(start.elapsed() < Duration::from_millis(100));
    }
}

use std::time::Duration;

use tokio::time::Instant;

/// A single cancelable delayed tick.
///
/// Scheduling replaces any earlier deadline, so at most one tick is ever
/// pending.
#[derive(Debug, Default)]
pub(crate) struct DelayedTick {
    deadline: Option<Instant>,
}

impl DelayedTick {
    pub fn schedule(&mut self, delay: Duration) {
        self.deadline = Some(Instant::now() + delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Resolves at the deadline; never resolves while nothing is scheduled.
    pub async fn wait(&self) {
        match self.deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending::<()>().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_wait_resolves_at_deadline() {
        let mut timer = DelayedTick::default();
        timer.schedule(Duration::from_millis(500));
        let started = Instant::now();

        timer.wait().await;

        assert!(started.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_timer_never_fires() {
        let mut timer = DelayedTick::default();
        timer.schedule(Duration::from_millis(10));
        timer.cancel();
        assert!(!timer.is_pending());

        let fired = tokio::time::timeout(Duration::from_secs(5), timer.wait()).await;
        assert!(fired.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_replaces_deadline() {
        let mut timer = DelayedTick::default();
        timer.schedule(Duration::from_secs(10));
        timer.schedule(Duration::from_millis(100));
        let started = Instant::now();

        timer.wait().await;

        assert!(started.elapsed() < Duration::from_secs(1));
    }
}

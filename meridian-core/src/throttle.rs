//! Rate limiting for repeated diagnostics.
//!
//! Hot paths such as the traffic gate can fail thousands of times a second with the
//! same message. A [`LogThrottle`] lets the first failure through and then stays quiet
//! until the wait window has elapsed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::clock::{Clock, SystemClock};

/// Lock-free gate that runs a diagnostic at most once per wait window.
pub struct LogThrottle {
    wait_ms: u64,
    disabled: bool,
    /// Epoch millis of the last diagnostic that was let through.
    last_logged: AtomicU64,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for LogThrottle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogThrottle")
            .field("wait_ms", &self.wait_ms)
            .field("disabled", &self.disabled)
            .field("last_logged", &self.last_logged.load(Ordering::Relaxed))
            .finish()
    }
}

impl LogThrottle {
    /// Create a throttle over the system clock.
    ///
    /// When `disabled` is set every diagnostic runs.
    pub fn new(wait: Duration, disabled: bool) -> Self {
        Self::with_clock(wait, disabled, Arc::new(SystemClock))
    }

    /// Create a throttle over an explicit clock.
    pub fn with_clock(wait: Duration, disabled: bool, clock: Arc<dyn Clock>) -> Self {
        Self {
            wait_ms: wait.as_millis() as u64,
            disabled,
            last_logged: AtomicU64::new(0),
            clock,
        }
    }

    /// Run `f` if the window has elapsed. Returns whether it ran.
    pub fn run<F: FnOnce()>(&self, f: F) -> bool {
        if self.disabled {
            f();
            return true;
        }

        let now = self.clock.now_millis();
        let mut last = self.last_logged.load(Ordering::Acquire);

        loop {
            if last != 0 && now <= last.saturating_add(self.wait_ms) {
                return false;
            }
            match self.last_logged.compare_exchange_weak(
                last,
                now.max(1),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                // Someone else logged in the meantime; re-check against their stamp.
                Err(updated) => last = updated,
            }
        }

        f();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    #[test]
    fn first_call_runs_then_waits_for_window() {
        let clock = ManualClock::new(10_000);
        let throttle =
            LogThrottle::with_clock(Duration::from_millis(100), false, Arc::new(clock.clone()));

        assert!(throttle.run(|| {}));
        assert!(!throttle.run(|| {}));

        clock.advance(Duration::from_millis(100));
        assert!(!throttle.run(|| {}));

        clock.advance(Duration::from_millis(1));
        assert!(throttle.run(|| {}));
    }

    #[test]
    fn disabled_throttle_always_runs() {
        let clock = ManualClock::new(10_000);
        let throttle =
            LogThrottle::with_clock(Duration::from_secs(60), true, Arc::new(clock));
        let mut runs = 0;
        for _ in 0..5 {
            throttle.run(|| runs += 1);
        }
        assert_eq!(runs, 5);
    }
}

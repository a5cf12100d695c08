//! Login-attempt lockout.
//!
//! Keeps a per-principal failure counter in process-local memory.  Once
//! the counter reaches the configured threshold the principal is blocked
//! until the lockout window elapses, after which the state is discarded
//! and counting restarts from zero.  State is lost on restart; this is a
//! throttling aid, not a durable security boundary.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Per-principal failure state.
struct FailedLogin {
    attempts: u32,
    last_attempt: Instant,
}

/// In-memory failure counter with time-boxed lockout.
pub struct LoginAttemptLimiter {
    max_attempts: u32,
    lockout_window: Duration,
    attempts: Mutex<HashMap<String, FailedLogin>>,
}

impl LoginAttemptLimiter {
    pub fn new(max_attempts: u32, lockout_window: Duration) -> Self {
        Self {
            max_attempts,
            lockout_window,
            attempts: Mutex::new(HashMap::new()),
        }
    }

    /// Record one failed attempt for `principal`.
    pub fn record_failure(&self, principal: &str) {
        let mut attempts = match self.attempts.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let failed = attempts
            .entry(principal.to_string())
            .or_insert(FailedLogin {
                attempts: 0,
                last_attempt: Instant::now(),
            });
        failed.attempts += 1;
        failed.last_attempt = Instant::now();

        if failed.attempts == self.max_attempts {
            tracing::warn!(principal, "login lockout engaged");
        }
    }

    /// Clear all failure state for `principal`.
    pub fn record_success(&self, principal: &str) {
        let mut attempts = match self.attempts.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        attempts.remove(principal);
    }

    /// Whether `principal` is currently locked out.
    ///
    /// An expired lockout discards the state and reports unblocked.
    pub fn is_blocked(&self, principal: &str) -> bool {
        let mut attempts = match self.attempts.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let Some(failed) = attempts.get(principal) else {
            return false;
        };

        if failed.attempts < self.max_attempts {
            return false;
        }

        if failed.last_attempt.elapsed() < self.lockout_window {
            true
        } else {
            attempts.remove(principal);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_threshold_is_not_blocked() {
        let limiter = LoginAttemptLimiter::new(3, Duration::from_secs(60));
        limiter.record_failure("alice");
        limiter.record_failure("alice");
        assert!(!limiter.is_blocked("alice"));
    }

    #[test]
    fn reaching_threshold_blocks() {
        let limiter = LoginAttemptLimiter::new(3, Duration::from_secs(60));
        for _ in 0..3 {
            limiter.record_failure("alice");
        }
        assert!(limiter.is_blocked("alice"));
        // Other principals are unaffected.
        assert!(!limiter.is_blocked("bob"));
    }

    #[test]
    fn success_clears_state() {
        let limiter = LoginAttemptLimiter::new(2, Duration::from_secs(60));
        limiter.record_failure("alice");
        limiter.record_failure("alice");
        assert!(limiter.is_blocked("alice"));

        limiter.record_success("alice");
        assert!(!limiter.is_blocked("alice"));
    }

    #[test]
    fn lockout_expires_after_window() {
        let limiter = LoginAttemptLimiter::new(1, Duration::from_millis(20));
        limiter.record_failure("alice");
        assert!(limiter.is_blocked("alice"));

        std::thread::sleep(Duration::from_millis(40));
        assert!(!limiter.is_blocked("alice"));
        // State was discarded; counting restarts from zero.
        limiter.record_failure("alice");
        assert!(limiter.is_blocked("alice"));
    }

    #[test]
    fn concurrent_failures_are_not_lost() {
        use std::sync::Arc;

        let limiter = Arc::new(LoginAttemptLimiter::new(8, Duration::from_secs(60)));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let limiter = Arc::clone(&limiter);
            handles.push(std::thread::spawn(move || limiter.record_failure("alice")));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(limiter.is_blocked("alice"));
    }
}

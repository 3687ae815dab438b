//! Duplicate-submission guard.
//!
//! Suppresses resubmissions from the same submitter (name + phone) within a
//! short window. State lives in process memory; entries older than the window
//! are evicted opportunistically once the map grows past a threshold, so the
//! map stays bounded in a long-running process.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

/// Evict expired entries once the map holds this many keys.
const CLEANUP_THRESHOLD: usize = 1024;

/// Outcome of a guard check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Accepted,
    Duplicate,
}

/// Per-submitter short-window duplicate suppression.
pub struct SubmissionGuard {
    entries: Mutex<HashMap<String, Instant>>,
    window: Duration,
}

impl SubmissionGuard {
    pub fn new(window: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            window,
        }
    }

    /// Composite key for a submitter. Case and surrounding whitespace are
    /// ignored so trivial edits do not bypass the window.
    pub fn submitter_key(name: &str, phone: &str) -> String {
        format!(
            "{}|{}",
            name.trim().to_lowercase(),
            phone.trim().to_lowercase()
        )
    }

    /// Returns `Duplicate` if an accepted check for `key` is younger than the
    /// window; otherwise records now and returns `Accepted`. State mutates
    /// only on the accepted path.
    pub async fn check(&self, key: &str) -> GuardDecision {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;

        if let Some(last) = entries.get(key) {
            if now.duration_since(*last) < self.window {
                return GuardDecision::Duplicate;
            }
        }

        if entries.len() >= CLEANUP_THRESHOLD {
            let window = self.window;
            let before = entries.len();
            entries.retain(|_, last| now.duration_since(*last) < window);
            tracing::debug!(
                evicted = before - entries.len(),
                remaining = entries.len(),
                "Evicted expired guard entries"
            );
        }

        entries.insert(key.to_string(), now);
        GuardDecision::Accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_check_is_accepted() {
        let guard = SubmissionGuard::new(Duration::from_secs(30));
        let key = SubmissionGuard::submitter_key("Asha Rao", "9876543210");
        assert_eq!(guard.check(&key).await, GuardDecision::Accepted);
    }

    #[tokio::test]
    async fn second_check_within_window_is_duplicate() {
        let guard = SubmissionGuard::new(Duration::from_secs(30));
        let key = SubmissionGuard::submitter_key("Asha Rao", "9876543210");
        guard.check(&key).await;
        assert_eq!(guard.check(&key).await, GuardDecision::Duplicate);
    }

    #[tokio::test]
    async fn check_after_window_is_accepted_again() {
        let guard = SubmissionGuard::new(Duration::from_millis(20));
        let key = SubmissionGuard::submitter_key("Asha Rao", "9876543210");
        guard.check(&key).await;
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(guard.check(&key).await, GuardDecision::Accepted);
    }

    #[tokio::test]
    async fn different_keys_do_not_suppress_each_other() {
        let guard = SubmissionGuard::new(Duration::from_secs(30));
        let a = SubmissionGuard::submitter_key("Asha Rao", "9876543210");
        let b = SubmissionGuard::submitter_key("Vikram Singh", "9123456780");
        guard.check(&a).await;
        assert_eq!(guard.check(&b).await, GuardDecision::Accepted);
    }

    #[tokio::test]
    async fn duplicate_does_not_extend_the_window() {
        let guard = SubmissionGuard::new(Duration::from_millis(50));
        let key = SubmissionGuard::submitter_key("Asha Rao", "9876543210");
        guard.check(&key).await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        // Still inside the window; must not refresh the timestamp.
        assert_eq!(guard.check(&key).await, GuardDecision::Duplicate);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(guard.check(&key).await, GuardDecision::Accepted);
    }

    #[tokio::test]
    async fn key_normalization_ignores_case_and_whitespace() {
        assert_eq!(
            SubmissionGuard::submitter_key(" Asha Rao ", "98765 "),
            SubmissionGuard::submitter_key("asha rao", "98765")
        );
    }
}

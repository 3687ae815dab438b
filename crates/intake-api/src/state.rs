//! Application state.
//!
//! All service clients are constructed before the listener binds and injected
//! here, so request handlers never touch lazily-initialized globals.

use std::sync::Arc;

use intake_core::Config;
use intake_services::{FileStore, Mailer, RowWriter};

use crate::guard::SubmissionGuard;

/// Shared state for all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub file_store: Arc<dyn FileStore>,
    pub row_writer: Arc<dyn RowWriter>,
    pub mailer: Arc<dyn Mailer>,
    pub guard: Arc<SubmissionGuard>,
}

impl AppState {
    pub fn new(
        config: Config,
        file_store: Arc<dyn FileStore>,
        row_writer: Arc<dyn RowWriter>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let guard = Arc::new(SubmissionGuard::new(std::time::Duration::from_secs(
            config.resubmit_window_secs,
        )));
        Self {
            config,
            file_store,
            row_writer,
            mailer,
            guard,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_state_is_shareable_across_request_tasks() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AppState>();
    }
}

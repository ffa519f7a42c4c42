// crates/server/src/state.rs
//! Application state for the Axum server.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use mealweek_core::llm::KeyRotationExecutor;
use mealweek_db::Database;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    /// Server start time for uptime tracking.
    pub start_time: Instant,
    /// Database handle: plans, recipes, and the job store.
    pub db: Database,
    /// Generation executor with credential rotation.
    pub executor: Arc<KeyRotationExecutor>,
    /// Directory where shared plan documents are written and served from.
    pub share_dir: PathBuf,
}

impl AppState {
    /// Create a new application state wrapped in an Arc for sharing.
    pub fn new(db: Database, executor: Arc<KeyRotationExecutor>, share_dir: PathBuf) -> Arc<Self> {
        Arc::new(Self {
            start_time: Instant::now(),
            db,
            executor,
            share_dir,
        })
    }

    /// Get the server uptime in seconds.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_state_with_provider;

    #[tokio::test]
    async fn test_app_state_new() {
        let (state, _tmp) = test_state_with_provider(serde_json::json!({})).await;
        assert!(state.uptime_secs() < 5);
    }
}

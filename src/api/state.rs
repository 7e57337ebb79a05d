//! Application state for the API server

use crate::{Config, Downloader, StatusLog};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request (cheap Arc clones). Nothing in here is mutated
/// after startup.
#[derive(Clone)]
pub struct AppState {
    /// Download orchestrator
    pub downloader: Downloader,

    /// Optional status store
    pub status_log: Arc<StatusLog>,

    /// Configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(downloader: Downloader, status_log: Arc<StatusLog>, config: Arc<Config>) -> Self {
        Self {
            downloader,
            status_log,
            config,
        }
    }
}

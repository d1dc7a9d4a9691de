//! API state management for the REST server.

use std::sync::Arc;

use crate::config::Config;
use crate::coordinator::SessionCoordinator;
use crate::store::{FileGuideStore, FileSessionStore, GuideContentProvider, SessionStore};

/// Shared state for the REST API
#[derive(Clone)]
pub struct ApiState {
    pub coordinator: Arc<SessionCoordinator>,
}

impl ApiState {
    pub fn new(coordinator: SessionCoordinator) -> Self {
        Self {
            coordinator: Arc::new(coordinator),
        }
    }

    /// File-backed stores under the configured guides and state directories
    pub fn from_config(config: &Config) -> Self {
        let guides: Arc<dyn GuideContentProvider> =
            Arc::new(FileGuideStore::new(config.guides_path()));
        let sessions: Arc<dyn SessionStore> =
            Arc::new(FileSessionStore::new(config.sessions_path()));
        Self::new(SessionCoordinator::new(
            guides,
            sessions,
            config.engine.collaborator_timeout(),
        ))
    }
}

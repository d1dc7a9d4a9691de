//! In-memory collaborators.
//!
//! Used by tests and for embedding the engine without persistence. Each store
//! carries an availability switch that makes every call fail the way an
//! unreachable backend would.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::error::GuideError;
use crate::steps::{AdaptationRecord, AdaptationRequest, Section, SessionPosition, Step};
use crate::store::{Guide, GuideContentProvider, SessionStore};

/// Guides held in a map behind one lock
#[derive(Clone, Default)]
pub struct MemoryGuideStore {
    guides: Arc<RwLock<HashMap<String, Guide>>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryGuideStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_guides(guides: impl IntoIterator<Item = Guide>) -> Self {
        let store = Self::new();
        for guide in guides {
            store.insert(guide);
        }
        store
    }

    pub fn insert(&self, guide: Guide) {
        if let Ok(mut guides) = self.guides.write() {
            guides.insert(guide.guide_id.clone(), guide);
        }
    }

    pub fn remove(&self, guide_id: &str) -> Option<Guide> {
        self.guides.write().ok()?.remove(guide_id)
    }

    pub fn get(&self, guide_id: &str) -> Option<Guide> {
        self.guides.read().ok()?.get(guide_id).cloned()
    }

    /// Simulate the backend going away (or coming back)
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    fn with_guide<T>(
        &self,
        guide_id: &str,
        f: impl FnOnce(&Guide) -> T,
    ) -> Result<T, GuideError> {
        self.check_available(guide_id)?;
        let guides = self
            .guides
            .read()
            .map_err(|_| GuideError::StorageUnavailable("guide store lock poisoned".into()))?;
        guides
            .get(guide_id)
            .map(f)
            .ok_or_else(|| GuideError::guide_missing(guide_id))
    }

    fn check_available(&self, guide_id: &str) -> Result<(), GuideError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(GuideError::guide_unavailable(
                guide_id,
                "content backend is unreachable",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl GuideContentProvider for MemoryGuideStore {
    async fn load_steps(&self, guide_id: &str) -> Result<Vec<Step>, GuideError> {
        self.with_guide(guide_id, |g| g.steps.clone())
    }

    async fn load_sections(&self, guide_id: &str) -> Result<Vec<Section>, GuideError> {
        self.with_guide(guide_id, |g| g.sections.clone())
    }

    async fn commit_adaptation(
        &self,
        guide_id: &str,
        request: &AdaptationRequest,
    ) -> Result<AdaptationRecord, GuideError> {
        self.check_available(guide_id)?;
        let mut guides = self
            .guides
            .write()
            .map_err(|_| GuideError::StorageUnavailable("guide store lock poisoned".into()))?;
        let guide = guides
            .get_mut(guide_id)
            .ok_or_else(|| GuideError::guide_missing(guide_id))?;
        guide.apply(request)
    }
}

/// Session positions held in a map
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    positions: Arc<RwLock<HashMap<String, SessionPosition>>>,
    unavailable: Arc<AtomicBool>,
    saves: Arc<AtomicUsize>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Number of successful saves, for asserting that no-ops are not written
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn get(&self, session_id: &str) -> Option<SessionPosition> {
        self.positions.read().ok()?.get(session_id).cloned()
    }

    fn check_available(&self, session_id: &str) -> Result<(), GuideError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(GuideError::session_unavailable(
                session_id,
                "session backend is unreachable",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load_position(&self, session_id: &str) -> Result<SessionPosition, GuideError> {
        self.check_available(session_id)?;
        let positions = self
            .positions
            .read()
            .map_err(|_| GuideError::session_unavailable(session_id, "lock poisoned"))?;
        positions
            .get(session_id)
            .cloned()
            .ok_or_else(|| GuideError::SessionNotFound(session_id.to_string()))
    }

    async fn save_position(
        &self,
        session_id: &str,
        position: &SessionPosition,
    ) -> Result<(), GuideError> {
        self.check_available(session_id)?;
        let mut positions = self
            .positions
            .write()
            .map_err(|_| GuideError::session_unavailable(session_id, "lock poisoned"))?;
        positions.insert(session_id.to_string(), position.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::{StepCollection, StepStatus};
    use crate::store::fixtures::{id, sample_guide};

    #[tokio::test]
    async fn test_load_steps_and_sections() {
        let store = MemoryGuideStore::with_guides([sample_guide("g1")]);
        assert_eq!(store.load_steps("g1").await.unwrap().len(), 3);
        assert_eq!(store.load_sections("g1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_guide_is_unavailable() {
        let store = MemoryGuideStore::new();
        let err = store.load_steps("nope").await.unwrap_err();
        assert!(matches!(err, GuideError::GuideUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_outage_switch() {
        let store = MemoryGuideStore::with_guides([sample_guide("g1")]);
        store.set_available(false);
        assert!(store.load_steps("g1").await.is_err());
        store.set_available(true);
        assert!(store.load_steps("g1").await.is_ok());
    }

    #[tokio::test]
    async fn test_commit_adaptation_is_all_or_nothing() {
        let store = MemoryGuideStore::with_guides([sample_guide("g1")]);
        let mut alt = Step::active(id("1a"), "setup", "Log in with a token");
        alt.status = StepStatus::Alternative;
        alt.replaces = Some(id("1"));
        let request = AdaptationRequest {
            blocked: id("1"),
            reason: None,
            alternatives: vec![alt],
        };

        store.commit_adaptation("g1", &request).await.unwrap();
        let after_first = store.get("g1").unwrap();

        // second attempt on the same step is rejected and changes nothing
        let err = store.commit_adaptation("g1", &request).await.unwrap_err();
        assert!(matches!(err, GuideError::AdaptationPreconditionViolation(_)));
        assert_eq!(store.get("g1").unwrap(), after_first);

        let collection = StepCollection::build(after_first.steps).unwrap();
        assert_eq!(collection.get(&id("1")).unwrap().status, StepStatus::Blocked);
        assert_eq!(
            collection.resolve_alternative(&id("1")).unwrap().identifier,
            id("1a")
        );
    }

    #[tokio::test]
    async fn test_session_store_round_trip() {
        let guides = sample_guide("g1");
        let collection = StepCollection::build(guides.steps).unwrap();
        let store = MemorySessionStore::new();
        let position = SessionPosition::start("g1", &collection);

        let err = store.load_position("s1").await.unwrap_err();
        assert_eq!(err, GuideError::SessionNotFound("s1".to_string()));

        store.save_position("s1", &position).await.unwrap();
        assert_eq!(store.load_position("s1").await.unwrap(), position);
        assert_eq!(store.save_count(), 1);

        store.set_available(false);
        let err = store.save_position("s1", &position).await.unwrap_err();
        assert!(matches!(err, GuideError::SessionUnavailable { .. }));
    }
}

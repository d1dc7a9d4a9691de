//! File-backed collaborators: one JSON document per guide or session.
//!
//! Writes go to a temporary sibling first and are renamed into place, so a
//! reader sees either the old document or the new one, never a torn write.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::GuideError;
use crate::steps::{AdaptationRecord, AdaptationRequest, Section, SessionPosition, Step};
use crate::store::{Guide, GuideContentProvider, SessionStore};

/// Guides stored as `<dir>/<guide_id>.json`
pub struct FileGuideStore {
    dir: PathBuf,
    /// Serializes adaptation commits within this process
    write_lock: Mutex<()>,
}

impl FileGuideStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Write a guide document, replacing any existing one
    pub async fn put(&self, guide: &Guide) -> Result<(), GuideError> {
        let path = document_path(&self.dir, &guide.guide_id)
            .ok_or_else(|| GuideError::guide_unavailable(&guide.guide_id, "invalid guide id"))?;
        write_atomic(&path, guide)
            .await
            .map_err(|e| GuideError::StorageUnavailable(e.to_string()))
    }

    async fn load(&self, guide_id: &str) -> Result<Guide, GuideError> {
        let path = document_path(&self.dir, guide_id)
            .ok_or_else(|| GuideError::guide_unavailable(guide_id, "invalid guide id"))?;
        match read_document::<Guide>(&path).await {
            Ok(Some(guide)) => Ok(guide),
            Ok(None) => Err(GuideError::guide_missing(guide_id)),
            Err(e) => Err(GuideError::guide_unavailable(guide_id, e)),
        }
    }
}

#[async_trait]
impl GuideContentProvider for FileGuideStore {
    async fn load_steps(&self, guide_id: &str) -> Result<Vec<Step>, GuideError> {
        Ok(self.load(guide_id).await?.steps)
    }

    async fn load_sections(&self, guide_id: &str) -> Result<Vec<Section>, GuideError> {
        Ok(self.load(guide_id).await?.sections)
    }

    async fn commit_adaptation(
        &self,
        guide_id: &str,
        request: &AdaptationRequest,
    ) -> Result<AdaptationRecord, GuideError> {
        let _guard = self.write_lock.lock().await;
        let mut guide = self.load(guide_id).await?;
        let record = guide.apply(request)?;
        self.put(&guide).await?;
        Ok(record)
    }
}

/// Session positions stored as `<dir>/<session_id>.json`
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load_position(&self, session_id: &str) -> Result<SessionPosition, GuideError> {
        let path = document_path(&self.dir, session_id)
            .ok_or_else(|| GuideError::SessionNotFound(session_id.to_string()))?;
        match read_document::<SessionPosition>(&path).await {
            Ok(Some(position)) => Ok(position),
            Ok(None) => Err(GuideError::SessionNotFound(session_id.to_string())),
            Err(e) => Err(GuideError::session_unavailable(session_id, e)),
        }
    }

    async fn save_position(
        &self,
        session_id: &str,
        position: &SessionPosition,
    ) -> Result<(), GuideError> {
        let path = document_path(&self.dir, session_id)
            .ok_or_else(|| GuideError::session_unavailable(session_id, "invalid session id"))?;
        write_atomic(&path, position)
            .await
            .map_err(|e| GuideError::session_unavailable(session_id, e.to_string()))
    }
}

/// Path for a record id; `None` for ids that are not plain file names
fn document_path(dir: &Path, id: &str) -> Option<PathBuf> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    valid.then(|| dir.join(format!("{id}.json")))
}

async fn read_document<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, String> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(format!("failed to read {}: {e}", path.display())),
    };
    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|e| format!("failed to parse {}: {e}", path.display()))
}

async fn write_atomic<T: Serialize>(path: &Path, value: &T) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let contents = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension(format!("json.tmp-{}", Uuid::new_v4()));
    tokio::fs::write(&tmp, contents).await?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e);
    }
    Ok(())
}

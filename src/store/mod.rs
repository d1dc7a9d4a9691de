//! Storage collaborators consumed by the session coordinator.
//!
//! Two seams: a [`GuideContentProvider`] serving guide steps and sections and
//! applying adaptations atomically, and a [`SessionStore`] persisting one
//! [`SessionPosition`] per session. In-memory and file-backed
//! implementations are provided.

mod file;
mod memory;

pub use file::{FileGuideStore, FileSessionStore};
pub use memory::{MemoryGuideStore, MemorySessionStore};

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GuideError;
use crate::steps::{
    apply_adaptation, AdaptationRecord, AdaptationRequest, Section, SessionPosition, Step,
    StepCollection,
};

/// Stored guide record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guide {
    pub guide_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sections: Vec<Section>,
    pub steps: Vec<Step>,
    #[serde(default)]
    pub adaptation_history: Vec<AdaptationRecord>,
}

impl Guide {
    /// Build the ordered step collection, surfacing duplicate or
    /// inconsistent steps
    pub fn collection(&self) -> Result<StepCollection, GuideError> {
        StepCollection::build(self.steps.clone())
    }

    /// Section ids referenced by steps but missing from `sections`
    pub fn undeclared_sections(&self) -> BTreeSet<&str> {
        self.steps
            .iter()
            .map(|s| s.section_id.as_str())
            .filter(|id| !self.sections.iter().any(|sec| sec.section_id == *id))
            .collect()
    }

    /// Apply an adaptation to this record in place, or leave it untouched on
    /// failure. Stores call this inside their transaction boundary.
    pub fn apply(&mut self, request: &AdaptationRequest) -> Result<AdaptationRecord, GuideError> {
        let collection = self.collection()?;
        let updated = apply_adaptation(&collection, request)?;
        let record = AdaptationRecord::from_request(request);

        self.steps = updated.into_steps();
        self.adaptation_history.push(record.clone());
        Ok(record)
    }
}

/// Source of guide content
#[async_trait]
pub trait GuideContentProvider: Send + Sync {
    /// All steps of a guide. Fails with `GuideUnavailable` if the guide does
    /// not exist or cannot be read.
    async fn load_steps(&self, guide_id: &str) -> Result<Vec<Step>, GuideError>;

    /// Sections of a guide, for overview rendering
    async fn load_sections(&self, guide_id: &str) -> Result<Vec<Section>, GuideError>;

    /// Block a step and insert its alternatives as one atomic update.
    ///
    /// Implementations validate the request against their current record
    /// inside the same critical section that writes it, so concurrent
    /// adaptations of one step cannot both succeed and readers never see the
    /// blocked flag without the alternatives (or the reverse).
    async fn commit_adaptation(
        &self,
        guide_id: &str,
        request: &AdaptationRequest,
    ) -> Result<AdaptationRecord, GuideError>;
}

/// Persistence for session positions
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fails with `SessionNotFound` for unknown sessions and
    /// `SessionUnavailable` on storage errors.
    async fn load_position(&self, session_id: &str) -> Result<SessionPosition, GuideError>;

    /// Replace the stored position atomically
    async fn save_position(
        &self,
        session_id: &str,
        position: &SessionPosition,
    ) -> Result<(), GuideError>;
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::steps::StepIdentifier;

    pub fn id(text: &str) -> StepIdentifier {
        StepIdentifier::parse(text).unwrap()
    }

    /// Guide with steps "0", "1", "2" spread over two sections
    pub fn sample_guide(guide_id: &str) -> Guide {
        Guide {
            guide_id: guide_id.to_string(),
            title: "Deploy a static site".to_string(),
            description: "From empty repository to live URL".to_string(),
            sections: vec![
                Section {
                    section_id: "setup".to_string(),
                    title: "Setup".to_string(),
                    description: String::new(),
                    order: 0,
                },
                Section {
                    section_id: "deploy".to_string(),
                    title: "Deploy".to_string(),
                    description: String::new(),
                    order: 1,
                },
            ],
            steps: vec![
                Step::active(id("0"), "setup", "Install the CLI"),
                Step::active(id("1"), "setup", "Log in"),
                Step::active(id("2"), "deploy", "Publish"),
            ],
            adaptation_history: Vec::new(),
        }
    }
}

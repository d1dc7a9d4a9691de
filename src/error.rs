//! Error taxonomy shared by the engine, its collaborators and the REST layer.

use thiserror::Error;

use crate::steps::StepIdentifier;

/// Reason carried by `GuideUnavailable` when the guide has no record at all
const MISSING_GUIDE: &str = "guide does not exist";

/// Errors produced by the disclosure engine and its storage collaborators
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuideError {
    #[error("malformed step identifier '{text}': {reason}")]
    MalformedIdentifier { text: String, reason: String },

    #[error("duplicate step identifier '{0}'")]
    DuplicateIdentifier(StepIdentifier),

    #[error("step '{identifier}' is inconsistent: {reason}")]
    InconsistentStep {
        identifier: StepIdentifier,
        reason: String,
    },

    #[error("section '{0}' not found or has no reachable steps")]
    SectionNotFound(String),

    #[error("guide '{guide_id}' is unavailable: {reason}")]
    GuideUnavailable { guide_id: String, reason: String },

    #[error("session '{0}' not found")]
    SessionNotFound(String),

    #[error("session '{session_id}' is unavailable: {reason}")]
    SessionUnavailable { session_id: String, reason: String },

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("adaptation rejected: {0}")]
    AdaptationPreconditionViolation(String),
}

impl GuideError {
    pub fn malformed(text: impl Into<String>, reason: impl Into<String>) -> Self {
        GuideError::MalformedIdentifier {
            text: text.into(),
            reason: reason.into(),
        }
    }

    pub fn guide_unavailable(guide_id: impl Into<String>, reason: impl Into<String>) -> Self {
        GuideError::GuideUnavailable {
            guide_id: guide_id.into(),
            reason: reason.into(),
        }
    }

    /// The guide has no record in the content backend
    pub fn guide_missing(guide_id: impl Into<String>) -> Self {
        Self::guide_unavailable(guide_id, MISSING_GUIDE)
    }

    pub fn is_missing_guide(&self) -> bool {
        matches!(self, GuideError::GuideUnavailable { reason, .. } if reason == MISSING_GUIDE)
    }

    pub fn session_unavailable(session_id: impl Into<String>, reason: impl Into<String>) -> Self {
        GuideError::SessionUnavailable {
            session_id: session_id.into(),
            reason: reason.into(),
        }
    }

    /// Errors reported by a collaborator rather than caused by the caller's input
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(
            self,
            GuideError::GuideUnavailable { .. }
                | GuideError::SessionUnavailable { .. }
                | GuideError::StorageUnavailable(_)
        )
    }
}

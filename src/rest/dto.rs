//! Data Transfer Objects for the REST API.
//!
//! Identifiers travel as their canonical text form ("2a"); they are parsed
//! at the handler boundary so malformed input never reaches the engine.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::coordinator::{
    AlternativeDraft, DisclosedStep, Disclosure, OverviewStep, SectionOverview, SectionProgress,
    SessionView, TransitionView,
};
use crate::error::GuideError;
use crate::steps::{AdaptationRecord, Progress, Section, StepIdentifier};

// =============================================================================
// Health DTOs
// =============================================================================

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// =============================================================================
// Session DTOs
// =============================================================================

/// Request to start a session on a guide
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StartSessionRequest {
    pub guide_id: String,
}

/// Request to complete the current step
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct AdvanceRequest {
    /// Step the caller believes is current; the advance is a no-op if
    /// another request already moved past it
    #[serde(default)]
    pub expected_step: Option<String>,
}

/// Request to jump to a section
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct JumpRequest {
    pub section_id: String,
}

/// Guide-level progress
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProgressResponse {
    pub total_steps: usize,
    pub completed_steps: usize,
    pub completion_percentage: f64,
    pub estimated_minutes_remaining: u32,
}

impl From<&Progress> for ProgressResponse {
    fn from(p: &Progress) -> Self {
        Self {
            total_steps: p.total_steps,
            completed_steps: p.completed_steps,
            completion_percentage: p.completion_percentage,
            estimated_minutes_remaining: p.estimated_minutes_remaining,
        }
    }
}

/// Progress within one section
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SectionProgressResponse {
    pub total_steps: usize,
    pub completed_steps: usize,
    pub completion_percentage: f64,
}

impl From<&SectionProgress> for SectionProgressResponse {
    fn from(p: &SectionProgress) -> Self {
        Self {
            total_steps: p.total_steps,
            completed_steps: p.completed_steps,
            completion_percentage: p.completion_percentage,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SectionSummary {
    pub section_id: String,
    pub title: String,
    pub description: String,
}

impl From<&Section> for SectionSummary {
    fn from(s: &Section) -> Self {
        Self {
            section_id: s.section_id.clone(),
            title: s.title.clone(),
            description: s.description.clone(),
        }
    }
}

/// The single step disclosed to the user
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CurrentStepResponse {
    pub identifier: String,
    pub title: String,
    pub description: String,
    pub completion_criteria: String,
    pub assistance_hints: Vec<String>,
    pub estimated_minutes: u32,
    /// active or alternative
    pub status: String,
    /// Blocked step this alternative stands in for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replaces: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<SectionSummary>,
    pub section_progress: SectionProgressResponse,
    /// Stored step that was blocked after the user reached it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rerouted_from: Option<String>,
    pub can_go_back: bool,
    pub is_last_in_section: bool,
}

impl From<&DisclosedStep> for CurrentStepResponse {
    fn from(d: &DisclosedStep) -> Self {
        let step = &d.step;
        Self {
            identifier: step.identifier.format(),
            title: step.title.clone(),
            description: step.description.clone(),
            completion_criteria: step.completion_criteria.clone(),
            assistance_hints: step.assistance_hints.clone(),
            estimated_minutes: step.estimated_minutes,
            status: step.status.as_str().to_string(),
            replaces: step.replaces.as_ref().map(StepIdentifier::format),
            section: d.section.as_ref().map(SectionSummary::from),
            section_progress: SectionProgressResponse::from(&d.section_progress),
            rerouted_from: d.rerouted_from.as_ref().map(StepIdentifier::format),
            can_go_back: d.can_go_back,
            is_last_in_section: d.is_last_in_section,
        }
    }
}

/// What a session currently discloses
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub session_id: String,
    pub guide_id: String,
    /// True once every reachable step has been completed
    pub completed: bool,
    /// Absent when the session is completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_step: Option<CurrentStepResponse>,
    pub progress: ProgressResponse,
    pub revision: u64,
}

impl From<&SessionView> for SessionResponse {
    fn from(v: &SessionView) -> Self {
        let current_step = match &v.disclosure {
            Disclosure::Step(disclosed) => Some(CurrentStepResponse::from(disclosed.as_ref())),
            Disclosure::Completed => None,
        };
        Self {
            session_id: v.session_id.clone(),
            guide_id: v.guide_id.clone(),
            completed: v.is_completed(),
            current_step,
            progress: ProgressResponse::from(&v.progress),
            revision: v.revision,
        }
    }
}

/// Result of advance, retreat or jump
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TransitionResponse {
    /// False when the request was a no-op
    pub applied: bool,
    pub session: SessionResponse,
}

impl From<&TransitionView> for TransitionResponse {
    fn from(t: &TransitionView) -> Self {
        Self {
            applied: t.applied,
            session: SessionResponse::from(&t.view),
        }
    }
}

/// Step entry in a section overview (titles only)
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OverviewStepResponse {
    pub identifier: String,
    pub title: String,
    pub estimated_minutes: u32,
    pub completed: bool,
    pub current: bool,
    pub locked: bool,
    pub blocked: bool,
    pub alternative: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replaces: Option<String>,
}

impl From<&OverviewStep> for OverviewStepResponse {
    fn from(s: &OverviewStep) -> Self {
        use crate::steps::StepStatus;

        Self {
            identifier: s.identifier.format(),
            title: s.title.clone(),
            estimated_minutes: s.estimated_minutes,
            completed: s.completed,
            current: s.current,
            locked: s.locked,
            blocked: s.status == StepStatus::Blocked,
            alternative: s.status == StepStatus::Alternative,
            blocked_reason: s.blocked_reason.clone(),
            replaces: s.replaces.as_ref().map(StepIdentifier::format),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SectionOverviewResponse {
    pub section_id: String,
    pub title: String,
    pub description: String,
    pub total_estimated_minutes: u32,
    pub steps: Vec<OverviewStepResponse>,
}

impl From<&SectionOverview> for SectionOverviewResponse {
    fn from(o: &SectionOverview) -> Self {
        Self {
            section_id: o.section.section_id.clone(),
            title: o.section.title.clone(),
            description: o.section.description.clone(),
            total_estimated_minutes: o.total_estimated_minutes,
            steps: o.steps.iter().map(OverviewStepResponse::from).collect(),
        }
    }
}

// =============================================================================
// Adaptation DTOs
// =============================================================================

/// Alternative step content; the identifier is allocated when omitted
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AlternativeStepRequest {
    #[serde(default)]
    pub identifier: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completion_criteria: String,
    #[serde(default)]
    pub assistance_hints: Vec<String>,
    #[serde(default)]
    pub estimated_minutes: u32,
}

impl AlternativeStepRequest {
    pub fn into_draft(self) -> Result<AlternativeDraft, GuideError> {
        let identifier = self
            .identifier
            .as_deref()
            .map(StepIdentifier::parse)
            .transpose()?;
        Ok(AlternativeDraft {
            identifier,
            title: self.title,
            description: self.description,
            completion_criteria: self.completion_criteria,
            assistance_hints: self.assistance_hints,
            estimated_minutes: self.estimated_minutes,
        })
    }
}

/// Request to block a step and substitute alternatives
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateAdaptationRequest {
    pub blocked_step: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub alternatives: Vec<AlternativeStepRequest>,
}

/// An applied adaptation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdaptationResponse {
    pub guide_id: String,
    pub blocked_step: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub alternatives: Vec<String>,
    /// RFC 3339 timestamp
    pub applied_at: String,
}

impl AdaptationResponse {
    pub fn new(guide_id: &str, record: &AdaptationRecord) -> Self {
        Self {
            guide_id: guide_id.to_string(),
            blocked_step: record.blocked.format(),
            reason: record.reason.clone(),
            alternatives: record
                .alternatives
                .iter()
                .map(StepIdentifier::format)
                .collect(),
            applied_at: record.applied_at.to_rfc3339(),
        }
    }
}

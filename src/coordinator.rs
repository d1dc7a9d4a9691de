//! Session coordinator: the concurrency shell around the disclosure engine.
//!
//! Every mutating call (advance, retreat, jump) holds the session's exclusive
//! lock while it loads the position, rebuilds the guide's step collection
//! from storage, runs the transition and saves the result. Calls on
//! different sessions share nothing and run in parallel. Reads take no lock:
//! they work on whatever position snapshot the store returns.
//!
//! Collaborator calls are bounded by a timeout; a slow or failing backend is
//! reported as unavailable and nothing is written.

use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::GuideError;
use crate::steps::{
    allocate_alternative_identifiers, apply_adaptation, AdaptationRecord, AdaptationRequest,
    Current, DisclosureMachine, DisclosureState, Progress, Section, SessionPosition, Step,
    StepCollection, StepIdentifier, StepStatus, Transition,
};
use crate::store::{GuideContentProvider, SessionStore};

/// Lock map size past which idle entries are pruned
const LOCK_PRUNE_THRESHOLD: usize = 1024;

/// Progress within the current step's section
#[derive(Debug, Clone, PartialEq)]
pub struct SectionProgress {
    pub completed_steps: usize,
    pub total_steps: usize,
    pub completion_percentage: f64,
}

/// The one step disclosed to the user, with navigation hints
#[derive(Debug, Clone, PartialEq)]
pub struct DisclosedStep {
    pub step: Step,
    pub section: Option<Section>,
    pub section_progress: SectionProgress,
    pub rerouted_from: Option<StepIdentifier>,
    pub can_go_back: bool,
    pub is_last_in_section: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Disclosure {
    Step(Box<DisclosedStep>),
    Completed,
}

/// What a session currently discloses
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub session_id: String,
    pub guide_id: String,
    pub disclosure: Disclosure,
    pub progress: Progress,
    pub revision: u64,
}

impl SessionView {
    /// Identifier of the disclosed step, if any
    pub fn current_identifier(&self) -> Option<&StepIdentifier> {
        match &self.disclosure {
            Disclosure::Step(disclosed) => Some(&disclosed.step.identifier),
            Disclosure::Completed => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.disclosure, Disclosure::Completed)
    }
}

/// Result of a mutating call
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionView {
    /// False for defined no-ops (retreat at the first step, advance after
    /// completion, a guarded advance that lost the race)
    pub applied: bool,
    pub view: SessionView,
}

/// Step entry in a section overview; titles only, never descriptions
#[derive(Debug, Clone, PartialEq)]
pub struct OverviewStep {
    pub identifier: StepIdentifier,
    pub title: String,
    pub estimated_minutes: u32,
    pub status: StepStatus,
    pub completed: bool,
    pub current: bool,
    pub locked: bool,
    pub blocked_reason: Option<String>,
    pub replaces: Option<StepIdentifier>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionOverview {
    pub section: Section,
    pub steps: Vec<OverviewStep>,
    pub total_estimated_minutes: u32,
}

/// Content for an alternative step whose identifier may be allocated
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AlternativeDraft {
    pub identifier: Option<StepIdentifier>,
    pub title: String,
    pub description: String,
    pub completion_criteria: String,
    pub assistance_hints: Vec<String>,
    pub estimated_minutes: u32,
}

/// Guide content loaded for one operation
struct GuideSnapshot {
    collection: StepCollection,
    sections: Vec<Section>,
}

impl GuideSnapshot {
    fn section(&self, section_id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.section_id == section_id)
    }
}

/// Maps sessions to their positions and serializes mutation per session
pub struct SessionCoordinator {
    guides: Arc<dyn GuideContentProvider>,
    sessions: Arc<dyn SessionStore>,
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
    timeout: Duration,
}

impl SessionCoordinator {
    pub fn new(
        guides: Arc<dyn GuideContentProvider>,
        sessions: Arc<dyn SessionStore>,
        timeout: Duration,
    ) -> Self {
        Self {
            guides,
            sessions,
            locks: Mutex::new(HashMap::new()),
            timeout,
        }
    }

    /// Start a session at the guide's lowest active step
    pub async fn start_session(&self, guide_id: &str) -> Result<SessionView, GuideError> {
        let snapshot = self.load_snapshot(guide_id).await?;
        let position = SessionPosition::start(guide_id, &snapshot.collection);
        let session_id = Uuid::new_v4().to_string();

        self.save_position(&session_id, &position).await?;
        info!(
            session_id = %session_id,
            guide_id = %guide_id,
            step = ?position.state.step().map(StepIdentifier::format),
            "session_started"
        );

        self.render(&session_id, &snapshot, &position)
    }

    /// Read the disclosed step. Takes no lock.
    pub async fn get_current(&self, session_id: &str) -> Result<SessionView, GuideError> {
        let position = self.load_position(session_id).await?;
        let snapshot = self.load_snapshot(&position.guide_id).await?;
        self.render(session_id, &snapshot, &position)
    }

    /// Progress for a session. Takes no lock.
    pub async fn progress(&self, session_id: &str) -> Result<Progress, GuideError> {
        let position = self.load_position(session_id).await?;
        let snapshot = self.load_snapshot(&position.guide_id).await?;
        DisclosureMachine::new(&snapshot.collection).progress(&position)
    }

    /// Complete the current step and move on. With `expected`, only applies
    /// while that step is still the one disclosed.
    pub async fn advance(
        &self,
        session_id: &str,
        expected: Option<StepIdentifier>,
    ) -> Result<TransitionView, GuideError> {
        self.mutate(session_id, "step_advanced", move |machine, position| {
            machine.advance(position, expected.as_ref())
        })
        .await
    }

    /// Go back one step; a no-op at the first step
    pub async fn retreat(&self, session_id: &str) -> Result<TransitionView, GuideError> {
        self.mutate(session_id, "step_retreated", |machine, position| {
            machine.retreat(position)
        })
        .await
    }

    /// Move to the first reachable step of a section
    pub async fn jump_to_section(
        &self,
        session_id: &str,
        section_id: &str,
    ) -> Result<TransitionView, GuideError> {
        self.mutate(session_id, "section_jumped", |machine, position| {
            machine.jump_to_section(position, section_id)
        })
        .await
    }

    /// Step titles and states for one section. Takes no lock.
    pub async fn section_overview(
        &self,
        session_id: &str,
        section_id: &str,
    ) -> Result<SectionOverview, GuideError> {
        let position = self.load_position(session_id).await?;
        let snapshot = self.load_snapshot(&position.guide_id).await?;
        let collection = &snapshot.collection;
        let machine = DisclosureMachine::new(collection);

        let section = match snapshot.section(section_id) {
            Some(section) => section.clone(),
            None if collection.in_section(section_id).next().is_some() => Section {
                section_id: section_id.to_string(),
                title: section_id.to_string(),
                description: String::new(),
                order: 0,
            },
            None => return Err(GuideError::SectionNotFound(section_id.to_string())),
        };

        let current = machine.effective(&position.state)?;
        let current_id = current.step();

        let steps: Vec<OverviewStep> = collection
            .in_section(section_id)
            .map(|step| {
                let completed = position.completed_identifiers.contains(&step.identifier);
                let is_current = current_id == Some(&step.identifier);
                OverviewStep {
                    identifier: step.identifier.clone(),
                    title: step.title.clone(),
                    estimated_minutes: step.estimated_minutes,
                    status: step.status,
                    completed,
                    current: is_current,
                    locked: !completed && !is_current,
                    blocked_reason: step.blocked_reason.clone(),
                    replaces: step.replaces.clone(),
                }
            })
            .collect();

        let total_estimated_minutes = steps
            .iter()
            .filter(|s| s.status.is_navigable())
            .map(|s| s.estimated_minutes)
            .sum();

        Ok(SectionOverview {
            section,
            steps,
            total_estimated_minutes,
        })
    }

    /// Block a step and insert its alternatives in one atomic storage update.
    ///
    /// Sessions standing on the blocked step are rerouted on their next read
    /// or transition; nothing here touches session positions.
    pub async fn apply_adaptation(
        &self,
        guide_id: &str,
        request: AdaptationRequest,
    ) -> Result<AdaptationRecord, GuideError> {
        // Reject early against a fresh view; the store re-checks under its
        // own transaction before writing.
        let snapshot = self.load_snapshot(guide_id).await?;
        apply_adaptation(&snapshot.collection, &request)?;

        let record = self
            .bounded(self.guides.commit_adaptation(guide_id, &request), || {
                GuideError::StorageUnavailable(format!(
                    "adaptation commit for guide '{guide_id}' timed out"
                ))
            })
            .await
            .inspect_err(|e| {
                if e.is_collaborator_failure() {
                    warn!(guide_id = %guide_id, blocked = %request.blocked, error = %e, "adaptation_failed");
                } else {
                    debug!(guide_id = %guide_id, blocked = %request.blocked, error = %e, "adaptation_rejected");
                }
            })?;

        info!(
            guide_id = %guide_id,
            blocked = %record.blocked,
            alternatives = ?record.alternatives.iter().map(StepIdentifier::format).collect::<Vec<_>>(),
            "adaptation_applied"
        );
        Ok(record)
    }

    /// Build an adaptation from drafts, allocating identifiers for drafts
    /// that do not carry one, and apply it.
    pub async fn adapt(
        &self,
        guide_id: &str,
        blocked: StepIdentifier,
        reason: Option<String>,
        drafts: Vec<AlternativeDraft>,
    ) -> Result<AdaptationRecord, GuideError> {
        let snapshot = self.load_snapshot(guide_id).await?;
        let section_id = snapshot
            .collection
            .get(&blocked)
            .map(|s| s.section_id.clone())
            .ok_or_else(|| {
                GuideError::AdaptationPreconditionViolation(format!(
                    "step '{blocked}' does not exist"
                ))
            })?;

        let explicit: BTreeSet<StepIdentifier> =
            drafts.iter().filter_map(|d| d.identifier.clone()).collect();
        let missing = drafts.iter().filter(|d| d.identifier.is_none()).count();
        let mut fresh = allocate_alternative_identifiers(
            &snapshot.collection,
            &blocked,
            missing + explicit.len(),
        )?
        .into_iter()
        .filter(|id| !explicit.contains(id));

        let mut alternatives = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let identifier = match draft.identifier {
                Some(id) => id,
                None => fresh.next().ok_or_else(|| {
                    GuideError::AdaptationPreconditionViolation(
                        "could not allocate alternative identifiers".into(),
                    )
                })?,
            };
            alternatives.push(Step {
                identifier,
                section_id: section_id.clone(),
                status: StepStatus::Alternative,
                replaces: Some(blocked.clone()),
                title: draft.title,
                description: draft.description,
                completion_criteria: draft.completion_criteria,
                assistance_hints: draft.assistance_hints,
                estimated_minutes: draft.estimated_minutes,
                blocked_reason: None,
            });
        }

        self.apply_adaptation(
            guide_id,
            AdaptationRequest {
                blocked,
                reason,
                alternatives,
            },
        )
        .await
    }

    async fn mutate<F>(
        &self,
        session_id: &str,
        event: &'static str,
        transition: F,
    ) -> Result<TransitionView, GuideError>
    where
        F: FnOnce(&DisclosureMachine<'_>, &SessionPosition) -> Result<Transition, GuideError>
            + Send,
    {
        let lock = self.session_lock(session_id);
        let _guard = lock.lock().await;

        self.transition_locked(session_id, event, transition)
            .await
            .inspect_err(|e| {
                if e.is_collaborator_failure() {
                    warn!(session_id = %session_id, error = %e, "{}_failed", event);
                } else {
                    debug!(session_id = %session_id, error = %e, "{}_rejected", event);
                }
            })
    }

    /// Body of `mutate`; the caller holds the session lock
    async fn transition_locked<F>(
        &self,
        session_id: &str,
        event: &'static str,
        transition: F,
    ) -> Result<TransitionView, GuideError>
    where
        F: FnOnce(&DisclosureMachine<'_>, &SessionPosition) -> Result<Transition, GuideError>
            + Send,
    {
        let position = self.load_position(session_id).await?;
        let snapshot = self.load_snapshot(&position.guide_id).await?;
        let machine = DisclosureMachine::new(&snapshot.collection);

        let outcome = transition(&machine, &position)?;

        if outcome.applied {
            self.save_position(session_id, &outcome.position).await?;
            info!(
                session_id = %session_id,
                guide_id = %position.guide_id,
                from = %describe(&position.state),
                to = %describe(&outcome.position.state),
                revision = outcome.position.revision,
                "{}",
                event
            );
        }

        let view = self.render(session_id, &snapshot, &outcome.position)?;
        Ok(TransitionView {
            applied: outcome.applied,
            view,
        })
    }

    fn render(
        &self,
        session_id: &str,
        snapshot: &GuideSnapshot,
        position: &SessionPosition,
    ) -> Result<SessionView, GuideError> {
        let machine = DisclosureMachine::new(&snapshot.collection);
        let progress = machine.progress(position)?;

        let disclosure = match machine.current(position)? {
            Current::Completed => Disclosure::Completed,
            Current::Step {
                step,
                rerouted_from,
            } => {
                let section_progress = section_progress(
                    &snapshot.collection,
                    &step.section_id,
                    &position.completed_identifiers,
                );
                let effective = DisclosureState::AtStep(step.identifier.clone());
                Disclosure::Step(Box::new(DisclosedStep {
                    step: step.clone(),
                    section: snapshot.section(&step.section_id).cloned(),
                    section_progress,
                    rerouted_from,
                    can_go_back: machine.can_go_back(&effective),
                    is_last_in_section: machine.is_last_in_section(&step.identifier),
                }))
            }
        };

        Ok(SessionView {
            session_id: session_id.to_string(),
            guide_id: position.guide_id.clone(),
            disclosure,
            progress,
            revision: position.revision,
        })
    }

    fn session_lock(&self, session_id: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if locks.len() >= LOCK_PRUNE_THRESHOLD {
            // only the map holds idle entries
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        }
        locks
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    async fn load_snapshot(&self, guide_id: &str) -> Result<GuideSnapshot, GuideError> {
        let timed_out = || GuideError::guide_unavailable(guide_id, "content backend timed out");
        let steps = self
            .bounded(self.guides.load_steps(guide_id), timed_out)
            .await?;
        let sections = self
            .bounded(self.guides.load_sections(guide_id), timed_out)
            .await?;
        let collection = StepCollection::build(steps)?;
        Ok(GuideSnapshot {
            collection,
            sections,
        })
    }

    async fn load_position(&self, session_id: &str) -> Result<SessionPosition, GuideError> {
        self.bounded(self.sessions.load_position(session_id), || {
            GuideError::session_unavailable(session_id, "session backend timed out")
        })
        .await
    }

    async fn save_position(
        &self,
        session_id: &str,
        position: &SessionPosition,
    ) -> Result<(), GuideError> {
        self.bounded(self.sessions.save_position(session_id, position), || {
            GuideError::session_unavailable(session_id, "session backend timed out")
        })
        .await
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, GuideError>>,
        on_timeout: impl FnOnce() -> GuideError,
    ) -> Result<T, GuideError> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(on_timeout()),
        }
    }
}

fn describe(state: &DisclosureState) -> String {
    match state {
        DisclosureState::AtStep(id) => id.format(),
        DisclosureState::Completed => "completed".to_string(),
    }
}

fn section_progress(
    collection: &StepCollection,
    section_id: &str,
    completed: &BTreeSet<StepIdentifier>,
) -> SectionProgress {
    let (total_steps, completed_steps) = collection
        .in_section(section_id)
        .filter(|s| s.is_navigable())
        .fold((0, 0), |(total, done), s| {
            (total + 1, done + usize::from(completed.contains(&s.identifier)))
        });

    let completion_percentage = if total_steps == 0 {
        0.0
    } else {
        (completed_steps as f64 / total_steps as f64 * 1000.0).round() / 10.0
    };

    SectionProgress {
        completed_steps,
        total_steps,
        completion_percentage,
    }
}

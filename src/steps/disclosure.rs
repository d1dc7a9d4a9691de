//! Per-session disclosure state machine.
//!
//! A session stands on exactly one step (`AtStep`) or has finished the guide
//! (`Completed`). Transitions are pure functions from one [`SessionPosition`]
//! to the next over a freshly built [`StepCollection`]; persisting the result
//! is the coordinator's job.
//!
//! Blocked steps are never disclosed as current. When the stored position
//! names a step that has been blocked since, the effective current step is
//! its first alternative, or the next navigable step, or completion.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GuideError;
use crate::steps::{Step, StatusFilter, StepCollection, StepIdentifier};

/// Where a session currently is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<StepIdentifier>", into = "Option<StepIdentifier>")]
pub enum DisclosureState {
    AtStep(StepIdentifier),
    Completed,
}

impl DisclosureState {
    pub fn step(&self) -> Option<&StepIdentifier> {
        match self {
            DisclosureState::AtStep(id) => Some(id),
            DisclosureState::Completed => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, DisclosureState::Completed)
    }
}

impl From<Option<StepIdentifier>> for DisclosureState {
    fn from(value: Option<StepIdentifier>) -> Self {
        value.map_or(DisclosureState::Completed, DisclosureState::AtStep)
    }
}

impl From<DisclosureState> for Option<StepIdentifier> {
    fn from(state: DisclosureState) -> Self {
        match state {
            DisclosureState::AtStep(id) => Some(id),
            DisclosureState::Completed => None,
        }
    }
}

/// Persisted per-session state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionPosition {
    pub guide_id: String,
    /// Canonical text of the current step, `null` once completed
    #[serde(rename = "current_step_identifier")]
    pub state: DisclosureState,
    #[serde(default)]
    pub completed_identifiers: BTreeSet<StepIdentifier>,
    /// Incremented by every applied transition
    #[serde(default)]
    pub revision: u64,
    pub updated_at: DateTime<Utc>,
}

impl SessionPosition {
    /// Fresh position at the guide's lowest active step
    pub fn start(guide_id: &str, collection: &StepCollection) -> Self {
        let state = collection
            .first(StatusFilter::ACTIVE)
            .map(|s| DisclosureState::AtStep(s.identifier.clone()))
            .unwrap_or(DisclosureState::Completed);

        Self {
            guide_id: guide_id.to_string(),
            state,
            completed_identifiers: BTreeSet::new(),
            revision: 0,
            updated_at: Utc::now(),
        }
    }

    fn moved_to(&self, state: DisclosureState) -> Self {
        Self {
            guide_id: self.guide_id.clone(),
            state,
            completed_identifiers: self.completed_identifiers.clone(),
            revision: self.revision + 1,
            updated_at: Utc::now(),
        }
    }
}

/// Outcome of a mutating transition
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub position: SessionPosition,
    /// False when the transition was a defined no-op
    pub applied: bool,
}

impl Transition {
    fn applied(position: SessionPosition) -> Self {
        Self {
            position,
            applied: true,
        }
    }

    fn unchanged(position: &SessionPosition) -> Self {
        Self {
            position: position.clone(),
            applied: false,
        }
    }
}

/// Progress over the non-blocked steps of a guide
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub total_steps: usize,
    pub completed_steps: usize,
    pub completion_percentage: f64,
    pub estimated_minutes_remaining: u32,
}

/// What a read of the current position discloses
#[derive(Debug, Clone, PartialEq)]
pub enum Current<'a> {
    Step {
        step: &'a Step,
        /// Set when the stored step was blocked and this one was substituted
        rerouted_from: Option<StepIdentifier>,
    },
    Completed,
}

/// Transition logic over one guide's steps
#[derive(Debug, Clone, Copy)]
pub struct DisclosureMachine<'a> {
    collection: &'a StepCollection,
}

impl<'a> DisclosureMachine<'a> {
    pub fn new(collection: &'a StepCollection) -> Self {
        Self { collection }
    }

    pub fn collection(&self) -> &'a StepCollection {
        self.collection
    }

    /// Initial state: the lowest active step, or completed if there is none
    pub fn initial(&self) -> DisclosureState {
        self.collection
            .first(StatusFilter::ACTIVE)
            .map(|s| DisclosureState::AtStep(s.identifier.clone()))
            .unwrap_or(DisclosureState::Completed)
    }

    /// Resolve a stored state to the state that is actually disclosed
    pub fn effective(&self, state: &DisclosureState) -> Result<DisclosureState, GuideError> {
        let id = match state {
            DisclosureState::Completed => return Ok(DisclosureState::Completed),
            DisclosureState::AtStep(id) => id,
        };

        let step = self.lookup(id)?;
        if step.is_navigable() {
            return Ok(state.clone());
        }

        if let Some(alt) = self.collection.resolve_alternative(id) {
            return Ok(DisclosureState::AtStep(alt.identifier.clone()));
        }
        Ok(self
            .next_navigable_after(id)
            .map(DisclosureState::AtStep)
            .unwrap_or(DisclosureState::Completed))
    }

    /// Complete the current step and move to the next reachable one.
    ///
    /// With `expected` set, the call only applies while that step is the
    /// effective current step; otherwise it is a no-op. This resolves two
    /// callers racing to complete the same step.
    pub fn advance(
        &self,
        position: &SessionPosition,
        expected: Option<&StepIdentifier>,
    ) -> Result<Transition, GuideError> {
        let current = match self.effective(&position.state)? {
            DisclosureState::Completed => {
                let Some(stored) = position.state.step() else {
                    return Ok(Transition::unchanged(position));
                };
                // the stored step was blocked with nothing left after it
                if expected.is_some_and(|expected| expected != stored) {
                    return Ok(Transition::unchanged(position));
                }
                return Ok(Transition::applied(
                    position.moved_to(DisclosureState::Completed),
                ));
            }
            DisclosureState::AtStep(id) => id,
        };

        if let Some(expected) = expected {
            if *expected != current {
                return Ok(Transition::unchanged(position));
            }
        }

        let target = self
            .next_navigable_after(&current)
            .map(DisclosureState::AtStep)
            .unwrap_or(DisclosureState::Completed);

        let mut next = position.moved_to(target);
        next.completed_identifiers.insert(current);
        Ok(Transition::applied(next))
    }

    /// Step back from the disclosed step to the previous non-blocked one.
    /// Retreating from the first step is a no-op; retreating from completion
    /// returns to the last step.
    pub fn retreat(&self, position: &SessionPosition) -> Result<Transition, GuideError> {
        let target = match self.effective(&position.state)? {
            DisclosureState::Completed => self.collection.last(StatusFilter::NAVIGABLE),
            DisclosureState::AtStep(id) => self.collection.previous(&id, StatusFilter::NAVIGABLE),
        };

        match target {
            Some(step) => Ok(Transition::applied(
                position.moved_to(DisclosureState::AtStep(step.identifier.clone())),
            )),
            None => Ok(Transition::unchanged(position)),
        }
    }

    /// Move to the first reachable step of a section
    pub fn jump_to_section(
        &self,
        position: &SessionPosition,
        section_id: &str,
    ) -> Result<Transition, GuideError> {
        let mut steps = self.collection.in_section(section_id).peekable();
        if steps.peek().is_none() {
            return Err(GuideError::SectionNotFound(section_id.to_string()));
        }

        let target = steps
            .find(|s| s.is_navigable())
            .ok_or_else(|| GuideError::SectionNotFound(section_id.to_string()))?;

        Ok(Transition::applied(position.moved_to(
            DisclosureState::AtStep(target.identifier.clone()),
        )))
    }

    /// Read the disclosed step without changing anything
    pub fn current(&self, position: &SessionPosition) -> Result<Current<'a>, GuideError> {
        match self.effective(&position.state)? {
            DisclosureState::Completed => Ok(Current::Completed),
            DisclosureState::AtStep(id) => {
                let step = self.lookup(&id)?;
                let rerouted_from = position.state.step().filter(|stored| **stored != id).cloned();
                Ok(Current::Step {
                    step,
                    rerouted_from,
                })
            }
        }
    }

    /// Progress as completed / non-blocked steps.
    ///
    /// Blocked steps never count, on either side; alternatives count once
    /// each.
    pub fn progress(&self, position: &SessionPosition) -> Result<Progress, GuideError> {
        let total_steps = self.collection.filtered(StatusFilter::NAVIGABLE).count();
        let completed_steps = position
            .completed_identifiers
            .iter()
            .filter(|id| self.collection.get(id).is_some_and(Step::is_navigable))
            .count();

        let completion_percentage = if total_steps == 0 {
            0.0
        } else {
            (completed_steps as f64 / total_steps as f64 * 1000.0).round() / 10.0
        };

        let estimated_minutes_remaining = match self.effective(&position.state)? {
            DisclosureState::Completed => 0,
            DisclosureState::AtStep(id) => self
                .collection
                .filtered(StatusFilter::NAVIGABLE)
                .filter(|s| s.identifier > id)
                .map(|s| s.estimated_minutes)
                .sum(),
        };

        Ok(Progress {
            total_steps,
            completed_steps,
            completion_percentage,
            estimated_minutes_remaining,
        })
    }

    /// Whether a retreat from `state` would move
    pub fn can_go_back(&self, state: &DisclosureState) -> bool {
        match state {
            DisclosureState::Completed => self.collection.last(StatusFilter::NAVIGABLE).is_some(),
            DisclosureState::AtStep(id) => {
                self.collection.previous(id, StatusFilter::NAVIGABLE).is_some()
            }
        }
    }

    /// Whether `id` is the last non-blocked step of its section
    pub fn is_last_in_section(&self, id: &StepIdentifier) -> bool {
        let Some(step) = self.collection.get(id) else {
            return false;
        };
        self.collection
            .in_section(&step.section_id)
            .filter(|s| s.is_navigable())
            .last()
            .is_some_and(|last| last.identifier == *id)
    }

    /// Next step a user can stand on after `cursor`.
    ///
    /// Alternatives share their blocked step's major index, so walking the
    /// non-blocked steps in identifier order passes through them right where
    /// the blocked step used to be.
    fn next_navigable_after(&self, cursor: &StepIdentifier) -> Option<StepIdentifier> {
        self.collection
            .next(cursor, StatusFilter::NAVIGABLE)
            .map(|step| step.identifier.clone())
    }

    fn lookup(&self, id: &StepIdentifier) -> Result<&'a Step, GuideError> {
        self.collection.get(id).ok_or_else(|| GuideError::InconsistentStep {
            identifier: id.clone(),
            reason: "session position names a step that is not part of the guide".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::{apply_adaptation, AdaptationRequest, StepStatus};

    fn id(text: &str) -> StepIdentifier {
        StepIdentifier::parse(text).unwrap()
    }

    fn step(text: &str, section: &str) -> Step {
        let mut s = Step::active(id(text), section, &format!("Step {text}"));
        s.estimated_minutes = 10;
        s
    }

    fn alt(text: &str, replaces: &str) -> Step {
        let mut s = step(text, "");
        s.status = StepStatus::Alternative;
        s.replaces = Some(id(replaces));
        s
    }

    fn three_steps() -> StepCollection {
        StepCollection::build(vec![step("0", "a"), step("1", "a"), step("2", "b")]).unwrap()
    }

    fn block(collection: &StepCollection, blocked: &str, alts: Vec<Step>) -> StepCollection {
        apply_adaptation(
            collection,
            &AdaptationRequest {
                blocked: id(blocked),
                reason: None,
                alternatives: alts,
            },
        )
        .unwrap()
    }

    fn at(position: &SessionPosition) -> Option<String> {
        position.state.step().map(StepIdentifier::format)
    }

    #[test]
    fn test_start_at_lowest_active() {
        let collection = three_steps();
        let position = SessionPosition::start("g1", &collection);
        assert_eq!(at(&position), Some("0".to_string()));
        assert_eq!(DisclosureMachine::new(&collection).initial(), position.state);
    }

    #[test]
    fn test_start_with_no_active_steps_is_completed() {
        let collection = StepCollection::default();
        let position = SessionPosition::start("g1", &collection);
        assert!(position.state.is_completed());
    }

    #[test]
    fn test_advance_marks_completed_and_moves() {
        let collection = three_steps();
        let machine = DisclosureMachine::new(&collection);
        let position = SessionPosition::start("g1", &collection);

        let t = machine.advance(&position, None).unwrap();
        assert!(t.applied);
        assert_eq!(at(&t.position), Some("1".to_string()));
        assert!(t.position.completed_identifiers.contains(&id("0")));
        assert_eq!(t.position.revision, 1);
    }

    #[test]
    fn test_advance_past_last_completes_then_noop() {
        let collection = three_steps();
        let machine = DisclosureMachine::new(&collection);
        let mut position = SessionPosition::start("g1", &collection);
        position.state = DisclosureState::AtStep(id("2"));

        let done = machine.advance(&position, None).unwrap();
        assert!(done.position.state.is_completed());
        assert!(done.position.completed_identifiers.contains(&id("2")));

        let again = machine.advance(&done.position, None).unwrap();
        assert!(!again.applied);
        assert_eq!(again.position, done.position);
    }

    #[test]
    fn test_retreat_from_first_is_noop() {
        let collection = three_steps();
        let machine = DisclosureMachine::new(&collection);
        let position = SessionPosition::start("g1", &collection);

        let t = machine.retreat(&position).unwrap();
        assert!(!t.applied);
        assert_eq!(at(&t.position), Some("0".to_string()));
        assert_eq!(t.position.revision, 0);
    }

    #[test]
    fn test_retreat_skips_blocked() {
        let collection = block(&three_steps(), "1", vec![]);
        let machine = DisclosureMachine::new(&collection);
        let mut position = SessionPosition::start("g1", &collection);
        position.state = DisclosureState::AtStep(id("2"));

        let t = machine.retreat(&position).unwrap();
        assert_eq!(at(&t.position), Some("0".to_string()));
    }

    #[test]
    fn test_retreat_from_completed_returns_to_last_step() {
        let collection = three_steps();
        let machine = DisclosureMachine::new(&collection);
        let mut position = SessionPosition::start("g1", &collection);
        position.state = DisclosureState::Completed;

        let t = machine.retreat(&position).unwrap();
        assert_eq!(at(&t.position), Some("2".to_string()));
    }

    #[test]
    fn test_retreat_from_rerouted_position_steps_back_from_shown_step() {
        // "2a" is an unrelated active step sitting between "2" and its alternative "2b"
        let base = StepCollection::build(vec![
            step("1", "a"),
            step("2", "a"),
            step("2a", "a"),
            step("3", "a"),
        ])
        .unwrap();
        let collection = block(&base, "2", vec![alt("2b", "2")]);
        let machine = DisclosureMachine::new(&collection);
        let mut position = SessionPosition::start("g1", &collection);
        position.state = DisclosureState::AtStep(id("2"));

        let shown = machine.effective(&position.state).unwrap();
        assert_eq!(shown, DisclosureState::AtStep(id("2b")));
        assert!(machine.can_go_back(&shown));

        let t = machine.retreat(&position).unwrap();
        assert!(t.applied);
        assert_eq!(at(&t.position), Some("2a".to_string()));
    }

    #[test]
    fn test_retreat_from_blocked_tail_returns_to_last_step() {
        let collection = block(&three_steps(), "2", vec![]);
        let machine = DisclosureMachine::new(&collection);
        let mut position = SessionPosition::start("g1", &collection);
        position.state = DisclosureState::AtStep(id("2"));

        let t = machine.retreat(&position).unwrap();
        assert_eq!(at(&t.position), Some("1".to_string()));
    }

    #[test]
    fn test_advance_reroutes_to_alternative() {
        let base = three_steps();
        let collection = block(&base, "2", vec![alt("2a", "2")]);
        let machine = DisclosureMachine::new(&collection);
        let mut position = SessionPosition::start("g1", &collection);
        position.state = DisclosureState::AtStep(id("1"));

        let t = machine.advance(&position, None).unwrap();
        assert_eq!(at(&t.position), Some("2a".to_string()));

        let progress = machine.progress(&t.position).unwrap();
        // 0, 1, 2a; the blocked "2" is not counted
        assert_eq!(progress.total_steps, 3);
    }

    #[test]
    fn test_advance_visits_sibling_and_alternative_in_order() {
        // "2a" is an unrelated active step; "2" is blocked with alternative "2c"
        let base = StepCollection::build(vec![
            step("1", "a"),
            step("2", "a"),
            step("2a", "a"),
            step("3", "a"),
        ])
        .unwrap();
        let collection = block(&base, "2", vec![alt("2c", "2")]);
        let machine = DisclosureMachine::new(&collection);
        let mut position = SessionPosition::start("g1", &collection);

        let mut visited = Vec::new();
        while !position.state.is_completed() {
            visited.push(at(&position).unwrap());
            position = machine.advance(&position, None).unwrap().position;
        }
        assert_eq!(visited, vec!["1", "2a", "2c", "3"]);
    }

    #[test]
    fn test_advance_skips_blocked_without_alternatives() {
        let collection = block(&three_steps(), "1", vec![]);
        let machine = DisclosureMachine::new(&collection);
        let position = SessionPosition::start("g1", &collection);

        let t = machine.advance(&position, None).unwrap();
        assert_eq!(at(&t.position), Some("2".to_string()));
    }

    #[test]
    fn test_advance_through_multiple_alternatives() {
        let collection = block(&three_steps(), "1", vec![alt("1a", "1"), alt("1b", "1")]);
        let machine = DisclosureMachine::new(&collection);
        let mut position = SessionPosition::start("g1", &collection);

        let mut visited = Vec::new();
        while !position.state.is_completed() {
            visited.push(at(&position).unwrap());
            position = machine.advance(&position, None).unwrap().position;
        }
        assert_eq!(visited, vec!["0", "1a", "1b", "2"]);
    }

    #[test]
    fn test_current_reroutes_blocked_position_without_writing() {
        let collection = block(&three_steps(), "1", vec![alt("1a", "1")]);
        let machine = DisclosureMachine::new(&collection);
        let mut position = SessionPosition::start("g1", &collection);
        position.state = DisclosureState::AtStep(id("1"));

        match machine.current(&position).unwrap() {
            Current::Step {
                step,
                rerouted_from,
            } => {
                assert_eq!(step.identifier, id("1a"));
                assert_eq!(rerouted_from, Some(id("1")));
            }
            Current::Completed => panic!("expected a step"),
        }
    }

    #[test]
    fn test_advance_from_blocked_position_completes_shown_alternative() {
        let collection = block(&three_steps(), "1", vec![alt("1a", "1")]);
        let machine = DisclosureMachine::new(&collection);
        let mut position = SessionPosition::start("g1", &collection);
        position.state = DisclosureState::AtStep(id("1"));

        let t = machine.advance(&position, None).unwrap();
        assert_eq!(at(&t.position), Some("2".to_string()));
        assert!(t.position.completed_identifiers.contains(&id("1a")));
        assert!(!t.position.completed_identifiers.contains(&id("1")));
    }

    #[test]
    fn test_blocked_last_step_without_alternatives_completes() {
        let collection = block(&three_steps(), "2", vec![]);
        let machine = DisclosureMachine::new(&collection);
        let mut position = SessionPosition::start("g1", &collection);
        position.state = DisclosureState::AtStep(id("2"));

        assert_eq!(machine.current(&position).unwrap(), Current::Completed);
        let t = machine.advance(&position, None).unwrap();
        assert!(t.applied);
        assert!(t.position.state.is_completed());
    }

    #[test]
    fn test_guarded_advance_from_blocked_tail() {
        let collection = block(&three_steps(), "2", vec![]);
        let machine = DisclosureMachine::new(&collection);
        let mut position = SessionPosition::start("g1", &collection);
        position.state = DisclosureState::AtStep(id("2"));

        let stale = machine.advance(&position, Some(&id("1"))).unwrap();
        assert!(!stale.applied);
        assert_eq!(stale.position, position);

        let matching = machine.advance(&position, Some(&id("2"))).unwrap();
        assert!(matching.applied);
        assert!(matching.position.state.is_completed());
    }

    #[test]
    fn test_guarded_advance() {
        let collection = three_steps();
        let machine = DisclosureMachine::new(&collection);
        let position = SessionPosition::start("g1", &collection);

        let first = machine.advance(&position, Some(&id("0"))).unwrap();
        assert!(first.applied);

        let stale = machine.advance(&first.position, Some(&id("0"))).unwrap();
        assert!(!stale.applied);
        assert_eq!(at(&stale.position), Some("1".to_string()));
    }

    #[test]
    fn test_jump_to_section() {
        let collection = three_steps();
        let machine = DisclosureMachine::new(&collection);
        let position = SessionPosition::start("g1", &collection);

        let t = machine.jump_to_section(&position, "b").unwrap();
        assert_eq!(at(&t.position), Some("2".to_string()));
        assert!(t.position.completed_identifiers.is_empty());

        let err = machine.jump_to_section(&position, "missing").unwrap_err();
        assert_eq!(err, GuideError::SectionNotFound("missing".to_string()));
    }

    #[test]
    fn test_jump_to_section_with_only_blocked_step_fails() {
        let collection = block(&three_steps(), "2", vec![]);
        let machine = DisclosureMachine::new(&collection);
        let position = SessionPosition::start("g1", &collection);

        let err = machine.jump_to_section(&position, "b").unwrap_err();
        assert!(matches!(err, GuideError::SectionNotFound(_)));
    }

    #[test]
    fn test_jump_to_section_lands_on_alternative() {
        let collection = block(&three_steps(), "2", vec![alt("2a", "2")]);
        let machine = DisclosureMachine::new(&collection);
        let position = SessionPosition::start("g1", &collection);

        let t = machine.jump_to_section(&position, "b").unwrap();
        assert_eq!(at(&t.position), Some("2a".to_string()));
    }

    #[test]
    fn test_progress_counts() {
        let collection = three_steps();
        let machine = DisclosureMachine::new(&collection);
        let position = SessionPosition::start("g1", &collection);
        let position = machine.advance(&position, None).unwrap().position;

        let progress = machine.progress(&position).unwrap();
        assert_eq!(progress.total_steps, 3);
        assert_eq!(progress.completed_steps, 1);
        assert!((progress.completion_percentage - 33.3).abs() < f64::EPSILON);
        assert_eq!(progress.estimated_minutes_remaining, 10);
    }

    #[test]
    fn test_progress_never_shrinks_when_future_step_blocked() {
        let base = three_steps();
        let machine = DisclosureMachine::new(&base);
        let position = SessionPosition::start("g1", &base);
        let position = machine.advance(&position, None).unwrap().position;
        let before = machine.progress(&position).unwrap();

        let adapted = block(&base, "2", vec![alt("2a", "2")]);
        let after = DisclosureMachine::new(&adapted).progress(&position).unwrap();

        assert_eq!(after.total_steps, before.total_steps);
        assert!(after.completion_percentage >= before.completion_percentage);
    }

    #[test]
    fn test_navigation_helpers() {
        let collection = three_steps();
        let machine = DisclosureMachine::new(&collection);
        assert!(!machine.can_go_back(&DisclosureState::AtStep(id("0"))));
        assert!(machine.can_go_back(&DisclosureState::AtStep(id("1"))));
        assert!(machine.is_last_in_section(&id("1")));
        assert!(!machine.is_last_in_section(&id("0")));
    }

    #[test]
    fn test_position_persisted_layout() {
        let collection = three_steps();
        let machine = DisclosureMachine::new(&collection);
        let position = SessionPosition::start("g1", &collection);
        let position = machine.advance(&position, None).unwrap().position;

        let json = serde_json::to_value(&position).unwrap();
        assert_eq!(json["guide_id"], "g1");
        assert_eq!(json["current_step_identifier"], "1");
        assert_eq!(json["completed_identifiers"], serde_json::json!(["0"]));

        let back: SessionPosition = serde_json::from_value(json).unwrap();
        assert_eq!(back, position);

        let mut done = position.clone();
        done.state = DisclosureState::Completed;
        let json = serde_json::to_value(&done).unwrap();
        assert!(json["current_step_identifier"].is_null());
    }

    #[test]
    fn test_unknown_position_step_is_reported() {
        let collection = three_steps();
        let machine = DisclosureMachine::new(&collection);
        let mut position = SessionPosition::start("g1", &collection);
        position.state = DisclosureState::AtStep(id("9"));

        assert!(machine.current(&position).is_err());
        assert!(machine.advance(&position, None).is_err());
    }
}

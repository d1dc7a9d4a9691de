//! Ordered, in-memory view of the steps belonging to one guide.

use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};
use std::ops::BitOr;

use serde::{Deserialize, Serialize};

use crate::error::GuideError;
use crate::steps::StepIdentifier;

/// Lifecycle status of a step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    #[default]
    Active,
    /// Unreachable; traversal skips it and reroutes to its alternatives
    Blocked,
    /// Inserted to substitute for a blocked step
    Alternative,
}

impl StepStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Active => "active",
            StepStatus::Blocked => "blocked",
            StepStatus::Alternative => "alternative",
        }
    }

    /// Whether a step with this status can be the current step
    pub fn is_navigable(&self) -> bool {
        !matches!(self, StepStatus::Blocked)
    }
}

/// Set of statuses accepted by neighbor queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusFilter(u8);

impl StatusFilter {
    pub const ACTIVE: StatusFilter = StatusFilter(0b001);
    pub const BLOCKED: StatusFilter = StatusFilter(0b010);
    pub const ALTERNATIVE: StatusFilter = StatusFilter(0b100);
    /// Statuses a session may stand on
    pub const NAVIGABLE: StatusFilter = StatusFilter(0b101);
    pub const ALL: StatusFilter = StatusFilter(0b111);

    pub fn contains(self, status: StepStatus) -> bool {
        let bit = match status {
            StepStatus::Active => Self::ACTIVE.0,
            StepStatus::Blocked => Self::BLOCKED.0,
            StepStatus::Alternative => Self::ALTERNATIVE.0,
        };
        self.0 & bit != 0
    }
}

impl Default for StatusFilter {
    fn default() -> Self {
        Self::ACTIVE
    }
}

impl BitOr for StatusFilter {
    type Output = StatusFilter;

    fn bitor(self, rhs: Self) -> Self::Output {
        StatusFilter(self.0 | rhs.0)
    }
}

/// A single step of a guide
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub identifier: StepIdentifier,
    /// Section the step is rendered under (not used for ordering)
    pub section_id: String,
    #[serde(default)]
    pub status: StepStatus,
    /// Blocked step this one substitutes for; only set on alternatives
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replaces: Option<StepIdentifier>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completion_criteria: String,
    #[serde(default)]
    pub assistance_hints: Vec<String>,
    #[serde(default)]
    pub estimated_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_reason: Option<String>,
}

impl Step {
    /// Minimal active step, mostly useful for fixtures
    pub fn active(identifier: StepIdentifier, section_id: &str, title: &str) -> Self {
        Self {
            identifier,
            section_id: section_id.to_string(),
            status: StepStatus::Active,
            replaces: None,
            title: title.to_string(),
            description: String::new(),
            completion_criteria: String::new(),
            assistance_hints: Vec::new(),
            estimated_minutes: 0,
            blocked_reason: None,
        }
    }

    pub fn is_navigable(&self) -> bool {
        self.status.is_navigable()
    }
}

/// Titled grouping of steps, used for overview rendering only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub section_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub order: u32,
}

/// All steps of one guide keyed by identifier.
///
/// Built fresh for each operation from the stored guide record and owned by
/// that operation alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepCollection {
    steps: BTreeMap<StepIdentifier, Step>,
}

impl StepCollection {
    /// Build a collection, validating identifier uniqueness and the
    /// alternative/replaces invariants.
    pub fn build(steps: impl IntoIterator<Item = Step>) -> Result<Self, GuideError> {
        let mut map = BTreeMap::new();
        for step in steps {
            if map.contains_key(&step.identifier) {
                return Err(GuideError::DuplicateIdentifier(step.identifier));
            }
            map.insert(step.identifier.clone(), step);
        }

        let collection = Self { steps: map };
        collection.validate()?;
        Ok(collection)
    }

    fn validate(&self) -> Result<(), GuideError> {
        for step in self.steps.values() {
            match (step.status, &step.replaces) {
                (StepStatus::Alternative, None) => {
                    return Err(GuideError::InconsistentStep {
                        identifier: step.identifier.clone(),
                        reason: "alternative step does not name the step it replaces".into(),
                    });
                }
                (StepStatus::Alternative, Some(target)) => {
                    if !self.steps.contains_key(target) {
                        return Err(GuideError::InconsistentStep {
                            identifier: step.identifier.clone(),
                            reason: format!("replaces unknown step '{target}'"),
                        });
                    }
                }
                (_, Some(_)) => {
                    return Err(GuideError::InconsistentStep {
                        identifier: step.identifier.clone(),
                        reason: format!("{} step cannot replace another step", step.status.as_str()),
                    });
                }
                (_, None) => {}
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, id: &StepIdentifier) -> Option<&Step> {
        self.steps.get(id)
    }

    pub fn contains(&self, id: &StepIdentifier) -> bool {
        self.steps.contains_key(id)
    }

    /// All steps in identifier order. Each call starts a fresh pass.
    pub fn ordered(&self) -> impl DoubleEndedIterator<Item = &Step> + '_ {
        self.steps.values()
    }

    /// Smallest step strictly after `after` whose status is in `filter`
    pub fn next(&self, after: &StepIdentifier, filter: StatusFilter) -> Option<&Step> {
        self.steps
            .range((Excluded(after), Unbounded))
            .map(|(_, step)| step)
            .find(|step| filter.contains(step.status))
    }

    /// Largest step strictly before `before` whose status is in `filter`
    pub fn previous(&self, before: &StepIdentifier, filter: StatusFilter) -> Option<&Step> {
        self.steps
            .range(..before)
            .rev()
            .map(|(_, step)| step)
            .find(|step| filter.contains(step.status))
    }

    /// First step in order whose status is in `filter`
    pub fn first(&self, filter: StatusFilter) -> Option<&Step> {
        self.ordered().find(|step| filter.contains(step.status))
    }

    /// Last step in order whose status is in `filter`
    pub fn last(&self, filter: StatusFilter) -> Option<&Step> {
        self.ordered().rev().find(|step| filter.contains(step.status))
    }

    /// First alternative (in identifier order) substituting for `blocked`
    pub fn resolve_alternative(&self, blocked: &StepIdentifier) -> Option<&Step> {
        self.ordered().find(|step| {
            step.status == StepStatus::Alternative && step.replaces.as_ref() == Some(blocked)
        })
    }

    /// All alternatives substituting for `blocked`, in identifier order
    pub fn alternatives_for<'a, 'b>(
        &'a self,
        blocked: &'b StepIdentifier,
    ) -> impl Iterator<Item = &'a Step> + 'b
    where
        'a: 'b,
    {
        self.ordered().filter(move |step| {
            step.status == StepStatus::Alternative && step.replaces.as_ref() == Some(blocked)
        })
    }

    /// Steps of one section, in identifier order
    pub fn in_section<'a, 'b>(&'a self, section_id: &'b str) -> impl Iterator<Item = &'a Step> + 'b
    where
        'a: 'b,
    {
        self.ordered().filter(move |step| step.section_id == section_id)
    }

    /// Steps whose status is in `filter`, in identifier order
    pub fn filtered(&self, filter: StatusFilter) -> impl Iterator<Item = &Step> + '_ {
        self.ordered().filter(move |step| filter.contains(step.status))
    }

    /// Consume the collection, yielding steps in identifier order
    pub fn into_steps(self) -> Vec<Step> {
        self.steps.into_values().collect()
    }

    pub(crate) fn insert(&mut self, step: Step) {
        self.steps.insert(step.identifier.clone(), step);
    }

    pub(crate) fn get_mut(&mut self, id: &StepIdentifier) -> Option<&mut Step> {
        self.steps.get_mut(id)
    }
}

//! Applying an adaptation: blocking a step and inserting its alternatives.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GuideError;
use crate::steps::{Step, StepCollection, StepIdentifier, StepStatus};

/// A request to block one step and substitute alternatives for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptationRequest {
    pub blocked: StepIdentifier,
    #[serde(default)]
    pub reason: Option<String>,
    pub alternatives: Vec<Step>,
}

/// History entry kept on the guide record for every applied adaptation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptationRecord {
    pub blocked: StepIdentifier,
    #[serde(default)]
    pub reason: Option<String>,
    pub alternatives: Vec<StepIdentifier>,
    pub applied_at: DateTime<Utc>,
}

impl AdaptationRecord {
    pub fn from_request(request: &AdaptationRequest) -> Self {
        Self {
            blocked: request.blocked.clone(),
            reason: request.reason.clone(),
            alternatives: request
                .alternatives
                .iter()
                .map(|s| s.identifier.clone())
                .collect(),
            applied_at: Utc::now(),
        }
    }
}

/// Block `request.blocked` and insert the alternatives, returning the updated
/// collection. The input collection is left untouched.
///
/// Preconditions: the blocked step exists and is active; every alternative
/// has an unused identifier with the blocked step's major index and names the
/// blocked step in `replaces`. Alternatives inherit the blocked step's section.
pub fn apply_adaptation(
    collection: &StepCollection,
    request: &AdaptationRequest,
) -> Result<StepCollection, GuideError> {
    let blocked_id = &request.blocked;
    let blocked = collection.get(blocked_id).ok_or_else(|| {
        GuideError::AdaptationPreconditionViolation(format!("step '{blocked_id}' does not exist"))
    })?;

    if blocked.status != StepStatus::Active {
        return Err(GuideError::AdaptationPreconditionViolation(format!(
            "step '{blocked_id}' is {} and cannot be blocked",
            blocked.status.as_str()
        )));
    }

    let section_id = blocked.section_id.clone();
    let mut seen = BTreeSet::new();

    for alt in &request.alternatives {
        let alt_id = &alt.identifier;
        if alt_id.major() != blocked_id.major() {
            return Err(GuideError::AdaptationPreconditionViolation(format!(
                "alternative '{alt_id}' must share major index {} with '{blocked_id}'",
                blocked_id.major()
            )));
        }
        if collection.contains(alt_id) || !seen.insert(alt_id.clone()) {
            return Err(GuideError::AdaptationPreconditionViolation(format!(
                "alternative identifier '{alt_id}' is already in use"
            )));
        }
        if alt.replaces.as_ref() != Some(blocked_id) {
            return Err(GuideError::AdaptationPreconditionViolation(format!(
                "alternative '{alt_id}' must replace '{blocked_id}'"
            )));
        }
    }

    let mut updated = collection.clone();
    if let Some(step) = updated.get_mut(blocked_id) {
        step.status = StepStatus::Blocked;
        step.blocked_reason = request.reason.clone();
    }
    for alt in &request.alternatives {
        let mut inserted = alt.clone();
        inserted.status = StepStatus::Alternative;
        inserted.section_id = section_id.clone();
        inserted.blocked_reason = None;
        updated.insert(inserted);
    }

    Ok(updated)
}

/// Allocate `count` fresh identifiers for alternatives to `blocked`.
///
/// Suffix letters are appended to the blocked step's own suffix ("2" gives
/// "2a", "2b", ...; "2a" gives "2aa", "2ab", ...), skipping any identifier
/// already present. After "z" the sequence continues with "aa", "ab", ...
pub fn allocate_alternative_identifiers(
    collection: &StepCollection,
    blocked: &StepIdentifier,
    count: usize,
) -> Result<Vec<StepIdentifier>, GuideError> {
    let mut allocated = Vec::with_capacity(count);
    let mut n = 0usize;
    while allocated.len() < count {
        let candidate = blocked.with_suffix(&letters_for(n))?;
        if !collection.contains(&candidate) {
            allocated.push(candidate);
        }
        n += 1;
    }
    Ok(allocated)
}

/// Bijective base-26: 0 -> "a", 25 -> "z", 26 -> "aa", ...
fn letters_for(mut n: usize) -> String {
    let mut out = Vec::new();
    loop {
        out.push(b'a' + (n % 26) as u8);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

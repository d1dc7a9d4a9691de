//! Step ordering and progressive disclosure engine.
//!
//! Everything in this module is pure: no I/O, no locking. The session
//! coordinator loads guide content, runs these transitions and persists the
//! outcome.

pub mod adaptation;
pub mod collection;
pub mod disclosure;
pub mod identifier;

pub use adaptation::{
    allocate_alternative_identifiers, apply_adaptation, AdaptationRecord, AdaptationRequest,
};
pub use collection::{Section, StatusFilter, Step, StepCollection, StepStatus};
pub use disclosure::{
    Current, DisclosureMachine, DisclosureState, Progress, SessionPosition, Transition,
};
pub use identifier::{sort_identifiers, StepIdentifier};

//! Step identifiers: sparse, insertable labels like "1", "1a", "1b", "2", "10".
//!
//! An identifier is a major index plus a lowercase suffix. Ordering compares
//! the major index numerically, then the suffix lexicographically, with the
//! empty suffix first. New steps can always be placed between two existing
//! ones by extending the suffix ("1aa" sits between "1a" and "1b").

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GuideError;

/// Position of a step within a guide
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StepIdentifier {
    major: u64,
    suffix: String,
}

impl StepIdentifier {
    /// Parse the canonical text form `digits[a-z]*`.
    ///
    /// Leading zeros are rejected ("0" itself is fine) so that formatting a
    /// parsed identifier always reproduces the input text.
    pub fn parse(text: &str) -> Result<Self, GuideError> {
        let digits_end = text
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(text.len());
        let (digits, suffix) = text.split_at(digits_end);

        if digits.is_empty() {
            return Err(GuideError::malformed(text, "must start with a digit"));
        }
        if digits.len() > 1 && digits.starts_with('0') {
            return Err(GuideError::malformed(text, "leading zeros are not allowed"));
        }
        if !suffix.chars().all(|c| c.is_ascii_lowercase()) {
            return Err(GuideError::malformed(
                text,
                "suffix must contain only lowercase letters a-z",
            ));
        }

        let major = digits
            .parse::<u64>()
            .map_err(|_| GuideError::malformed(text, "major index is out of range"))?;

        Ok(Self {
            major,
            suffix: suffix.to_string(),
        })
    }

    /// Build an identifier from already-validated parts
    pub fn new(major: u64, suffix: &str) -> Result<Self, GuideError> {
        if !suffix.chars().all(|c| c.is_ascii_lowercase()) {
            return Err(GuideError::malformed(
                format!("{major}{suffix}"),
                "suffix must contain only lowercase letters a-z",
            ));
        }
        Ok(Self {
            major,
            suffix: suffix.to_string(),
        })
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Identifier with the same major index and `extra` appended to the suffix
    pub fn with_suffix(&self, extra: &str) -> Result<Self, GuideError> {
        Self::new(self.major, &format!("{}{}", self.suffix, extra))
    }

    /// Canonical text form; inverse of [`StepIdentifier::parse`]
    pub fn format(&self) -> String {
        self.to_string()
    }
}

impl Ord for StepIdentifier {
    fn cmp(&self, other: &Self) -> Ordering {
        // "" < "a" < "aa" < "b" falls out of plain string ordering
        self.major
            .cmp(&other.major)
            .then_with(|| self.suffix.cmp(&other.suffix))
    }
}

impl PartialOrd for StepIdentifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for StepIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.major, self.suffix)
    }
}

impl FromStr for StepIdentifier {
    type Err = GuideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for StepIdentifier {
    type Error = GuideError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<StepIdentifier> for String {
    fn from(id: StepIdentifier) -> Self {
        id.to_string()
    }
}

/// Sort identifier texts in step order, rejecting malformed input
pub fn sort_identifiers<S: AsRef<str>>(texts: &[S]) -> Result<Vec<StepIdentifier>, GuideError> {
    let mut ids = texts
        .iter()
        .map(|t| StepIdentifier::parse(t.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    ids.sort();
    Ok(ids)
}

//! Airline-filter fallback.
//!
//! A filtered search whose best score is under the floor is re-run without the
//! filter; the unfiltered attempt wins only if it scores strictly higher.

use serde::{Serialize, Serializer};

use super::candidate::{Candidate, top_score};
use super::confidence::ConfidenceThresholds;

/// The airline filter that produced a result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterUsed {
    None,
    Airline(String),
}

impl FilterUsed {
    pub fn from_normalized(airline: Option<String>) -> Self {
        airline.map(FilterUsed::Airline).unwrap_or(FilterUsed::None)
    }

    pub fn airline(&self) -> Option<&str> {
        match self {
            FilterUsed::None => None,
            FilterUsed::Airline(airline) => Some(airline),
        }
    }

    pub fn is_filtered(&self) -> bool {
        matches!(self, FilterUsed::Airline(_))
    }
}

impl std::fmt::Display for FilterUsed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterUsed::None => f.write_str("none"),
            FilterUsed::Airline(airline) => f.write_str(airline),
        }
    }
}

impl Serialize for FilterUsed {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One retrieve + rerank pass.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub candidates: Vec<Candidate>,
    pub top_score: f32,
    pub filter: FilterUsed,
}

impl Attempt {
    pub fn new(candidates: Vec<Candidate>, filter: FilterUsed) -> Self {
        Self {
            top_score: top_score(&candidates),
            candidates,
            filter,
        }
    }
}

/// `true` when a filtered attempt scored under the floor.
pub fn should_retry_unfiltered(attempt: &Attempt, thresholds: &ConfidenceThresholds) -> bool {
    attempt.filter.is_filtered() && thresholds.below_floor(attempt.top_score)
}

/// Picks the attempt to return. Ties go to the filtered attempt.
pub fn choose_attempt(filtered: Attempt, unfiltered: Option<Attempt>) -> Attempt {
    match unfiltered {
        Some(alt) if alt.top_score > filtered.top_score => alt,
        _ => filtered,
    }
}

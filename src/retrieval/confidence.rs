use serde::Serialize;

use crate::constants::{
    HIGH_CONFIDENCE_THRESHOLD, LOW_CONFIDENCE_FLOOR, MEDIUM_CONFIDENCE_THRESHOLD,
};

/// How much the top rerank score supports answering from evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Below the floor: ask the user to clarify instead of answering.
    None,
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::None => "none",
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }

    pub fn needs_clarification(&self) -> bool {
        matches!(self, Confidence::None)
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score cut-offs. `floor` is also the airline-fallback trigger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceThresholds {
    pub floor: f32,
    pub medium: f32,
    pub high: f32,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            floor: LOW_CONFIDENCE_FLOOR,
            medium: MEDIUM_CONFIDENCE_THRESHOLD,
            high: HIGH_CONFIDENCE_THRESHOLD,
        }
    }
}

impl ConfidenceThresholds {
    pub fn with_floor(mut self, floor: f32) -> Self {
        self.floor = floor;
        self
    }

    pub fn classify(&self, score: f32) -> Confidence {
        if score < self.floor {
            Confidence::None
        } else if score >= self.high {
            Confidence::High
        } else if score >= self.medium {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }

    /// `true` when `score` is under the floor.
    pub fn below_floor(&self, score: f32) -> bool {
        score < self.floor
    }
}

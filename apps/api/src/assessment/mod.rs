//! Assessment: questionnaire vectorisation, scoring tables and follow-up
//! question generation, plus the coarse user profile types derived from them.

pub mod config;
pub mod questions;
pub mod vectorizer;

use serde::{Deserialize, Serialize};

pub use vectorizer::{vectorize_assessment, Answers, AssessmentVector};

/// Coarse user category driving course-level bias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Segment {
    Student,
    #[default]
    Professional,
}

/// Career stage used by per-item course scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum UserLevel {
    School,
    Undergraduate,
    Entry,
    #[default]
    Professional,
    Mid,
    Senior,
    Lead,
    Manager,
    Executive,
}

impl UserLevel {
    /// Mid-career or above: Mid, Senior, Lead, Manager, Executive.
    pub fn is_mid_or_above(self) -> bool {
        self >= UserLevel::Mid
    }
}

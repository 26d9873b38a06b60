//! Scoring & banding rules. Pure functions over numbers and skill lists; no I/O.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::assessment::{AssessmentVector, Segment};
use crate::matching::round_to;

/// Highest responsibility band.
pub const MAX_BAND: u8 = 4;

/// Skill fragments that imply a minimum responsibility band.
const COMPLEXITY_SIGNALS: [(&str, u8); 10] = [
    ("strategy", 3),
    ("leadership", 3),
    ("architecture", 3),
    ("management", 3),
    ("budgeting", 3),
    ("transformation", 4),
    ("board", 4),
    ("design patterns", 2),
    ("refactoring", 2),
    ("deployment", 1),
];

pub const MARKET_READY_THRESHOLD: f64 = 70.0;

fn lowered_set<S: AsRef<str>>(skills: &[S]) -> HashSet<String> {
    skills.iter().map(|s| s.as_ref().to_lowercase()).collect()
}

/// Case-insensitive count of `required` entries present in `skills`.
pub fn overlap_count<S: AsRef<str>>(skills: &[S], required: &[String]) -> usize {
    let have = lowered_set(skills);
    lowered_set(required).intersection(&have).count()
}

// ────────────────────────────────────────────────────────────────────────────
// Responsibility band
// ────────────────────────────────────────────────────────────────────────────

/// Band 0–4 from years of experience, raised by complexity signals in any skill.
pub fn estimate_band<S: AsRef<str>>(skills: &[S], years: f64) -> u8 {
    let mut band = if years >= 10.0 {
        4
    } else if years >= 6.0 {
        3
    } else if years >= 3.0 {
        2
    } else if years >= 1.0 {
        1
    } else {
        0
    };

    for skill in skills {
        let lowered = skill.as_ref().to_lowercase();
        for (signal, level) in COMPLEXITY_SIGNALS {
            if lowered.contains(signal) {
                band = band.max(level);
            }
        }
    }
    band
}

// ────────────────────────────────────────────────────────────────────────────
// Skill score
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnsweredQuestion {
    pub skill: Option<String>,
    pub is_correct: bool,
}

/// Blend of resume overlap, assessment correctness and task alignment (0–1).
pub fn skill_score<S: AsRef<str>>(
    resume_skills: &[S],
    answered: &[AnsweredQuestion],
    target_skills: &[String],
) -> f64 {
    if target_skills.is_empty() {
        return 0.0;
    }

    let resume = overlap_count(resume_skills, target_skills) as f64 / target_skills.len() as f64;
    let assessment = if answered.is_empty() {
        0.5
    } else {
        answered.iter().filter(|q| q.is_correct).count() as f64 / answered.len() as f64
    };
    let task = 1.0;

    let score = if resume_skills.is_empty() {
        assessment * 0.75 + task * 0.25
    } else {
        resume * 0.4 + assessment * 0.4 + task * 0.2
    };
    round_to(score, 2)
}

// ────────────────────────────────────────────────────────────────────────────
// Readiness
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadinessStage {
    #[serde(rename = "Development Phase")]
    DevelopmentPhase,
    #[serde(rename = "Market Ready")]
    MarketReady,
}

/// Overall score 0–100 plus each component as a percentage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessBreakdown {
    pub overall: f64,
    pub skills_match: f64,
    pub experience: f64,
    pub responsibility: f64,
    pub clarity: f64,
    pub communication: f64,
    pub stage: ReadinessStage,
}

/// Weights: skills 35, experience 25, responsibility 15, clarity 15, communication 10.
pub fn readiness<S: AsRef<str>>(
    user_skills: &[S],
    required: &[String],
    vector: &AssessmentVector,
) -> ReadinessBreakdown {
    let skill_pct = if required.is_empty() {
        0.0
    } else {
        overlap_count(user_skills, required) as f64 / lowered_set(required).len() as f64
    };
    let years = vector.experience_years.max(0.0);
    let exp_pct = (years / 5.0).min(1.0);
    let resp_pct = f64::from(estimate_band(user_skills, years)) / f64::from(MAX_BAND);
    let clarity_pct = (f64::from(vector.status_level) / 3.0).min(1.0);
    let comm_pct = if vector.has_intent() { 1.0 } else { 0.5 };

    let score = skill_pct * 35.0 + exp_pct * 25.0 + resp_pct * 15.0 + clarity_pct * 15.0 + comm_pct * 10.0;

    ReadinessBreakdown {
        overall: round_to(score, 1),
        skills_match: round_to(skill_pct * 100.0, 1),
        experience: round_to(exp_pct * 100.0, 1),
        responsibility: round_to(resp_pct * 100.0, 1),
        clarity: round_to(clarity_pct * 100.0, 1),
        communication: round_to(comm_pct * 100.0, 1),
        stage: if score < MARKET_READY_THRESHOLD {
            ReadinessStage::DevelopmentPhase
        } else {
            ReadinessStage::MarketReady
        },
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Transferability
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Low,
    Medium,
    High,
}

impl Difficulty {
    pub fn estimated_time(self) -> &'static str {
        match self {
            Difficulty::Low => "3-6 months",
            Difficulty::Medium => "6-12 months",
            Difficulty::High => "12+ months",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferabilityReport {
    pub transferable_skills_count: usize,
    pub missing_core_skills_count: usize,
    pub difficulty: Difficulty,
    pub estimated_time: String,
}

/// Compares the required skills of a current and a target role.
pub fn transferability(current_required: &[String], target_required: &[String]) -> TransferabilityReport {
    let current = lowered_set(current_required);
    let target = lowered_set(target_required);

    let shared = target.intersection(&current).count();
    let missing = target.difference(&current).count();

    let difficulty = if missing > 8 {
        Difficulty::High
    } else if missing > 4 {
        Difficulty::Medium
    } else {
        Difficulty::Low
    };

    TransferabilityReport {
        transferable_skills_count: shared,
        missing_core_skills_count: missing,
        difficulty,
        estimated_time: difficulty.estimated_time().to_string(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Top-ups and career direction
// ────────────────────────────────────────────────────────────────────────────

/// Course types worth adding for a jump from `current_band` to `target_band`.
pub fn top_ups(current_band: u8, target_band: u8, segment: Segment) -> Vec<String> {
    let mut out = Vec::new();
    if current_band < 2 && target_band >= 2 {
        out.push("Professional Certifications (AWS, PMP, etc.)".to_string());
    }
    if target_band >= 3 {
        out.push("Postgraduate Studies (MSc, MBA)".to_string());
    }
    if segment == Segment::Student && current_band == 0 {
        out.push("Academic Degree (BSc/BEng)".to_string());
    }
    out
}

const INTEREST_FIELDS: [(&str, &str); 6] = [
    ("math", "Engineering / Data Science"),
    ("art", "UI/UX Design / Creative Marketing"),
    ("business", "Management / Accounting / Logistics"),
    ("science", "Bio-Tech / Medicine / Engineering"),
    ("logic", "Software Engineering / Legal"),
    ("drawing", "Architecture / Graphic Design"),
];

pub const DEFAULT_DIRECTION: &str = "General Management / Social Sciences";

/// Interest keywords → broad fields for school-level students. First-seen order, no repeats.
pub fn career_direction<S: AsRef<str>>(interests: &[S]) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for interest in interests {
        let lowered = interest.as_ref().to_lowercase();
        for (keyword, field) in INTEREST_FIELDS {
            if lowered.contains(keyword) && !found.iter().any(|f| f == field) {
                found.push(field.to_string());
            }
        }
    }
    if found.is_empty() {
        found.push(DEFAULT_DIRECTION.to_string());
    }
    found
}

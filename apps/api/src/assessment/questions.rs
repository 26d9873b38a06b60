//! Follow-up assessment questions for a skill gap.
//!
//! One general question is drawn at random from each pool category, so the
//! follow-up varies between sessions. Gap-specific self-rating questions
//! follow, one per gap skill for the first five.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::models::QuestionPool;

const GAP_QUESTION_LIMIT: usize = 5;
const TECHNICAL_MARKERS: [&str; 6] = ["programming", "software", "data", "tool", "system", "engine"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionKind {
    General,
    Technical,
    #[serde(rename = "Soft Skill")]
    SoftSkill,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentQuestion {
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill: Option<String>,
    pub question: String,
    pub options: Vec<String>,
}

pub fn is_technical(skill: &str) -> bool {
    let lowered = skill.to_lowercase();
    TECHNICAL_MARKERS.iter().any(|m| lowered.contains(m))
}

pub fn generate_questions<R: Rng + ?Sized>(
    gap: &[String],
    pool: &QuestionPool,
    rng: &mut R,
) -> Vec<AssessmentQuestion> {
    let mut questions: Vec<AssessmentQuestion> = pool
        .iter()
        .filter_map(|(category, candidates)| {
            candidates.choose(rng).map(|q| AssessmentQuestion {
                kind: QuestionKind::General,
                category: Some(category.clone()),
                skill: None,
                question: q.question.clone(),
                options: q.options.clone(),
            })
        })
        .collect();

    questions.extend(gap.iter().take(GAP_QUESTION_LIMIT).map(|skill| gap_question(skill)));
    questions
}

fn gap_question(skill: &str) -> AssessmentQuestion {
    let (kind, question, options) = if is_technical(skill) {
        (
            QuestionKind::Technical,
            format!("How would you rate your hands-on experience with {skill}?"),
            [
                "None",
                "Beginner (Basic Syntax)",
                "Intermediate (Used in projects)",
                "Advanced (Expert)",
            ],
        )
    } else {
        (
            QuestionKind::SoftSkill,
            format!("Are you familiar with the concepts of {skill}?"),
            [
                "Not at all",
                "Somewhat familiar",
                "Very familiar",
                "Already proficient",
            ],
        )
    };

    AssessmentQuestion {
        kind,
        category: None,
        skill: Some(skill.to_string()),
        question,
        options: options.iter().map(|o| o.to_string()).collect(),
    }
}

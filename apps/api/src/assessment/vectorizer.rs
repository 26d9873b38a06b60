//! Assessment Vectorizer: questionnaire answers → `AssessmentVector`.
//!
//! Never fails. Unknown categorical answers resolve to baseline levels, an
//! empty intent section yields the empty-vector sentinel without touching the
//! encoder, and an encoder failure only leaves the intent embedding empty.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::assessment::config::{normalize_dashes, Competency, ScoringConfig};
use crate::assessment::{Segment, UserLevel};
use crate::embedding::{EmbeddingProvider, Vector};

/// Question id → answer text.
pub type Answers = HashMap<String, String>;

/// Open-text prompts: proud project, environment, success outcome, obstacles.
const INTENT_QUESTIONS: [&str; 4] = ["q13", "q14", "q15", "q16"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessmentVector {
    pub status_level: u8,
    pub experience_years: f64,
    pub responsibility_band: u8,
    pub problem_solving_score: u8,
    pub decision_making_score: u8,
    pub leadership_score: u8,
    pub adaptability_score: u8,
    pub initiative_score: u8,
    pub conflict_score: u8,
    pub intent_embedding: Vector,
    pub extracted_intent_skills: Vec<String>,
    pub budget_category: String,
    pub time_commitment: String,
    pub education_preference: String,
}

impl AssessmentVector {
    fn set_behaviour(&mut self, competency: Competency, score: u8) {
        let slot = match competency {
            Competency::ProblemSolving => &mut self.problem_solving_score,
            Competency::DecisionMaking => &mut self.decision_making_score,
            Competency::Leadership => &mut self.leadership_score,
            Competency::Adaptability => &mut self.adaptability_score,
            Competency::Initiative => &mut self.initiative_score,
            Competency::Conflict => &mut self.conflict_score,
        };
        *slot = score;
    }

    pub fn has_intent(&self) -> bool {
        !self.intent_embedding.is_empty()
    }

    /// No experience and at most undergraduate status.
    pub fn is_first_time_entrant(&self) -> bool {
        self.experience_years == 0.0 && self.status_level <= 1
    }

    pub fn segment(&self) -> Segment {
        if self.status_level <= 1 {
            Segment::Student
        } else {
            Segment::Professional
        }
    }

    pub fn user_level(&self) -> UserLevel {
        match self.status_level {
            0 => UserLevel::School,
            1 => UserLevel::Undergraduate,
            2 => UserLevel::Professional,
            _ => UserLevel::Senior,
        }
    }

    /// Budget ceiling in LKR for the stated budget bracket.
    pub fn budget_ceiling(&self) -> Option<f64> {
        match normalize_dashes(&self.budget_category).as_str() {
            "< 50k" => Some(50_000.0),
            "50k-200k" => Some(200_000.0),
            "200k-500k" => Some(500_000.0),
            "500k+" => Some(2_000_000.0),
            _ => None,
        }
    }

    /// Stated preference, or a level-appropriate default when none was given.
    pub fn education_preference_or_default(&self) -> String {
        let stated = self.education_preference.trim();
        if !stated.is_empty() && stated != "None" {
            return stated.to_string();
        }
        match self.status_level {
            0 => "Diploma",
            1 => "BSc",
            _ => "MSc",
        }
        .to_string()
    }
}

fn answer<'a>(answers: &'a Answers, key: &str, default: &'a str) -> &'a str {
    answers.get(key).map(String::as_str).unwrap_or(default)
}

pub fn vectorize_assessment(
    answers: &Answers,
    config: &ScoringConfig,
    market_skills: &[String],
    embedder: &dyn EmbeddingProvider,
) -> AssessmentVector {
    let mut vector = AssessmentVector {
        status_level: config.status_level(answer(answers, "status", "Undergraduate")),
        experience_years: config.experience_years(answer(answers, "total_experience", "None")),
        responsibility_band: config
            .responsibility_band(answer(answers, "responsibility_level", "Followed instructions")),
        budget_category: normalize_dashes(answer(answers, "budget_range", "None")),
        time_commitment: normalize_dashes(answer(answers, "weekly_time", "None")),
        education_preference: normalize_dashes(answer(answers, "education_type", "None")),
        ..Default::default()
    };

    for competency in Competency::ALL {
        let score = answers
            .get(competency.question_id())
            .map(|a| config.behaviour_score(competency, a))
            .unwrap_or(0);
        vector.set_behaviour(competency, score);
    }

    let intent = INTENT_QUESTIONS
        .iter()
        .filter_map(|q| answers.get(*q))
        .map(|a| normalize_dashes(a.trim()))
        .filter(|a| !a.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if intent.is_empty() {
        debug!("no intent text, skipping embedding");
        return vector;
    }

    match embedder.encode(&intent) {
        Ok(embedding) => vector.intent_embedding = embedding,
        Err(e) => warn!("intent embedding failed, continuing without it: {e}"),
    }

    let lowered = intent.to_lowercase();
    vector.extracted_intent_skills = market_skills
        .iter()
        .filter(|s| !s.is_empty() && lowered.contains(&s.to_lowercase()))
        .cloned()
        .collect();

    vector
}

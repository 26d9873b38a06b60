//! Layered scoring configuration for the assessment questionnaire.
//!
//! Built-in tables are merged with `scoring_config.json` once at load time;
//! file entries win per key. Lookups never fail: unknown answers resolve to
//! the baseline level of their table.

use std::collections::HashMap;

use serde::Deserialize;

/// Shape of `scoring_config.json`. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScoringOverrides {
    pub mapping: MappingOverrides,
    /// Competency category → answer text → score (0–3).
    pub assessment_logic: HashMap<String, HashMap<String, u8>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MappingOverrides {
    pub status: HashMap<String, u8>,
    pub experience: HashMap<String, f64>,
    pub responsibility: HashMap<String, u8>,
}

/// Behavioural competencies scored from the multiple-choice section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Competency {
    ProblemSolving,
    DecisionMaking,
    Leadership,
    Adaptability,
    Initiative,
    Conflict,
}

impl Competency {
    pub const ALL: [Competency; 6] = [
        Competency::ProblemSolving,
        Competency::DecisionMaking,
        Competency::Leadership,
        Competency::Adaptability,
        Competency::Initiative,
        Competency::Conflict,
    ];

    /// Question id carrying the answer for this competency.
    pub fn question_id(self) -> &'static str {
        match self {
            Competency::ProblemSolving => "q7",
            Competency::DecisionMaking => "q8",
            Competency::Leadership => "q9",
            Competency::Adaptability => "q10",
            Competency::Initiative => "q11",
            Competency::Conflict => "q12",
        }
    }

    /// Category name used in `assessment_logic`.
    pub fn config_key(self) -> &'static str {
        match self {
            Competency::ProblemSolving => "problem_solving",
            Competency::DecisionMaking => "decision_making",
            Competency::Leadership => "team_role",
            Competency::Adaptability => "adaptability",
            Competency::Initiative => "efficiency",
            Competency::Conflict => "conflict",
        }
    }
}

const BASELINE_STATUS: u8 = 1;

#[derive(Debug, Clone)]
pub struct ScoringConfig {
    status: HashMap<String, u8>,
    experience: HashMap<String, f64>,
    responsibility: HashMap<String, u8>,
    behaviour: HashMap<String, HashMap<String, u8>>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let status = [
            ("O/L Student", 0),
            ("A/L Student", 0),
            ("Undergraduate", 1),
            ("Graduate", 2),
            ("Working Professional", 3),
            ("Career Transitioning", 3),
        ];
        let experience = [
            ("None", 0.0),
            ("< 1 year", 0.5),
            ("1-3 years", 2.0),
            ("3-5 years", 4.0),
            ("5+ years", 6.0),
        ];
        let responsibility = [
            ("Followed instructions", 0),
            ("Completed independent tasks", 1),
            ("Planned tasks", 2),
            ("Supervised others", 3),
            ("Managed outcomes / budgets", 4),
        ];

        Self {
            status: owned(&status),
            experience: owned(&experience),
            responsibility: owned(&responsibility),
            behaviour: HashMap::new(),
        }
    }
}

impl ScoringConfig {
    /// Built-in defaults overlaid with file-supplied entries.
    pub fn layered(overrides: ScoringOverrides) -> Self {
        let mut config = Self::default();
        let MappingOverrides {
            status,
            experience,
            responsibility,
        } = overrides.mapping;

        config.status.extend(normalized_keys(status));
        config.experience.extend(normalized_keys(experience));
        config.responsibility.extend(normalized_keys(responsibility));
        for (category, answers) in overrides.assessment_logic {
            config
                .behaviour
                .entry(category)
                .or_default()
                .extend(normalized_keys(answers));
        }
        config
    }

    /// Ordinal 0–3. Unknown statuses resolve to undergraduate level.
    pub fn status_level(&self, answer: &str) -> u8 {
        self.status
            .get(&normalize_dashes(answer))
            .copied()
            .unwrap_or(BASELINE_STATUS)
    }

    pub fn experience_years(&self, answer: &str) -> f64 {
        self.experience
            .get(&normalize_dashes(answer))
            .copied()
            .unwrap_or(0.0)
    }

    /// Ordinal 0–4.
    pub fn responsibility_band(&self, answer: &str) -> u8 {
        self.responsibility
            .get(&normalize_dashes(answer))
            .copied()
            .unwrap_or(0)
    }

    pub fn behaviour_score(&self, competency: Competency, answer: &str) -> u8 {
        self.behaviour
            .get(competency.config_key())
            .and_then(|answers| answers.get(&normalize_dashes(answer)))
            .copied()
            .unwrap_or(0)
    }
}

/// Treats en-dash and em-dash as a plain hyphen.
pub fn normalize_dashes(s: &str) -> String {
    s.replace(['\u{2013}', '\u{2014}'], "-")
}

fn owned<V: Copy>(pairs: &[(&str, V)]) -> HashMap<String, V> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn normalized_keys<V>(map: HashMap<String, V>) -> impl Iterator<Item = (String, V)> {
    map.into_iter().map(|(k, v)| (normalize_dashes(&k), v))
}

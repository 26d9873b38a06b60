//! Career Progression Resolver.
//!
//! A fixed rule cascade, evaluated in order and accumulated:
//! internships for first-time entrants, data-driven promotions (or a generic
//! band promotion when the table has none), then horizontal transitions.

use serde::{Deserialize, Serialize};

use crate::assessment::AssessmentVector;
use crate::catalog::models::ProgressionPath;
use crate::matching::rules::MAX_BAND;

const BAND_LABELS: [&str; 5] = ["Intern", "Independent", "Professional", "Lead", "Executive"];
const INTERNSHIP_LIMIT: usize = 3;
const PROMOTION_LIMIT: usize = 2;
const TRANSITION_LIMIT: usize = 2;

const EXACT_TERM_POINTS: u32 = 5;
const PARTIAL_TERM_POINTS: u32 = 1;
const TRACK_MATCH_POINTS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressionKind {
    #[serde(rename = "Entry Level (Internship)")]
    Internship,
    #[serde(rename = "Vertical (Promotion)")]
    Promotion,
    #[serde(rename = "Horizontal (Transition)")]
    Transition,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressionEntry {
    #[serde(rename = "type")]
    pub kind: ProgressionKind,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_step: Option<String>,
    pub target_band: u8,
    pub typical_years: String,
    pub advice: String,
}

pub fn career_progression<S: AsRef<str>>(
    current_role: &str,
    band: u8,
    user_skills: &[S],
    vector: Option<&AssessmentVector>,
    table: &[ProgressionPath],
    alternates: &[String],
) -> Vec<ProgressionEntry> {
    let band = band.min(MAX_BAND);
    let role = current_role.trim();
    let mut entries = Vec::new();

    if vector.is_some_and(AssessmentVector::is_first_time_entrant) {
        entries.extend(internships(role, user_skills, table));
    }

    let promotions = promotions(role, band, table);
    if promotions.is_empty() {
        entries.push(generic_promotion(role, band));
    } else {
        entries.extend(promotions);
    }

    entries.extend(alternates.iter().take(TRANSITION_LIMIT).map(|alt| ProgressionEntry {
        kind: ProgressionKind::Transition,
        role: alt.clone(),
        current_step: None,
        target_band: band,
        typical_years: "6-12 months".to_string(),
        advice: "Leverage your existing skill overlap to switch domains.".to_string(),
    }));

    entries
}

fn internships<S: AsRef<str>>(role: &str, user_skills: &[S], table: &[ProgressionPath]) -> Vec<ProgressionEntry> {
    let mut terms: Vec<String> = user_skills
        .iter()
        .map(|s| s.as_ref().trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    let role_lower = role.to_lowercase();
    if !role_lower.is_empty() && role_lower != "none" {
        terms.push(role_lower.clone());
    }

    let mut scored: Vec<(u32, &ProgressionPath)> = table
        .iter()
        .filter(|row| row.current_role.to_lowercase().contains("intern"))
        .map(|row| {
            let text = format!("{} {} {}", row.track_name, row.next_role, row.requirements).to_lowercase();
            let mut score = 0;
            for term in &terms {
                if text.contains(term.as_str()) {
                    score += EXACT_TERM_POINTS;
                } else if term.split_whitespace().any(|t| text.contains(t)) {
                    score += PARTIAL_TERM_POINTS;
                }
            }
            if !role_lower.is_empty() && row.track_name.to_lowercase().contains(&role_lower) {
                score += TRACK_MATCH_POINTS;
            }
            (score, row)
        })
        .collect();

    // stable: with no scores at all this keeps table order
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    scored
        .into_iter()
        .take(INTERNSHIP_LIMIT)
        .map(|(_, row)| {
            let requirements = row.requirements.trim();
            ProgressionEntry {
                kind: ProgressionKind::Internship,
                role: row.next_role.clone(),
                current_step: Some(row.current_role.clone()),
                target_band: 1,
                typical_years: row.typical_years.clone(),
                advice: format!(
                    "Start here: {}",
                    if requirements.is_empty() {
                        "Gain foundational skills"
                    } else {
                        requirements
                    }
                ),
            }
        })
        .collect()
}

fn promotions(role: &str, band: u8, table: &[ProgressionPath]) -> Vec<ProgressionEntry> {
    let needle = role.to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    table
        .iter()
        .filter(|row| row.current_role.to_lowercase().contains(&needle))
        .take(PROMOTION_LIMIT)
        .map(|row| ProgressionEntry {
            kind: ProgressionKind::Promotion,
            role: row.next_role.clone(),
            current_step: None,
            target_band: (band + 1).min(MAX_BAND),
            typical_years: row.typical_years.clone(),
            advice: format!("Progression path: {}", row.requirements),
        })
        .collect()
}

fn generic_promotion(role: &str, band: u8) -> ProgressionEntry {
    let target = (band + 1).min(MAX_BAND);
    let from = BAND_LABELS[usize::from(band)];
    let to = BAND_LABELS[usize::from(target)];
    ProgressionEntry {
        kind: ProgressionKind::Promotion,
        role: format!("{to} {role}").trim().to_string(),
        current_step: None,
        target_band: target,
        typical_years: "2-4 years".to_string(),
        advice: format!("Focus on moving from {from} to {to} responsibilities."),
    }
}

//! Mentor matching by skill overlap, plus the sector-based suggestion list.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::catalog::models::Mentor;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentorMatch {
    pub id: Option<String>,
    pub name: String,
    pub title: String,
    pub company: Option<String>,
    pub specialization: Option<String>,
    pub score: u32,
    pub is_premium: bool,
    pub matched_skills: Vec<String>,
}

/// Score = 2 per overlapping skill, +3 when any user skill appears in the
/// specialization, +1 for a senior title. Ties keep input order.
pub fn match_mentors<S: AsRef<str>>(mentors: &[Mentor], user_skills: &[S], top_n: usize) -> Vec<MentorMatch> {
    let wanted: Vec<String> = user_skills
        .iter()
        .map(|s| s.as_ref().trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    let wanted_set: HashSet<&str> = wanted.iter().map(String::as_str).collect();

    let mut scored: Vec<MentorMatch> = mentors
        .iter()
        .map(|mentor| {
            let listed = mentor
                .skills
                .as_ref()
                .map(|s| s.normalized())
                .unwrap_or_default();

            let matched: Vec<String> = if listed.is_empty() {
                let blob = format!(
                    "{} {}",
                    mentor.bio.as_deref().unwrap_or(""),
                    mentor.expertise.as_deref().unwrap_or("")
                )
                .to_lowercase();
                wanted.iter().filter(|s| blob.contains(s.as_str())).cloned().collect()
            } else {
                listed
                    .into_iter()
                    .filter(|s| wanted_set.contains(s.as_str()))
                    .collect()
            };

            let mut score = 2 * matched.len() as u32;

            let specialization = mentor.specialization.as_deref().unwrap_or("").to_lowercase();
            if wanted.iter().any(|s| specialization.contains(s.as_str())) {
                score += 3;
            }
            if mentor
                .title
                .as_deref()
                .is_some_and(|t| t.to_lowercase().contains("senior"))
            {
                score += 1;
            }

            MentorMatch {
                id: mentor.id.clone(),
                name: mentor.name.clone(),
                title: mentor
                    .current_role
                    .clone()
                    .or_else(|| mentor.title.clone())
                    .unwrap_or_else(|| "Mentor".to_string()),
                company: mentor.company.clone(),
                specialization: mentor.specialization.clone(),
                score,
                is_premium: mentor.premium(),
                matched_skills: matched,
            }
        })
        .collect();

    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(top_n);
    scored
}

pub const DEFAULT_MENTORS: [&str; 2] = ["PathFinder+ Alumni", "Industry Professional"];
const SUGGESTION_LIMIT: usize = 3;

/// "Name (Title at Company)" for mentors whose sector or title mentions the
/// query; the first three mentors when none do.
pub fn suggest_mentors(mentors: &[Mentor], sector_or_role: &str) -> Vec<String> {
    if mentors.is_empty() {
        return DEFAULT_MENTORS.iter().map(|s| s.to_string()).collect();
    }

    let query = sector_or_role.trim().to_lowercase();
    let mentions = |field: &Option<String>| {
        field
            .as_deref()
            .is_some_and(|f| f.to_lowercase().contains(&query))
    };

    let relevant: Vec<&Mentor> = if query.is_empty() {
        Vec::new()
    } else {
        mentors
            .iter()
            .filter(|m| mentions(&m.sector) || mentions(&m.title))
            .collect()
    };

    let chosen: Vec<&Mentor> = if relevant.is_empty() {
        mentors.iter().take(SUGGESTION_LIMIT).collect()
    } else {
        relevant.into_iter().take(SUGGESTION_LIMIT).collect()
    };

    chosen
        .into_iter()
        .map(|m| {
            format!(
                "{} ({} at {})",
                m.name,
                m.title.as_deref().unwrap_or("Mentor"),
                m.company.as_deref().unwrap_or("Independent")
            )
        })
        .collect()
}

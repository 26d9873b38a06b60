//! Resume profiling: text extraction, market-skill spotting and a suggested
//! occupation for the resulting skill set.

pub mod handlers;

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::matching::engine::Engine;
use crate::matching::rules::estimate_band;

const MAX_EXTRACTED_SKILLS: usize = 15;
/// Shorter market terms ("r", "go", "sql") match too much running text.
const MIN_SKILL_CHARS: usize = 4;

#[derive(Debug, Error)]
pub enum ResumeError {
    #[error("could not read PDF: {0}")]
    Pdf(String),

    #[error("no text found in document")]
    Empty,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResumeProfile {
    pub extracted_skills: Vec<String>,
    pub suggested_role: String,
    pub responsibility_band: u8,
}

pub fn pdf_text(bytes: &[u8]) -> Result<String, ResumeError> {
    let text = pdf_extract::extract_text_from_mem(bytes).map_err(|e| ResumeError::Pdf(e.to_string()))?;
    if text.trim().is_empty() {
        return Err(ResumeError::Empty);
    }
    Ok(text)
}

/// Market skills found in `text` as whole, space-delimited phrases.
/// Title-cased, first-seen order, at most fifteen.
pub fn extract_skills(text: &str, market_skills: &[String]) -> Vec<String> {
    let haystack = format!(" {} ", normalize(text));
    let mut seen = HashSet::new();

    market_skills
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| s.chars().count() >= MIN_SKILL_CHARS)
        .filter(|s| haystack.contains(&format!(" {s} ")))
        .filter(|s| seen.insert(s.clone()))
        .take(MAX_EXTRACTED_SKILLS)
        .map(|s| title_case(&s))
        .collect()
}

/// Lowercase, with punctuation other than skill-name symbols turned into spaces.
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '+' | '#' | '.' | '-') {
                c
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .map(|w| w.trim_end_matches('.'))
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(skill: &str) -> String {
    skill
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Skills, suggested occupation and band for a plain-text resume.
pub fn profile_text(engine: &Engine, text: &str) -> ResumeProfile {
    let extracted_skills = extract_skills(text, &engine.catalog().market_skills);
    debug!("resume yielded {} market skills", extracted_skills.len());
    let suggested_role = engine.auto_profile(&extracted_skills);
    ResumeProfile {
        responsibility_band: estimate_band(&extracted_skills, 0.0),
        extracted_skills,
        suggested_role,
    }
}

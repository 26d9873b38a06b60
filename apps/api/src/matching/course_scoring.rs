//! Per-item contextual scoring for courses and academic programmes.
//!
//! Raw similarity is adjusted by level fit, location and budget/duration
//! ceilings. Over-budget items are penalised, never dropped, so they stay
//! visible at the bottom of the list.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::assessment::{Segment, UserLevel};
use crate::catalog::models::{CourseRecord, PriceEstimate, PricingConfig};
use crate::matching::{round_to, with_thousands};

const LOCATION_BOOST: f64 = 1.3;
const CEILING_PENALTY: f64 = 0.1;
/// Academic programmes rank below professional courses of equal similarity.
pub const SUPPLEMENTARY_PENALTY: f64 = 0.6;
const MAX_REASONS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CourseLevel {
    Postgraduate,
    #[serde(rename = "Academic (Degree)")]
    AcademicDegree,
    #[serde(rename = "Academic (Diploma)")]
    AcademicDiploma,
    Professional,
    Beginner,
    #[serde(rename = "Mid-Level")]
    MidLevel,
}

impl CourseLevel {
    pub fn label(self) -> &'static str {
        match self {
            CourseLevel::Postgraduate => "Postgraduate",
            CourseLevel::AcademicDegree => "Academic (Degree)",
            CourseLevel::AcademicDiploma => "Academic (Diploma)",
            CourseLevel::Professional => "Professional",
            CourseLevel::Beginner => "Beginner",
            CourseLevel::MidLevel => "Mid-Level",
        }
    }
}

/// Checked in order; postgraduate first so "MSc in Engineering" is not a degree.
const LEVEL_KEYWORDS: [(CourseLevel, &[&str]); 5] = [
    (
        CourseLevel::Postgraduate,
        &["msc", "master", "phd", "doctorate", "postgraduate", "mba"],
    ),
    (
        CourseLevel::AcademicDegree,
        &["degree", "bsc", "bachelor", "undergraduate"],
    ),
    (CourseLevel::AcademicDiploma, &["diploma", "hnd", "foundation"]),
    (
        CourseLevel::Professional,
        &["advanced", "professional", "expert", "architect", "management"],
    ),
    (
        CourseLevel::Beginner,
        &["intro", "basic", "beginner", "fundamental", "bootcamp"],
    ),
];

pub fn classify_level(title: &str, duration: &str) -> CourseLevel {
    let text = format!("{title} {duration}").to_lowercase();
    LEVEL_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
        .map(|(level, _)| *level)
        .unwrap_or(CourseLevel::MidLevel)
}

/// Segment × level multiplier.
pub fn level_multiplier(segment: Segment, user_level: UserLevel, level: CourseLevel) -> f64 {
    use CourseLevel::*;
    match segment {
        Segment::Student => match level {
            Professional => 0.5,
            Postgraduate => 0.2,
            AcademicDegree => 1.8,
            AcademicDiploma => 1.4,
            _ => 1.0,
        },
        Segment::Professional if user_level.is_mid_or_above() => match level {
            AcademicDegree => 0.15,
            Postgraduate => 1.8,
            Professional => 1.6,
            _ => 1.0,
        },
        Segment::Professional => match level {
            AcademicDegree => 0.8,
            Professional => 1.8,
            _ => 1.0,
        },
    }
}

/// Numeric fee, else the first number in the cost text, else 0.
pub fn effective_fee(course: &CourseRecord) -> f64 {
    if let Some(fee) = course.fee_numeric.filter(|f| *f > 0.0) {
        return fee;
    }
    course
        .cost
        .as_deref()
        .and_then(first_number)
        .unwrap_or(0.0)
}

fn first_number(text: &str) -> Option<f64> {
    let cleaned = text.replace(',', "");
    let digits: String = cleaned
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Provider-specific estimate first, then the level average, then "Contact Provider".
pub fn estimate_price(pricing: &PricingConfig, level: CourseLevel, provider: Option<&str>) -> PriceEstimate {
    if let Some(provider) = provider.map(str::to_lowercase).filter(|p| !p.is_empty()) {
        let hit = pricing
            .provider_estimates
            .iter()
            .find(|(key, _)| provider.contains(&key.to_lowercase()));
        if let Some((_, value)) = hit {
            return PriceEstimate {
                duration: "Varies".to_string(),
                fee: format!("~{} (Est)", display_estimate(value)),
            };
        }
    }

    pricing
        .level_averages
        .get(level.label())
        .cloned()
        .unwrap_or_else(|| PriceEstimate {
            duration: "Contact Provider".to_string(),
            fee: "Contact Provider".to_string(),
        })
}

fn display_estimate(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n
            .as_f64()
            .filter(|v| *v >= 0.0)
            .map(|v| with_thousands(v.round() as u64))
            .unwrap_or_else(|| n.to_string()),
        other => other.to_string(),
    }
}

/// What the user brings to the scoring of one result list.
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub segment: Segment,
    pub user_level: UserLevel,
    pub location: Option<&'a str>,
    pub max_budget: Option<f64>,
    pub max_duration: Option<f64>,
    pub gap: &'a [String],
    pub pricing: &'a PricingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseRecommendation {
    pub course_name: String,
    pub provider: String,
    pub level: CourseLevel,
    #[serde(rename = "type")]
    pub course_type: String,
    pub duration: String,
    pub fee: String,
    pub fee_numeric: f64,
    pub location: String,
    pub relevance_score: f64,
    pub why: Vec<String>,
}

impl CourseRecommendation {
    /// Supplementary-source penalty for academic programmes.
    pub fn into_supplementary(mut self) -> Self {
        self.relevance_score = round_to(self.relevance_score * SUPPLEMENTARY_PENALTY, 3);
        self
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("nan"))
}

pub fn score_course(course: &CourseRecord, similarity: f32, ctx: &ScoringContext<'_>) -> CourseRecommendation {
    let duration_text = course.duration.as_deref().unwrap_or("");
    let level = classify_level(&course.course_title, duration_text);
    let mut score = f64::from(similarity) * level_multiplier(ctx.segment, ctx.user_level, level);

    let location_filter = ctx.location.map(str::trim).filter(|l| !l.is_empty());
    let location_match = match (location_filter, course.location.as_deref()) {
        (Some(wanted), Some(actual)) => actual.to_lowercase().contains(&wanted.to_lowercase()),
        _ => false,
    };
    if location_match {
        score *= LOCATION_BOOST;
    }

    let fee = effective_fee(course);
    if ctx.max_budget.is_some_and(|budget| fee > budget) {
        score *= CEILING_PENALTY;
    }
    let months = course.duration_numeric.unwrap_or(0.0);
    if ctx.max_duration.is_some_and(|max| months > max) {
        score *= CEILING_PENALTY;
    }

    let provider = non_empty(course.provider.as_deref());
    let estimate = estimate_price(ctx.pricing, level, provider);
    let duration = non_empty(course.duration.as_deref())
        .map(String::from)
        .unwrap_or(estimate.duration);
    let fee_display = match non_empty(course.cost.as_deref()) {
        Some(cost) => cost.to_string(),
        None if fee > 0.0 => format!("{} LKR", with_thousands(fee.round() as u64)),
        None => estimate.fee,
    };

    let mut why = Vec::new();
    if ctx.segment == Segment::Student && level == CourseLevel::AcademicDegree {
        why.push("Core academic foundation".to_string());
    }
    if let (true, Some(wanted)) = (location_match, location_filter) {
        why.push(format!("Located in {wanted}"));
    }
    let title = course.course_title.to_lowercase();
    for skill in ctx.gap.iter().take(2) {
        if title.contains(&skill.to_lowercase()) {
            why.push(format!("Teaches {skill}"));
        }
    }
    why.truncate(MAX_REASONS);

    CourseRecommendation {
        course_name: course.course_title.clone(),
        provider: provider.unwrap_or("Unknown Institution").to_string(),
        level,
        course_type: non_empty(course.course_type.as_deref())
            .unwrap_or("Unknown")
            .to_string(),
        duration,
        fee: fee_display,
        fee_numeric: fee,
        location: non_empty(course.location.as_deref())
            .unwrap_or("Online/Distance")
            .to_string(),
        relevance_score: round_to(score, 3),
        why,
    }
}

/// Sorts by relevance, highest first, keeping input order among ties.
pub fn rank(mut items: Vec<CourseRecommendation>, top_n: usize) -> Vec<CourseRecommendation> {
    items.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
    items.truncate(top_n);
    items
}

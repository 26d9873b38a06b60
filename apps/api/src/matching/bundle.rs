//! The typed result of a recommendation call.
//!
//! A bundle is assembled in one constructor expression at the end of the
//! orchestrator; nothing partially built escapes an early return.

use serde::Serialize;

use crate::assessment::questions::AssessmentQuestion;
use crate::matching::action_plan::PlanPhase;
use crate::matching::course_scoring::CourseRecommendation;
use crate::matching::mentors::MentorMatch;
use crate::matching::progression::ProgressionEntry;
use crate::matching::rules::ReadinessBreakdown;
use crate::matching::trends::MarketTrends;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status")]
pub enum RecommendationBundle {
    /// The user already holds every required skill; nothing was searched.
    Complete(CompleteBundle),
    Incomplete(Box<FullBundle>),
}

impl RecommendationBundle {
    pub fn is_complete(&self) -> bool {
        matches!(self, RecommendationBundle::Complete(_))
    }

    pub fn mapped_occupation(&self) -> &str {
        match self {
            RecommendationBundle::Complete(b) => &b.mapped_occupation,
            RecommendationBundle::Incomplete(b) => &b.mapped_occupation,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CompleteBundle {
    pub mapped_occupation: String,
    pub responsibility_band: u8,
    pub skill_score: f64,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FullBundle {
    pub mapped_occupation: String,
    pub responsibility_band: u8,
    pub compulsory_skills: Vec<String>,
    pub optional_skills: Vec<String>,
    pub questions: Vec<AssessmentQuestion>,
    pub recommendations: Vec<CourseRecommendation>,
    pub academic_recommendations: Vec<CourseRecommendation>,
    pub job_ideas: Vec<JobIdea>,
    pub mentors: Vec<MentorMatch>,
    pub alternate_paths: Vec<String>,
    pub career_progression: Vec<ProgressionEntry>,
    pub salary_estimate: String,
    pub readiness: ReadinessBreakdown,
    pub action_plan: Vec<PlanPhase>,
    pub market_trends: MarketTrends,
    pub caveats: Vec<String>,
    pub top_ups: Vec<String>,
    pub occupation_hierarchy: Vec<String>,
}

/// A job posting matched to the gap, or the single placeholder standing in
/// for an empty or failed search.
#[derive(Debug, Clone, Serialize)]
pub struct JobIdea {
    pub job_title: String,
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_gap_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_salary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl JobIdea {
    pub fn no_openings(role: &str) -> Self {
        Self::placeholder(
            "No specific openings found",
            "Market Research Advised",
            format!("No current postings closely match the gap for {role}. Check back as new listings arrive."),
        )
    }

    pub fn service_unavailable() -> Self {
        Self::placeholder(
            "Job service unavailable",
            "N/A",
            "Job matching could not run for this request.".to_string(),
        )
    }

    fn placeholder(title: &str, company: &str, message: String) -> Self {
        Self {
            job_title: title.to_string(),
            company: company.to_string(),
            location: None,
            deadline: None,
            url: None,
            skill_gap_pct: None,
            relevance_score: None,
            estimated_salary: None,
            message: Some(message),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.message.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_tag_serializes() {
        let bundle = RecommendationBundle::Complete(CompleteBundle {
            mapped_occupation: "data analyst".into(),
            responsibility_band: 1,
            skill_score: 0.75,
            message: "No skill gap detected for this role.".into(),
        });
        let json = serde_json::to_value(&bundle).unwrap();
        assert_eq!(json["status"], "Complete");
        assert_eq!(json["mapped_occupation"], "data analyst");
        assert!(bundle.is_complete());
    }

    #[test]
    fn test_placeholders_carry_message_only() {
        let idea = JobIdea::no_openings("Data Analyst");
        assert!(idea.is_placeholder());
        let json = serde_json::to_value(&idea).unwrap();
        assert_eq!(json["job_title"], "No specific openings found");
        assert!(json.get("skill_gap_pct").is_none());
        assert!(JobIdea::service_unavailable().is_placeholder());
    }
}

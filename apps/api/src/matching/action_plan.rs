//! Twelve-month action plan driven by the top gap skills.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanPhase {
    pub period: String,
    pub focus: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone: Option<String>,
}

fn phase(period: &str, focus: String, milestone: &str) -> PlanPhase {
    PlanPhase {
        period: period.to_string(),
        focus,
        milestone: Some(milestone.to_string()),
    }
}

/// Four quarterly phases built from the first two gap skills and the next
/// three; a single maintenance phase when there is no gap.
pub fn action_plan(gap: &[String], target_role: &str) -> Vec<PlanPhase> {
    let Some(first) = gap.first() else {
        return vec![PlanPhase {
            period: "Months 1-12".to_string(),
            focus: format!("Maintenance: Already industry-ready for {target_role}. focus on networking."),
            milestone: None,
        }];
    };

    let core = &gap[..gap.len().min(2)];
    let next = gap.get(2).map(String::as_str).unwrap_or("Specialization");

    vec![
        phase(
            "Months 1-3",
            format!("Foundations: Master {}", core.join(", ")),
            "Complete initial technical baseline",
        ),
        phase(
            "Months 4-6",
            format!("Building: Portfolio projects using {first}"),
            "Github repository with 3+ projects",
        ),
        phase(
            "Months 7-9",
            format!("Visibility: Certification in {next} and Internship hunt"),
            "Updated resume with newly acquired skills",
        ),
        phase(
            "Months 10-12",
            format!("Placement: Advanced {target_role} interview prep and Mentorship"),
            "Full-time role placement",
        ),
    ]
}

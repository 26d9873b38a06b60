//! Typed rows for every table the engine consumes.
//!
//! Every field carries a default so an absent column decodes instead of failing
//! the row. Numeric money/duration fields go through `lenient_number`, which
//! turns unparseable values into `None`.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ────────────────────────────────────────────────────────────────────────────
// Taxonomy tables
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Occupation {
    #[serde(alias = "concept_uri", alias = "uri")]
    pub concept_uri: String,
    #[serde(alias = "preferred_label", alias = "label")]
    pub preferred_label: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Skill {
    #[serde(alias = "concept_uri", alias = "uri")]
    pub concept_uri: String,
    #[serde(alias = "preferred_label", alias = "label")]
    pub preferred_label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationType {
    Essential,
    Optional,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupationSkillRelation {
    #[serde(alias = "occupation_uri")]
    pub occupation_uri: String,
    #[serde(alias = "skill_uri")]
    pub skill_uri: String,
    #[serde(alias = "relation_type")]
    pub relation_type: RelationType,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BroaderRelation {
    #[serde(alias = "concept_uri")]
    pub concept_uri: String,
    #[serde(alias = "broader_uri")]
    pub broader_uri: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Corpus tables
// ────────────────────────────────────────────────────────────────────────────

/// A professional course or an academic programme. Both corpora share the shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseRecord {
    #[serde(alias = "course_name", alias = "title")]
    pub course_title: String,
    #[serde(alias = "institute")]
    pub provider: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub duration: Option<String>,
    pub cost: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub fee_numeric: Option<f64>,
    /// Duration in months, when the source states one.
    #[serde(deserialize_with = "lenient_number")]
    pub duration_numeric: Option<f64>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub course_type: Option<String>,
}

impl CourseRecord {
    /// Text fed to the encoder: title, category and description.
    pub fn embedding_text(&self) -> String {
        format!(
            "{} {} {}",
            self.course_title,
            self.category.as_deref().unwrap_or(""),
            self.description.as_deref().unwrap_or("")
        )
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobRecord {
    pub title: String,
    pub company: Option<String>,
    pub location: Option<String>,
    #[serde(alias = "job_url")]
    pub url: Option<String>,
    pub deadline: Option<String>,
    pub description: Option<String>,
    /// Comma-separated skill list produced by the cleaning pipeline.
    pub extracted_skills: Option<String>,
}

impl JobRecord {
    pub fn skill_list(&self) -> Vec<String> {
        self.extracted_skills
            .as_deref()
            .map(split_skill_list)
            .unwrap_or_default()
    }
}

pub fn split_skill_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Mentors, progressions, salaries
// ────────────────────────────────────────────────────────────────────────────

/// Mentor skills arrive either as a JSON list or as a comma-separated string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MentorSkills {
    List(Vec<String>),
    Text(String),
}

impl MentorSkills {
    pub fn normalized(&self) -> Vec<String> {
        match self {
            MentorSkills::List(items) => items
                .iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            MentorSkills::Text(raw) => split_skill_list(raw)
                .into_iter()
                .map(|s| s.to_lowercase())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Mentor {
    pub id: Option<String>,
    pub name: String,
    pub title: Option<String>,
    pub current_role: Option<String>,
    pub company: Option<String>,
    pub sector: Option<String>,
    pub skills: Option<MentorSkills>,
    pub bio: Option<String>,
    pub expertise: Option<String>,
    pub specialization: Option<String>,
    pub tier: Option<String>,
    pub is_premium: bool,
}

impl Mentor {
    pub fn premium(&self) -> bool {
        self.is_premium || self.tier.as_deref() == Some("Premium")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionPath {
    pub track_name: String,
    pub current_role: String,
    pub next_role: String,
    pub typical_years: String,
    pub requirements: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SalaryRecord {
    #[serde(alias = "title")]
    pub job_title: String,
    #[serde(deserialize_with = "lenient_number")]
    pub salary_min: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub salary_max: Option<f64>,
}

// ────────────────────────────────────────────────────────────────────────────
// Configuration tables
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceEstimate {
    pub duration: String,
    pub fee: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Provider-name fragment → typical fee.
    pub provider_estimates: BTreeMap<String, Value>,
    /// Course level label → display estimate.
    pub level_averages: BTreeMap<String, PriceEstimate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolQuestion {
    pub question: String,
    pub options: Vec<String>,
}

/// Category → general competency questions.
pub type QuestionPool = BTreeMap<String, Vec<PoolQuestion>>;

/// Accepts `12000`, `"12000"`, `"12,000"`; anything else becomes `None`.
pub fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.replace(',', "").trim().parse::<f64>().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_course_aliases_and_lenient_numbers() {
        let course: CourseRecord = serde_json::from_value(json!({
            "course_name": "BSc in Computing",
            "institute": "SLIIT",
            "fee_numeric": "1,200,000",
            "duration_numeric": "N/A",
            "type": "Degree"
        }))
        .unwrap();
        assert_eq!(course.course_title, "BSc in Computing");
        assert_eq!(course.provider.as_deref(), Some("SLIIT"));
        assert_eq!(course.fee_numeric, Some(1_200_000.0));
        assert_eq!(course.duration_numeric, None);
        assert_eq!(course.course_type.as_deref(), Some("Degree"));
    }

    #[test]
    fn test_missing_columns_default() {
        let job: JobRecord = serde_json::from_value(json!({"title": "Data Analyst"})).unwrap();
        assert!(job.company.is_none());
        assert!(job.skill_list().is_empty());
    }

    #[test]
    fn test_job_skill_list_splits_and_trims() {
        let job = JobRecord {
            extracted_skills: Some(" python, sql ,,excel ".to_string()),
            ..Default::default()
        };
        assert_eq!(job.skill_list(), vec!["python", "sql", "excel"]);
    }

    #[test]
    fn test_mentor_skills_list_or_text() {
        let list: MentorSkills = serde_json::from_value(json!(["Python", " SQL "])).unwrap();
        let text: MentorSkills = serde_json::from_value(json!("Python, SQL")).unwrap();
        assert_eq!(list.normalized(), vec!["python", "sql"]);
        assert_eq!(text.normalized(), vec!["python", "sql"]);
    }

    #[test]
    fn test_mentor_premium_from_tier_or_flag() {
        let by_tier = Mentor {
            tier: Some("Premium".to_string()),
            ..Default::default()
        };
        let by_flag = Mentor {
            is_premium: true,
            ..Default::default()
        };
        assert!(by_tier.premium());
        assert!(by_flag.premium());
        assert!(!Mentor::default().premium());
    }

    #[test]
    fn test_relation_type_serde() {
        let rel: OccupationSkillRelation = serde_json::from_value(json!({
            "occupationUri": "occ/1",
            "skillUri": "skill/1",
            "relationType": "essential"
        }))
        .unwrap();
        assert_eq!(rel.relation_type, RelationType::Essential);
    }
}

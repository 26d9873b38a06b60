//! Market trend snapshot per broad field.
//!
//! The analysis itself sits behind `TrendAnalyzer`; the engine only detects
//! the field and memoises the result. The cache lives for the engine's
//! lifetime with no eviction: there are four fields.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::models::JobRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "IT")]
    It,
    Business,
    Marketing,
    General,
}

const IT_ROLE_WORDS: &[&str] = &[
    "software", "developer", "data", "it", "web", "cloud", "engineer", "network", "ai", "tech",
];
const BUSINESS_ROLE_WORDS: &[&str] = &[
    "manager", "business", "analyst", "finance", "accounting", "hr", "sales", "operations",
];
const MARKETING_ROLE_WORDS: &[&str] = &["marketing", "social media", "content", "brand", "seo"];

impl Field {
    /// Keywords a posting's title or description must mention to count
    /// towards this field.
    fn posting_keywords(self) -> &'static [&'static str] {
        match self {
            Field::It => &[
                "software",
                "developer",
                "data scientist",
                "devops",
                "java",
                "python",
                "javascript",
                "cloud",
                "aws",
                "azure",
                "network",
                "security",
                "ai",
                "machine learning",
            ],
            Field::Business => &[
                "business analyst",
                "finance",
                "accounting",
                "hr",
                "operations",
                "sales manager",
                "strategy",
                "consultant",
            ],
            Field::Marketing => &[
                "digital marketing",
                "seo",
                "content writer",
                "social media manager",
                "brand manager",
                "advertising",
            ],
            Field::General => &["general"],
        }
    }
}

/// Lowercased words padded with spaces, so `" kw "` lookups match whole words
/// and whole phrases only.
fn word_text(text: &str) -> String {
    let words: Vec<String> = text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(String::from)
        .collect();
    format!(" {} ", words.join(" "))
}

fn mentions_any(words: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| words.contains(&format!(" {k} ")))
}

/// IT, then Business, then Marketing; General when nothing matches.
pub fn detect_field(role: &str) -> Field {
    let words = word_text(role);
    if mentions_any(&words, IT_ROLE_WORDS) {
        Field::It
    } else if mentions_any(&words, BUSINESS_ROLE_WORDS) {
        Field::Business
    } else if mentions_any(&words, MARKETING_ROLE_WORDS) {
        Field::Marketing
    } else {
        Field::General
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendSegment {
    pub segment: String,
    pub roles: Vec<String>,
    pub demand: usize,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillDemand {
    pub skill: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketTrends {
    pub field: Field,
    pub segments: Vec<TrendSegment>,
    pub top_demanded_skills: Vec<SkillDemand>,
}

/// Per-field market analysis over the job corpus.
pub trait TrendAnalyzer: Send + Sync {
    /// Demand segments for a field and the postings they were drawn from.
    fn trends_by_field<'a>(&self, field: Field, jobs: &'a [JobRecord]) -> (Vec<TrendSegment>, Vec<&'a JobRecord>);

    /// The `k` most frequent skills across `subset`.
    fn hot_skills(&self, k: usize, subset: &[&JobRecord]) -> Vec<SkillDemand>;
}

const SEGMENT_LIMIT: usize = 5;
const SEGMENT_SKILLS: usize = 5;
pub const HOT_SKILL_COUNT: usize = 5;

/// Groups matching postings by title and counts their extracted skills.
pub struct KeywordTrendAnalyzer;

impl TrendAnalyzer for KeywordTrendAnalyzer {
    fn trends_by_field<'a>(&self, field: Field, jobs: &'a [JobRecord]) -> (Vec<TrendSegment>, Vec<&'a JobRecord>) {
        let keywords = field.posting_keywords();
        let subset: Vec<&JobRecord> = jobs
            .iter()
            .filter(|job| {
                let text = format!("{} {}", job.title, job.description.as_deref().unwrap_or(""));
                mentions_any(&word_text(&text), keywords)
            })
            .collect();

        if subset.is_empty() {
            let fallback = TrendSegment {
                segment: "Market Average".to_string(),
                roles: Vec::new(),
                demand: 0,
                skills: vec!["COMMUNICATION".to_string(), "ADAPTIVE LEARNING".to_string()],
            };
            return (vec![fallback], jobs.iter().collect());
        }

        // title key → (display title, postings), first-seen order
        let mut groups: Vec<(String, String, Vec<&JobRecord>)> = Vec::new();
        for job in &subset {
            let key = job.title.trim().to_lowercase();
            match groups.iter_mut().find(|(k, _, _)| *k == key) {
                Some((_, _, members)) => members.push(job),
                None => groups.push((key, job.title.trim().to_string(), vec![job])),
            }
        }

        let mut segments: Vec<TrendSegment> = groups
            .into_iter()
            .map(|(_, title, members)| TrendSegment {
                segment: title.clone(),
                roles: vec![title],
                demand: members.len(),
                skills: count_skills(&members)
                    .into_iter()
                    .take(SEGMENT_SKILLS)
                    .map(|d| d.skill.to_uppercase())
                    .collect(),
            })
            .collect();
        segments.sort_by(|a, b| b.demand.cmp(&a.demand));
        segments.truncate(SEGMENT_LIMIT);

        (segments, subset)
    }

    fn hot_skills(&self, k: usize, subset: &[&JobRecord]) -> Vec<SkillDemand> {
        let counted = count_skills(subset);
        if counted.is_empty() {
            return [("Problem Solving", 10), ("Communication", 8), ("Teamwork", 5)]
                .into_iter()
                .map(|(skill, count)| SkillDemand {
                    skill: skill.to_string(),
                    count,
                })
                .collect();
        }
        counted.into_iter().take(k).collect()
    }
}

/// Skill frequencies, most frequent first, ties in first-seen order.
fn count_skills(jobs: &[&JobRecord]) -> Vec<SkillDemand> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for skill in jobs.iter().flat_map(|j| j.skill_list()) {
        let key = skill.to_lowercase();
        let slot = counts.entry(key.clone()).or_insert(0);
        if *slot == 0 {
            order.push(key);
        }
        *slot += 1;
    }

    let mut out: Vec<SkillDemand> = order
        .into_iter()
        .map(|skill| SkillDemand {
            count: counts.get(&skill).copied().unwrap_or(0),
            skill,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}

/// Process-lifetime memo of one `MarketTrends` per field.
#[derive(Default)]
pub struct TrendCache {
    inner: Mutex<HashMap<Field, Arc<MarketTrends>>>,
}

impl TrendCache {
    pub fn get_or_compute(&self, field: Field, compute: impl FnOnce() -> MarketTrends) -> Arc<MarketTrends> {
        if let Some(hit) = self.inner.lock().get(&field) {
            debug!("trend cache hit for {field:?}");
            return Arc::clone(hit);
        }
        // computed outside the lock; a racing request may compute it twice
        let fresh = Arc::new(compute());
        let mut guard = self.inner.lock();
        Arc::clone(guard.entry(field).or_insert(fresh))
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(title: &str, skills: &str) -> JobRecord {
        JobRecord {
            title: title.to_string(),
            extracted_skills: Some(skills.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_detect_field_order_and_whole_words() {
        assert_eq!(detect_field("Software Engineer"), Field::It);
        assert_eq!(detect_field("Business Analyst"), Field::Business);
        assert_eq!(detect_field("Social Media Executive"), Field::Marketing);
        assert_eq!(detect_field("Registered Nurse"), Field::General);
        // "it" inside "audit" and "ai" inside "maintenance" are not words
        assert_eq!(detect_field("Audit Associate"), Field::General);
        assert_eq!(detect_field("Maintenance Supervisor"), Field::General);
        assert_eq!(detect_field("IT Manager"), Field::It, "IT is checked before Business");
    }

    #[test]
    fn test_segments_grouped_by_title_and_sorted_by_demand() {
        let jobs = vec![
            job("Python Developer", "python, django"),
            job("Java Developer", "java, spring"),
            job("Java Developer", "java, sql"),
            job("Nurse", "patient care"),
        ];
        let (segments, subset) = KeywordTrendAnalyzer.trends_by_field(Field::It, &jobs);
        assert_eq!(subset.len(), 3);
        assert_eq!(segments[0].segment, "Java Developer");
        assert_eq!(segments[0].demand, 2);
        assert_eq!(segments[0].skills[0], "JAVA");
        assert_eq!(segments[1].segment, "Python Developer");
    }

    #[test]
    fn test_no_matching_postings_returns_market_average() {
        let jobs = vec![job("Nurse", "patient care")];
        let (segments, subset) = KeywordTrendAnalyzer.trends_by_field(Field::Marketing, &jobs);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].segment, "Market Average");
        assert_eq!(segments[0].demand, 0);
        assert_eq!(subset.len(), 1, "fallback subset is the whole corpus");
    }

    #[test]
    fn test_hot_skills_counts_and_fallback() {
        let jobs = [job("A", "python, sql"), job("B", "Python"), job("C", "excel")];
        let refs: Vec<&JobRecord> = jobs.iter().collect();
        let hot = KeywordTrendAnalyzer.hot_skills(2, &refs);
        assert_eq!(hot.len(), 2);
        assert_eq!(hot[0].skill, "python");
        assert_eq!(hot[0].count, 2);

        let bare = JobRecord::default();
        let fallback = KeywordTrendAnalyzer.hot_skills(5, &[&bare]);
        assert_eq!(fallback[0].skill, "Problem Solving");
        assert_eq!(fallback.len(), 3);
    }

    #[test]
    fn test_cache_computes_once_per_field() {
        let cache = TrendCache::default();
        let mut calls = 0;
        let make = |field| MarketTrends {
            field,
            segments: Vec::new(),
            top_demanded_skills: Vec::new(),
        };

        cache.get_or_compute(Field::It, || {
            calls += 1;
            make(Field::It)
        });
        cache.get_or_compute(Field::It, || {
            calls += 1;
            make(Field::It)
        });
        assert_eq!(calls, 1);
        assert_eq!(cache.len(), 1);
    }
}

//! Salary lookup by role title.

use std::collections::HashMap;

use crate::catalog::models::SalaryRecord;
use crate::matching::with_thousands;

pub const SALARY_NOT_AVAILABLE: &str = "Data Not Available";

/// Lowercased title → display range, in load order for fuzzy scans.
#[derive(Debug, Clone, Default)]
pub struct SalaryTable {
    entries: Vec<(String, String)>,
    exact: HashMap<String, usize>,
}

impl SalaryTable {
    pub fn new(records: &[SalaryRecord]) -> Self {
        let mut table = Self::default();
        for record in records {
            let key = record.job_title.trim().to_lowercase();
            if key.is_empty() || table.exact.contains_key(&key) {
                continue;
            }
            let Some(display) = display_range(record.salary_min, record.salary_max) else {
                continue;
            };
            table.exact.insert(key.clone(), table.entries.len());
            table.entries.push((key, display));
        }
        table
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Exact title match, then the first stored title that contains or is
    /// contained by the query. Always returns a displayable string.
    pub fn lookup(&self, title: &str) -> String {
        let key = title.trim().to_lowercase();
        if key.is_empty() {
            return SALARY_NOT_AVAILABLE.to_string();
        }

        if let Some(&i) = self.exact.get(&key) {
            return self.entries[i].1.clone();
        }

        self.entries
            .iter()
            .find(|(stored, _)| stored.contains(&key) || key.contains(stored.as_str()))
            .map(|(_, display)| display.clone())
            .unwrap_or_else(|| SALARY_NOT_AVAILABLE.to_string())
    }
}

fn display_range(min: Option<f64>, max: Option<f64>) -> Option<String> {
    let fmt = |v: f64| with_thousands(v.max(0.0).round() as u64);
    match (min, max) {
        (Some(lo), Some(hi)) => Some(format!("{} - {} LKR", fmt(lo), fmt(hi))),
        (Some(lo), None) => Some(format!("From {} LKR", fmt(lo))),
        (None, Some(hi)) => Some(format!("Up to {} LKR", fmt(hi))),
        (None, None) => None,
    }
}

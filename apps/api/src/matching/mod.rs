//! Matching: the recommendation engine and the rule modules it composes.
//!
//! `engine::Engine` is the entry point: it owns the catalog, the embedding
//! provider and the trend cache, and exposes every caller-facing operation.
//! The other modules are stateless and take what they need by reference.

pub mod action_plan;
pub mod bundle;
pub mod course_scoring;
pub mod engine;
pub mod gap;
pub mod handlers;
pub mod mentors;
pub mod progression;
pub mod rules;
pub mod salary;
pub mod trends;

/// Rounds half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    (value * factor).round() / factor
}

/// `1234567` → `"1,234,567"`.
pub fn with_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.12345, 3), 0.123);
        assert_eq!(round_to(96.25, 1), 96.3);
        assert_eq!(round_to(-1.5, 0), -2.0);
    }

    #[test]
    fn test_with_thousands() {
        assert_eq!(with_thousands(0), "0");
        assert_eq!(with_thousands(999), "999");
        assert_eq!(with_thousands(1000), "1,000");
        assert_eq!(with_thousands(1_250_000), "1,250,000");
    }
}

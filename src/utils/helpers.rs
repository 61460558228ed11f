//! Helper functions and utilities
//!
//! Input normalization shared by the event, ledger and Q&A services.

use chrono::{DateTime, Utc};

use crate::utils::errors::ValidationErrors;

/// Normalize a list of free-text tags into an ordered set.
///
/// Tags are trimmed with inner whitespace collapsed, empty tags are dropped and
/// duplicates are removed case-insensitively, keeping the first spelling.
pub fn normalize_skills<I, S>(skills: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: Vec<String> = Vec::new();
    let mut normalized = Vec::new();

    for skill in skills {
        let skill = normalize_whitespace(skill.as_ref());
        if skill.is_empty() {
            continue;
        }
        let key = skill.to_lowercase();
        if !seen.contains(&key) {
            seen.push(key);
            normalized.push(skill);
        }
    }

    normalized
}

/// Normalize whitespace in text
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trim optional free text, mapping blank input to `None`
pub fn non_blank(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

/// Check a required text field against inclusive character bounds.
///
/// `label` is the human-readable field name used in the messages.
pub fn check_text_length(
    errors: &mut ValidationErrors,
    field: &str,
    label: &str,
    value: &str,
    min: usize,
    max: usize,
) {
    let length = value.trim().chars().count();
    if length == 0 {
        errors.add(field, format!("{} is required", label));
    } else if length < min {
        errors.add(field, format!("{} must be at least {} characters", label, min));
    } else if length > max {
        errors.add(field, format!("{} must be at most {} characters", label, max));
    }
}

/// Check an optional text field against a maximum character count
pub fn check_max_length(
    errors: &mut ValidationErrors,
    field: &str,
    label: &str,
    value: Option<&str>,
    max: usize,
) {
    if let Some(value) = value {
        if value.trim().chars().count() > max {
            errors.add(field, format!("{} must be at most {} characters", label, max));
        }
    }
}

/// Whether `instant` lies strictly after `now`
pub fn is_future(instant: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    instant > now
}

/// Case-insensitive substring match used by free-text search
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

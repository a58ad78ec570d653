//! Suite placement: derive a suite name for a feature and find-or-create it
//! under the plan's root.
//!
//! Placement tries a 3-rung fallback ladder of names and surfaces a
//! feature-level error when all rungs fail. It never falls back to the
//! parent/root suite; that would silently merge unrelated features.

use std::sync::Arc;

use crate::error::ImportError;
use crate::models::{SemanticVersion, FORBIDDEN_NAME_CHARS};
use crate::store::PlanStore;

/// Remote store limit on suite name length.
const MAX_SUITE_NAME_LEN: usize = 200;

/// Find or create the suite for one feature.
///
/// Rungs: `"{name} - v{version}"`, bare `name`, `"{name} - Suite"`. Each rung
/// validates the candidate and asks the store to find-or-create it; the store
/// matches existing siblings by normalized name so cosmetic differences do
/// not duplicate suites.
pub async fn place_feature(
    store: &Arc<dyn PlanStore>,
    project: &str,
    plan_id: i64,
    root_suite_id: i64,
    feature_name: &str,
    version: SemanticVersion,
) -> Result<i64, ImportError> {
    let clean = feature_name.trim();
    let candidates = [
        format!("{} - v{}", clean, version),
        clean.to_string(),
        format!("{} - Suite", clean),
    ];

    let mut last_error = String::new();
    for candidate in &candidates {
        let validated = match validate_suite_name(candidate) {
            Ok(name) => name,
            Err(reason) => {
                tracing::warn!("Suite name '{}' rejected: {}", candidate, reason);
                last_error = reason;
                continue;
            }
        };

        match store
            .find_or_create_suite(project, plan_id, root_suite_id, &validated)
            .await
        {
            Ok(suite_id) => {
                tracing::info!(
                    "Placed feature '{}' in suite {} ('{}')",
                    clean,
                    suite_id,
                    validated
                );
                return Ok(suite_id);
            }
            Err(e) => {
                tracing::warn!("Failed to create suite '{}': {}", validated, e);
                last_error = e.to_string();
            }
        }
    }

    Err(ImportError::SuiteCreationFailed {
        feature: clean.to_string(),
        reason: last_error,
    })
}

/// Validate a candidate suite name for the remote store.
///
/// Forbidden characters are replaced with `_`; empty and over-length names
/// are rejected. The returned name preserves the original casing.
pub fn validate_suite_name(name: &str) -> Result<String, String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("suite name cannot be empty".to_string());
    }
    let length = trimmed.chars().count();
    if length > MAX_SUITE_NAME_LEN {
        return Err(format!(
            "suite name is too long ({} characters, max {})",
            length, MAX_SUITE_NAME_LEN
        ));
    }

    let cleaned: String = trimmed
        .chars()
        .map(|c| {
            if FORBIDDEN_NAME_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect();

    Ok(cleaned.trim().to_string())
}

/// Normalize a suite name for comparison against existing siblings.
///
/// Strips trailing version suffixes (`- v1.2.3`, `version 2`, `-rc1` tails)
/// and `_\d{10,}` timestamps, replaces forbidden characters, collapses
/// whitespace, caps at 200 characters, and lowercases. Used for matching
/// only; stored names keep their original form.
pub fn normalize_suite_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return "unnamed_suite".to_string();
    }

    // Timestamps first: a trailing `_1754396042` would otherwise be eaten
    // digit-by-digit as a version group, leaving the underscore behind.
    let name = strip_timestamp_suffix(trimmed);
    let name = strip_version_suffix(&name);

    let cleaned: String = name
        .chars()
        .map(|c| {
            if FORBIDDEN_NAME_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect();

    let mut collapsed = String::with_capacity(cleaned.len());
    let mut last_was_space = false;
    for c in cleaned.trim().chars() {
        if c.is_whitespace() {
            if !last_was_space {
                collapsed.push(' ');
            }
            last_was_space = true;
        } else {
            collapsed.push(c);
            last_was_space = false;
        }
    }

    if collapsed.is_empty() {
        return "unnamed_suite".to_string();
    }

    if collapsed.chars().count() > MAX_SUITE_NAME_LEN {
        let truncated: String = collapsed.chars().take(MAX_SUITE_NAME_LEN - 3).collect();
        collapsed = format!("{}...", truncated);
    }

    collapsed.to_lowercase()
}

/// Remove a trailing version marker: optional `-`, optional `v`/`version`,
/// then up to three dot-separated numbers with an optional `-suffix` tail.
fn strip_version_suffix(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let end = chars.len();

    // Optional alphanumeric pre-release tail, e.g. "-rc1".
    let digits_end = {
        let mut i = end;
        while i > 0 && (chars[i - 1].is_ascii_alphanumeric()) {
            i -= 1;
        }
        if i > 0 && chars[i - 1] == '-' && i < end {
            i - 1
        } else {
            end
        }
    };

    // Up to three numeric groups separated by dots.
    let mut i = digits_end;
    let mut groups = 0;
    loop {
        let group_end = i;
        while i > 0 && chars[i - 1].is_ascii_digit() {
            i -= 1;
        }
        if i == group_end {
            // No digits where a group was expected.
            if groups == 0 {
                return name.to_string();
            }
            i = group_end;
            break;
        }
        groups += 1;
        if groups == 3 || i == 0 || chars[i - 1] != '.' {
            break;
        }
        i -= 1;
    }

    // Optional "v" or "version" marker.
    let lower: String = chars[..i].iter().collect::<String>().to_lowercase();
    if lower.ends_with("version") {
        i -= "version".len();
    } else if lower.ends_with('v') {
        i -= 1;
    }

    // Optional whitespace and dash before the marker.
    while i > 0 && chars[i - 1].is_whitespace() {
        i -= 1;
    }
    if i > 0 && chars[i - 1] == '-' {
        i -= 1;
    }
    while i > 0 && chars[i - 1].is_whitespace() {
        i -= 1;
    }

    if i == end {
        name.to_string()
    } else {
        chars[..i].iter().collect()
    }
}

/// Remove a trailing `_\d{10,}` timestamp marker.
fn strip_timestamp_suffix(name: &str) -> String {
    if let Some(pos) = name.rfind('_') {
        let tail = &name[pos + 1..];
        if tail.len() >= 10 && tail.chars().all(|c| c.is_ascii_digit()) {
            return name[..pos].to_string();
        }
    }
    name.to_string()
}

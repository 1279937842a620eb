//! Column-name normalization and confidence scoring.

use super::snapshot::CompiledPattern;

/// Tokens that make a short column name too generic to trust fully.
pub const GENERIC_TOKENS: [&str; 7] = ["id", "name", "number", "date", "time", "status", "type"];

/// Names with fewer characters than this are penalized when generic.
const GENERIC_NAME_MAX_CHARS: usize = 10;

const EXACT_MATCH_BONUS: f64 = 0.20;
const PARTIAL_MATCH_BONUS: f64 = 0.10;
const GENERIC_NAME_PENALTY: f64 = 0.10;

/// Trims surrounding whitespace and lowercases a column name.
pub fn normalize_column_name(column_name: &str) -> String {
    column_name.trim().to_lowercase()
}

/// True when a normalized name is short and contains a generic token.
pub fn is_generic_name(normalized: &str) -> bool {
    normalized.chars().count() < GENERIC_NAME_MAX_CHARS
        && GENERIC_TOKENS.iter().any(|token| normalized.contains(token))
}

/// Combines rule priority, match exactness, and the generic-name penalty
/// into a score clamped to `[0.0, 1.0]`.
pub fn confidence_score(priority: u8, exact_match: bool, generic_name: bool) -> f64 {
    let base = f64::from(priority) / 100.0;
    let bonus = if exact_match {
        EXACT_MATCH_BONUS
    } else {
        PARTIAL_MATCH_BONUS
    };
    let penalty = if generic_name {
        GENERIC_NAME_PENALTY
    } else {
        0.0
    };

    (base + bonus - penalty).clamp(0.0, 1.0)
}

/// Scores one pattern against a normalized name, `None` if it does not match.
///
/// Exactness is judged on the leftmost match: the bonus is the higher one
/// only when that match spans the entire name.
pub(crate) fn score_match(
    pattern: &CompiledPattern,
    normalized: &str,
    generic_name: bool,
) -> Option<f64> {
    let found = pattern.regex().find(normalized)?;
    let exact = found.start() == 0 && found.end() == normalized.len();
    Some(confidence_score(pattern.priority(), exact, generic_name))
}

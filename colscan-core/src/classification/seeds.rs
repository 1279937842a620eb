//! Seed rule sets: the built-in defaults and JSON seed files.
//!
//! A seed file is a JSON array of pattern requests:
//!
//! ```json
//! [
//!   {
//!     "information_type": "EMAIL_ADDRESS",
//!     "pattern": "e_?mail",
//!     "description": "Email address",
//!     "priority": 90
//!   }
//! ]
//! ```

use crate::error::{ColscanError, Result};
use crate::models::{ClassificationRule, PatternRequest};
use std::path::Path;

const DEFAULT_PATTERNS: &str = include_str!("../../data/default_patterns.json");

/// Parses seed requests from JSON text and validates each one.
///
/// # Errors
/// Returns `Serialization` if the text is not an array of pattern requests
/// and `Configuration` if any request fails [`PatternRequest::validate`].
pub fn parse_seeds(json: &str, source: &str) -> Result<Vec<PatternRequest>> {
    let requests: Vec<PatternRequest> =
        serde_json::from_str(json).map_err(|e| ColscanError::Serialization {
            context: format!("Invalid pattern seed data in {}", source),
            source: e,
        })?;

    for request in &requests {
        request.validate().map_err(|e| {
            ColscanError::configuration(format!("Invalid seed in {}: {}", source, e))
        })?;
    }
    Ok(requests)
}

/// The built-in default rule set covering every information type.
///
/// # Errors
/// Only fails if the bundled JSON is malformed.
pub fn default_seeds() -> Result<Vec<PatternRequest>> {
    parse_seeds(DEFAULT_PATTERNS, "built-in default patterns")
}

/// Reads seed requests from a JSON file.
///
/// # Errors
/// Returns `Io` if the file cannot be read and `Serialization` if it does
/// not hold an array of pattern requests.
pub async fn load_seed_file(path: &Path) -> Result<Vec<PatternRequest>> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ColscanError::Io {
            context: format!("Failed to read pattern file {}", path.display()),
            source: e,
        })?;
    parse_seeds(&contents, &path.display().to_string())
}

/// Loads `path` if given, otherwise the built-in defaults.
///
/// # Errors
/// See [`load_seed_file`].
pub async fn load_seeds(path: Option<&Path>) -> Result<Vec<PatternRequest>> {
    match path {
        Some(path) => load_seed_file(path).await,
        None => default_seeds(),
    }
}

/// Loads seeds and turns them into active rules, in file order.
///
/// # Errors
/// See [`load_seed_file`].
pub async fn load_rules(path: Option<&Path>) -> Result<Vec<ClassificationRule>> {
    Ok(load_seeds(path)
        .await?
        .into_iter()
        .map(PatternRequest::into_rule)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::snapshot::{DEFAULT_REGEX_SIZE_LIMIT, PatternSnapshot};
    use crate::models::InformationType;
    use std::collections::HashSet;
    use std::io::Write;

    #[test]
    fn test_default_seeds_cover_every_type() {
        let seeds = default_seeds().unwrap();
        let covered: HashSet<_> = seeds.iter().map(|s| s.information_type).collect();

        for info_type in InformationType::ALL.iter().filter(|t| t.is_classified()) {
            assert!(covered.contains(info_type), "missing seed for {}", info_type);
        }
        assert!(!covered.contains(&InformationType::NotApplicable));
    }

    #[test]
    fn test_default_seeds_compile_and_are_unique() {
        let seeds = default_seeds().unwrap();
        let unique: HashSet<_> = seeds.iter().map(|s| s.pattern.as_str()).collect();
        assert_eq!(unique.len(), seeds.len());

        for seed in &seeds {
            assert!((1..=100).contains(&seed.priority), "{}", seed.pattern);
        }

        let rules: Vec<_> = seeds.into_iter().map(PatternRequest::into_rule).collect();
        PatternSnapshot::compile(1, &rules, DEFAULT_REGEX_SIZE_LIMIT).unwrap();
    }

    #[test]
    fn test_default_seeds_classify_common_columns() {
        let rules: Vec<_> = default_seeds()
            .unwrap()
            .into_iter()
            .map(PatternRequest::into_rule)
            .collect();
        let snapshot = PatternSnapshot::compile(1, &rules, DEFAULT_REGEX_SIZE_LIMIT).unwrap();

        let expectations = [
            ("email_address", InformationType::EmailAddress),
            ("first_name", InformationType::FirstName),
            ("user_ssn", InformationType::Ssn),
            ("ip_address", InformationType::IpAddress),
            ("mac_address", InformationType::MacAddress),
            ("billing_street", InformationType::Address),
            ("dob", InformationType::DateOfBirth),
            ("iban", InformationType::BankAccount),
            ("created_at", InformationType::NotApplicable),
        ];

        for (column, expected) in expectations {
            assert_eq!(
                snapshot.classify(column).information_type,
                expected,
                "column {}",
                column
            );
        }
    }

    #[test]
    fn test_parse_seeds_rejects_unknown_type() {
        let json = r#"[{"information_type": "SHOE_SIZE", "pattern": "shoe", "description": "", "priority": 10}]"#;
        let error = parse_seeds(json, "inline").unwrap_err();
        assert!(error.to_string().contains("inline"));
    }

    #[test]
    fn test_parse_seeds_rejects_invalid_requests() {
        let cases = [
            r#"[{"information_type": "SSN", "pattern": "ssn", "description": "", "priority": 250}]"#,
            r#"[{"information_type": "SSN", "pattern": "ssn", "description": "", "priority": 0}]"#,
            r#"[{"information_type": "N/A", "pattern": "ssn", "description": "", "priority": 50}]"#,
            r#"[{"information_type": "SSN", "pattern": "", "description": "", "priority": 50}]"#,
        ];

        for json in cases {
            let error = parse_seeds(json, "inline").unwrap_err();
            assert!(matches!(error, ColscanError::Configuration { .. }), "{}", json);
            assert!(error.to_string().contains("inline"));
        }
    }

    #[tokio::test]
    async fn test_load_seed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"information_type": "SSN", "pattern": "ssn", "description": "SSN", "priority": 90}}]"#
        )
        .unwrap();

        let seeds = load_seeds(Some(file.path())).await.unwrap();
        assert_eq!(seeds.len(), 1);
        assert_eq!(seeds[0].information_type, InformationType::Ssn);
    }

    #[tokio::test]
    async fn test_load_missing_seed_file() {
        let dir = tempfile::tempdir().unwrap();
        let error = load_seed_file(&dir.path().join("absent.json"))
            .await
            .unwrap_err();
        assert!(matches!(error, ColscanError::Io { .. }));
    }
}

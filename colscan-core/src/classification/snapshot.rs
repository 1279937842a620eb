//! Immutable, version-tagged sets of compiled classification rules.

use super::scoring::{is_generic_name, normalize_column_name, score_match};
use crate::error::{ColscanError, Result};
use crate::models::{ClassificationOutcome, ClassificationRule, InformationType};
use regex::{Regex, RegexBuilder};

/// Default upper bound on the compiled size of a single pattern.
pub const DEFAULT_REGEX_SIZE_LIMIT: usize = 1024 * 1024;

/// A rule paired with its compiled expression.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    rule: ClassificationRule,
    regex: Regex,
}

impl CompiledPattern {
    /// Compiles a rule's pattern text with the given compiled-size limit.
    ///
    /// # Errors
    /// Returns `PatternCompile` naming the offending pattern if it is not a
    /// valid expression or exceeds `size_limit`, and `Configuration` if the
    /// rule targets `N/A`.
    pub fn compile(rule: ClassificationRule, size_limit: usize) -> Result<Self> {
        // a match must never yield the unclassified sentinel
        if !rule.information_type.is_classified() {
            return Err(ColscanError::configuration(format!(
                "Pattern '{}' targets {}",
                rule.pattern, rule.information_type
            )));
        }
        let regex = RegexBuilder::new(&rule.pattern)
            .size_limit(size_limit)
            .build()
            .map_err(|source| ColscanError::PatternCompile {
                pattern: rule.pattern.clone(),
                source,
            })?;
        Ok(Self { rule, regex })
    }

    pub fn rule(&self) -> &ClassificationRule {
        &self.rule
    }

    pub fn pattern(&self) -> &str {
        &self.rule.pattern
    }

    pub fn priority(&self) -> u8 {
        self.rule.priority
    }

    pub fn information_type(&self) -> InformationType {
        self.rule.information_type
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

/// Compiled rule set published by the classification engine.
///
/// Patterns are ordered by priority, highest first. Rules with equal
/// priority keep the order they were supplied in, which is also the
/// tie-break order during classification.
#[derive(Debug, Clone, Default)]
pub struct PatternSnapshot {
    version: u64,
    patterns: Vec<CompiledPattern>,
}

impl PatternSnapshot {
    /// An empty snapshot at version 0. Classifies everything as `N/A`.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compiles every rule and orders the result by priority.
    ///
    /// # Errors
    /// Fails on the first rule whose pattern does not compile; nothing is
    /// returned for the rules compiled before it.
    pub fn compile(version: u64, rules: &[ClassificationRule], size_limit: usize) -> Result<Self> {
        let mut patterns = rules
            .iter()
            .cloned()
            .map(|rule| CompiledPattern::compile(rule, size_limit))
            .collect::<Result<Vec<_>>>()?;

        // sort_by_key is stable
        patterns.sort_by_key(|p| std::cmp::Reverse(p.priority()));

        Ok(Self { version, patterns })
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn patterns(&self) -> &[CompiledPattern] {
        &self.patterns
    }

    /// Classifies a column name against this snapshot.
    ///
    /// Every pattern is evaluated. The winner is the highest-scoring match;
    /// `matched_patterns` lists all matches by descending score.
    pub fn classify(&self, column_name: &str) -> ClassificationOutcome {
        let normalized = normalize_column_name(column_name);
        if normalized.is_empty() {
            return ClassificationOutcome::unclassified();
        }

        let generic = is_generic_name(&normalized);
        let mut matches: Vec<(&CompiledPattern, f64)> = self
            .patterns
            .iter()
            .filter_map(|pattern| score_match(pattern, &normalized, generic).map(|s| (pattern, s)))
            .collect();

        // stable, so equal scores stay in snapshot order
        matches.sort_by(|a, b| b.1.total_cmp(&a.1));

        let Some(&(winner, confidence_score)) = matches.first() else {
            return ClassificationOutcome::unclassified();
        };

        ClassificationOutcome {
            information_type: winner.information_type(),
            confidence_score,
            matched_patterns: matches
                .iter()
                .map(|(pattern, _)| pattern.pattern().to_string())
                .collect(),
        }
    }
}

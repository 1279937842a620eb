//! Pattern CRUD that keeps the engine in step with the pattern store.

use super::engine::ClassificationEngine;
use super::seeds;
use super::snapshot::CompiledPattern;
use crate::error::{ColscanError, Result};
use crate::models::{ClassificationOutcome, ClassificationRule, PatternRequest};
use crate::store::PatternStore;
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Pattern management entry point.
///
/// Every successful write reloads the engine from the store, so a created,
/// updated, or deleted rule affects the next classification.
#[derive(Clone)]
pub struct PatternCatalog {
    store: Arc<dyn PatternStore>,
    engine: Arc<ClassificationEngine>,
}

impl PatternCatalog {
    pub fn new(store: Arc<dyn PatternStore>, engine: Arc<ClassificationEngine>) -> Self {
        Self { store, engine }
    }

    pub fn engine(&self) -> &Arc<ClassificationEngine> {
        &self.engine
    }

    /// Loads seed rules if the store holds no active rules, then reloads.
    ///
    /// Seeds come from `seed_path` when given, otherwise from the built-in
    /// default set. Seeds whose pattern text is already stored are skipped.
    /// Returns the number of rules inserted.
    ///
    /// # Errors
    /// Returns seed loading, store, or compile errors. Every seed is
    /// validated and compiled before the first write, so a bad seed set
    /// leaves the store untouched.
    pub async fn ensure_seeded(&self, seed_path: Option<&Path>) -> Result<usize> {
        if !self.store.list_active().await?.is_empty() {
            debug!("Pattern store already populated, skipping seed");
            self.reload().await?;
            return Ok(0);
        }

        let requests = seeds::load_seeds(seed_path).await?;
        for request in &requests {
            self.validate(request)?;
        }

        let mut inserted = 0usize;
        for request in requests {
            if self.store.exists_by_pattern(&request.pattern).await? {
                debug!(pattern = %request.pattern, "Seed pattern already stored");
                continue;
            }
            self.store.create(&request.into_rule()).await?;
            inserted += 1;
        }

        info!(inserted, "Seeded classification patterns");
        self.reload().await?;
        Ok(inserted)
    }

    /// Validates, stores, and activates a new rule.
    ///
    /// # Errors
    /// - `Configuration` for a priority outside 1-100, an empty pattern, or
    ///   an `N/A` information type
    /// - `PatternCompile` if the pattern is invalid (store untouched)
    /// - `DuplicatePattern` if the pattern text is already stored
    pub async fn create_pattern(&self, request: PatternRequest) -> Result<Uuid> {
        self.validate(&request)?;

        if self.store.exists_by_pattern(&request.pattern).await? {
            return Err(ColscanError::DuplicatePattern {
                pattern: request.pattern,
            });
        }

        let rule = request.into_rule();
        let id = rule.id;
        self.store.create(&rule).await?;
        info!(pattern_id = %id, information_type = %rule.information_type, "Created classification pattern");

        self.reload().await?;
        Ok(id)
    }

    /// # Errors
    /// `NotFound` for an unknown id.
    pub async fn get_pattern(&self, id: Uuid) -> Result<ClassificationRule> {
        self.store.get_by_id(id).await
    }

    /// All stored rules, active or not.
    ///
    /// # Errors
    /// Returns store errors.
    pub async fn list_patterns(&self) -> Result<Vec<ClassificationRule>> {
        self.store.list_all().await
    }

    /// Replaces a rule's content and marks it active.
    ///
    /// # Errors
    /// Same validation as [`Self::create_pattern`], plus `NotFound` for an
    /// unknown id. Changing the text to another rule's pattern is rejected
    /// as a duplicate.
    pub async fn update_pattern(&self, id: Uuid, request: PatternRequest) -> Result<()> {
        let mut rule = self.store.get_by_id(id).await?;
        self.validate(&request)?;

        if rule.pattern != request.pattern && self.store.exists_by_pattern(&request.pattern).await? {
            return Err(ColscanError::DuplicatePattern {
                pattern: request.pattern,
            });
        }

        rule.information_type = request.information_type;
        rule.pattern = request.pattern;
        rule.description = request.description;
        rule.priority = request.priority;
        rule.is_active = true;
        rule.updated_at = Utc::now();

        self.store.update(&rule).await?;
        info!(pattern_id = %id, "Updated classification pattern");

        self.reload().await?;
        Ok(())
    }

    /// # Errors
    /// `NotFound` for an unknown id.
    pub async fn delete_pattern(&self, id: Uuid) -> Result<()> {
        self.store.delete(id).await?;
        info!(pattern_id = %id, "Deleted classification pattern");
        self.reload().await?;
        Ok(())
    }

    pub fn classify_column(&self, column_name: &str) -> ClassificationOutcome {
        self.engine.classify(column_name)
    }

    /// Republishes the engine from the store's active rules.
    ///
    /// # Errors
    /// Returns store or compile errors; the engine keeps its snapshot.
    pub async fn reload(&self) -> Result<u64> {
        self.engine.reload_from(self.store.as_ref()).await
    }

    fn validate(&self, request: &PatternRequest) -> Result<()> {
        request.validate()?;

        // compile before touching the store
        let candidate = ClassificationRule::new(
            request.information_type,
            request.pattern.clone(),
            String::new(),
            request.priority,
        );
        CompiledPattern::compile(candidate, self.engine.regex_size_limit())?;
        Ok(())
    }
}

impl std::fmt::Debug for PatternCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternCatalog")
            .field("engine_version", &self.engine.version())
            .finish_non_exhaustive()
    }
}

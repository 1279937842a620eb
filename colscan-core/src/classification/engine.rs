//! The classification engine: atomic publication of pattern snapshots.

use super::snapshot::{DEFAULT_REGEX_SIZE_LIMIT, PatternSnapshot};
use crate::Result;
use crate::models::{ClassificationOutcome, ClassificationRule};
use crate::store::PatternStore;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Classifies column names against the currently published snapshot.
///
/// Readers clone the current `Arc` under a read lock and classify without
/// holding it. Publishing compiles off-lock and swaps the pointer under a
/// short write lock, so a reader sees either the old or the new snapshot in
/// full.
#[derive(Debug)]
pub struct ClassificationEngine {
    current: RwLock<Arc<PatternSnapshot>>,
    last_version: AtomicU64,
    reload_gate: tokio::sync::Mutex<()>,
    regex_size_limit: usize,
}

impl Default for ClassificationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassificationEngine {
    /// Creates an engine with an empty snapshot.
    pub fn new() -> Self {
        Self::with_size_limit(DEFAULT_REGEX_SIZE_LIMIT)
    }

    /// Creates an engine whose patterns are compiled with `regex_size_limit`.
    pub fn with_size_limit(regex_size_limit: usize) -> Self {
        Self {
            current: RwLock::new(Arc::new(PatternSnapshot::empty())),
            last_version: AtomicU64::new(0),
            reload_gate: tokio::sync::Mutex::new(()),
            regex_size_limit,
        }
    }

    /// Creates an engine and publishes `rules` as its first snapshot.
    ///
    /// # Errors
    /// Returns `PatternCompile` if any rule fails to compile.
    pub fn from_rules(rules: &[ClassificationRule], regex_size_limit: usize) -> Result<Self> {
        let engine = Self::with_size_limit(regex_size_limit);
        engine.publish(rules)?;
        Ok(engine)
    }

    /// The currently published snapshot.
    pub fn snapshot(&self) -> Arc<PatternSnapshot> {
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&current)
    }

    /// Version of the currently published snapshot.
    pub fn version(&self) -> u64 {
        self.snapshot().version()
    }

    pub fn regex_size_limit(&self) -> usize {
        self.regex_size_limit
    }

    /// Classifies one column name against the current snapshot.
    pub fn classify(&self, column_name: &str) -> ClassificationOutcome {
        self.snapshot().classify(column_name)
    }

    /// Compiles `rules` into a new snapshot and publishes it.
    ///
    /// Returns the version assigned to the new snapshot. A snapshot is only
    /// swapped in if it is newer than the one currently published.
    ///
    /// # Errors
    /// Returns `PatternCompile` if any rule fails; the previous snapshot
    /// stays in place.
    pub fn publish(&self, rules: &[ClassificationRule]) -> Result<u64> {
        let version = self.last_version.fetch_add(1, Ordering::SeqCst) + 1;

        let snapshot = PatternSnapshot::compile(version, rules, self.regex_size_limit)
            .map_err(|e| {
                warn!(version, error = %e, "Pattern compilation failed, keeping previous snapshot");
                e
            })?;
        let pattern_count = snapshot.len();
        let snapshot = Arc::new(snapshot);

        let replaced = {
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            if current.version() < version {
                *current = snapshot;
                true
            } else {
                false
            }
        };

        if replaced {
            info!(version, patterns = pattern_count, "Published pattern snapshot");
        } else {
            debug!(version, "Discarded snapshot older than the published one");
        }

        Ok(version)
    }

    /// Loads the active rules from `store` and publishes them.
    ///
    /// Concurrent reloads run one at a time, so the last reload to finish
    /// always reflects the latest store contents.
    ///
    /// # Errors
    /// Returns the store error or a `PatternCompile` error; either way the
    /// previous snapshot stays in place.
    pub async fn reload_from(&self, store: &dyn PatternStore) -> Result<u64> {
        let _gate = self.reload_gate.lock().await;
        let rules = store.list_active().await?;
        debug!(rules = rules.len(), "Reloading classification patterns");
        self.publish(&rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InformationType;

    fn ssn_rule() -> ClassificationRule {
        ClassificationRule::new(InformationType::Ssn, "ssn", "Social security number", 90)
    }

    #[test]
    fn test_new_engine_is_empty() {
        let engine = ClassificationEngine::new();
        assert_eq!(engine.version(), 0);
        assert!(engine.snapshot().is_empty());
        assert_eq!(
            engine.classify("user_ssn").information_type,
            InformationType::NotApplicable
        );
    }

    #[test]
    fn test_publish_bumps_version() {
        let engine = ClassificationEngine::new();
        assert_eq!(engine.publish(&[ssn_rule()]).unwrap(), 1);
        assert_eq!(engine.publish(&[ssn_rule()]).unwrap(), 2);
        assert_eq!(engine.version(), 2);
        assert_eq!(
            engine.classify("user_ssn").information_type,
            InformationType::Ssn
        );
    }

    #[test]
    fn test_failed_publish_keeps_previous_snapshot() {
        let engine = ClassificationEngine::from_rules(&[ssn_rule()], DEFAULT_REGEX_SIZE_LIMIT)
            .unwrap();
        let before = engine.snapshot();

        let broken = ClassificationRule::new(InformationType::EmailAddress, "[email", "", 80);
        assert!(engine.publish(&[broken]).is_err());

        let after = engine.snapshot();
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(
            engine.classify("ssn").information_type,
            InformationType::Ssn
        );
    }

    #[test]
    fn test_held_snapshot_survives_publish() {
        let engine = ClassificationEngine::from_rules(&[ssn_rule()], DEFAULT_REGEX_SIZE_LIMIT)
            .unwrap();
        let held = engine.snapshot();

        engine.publish(&[]).unwrap();

        assert_eq!(held.len(), 1);
        assert!(engine.snapshot().is_empty());
    }
}

//! In-memory store implementations.

use super::{ConnectionStore, PatternStore, ResultStore};
use crate::error::{ColscanError, Result};
use crate::models::{ClassificationRule, DatabaseConnection, ScanResult, ScanStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Rules kept in a vector so listing preserves insertion order.
#[derive(Debug, Default)]
pub struct MemoryPatternStore {
    rules: RwLock<Vec<ClassificationRule>>,
}

impl MemoryPatternStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `rules`.
    pub fn with_rules(rules: Vec<ClassificationRule>) -> Self {
        Self {
            rules: RwLock::new(rules),
        }
    }
}

#[async_trait]
impl PatternStore for MemoryPatternStore {
    async fn list_active(&self) -> Result<Vec<ClassificationRule>> {
        let rules = self.rules.read().await;
        Ok(rules.iter().filter(|r| r.is_active).cloned().collect())
    }

    async fn list_all(&self) -> Result<Vec<ClassificationRule>> {
        Ok(self.rules.read().await.clone())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<ClassificationRule> {
        let rules = self.rules.read().await;
        rules
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| ColscanError::not_found("Pattern", id))
    }

    async fn create(&self, rule: &ClassificationRule) -> Result<()> {
        let mut rules = self.rules.write().await;
        if rules.iter().any(|r| r.id == rule.id) {
            return Err(ColscanError::persistence(format!(
                "Pattern {} already stored",
                rule.id
            )));
        }
        rules.push(rule.clone());
        Ok(())
    }

    async fn update(&self, rule: &ClassificationRule) -> Result<()> {
        let mut rules = self.rules.write().await;
        let slot = rules
            .iter_mut()
            .find(|r| r.id == rule.id)
            .ok_or_else(|| ColscanError::not_found("Pattern", rule.id))?;
        *slot = rule.clone();
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut rules = self.rules.write().await;
        let before = rules.len();
        rules.retain(|r| r.id != id);
        if rules.len() == before {
            return Err(ColscanError::not_found("Pattern", id));
        }
        Ok(())
    }

    async fn exists_by_pattern(&self, pattern: &str) -> Result<bool> {
        let rules = self.rules.read().await;
        Ok(rules.iter().any(|r| r.pattern == pattern))
    }
}

/// Scan results keyed by scan id.
#[derive(Debug, Default)]
pub struct MemoryResultStore {
    scans: RwLock<HashMap<Uuid, ScanResult>>,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored scans
    pub async fn len(&self) -> usize {
        self.scans.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.scans.read().await.is_empty()
    }
}

#[async_trait]
impl ResultStore for MemoryResultStore {
    async fn create(&self, scan: &ScanResult) -> Result<()> {
        let mut scans = self.scans.write().await;
        if scans.contains_key(&scan.id) {
            return Err(ColscanError::persistence(format!(
                "Scan result {} already stored",
                scan.id
            )));
        }
        scans.insert(scan.id, scan.clone());
        Ok(())
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: ScanStatus,
        error_message: Option<String>,
    ) -> Result<()> {
        let mut scans = self.scans.write().await;
        let scan = scans
            .get_mut(&id)
            .ok_or_else(|| ColscanError::not_found("Scan result", id))?;

        scan.status = status;
        scan.error_message = error_message;
        if status.is_terminal() {
            scan.completed_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn update_full(&self, scan: &ScanResult) -> Result<()> {
        let mut scans = self.scans.write().await;
        let slot = scans
            .get_mut(&scan.id)
            .ok_or_else(|| ColscanError::not_found("Scan result", scan.id))?;
        *slot = scan.clone();
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<ScanResult> {
        let scans = self.scans.read().await;
        scans
            .get(&id)
            .cloned()
            .ok_or_else(|| ColscanError::not_found("Scan result", id))
    }

    async fn get_history(&self, database_id: Uuid, limit: usize) -> Result<Vec<ScanResult>> {
        let scans = self.scans.read().await;
        let mut history: Vec<ScanResult> = scans
            .values()
            .filter(|s| s.database_id == database_id)
            .cloned()
            .collect();
        history.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        history.truncate(limit);
        Ok(history)
    }

    async fn get_latest_completed(&self, database_id: Uuid) -> Result<ScanResult> {
        let scans = self.scans.read().await;
        scans
            .values()
            .filter(|s| s.database_id == database_id && s.status == ScanStatus::Completed)
            .max_by_key(|s| s.started_at)
            .cloned()
            .ok_or_else(|| ColscanError::not_found("Completed scan for database", database_id))
    }
}

/// Connection records keyed by id.
#[derive(Debug, Default)]
pub struct MemoryConnectionStore {
    connections: RwLock<HashMap<Uuid, DatabaseConnection>>,
}

impl MemoryConnectionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionStore for MemoryConnectionStore {
    async fn create(&self, connection: &DatabaseConnection) -> Result<()> {
        let mut connections = self.connections.write().await;
        if connections.contains_key(&connection.id) {
            return Err(ColscanError::persistence(format!(
                "Database connection {} already stored",
                connection.id
            )));
        }
        connections.insert(connection.id, connection.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<DatabaseConnection> {
        let connections = self.connections.read().await;
        connections
            .get(&id)
            .cloned()
            .ok_or_else(|| ColscanError::not_found("Database connection", id))
    }

    async fn list(&self) -> Result<Vec<DatabaseConnection>> {
        let connections = self.connections.read().await;
        let mut all: Vec<_> = connections.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(all)
    }

    async fn update_last_scanned_at(&self, id: Uuid, scanned_at: DateTime<Utc>) -> Result<()> {
        let mut connections = self.connections.write().await;
        let connection = connections
            .get_mut(&id)
            .ok_or_else(|| ColscanError::not_found("Database connection", id))?;
        connection.last_scanned_at = Some(scanned_at);
        connection.updated_at = Utc::now();
        Ok(())
    }
}

//! Persistence seams for rules, scan results, and connection records.
//!
//! The core never talks to a concrete database for its own state. Embedding
//! services supply implementations of these traits; [`memory`] provides
//! in-process ones used by the CLI and the tests.

pub mod memory;

use crate::Result;
use crate::models::{ClassificationRule, DatabaseConnection, ScanResult, ScanStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub use memory::{MemoryConnectionStore, MemoryPatternStore, MemoryResultStore};

/// Storage for classification rules.
#[async_trait]
pub trait PatternStore: Send + Sync {
    /// Active rules, in insertion order
    async fn list_active(&self) -> Result<Vec<ClassificationRule>>;

    /// Every rule, active or not, in insertion order
    async fn list_all(&self) -> Result<Vec<ClassificationRule>>;

    /// Fails with `NotFound` for an unknown id
    async fn get_by_id(&self, id: Uuid) -> Result<ClassificationRule>;

    async fn create(&self, rule: &ClassificationRule) -> Result<()>;

    /// Fails with `NotFound` for an unknown id
    async fn update(&self, rule: &ClassificationRule) -> Result<()>;

    /// Fails with `NotFound` for an unknown id
    async fn delete(&self, id: Uuid) -> Result<()>;

    async fn exists_by_pattern(&self, pattern: &str) -> Result<bool>;
}

/// Storage for scan results.
#[async_trait]
pub trait ResultStore: Send + Sync {
    async fn create(&self, scan: &ScanResult) -> Result<()>;

    /// Sets status and error message. A terminal status also stamps
    /// `completed_at` with the current time.
    async fn update_status(
        &self,
        id: Uuid,
        status: ScanStatus,
        error_message: Option<String>,
    ) -> Result<()>;

    /// Replaces the stored record with `scan`
    async fn update_full(&self, scan: &ScanResult) -> Result<()>;

    async fn get_by_id(&self, id: Uuid) -> Result<ScanResult>;

    /// Newest first, at most `limit` entries
    async fn get_history(&self, database_id: Uuid, limit: usize) -> Result<Vec<ScanResult>>;

    /// Most recently started completed scan, `NotFound` if none
    async fn get_latest_completed(&self, database_id: Uuid) -> Result<ScanResult>;
}

/// Storage for registered target databases.
#[async_trait]
pub trait ConnectionStore: Send + Sync {
    async fn create(&self, connection: &DatabaseConnection) -> Result<()>;

    async fn get_by_id(&self, id: Uuid) -> Result<DatabaseConnection>;

    async fn list(&self) -> Result<Vec<DatabaseConnection>>;

    async fn update_last_scanned_at(&self, id: Uuid, scanned_at: DateTime<Utc>) -> Result<()>;
}

//! Core engine for colscan: column-name PII classification and database
//! scan orchestration.
//!
//! A scan walks the schemas, tables, and columns of a target database and
//! classifies every column by its name alone against a set of weighted
//! regular-expression rules. Results are aggregated into per-type counts
//! and an overall risk level.
//!
//! # Security Guarantees
//! - Only catalog metadata is read; row data is never queried
//! - Credentials live in zeroizing containers and are never logged
//! - Stored passwords are sealed with AES-GCM and random nonces
//!
//! # Architecture
//! - `classification`: compiled, atomically swapped pattern snapshots
//! - `scan`: background scan lifecycle over pluggable collaborators
//! - `store` / `inspector` / `security`: the seams embedding services fill

pub mod classification;
pub mod config;
pub mod error;
pub mod inspector;
pub mod logging;
pub mod models;
pub mod risk;
pub mod scan;
pub mod security;
pub mod store;

// Re-export commonly used types
pub use classification::{ClassificationEngine, PatternCatalog, PatternSnapshot};
pub use config::ServiceConfig;
pub use error::{ColscanError, Result};
pub use inspector::{ColumnMetadata, InspectorSession, SchemaInspector};
pub use models::{
    ClassificationOutcome, ClassificationRule, ColumnResult, DatabaseConnection, InformationType,
    PatternRequest, RiskLevel, ScanResult, ScanStatus, ScanSummary, SchemaResult, TableResult,
};
pub use scan::{ScanDependencies, ScanOrchestrator};
pub use security::{CredentialResolver, Credentials};

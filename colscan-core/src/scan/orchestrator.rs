//! Scan lifecycle: start, run in the background, cancel, and query.

use super::registry::ScanRegistry;
use super::walker;
use crate::classification::ClassificationEngine;
use crate::config::ServiceConfig;
use crate::error::{ColscanError, Result};
use crate::inspector::SchemaInspector;
use crate::models::{ClassificationOutcome, DatabaseConnection, ScanResult, ScanStatus};
use crate::security::CredentialResolver;
use crate::store::{ConnectionStore, ResultStore};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Message recorded on scans cancelled through [`ScanOrchestrator::cancel_scan`].
pub const CANCELLED_BY_USER: &str = "Cancelled by user";

/// Collaborators a [`ScanOrchestrator`] runs against.
#[derive(Clone)]
pub struct ScanDependencies {
    pub results: Arc<dyn ResultStore>,
    pub connections: Arc<dyn ConnectionStore>,
    pub credentials: Arc<dyn CredentialResolver>,
    pub inspector: Arc<dyn SchemaInspector>,
    pub engine: Arc<ClassificationEngine>,
}

/// Runs each scan as an independent background task.
///
/// Status moves `Pending -> Running -> Completed | Failed`. A cancel request
/// only records `Cancelled`; a scan already running is not interrupted and
/// whichever write lands last wins.
///
/// Cloning is cheap; clones share the same registry and collaborators.
#[derive(Clone)]
pub struct ScanOrchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    deps: ScanDependencies,
    config: ServiceConfig,
    registry: ScanRegistry,
}

impl ScanOrchestrator {
    /// # Errors
    /// Returns a configuration error if `config` does not validate.
    pub fn new(deps: ScanDependencies, config: ServiceConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            inner: Arc::new(Inner {
                deps,
                config,
                registry: ScanRegistry::new(),
            }),
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.inner.config
    }

    pub fn registry(&self) -> &ScanRegistry {
        &self.inner.registry
    }

    /// Records a pending scan for `database_id` and starts it in the
    /// background. Returns as soon as the pending record is stored.
    ///
    /// # Errors
    /// `NotFound` for an unknown connection, or the store error if the
    /// pending record cannot be written.
    pub async fn start_scan(&self, database_id: Uuid) -> Result<Uuid> {
        let connection = self.inner.deps.connections.get_by_id(database_id).await?;

        let scan = ScanResult::pending(database_id);
        let scan_id = scan.id;
        self.inner.deps.results.create(&scan).await?;
        info!(scan_id = %scan_id, database = %connection, "Scan queued");

        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            inner.execute(scan, connection).await;
        });
        self.inner.registry.track(scan_id, handle);

        Ok(scan_id)
    }

    /// Marks a pending or running scan as cancelled.
    ///
    /// # Errors
    /// `NotFound` for an unknown scan, `InvalidState` if the scan already
    /// reached a terminal status.
    pub async fn cancel_scan(&self, scan_id: Uuid) -> Result<()> {
        let scan = self.inner.deps.results.get_by_id(scan_id).await?;
        if !scan.status.is_cancelable() {
            return Err(ColscanError::invalid_state(format!(
                "scan cannot be cancelled, current status: {}",
                scan.status
            )));
        }

        self.inner
            .deps
            .results
            .update_status(
                scan_id,
                ScanStatus::Cancelled,
                Some(CANCELLED_BY_USER.to_string()),
            )
            .await?;
        info!(scan_id = %scan_id, "Scan cancelled");
        Ok(())
    }

    /// # Errors
    /// `NotFound` for an unknown scan.
    pub async fn get_scan_result(&self, scan_id: Uuid) -> Result<ScanResult> {
        self.inner.deps.results.get_by_id(scan_id).await
    }

    /// Scans of a database, newest first. A `limit` of 0 uses the
    /// configured history limit.
    ///
    /// # Errors
    /// Returns store errors.
    pub async fn get_scan_history(&self, database_id: Uuid, limit: usize) -> Result<Vec<ScanResult>> {
        let limit = self.inner.config.effective_history_limit(limit);
        self.inner.deps.results.get_history(database_id, limit).await
    }

    /// # Errors
    /// `NotFound` if the database has no completed scan.
    pub async fn get_latest_completed(&self, database_id: Uuid) -> Result<ScanResult> {
        self.inner.deps.results.get_latest_completed(database_id).await
    }

    pub fn classify_column(&self, column_name: &str) -> ClassificationOutcome {
        self.inner.deps.engine.classify(column_name)
    }

    /// Ids of scans whose background task is still running.
    pub fn active_scans(&self) -> Vec<Uuid> {
        self.inner.registry.active()
    }

    /// Waits for the background task of `scan_id`. Returns `false` at once
    /// if no such task is tracked.
    pub async fn wait_for(&self, scan_id: Uuid) -> bool {
        self.inner.registry.wait_for(scan_id).await
    }

    /// Waits for every tracked scan task.
    pub async fn wait_all(&self) {
        self.inner.registry.wait_all().await;
    }
}

impl std::fmt::Debug for ScanOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanOrchestrator")
            .field("inspector", &self.inner.deps.inspector.backend())
            .field("config", &self.inner.config)
            .field("registry", &self.inner.registry)
            .finish_non_exhaustive()
    }
}

impl Inner {
    /// Scan task body. Every error ends in a persisted `Failed` status.
    async fn execute(&self, mut scan: ScanResult, connection: DatabaseConnection) {
        let scan_id = scan.id;
        if let Err(e) = self.run(&mut scan, &connection).await {
            error!(scan_id = %scan_id, database = %connection, error = %e, "Scan failed");
            if let Err(persist_error) = self
                .deps
                .results
                .update_status(scan_id, ScanStatus::Failed, Some(e.to_string()))
                .await
            {
                error!(scan_id = %scan_id, error = %persist_error, "Failed to record scan failure");
            }
        }
    }

    async fn run(&self, scan: &mut ScanResult, connection: &DatabaseConnection) -> Result<()> {
        let started = Instant::now();

        self.deps
            .results
            .update_status(scan.id, ScanStatus::Running, None)
            .await?;
        scan.status = ScanStatus::Running;
        info!(scan_id = %scan.id, database = %connection, "Scan started");

        let session = {
            let credentials = self.deps.credentials.resolve(connection)?;
            self.deps.inspector.connect(connection, &credentials).await?
        };

        let walked = walker::walk(session.as_ref(), &self.deps.engine, &self.config).await;
        if let Err(e) = session.close().await {
            warn!(scan_id = %scan.id, error = %e, "Failed to close inspector session");
        }
        let outcome = walked?;

        let duration_milliseconds = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let completed_at = Utc::now();

        scan.summary = outcome.summary(duration_milliseconds);
        scan.schemas = outcome.schemas;
        scan.status = ScanStatus::Completed;
        scan.completed_at = Some(completed_at);
        scan.error_message = None;

        self.deps.results.update_full(scan).await?;

        if let Err(e) = self
            .deps
            .connections
            .update_last_scanned_at(connection.id, completed_at)
            .await
        {
            warn!(scan_id = %scan.id, database = %connection, error = %e, "Failed to update last scanned time");
        }

        info!(
            scan_id = %scan.id,
            schemas = scan.summary.total_schemas,
            tables = scan.summary.total_tables,
            columns = scan.summary.total_columns,
            classified = scan.summary.classified_columns,
            risk = %scan.summary.risk_level,
            duration_ms = duration_milliseconds,
            "Scan completed"
        );
        Ok(())
    }
}

//! MySQL schema inspector backed by an `sqlx` pool.
//!
//! # Security Features
//! - Sessions are read-only at the MySQL level
//! - Connection errors name the host, never the password
//! - Only `INFORMATION_SCHEMA` is queried

use super::{ColumnMetadata, InspectorSession, SchemaInspector};
use crate::Result;
use crate::config::ServiceConfig;
use crate::error::{ColscanError, redact_database_url};
use crate::models::DatabaseConnection;
use crate::security::Credentials;
use async_trait::async_trait;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use sqlx::{Executor, Row};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Opens pooled MySQL sessions.
#[derive(Debug, Clone)]
pub struct MySqlInspector {
    connect_timeout: Duration,
    max_connections: u32,
}

impl Default for MySqlInspector {
    fn default() -> Self {
        Self::from_config(&ServiceConfig::default())
    }
}

impl MySqlInspector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes pool size and connect timeout from the service configuration.
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self {
            connect_timeout: config.connect_timeout,
            max_connections: config.max_connections,
        }
    }

    /// Builder method to set the connect timeout.
    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    /// Builder method to set the pool size.
    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections.max(1);
        self
    }
}

/// Builds the driver URL for a connection record.
///
/// Sessions connect to `information_schema` so that a record without a
/// database name still works. Username and password are percent-encoded.
///
/// # Errors
/// Returns a configuration error if the host does not form a valid URL.
pub fn build_connection_url(
    connection: &DatabaseConnection,
    credentials: &Credentials,
) -> Result<String> {
    let mut url = Url::parse(&format!(
        "mysql://{}:{}/information_schema",
        connection.host, connection.port
    ))
    .map_err(|e| {
        ColscanError::configuration(format!("Invalid host for {}: {}", connection, e))
    })?;

    url.set_username(credentials.username())
        .and_then(|()| url.set_password(credentials.password()))
        .map_err(|()| {
            ColscanError::configuration(format!("Cannot set credentials for {}", connection))
        })?;

    Ok(url.to_string())
}

#[async_trait]
impl SchemaInspector for MySqlInspector {
    fn backend(&self) -> &'static str {
        "mysql"
    }

    async fn connect(
        &self,
        connection: &DatabaseConnection,
        credentials: &Credentials,
    ) -> Result<Box<dyn InspectorSession>> {
        let url = zeroize::Zeroizing::new(build_connection_url(connection, credentials)?);
        debug!(target_url = %redact_database_url(&url), "Opening MySQL inspector session");

        let pool = MySqlPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.connect_timeout)
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    conn.execute("SET SESSION TRANSACTION READ ONLY").await?;
                    Ok(())
                })
            })
            .connect_lazy(&url)
            .map_err(|e| {
                ColscanError::connection_failed(
                    format!("Failed to create MySQL pool for {}", connection),
                    e,
                )
            })?;

        // connect_lazy defers the handshake; surface auth/network errors now
        if let Err(e) = sqlx::query("SELECT 1").execute(&pool).await {
            pool.close().await;
            return Err(ColscanError::connection_failed(
                format!("Failed to connect to MySQL at {}", connection),
                e,
            ));
        }

        info!(database = %connection, "Connected to MySQL");
        Ok(Box::new(MySqlSession { pool }))
    }
}

struct MySqlSession {
    pool: MySqlPool,
}

#[async_trait]
impl InspectorSession for MySqlSession {
    async fn list_schemas(&self) -> Result<Vec<String>> {
        // Cast to CHAR to avoid VARBINARY type issues in MySQL 8.0+
        let schemas: Vec<String> = sqlx::query_scalar(
            "SELECT CAST(SCHEMA_NAME AS CHAR) AS SCHEMA_NAME \
             FROM INFORMATION_SCHEMA.SCHEMATA \
             ORDER BY SCHEMA_NAME",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ColscanError::inspection_failed("Failed to enumerate schemas", e))?;

        Ok(schemas)
    }

    async fn list_tables(&self, schema: &str) -> Result<Vec<String>> {
        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT CAST(TABLE_NAME AS CHAR) AS TABLE_NAME \
             FROM INFORMATION_SCHEMA.TABLES \
             WHERE TABLE_SCHEMA = ? AND TABLE_TYPE = 'BASE TABLE' \
             ORDER BY TABLE_NAME",
        )
        .bind(schema)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            ColscanError::inspection_failed(
                format!("Failed to enumerate tables of schema '{}'", schema),
                e,
            )
        })?;

        Ok(tables)
    }

    async fn list_columns(&self, schema: &str, table: &str) -> Result<Vec<ColumnMetadata>> {
        let rows = sqlx::query(
            "SELECT \
                CAST(COLUMN_NAME AS CHAR) AS COLUMN_NAME, \
                CAST(DATA_TYPE AS CHAR) AS DATA_TYPE, \
                CAST(IS_NULLABLE AS CHAR) AS IS_NULLABLE, \
                CAST(COLUMN_DEFAULT AS CHAR) AS COLUMN_DEFAULT \
             FROM INFORMATION_SCHEMA.COLUMNS \
             WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? \
             ORDER BY ORDINAL_POSITION",
        )
        .bind(schema)
        .bind(table)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            ColscanError::inspection_failed(
                format!("Failed to enumerate columns of {}.{}", schema, table),
                e,
            )
        })?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in &rows {
            let name: String = row.try_get("COLUMN_NAME").map_err(|e| {
                ColscanError::inspection_failed("Failed to parse column name", e)
            })?;
            let data_type: String = row.try_get("DATA_TYPE").unwrap_or_default();
            let is_nullable: String = row.try_get("IS_NULLABLE").unwrap_or_default();
            let default_value = row
                .try_get::<Option<String>, _>("COLUMN_DEFAULT")
                .ok()
                .flatten();

            columns.push(ColumnMetadata {
                name,
                data_type,
                is_nullable: is_nullable.eq_ignore_ascii_case("YES"),
                default_value,
            });
        }

        Ok(columns)
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        debug!("Closed MySQL inspector session");
        Ok(())
    }
}

//! Enumeration of a target database's schemas, tables, and columns.
//!
//! A [`SchemaInspector`] opens an [`InspectorSession`] for one scan. The
//! session only reads catalog metadata; classification never touches row
//! data.

#[cfg(feature = "mysql")]
pub mod mysql;

use crate::Result;
use crate::models::DatabaseConnection;
use crate::security::Credentials;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(feature = "mysql")]
pub use mysql::MySqlInspector;

/// Catalog schemas of MySQL that never hold user data.
pub const SYSTEM_SCHEMAS: [&str; 4] = ["information_schema", "performance_schema", "mysql", "sys"];

/// True for MySQL's own catalog schemas.
pub fn is_system_schema(schema_name: &str) -> bool {
    SYSTEM_SCHEMAS
        .iter()
        .any(|s| s.eq_ignore_ascii_case(schema_name))
}

/// Column metadata as reported by the target database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
    pub default_value: Option<String>,
}

impl ColumnMetadata {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            is_nullable: true,
            default_value: None,
        }
    }

    /// Builder method to set nullability.
    pub fn with_nullable(mut self, is_nullable: bool) -> Self {
        self.is_nullable = is_nullable;
        self
    }

    /// Builder method to set the default expression.
    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }
}

/// Opens metadata sessions against target databases.
#[async_trait]
pub trait SchemaInspector: Send + Sync {
    /// Short backend name for logs, e.g. "mysql".
    fn backend(&self) -> &'static str;

    /// Connects to `connection` with `credentials`.
    ///
    /// # Errors
    /// Returns a `Connection` error; the message never includes the password.
    async fn connect(
        &self,
        connection: &DatabaseConnection,
        credentials: &Credentials,
    ) -> Result<Box<dyn InspectorSession>>;
}

/// A live metadata session for one scan.
///
/// Listing methods return entries in the database's natural order. Callers
/// must call [`close`](Self::close) once they are done, whether or not the
/// walk succeeded.
#[async_trait]
pub trait InspectorSession: Send + Sync {
    async fn list_schemas(&self) -> Result<Vec<String>>;

    async fn list_tables(&self, schema: &str) -> Result<Vec<String>>;

    async fn list_columns(&self, schema: &str, table: &str) -> Result<Vec<ColumnMetadata>>;

    /// Releases the session's connections.
    async fn close(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_schemas() {
        assert!(is_system_schema("information_schema"));
        assert!(is_system_schema("PERFORMANCE_SCHEMA"));
        assert!(is_system_schema("mysql"));
        assert!(is_system_schema("sys"));
        assert!(!is_system_schema("mysql_app"));
        assert!(!is_system_schema("crm"));
    }

    #[test]
    fn test_column_metadata_builder() {
        let column = ColumnMetadata::new("status", "varchar")
            .with_nullable(false)
            .with_default("active");

        assert_eq!(column.name, "status");
        assert!(!column.is_nullable);
        assert_eq!(column.default_value.as_deref(), Some("active"));
    }
}

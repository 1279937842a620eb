//! Walks an inspector session and classifies every column.

use crate::Result;
use crate::classification::ClassificationEngine;
use crate::config::ServiceConfig;
use crate::inspector::{ColumnMetadata, InspectorSession, is_system_schema};
use crate::models::{
    ClassificationOutcome, ColumnResult, InformationType, RiskLevel, SchemaResult, ScanSummary,
    TableResult,
};
use crate::risk::risk_level;
use std::collections::BTreeMap;
use tracing::debug;

/// Classified tree of one scan plus its running totals.
#[derive(Debug, Default)]
pub(crate) struct WalkOutcome {
    pub(crate) schemas: Vec<SchemaResult>,
    total_tables: usize,
    total_columns: usize,
    classified_columns: usize,
    counts: BTreeMap<InformationType, usize>,
}

impl WalkOutcome {
    pub(crate) fn risk_level(&self) -> RiskLevel {
        risk_level(&self.counts, self.total_columns)
    }

    pub(crate) fn summary(&self, duration_milliseconds: u64) -> ScanSummary {
        ScanSummary {
            total_schemas: self.schemas.len(),
            total_tables: self.total_tables,
            total_columns: self.total_columns,
            classified_columns: self.classified_columns,
            information_types_counts: self.counts.clone(),
            risk_level: self.risk_level(),
            duration_milliseconds,
        }
    }

    fn record(&mut self, column: &ColumnResult) {
        self.total_columns += 1;
        if column.information_type.is_classified() {
            self.classified_columns += 1;
            *self.counts.entry(column.information_type).or_insert(0) += 1;
        }
    }
}

fn column_result(metadata: ColumnMetadata, outcome: ClassificationOutcome) -> ColumnResult {
    ColumnResult {
        column_name: metadata.name,
        data_type: metadata.data_type,
        information_type: outcome.information_type,
        confidence_score: outcome.confidence_score,
        matched_patterns: outcome.matched_patterns,
        is_nullable: metadata.is_nullable,
        default_value: metadata.default_value,
    }
}

/// Enumerates schemas, tables, and columns in inspector order and
/// classifies each column with the engine's current snapshot.
///
/// System and configured excluded schemas are skipped.
pub(crate) async fn walk(
    session: &dyn InspectorSession,
    engine: &ClassificationEngine,
    config: &ServiceConfig,
) -> Result<WalkOutcome> {
    let mut outcome = WalkOutcome::default();

    for schema_name in session.list_schemas().await? {
        if is_system_schema(&schema_name) || config.is_excluded_schema(&schema_name) {
            debug!(schema = %schema_name, "Skipping excluded schema");
            continue;
        }

        let mut tables = Vec::new();
        for table_name in session.list_tables(&schema_name).await? {
            let columns: Vec<ColumnResult> = session
                .list_columns(&schema_name, &table_name)
                .await?
                .into_iter()
                .map(|metadata| {
                    let classified = engine.classify(&metadata.name);
                    column_result(metadata, classified)
                })
                .collect();

            for column in &columns {
                outcome.record(column);
            }
            debug!(
                schema = %schema_name,
                table = %table_name,
                columns = columns.len(),
                "Classified table"
            );

            outcome.total_tables += 1;
            tables.push(TableResult {
                table_name,
                columns,
            });
        }

        outcome.schemas.push(SchemaResult {
            schema_name,
            tables,
        });
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ColscanError;
    use crate::models::ClassificationRule;
    use async_trait::async_trait;

    struct TwoSchemaSession {
        fail_on_table: Option<&'static str>,
    }

    #[async_trait]
    impl InspectorSession for TwoSchemaSession {
        async fn list_schemas(&self) -> Result<Vec<String>> {
            Ok(vec![
                "information_schema".to_string(),
                "crm".to_string(),
                "audit".to_string(),
            ])
        }

        async fn list_tables(&self, schema: &str) -> Result<Vec<String>> {
            Ok(match schema {
                "crm" => vec!["customers".to_string(), "orders".to_string()],
                _ => vec!["events".to_string()],
            })
        }

        async fn list_columns(&self, _schema: &str, table: &str) -> Result<Vec<ColumnMetadata>> {
            if self.fail_on_table == Some(table) {
                return Err(ColscanError::invalid_state("metadata unavailable"));
            }
            Ok(match table {
                "customers" => vec![
                    ColumnMetadata::new("id", "int").with_nullable(false),
                    ColumnMetadata::new("email", "varchar"),
                    ColumnMetadata::new("ssn", "char"),
                ],
                "orders" => vec![ColumnMetadata::new("total", "decimal")],
                _ => vec![ColumnMetadata::new("payload", "json")],
            })
        }

        async fn close(&self) -> Result<()> {
            Ok(())
        }
    }

    fn engine() -> ClassificationEngine {
        ClassificationEngine::from_rules(
            &[
                ClassificationRule::new(InformationType::EmailAddress, "email", "", 90),
                ClassificationRule::new(InformationType::Ssn, "ssn", "", 95),
            ],
            crate::classification::DEFAULT_REGEX_SIZE_LIMIT,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_walk_builds_tree_and_counts() {
        let session = TwoSchemaSession {
            fail_on_table: None,
        };
        let outcome = walk(&session, &engine(), &ServiceConfig::default())
            .await
            .unwrap();

        let names: Vec<_> = outcome.schemas.iter().map(|s| s.schema_name.as_str()).collect();
        assert_eq!(names, vec!["crm", "audit"]);

        let summary = outcome.summary(12);
        assert_eq!(summary.total_schemas, 2);
        assert_eq!(summary.total_tables, 3);
        assert_eq!(summary.total_columns, 5);
        assert_eq!(summary.classified_columns, 2);
        assert_eq!(summary.information_types_counts[&InformationType::Ssn], 1);
        assert_eq!(summary.risk_level, RiskLevel::Critical);
        assert_eq!(summary.duration_milliseconds, 12);

        let id_column = &outcome.schemas[0].tables[0].columns[0];
        assert_eq!(id_column.information_type, InformationType::NotApplicable);
        assert!(!id_column.is_nullable);
    }

    #[tokio::test]
    async fn test_walk_honours_configured_exclusions() {
        let session = TwoSchemaSession {
            fail_on_table: None,
        };
        let config = ServiceConfig::default().with_excluded_schemas(["audit"]);
        let outcome = walk(&session, &engine(), &config).await.unwrap();

        // system schemas stay excluded even when the list is replaced
        let names: Vec<_> = outcome.schemas.iter().map(|s| s.schema_name.as_str()).collect();
        assert_eq!(names, vec!["crm"]);
    }

    #[tokio::test]
    async fn test_walk_propagates_inspection_errors() {
        let session = TwoSchemaSession {
            fail_on_table: Some("orders"),
        };
        let result = walk(&session, &engine(), &ServiceConfig::default()).await;
        assert!(result.is_err());
    }
}

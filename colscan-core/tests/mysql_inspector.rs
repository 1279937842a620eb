//! MySQL inspector integration tests.
//!
//! These start a MySQL container and need a running Docker daemon.

#![cfg(feature = "mysql")]

use colscan_core::classification::{ClassificationEngine, PatternCatalog};
use colscan_core::config::ServiceConfig;
use colscan_core::error::ColscanError;
use colscan_core::inspector::{InspectorSession, MySqlInspector, SchemaInspector};
use colscan_core::models::{DatabaseConnection, InformationType, ScanStatus};
use colscan_core::scan::{ScanDependencies, ScanOrchestrator};
use colscan_core::security::{Credentials, StaticCredentialResolver};
use colscan_core::store::{ConnectionStore, MemoryConnectionStore, MemoryPatternStore, MemoryResultStore};
use sqlx::MySqlPool;
use std::sync::Arc;
use std::time::Duration;
use testcontainers_modules::{mysql::Mysql, testcontainers::runners::AsyncRunner};

/// Waits until MySQL accepts queries
async fn wait_for_mysql_ready(database_url: &str, max_attempts: u32) -> MySqlPool {
    for _ in 0..max_attempts {
        if let Ok(pool) = MySqlPool::connect(database_url).await {
            if sqlx::query("SELECT 1").execute(&pool).await.is_ok() {
                return pool;
            }
            pool.close().await;
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
    panic!("MySQL failed to become ready after {} attempts", max_attempts);
}

#[tokio::test]
#[ignore = "requires Docker for the MySQL container"]
async fn test_mysql_inspector_lists_catalog() {
    let mysql = Mysql::default().start().await.unwrap();
    let port = mysql.get_host_port_ipv4(3306).await.unwrap();
    let database_url = format!("mysql://root@localhost:{}/test", port);

    let pool = wait_for_mysql_ready(&database_url, 30).await;
    sqlx::query(
        "CREATE TABLE customers (
            id INT AUTO_INCREMENT PRIMARY KEY,
            email VARCHAR(255) NOT NULL,
            status VARCHAR(16) DEFAULT 'active',
            ssn CHAR(11)
        )",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query("CREATE VIEW customer_emails AS SELECT email FROM customers")
        .execute(&pool)
        .await
        .unwrap();
    pool.close().await;

    let connection = DatabaseConnection::new("localhost", port, "root").with_database_name("test");
    let credentials = Credentials::new("root".to_string(), None);

    let session = MySqlInspector::new()
        .connect(&connection, &credentials)
        .await
        .unwrap();

    let schemas = session.list_schemas().await.unwrap();
    assert!(schemas.contains(&"test".to_string()));
    assert!(schemas.contains(&"information_schema".to_string()));

    // views are not base tables
    let tables = session.list_tables("test").await.unwrap();
    assert_eq!(tables, vec!["customers".to_string()]);

    let columns = session.list_columns("test", "customers").await.unwrap();
    let names: Vec<_> = columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["id", "email", "status", "ssn"]);
    assert!(!columns[1].is_nullable);
    assert!(columns[3].is_nullable);
    assert_eq!(columns[2].default_value.as_deref(), Some("active"));
    assert_eq!(columns[1].data_type, "varchar");

    session.close().await.unwrap();
}

#[tokio::test]
#[ignore = "requires Docker for the MySQL container"]
async fn test_mysql_full_scan_integration() {
    let mysql = Mysql::default().start().await.unwrap();
    let port = mysql.get_host_port_ipv4(3306).await.unwrap();
    let database_url = format!("mysql://root@localhost:{}/test", port);

    let pool = wait_for_mysql_ready(&database_url, 30).await;
    sqlx::query(
        "CREATE TABLE users (
            id INT AUTO_INCREMENT PRIMARY KEY,
            first_name VARCHAR(100),
            email_address VARCHAR(255),
            phone VARCHAR(32),
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(&pool)
    .await
    .unwrap();
    pool.close().await;

    let engine = Arc::new(ClassificationEngine::new());
    let catalog = PatternCatalog::new(Arc::new(MemoryPatternStore::new()), Arc::clone(&engine));
    catalog.ensure_seeded(None).await.unwrap();

    let connection = DatabaseConnection::new("localhost", port, "root").with_database_name("test");
    let connections = Arc::new(MemoryConnectionStore::new());
    connections.create(&connection).await.unwrap();
    let credentials = StaticCredentialResolver::new();
    credentials.insert(connection.id, Credentials::new("root".to_string(), None));

    let config = ServiceConfig::default();
    let orchestrator = ScanOrchestrator::new(
        ScanDependencies {
            results: Arc::new(MemoryResultStore::new()),
            connections,
            credentials: Arc::new(credentials),
            inspector: Arc::new(MySqlInspector::from_config(&config)),
            engine,
        },
        config,
    )
    .unwrap();

    let scan_id = orchestrator.start_scan(connection.id).await.unwrap();
    orchestrator.wait_for(scan_id).await;
    let scan = orchestrator.get_scan_result(scan_id).await.unwrap();

    assert_eq!(scan.status, ScanStatus::Completed, "{:?}", scan.error_message);
    let test_schema = scan
        .schemas
        .iter()
        .find(|s| s.schema_name == "test")
        .unwrap();
    let columns = &test_schema.tables[0].columns;
    assert_eq!(columns[1].information_type, InformationType::FirstName);
    assert_eq!(columns[2].information_type, InformationType::EmailAddress);
    assert_eq!(columns[3].information_type, InformationType::PhoneNumber);
    assert!(scan.schemas.iter().all(|s| s.schema_name != "mysql"));
}

#[tokio::test]
async fn test_mysql_connection_failure_is_sanitized() {
    let connection = DatabaseConnection::new("127.0.0.1", 1, "scanner");
    let credentials = Credentials::new("scanner".to_string(), Some("top-secret".to_string()));

    let result = MySqlInspector::new()
        .with_connect_timeout(Duration::from_secs(2))
        .connect(&connection, &credentials)
        .await;

    let Err(error) = result else {
        panic!("connection to a closed port should fail");
    };
    assert!(matches!(error, ColscanError::Connection { .. }));
    assert!(!error.to_string().contains("top-secret"));
    assert!(error.to_string().contains("127.0.0.1:1"));
}

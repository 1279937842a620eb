//! Command implementations.
//!
//! Each command returns its data; printing is left to the binary.

use colscan_core::classification::seeds::load_rules;
use colscan_core::classification::{ClassificationEngine, DEFAULT_REGEX_SIZE_LIMIT};
use colscan_core::error::ColscanError;
use colscan_core::models::{
    ClassificationOutcome, ClassificationRule, InformationType, RiskTier, ScanResult, ScanStatus,
};
use colscan_core::Result;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

/// One classified column name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedName {
    pub column_name: String,
    #[serde(flatten)]
    pub outcome: ClassificationOutcome,
}

/// An information type and the risk tier it contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TypeListing {
    pub information_type: InformationType,
    pub risk_tier: RiskTier,
}

async fn load_engine(patterns: Option<&Path>) -> Result<ClassificationEngine> {
    let rules = load_rules(patterns).await?;
    debug!("Loaded {} classification rules", rules.len());
    ClassificationEngine::from_rules(&rules, DEFAULT_REGEX_SIZE_LIMIT)
}

/// Classifies each name against the built-in rules or `patterns`.
///
/// # Errors
/// Fails if the pattern file cannot be read or holds an invalid regex.
pub async fn classify(names: &[String], patterns: Option<&Path>) -> Result<Vec<ClassifiedName>> {
    let engine = load_engine(patterns).await?;
    Ok(names
        .iter()
        .map(|name| ClassifiedName {
            column_name: name.clone(),
            outcome: engine.classify(name),
        })
        .collect())
}

/// Compiles the rule set and returns it in evaluation order.
///
/// # Errors
/// Fails if the pattern file cannot be read or holds an invalid regex.
pub async fn patterns(patterns: Option<&Path>) -> Result<Vec<ClassificationRule>> {
    let engine = load_engine(patterns).await?;
    Ok(engine
        .snapshot()
        .patterns()
        .iter()
        .map(|p| p.rule().clone())
        .collect())
}

/// Every information type with its risk tier, `N/A` first.
pub fn types() -> Vec<TypeListing> {
    InformationType::ALL
        .iter()
        .map(|t| TypeListing {
            information_type: *t,
            risk_tier: t.risk_tier(),
        })
        .collect()
}

/// Runs a single scan of `database_url` through in-memory stores.
///
/// The returned result may be `Failed`; see [`ensure_succeeded`].
///
/// # Errors
/// Fails before the scan starts on a bad URL, bad pattern file, or an
/// invalid configuration.
#[cfg(feature = "mysql")]
pub async fn scan(database_url: &str, patterns: Option<&Path>) -> Result<ScanResult> {
    use colscan_core::classification::PatternCatalog;
    use colscan_core::config::ServiceConfig;
    use colscan_core::inspector::MySqlInspector;
    use colscan_core::scan::{ScanDependencies, ScanOrchestrator};
    use colscan_core::security::{StaticCredentialResolver, parse_connection_string};
    use colscan_core::store::{
        ConnectionStore, MemoryConnectionStore, MemoryPatternStore, MemoryResultStore,
    };
    use std::sync::Arc;

    let (info, credentials) = parse_connection_string(database_url)?;
    info!("Target: {}", info.to_safe_string());

    let mut config = ServiceConfig::default();
    if let Some(path) = patterns {
        config = config.with_pattern_seed_path(path);
    }
    config.validate()?;

    let engine = Arc::new(ClassificationEngine::with_size_limit(config.regex_size_limit));
    let catalog = PatternCatalog::new(Arc::new(MemoryPatternStore::new()), Arc::clone(&engine));
    let seeded = catalog
        .ensure_seeded(config.pattern_seed_path.as_deref())
        .await?;
    debug!("Seeded {} classification rules", seeded);

    let connection = info.to_database_connection(&credentials);
    let connections = Arc::new(MemoryConnectionStore::new());
    connections.create(&connection).await?;

    let resolver = StaticCredentialResolver::new();
    resolver.insert(connection.id, credentials);

    let inspector = MySqlInspector::from_config(&config);
    let orchestrator = ScanOrchestrator::new(
        ScanDependencies {
            results: Arc::new(MemoryResultStore::new()),
            connections,
            credentials: Arc::new(resolver),
            inspector: Arc::new(inspector),
            engine,
        },
        config,
    )?;

    let scan_id = orchestrator.start_scan(connection.id).await?;
    orchestrator.wait_for(scan_id).await;
    orchestrator.get_scan_result(scan_id).await
}

#[cfg(not(feature = "mysql"))]
pub async fn scan(_database_url: &str, _patterns: Option<&Path>) -> Result<ScanResult> {
    Err(ColscanError::configuration(
        "MySQL support not available. Compile with --features mysql",
    ))
}

/// Turns a `Failed` or `Cancelled` scan into an error.
///
/// # Errors
/// Returns `InvalidState` carrying the scan's error message.
pub fn ensure_succeeded(scan: &ScanResult) -> Result<()> {
    match scan.status {
        ScanStatus::Completed => Ok(()),
        status => Err(ColscanError::invalid_state(format!(
            "Scan {} {}: {}",
            scan.id,
            status,
            scan.error_message.as_deref().unwrap_or("no error recorded")
        ))),
    }
}

/// Serializes `value` as pretty JSON to `output`, or stdout when `None`.
///
/// # Errors
/// Returns `Serialization` or `Io` on failure.
pub async fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| ColscanError::Serialization {
        context: "Failed to encode output".to_string(),
        source: e,
    })?;

    match output {
        Some(path) => {
            tokio::fs::write(path, json)
                .await
                .map_err(|e| ColscanError::Io {
                    context: format!("Failed to write to {}", path.display()),
                    source: e,
                })?;
            info!("Wrote {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

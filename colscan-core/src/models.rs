//! Core data models for classification rules, connections, and scan results.
//!
//! All models are serializable with snake_case field names so that stored
//! results and CLI output share one JSON shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Category of sensitive data a column may hold.
///
/// `NotApplicable` (serialized as `"N/A"`) is the sentinel for columns that
/// matched no rule.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InformationType {
    #[default]
    #[serde(rename = "N/A")]
    NotApplicable,
    FirstName,
    LastName,
    FullName,
    Username,
    EmailAddress,
    PhoneNumber,
    CreditCardNumber,
    AccountNumber,
    Ssn,
    PassportNumber,
    IpAddress,
    MacAddress,
    Address,
    PostalCode,
    DateOfBirth,
    NationalId,
    BankAccount,
    DriverLicense,
}

/// Risk partition an information type contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    High,
    Medium,
    None,
}

impl InformationType {
    /// Every information type, `NotApplicable` first.
    pub const ALL: [InformationType; 19] = [
        InformationType::NotApplicable,
        InformationType::FirstName,
        InformationType::LastName,
        InformationType::FullName,
        InformationType::Username,
        InformationType::EmailAddress,
        InformationType::PhoneNumber,
        InformationType::CreditCardNumber,
        InformationType::AccountNumber,
        InformationType::Ssn,
        InformationType::PassportNumber,
        InformationType::IpAddress,
        InformationType::MacAddress,
        InformationType::Address,
        InformationType::PostalCode,
        InformationType::DateOfBirth,
        InformationType::NationalId,
        InformationType::BankAccount,
        InformationType::DriverLicense,
    ];

    /// Wire name, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            InformationType::NotApplicable => "N/A",
            InformationType::FirstName => "FIRST_NAME",
            InformationType::LastName => "LAST_NAME",
            InformationType::FullName => "FULL_NAME",
            InformationType::Username => "USERNAME",
            InformationType::EmailAddress => "EMAIL_ADDRESS",
            InformationType::PhoneNumber => "PHONE_NUMBER",
            InformationType::CreditCardNumber => "CREDIT_CARD_NUMBER",
            InformationType::AccountNumber => "ACCOUNT_NUMBER",
            InformationType::Ssn => "SSN",
            InformationType::PassportNumber => "PASSPORT_NUMBER",
            InformationType::IpAddress => "IP_ADDRESS",
            InformationType::MacAddress => "MAC_ADDRESS",
            InformationType::Address => "ADDRESS",
            InformationType::PostalCode => "POSTAL_CODE",
            InformationType::DateOfBirth => "DATE_OF_BIRTH",
            InformationType::NationalId => "NATIONAL_ID",
            InformationType::BankAccount => "BANK_ACCOUNT",
            InformationType::DriverLicense => "DRIVER_LICENSE",
        }
    }

    /// True for every type except the `N/A` sentinel.
    pub fn is_classified(&self) -> bool {
        !matches!(self, InformationType::NotApplicable)
    }

    /// Risk partition used by the risk scorer.
    pub fn risk_tier(&self) -> RiskTier {
        match self {
            InformationType::CreditCardNumber
            | InformationType::Ssn
            | InformationType::PassportNumber
            | InformationType::NationalId
            | InformationType::BankAccount => RiskTier::High,
            InformationType::EmailAddress
            | InformationType::PhoneNumber
            | InformationType::DateOfBirth
            | InformationType::DriverLicense
            | InformationType::AccountNumber => RiskTier::Medium,
            _ => RiskTier::None,
        }
    }
}

impl std::fmt::Display for InformationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InformationType {
    type Err = crate::error::ColscanError;

    fn from_str(s: &str) -> crate::Result<Self> {
        let wanted = s.trim().to_ascii_uppercase();
        if wanted == "NA" {
            return Ok(InformationType::NotApplicable);
        }
        InformationType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| {
                crate::error::ColscanError::configuration(format!(
                    "Unknown information type: {}",
                    s
                ))
            })
    }
}

/// Aggregate risk rating of a scanned database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
            RiskLevel::Critical => write!(f, "critical"),
        }
    }
}

/// Lifecycle state of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl ScanStatus {
    /// Completed, Failed and Cancelled are terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ScanStatus::Completed | ScanStatus::Failed | ScanStatus::Cancelled
        )
    }

    /// Only Pending and Running scans accept a cancel request.
    pub fn is_cancelable(&self) -> bool {
        matches!(self, ScanStatus::Pending | ScanStatus::Running)
    }
}

impl std::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanStatus::Pending => write!(f, "pending"),
            ScanStatus::Running => write!(f, "running"),
            ScanStatus::Completed => write!(f, "completed"),
            ScanStatus::Failed => write!(f, "failed"),
            ScanStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Lowest accepted rule priority.
pub const PRIORITY_MIN: u8 = 1;
/// Highest accepted rule priority.
pub const PRIORITY_MAX: u8 = 100;

/// A detection rule as held by the pattern store.
///
/// `priority` is only range-checked when a rule enters through
/// [`PatternRequest::validate`]; the catalog and seed loaders call it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRule {
    pub id: Uuid,
    pub information_type: InformationType,
    /// Regular expression source, matched against normalized column names
    pub pattern: String,
    pub description: String,
    /// 1-100, higher wins
    pub priority: u8,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClassificationRule {
    /// Creates a new active rule with a fresh id.
    pub fn new(
        information_type: InformationType,
        pattern: impl Into<String>,
        description: impl Into<String>,
        priority: u8,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            information_type,
            pattern: pattern.into(),
            description: description.into(),
            priority,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder method to mark the rule inactive.
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}

/// Create/update payload for a classification rule.
///
/// Also the on-disk shape of pattern seed files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRequest {
    pub information_type: InformationType,
    pub pattern: String,
    pub description: String,
    pub priority: u8,
}

impl PatternRequest {
    /// Creates a new request.
    pub fn new(
        information_type: InformationType,
        pattern: impl Into<String>,
        description: impl Into<String>,
        priority: u8,
    ) -> Self {
        Self {
            information_type,
            pattern: pattern.into(),
            description: description.into(),
            priority,
        }
    }

    /// Checks the fields a stored rule must satisfy: a non-empty pattern,
    /// a priority in 1-100, and a real information type (not `N/A`).
    ///
    /// Regex syntax is checked separately, at compile time.
    ///
    /// # Errors
    /// Returns `Configuration` naming the first violated constraint.
    pub fn validate(&self) -> crate::Result<()> {
        if self.pattern.trim().is_empty() {
            return Err(crate::error::ColscanError::configuration(
                "Pattern must not be empty",
            ));
        }
        if !(PRIORITY_MIN..=PRIORITY_MAX).contains(&self.priority) {
            return Err(crate::error::ColscanError::configuration(format!(
                "Priority must be between {} and {}, got {} for pattern '{}'",
                PRIORITY_MIN, PRIORITY_MAX, self.priority, self.pattern
            )));
        }
        if !self.information_type.is_classified() {
            return Err(crate::error::ColscanError::configuration(format!(
                "Pattern '{}' must target an information type other than {}",
                self.pattern, self.information_type
            )));
        }
        Ok(())
    }

    /// Turns the request into a fresh active rule.
    ///
    /// Performs no validation; see [`Self::validate`].
    pub fn into_rule(self) -> ClassificationRule {
        ClassificationRule::new(
            self.information_type,
            self.pattern,
            self.description,
            self.priority,
        )
    }
}

/// Result of classifying a single column name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ClassificationOutcome {
    pub information_type: InformationType,
    pub confidence_score: f64,
    /// Pattern texts of every matching rule, highest score first
    pub matched_patterns: Vec<String>,
}

impl ClassificationOutcome {
    /// The `N/A` outcome.
    pub fn unclassified() -> Self {
        Self::default()
    }
}

/// Classification of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnResult {
    pub column_name: String,
    pub data_type: String,
    pub information_type: InformationType,
    pub confidence_score: f64,
    pub matched_patterns: Vec<String>,
    pub is_nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

/// Classified columns of one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableResult {
    pub table_name: String,
    pub columns: Vec<ColumnResult>,
}

/// Classified tables of one schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaResult {
    pub schema_name: String,
    pub tables: Vec<TableResult>,
}

/// Aggregated counts and risk of a scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ScanSummary {
    pub total_schemas: usize,
    pub total_tables: usize,
    pub total_columns: usize,
    pub classified_columns: usize,
    pub information_types_counts: BTreeMap<InformationType, usize>,
    pub risk_level: RiskLevel,
    pub duration_milliseconds: u64,
}

/// A scan of one database connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub id: Uuid,
    pub database_id: Uuid,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub status: ScanStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub schemas: Vec<SchemaResult>,
    pub summary: ScanSummary,
}

impl ScanResult {
    /// Creates a fresh `Pending` scan for a database, started now.
    pub fn pending(database_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            database_id,
            started_at: Utc::now(),
            completed_at: None,
            status: ScanStatus::Pending,
            error_message: None,
            schemas: Vec::new(),
            summary: ScanSummary::default(),
        }
    }
}

/// A registered target database.
///
/// # Security
/// The sealed password is never serialized and never shown by `Debug` or
/// `Display`.
#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseConnection {
    pub id: Uuid,
    pub host: String,
    pub port: u16,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub encrypted_password: String,
    pub database_name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_scanned_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl DatabaseConnection {
    /// Creates a new active connection record with a fresh id.
    pub fn new(host: impl Into<String>, port: u16, username: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            host: host.into(),
            port,
            username: username.into(),
            encrypted_password: String::new(),
            database_name: String::new(),
            description: String::new(),
            created_at: now,
            updated_at: now,
            last_scanned_at: None,
            is_active: true,
        }
    }

    /// Builder method to set the database name.
    pub fn with_database_name(mut self, database_name: impl Into<String>) -> Self {
        self.database_name = database_name.into();
        self
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder method to set the sealed password.
    pub fn with_encrypted_password(mut self, encrypted_password: impl Into<String>) -> Self {
        self.encrypted_password = encrypted_password.into();
        self
    }
}

impl std::fmt::Debug for DatabaseConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConnection")
            .field("id", &self.id)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_name", &self.database_name)
            .field("last_scanned_at", &self.last_scanned_at)
            .field("is_active", &self.is_active)
            // username and sealed password are intentionally omitted
            .finish_non_exhaustive()
    }
}

impl std::fmt::Display for DatabaseConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)?;
        if !self.database_name.is_empty() {
            write!(f, "/{}", self.database_name)?;
        }
        Ok(())
    }
}

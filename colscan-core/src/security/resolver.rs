//! Resolution of login credentials for registered connections.

use super::credentials::Credentials;
use crate::Result;
use crate::error::ColscanError;
use crate::models::DatabaseConnection;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use uuid::Uuid;

#[cfg(feature = "encryption")]
use super::encryption::PasswordCipher;

/// Produces the credentials a scan uses to log in to a target database.
pub trait CredentialResolver: Send + Sync {
    /// # Errors
    /// Fails if no credentials can be produced for `connection`; the scan
    /// is then marked failed.
    fn resolve(&self, connection: &DatabaseConnection) -> Result<Credentials>;
}

/// Credentials held in memory, keyed by connection id.
#[derive(Default)]
pub struct StaticCredentialResolver {
    credentials: RwLock<HashMap<Uuid, Credentials>>,
}

impl StaticCredentialResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the credentials for a connection.
    pub fn insert(&self, connection_id: Uuid, credentials: Credentials) {
        self.credentials
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(connection_id, credentials);
    }
}

impl CredentialResolver for StaticCredentialResolver {
    fn resolve(&self, connection: &DatabaseConnection) -> Result<Credentials> {
        self.credentials
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&connection.id)
            .cloned()
            .ok_or_else(|| ColscanError::not_found("Credentials for database connection", connection.id))
    }
}

impl std::fmt::Debug for StaticCredentialResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self
            .credentials
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("StaticCredentialResolver")
            .field("connections", &count)
            .finish()
    }
}

/// Opens the sealed password stored on each connection record.
#[cfg(feature = "encryption")]
#[derive(Debug, Clone)]
pub struct SealedCredentialResolver {
    cipher: PasswordCipher,
}

#[cfg(feature = "encryption")]
impl SealedCredentialResolver {
    pub fn new(cipher: PasswordCipher) -> Self {
        Self { cipher }
    }
}

#[cfg(feature = "encryption")]
impl CredentialResolver for SealedCredentialResolver {
    fn resolve(&self, connection: &DatabaseConnection) -> Result<Credentials> {
        let password = if connection.encrypted_password.is_empty() {
            None
        } else {
            let opened = self.cipher.open(&connection.encrypted_password)?;
            Some(opened.as_str().to_string())
        };
        Ok(Credentials::new(connection.username.clone(), password))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_credential_resolver() {
        let resolver = StaticCredentialResolver::new();
        let connection = DatabaseConnection::new("localhost", 3306, "scanner");

        assert!(resolver.resolve(&connection).unwrap_err().is_not_found());

        resolver.insert(
            connection.id,
            Credentials::new("scanner".to_string(), Some("pw".to_string())),
        );
        let creds = resolver.resolve(&connection).unwrap();
        assert_eq!(creds.username(), "scanner");
        assert_eq!(creds.password(), Some("pw"));
        assert!(!format!("{:?}", resolver).contains("pw"));
    }

    #[cfg(feature = "encryption")]
    #[test]
    fn test_sealed_credential_resolver() {
        let cipher = PasswordCipher::new(&[3u8; 32]).unwrap();
        let connection = DatabaseConnection::new("localhost", 3306, "scanner")
            .with_encrypted_password(cipher.seal("pw").unwrap());

        let resolver = SealedCredentialResolver::new(cipher);
        let creds = resolver.resolve(&connection).unwrap();
        assert_eq!(creds.username(), "scanner");
        assert_eq!(creds.password(), Some("pw"));
    }

    #[cfg(feature = "encryption")]
    #[test]
    fn test_sealed_credential_resolver_bad_secret() {
        let resolver = SealedCredentialResolver::new(PasswordCipher::new(&[3u8; 32]).unwrap());
        let connection = DatabaseConnection::new("localhost", 3306, "scanner")
            .with_encrypted_password("garbage");
        assert!(resolver.resolve(&connection).is_err());

        let no_password = DatabaseConnection::new("localhost", 3306, "scanner");
        assert!(!resolver.resolve(&no_password).unwrap().has_password());
    }
}

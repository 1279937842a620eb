//! Credential handling for scans.
//!
//! - `credentials`: zeroizing login container
//! - `connection`: URL parsing that splits out credentials
//! - `resolver`: how a scan obtains credentials for a connection record
//! - `encryption`: AES-GCM sealing of stored passwords (feature-gated)
//!
//! # Security Guarantees
//! - Credentials are held in `Zeroizing` containers
//! - Passwords never appear in `Debug` output, logs, or error messages

mod connection;
mod credentials;
mod resolver;

#[cfg(feature = "encryption")]
pub mod encryption;

pub use connection::{ConnectionInfo, MYSQL_DEFAULT_PORT, parse_connection_string};
pub use credentials::Credentials;
#[cfg(feature = "encryption")]
pub use encryption::PasswordCipher;
#[cfg(feature = "encryption")]
pub use resolver::SealedCredentialResolver;
pub use resolver::{CredentialResolver, StaticCredentialResolver};

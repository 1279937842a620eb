//! Credential container with automatic memory zeroing.
//!
//! # Security
//! - Username and password live in `Zeroizing` containers
//! - Memory is cleared when the credentials go out of scope
//! - The password never appears in `Debug` output

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Login for a target database, zeroed on drop.
///
/// # Example
///
/// ```rust
/// use colscan_core::security::Credentials;
///
/// let creds = Credentials::new("scanner".to_string(), Some("secret".to_string()));
/// assert_eq!(creds.username(), "scanner");
/// assert!(creds.has_password());
/// assert!(!format!("{:?}", creds).contains("secret"));
/// ```
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    username: Zeroizing<String>,
    password: Zeroizing<Option<String>>,
}

impl Credentials {
    pub fn new(username: String, password: Option<String>) -> Self {
        Self {
            username: Zeroizing::new(username),
            password: Zeroizing::new(password),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Checks if a password is present without exposing it.
    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }

    /// The password, for handing to a driver. Never log this.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username())
            .field("password", &self.password.as_ref().map(|_| "****"))
            .finish()
    }
}

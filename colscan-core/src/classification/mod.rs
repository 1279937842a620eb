//! Column-name classification.
//!
//! Rules are compiled into an immutable [`PatternSnapshot`] which the
//! [`ClassificationEngine`] publishes atomically. [`PatternCatalog`] layers
//! rule CRUD on a [`PatternStore`](crate::store::PatternStore) and reloads
//! the engine after every write.
//!
//! # Example
//!
//! ```rust
//! use colscan_core::classification::ClassificationEngine;
//! use colscan_core::models::{ClassificationRule, InformationType};
//!
//! let engine = ClassificationEngine::new();
//! engine
//!     .publish(&[ClassificationRule::new(InformationType::Ssn, "ssn", "SSN", 90)])
//!     .unwrap();
//!
//! let outcome = engine.classify("user_ssn");
//! assert_eq!(outcome.information_type, InformationType::Ssn);
//! assert_eq!(outcome.confidence_score, 1.0);
//! ```

pub mod catalog;
pub mod engine;
pub mod scoring;
pub mod seeds;
pub mod snapshot;

pub use catalog::PatternCatalog;
pub use engine::ClassificationEngine;
pub use snapshot::{CompiledPattern, DEFAULT_REGEX_SIZE_LIMIT, PatternSnapshot};

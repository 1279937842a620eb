//! Scan orchestration.
//!
//! [`ScanOrchestrator`] drives each scan through its lifecycle on a tokio
//! task tracked by a [`ScanRegistry`].

pub mod orchestrator;
pub mod registry;
mod walker;

pub use orchestrator::{CANCELLED_BY_USER, ScanDependencies, ScanOrchestrator};
pub use registry::ScanRegistry;

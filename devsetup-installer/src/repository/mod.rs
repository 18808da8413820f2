//! Repository layer
//!
//! The job record store and tool catalog the installer reads and writes
//! through. The installer only depends on these narrow traits; the server
//! provides a PostgreSQL implementation and [`MemoryStore`] serves tests and
//! embedded use.
//!
//! All repositories are trait-based to enable testing and dependency injection.

mod catalog;
mod jobs;
mod memory;

// Re-export traits
pub use catalog::ToolCatalog;
pub use jobs::{JobStore, JobUpdate};

// Re-export implementations
pub use memory::MemoryStore;

/// Result type alias for repository operations
pub type StoreResult<T> = std::result::Result<T, crate::error::StoreError>;

//! Repository Module
//!
//! Data access layer for the server.
//! Each repository handles database operations for a specific domain entity.

pub mod job;
pub mod tool;

// Re-export for convenience
pub use job as job_repository;
pub use tool as tool_repository;

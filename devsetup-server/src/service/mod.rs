//! Service Module
//!
//! Business logic layer for the server.
//! Services orchestrate between repositories and the installer.

pub mod install;
pub mod tool;

// Re-export for convenience
pub use install as install_service;
pub use tool as tool_service;

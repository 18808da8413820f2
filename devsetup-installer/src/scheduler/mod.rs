//! Scheduler layer for the installer
//!
//! This layer turns install requests into batches of jobs and drives them
//! to completion. It owns the registry of active batches and the
//! cancellation bookkeeping.

pub mod installer;
pub mod registry;

pub use installer::{BatchHandle, Installer};
pub use registry::{BatchRegistry, CancelFlag};

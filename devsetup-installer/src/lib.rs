//! Devsetup Installer
//!
//! The installation orchestration engine. It turns an ordered batch of tool
//! install requests into job records, runs one install script per job as a
//! child process, and streams progress to observers.
//!
//! Architecture:
//! - Configuration: interpreter, environment overlay and optional timeout
//! - Repository: the job store and tool catalog traits (plus an in-memory store)
//! - Service: script execution and output capture
//! - Scheduler: the batch orchestrator and the active batch registry
//! - Progress: the broadcast hub and per-batch event streams
//!
//! Jobs within one batch always run strictly one after another. Independent
//! batches run concurrently on their own tasks.

pub mod config;
pub mod error;
pub mod progress;
pub mod repository;
pub mod request;
pub mod scheduler;
pub mod service;

pub use config::InstallerConfig;
pub use error::{InstallError, SpawnError, StoreError};
pub use progress::{BatchProgress, ProgressHub};
pub use repository::{JobStore, JobUpdate, MemoryStore, ToolCatalog};
pub use request::InstallRequest;
pub use scheduler::{BatchHandle, BatchRegistry, Installer};
pub use service::{LineSink, ScriptExecutor, ScriptOutcome, ShellExecutor};

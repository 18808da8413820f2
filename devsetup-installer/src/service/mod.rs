//! Service layer
//!
//! Services contain the execution logic of the installer: launching install
//! scripts, answering their prompts and capturing their output.
//!
//! The executor is trait-based so the orchestrator can be driven by a fake
//! in tests.

mod executor;
mod output_buffer;

// Re-export traits
pub use executor::ScriptExecutor;

// Re-export implementations
pub use executor::{LineSink, ScriptOutcome, ShellExecutor, looks_like_prompt};
pub use output_buffer::{LineSplitter, OutputBuffer};

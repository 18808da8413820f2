//! Core domain types
//!
//! This module contains the core domain structures used across devsetup crates.
//! They are shared between the installer engine (which drives them), the server
//! (which persists them) and the client (which displays them).

pub mod job;
pub mod progress;
pub mod tool;

//! Devsetup Core
//!
//! Core types shared by the devsetup installer, server, client and CLI.
//!
//! This crate contains:
//! - Domain types: Core business entities (Job, Tool, ProgressEvent, etc.)
//! - DTOs: Data transfer objects for the HTTP API

pub mod domain;
pub mod dto;

//! # hearth-types
//!
//! Core type definitions for the hearth conversation pipeline.
//!
//! This crate is the foundation of the dependency graph -- the pipeline
//! crate and the CLI both depend on it. It contains:
//!
//! - **[`error`]** -- [`HearthError`] and the crate-wide [`Result`] alias
//! - **[`config`]** -- Configuration schema (thresholds, windows, persona)
//! - **[`classification`]** -- Categories, intents, entities and the
//!   [`Classification`](classification::Classification) record
//! - **[`context`]** -- Conversation identity, turns and rolling context
//! - **[`action`]** -- Action descriptors and execution results
//! - **[`message`]** -- The persisted message shape used by storage collaborators

pub mod action;
pub mod classification;
pub mod config;
pub mod context;
pub mod error;
pub mod message;

pub use error::{HearthError, Result};

//! # hearth-core
//!
//! Core engine for the hearth home assistant.
//!
//! Contains the understanding pipeline (pattern library, entity extractor,
//! classifier, strategy selector, template responder, action planner),
//! the conversation context manager, the system router that executes
//! planned actions, the chat-backend boundary and the [`Assistant`]
//! façade that ties them together.
//!
//! [`Assistant`]: assistant::Assistant

pub mod assistant;
pub mod backend;
pub mod context;
pub mod pipeline;
pub mod router;

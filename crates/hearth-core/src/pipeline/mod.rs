//! Understanding pipeline.
//!
//! Stages: Extractor -> Classifier -> Strategy -> Responder / Planner
//!
//! Everything here is synchronous and pure apart from the responder's
//! injectable random source. No stage performs I/O.

pub mod traits;
pub mod patterns;
pub mod entities;
pub mod signals;
pub mod classifier;
pub mod strategy;
pub mod subintent;
pub mod random;
pub mod responder;
pub mod planner;

//! Stage trait definitions for the understanding pipeline.
//!
//! The pipeline stages in order:
//! 1. **[`UtteranceClassifier`]** -- Turn raw text (plus a context snapshot)
//!    into a [`Classification`]
//! 2. **Strategy** -- Pick the reply shape from category, intent and
//!    confidence (static table, see [`super::strategy`])
//! 3. **Responder** -- Render a templated reply, drawing variety from a
//!    [`RandomSource`]
//! 4. **Planner** -- Map system-command classifications to action
//!    descriptors (see [`super::planner`])
//!
//! Only the classifier and the random source are trait seams; the other
//! stages are plain lookup tables.

use hearth_types::classification::Classification;
use hearth_types::context::ContextSnapshot;

/// Stage 1: classify a single utterance.
///
/// Implementations must be pure: the same text and snapshot always yield
/// the same classification.
pub trait UtteranceClassifier: Send + Sync {
    /// Classify `text`, optionally biased by a context snapshot.
    fn classify(&self, text: &str, context: Option<&ContextSnapshot>) -> Classification;
}

/// Source of template choices for the responder.
///
/// Production uses a thread-local RNG; tests inject a fixed sequence so
/// rendered text is deterministic.
pub trait RandomSource: Send + Sync {
    /// Pick an index in `0..len`. `len` is always at least 1.
    fn pick(&self, len: usize) -> usize;
}

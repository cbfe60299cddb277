//! Chat backend boundary.
//!
//! A [`ChatBackend`] produces free-form replies for conversational turns.
//! The crate ships no network client; callers attach one. Whatever the
//! backend does, a turn never fails because of it: errors are logged and
//! replaced by a fixed apology at [`DEGRADED_CONFIDENCE`].

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{Stream, StreamExt, stream};
use hearth_types::classification::Classification;
use hearth_types::config::AssistantConfig;
use hearth_types::context::{ContextSnapshot, Turn};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Reply used when the backend cannot produce one.
pub const APOLOGY: &str =
    "I'm sorry, I'm having trouble thinking right now. Please try again in a moment.";

/// Confidence reported for a turn answered with [`APOLOGY`].
pub const DEGRADED_CONFIDENCE: f32 = 0.1;

/// Error type for backend calls.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The backend could not be reached.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The backend did not answer in time.
    #[error("backend timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    /// The backend answered with something unusable.
    #[error("malformed backend response: {0}")]
    Malformed(String),
}

/// A single message in a backend conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendMessage {
    /// `"user"` or `"assistant"`.
    pub role: String,
    pub content: String,
}

/// Everything a backend needs to answer one turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendRequest {
    /// Persona and reply-shaping instructions.
    pub system_prompt: String,
    /// Recent turns, oldest first.
    pub history: Vec<BackendMessage>,
    /// The user's current message.
    pub message: String,
}

/// Stream of reply chunks.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<String, BackendError>> + Send>>;

/// A provider of free-form conversational replies.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Produce a complete reply.
    async fn complete(&self, request: &BackendRequest) -> Result<String, BackendError>;

    /// Produce a reply as a stream of chunks. The default yields the
    /// complete reply as one chunk.
    async fn stream(&self, request: &BackendRequest) -> Result<ChunkStream, BackendError> {
        let text = self.complete(request).await?;
        Ok(Box::pin(stream::once(async move { Ok(text) })))
    }
}

/// Build the system prompt for a turn from persona, classification and
/// context.
pub fn system_prompt(
    config: &AssistantConfig,
    classification: &Classification,
    context: &ContextSnapshot,
) -> String {
    let strategy = &classification.response_strategy;
    let mut prompt = format!(
        "You are {}, a warm and helpful home assistant.\n\
         Reply in a {} tone with a {} approach. Keep the reply {}.\n\
         The user's message reads as {} ({}), tone {}, urgency {}.",
        config.name,
        strategy.tone.as_str(),
        strategy.approach,
        strategy.length.as_str(),
        classification.category,
        classification.intent,
        classification.emotional_tone,
        classification.urgency,
    );
    if !context.topics.is_empty() {
        prompt.push_str("\nTopics discussed so far: ");
        prompt.push_str(&context.topics.join(", "));
        prompt.push('.');
    }
    if context.message_count > 0 {
        prompt.push_str(&format!(
            "\nYou have exchanged {} messages with this user.",
            context.message_count
        ));
    }
    if strategy.include_followup {
        prompt.push_str("\nEnd with a short follow-up question.");
    }
    prompt
}

/// Assemble a backend request from recent turns and the current message.
pub fn build_request(system_prompt: String, history: &[Turn], message: &str) -> BackendRequest {
    let history = history
        .iter()
        .flat_map(|turn| {
            [
                BackendMessage {
                    role: "user".into(),
                    content: turn.utterance.clone(),
                },
                BackendMessage {
                    role: "assistant".into(),
                    content: turn.response.clone(),
                },
            ]
        })
        .collect();
    BackendRequest {
        system_prompt,
        history,
        message: message.to_string(),
    }
}

fn timed_out(limit: Duration) -> BackendError {
    BackendError::Timeout {
        after_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
    }
}

/// [`ChatBackend::complete`] bounded by `limit`.
pub async fn complete_within(
    backend: &dyn ChatBackend,
    request: &BackendRequest,
    limit: Duration,
) -> Result<String, BackendError> {
    tokio::time::timeout(limit, backend.complete(request))
        .await
        .unwrap_or_else(|_| Err(timed_out(limit)))
}

/// Ask the backend for a reply. `None` means the caller should degrade.
pub async fn generate(
    backend: &dyn ChatBackend,
    request: &BackendRequest,
    limit: Duration,
) -> Option<String> {
    match complete_within(backend, request, limit).await {
        Ok(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Ok(_) => {
            warn!(backend = backend.name(), "backend returned an empty reply");
            None
        }
        Err(e) => {
            warn!(backend = backend.name(), error = %e, "backend call failed");
            None
        }
    }
}

async fn collect_stream<F>(
    backend: &dyn ChatBackend,
    request: &BackendRequest,
    on_chunk: &mut F,
) -> Result<String, BackendError>
where
    F: FnMut(&str) + Send,
{
    let mut chunks = backend.stream(request).await?;
    let mut text = String::new();
    while let Some(chunk) = chunks.next().await {
        let part = chunk?;
        on_chunk(&part);
        text.push_str(&part);
    }
    Ok(text)
}

/// Stream a reply, passing each chunk to `on_chunk` as it arrives.
///
/// `limit` bounds the whole stream, not each chunk. Returns the
/// concatenated reply, or `None` if the stream could not be opened, failed
/// midway, ran out of time or produced nothing. Chunks seen before a
/// failure have already been passed on.
pub async fn generate_streamed<F>(
    backend: &dyn ChatBackend,
    request: &BackendRequest,
    limit: Duration,
    mut on_chunk: F,
) -> Option<String>
where
    F: FnMut(&str) + Send,
{
    let collected = tokio::time::timeout(limit, collect_stream(backend, request, &mut on_chunk))
        .await
        .unwrap_or_else(|_| Err(timed_out(limit)));
    match collected {
        Ok(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Ok(_) => {
            warn!(backend = backend.name(), "backend streamed an empty reply");
            None
        }
        Err(e) => {
            warn!(backend = backend.name(), error = %e, "backend stream failed");
            None
        }
    }
}

/// Backend that replays canned replies. Useful for demos and tests.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    replies: parking_lot::Mutex<std::collections::VecDeque<Result<String, String>>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply.
    pub fn reply(self, text: impl Into<String>) -> Self {
        self.replies.lock().push_back(Ok(text.into()));
        self
    }

    /// Queue a failure.
    pub fn fail(self, reason: impl Into<String>) -> Self {
        self.replies.lock().push_back(Err(reason.into()));
        self
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, _request: &BackendRequest) -> Result<String, BackendError> {
        match self.replies.lock().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(reason)) => Err(BackendError::Unavailable(reason)),
            None => Err(BackendError::Unavailable("no scripted replies left".into())),
        }
    }
}

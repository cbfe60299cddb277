//! End-to-end tests for the assistant pipeline.
//!
//! Verifies that classification, context, replies, planning and dispatch
//! work together across multi-turn conversations.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hearth_core::assistant::Assistant;
use hearth_core::backend::{BackendError, BackendRequest, ChatBackend, ScriptedBackend};
use hearth_core::pipeline::entities::EntityExtractor;
use hearth_core::pipeline::random::{ScriptedRandom, SeededRandom};
use hearth_types::action::ActionDescriptor;
use hearth_types::classification::Category;
use hearth_types::config::{ContextConfig, HearthConfig};
use hearth_types::context::ConversationKey;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

fn assistant() -> Assistant {
    Assistant::builder(HearthConfig::default())
        .random(Arc::new(ScriptedRandom::new([0])))
        .build()
        .unwrap()
}

/// Test 1: a device command is planned, replied to and dispatched.
#[tokio::test]
async fn test_music_request_round_trip() {
    let a = assistant();
    let (reply, outcomes) = a.process_and_dispatch(Some("ana"), Some("kitchen"), "play some jazz").await;

    assert_eq!(reply.classification.category, Category::MusicControl);
    assert_eq!(reply.text, "Playing some jazz for you now.");
    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].result.success);
    assert_eq!(outcomes[0].result.message, "Now playing: some jazz");
}

/// Test 2: repeated use of a category turns it into a preference.
#[tokio::test]
async fn test_preferences_are_learned() {
    let a = assistant();
    let key = ConversationKey::new("ana", "prefs");
    for text in ["play some jazz", "play the beatles", "play something relaxing"] {
        a.process(Some("ana"), Some("prefs"), text).await;
    }
    let ctx = a.context(&key).unwrap();
    assert_eq!(ctx.message_count, 3);
    assert!(ctx.user_preferences.prefers(Category::MusicControl));
}

/// Test 3: unmatched chatter never becomes a preference.
#[tokio::test]
async fn test_fallback_is_never_preferred() {
    let a = assistant();
    for _ in 0..5 {
        a.process(Some("ana"), Some("chatter"), "purple monkey dishwasher").await;
    }
    let ctx = a.context(&ConversationKey::new("ana", "chatter")).unwrap();
    assert!(ctx.user_preferences.preferred_categories.is_empty());
}

/// Test 4: history is bounded and keeps the newest turns.
#[tokio::test]
async fn test_history_window_is_bounded() {
    let config = HearthConfig {
        context: ContextConfig {
            history_window: 3,
            classifier_window: 2,
            ..ContextConfig::default()
        },
        ..HearthConfig::default()
    };
    let a = Assistant::new(config).unwrap();
    for i in 0..6 {
        a.process(Some("u"), Some("c"), &format!("message number {i}")).await;
    }
    let key = ConversationKey::new("u", "c");
    let history = a.get_history(&key, 10).unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].utterance, "message number 3");
    assert_eq!(history[2].utterance, "message number 5");
    assert_eq!(a.context(&key).unwrap().message_count, 6);
}

/// Test 5: concurrent turns on one conversation are all recorded.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_turns_are_serialized() {
    let a = Arc::new(assistant());
    let mut handles = Vec::new();
    for i in 0..32 {
        let a = Arc::clone(&a);
        handles.push(tokio::spawn(async move {
            let text = if i % 2 == 0 { "turn on the lights" } else { "hello" };
            a.process(Some("u"), Some("busy"), text).await
        }));
    }
    for h in handles {
        h.await.unwrap();
    }
    let key = ConversationKey::new("u", "busy");
    assert_eq!(a.context(&key).unwrap().message_count, 32);
    assert_eq!(a.get_history(&key, 100).unwrap().len(), 32);
}

/// Test 6: different conversations do not see each other.
#[tokio::test]
async fn test_conversations_are_isolated() {
    let a = assistant();
    a.process(Some("u"), Some("one"), "play some jazz").await;
    a.process(Some("u"), Some("two"), "hello").await;

    let one = a.context(&ConversationKey::new("u", "one")).unwrap();
    let two = a.context(&ConversationKey::new("u", "two")).unwrap();
    assert_eq!(one.message_count, 1);
    assert_eq!(two.message_count, 1);
    assert_eq!(a.conversations().len(), 2);
}

/// Test 7: a deleted conversation is gone and can start over.
#[tokio::test]
async fn test_delete_then_restart() {
    let a = assistant();
    let reply = a.process(Some("u"), Some("gone"), "hello").await;
    assert!(a.delete(&reply.conversation).await);
    assert!(a.get_history(&reply.conversation, 5).is_err());
    assert!(a.insights(&reply.conversation).is_err());

    a.process(Some("u"), Some("gone"), "hello again").await;
    assert_eq!(a.get_history(&reply.conversation, 5).unwrap().len(), 1);
}

/// Test 8: bad actions fail softly.
#[tokio::test]
async fn test_dispatch_failures_are_results() {
    let a = assistant();
    let outcomes = a
        .dispatch(&[
            ActionDescriptor::new("toaster", "toast"),
            ActionDescriptor::new("spotify", "teleport"),
            ActionDescriptor::new("spotify", "pause"),
        ])
        .await;
    assert_eq!(outcomes.len(), 3);
    assert!(!outcomes[0].result.success);
    assert!(!outcomes[1].result.success);
    assert!(outcomes[2].result.success);
}

/// Test 9: same seed, same replies.
#[tokio::test]
async fn test_seeded_replies_are_reproducible() {
    let build = || {
        Assistant::builder(HearthConfig::default())
            .random(Arc::new(SeededRandom::new(7)))
            .build()
            .unwrap()
    };
    let (a, b) = (build(), build());
    for text in ["hello", "play some jazz", "dim the lamp", "I feel so sad today", "goodbye"] {
        let x = a.process(Some("u"), Some("c"), text).await;
        let y = b.process(Some("u"), Some("c"), text).await;
        assert_eq!(x.text, y.text, "{text}");
    }
}

/// Test 10: the backend shapes conversational replies but not commands.
#[tokio::test]
async fn test_backend_only_for_conversation() {
    let a = Assistant::builder(HearthConfig::default())
        .random(Arc::new(ScriptedRandom::new([0])))
        .backend(Arc::new(ScriptedBackend::new().reply("Evening! How was your day?")))
        .build()
        .unwrap();

    let command = a.process(Some("u"), Some("c"), "turn off the kitchen light").await;
    assert_eq!(command.text, "Turning off the light.");

    let chat = a.process(Some("u"), Some("c"), "good evening").await;
    assert_eq!(chat.text, "Evening! How was your day?");
}

/// Test 11: insights reflect the conversation.
#[tokio::test]
async fn test_insights_summarize_conversation() {
    let a = assistant();
    a.process(Some("u"), Some("c"), "I have a big work project due").await;
    a.process(Some("u"), Some("c"), "my family is visiting for the weekend").await;
    let insights = a.insights(&ConversationKey::new("u", "c")).unwrap();
    assert_eq!(insights.message_count, 2);
    assert_eq!(insights.communication_style, "concise");
    assert!(insights.primary_interests.iter().any(|(t, _)| t == "work"));
    assert!(insights.primary_interests.iter().any(|(t, _)| t == "family"));
}

const WORDS: &[&str] = &[
    "play", "the", "lights", "turn", "off", "on", "kitchen", "jazz", "meeting", "tomorrow",
    "why", "how", "sad", "happy", "hello", "bye", "recipe", "code", "bug", "lock", "door",
    "thermostat", "72", "40%", "!", "?", "{music}", "Paris", "weather", "", "   ",
];

/// Test 12: arbitrary input never breaks a turn.
#[tokio::test]
async fn test_random_utterances_are_handled() {
    let a = Assistant::builder(HearthConfig::default())
        .random(Arc::new(SeededRandom::new(1)))
        .build()
        .unwrap();
    let mut rng = StdRng::seed_from_u64(42);

    for i in 0..200 {
        let len = rng.gen_range(0..12);
        let text: Vec<&str> = (0..len)
            .filter_map(|_| WORDS.choose(&mut rng).copied())
            .collect();
        let text = text.join(" ");

        let reply = a.process(Some("fuzz"), Some("c"), &text).await;
        let c = &reply.classification;
        assert!(Category::ALL.contains(&c.category), "{text}");
        assert!((0.0..=1.0).contains(&c.confidence), "{text}: {}", c.confidence);
        assert!(!reply.text.is_empty(), "{text}");
        assert!(!reply.text.contains('{'), "{text} -> {}", reply.text);
        assert!(reply.actions.len() <= 1, "{text}");
        if !c.category.is_system_command() && c.category != Category::InformationQuery {
            assert!(reply.actions.is_empty(), "{text}");
        }
        assert_eq!(
            a.context(&reply.conversation).unwrap().message_count,
            i + 1
        );
    }
}

fn random_utterance(rng: &mut StdRng) -> String {
    let len = rng.gen_range(0..10);
    (0..len)
        .filter_map(|_| WORDS.choose(rng).copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Test 13: extraction is a pure function of its input.
#[test]
fn test_extraction_is_idempotent() {
    let extractor = EntityExtractor::new();
    let mut rng = StdRng::seed_from_u64(9);
    for _ in 0..200 {
        let text = random_utterance(&mut rng);
        assert_eq!(extractor.extract(&text), extractor.extract(&text), "{text}");
    }
}

/// Test 14: relationship depth never decreases.
#[tokio::test]
async fn test_relationship_depth_is_monotonic() {
    let a = assistant();
    let key = ConversationKey::new("u", "depth");
    let mut rng = StdRng::seed_from_u64(3);
    let mut last = 0.0_f32;
    for _ in 0..80 {
        let text = random_utterance(&mut rng);
        a.process(Some("u"), Some("depth"), &text).await;
        let depth = a.context(&key).unwrap().relationship_depth;
        assert!(depth >= last, "{depth} < {last}");
        assert!(depth <= 1.0);
        last = depth;
    }
}

/// Backend that holds a turn open until the test lets it finish.
#[derive(Default)]
struct HeldBackend {
    entered: tokio::sync::Notify,
    release: tokio::sync::Notify,
}

#[async_trait]
impl ChatBackend for HeldBackend {
    fn name(&self) -> &str {
        "held"
    }

    async fn complete(&self, _: &BackendRequest) -> Result<String, BackendError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok("Hello to you too.".into())
    }
}

/// Test 15: a delete issued during a turn removes that turn as well.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_delete_during_turn_is_not_undone() {
    let held = Arc::new(HeldBackend::default());
    let a = Arc::new(
        Assistant::builder(HearthConfig::default())
            .backend(held.clone())
            .build()
            .unwrap(),
    );
    let key = ConversationKey::new("u", "racing");
    a.process(Some("u"), Some("racing"), "play some jazz").await;

    let turn = tokio::spawn({
        let a = Arc::clone(&a);
        async move { a.process(Some("u"), Some("racing"), "hello").await }
    });
    held.entered.notified().await;

    let delete = tokio::spawn({
        let (a, key) = (Arc::clone(&a), key.clone());
        async move { a.delete(&key).await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!delete.is_finished());
    assert_eq!(a.context(&key).unwrap().message_count, 1);

    held.release.notify_one();
    turn.await.unwrap();
    assert!(delete.await.unwrap());
    assert!(a.context(&key).is_none());

    // The next turn starts a fresh conversation under the same key.
    let reply = a.process(Some("u"), Some("racing"), "play some jazz").await;
    assert_eq!(a.get_history(&reply.conversation, 10).unwrap().len(), 1);
}

/// Test 16: concurrent turns and deletes on one key leave a consistent
/// context.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_turns_and_deletes() {
    let a = Arc::new(assistant());
    let key = ConversationKey::new("u", "churn");
    let mut handles = Vec::new();
    for i in 0..40 {
        let (a, key) = (Arc::clone(&a), key.clone());
        handles.push(tokio::spawn(async move {
            if i % 10 == 9 {
                a.delete(&key).await;
            } else {
                a.process(Some("u"), Some("churn"), "turn on the lights").await;
            }
        }));
    }
    for h in handles {
        h.await.unwrap();
    }

    a.delete(&key).await;
    for _ in 0..3 {
        a.process(Some("u"), Some("churn"), "hello").await;
    }
    let ctx = a.context(&key).unwrap();
    assert_eq!(ctx.message_count, 3);
    assert_eq!(a.get_history(&key, 10).unwrap().len(), 3);
}

/// Test 17: calls and directions are planned and dispatched.
#[tokio::test]
async fn test_contacts_and_navigation_round_trip() {
    let a = assistant();

    let (call, outcomes) = a.process_and_dispatch(Some("u"), Some("c"), "call Maria").await;
    assert_eq!(call.classification.category, Category::Contacts);
    assert_eq!(call.text, "Calling Maria.");
    assert_eq!(call.actions[0].system, "contacts");
    assert_eq!(call.actions[0].param_str("name"), Some("Maria"));
    assert_eq!(outcomes[0].result.message, "Calling Maria");

    let (route, outcomes) = a
        .process_and_dispatch(Some("u"), Some("c"), "get directions to Boston")
        .await;
    assert_eq!(route.classification.category, Category::Navigation);
    assert_eq!(route.text, "Getting directions to Boston.");
    assert_eq!(outcomes[0].action.command, "get_directions");
    assert_eq!(outcomes[0].result.message, "Directions to Boston");
}

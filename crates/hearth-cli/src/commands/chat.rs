//! `hearth chat` -- interactive conversation.
//!
//! Reads utterances from stdin, runs each one through the assistant and
//! prints the reply as it is produced. Planned actions are dispatched to the simulated home
//! systems unless `--no-dispatch` is given. With `--message`, one turn is
//! processed and the command exits.
//!
//! # Examples
//!
//! ```text
//! hearth chat
//! > turn off the kitchen light
//! Turning off the light.
//!   [ok] philips_hue.turn_off_light: Turned off light in kitchen
//! > /quit
//!
//! hearth chat --seed 7 -m "play some jazz"
//! ```

use std::io::Write;
use std::sync::Arc;

use clap::Args;
use hearth_core::assistant::{Assistant, TurnReply};
use hearth_core::pipeline::random::SeededRandom;
use hearth_types::action::ActionOutcome;
use hearth_types::config::{HearthConfig, ResponseStyle};
use hearth_types::context::ConversationKey;
use tokio::io::AsyncBufReadExt;
use tracing::info;

/// Arguments for the `hearth chat` subcommand.
#[derive(Args)]
pub struct ChatArgs {
    /// Send a single message and exit (non-interactive mode).
    #[arg(short, long)]
    pub message: Option<String>,

    /// User id (defaults to `assistant.default_user`).
    #[arg(short, long)]
    pub user: Option<String>,

    /// Conversation id to continue (a new one is minted otherwise).
    #[arg(long)]
    pub conversation: Option<String>,

    /// Seed for reply selection, for reproducible sessions.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Plan actions but do not execute them.
    #[arg(long)]
    pub no_dispatch: bool,

    /// Use the companion reply style.
    #[arg(long)]
    pub companion: bool,
}

const HELP: &str = "\
commands:
  /history [n]  show the last n turns (default 10)
  /insights     summarize what this conversation reveals
  /clear        forget this conversation
  /help         show this help
  /quit         exit";

/// Run the chat command.
pub async fn run(args: ChatArgs, mut config: HearthConfig) -> anyhow::Result<()> {
    if args.companion {
        config.assistant.style = ResponseStyle::Companion;
    }
    let mut builder = Assistant::builder(config);
    if let Some(seed) = args.seed {
        builder = builder.random(Arc::new(SeededRandom::new(seed)));
    }
    let assistant = builder
        .build()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;
    info!(systems = ?assistant.router().names(), "assistant ready");

    let mut session = Session {
        user: args.user,
        conversation: args.conversation,
        dispatch: !args.no_dispatch,
    };

    if let Some(message) = args.message.as_deref() {
        session.turn(&assistant, message).await;
        return Ok(());
    }

    run_interactive(&assistant, &mut session).await
}

/// Identity and options carried across REPL turns.
struct Session {
    user: Option<String>,
    conversation: Option<String>,
    dispatch: bool,
}

impl Session {
    fn key(&self) -> Option<ConversationKey> {
        match (&self.user, &self.conversation) {
            (Some(u), Some(c)) => Some(ConversationKey::new(u.as_str(), c.as_str())),
            _ => None,
        }
    }

    async fn turn(&mut self, assistant: &Assistant, message: &str) {
        let reply = assistant
            .process_streamed(
                self.user.as_deref(),
                self.conversation.as_deref(),
                message,
                |chunk| {
                    print!("{chunk}");
                    std::io::stdout().flush().ok();
                },
            )
            .await;
        println!();
        // Later turns continue the conversation the first one created.
        self.user = Some(reply.conversation.user_id.clone());
        self.conversation = Some(reply.conversation.conversation_id.clone());

        let outcomes = if self.dispatch {
            assistant.dispatch(&reply.actions).await
        } else {
            Vec::new()
        };
        for line in format_actions(&reply, &outcomes, self.dispatch) {
            println!("{line}");
        }
    }
}

/// Render a reply's action outcomes (or planned actions) for the terminal.
fn format_actions(reply: &TurnReply, outcomes: &[ActionOutcome], dispatched: bool) -> Vec<String> {
    if dispatched {
        outcomes
            .iter()
            .map(|outcome| {
                let status = if outcome.result.success { "ok" } else { "failed" };
                format!(
                    "  [{status}] {}.{}: {}",
                    outcome.action.system, outcome.action.command, outcome.result.message
                )
            })
            .collect()
    } else {
        reply
            .actions
            .iter()
            .map(|action| format!("  [planned] {}.{}", action.system, action.command))
            .collect()
    }
}

async fn run_interactive(assistant: &Assistant, session: &mut Session) -> anyhow::Result<()> {
    println!("hearth chat -- interactive mode (type /help for commands)");
    println!();

    let stdin = tokio::io::stdin();
    let mut reader = tokio::io::BufReader::new(stdin).lines();

    loop {
        eprint!("> ");
        std::io::stderr().flush().ok();

        let line = match reader.next_line().await? {
            Some(l) => l,
            None => break,
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.splitn(2, char::is_whitespace);
        match parts.next().unwrap_or_default() {
            "/quit" | "/exit" => break,
            "/help" => println!("{HELP}"),
            "/history" => {
                let limit = parts
                    .next()
                    .and_then(|n| n.trim().parse().ok())
                    .unwrap_or(10);
                show_history(assistant, session, limit);
            }
            "/insights" => show_insights(assistant, session)?,
            "/clear" => {
                if let Some(key) = session.key() {
                    assistant.delete(&key).await;
                }
                session.conversation = None;
                println!("[conversation cleared]");
            }
            cmd if cmd.starts_with('/') => {
                println!("unknown command: {cmd} (type /help)");
            }
            _ => session.turn(assistant, input).await,
        }
    }

    Ok(())
}

fn show_history(assistant: &Assistant, session: &Session, limit: usize) {
    let Some(key) = session.key() else {
        println!("[no conversation yet]");
        return;
    };
    match assistant.get_history(&key, limit) {
        Ok(turns) => {
            for turn in turns {
                println!(
                    "{} you: {}\n{} [{} / {:.2}] {}",
                    turn.timestamp.format("%H:%M:%S"),
                    turn.utterance,
                    turn.timestamp.format("%H:%M:%S"),
                    turn.classification.category,
                    turn.classification.confidence,
                    turn.response,
                );
            }
        }
        Err(e) => println!("[{e}]"),
    }
}

fn show_insights(assistant: &Assistant, session: &Session) -> anyhow::Result<()> {
    let Some(key) = session.key() else {
        println!("[no conversation yet]");
        return Ok(());
    };
    match assistant.insights(&key) {
        Ok(insights) => println!("{}", serde_json::to_string_pretty(&insights)?),
        Err(e) => println!("[{e}]"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_types::action::{ActionDescriptor, ExecutionResult};
    use hearth_types::classification::Classification;

    fn reply(actions: Vec<ActionDescriptor>) -> TurnReply {
        TurnReply {
            conversation: ConversationKey::new("u", "c"),
            text: "Done.".into(),
            classification: Classification::fallback(0.5),
            actions,
        }
    }

    #[test]
    fn format_lists_outcomes() {
        let action = ActionDescriptor::new("spotify", "pause");
        let outcomes = vec![ActionOutcome {
            action: action.clone(),
            result: ExecutionResult::ok("Music paused"),
        }];
        let lines = format_actions(&reply(vec![action]), &outcomes, true);
        assert_eq!(lines, vec!["  [ok] spotify.pause: Music paused"]);
    }

    #[test]
    fn format_lists_planned_actions_without_dispatch() {
        let lines = format_actions(&reply(vec![ActionDescriptor::new("search", "web_search")]), &[], false);
        assert_eq!(lines, vec!["  [planned] search.web_search"]);
    }

    #[tokio::test]
    async fn session_keeps_the_minted_conversation() {
        let assistant = Assistant::new(HearthConfig::default()).unwrap();
        let mut session = Session {
            user: None,
            conversation: None,
            dispatch: false,
        };
        session.turn(&assistant, "hello").await;
        let key = session.key().unwrap();
        session.turn(&assistant, "play some jazz").await;
        assert_eq!(session.key(), Some(key.clone()));
        assert_eq!(assistant.get_history(&key, 10).unwrap().len(), 2);
    }
}

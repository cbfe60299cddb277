//! `hearth` -- CLI binary for the hearth home assistant.
//!
//! Provides the following subcommands:
//!
//! - `hearth chat` -- Interactive conversation against simulated home systems.
//! - `hearth classify` -- Classify one utterance and print the result as JSON.
//! - `hearth plan` -- Show the actions an utterance would trigger.
//! - `hearth config` -- Show the resolved configuration.

use clap::{Parser, Subcommand};

mod commands;

/// hearth home assistant CLI.
#[derive(Parser)]
#[command(name = "hearth", about = "hearth home assistant CLI", version)]
struct Cli {
    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path (overrides ~/.hearth/config.toml).
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Start an interactive conversation.
    Chat(commands::chat::ChatArgs),

    /// Classify a single utterance.
    Classify(commands::classify::ClassifyArgs),

    /// Show the actions a single utterance would trigger.
    Plan(commands::classify::PlanArgs),

    /// Show resolved configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCmd,
    },
}

/// Subcommands for `hearth config`.
#[derive(Subcommand)]
enum ConfigCmd {
    /// Print the full resolved configuration.
    Show {
        /// Output as TOML instead of JSON.
        #[arg(long)]
        toml: bool,
    },

    /// Print one configuration section.
    Section {
        /// Section name (classifier, strategy, context, assistant).
        name: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Chat(args) => commands::chat::run(args, config).await?,
        Commands::Classify(args) => commands::classify::classify(&args, &config)?,
        Commands::Plan(args) => commands::classify::plan(&args, &config)?,
        Commands::Config { action } => match action {
            ConfigCmd::Show { toml } => commands::config_cmd::config_show(&config, toml),
            ConfigCmd::Section { name } => commands::config_cmd::config_section(&config, &name),
        },
    }

    Ok(())
}

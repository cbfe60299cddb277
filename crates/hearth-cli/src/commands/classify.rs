//! `hearth classify` / `hearth plan` -- one-shot inspection of an utterance.
//!
//! # Examples
//!
//! ```text
//! hearth classify "turn off the kitchen light"
//! hearth plan set the bedroom lights to 40%
//! ```

use clap::Args;
use hearth_core::pipeline::classifier::PatternClassifier;
use hearth_core::pipeline::planner::ActionPlanner;
use hearth_core::pipeline::strategy::StrategySelector;
use hearth_core::pipeline::traits::UtteranceClassifier;
use hearth_types::action::ActionDescriptor;
use hearth_types::classification::Classification;
use hearth_types::config::HearthConfig;
use hearth_types::context::ContextSnapshot;

/// Arguments for `hearth classify`.
#[derive(Args)]
pub struct ClassifyArgs {
    /// The utterance (words are joined with spaces).
    #[arg(required = true, trailing_var_arg = true)]
    pub text: Vec<String>,

    /// Print compact JSON on one line.
    #[arg(long)]
    pub compact: bool,
}

/// Arguments for `hearth plan`.
#[derive(Args)]
pub struct PlanArgs {
    /// The utterance (words are joined with spaces).
    #[arg(required = true, trailing_var_arg = true)]
    pub text: Vec<String>,
}

fn classifier(config: &HearthConfig) -> PatternClassifier {
    PatternClassifier::new(
        config.classifier.clone(),
        StrategySelector::new(&config.strategy),
    )
}

/// Classify an utterance without any conversation context.
pub fn classify_text(config: &HearthConfig, text: &str) -> Classification {
    classifier(config).classify(text, None)
}

/// The actions an utterance would trigger without any conversation context.
pub fn plan_text(config: &HearthConfig, text: &str) -> Vec<ActionDescriptor> {
    let classification = classify_text(config, text);
    ActionPlanner::new().plan(&classification, &ContextSnapshot::default())
}

/// Run `hearth classify`.
pub fn classify(args: &ClassifyArgs, config: &HearthConfig) -> anyhow::Result<()> {
    let classification = classify_text(config, &args.text.join(" "));
    let json = if args.compact {
        serde_json::to_string(&classification)?
    } else {
        serde_json::to_string_pretty(&classification)?
    };
    println!("{json}");
    Ok(())
}

/// Run `hearth plan`.
pub fn plan(args: &PlanArgs, config: &HearthConfig) -> anyhow::Result<()> {
    let actions = plan_text(config, &args.text.join(" "));
    if actions.is_empty() {
        println!("no actions");
        return Ok(());
    }
    for action in &actions {
        println!(
            "{}.{} {}",
            action.system,
            action.command,
            serde_json::to_string(&action.parameters)?
        );
    }
    Ok(())
}

//! # NetReach — quota-bounded outbound networking workflows
//!
//! Drives the discovery → connect → status-poll → messaging pipeline
//! against a browser session supplied by an external automation driver.
//!
//! Usage:
//!   netreach run --dry-run        # Exercise the pipeline without a browser
//!   netreach stats                # Today's quota usage
//!   netreach templates            # List built-in templates
//!   netreach init                 # Write a default config file

use anyhow::Result;
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use netreach_core::NetreachConfig;
use netreach_pacing::{PacingConfig, RateLimiter};
use netreach_store::ContactStore;
use netreach_workflow::actuator::{Actuator, CandidateProfile, ControlHandle, ConversationPeek};
use netreach_workflow::{Parser as PageParser, WorkflowRunner};

#[derive(Parser)]
#[command(
    name = "netreach",
    version,
    about = "Quota-bounded outbound networking workflows"
)]
struct Cli {
    /// Config file path (default: ~/.netreach/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Execute the outreach pipeline
    Run {
        /// Run against a simulated session and an in-memory store;
        /// nothing touches the real database or the platform
        #[arg(long)]
        dry_run: bool,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show today's quota usage
    Stats,
    /// List the built-in note and message templates
    Templates,
    /// Write a default config file to ~/.netreach/config.toml
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "netreach=debug,netreach_workflow=debug,netreach_pacing=debug"
    } else {
        "netreach=info,netreach_workflow=info,netreach_pacing=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config = match &cli.config {
        Some(path) => {
            let mut config = NetreachConfig::load_from(path)?;
            config.apply_env_overrides();
            config
        }
        None => NetreachConfig::load()?,
    };

    match cli.command {
        Command::Init => {
            config.save()?;
            println!("wrote {}", NetreachConfig::default_path().display());
        }
        Command::Templates => {
            println!("Connection note templates:");
            for t in netreach_templates::connection_note_templates() {
                println!("  {:<22} {} — {}", t.id, t.name, t.description);
            }
            println!("\nMessage templates:");
            for t in netreach_templates::message_templates() {
                println!("  {:<22} {} — {}", t.id, t.name, t.description);
            }
        }
        Command::Stats => {
            let store = Arc::new(ContactStore::open(&config.resolved_db_path())?);
            let limiter = RateLimiter::new(store, PacingConfig::from(&config.quota));
            println!("{}", limiter.daily_summary()?);
        }
        Command::Run { dry_run, json } => {
            if !dry_run {
                anyhow::bail!(
                    "no browser automation driver is wired into this build; \
                     run with --dry-run to exercise the pipeline against a \
                     simulated session"
                );
            }

            tracing::info!("dry run: simulated session, in-memory store");
            let store = Arc::new(ContactStore::in_memory()?);
            let limiter = Arc::new(RateLimiter::new(
                store.clone(),
                PacingConfig::from(&config.quota),
            ));
            println!("{}\n", limiter.daily_summary()?);

            let runner = WorkflowRunner::new(
                store,
                limiter,
                config,
                Arc::new(DryRunActuator),
                Arc::new(DryRunParser),
            );
            let report = runner.run().await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("run {}: {}", report.run_id, report.summary());
            }
        }
    }

    Ok(())
}

/// Actuator that narrates every interaction instead of driving a page.
/// Controls always resolve, so the pipeline walks its full happy path.
struct DryRunActuator;

#[async_trait]
impl Actuator for DryRunActuator {
    async fn navigate(&self, url: &str) -> netreach_core::Result<String> {
        tracing::info!("[dry-run] navigate {url}");
        Ok(url.to_string())
    }

    async fn find_control(
        &self,
        candidates: &[&str],
    ) -> netreach_core::Result<Option<ControlHandle>> {
        Ok(candidates.first().map(|s| ControlHandle::new(s)))
    }

    async fn click(&self, handle: &ControlHandle) -> netreach_core::Result<()> {
        tracing::info!("[dry-run] click {}", handle.selector);
        Ok(())
    }

    async fn type_text(&self, _handle: &ControlHandle, text: &str) -> netreach_core::Result<()> {
        tracing::info!("[dry-run] type {} characters", text.len());
        Ok(())
    }

    async fn scroll(&self) -> netreach_core::Result<()> {
        Ok(())
    }

    async fn current_url(&self) -> netreach_core::Result<String> {
        Ok(String::new())
    }
}

/// Parser that sees an empty platform: no results, no conversations.
struct DryRunParser;

#[async_trait]
impl PageParser for DryRunParser {
    async fn extract_candidates(&self) -> netreach_core::Result<Vec<CandidateProfile>> {
        Ok(Vec::new())
    }

    async fn extract_conversations(&self) -> netreach_core::Result<Vec<ConversationPeek>> {
        Ok(Vec::new())
    }

    async fn shows_connected(&self) -> netreach_core::Result<bool> {
        Ok(false)
    }
}

//! finbot CLI
//!
//! Command-line front end for the finbot personal-finance assistant.
//!
//! ## Usage
//!
//! ```bash
//! # Run the HTTP API
//! finbot serve --config finbot.yaml
//!
//! # One-off report, written as a Word document too
//! finbot report --user-type professional --income 5000 --expenses 3500 --goal "House" --document
//!
//! # Ask a question
//! finbot ask "How should I split my savings?" --language hindi
//!
//! # Save and load sessions
//! finbot session save --income 2000 --expenses 1500
//! finbot session show 1
//!
//! # Would this question pass the topic gate?
//! finbot check "what's the weather"
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use finbot_core::{
    detect_report_request, is_in_domain, matched_terms, AmountInput, FinancialProfile,
    ReportDocument, UserType,
};
use finbot_runtime::{
    Assistant, OpenAiCompatibleProvider, ReportChain, RuntimeConfig, SessionStore,
    SqliteSessionStore,
};
use finbot_server::AppState;

#[derive(Parser)]
#[command(name = "finbot")]
#[command(author, version, about = "Personal-finance assistant with resilient report generation")]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true, env = "FINBOT_CONFIG")]
    config: Option<PathBuf>,

    /// Session database path (overrides config)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Address to bind the HTTP API to (overrides config)
    #[arg(long, global = true)]
    bind: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API
    Serve,

    /// Generate a financial report
    Report {
        #[command(flatten)]
        profile: ProfileArgs,

        /// Report type requested from the report service
        #[arg(long)]
        report_type: Option<String>,

        /// Skip remote backends and use the local engine only
        #[arg(long)]
        local: bool,

        /// Also write a .docx document to the reports directory
        #[arg(long)]
        document: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Ask the assistant a question
    Ask {
        message: String,

        #[arg(long, default_value = "student")]
        user_type: UserType,

        /// Reply language (e.g. hindi, tamil); English by default
        #[arg(long, default_value = "english")]
        language: String,
    },

    /// Save or show stored sessions
    Session {
        #[command(subcommand)]
        action: SessionCommand,
    },

    /// Run the topic gate on a piece of text
    Check { text: String },
}

#[derive(Subcommand)]
enum SessionCommand {
    /// Save a profile and print its id
    Save {
        #[command(flatten)]
        profile: ProfileArgs,
    },

    /// Print a saved session as JSON
    Show { id: i64 },
}

#[derive(Args)]
struct ProfileArgs {
    #[arg(long, default_value = "student")]
    user_type: UserType,

    /// Monthly income
    #[arg(long)]
    income: Option<String>,

    /// Monthly expenses
    #[arg(long)]
    expenses: Option<String>,

    /// Financial goal
    #[arg(long, default_value = "")]
    goal: String,

    /// Target amount for the goal
    #[arg(long)]
    goal_amount: Option<String>,

    /// Conversation so far
    #[arg(long, default_value = "")]
    chat_history: String,
}

impl ProfileArgs {
    fn into_profile(self) -> FinancialProfile {
        FinancialProfile {
            user_type: self.user_type,
            income: self.income.as_deref().map(amount_arg),
            expenses: self.expenses.as_deref().map(amount_arg),
            goal: self.goal,
            goal_amount: self.goal_amount.as_deref().map(amount_arg),
            chat_history: self.chat_history,
        }
    }
}

/// Plain finite numbers become numeric amounts; anything else is kept as text.
fn amount_arg(raw: &str) -> AmountInput {
    match raw.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => AmountInput::Number(n),
        Ok(_) => AmountInput::Text(raw.to_string()),
        Err(_) => AmountInput::Text(raw.to_string()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Serve => serve(config).await,
        Commands::Report {
            profile,
            report_type,
            local,
            document,
            json,
        } => {
            let profile = profile.into_profile();
            let chain = if local {
                ReportChain::local_only()
            } else {
                ReportChain::from_config_with_default_provider(&config)?
            };
            let report_type = report_type.unwrap_or_else(|| config.primary.report_type.clone());
            let report = chain.generate_report(&profile, &report_type).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report.render());
                println!();
                println!("Generated by: {}", chain.label_for(report.source));
            }

            if document {
                let path = ReportDocument::build(&report, &profile)
                    .write_to(&config.reports_dir)
                    .context("Failed to write report document")?;
                eprintln!("Document written to {}", path.display());
            }
            Ok(())
        }
        Commands::Ask {
            message,
            user_type,
            language,
        } => {
            let provider = Arc::new(OpenAiCompatibleProvider::from_config(&config.secondary)?);
            let assistant = Assistant::from_config(&config.secondary, provider);
            let reply = assistant.reply(&message, user_type, &language).await;
            println!("{}", reply.response);
            Ok(())
        }
        Commands::Session { action } => {
            let store = SqliteSessionStore::open(&config.store.path)?;
            match action {
                SessionCommand::Save { profile } => {
                    let id = store.append(&profile.into_profile())?;
                    println!("{}", id);
                }
                SessionCommand::Show { id } => match store.lookup(id)? {
                    Some(session) => println!("{}", serde_json::to_string_pretty(&session)?),
                    None => anyhow::bail!("Session {} not found", id),
                },
            }
            Ok(())
        }
        Commands::Check { text } => {
            let in_domain = is_in_domain(&text);
            println!("In domain: {}", if in_domain { "yes" } else { "no" });
            let terms = matched_terms(&text);
            if !terms.is_empty() {
                println!("Matched terms: {}", terms.join(", "));
            }
            if let Some(kind) = detect_report_request(&text) {
                println!("Report request: {}", kind);
            }
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> Result<RuntimeConfig> {
    let mut config = match &cli.config {
        Some(path) => RuntimeConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => RuntimeConfig::default(),
    };

    if let Some(db) = &cli.db {
        config.store.path = db.clone();
    }
    if let Some(bind) = &cli.bind {
        config.server.bind = bind.clone();
    }

    config.validate()?;
    Ok(config)
}

async fn serve(config: RuntimeConfig) -> Result<()> {
    tracing::info!("Starting finbot v{}", env!("CARGO_PKG_VERSION"));

    let provider = Arc::new(OpenAiCompatibleProvider::from_config(&config.secondary)?);
    let chain = ReportChain::from_config(&config, provider.clone())?;
    let assistant = Assistant::from_config(&config.secondary, provider);
    let store = Arc::new(
        SqliteSessionStore::open(&config.store.path)
            .with_context(|| format!("Failed to open session store {}", config.store.path.display()))?,
    );

    let state = AppState::new(chain, assistant, store, config.primary.report_type.clone());
    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;

    finbot_server::serve(listener, state).await?;
    Ok(())
}

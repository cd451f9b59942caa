//! Compass binary entry point

use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tracing_subscriber::EnvFilter;

use compass::chat::CoachingChat;
use compass::cli::{Cli, Command};
use compass::config::Config;
use compass::context::ContextAggregator;
use compass::llm::AnthropicClient;
use compass::repl::CoachRepl;
use compass::session::SessionState;
use compass::store::{StoreHandle, spawn_store};
use compass::telemetry::{NoopSink, TelemetrySink, TracingSink};
use sessionstore::{OrgProfile, SessionKind, SessionRow, SessionStore};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("compass=info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref())?;

    let store = SessionStore::open(&config.storage.db_path)
        .context(format!("Failed to open store at {}", config.storage.db_path.display()))?;
    let store = spawn_store(store);

    match cli.command {
        Command::InitOrg {
            org,
            name,
            industry,
            size,
            focus,
            pain_points,
        } => init_org(store, org, name, industry, size, focus, pain_points).await,
        Command::Chat { org, user, resume, name } => chat(&config, store, org, user, resume, name).await,
        Command::Status { session } => status(store, session).await,
    }
}

async fn init_org(
    store: StoreHandle,
    org: String,
    name: String,
    industry: Option<String>,
    size: Option<String>,
    focus: Option<String>,
    pain_points: Option<String>,
) -> Result<()> {
    let mut profile = OrgProfile::new(&org, name);
    profile.industry = industry;
    profile.company_size = size;
    profile.strategic_focus = focus;
    profile.pain_points = pain_points;

    store.upsert_org_profile(profile).await?;
    println!("Organization profile saved: {}", org.bright_cyan());
    Ok(())
}

async fn chat(
    config: &Config,
    store: StoreHandle,
    org: String,
    user: Option<String>,
    resume: Option<String>,
    name: Option<String>,
) -> Result<()> {
    // Fail fast on missing credentials before touching any session state.
    config.validate()?;

    let aggregator = ContextAggregator::new(store.clone());
    let context = aggregator.load_client_context(&org, user.as_deref()).await?;

    let (session_id, state, is_resuming) = match resume {
        Some(session_id) => {
            let row = store
                .get_session(&session_id)
                .await?
                .ok_or_else(|| eyre::eyre!("Session not found: {session_id}"))?;
            let state = SessionState::decode(&row.state_json)?;
            (session_id, state, true)
        }
        None => {
            let state = SessionState::new();
            let row = SessionRow::new(&org, user.clone(), SessionKind::Coaching, state.encode()?);
            let session_id = row.id.clone();
            store.create_session(row).await?;
            (session_id, state, false)
        }
    };

    let llm = Arc::new(AnthropicClient::from_config(&config.llm)?);
    let telemetry: Arc<dyn TelemetrySink> = if config.telemetry.enabled {
        Arc::new(TracingSink)
    } else {
        Arc::new(NoopSink)
    };
    let chat = CoachingChat::new(
        llm,
        telemetry,
        config.llm.model.clone(),
        config.llm.max_tokens,
        session_id.clone(),
    );

    let mut repl = CoachRepl::new(chat, store, session_id, context, state, name);
    repl.run(is_resuming).await
}

async fn status(store: StoreHandle, session: String) -> Result<()> {
    let row = store
        .get_session(&session)
        .await?
        .ok_or_else(|| eyre::eyre!("Session not found: {session}"))?;
    let state = SessionState::decode(&row.state_json)?;
    let summary = compass::session::summarize(&state);

    println!("{}", "Session status".bright_cyan().bold());
    println!("  Session:        {}", row.id);
    println!("  Kind:           {}", row.kind.as_str());
    println!("  Phase (state):  {}", state.current_phase);
    println!("  Phase (mirror): {}", row.phase);
    println!("  Highest phase:  {}", row.highest_phase_reached);
    println!("  {}", summary.render());
    println!("  Messages:       {}", state.total_message_count);
    println!("  Bets captured:  {}", state.strategic_bets.len());
    println!();
    println!("Next focus: {}", compass::session::suggest_next_focus(&state));
    Ok(())
}

//! CLI entrypoint for rally
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod dispatch;

use anyhow::{Result, bail};
use clap::Parser;
use rally_application::{AuthContext, Caller, Engine, NotificationDispatcher};
use rally_domain::{Email, OutputFormat, Severity};
use rally_infrastructure::{
    ConfigLoader, FileConfig, GuestTokenAuth, JsonFileStore, JsonlOutbox, LoggingDispatcher,
    RandomTokenGenerator, SessionAuth, StaticCatalog,
};
use rally_presentation::{Cli, Command, CommandOutput};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())?
    };
    check_config(&config)?;

    let format = config
        .output
        .resolve_format(cli.output.map(OutputFormat::from));
    if !config.output.colored_for(format) {
        colored::control::set_override(false);
    }

    let Some(command) = cli.command else {
        bail!("No command given. Run `rally --help` for the list of commands.");
    };

    // === Dependency Injection ===
    let state_path = cli.state.clone().unwrap_or_else(|| config.store.path.clone());
    let store = Arc::new(JsonFileStore::open(&state_path)?);
    info!("Using state file {}", store.path().display());

    // Accounts are created outside the engine.
    if let Command::Register { email, name } = &command {
        let email = Email::parse(email)?;
        let display_name = name.clone().unwrap_or_default();
        let user = store.register_user(email, &display_name)?;
        println!("{}", CommandOutput::Registered(user).render(format));
        return Ok(());
    }

    let dispatcher: Arc<dyn NotificationDispatcher> = match &config.outbox.path {
        Some(path) => Arc::new(JsonlOutbox::open(path)?),
        None => Arc::new(LoggingDispatcher),
    };
    let catalog = StaticCatalog::new(&config.recommendations.places);
    info!("Recommendation catalog has {} place(s)", catalog.len());

    let engine = Engine::new(
        store.clone(),
        store.clone(),
        dispatcher,
        Arc::new(catalog),
        Arc::new(RandomTokenGenerator),
    )
    .with_config(config.engine_config());

    let caller = resolve_caller(cli.as_email.as_deref(), cli.guest_token.as_deref(), &store).await?;
    let output = dispatch::run(&engine, &caller, command).await?;

    println!("{}", output.render(format));

    Ok(())
}

/// Print warnings and refuse to start on errors.
fn check_config(config: &FileConfig) -> Result<()> {
    let issues = config.validate();
    for issue in issues.iter().filter(|i| i.severity == Severity::Warning) {
        warn!("config: {}", issue.message);
    }

    let errors: Vec<&str> = issues
        .iter()
        .filter(|i| i.is_error())
        .map(|i| i.message.as_str())
        .collect();
    if !errors.is_empty() {
        bail!("Invalid configuration:\n  {}", errors.join("\n  "));
    }
    Ok(())
}

async fn resolve_caller(
    as_email: Option<&str>,
    guest_token: Option<&str>,
    store: &Arc<JsonFileStore>,
) -> Result<Caller> {
    let caller = match (as_email, guest_token) {
        (Some(email), _) => SessionAuth::new(store.clone(), email)
            .current_identity()
            .await?,
        (None, Some(token)) => GuestTokenAuth::new(store.clone(), store.clone(), token)
            .current_identity()
            .await?,
        (None, None) => bail!("Say who you are with --as EMAIL or --guest-token TOKEN"),
    };
    info!("Caller: {}", caller.identity());
    Ok(caller)
}

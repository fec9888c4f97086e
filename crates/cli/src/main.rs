mod catalog;
mod cli;
mod manage;

use std::fs::{self, OpenOptions};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, bail};
use clap::Parser;
use rconsole_api::ConsoleClient;
use rconsole_engine::{CommandInvoker, HttpCommandInvoker, NoopInvoker};
use rconsole_registry::JsonSubsetStore;
use rconsole_tui::TuiOptions;
use rconsole_types::User;
use rconsole_util::{ConsoleConfig, config_root};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();
    let command = cli.command.take();
    init_tracing(command.is_none())?;

    let mut config = ConsoleConfig::load().context("failed to load console configuration")?;
    if let Some(base) = &cli.api_base {
        config.api_base = base.clone();
    }
    if let Some(locale) = cli.locale {
        config.locale = locale;
    }

    // No subcommand => TUI
    let Some(command) = command else {
        return run_tui(&cli, &config).await;
    };

    match command {
        Command::Commands { action } => catalog::run_commands(&cli, &config, action).await,
        Command::Exec(args) => catalog::run_exec(&cli, &config, args).await,
        Command::Subsets { action } => manage::run_subsets(&cli, &config, action).await,
        Command::Servers { action } => manage::run_servers(&cli, &config, action).await,
    }
}

/// CLI commands log to stderr. The TUI owns the terminal, so it logs to
/// `<config dir>/rconsole/rconsole.log` instead.
fn init_tracing(tui: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if tui {
        let root = config_root();
        fs::create_dir_all(&root).with_context(|| format!("failed to create {}", root.display()))?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(root.join("rconsole.log"))
            .context("failed to open the log file")?;
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }
    Ok(())
}

/// Build a client and sign in with the credentials given on the command line
/// or in the environment.
pub(crate) async fn connect(cli: &Cli, config: &ConsoleConfig) -> Result<(ConsoleClient, User)> {
    let (Some(email), Some(password)) = (cli.email.as_deref(), cli.password.as_deref()) else {
        bail!("sign-in required: pass --email and --password or set RCONSOLE_EMAIL and RCONSOLE_PASSWORD");
    };
    let client = ConsoleClient::from_config(config)?;
    client.login(email, password).await.context("sign-in failed")?;
    let user = client.current_user().await.context("failed to load the signed-in user")?;
    info!(user = %user.id, "signed in");
    Ok((client, user))
}

/// Owner of custom subsets: `--user` when given, otherwise the signed-in user.
pub(crate) async fn subset_owner(cli: &Cli, config: &ConsoleConfig) -> Result<String> {
    if let Some(user) = cli.user.as_deref().filter(|user| !user.trim().is_empty()) {
        return Ok(user.to_string());
    }
    let (_, user) = connect(cli, config).await.context("pass --user to work with subsets offline")?;
    Ok(user.id)
}

async fn run_tui(cli: &Cli, config: &ConsoleConfig) -> Result<()> {
    let store = Arc::new(JsonSubsetStore::with_defaults());

    if cli.dry_run {
        let client = ConsoleClient::from_config(config)?;
        let user_id = cli.user.clone().unwrap_or_else(|| "local".to_string());
        return rconsole_tui::run(TuiOptions {
            locale: config.locale,
            invoker: Arc::new(NoopInvoker),
            store,
            user_label: format!("{user_id} (dry run)"),
            user_id,
            auth_events: client.subscribe(),
        })
        .await;
    }

    let (client, user) = connect(cli, config).await?;
    let auth_events = client.subscribe();
    let invoker: Arc<dyn CommandInvoker> = Arc::new(HttpCommandInvoker::new(client));
    rconsole_tui::run(TuiOptions {
        locale: config.locale,
        invoker,
        store,
        user_id: user.id,
        user_label: format!("{} <{}>", user.name, user.email),
        auth_events,
    })
    .await
}

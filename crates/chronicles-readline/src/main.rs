//! Crime Chronicles REPL.
//!
//! ```bash
//! chronicles                                  # log in from the prompt
//! chronicles --email demo@example.com         # act as a known user
//! chronicles --backend-url http://host:5100 --log-level debug
//! ```

mod command;
mod helper;
mod logging;
mod output;
mod render;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use rustyline::Editor;
use rustyline::error::ReadlineError;

use chronicles_application::{ChroniclesUseCase, HistoryLoad, QueryOutcome};
use chronicles_core::ChartRenderer;
use chronicles_core::history::HISTORY_FAILURE_FALLBACK;
use chronicles_core::query::QUERY_FAILURE_FALLBACK;
use chronicles_infrastructure::{ChroniclesPaths, ConfigService, HttpCrimeBackend};

use command::Command;
use helper::CliHelper;
use render::TerminalChartRenderer;

/// Ask questions about crime statistics and get charts or text back.
#[derive(Parser)]
#[command(name = "chronicles", version, about)]
struct Cli {
    /// Configuration file (default: <config dir>/chronicles/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Backend base URL, overriding config and CHRONICLES_BACKEND_URL
    #[arg(long)]
    backend_url: Option<String>,

    /// Start signed in as this user without calling /login
    #[arg(long)]
    email: Option<String>,

    /// Log filter, e.g. `info` or `chronicles_application=debug`
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ===== Configuration =====
    let (config_service, paths) = match &cli.config {
        Some(path) => (
            ConfigService::new(path),
            ChroniclesPaths::new(path.parent().map(Path::to_path_buf)),
        ),
        None => {
            let paths = ChroniclesPaths::default();
            (ConfigService::from_paths(&paths)?, paths)
        }
    };
    let mut config = config_service.get_config()?;
    if let Some(url) = &cli.backend_url {
        config.backend.base_url = url.clone();
    }

    let _log_guard = logging::init(
        &paths.log_dir()?,
        cli.log_level.as_deref(),
        &config.logging.level,
    )?;
    tracing::info!(
        config = %config_service.source(),
        backend = %config.backend.base_url,
        "starting chronicles"
    );

    // ===== Use case =====
    let backend = Arc::new(HttpCrimeBackend::from_settings(&config.backend)?);
    let usecase = Arc::new(ChroniclesUseCase::new(
        backend,
        config.view.controller(),
        config.backend.request_timeout(),
    ));
    let renderer: Arc<dyn ChartRenderer> = Arc::new(TerminalChartRenderer::default());

    // ===== REPL Setup =====
    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", "=== Crime Chronicles ===".bright_magenta().bold());
    output::hint(&format!("Backend: {}", config.backend.base_url));
    output::hint("Type /help for commands, or 'quit' to exit.");
    println!();

    if let Some(email) = &cli.email {
        usecase.assume_user(email).await;
        output::info(&format!("Signed in as {email}"));
        load_history(&usecase).await;
    } else {
        output::hint("Log in with /login <email> <password> or create an account with /signup.");
    }

    // ===== Main REPL Loop =====
    loop {
        match rl.readline(">> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                let command = match command::parse(trimmed) {
                    Ok(command) => command,
                    Err(err) => {
                        output::error(&err.to_string());
                        continue;
                    }
                };
                if !command.is_sensitive() {
                    let _ = rl.add_history_entry(trimmed);
                }

                if matches!(command, Command::Quit) {
                    output::info("Goodbye!");
                    break;
                }
                dispatch(command, &usecase, &renderer).await;
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                output::info("CTRL-D detected. Exiting...");
                break;
            }
            Err(err) => {
                output::error(&format!("Error: {err:?}"));
                break;
            }
        }
    }

    tracing::info!("chronicles exiting");
    Ok(())
}

async fn dispatch(
    command: Command,
    usecase: &Arc<ChroniclesUseCase>,
    renderer: &Arc<dyn ChartRenderer>,
) {
    match command {
        Command::Login(form) => match usecase.login(form).await {
            Ok(message) => {
                output::info(&message);
                load_history(usecase).await;
            }
            Err(_) => show_session_error(usecase).await,
        },
        Command::Signup(form) => match usecase.signup(form).await {
            Ok(message) => {
                output::info(&message);
                load_history(usecase).await;
            }
            Err(_) => show_session_error(usecase).await,
        },
        Command::Logout => {
            usecase.logout().await;
            output::info("Logged out.");
        }
        Command::Mode(mode) => {
            usecase.set_view_mode(mode).await;
            output::hint(&format!("View mode: {mode}"));
            output::presentation(&usecase.presentation().await, renderer.as_ref());
        }
        Command::Chart(kind) => {
            usecase.set_chart_kind(kind).await;
            output::hint(&format!("Chart type: {kind}"));
            output::presentation(&usecase.presentation().await, renderer.as_ref());
        }
        Command::History => load_history(usecase).await,
        Command::Status => output::status(&usecase.snapshot().await),
        Command::Help => output::help(),
        Command::Query(text) => spawn_query(text, usecase, renderer),
        Command::Quit => {}
    }
}

/// Runs a query in the background so the prompt stays usable; a newer query
/// supersedes it and a session change discards it.
fn spawn_query(text: String, usecase: &Arc<ChroniclesUseCase>, renderer: &Arc<dyn ChartRenderer>) {
    let usecase = Arc::clone(usecase);
    let renderer = Arc::clone(renderer);

    output::hint("Querying...");
    tokio::spawn(async move {
        match usecase.submit_query(&text).await {
            Ok(QueryOutcome::Committed(_)) => {
                let state = usecase.snapshot().await;
                if let Some(message) = state.query.message() {
                    output::info(message);
                }
                output::presentation(&state.presentation(), renderer.as_ref());
            }
            Ok(QueryOutcome::Superseded) => {
                output::hint(&format!("(answer to \"{text}\" skipped, a newer query was sent)"));
            }
            Ok(QueryOutcome::Discarded) => {
                output::hint(&format!("(answer to \"{text}\" discarded, the session changed)"));
            }
            Err(err) if err.is_validation() => output::error(&err.to_string()),
            Err(_) => {
                let state = usecase.snapshot().await;
                output::error(state.query.error().unwrap_or(QUERY_FAILURE_FALLBACK));
            }
        }
    });
}

async fn load_history(usecase: &ChroniclesUseCase) {
    let before = usecase.snapshot().await.history.entries().len();

    match usecase.load_history().await {
        Ok(HistoryLoad::Loaded { added, end }) => {
            let state = usecase.snapshot().await;
            if added == 0 && before == 0 {
                output::hint("No history yet.");
            } else {
                let page = state.history.entries().get(before..).unwrap_or_default();
                output::history(page, end);
            }
        }
        Ok(HistoryLoad::Unavailable) => {
            let state = usecase.snapshot().await;
            if state.history.is_loading() {
                output::hint("History is still loading.");
            } else {
                output::hint("No more history.");
            }
        }
        Err(err) if err.is_validation() => output::error(&err.to_string()),
        Err(_) => {
            let state = usecase.snapshot().await;
            output::error(state.history.error().unwrap_or(HISTORY_FAILURE_FALLBACK));
        }
    }
}

async fn show_session_error(usecase: &ChroniclesUseCase) {
    let state = usecase.snapshot().await;
    output::error(state.session.error().unwrap_or("Authentication failed"));
}

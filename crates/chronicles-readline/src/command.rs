//! Parsing of REPL input lines.

use anyhow::{Result, anyhow, bail};
use chronicles_core::session::{LoginForm, SignupForm};
use chronicles_core::{ChartKind, ViewMode};

/// Slash commands offered for completion and hints.
pub const COMMANDS: &[&str] = &[
    "/login", "/signup", "/logout", "/mode", "/chart", "/history", "/status", "/help",
];

pub const LOGIN_USAGE: &str = "/login <email> <password>";
pub const SIGNUP_USAGE: &str = "/signup <email> <phone> <name> <password>";
pub const MODE_USAGE: &str = "/mode chart|text";
pub const CHART_USAGE: &str = "/chart pie|bar|line";

#[derive(Debug, Clone)]
pub enum Command {
    Login(LoginForm),
    Signup(SignupForm),
    Logout,
    Mode(ViewMode),
    Chart(ChartKind),
    History,
    Status,
    Help,
    Quit,
    /// Anything that is not a command is a question for the backend.
    Query(String),
}

impl Command {
    /// Whether the line carries a password and must stay out of the
    /// readline history.
    pub fn is_sensitive(&self) -> bool {
        matches!(self, Self::Login(_) | Self::Signup(_))
    }
}

/// Parses one trimmed, non-empty input line.
pub fn parse(line: &str) -> Result<Command> {
    let line = line.trim();
    if line == "quit" || line == "exit" {
        return Ok(Command::Quit);
    }
    if !line.starts_with('/') {
        return Ok(Command::Query(line.to_string()));
    }

    let mut parts = line.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();

    match name {
        "/login" => match args.as_slice() {
            [email, password] => Ok(Command::Login(LoginForm::new(*email, *password))),
            _ => bail!("Usage: {LOGIN_USAGE}"),
        },
        "/signup" => match args.as_slice() {
            // Names may contain spaces; everything between phone and password.
            [email, phone, name @ .., password] if !name.is_empty() => Ok(Command::Signup(
                SignupForm::new(*email, *phone, name.join(" "), *password),
            )),
            _ => bail!("Usage: {SIGNUP_USAGE}"),
        },
        "/logout" => Ok(Command::Logout),
        "/mode" => match args.as_slice() {
            [mode] => mode
                .parse::<ViewMode>()
                .map(Command::Mode)
                .map_err(|_| anyhow!("Unknown view mode '{mode}'. Usage: {MODE_USAGE}")),
            _ => bail!("Usage: {MODE_USAGE}"),
        },
        "/chart" => match args.as_slice() {
            [kind] => kind
                .parse::<ChartKind>()
                .map(Command::Chart)
                .map_err(|_| anyhow!("Unknown chart type '{kind}'. Usage: {CHART_USAGE}")),
            _ => bail!("Usage: {CHART_USAGE}"),
        },
        "/history" => Ok(Command::History),
        "/status" => Ok(Command::Status),
        "/help" => Ok(Command::Help),
        other => bail!("Unknown command '{other}'. Type /help for the list."),
    }
}

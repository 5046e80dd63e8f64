//! Colored console output for the REPL.

use colored::Colorize;

use chronicles_core::history::HistoryEntry;
use chronicles_core::{AppState, ChartRenderer, Presentation};

use crate::command::{CHART_USAGE, LOGIN_USAGE, MODE_USAGE, SIGNUP_USAGE};

pub fn info(message: &str) {
    println!("{}", message.bright_green());
}

pub fn error(message: &str) {
    eprintln!("{}", message.red());
}

pub fn hint(message: &str) {
    println!("{}", message.bright_black());
}

/// Prints the held result the way the current view mode presents it.
pub fn presentation(presentation: &Presentation, renderer: &dyn ChartRenderer) {
    match presentation {
        Presentation::Chart(spec) => match renderer.render(spec) {
            Ok(chart) => {
                for line in chart.lines() {
                    println!("{}", line.bright_blue());
                }
            }
            Err(err) => error(&format!("Failed to render chart: {err}")),
        },
        Presentation::Text(text) => {
            for line in text.lines() {
                println!("{}", line.bright_blue());
            }
        }
        Presentation::Empty => hint("(no result)"),
    }
}

/// Prints history entries, most recent page last.
pub fn history(entries: &[HistoryEntry], end: bool) {
    for entry in entries {
        println!("{}", format!("Q: {}", entry.user_query).bright_magenta());
        let answer = entry
            .decoded_response()
            .map(|result| result.summary())
            .unwrap_or_else(|| entry.response.clone());
        for line in answer.lines() {
            println!("   {}", line.bright_blue());
        }
    }

    if end {
        hint("No more history.");
    } else {
        hint("Type /history to load more.");
    }
}

pub fn status(state: &AppState) {
    match state.session.email().filter(|_| state.session.is_authenticated()) {
        Some(email) => {
            let since = state
                .session
                .signed_in_at()
                .map(|at| format!(" since {}", at.format("%Y-%m-%d %H:%M UTC")))
                .unwrap_or_default();
            info(&format!("Signed in as {email}{since}"));
        }
        None => hint("Not signed in."),
    }

    println!(
        "View: {} (chart type: {})",
        state.view.mode().to_string().cyan(),
        state.view.chart_kind().to_string().cyan()
    );
    if let Some(query) = state.query.last_query() {
        println!("Last query: {}", query.green());
    }
    if state.query.is_submitting() {
        hint("A query is in progress...");
    }
    println!(
        "History: {} loaded{}",
        state.history.entries().len(),
        if state.history.is_end() { ", end reached" } else { "" }
    );
}

pub fn help() {
    println!("{}", "Commands:".bright_magenta().bold());
    let rows = [
        (LOGIN_USAGE, "sign in"),
        (SIGNUP_USAGE, "create an account and sign in"),
        ("/logout", "sign out"),
        (MODE_USAGE, "present results as a chart or as text"),
        (CHART_USAGE, "choose the chart type"),
        ("/history", "load the next page of past queries"),
        ("/status", "show session and view settings"),
        ("/help", "show this list"),
        ("quit | exit", "leave"),
    ];
    for (usage, what) in rows {
        println!("  {} {}", format!("{usage:<44}").bright_cyan(), what.bright_black());
    }
    hint("Anything else is sent as a question, e.g. \"thefts by type in 2023\".");
}

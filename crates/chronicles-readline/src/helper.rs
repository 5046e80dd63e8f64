use std::borrow::Cow::{self, Borrowed, Owned};

use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use chronicles_core::{ChartKind, ViewMode};
use strum::IntoEnumIterator;

use crate::command::COMMANDS;

/// Rustyline helper: completion, highlighting and hints for slash commands
/// and their fixed arguments.
#[derive(Clone)]
pub struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    pub fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|cmd| cmd.to_string()).collect(),
        }
    }

    /// Candidates for the word ending at the cursor, with the byte offset it
    /// starts at.
    fn candidates(&self, line: &str) -> (usize, Vec<String>) {
        if !line.starts_with('/') {
            return (0, Vec::new());
        }

        match line.split_once(' ') {
            None => (
                0,
                self.commands
                    .iter()
                    .filter(|cmd| cmd.starts_with(line))
                    .cloned()
                    .collect(),
            ),
            Some((command, rest)) if !rest.contains(' ') => {
                let values: Vec<String> = match command {
                    "/mode" => ViewMode::iter().map(|mode| mode.to_string()).collect(),
                    "/chart" => ChartKind::iter().map(|kind| kind.to_string()).collect(),
                    _ => Vec::new(),
                };
                (
                    command.len() + 1,
                    values.into_iter().filter(|v| v.starts_with(rest)).collect(),
                )
            }
            Some(_) => (0, Vec::new()),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, words) = self.candidates(&line[..pos]);
        let candidates = words
            .into_iter()
            .map(|word| Pair {
                display: word.clone(),
                replacement: word,
            })
            .collect();
        Ok((start, candidates))
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        let (start, words) = self.candidates(line);
        let typed = &line[start..];

        words
            .into_iter()
            .find(|word| word.len() > typed.len())
            .map(|word| word[typed.len()..].to_string())
    }
}

impl Validator for CliHelper {}

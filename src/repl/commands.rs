//! Command handler for REPL built-in commands

use colored::*;
use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use std::io;

use crate::repl::session::{QueryOutcome, SessionManager};
use crate::telemetry::TelemetryCollector;

/// Built-in commands and their help text
const HELP_TABLE: &[(&str, &str)] = &[
    ("/help, /h", "Show this help message"),
    ("/sources [on|off]", "Show or hide supporting passages"),
    ("/history [n]", "Show the last n questions (default 10)"),
    ("/stats", "Show session statistics"),
    ("/clear, /cls", "Clear the screen"),
    ("/exit, /quit, /q", "Leave the session"),
];

/// Slash commands understood by the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    History { limit: Option<usize> },
    Sources { enable: bool },
    Stats,
    Clear,
    Exit,
    Unknown { input: String },
}

/// Check whether input is a built-in command rather than a question
pub fn is_command(input: &str) -> bool {
    input.trim_start().starts_with('/')
}

/// Parses and runs slash commands
pub struct CommandHandler {
    telemetry: Option<TelemetryCollector>,
}

impl CommandHandler {
    pub fn new() -> Self {
        CommandHandler { telemetry: None }
    }

    /// Attach telemetry for `/stats`
    pub fn with_telemetry(mut self, telemetry: TelemetryCollector) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Parse a slash command; anything unrecognised becomes `Unknown`
    pub fn parse(&self, input: &str) -> Command {
        let trimmed = input.trim();

        let Some(rest) = trimmed.strip_prefix('/') else {
            return Command::Unknown { input: input.to_string() };
        };

        let parts: Vec<&str> = rest.split_whitespace().collect();
        let Some(name) = parts.first() else {
            return Command::Unknown { input: input.to_string() };
        };

        match name.to_lowercase().as_str() {
            "help" | "h" => Command::Help,
            "exit" | "quit" | "q" => Command::Exit,
            "history" => {
                let limit = parts.get(1).and_then(|s| s.parse().ok());
                Command::History { limit }
            }
            "sources" | "src" => {
                let enable = parts
                    .get(1)
                    .map(|s| matches!(s.to_lowercase().as_str(), "on" | "1" | "true"))
                    .unwrap_or(true);
                Command::Sources { enable }
            }
            "stats" => Command::Stats,
            "clear" | "cls" => Command::Clear,
            _ => Command::Unknown { input: input.to_string() },
        }
    }

    /// Run a command. Returns false once the session should end.
    pub fn execute(&self, command: Command, session: &mut SessionManager) -> bool {
        match command {
            Command::Help => {
                self.show_help();
                true
            }
            Command::Exit => false,
            Command::History { limit } => {
                self.show_history(session, limit.unwrap_or(10));
                true
            }
            Command::Sources { enable } => {
                session.set_show_sources(enable);
                let status = if enable { "shown" } else { "hidden" };
                println!("{}", format!("Supporting passages will be {}", status).cyan());
                true
            }
            Command::Stats => {
                match &self.telemetry {
                    Some(telemetry) => telemetry.display_summary(),
                    None => println!("{}", "No statistics collected.".yellow()),
                }
                true
            }
            Command::Clear => {
                if let Err(e) = execute!(io::stdout(), Clear(ClearType::All), cursor::MoveTo(0, 0)) {
                    tracing::debug!(error = %e, "clear screen failed");
                }
                true
            }
            Command::Unknown { input } => {
                println!(
                    "{} {} (try {})",
                    "Unrecognised command:".red(),
                    input.trim(),
                    "/help".cyan()
                );
                true
            }
        }
    }

    fn show_help(&self) {
        println!("\n{}", "Commands".bold().cyan());
        for (cmd, desc) in HELP_TABLE {
            println!("  {:<20} {}", cmd.green(), desc);
        }
        println!(
            "\nAnything else is sent as a question. {} recalls earlier input, {} leaves.\n",
            "Up/Down".cyan(),
            "Ctrl-D".cyan()
        );
    }

    fn show_history(&self, session: &SessionManager, limit: usize) {
        let history = session.get_history(limit);
        if history.is_empty() {
            println!("{}", "No questions asked yet.".yellow());
            return;
        }

        println!("\n{}", format!("Recent questions ({})", history.len()).bold().cyan());
        // Newest first, numbered by position in the whole session
        let total = session.history_len();
        for (offset, record) in history.iter().enumerate() {
            let marker = match &record.outcome {
                QueryOutcome::Answered => "✓".green(),
                QueryOutcome::NotFound => "?".yellow(),
                QueryOutcome::Failed { category } => category.as_str().red(),
            };
            println!(
                "  {:>3} {} {} {}",
                (total - offset).to_string().cyan(),
                marker,
                record.query,
                format!("{}ms", record.duration_ms).dimmed()
            );
        }
        println!();
    }
}

impl Default for CommandHandler {
    fn default() -> Self {
        Self::new()
    }
}

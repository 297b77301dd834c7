//! Interactive question loop
//!
//! Reads one question at a time, answers it through a shared
//! [`QueryEngine`], and keeps going after per-query errors.

pub mod commands;
pub mod display;
pub mod input;
pub mod session;

use anyhow::Result;
use std::path::PathBuf;
use std::time::Instant;

use crate::engine::QueryEngine;
use crate::repl::commands::{is_command, CommandHandler};
pub use crate::repl::display::DisplayManager;
use crate::repl::input::{InputEvent, InputHandler};
pub use crate::repl::session::{QueryOutcome, QueryRecord, SessionManager};
use crate::telemetry::TelemetryCollector;

/// What the loop should do with a line of input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplAction {
    Continue,
    Ask(String),
    Exit,
}

/// Configuration for REPL mode
#[derive(Debug, Clone, Default)]
pub struct ReplConfig {
    pub history_file: Option<PathBuf>,
    pub show_sources: bool,
    pub show_progress: bool,
}

/// REPL session coordinator
pub struct ReplSession {
    input_handler: InputHandler,
    command_handler: CommandHandler,
    session_manager: SessionManager,
    display_manager: DisplayManager,
}

impl ReplSession {
    pub fn new(config: &ReplConfig, telemetry: TelemetryCollector) -> Result<Self> {
        let input_handler = match &config.history_file {
            Some(path) => InputHandler::with_history(path.clone())?,
            None => InputHandler::new()?,
        };
        let mut session_manager = SessionManager::new();
        session_manager.set_show_sources(config.show_sources);
        let display_manager = if config.show_progress {
            DisplayManager::new()
        } else {
            DisplayManager::new().without_progress()
        };

        Ok(ReplSession {
            input_handler,
            command_handler: CommandHandler::new().with_telemetry(telemetry),
            session_manager,
            display_manager,
        })
    }

    /// Classify a line: built-in command, question, or nothing
    pub fn handle_input(&mut self, input: &str) -> ReplAction {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return ReplAction::Continue;
        }

        if is_command(trimmed) {
            let command = self.command_handler.parse(trimmed);
            return if self.command_handler.execute(command, &mut self.session_manager) {
                ReplAction::Continue
            } else {
                ReplAction::Exit
            };
        }

        ReplAction::Ask(trimmed.to_string())
    }

    /// Answer one question and report the outcome; errors do not end the loop
    pub async fn ask(&mut self, engine: &QueryEngine, query: &str) -> QueryOutcome {
        let started = Instant::now();
        let spinner = self.display_manager.start_thinking();
        let result = engine.answer(query).await;
        spinner.finish_and_clear();

        let outcome = match result {
            Ok(answered) => {
                self.display_manager
                    .show_answer(&answered, self.session_manager.show_sources());
                if answered.has_confident_answer() {
                    QueryOutcome::Answered
                } else {
                    QueryOutcome::NotFound
                }
            }
            Err(err) => {
                self.display_manager.show_rag_error(&err);
                QueryOutcome::Failed {
                    category: err.category().to_string(),
                }
            }
        };

        self.session_manager.record(QueryRecord::new(
            query,
            outcome.clone(),
            started.elapsed().as_millis() as u64,
        ));
        outcome
    }

    /// Run until `/exit` or Ctrl-D
    pub async fn run(&mut self, engine: &QueryEngine) -> Result<()> {
        self.display_manager
            .show_banner(env!("CARGO_PKG_VERSION"), engine.retriever().index().len());

        loop {
            let line = match self.input_handler.read_line()? {
                InputEvent::Line(line) => line,
                InputEvent::Interrupted => continue,
                InputEvent::Eof => break,
            };

            match self.handle_input(&line) {
                ReplAction::Continue => {}
                ReplAction::Exit => break,
                ReplAction::Ask(query) => {
                    self.ask(engine, &query).await;
                }
            }
        }

        self.save()
    }

    pub fn save(&mut self) -> Result<()> {
        self.input_handler.save_history()
    }

    pub fn session(&self) -> &SessionManager {
        &self.session_manager
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> ReplSession {
        ReplSession::new(&ReplConfig::default(), TelemetryCollector::new()).unwrap()
    }

    #[test]
    fn test_empty_input_continues() {
        let mut repl = session();
        assert_eq!(repl.handle_input(""), ReplAction::Continue);
        assert_eq!(repl.handle_input("   "), ReplAction::Continue);
    }

    #[test]
    fn test_exit_command() {
        let mut repl = session();
        assert_eq!(repl.handle_input("/exit"), ReplAction::Exit);
    }

    #[test]
    fn test_question_is_asked() {
        let mut repl = session();
        assert_eq!(
            repl.handle_input("  What are your hours? "),
            ReplAction::Ask("What are your hours?".to_string())
        );
    }

    #[test]
    fn test_sources_toggle() {
        let mut repl = session();
        assert_eq!(repl.handle_input("/sources on"), ReplAction::Continue);
        assert!(repl.session().show_sources());
    }
}

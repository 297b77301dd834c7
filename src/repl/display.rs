//! Terminal output for answers, passages and errors

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::engine::AnsweredQuery;
use crate::errors::RagError;
use crate::index::RetrievedPassage;

/// Longest passage excerpt printed under an answer
const EXCERPT_CHARS: usize = 240;

/// Display manager for REPL and one-shot output
pub struct DisplayManager {
    show_progress: bool,
    update_interval: Duration,
}

impl DisplayManager {
    pub fn new() -> Self {
        DisplayManager {
            show_progress: true,
            update_interval: Duration::from_millis(100),
        }
    }

    /// Disable spinners (quiet mode, non-interactive output)
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    pub fn show_banner(&self, version: &str, entries: usize) {
        let width = 64;
        println!("\n{}", "=".repeat(width).cyan());
        println!("{}", format!("  Ask Aroma's AI Assistant {}", version).bold().cyan());
        println!("{}", format!("  Index: {} passages", entries).dimmed());
        println!("{}\n", "=".repeat(width).cyan());
        println!(
            "Ask about our menu, allergens, hours, catering, or policies (or {} for commands, {} to quit)\n",
            "/help".green(),
            "/exit".green()
        );
    }

    /// Spinner shown while a query runs
    pub fn start_thinking(&self) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message("Thinking...");
        pb.enable_steady_tick(self.update_interval);
        pb
    }

    /// Print an answer, or the not-found notice when it is empty
    pub fn show_answer(&self, answered: &AnsweredQuery, show_sources: bool) {
        if answered.has_confident_answer() {
            println!("{} {}", "✓".green().bold(), answered.answer.green());
        } else {
            println!(
                "{} {}",
                "?".yellow().bold(),
                "I did not find a confident answer. Please try rephrasing.".yellow()
            );
        }

        if show_sources {
            self.show_sources(&answered.passages);
        }
        println!();
    }

    pub fn show_sources(&self, passages: &[RetrievedPassage]) {
        if passages.is_empty() {
            return;
        }
        println!("\n{}", "Sources:".bold().cyan());
        for passage in passages {
            let source = passage.document.source().unwrap_or(&passage.document.id);
            println!(
                "  {}. {} {}",
                passage.rank.to_string().cyan(),
                source.dimmed(),
                format!("(distance {:.4})", passage.distance).dimmed()
            );
            println!("     {}", excerpt(&passage.document.text, EXCERPT_CHARS));
        }
    }

    /// Print an error category, message and hint; never a backtrace
    pub fn show_rag_error(&self, err: &RagError) {
        println!(
            "{} {}",
            format!("{}:", err.category()).red().bold(),
            err.to_string().red()
        );
        if let Some(hint) = err.hint() {
            println!("  {}", hint.dimmed());
        }
    }
}

impl Default for DisplayManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Collapse whitespace and cut to `max` characters
pub fn excerpt(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max {
        flat
    } else {
        let cut: String = flat.chars().take(max).collect();
        format!("{}...", cut.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    #[test]
    fn test_excerpt_short_text_unchanged() {
        assert_eq!(excerpt("Open\n  9am", 20), "Open 9am");
    }

    #[test]
    fn test_excerpt_truncates() {
        let text = "a".repeat(50);
        let out = excerpt(&text, 10);
        assert_eq!(out, format!("{}...", "a".repeat(10)));
    }

    #[test]
    fn test_hidden_spinner() {
        let display = DisplayManager::new().without_progress();
        let pb = display.start_thinking();
        assert!(pb.is_hidden());
        pb.finish_and_clear();
    }

    #[test]
    fn test_show_answer_variants() {
        let display = DisplayManager::new();
        let passage = RetrievedPassage {
            document: Document::new("d", "We open at 9am.").with_metadata("source", "data.txt"),
            rank: 1,
            distance: 0.25,
        };
        let answered = AnsweredQuery {
            query: "hours?".into(),
            answer: "9am to 10pm".into(),
            passages: vec![passage],
        };
        display.show_answer(&answered, true);

        let not_found = AnsweredQuery {
            answer: String::new(),
            ..answered
        };
        display.show_answer(&not_found, false);
        display.show_rag_error(&RagError::Configuration("missing key".into()));
    }
}

//! Query telemetry for aromabot
//!
//! Collects per-query events in process and keeps running statistics for
//! the REPL `/stats` command. Log output goes through `tracing`; this
//! module only counts.

use colored::*;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Events kept for the summary; older ones are dropped
pub const MAX_EVENTS: usize = 1000;

/// Failures listed at the end of the summary
const RECENT_FAILURES: usize = 3;

/// Query lifecycle events
#[derive(Debug, Clone)]
pub enum TelemetryEvent {
    QueryStarted {
        query: String,
        timestamp: Instant,
    },
    RetrievalCompleted {
        passages: usize,
        duration_ms: u64,
        timestamp: Instant,
    },
    SynthesisCompleted {
        answered: bool,
        duration_ms: u64,
        timestamp: Instant,
    },
    QueryFailed {
        category: &'static str,
        timestamp: Instant,
    },
}

/// Aggregate statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetryStats {
    pub queries: usize,
    pub answered: usize,
    pub not_found: usize,
    pub failed: usize,
    pub passages_retrieved: usize,
    pub retrieval_ms_total: u64,
    pub synthesis_ms_total: u64,
}

impl TelemetryStats {
    /// Mean end-to-end latency of completed queries
    pub fn mean_latency_ms(&self) -> f64 {
        let completed = self.answered + self.not_found;
        if completed == 0 {
            0.0
        } else {
            (self.retrieval_ms_total + self.synthesis_ms_total) as f64 / completed as f64
        }
    }
}

/// Thread-safe telemetry collector
#[derive(Clone)]
pub struct TelemetryCollector {
    events: Arc<Mutex<VecDeque<TelemetryEvent>>>,
    stats: Arc<Mutex<TelemetryStats>>,
    start_time: Instant,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl TelemetryCollector {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::new())),
            stats: Arc::new(Mutex::new(TelemetryStats::default())),
            start_time: Instant::now(),
        }
    }

    /// Record an event
    pub fn record(&self, event: TelemetryEvent) {
        {
            let mut stats = lock(&self.stats);
            match &event {
                TelemetryEvent::QueryStarted { .. } => {
                    stats.queries += 1;
                }
                TelemetryEvent::RetrievalCompleted {
                    passages,
                    duration_ms,
                    ..
                } => {
                    stats.passages_retrieved += passages;
                    stats.retrieval_ms_total += duration_ms;
                }
                TelemetryEvent::SynthesisCompleted {
                    answered,
                    duration_ms,
                    ..
                } => {
                    if *answered {
                        stats.answered += 1;
                    } else {
                        stats.not_found += 1;
                    }
                    stats.synthesis_ms_total += duration_ms;
                }
                TelemetryEvent::QueryFailed { .. } => {
                    stats.failed += 1;
                }
            }
        }

        let mut events = lock(&self.events);
        if events.len() >= MAX_EVENTS {
            events.pop_front();
        }
        events.push_back(event);
    }

    pub fn get_stats(&self) -> TelemetryStats {
        lock(&self.stats).clone()
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn event_count(&self) -> usize {
        lock(&self.events).len()
    }

    /// Categories of the last `n` failures, newest first
    pub fn recent_failures(&self, n: usize) -> Vec<&'static str> {
        lock(&self.events)
            .iter()
            .rev()
            .filter_map(|event| match event {
                TelemetryEvent::QueryFailed { category, .. } => Some(*category),
                _ => None,
            })
            .take(n)
            .collect()
    }

    /// Fraction of finished queries that did not error
    pub fn success_rate(&self) -> f64 {
        let stats = lock(&self.stats);
        let finished = stats.answered + stats.not_found + stats.failed;
        if finished == 0 {
            1.0
        } else {
            (stats.answered + stats.not_found) as f64 / finished as f64
        }
    }

    /// Print a session summary
    pub fn display_summary(&self) {
        let stats = self.get_stats();

        println!("\n{}", "Session Summary".bold().cyan());
        println!("{}", "-".repeat(40).cyan());
        println!("Duration:          {:.1}s", self.elapsed().as_secs_f64());
        println!("Questions:         {}", stats.queries);
        println!("Answered:          {}", stats.answered);
        println!("No answer found:   {}", stats.not_found);
        println!("Errors:            {}", stats.failed);
        println!("Success rate:      {:.1}%", self.success_rate() * 100.0);
        println!("Mean latency:      {:.0}ms", stats.mean_latency_ms());

        let failures = self.recent_failures(RECENT_FAILURES);
        if !failures.is_empty() {
            println!("Recent errors:     {}", failures.join(", ").red());
        }
        println!();
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}

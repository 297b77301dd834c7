//! Tracing subscriber setup
//!
//! Logs go to stderr so answers on stdout stay clean. `RUST_LOG` overrides
//! the verbosity-derived default.

use tracing_subscriber::EnvFilter;

use crate::cli::Verbosity;

/// Filter for the given verbosity, unless `RUST_LOG` is set
pub fn env_filter(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.log_filter()))
}

/// Install the global subscriber. Safe to call more than once.
pub fn init(verbosity: Verbosity) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbosity))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        init(Verbosity::Quiet);
        init(Verbosity::VeryVerbose);
    }
}

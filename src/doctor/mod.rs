//! Doctor command for setup diagnostics
//!
//! Checks the things a first run usually trips over: the credential, the
//! source text, the prebuilt index, and provider reachability.

use colored::*;

use crate::config::{Config, Credential};
use crate::index::VectorIndex;
use crate::provider::ProviderClient;

/// Health check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Pass,
    Warn(String),
    Fail(String),
}

/// Individual health check
#[derive(Debug)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
}

impl HealthCheck {
    fn new(name: &str, status: HealthStatus) -> Self {
        Self {
            name: name.to_string(),
            status,
        }
    }
}

/// Doctor diagnostics system
pub struct Doctor {
    config: Config,
}

impl Doctor {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run all health checks.
    ///
    /// The network check only runs when a credential is present.
    pub async fn run_diagnostics(&self, credential: Option<&Credential>) -> Vec<HealthCheck> {
        let mut checks = vec![
            self.check_credential(credential),
            self.check_source(),
            self.check_index(),
        ];

        match credential {
            Some(credential) => checks.push(self.check_provider(credential).await),
            None => checks.push(HealthCheck::new(
                "Provider API",
                HealthStatus::Warn("skipped, no credential".to_string()),
            )),
        }

        checks
    }

    fn check_credential(&self, credential: Option<&Credential>) -> HealthCheck {
        let status = match credential {
            Some(_) => HealthStatus::Pass,
            None => HealthStatus::Fail(format!(
                "{} not set in environment or .env",
                crate::config::API_KEY_ENV
            )),
        };
        HealthCheck::new("API credential", status)
    }

    fn check_source(&self) -> HealthCheck {
        let path = &self.config.index.source_path;
        let status = if path.is_file() {
            HealthStatus::Pass
        } else {
            // Only needed for `build`
            HealthStatus::Warn(format!("{} not found", path.display()))
        };
        HealthCheck::new("Source text", status)
    }

    fn check_index(&self) -> HealthCheck {
        let status = match VectorIndex::load(&self.config.index.index_dir) {
            Ok(index) => {
                if index.manifest().model == self.config.provider.embedding_model {
                    HealthStatus::Pass
                } else {
                    HealthStatus::Warn(format!(
                        "built with {}, configured {}",
                        index.manifest().model,
                        self.config.provider.embedding_model
                    ))
                }
            }
            Err(e) => HealthStatus::Fail(e.to_string()),
        };
        HealthCheck::new("Vector index", status)
    }

    async fn check_provider(&self, credential: &Credential) -> HealthCheck {
        let status = match ProviderClient::from_config(&self.config.provider, credential.clone()) {
            Ok(client) => match client.check_access().await {
                Ok(()) => HealthStatus::Pass,
                Err(e) => HealthStatus::Fail(e.to_string()),
            },
            Err(e) => HealthStatus::Fail(e.to_string()),
        };
        HealthCheck::new("Provider API", status)
    }

    /// Display diagnostics results
    pub fn display_results(checks: &[HealthCheck]) {
        println!("\n{}\n", "aromabot Diagnostics".bold().cyan());
        println!("{:<20} Status", "Check");
        println!("{}", "=".repeat(50));

        for check in checks {
            let line = match &check.status {
                HealthStatus::Pass => "PASS".green(),
                HealthStatus::Warn(msg) => format!("WARN: {}", msg).yellow(),
                HealthStatus::Fail(msg) => format!("FAIL: {}", msg).red(),
            };
            println!("{:<20} {}", check.name, line);
        }

        println!();
    }

    /// True when no check failed
    pub fn overall_status(checks: &[HealthCheck]) -> bool {
        !checks.iter().any(|c| matches!(c.status, HealthStatus::Fail(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.index.source_path = dir.path().join("restaurant_data.txt");
        config.index.index_dir = dir.path().join("restaurant_index");
        config
    }

    #[tokio::test]
    async fn test_missing_everything() {
        let dir = TempDir::new().unwrap();
        let doctor = Doctor::new(config_in(&dir));

        let checks = doctor.run_diagnostics(None).await;
        assert_eq!(checks.len(), 4);
        assert!(matches!(checks[0].status, HealthStatus::Fail(_)));
        assert!(matches!(checks[1].status, HealthStatus::Warn(_)));
        assert!(matches!(checks[2].status, HealthStatus::Fail(_)));
        assert!(matches!(checks[3].status, HealthStatus::Warn(_)));
        assert!(!Doctor::overall_status(&checks));
    }

    #[test]
    fn test_source_present() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        std::fs::write(&config.index.source_path, "We open at 9am.").unwrap();

        let check = Doctor::new(config).check_source();
        assert_eq!(check.status, HealthStatus::Pass);
    }

    #[test]
    fn test_overall_status_pass() {
        let checks = vec![
            HealthCheck::new("a", HealthStatus::Pass),
            HealthCheck::new("b", HealthStatus::Warn("minor".into())),
        ];
        assert!(Doctor::overall_status(&checks));
    }
}

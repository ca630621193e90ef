use serde::Deserialize;

use crate::error::{PipelineError, Result};
use crate::schema::Position;

/// Scrape settings loaded from `profile_config.yaml`. Immutable for the
/// duration of a run; threaded explicitly into each stage.
#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeConfig {
    /// Position slug to scrape, e.g. "running-back".
    pub position: String,

    /// Browser user-agent sent with every request.
    pub user_agent: String,

    /// Optional Cookie header value.
    #[serde(default)]
    pub cookie: Option<String>,

    /// Skip players whose popularity-index span reads "-".
    #[serde(default = "default_true")]
    pub pop_index: bool,

    /// Load the previously saved link list instead of re-fetching it.
    #[serde(default)]
    pub reuse_links: bool,

    /// Pause between profile requests, in milliseconds.
    #[serde(default = "default_delay_ms")]
    pub request_delay_ms: u64,

    /// Per-request timeout, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_delay_ms() -> u64 {
    500
}

fn default_timeout_secs() -> u64 {
    30
}

impl ScrapeConfig {
    /// Load and validate the YAML config file.
    pub fn load(path: &str) -> Result<ScrapeConfig> {
        let cfg: ScrapeConfig = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()
            .map_err(|e| PipelineError::Configuration(e.to_string()))?
            .try_deserialize()
            .map_err(|e| PipelineError::Configuration(e.to_string()))?;
        Ok(cfg)
    }

    /// Resolve the configured position, failing before any I/O when the
    /// slug is not one of the four recognized positions.
    pub fn position(&self) -> Result<Position> {
        self.position.parse()
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> ScrapeConfig {
        ScrapeConfig {
            position: "running-back".into(),
            user_agent: "test-agent".into(),
            cookie: None,
            pop_index: true,
            reuse_links: false,
            request_delay_ms: 0,
            request_timeout_secs: 30,
        }
    }

    #[test]
    fn valid_position_resolves() {
        assert_eq!(minimal().position().unwrap(), Position::RunningBack);
    }

    #[test]
    fn invalid_position_fails_fast() {
        let mut cfg = minimal();
        cfg.position = "kicker".into();
        assert!(cfg.position().is_err());
    }

    #[test]
    fn missing_file_is_configuration_error() {
        let err = ScrapeConfig::load("no_such_config").unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(_)));
    }
}

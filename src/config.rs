//! Layered configuration for the interview client.
//!
//! Settings are merged from three layers, later layers winning:
//! 1. `interview.toml` (working directory, `--config`, or the user config dir)
//! 2. Environment variables (`INTERVIEW_BASE_URL`, `API_BASE_URL`)
//! 3. CLI arguments
//!
//! # Configuration File Format
//!
//! ```toml
//! [backend]
//! base_url = "http://localhost:8000/api/interview"
//! request_timeout_secs = 30
//!
//! [polling]
//! initial_delay_ms = 100
//! interval_ms = 500
//! max_attempts = 20
//!
//! [candidate]
//! role = "Accountant"
//! name = "Jane Doe"
//!
//! [logging]
//! format = "compact"
//! file = "interview.log"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::StartRequest;
use crate::logging::{LogFormat, LoggingOptions};
use crate::poll::RetryPolicy;
use crate::poll::retry::{DEFAULT_INITIAL_DELAY_MS, DEFAULT_INTERVAL_MS, DEFAULT_MAX_ATTEMPTS};

/// File name searched for in the working directory and the user config dir.
pub const CONFIG_FILE_NAME: &str = "interview.toml";
/// Directory under the platform config dir holding the fallback file.
pub const CONFIG_DIR_NAME: &str = "interview-orchestrator";
/// Backend used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/interview";
/// Path appended to `API_BASE_URL`, which names only the host.
pub const API_PATH: &str = "/api/interview";

/// Full backend URL; takes precedence over the file.
pub const ENV_BASE_URL: &str = "INTERVIEW_BASE_URL";
/// Backend host shared with the web client; `/api/interview` is appended.
pub const ENV_API_HOST: &str = "API_BASE_URL";

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for BackendSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Question polling cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingSection {
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for PollingSection {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            interval_ms: default_interval_ms(),
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_initial_delay_ms() -> u64 {
    DEFAULT_INITIAL_DELAY_MS
}

fn default_interval_ms() -> u64 {
    DEFAULT_INTERVAL_MS
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

/// Defaults for the start request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSection {
    #[serde(default)]
    pub format: LogFormat,
    /// Also write logs to this file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

/// Contents of `interview.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterviewToml {
    #[serde(default)]
    pub backend: BackendSection,
    #[serde(default)]
    pub polling: PollingSection,
    #[serde(default)]
    pub candidate: CandidateSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

impl InterviewToml {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse interview.toml")
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize interview.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Backend URL, with environment variables overriding the file.
    pub fn base_url(&self) -> String {
        base_url_from_env().unwrap_or_else(|| self.backend.base_url.clone())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            initial_delay: Duration::from_millis(self.polling.initial_delay_ms),
            interval: Duration::from_millis(self.polling.interval_ms),
            max_attempts: self.polling.max_attempts,
        }
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        let url = self.backend.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            warnings.push(format!(
                "backend.base_url '{}' should start with http:// or https://",
                self.backend.base_url
            ));
        }

        if self.backend.request_timeout_secs == 0 {
            warnings.push("backend.request_timeout_secs is 0: every request will time out".into());
        }

        if self.polling.max_attempts == 0 {
            warnings.push(
                "polling.max_attempts is 0: no question will ever be fetched".to_string(),
            );
        }

        if self.polling.interval_ms == 0 {
            warnings.push(
                "polling.interval_ms is 0: the backend will be polled without pause".to_string(),
            );
        }

        if let Some(role) = &self.candidate.role
            && role.trim().is_empty()
        {
            warnings.push("candidate.role is set but empty".to_string());
        }

        warnings
    }
}

/// Backend URL from `INTERVIEW_BASE_URL`, else `API_BASE_URL` + `/api/interview`.
pub fn base_url_from_env() -> Option<String> {
    let read = |key: &str| {
        std::env::var(key)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };
    read(ENV_BASE_URL).or_else(|| {
        read(ENV_API_HOST).map(|host| format!("{}{}", host.trim_end_matches('/'), API_PATH))
    })
}

/// Locate the config file: explicit path, then `./interview.toml`, then
/// `<config_dir>/interview-orchestrator/interview.toml`.
pub fn resolve_config_path(explicit: Option<&Path>, cwd: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = cwd.join(CONFIG_FILE_NAME);
    if local.exists() {
        return Some(local);
    }
    user_config_path().filter(|p| p.exists())
}

/// `<config_dir>/interview-orchestrator/interview.toml`, if the platform has one.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Resolved configuration: file, environment and CLI merged.
#[derive(Debug, Clone, Default)]
pub struct InterviewConfig {
    /// File the settings came from, if any
    pub path: Option<PathBuf>,
    pub toml: InterviewToml,
    pub verbose: bool,
    pub cli_base_url: Option<String>,
    pub cli_role: Option<String>,
    pub cli_name: Option<String>,
    pub cli_log_format: Option<LogFormat>,
}

impl InterviewConfig {
    /// Load the file layer. An explicit path must exist; otherwise a missing
    /// file means defaults.
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        let path = resolve_config_path(explicit, cwd);
        let toml = match &path {
            Some(p) if explicit.is_some() && !p.exists() => {
                anyhow::bail!("Config file not found: {}", p.display())
            }
            Some(p) => InterviewToml::load(p)?,
            None => InterviewToml::default(),
        };

        Ok(Self {
            path,
            toml,
            ..Default::default()
        })
    }

    /// Apply CLI overrides.
    pub fn with_cli_args(
        mut self,
        verbose: bool,
        base_url: Option<String>,
        log_format: Option<LogFormat>,
    ) -> Self {
        self.verbose = verbose;
        self.cli_base_url = base_url;
        self.cli_log_format = log_format;
        self
    }

    pub fn with_candidate(mut self, role: Option<String>, name: Option<String>) -> Self {
        self.cli_role = role;
        self.cli_name = name;
        self
    }

    /// Backend URL (CLI → env → file → default).
    pub fn base_url(&self) -> String {
        self.cli_base_url
            .clone()
            .unwrap_or_else(|| self.toml.base_url())
    }

    /// Role title (CLI → file).
    pub fn role(&self) -> Option<String> {
        self.cli_role
            .clone()
            .or_else(|| self.toml.candidate.role.clone())
            .filter(|r| !r.trim().is_empty())
    }

    /// Candidate name (CLI → file).
    pub fn candidate_name(&self) -> Option<String> {
        self.cli_name
            .clone()
            .or_else(|| self.toml.candidate.name.clone())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.toml.retry_policy()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.toml.backend.request_timeout_secs)
    }

    pub fn logging_options(&self) -> LoggingOptions {
        LoggingOptions {
            verbose: self.verbose,
            format: self.cli_log_format.unwrap_or(self.toml.logging.format),
            file: self.toml.logging.file.clone(),
        }
    }

    /// Start request for `role`, carrying the configured candidate name.
    pub fn start_request(&self, role: impl Into<String>) -> StartRequest {
        StartRequest::new(role).with_candidate_name(self.candidate_name())
    }

    /// Validate configuration and return warnings.
    pub fn validate(&self) -> Vec<String> {
        self.toml.validate()
    }
}

//! # Application State
//!
//! Configuration is read once at startup into [`AppConfig`]. [`AppState`]
//! owns the submission pipeline (and through it the store handle and reveal
//! policy) plus the metrics registry. Handlers receive it via `State`.

use std::str::FromStr;
use std::sync::Arc;

use benchseal_protocol::{RevealPolicy, SubmissionPipeline, DEFAULT_MAX_BATCH_ENTRIES};
use benchseal_registry::{MemorySubmissionStore, SubmissionStore};
use thiserror::Error;

use crate::auth::SecretToken;
use crate::middleware::metrics::ApiMetrics;

/// Invalid configuration value.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{name} is not valid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Log output format for the server binary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("expected text or json, got {other:?}")),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Absent means auth is disabled.
    pub auth_token: Option<SecretToken>,
    /// Absent means the in-memory store.
    pub database_url: Option<String>,
    pub reveal_policy: RevealPolicy,
    pub max_batch_entries: usize,
    pub metrics_enabled: bool,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_token: None,
            database_url: None,
            reveal_policy: RevealPolicy::default(),
            max_batch_entries: DEFAULT_MAX_BATCH_ENTRIES,
            metrics_enabled: true,
            log_format: LogFormat::Text,
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, applying defaults for unset
    /// variables. Empty `AUTH_TOKEN` and `DATABASE_URL` count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let port = parse_var(&lookup, "PORT")?.unwrap_or(defaults.port);
        let reveal_policy = parse_var(&lookup, "BENCHSEAL_REVEAL_OVERRIDE_ROLES")?
            .unwrap_or(defaults.reveal_policy);
        let max_batch_entries = parse_var::<usize>(&lookup, "BENCHSEAL_MAX_BATCH_ENTRIES")?
            .unwrap_or(defaults.max_batch_entries);
        if max_batch_entries == 0 {
            return Err(ConfigError::Invalid {
                name: "BENCHSEAL_MAX_BATCH_ENTRIES",
                reason: "must be at least 1".into(),
            });
        }
        let metrics_enabled = lookup("BENCHSEAL_METRICS_ENABLED")
            .map(|v| v.to_lowercase() != "false")
            .unwrap_or(defaults.metrics_enabled);
        let log_format = parse_var(&lookup, "BENCHSEAL_LOG_FORMAT")?.unwrap_or_default();

        Ok(Self {
            port,
            auth_token: non_empty("AUTH_TOKEN").map(SecretToken::new),
            database_url: non_empty("DATABASE_URL"),
            reveal_policy,
            max_batch_entries,
            metrics_enabled,
            log_format,
        })
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(name)
        .map(|raw| {
            raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                name,
                reason: e.to_string(),
            })
        })
        .transpose()
}

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pipeline: SubmissionPipeline,
    pub metrics: ApiMetrics,
}

impl AppState {
    /// Build state over `store` using the policy and limits in `config`.
    pub fn new(config: AppConfig, store: Arc<dyn SubmissionStore>) -> Self {
        let pipeline = SubmissionPipeline::new(store, config.reveal_policy.clone())
            .with_max_entries(config.max_batch_entries);
        Self {
            config: Arc::new(config),
            pipeline,
            metrics: ApiMetrics::new(),
        }
    }

    /// State backed by a fresh in-memory store.
    pub fn in_memory(config: AppConfig) -> Self {
        Self::new(config, Arc::new(MemorySubmissionStore::new()))
    }
}

use std::path::Path;

use anyhow::Context;
use tracing::{info, warn};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://tracker.db";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const HONEYCOMB_ENDPOINT: &str = "https://api.honeycomb.io:443";

/// What happened while reading env files and config. Nothing is logged while
/// loading because the subscriber is not installed yet; call [`EnvReport::log`]
/// once tracing is up.
#[derive(Debug, Default, PartialEq)]
pub struct EnvReport {
    pub loaded: Vec<String>,
    pub skipped: Vec<String>,
    pub warnings: Vec<String>,
}

impl EnvReport {
    pub fn log(&self) {
        for path in &self.skipped {
            warn!("Environment file {} not found, skipping", path);
        }
        for path in &self.loaded {
            info!("Loaded environment from: {}", path);
        }
        for warning in &self.warnings {
            warn!("{}", warning);
        }
    }
}

pub fn load_environment() -> anyhow::Result<EnvReport> {
    let is_production = deployment_environment() == "production";

    let env_files = if is_production {
        ["config/common.env", "config/prod.env", ".secrets.env"]
    } else {
        ["config/common.env", "config/dev.env", ".secrets.env"]
    };

    load_env_files(&env_files)
}

fn load_env_files<P: AsRef<Path>>(paths: &[P]) -> anyhow::Result<EnvReport> {
    let mut report = EnvReport::default();

    for path in paths {
        let path = path.as_ref();
        let display = path.display().to_string();

        if !path.exists() {
            report.skipped.push(display);
            continue;
        }

        dotenvy::from_filename_override(path)
            .with_context(|| format!("Failed to load environment file {}", display))?;
        report.loaded.push(display);
    }

    Ok(report)
}

fn deployment_environment() -> String {
    dotenvy::var("ROCKET_PROFILE").unwrap_or("development".to_string())
}

/// Settings read once at startup, after the env files are loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub log_filter: String,
    pub otlp_endpoint: Option<String>,
    pub honeycomb_api_key: Option<String>,
    pub deployment_environment: String,
}

impl AppConfig {
    /// Problems that fall back to a default are pushed onto `warnings`.
    pub fn from_env(warnings: &mut Vec<String>) -> Self {
        let honeycomb_api_key = non_empty_var("HONEYCOMB_API_KEY");
        let otlp_endpoint = non_empty_var("OTEL_EXPORTER_OTLP_ENDPOINT").or_else(|| {
            honeycomb_api_key
                .as_ref()
                .map(|_| HONEYCOMB_ENDPOINT.to_string())
        });

        let max_connections = match non_empty_var("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    warnings.push(format!(
                        "Invalid DATABASE_MAX_CONNECTIONS {:?}, using default {}",
                        raw, DEFAULT_MAX_CONNECTIONS
                    ));
                    DEFAULT_MAX_CONNECTIONS
                }
            },
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Self {
            database_url: non_empty_var("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            max_connections,
            log_filter: non_empty_var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            otlp_endpoint,
            honeycomb_api_key,
            deployment_environment: deployment_environment(),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    dotenvy::var(key).ok().filter(|value| !value.trim().is_empty())
}

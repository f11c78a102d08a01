use crate::error::ConfigError;
use crate::filter::ProjectFilter;
use crate::languages::ExclusionMode;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://rest.api.transifex.com";
pub const DEFAULT_ORGANIZATION: &str = "hisp-uio";
pub const DEFAULT_EXCLUDED_LANGUAGE: &str = "uz";

#[derive(Debug, Clone)]
pub struct Config {
    // Transifex
    pub api_token: String,
    pub organization: String,
    pub api_url: String,
    pub http_timeout: Duration,

    // Project selection
    pub project_filter: ProjectFilter,

    // Language exclusion
    pub excluded_language: String,
    pub exclusion_mode: ExclusionMode,

    // Report the plan without adding languages
    pub dry_run: bool,
}

impl Config {
    /// Config with defaults for everything except the credential
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            organization: DEFAULT_ORGANIZATION.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            http_timeout: Duration::from_secs(30),
            project_filter: ProjectFilter::default(),
            excluded_language: DEFAULT_EXCLUDED_LANGUAGE.to_string(),
            exclusion_mode: ExclusionMode::default(),
            dry_run: false,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let api_token = std::env::var("TX_TOKEN")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("TX_TOKEN"))?;

        let mut config = Self::new(api_token);

        if let Some(org) = non_empty_var("TX_ORGANIZATION") {
            config.organization = org;
        }
        if let Some(url) = non_empty_var("TX_API_URL") {
            config.api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(prefixes) = non_empty_var("TX_PROJECT_PREFIXES") {
            let filter = ProjectFilter::parse(&prefixes);
            if filter.prefixes().is_empty() {
                return Err(ConfigError::Invalid {
                    var: "TX_PROJECT_PREFIXES",
                    value: prefixes,
                    reason: "no project prefixes listed".to_string(),
                });
            }
            config.project_filter = filter;
        }
        if let Some(code) = non_empty_var("TX_EXCLUDED_LANGUAGE") {
            config.excluded_language = code;
        }
        if let Some(mode) = non_empty_var("TX_EXCLUSION_MODE") {
            config.exclusion_mode = mode.parse().map_err(|reason| ConfigError::Invalid {
                var: "TX_EXCLUSION_MODE",
                value: mode.clone(),
                reason,
            })?;
        }
        if let Some(flag) = non_empty_var("TX_DRY_RUN") {
            config.dry_run = parse_bool("TX_DRY_RUN", &flag)?;
        }
        if let Some(secs) = non_empty_var("TX_HTTP_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::Invalid {
                    var: "TX_HTTP_TIMEOUT_SECS",
                    value: secs.clone(),
                    reason: e.to_string(),
                }
            })?;
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    var: "TX_HTTP_TIMEOUT_SECS",
                    value: "0".to_string(),
                    reason: "timeout must be at least one second".to_string(),
                });
            }
            config.http_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            var,
            value: value.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}

use thiserror::Error;

/// Configuration problems detected at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),

    #[error("invalid value for {var} ({value:?}): {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Failures talking to the Transifex API
#[derive(Debug, Error)]
pub enum TransifexError {
    #[error("Transifex rejected credentials ({status}): {body}")]
    Auth { status: u16, body: String },

    #[error("Transifex resource not found: {url}")]
    NotFound { url: String },

    #[error("Transifex rejected request ({status}): {body}")]
    Validation { status: u16, body: String },

    #[error("Transifex rate limit hit: {body}")]
    RateLimited { body: String },

    #[error("Transifex server error ({status}): {body}")]
    Server { status: u16, body: String },

    #[error("network error talking to Transifex: {0}")]
    Network(#[from] reqwest::Error),

    #[error("failed to parse Transifex response from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl TransifexError {
    /// Classify a non-success HTTP status
    pub fn from_status(status: u16, url: &str, body: String) -> Self {
        match status {
            401 | 403 => Self::Auth { status, body },
            404 => Self::NotFound {
                url: url.to_string(),
            },
            429 => Self::RateLimited { body },
            500..=599 => Self::Server { status, body },
            _ => Self::Validation { status, body },
        }
    }

    /// Transport failures, rate limiting and 5xx are worth another attempt.
    /// Other 4xx responses will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::RateLimited { .. } | Self::Server { .. }
        )
    }
}

//! Error types shared across the crate.

use std::path::PathBuf;

/// Failure of the single classification call.
///
/// The classifier maps every variant except [`ProviderError::NotConfigured`]
/// to the `api error` sentinel; `NotConfigured` maps to `disabled`.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// No credentials were configured; no I/O was attempted.
    #[error("provider not configured: {reason}")]
    NotConfigured { reason: String },

    /// Credentials rejected (401/403).
    #[error("unauthorized ({provider}): {message}")]
    Unauthorized { provider: String, message: String },

    /// Quota or rate limit hit (429).
    #[error("rate limited ({provider}, status {status})")]
    RateLimited { provider: String, status: u16 },

    /// Any other non-success status.
    #[error("{provider} API error (status {status}): {message}")]
    Server {
        provider: String,
        status: u16,
        message: String,
    },

    /// Transport failure (DNS, TLS, connection reset, timeout).
    #[error("network error: {message}")]
    Network { message: String },

    /// A success status whose body could not be understood.
    #[error("invalid response from {provider}: {message}")]
    InvalidResponse { provider: String, message: String },

    /// Outbound call refused by the network policy.
    #[error("outbound network blocked by policy (target={target}): {reason}")]
    Blocked { target: String, reason: String },
}

impl ProviderError {
    /// Map a non-success HTTP status to the matching variant.
    pub fn from_status(provider: &str, status: u16, body: impl Into<String>) -> Self {
        let message = body.into();
        match status {
            401 | 403 => Self::Unauthorized {
                provider: provider.to_string(),
                message,
            },
            429 => Self::RateLimited {
                provider: provider.to_string(),
                status,
            },
            _ => Self::Server {
                provider: provider.to_string(),
                status,
                message,
            },
        }
    }

    /// True when the stage should be reported as disabled rather than failed.
    pub fn is_not_configured(&self) -> bool {
        matches!(self, Self::NotConfigured { .. })
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            message: err.to_string(),
        }
    }
}

/// Result type for provider calls.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Configuration loading and validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid config value for '{field}': {message}")]
    Invalid { field: String, message: String },
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Webhook delivery errors.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("webhook returned status {status}: {body}")]
    Http { status: u16, body: String },

    #[error("webhook network error: {message}")]
    Network { message: String },
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            message: err.to_string(),
        }
    }
}

/// Errors that can occur while talking to the Cricbuzz API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Rate limited by Cricbuzz API")]
    RateLimit,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid API key: {0}")]
    InvalidCredentials(String),

    #[error("Server error (HTTP {status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse classification of an [`ApiError`] for user-facing reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Connection,
    Authorization,
    RateLimit,
    NotFound,
    Server,
    Decode,
    Config,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connection => "connection",
            Self::Authorization => "authorization",
            Self::RateLimit => "rate limit",
            Self::NotFound => "not found",
            Self::Server => "server",
            Self::Decode => "decode",
            Self::Config => "config",
        }
    }

    /// A short hint for resolving errors of this category.
    pub fn hint(&self) -> &'static str {
        match self {
            Self::Connection => "check your network connection",
            Self::Authorization => "check RAPIDAPI_KEY or the [api] section of the config file",
            Self::RateLimit => "wait a moment before retrying",
            Self::NotFound => "the endpoint or resource does not exist",
            Self::Server => "the API is having trouble; try again later",
            Self::Decode => "the API returned an unexpected payload",
            Self::Config => "run `cricstat config show` to inspect settings",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ApiError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Http(e) if e.is_decode() => ErrorCategory::Decode,
            Self::Http(e) => match e.status() {
                Some(s) if s == reqwest::StatusCode::UNAUTHORIZED || s == reqwest::StatusCode::FORBIDDEN => {
                    ErrorCategory::Authorization
                }
                Some(s) if s == reqwest::StatusCode::NOT_FOUND => ErrorCategory::NotFound,
                Some(s) if s.is_server_error() => ErrorCategory::Server,
                _ => ErrorCategory::Connection,
            },
            Self::RateLimit => ErrorCategory::RateLimit,
            Self::NotFound(_) => ErrorCategory::NotFound,
            Self::InvalidCredentials(_) => ErrorCategory::Authorization,
            Self::ServerError { .. } => ErrorCategory::Server,
            Self::Decode(_) | Self::Json(_) => ErrorCategory::Decode,
            Self::Io(_) | Self::Config(_) => ErrorCategory::Config,
        }
    }
}

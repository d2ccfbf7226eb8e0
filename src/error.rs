use std::fmt;

pub type ReporterResult<T> = Result<T, ReporterError>;

/// Code used when the provider reports a failure without one.
pub const UNKNOWN_ERROR_CODE: &str = "-1";

#[derive(Debug, thiserror::Error)]
pub enum ReporterError {
    /// A credential the request needs is not configured. Raised before any
    /// request is sent.
    #[error("Reporter configuration is missing `{0}`")]
    Configuration(&'static str),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("A password is required to retrieve or generate an access token")]
    Credential,
    #[error("No valid access token is available and generating a new one is disabled")]
    TokenUnavailable,
    #[error("Response is missing the `{0}` header")]
    MissingHeader(&'static str),
    #[error("Generated token response did not contain an AccessToken")]
    MissingAccessToken,
    #[error("HTTP error: {0}")]
    Http(http_client::Error),
    #[error("Could not decompress agzip response body: {0}")]
    Decompression(#[source] std::io::Error),
    #[error(transparent)]
    UrlParse(#[from] url::ParseError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    EnvVar(#[from] std::env::VarError),
}

// http_client::Error is not a std::error::Error, so it can't go through #[from]
impl From<http_client::Error> for ReporterError {
    fn from(value: http_client::Error) -> Self {
        Self::Http(value)
    }
}

impl ReporterError {
    /// The provider error behind this failure, if the service reported one.
    #[must_use]
    pub fn as_provider(&self) -> Option<&ProviderError> {
        match self {
            Self::Provider(e) => Some(e),
            _ => None,
        }
    }
}

/// Failure reported by the Reporter service itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    pub code: String,
    pub message: String,
}

impl ProviderError {
    #[must_use]
    pub fn new(message: impl Into<String>, code: Option<impl ToString>) -> Self {
        Self {
            code: code.map_or_else(|| UNKNOWN_ERROR_CODE.to_string(), |c| c.to_string()),
            message: message.into(),
        }
    }

    /// Provider error carrying only a message, coded `-1`.
    #[must_use]
    pub fn from_text(message: impl Into<String>) -> Self {
        Self::new(message, None::<&str>)
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reporter error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for ProviderError {}

//! # Reporter client
//!
//! [`Reporter`] is the entry point of the crate. It owns the configuration and
//! the access token currently in use, and hands out the [`Sales`] and
//! [`Finance`] facades that issue the actual report requests.
//!
//! The HTTP client is not owned: every operation takes any
//! [`http_client::HttpClient`] implementation, so the caller decides on the
//! runtime, TLS stack, timeouts and cancellation.
//!
//! ## Credentials
//!
//! A reporter needs either an access token or the account password:
//!
//! - with an access token, report requests use it directly;
//! - with a password only, the first report request asks the provider for the
//!   current token (see [`Reporter::retrieve_access_token`]) and keeps it.
//!
//! ## Concurrency
//!
//! The held token is only locked while it is read or replaced, never while a
//! request is in flight. Two concurrent calls to
//! [`Reporter::retrieve_access_token`] can therefore both reach the provider,
//! and whichever finishes last decides the stored token. Callers that need a
//! single generation must serialize those calls themselves.
use async_lock::RwLock;

use super::{token::AccessToken, ReporterConfig};
use crate::{
    functions::{finance::Finance, sales::Sales},
    Service,
};

pub struct Reporter {
    pub(crate) config: ReporterConfig,
    pub(crate) token: RwLock<Option<AccessToken>>,
}

impl Reporter {
    /// Creates a reporter from its configuration.
    ///
    /// A configured access token is held from the start, with no known
    /// expiration.
    ///
    /// ```
    /// use apple_reporter::{Reporter, ReporterConfig};
    ///
    /// let reporter = Reporter::new(ReporterConfig::new("me@example.com").with_password("secret"));
    /// assert_eq!(reporter.version(), "1.0");
    /// assert_eq!(reporter.sales().version(), "1.0");
    /// ```
    #[must_use]
    pub fn new(config: ReporterConfig) -> Self {
        let token = config.access_token.clone().map(AccessToken::new);
        Self {
            config,
            token: RwLock::new(token),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ReporterConfig {
        &self.config
    }

    /// Protocol version sent with every request.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.config.version
    }

    #[must_use]
    pub fn sales(&self) -> Sales<'_> {
        Sales::new(self)
    }

    #[must_use]
    pub fn finance(&self) -> Finance<'_> {
        Finance::new(self)
    }

    /// The token currently held, whether or not it is still valid.
    pub async fn access_token(&self) -> Option<AccessToken> {
        self.token.read().await.clone()
    }

    /// Replaces the held token.
    pub async fn set_access_token(&self, token: AccessToken) {
        *self.token.write().await = Some(token);
    }

    pub(crate) fn service_url(&self, service: Service) -> &str {
        match service {
            Service::Sales => &self.config.sales_url,
            Service::Finance => &self.config.finance_url,
        }
    }
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use http_client::HttpClient;
use serde::{Deserialize, Serialize};

use super::{send, Credential, Reporter, ServiceRequest, TokenOptionsOverride};
use crate::{
    error::{ReporterError, ReporterResult},
    reports::{
        param::{query_input, ReportParams},
        sales,
    },
    response::{self, ReportOutput},
    xml, ResponseMode,
};

/// Header carrying the id of a pending token generation.
pub(crate) const SERVICE_REQUEST_ID: &str = "service_request_id";

// Token fields are read out of the XML tree, so token calls always ask for XML.
const TOKEN_MODE: ResponseMode = ResponseMode::RobotXml;

/// An access token and, when the provider told us, when it stops working.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// A token with no known expiration, treated as valid.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            expires_at: None,
        }
    }

    pub fn with_expiration(token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_at: Some(expires_at),
        }
    }

    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(true, |expires_at| now < expires_at)
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }
}

/// Result of [`Reporter::retrieve_access_token`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievedToken {
    pub token: String,
    /// `true` when the token was generated by this call.
    pub is_new: bool,
}

impl Reporter {
    /// Returns a usable access token, asking the provider for one if needed.
    ///
    /// `overrides` is merged onto the configured
    /// [`TokenOptions`](super::TokenOptions) for this call only.
    ///
    /// 1. A held, unexpired token is returned as is unless `force_retrieve`
    ///    is set.
    /// 2. Otherwise the password is used to view the provider's current token.
    /// 3. If the provider has none, or it expired, a new one is generated when
    ///    `generate_new_if_needed` is set.
    ///
    /// Any token obtained from the provider replaces the held one.
    ///
    /// # Errors
    ///
    /// - [`ReporterError::Credential`] if the provider has to be asked and no
    ///   password is configured. No request is made.
    /// - [`ReporterError::TokenUnavailable`] if there is no valid token and
    ///   generation is disabled.
    /// - [`ReporterError::Provider`] and transport errors from either request.
    pub async fn retrieve_access_token<Client: HttpClient>(
        &self,
        client: &Client,
        overrides: Option<&TokenOptionsOverride>,
    ) -> ReporterResult<RetrievedToken> {
        let options = match overrides {
            Some(overrides) => self.config.token_options.merged(overrides),
            None => self.config.token_options,
        };

        if !options.force_retrieve {
            if let Some(held) = self.valid_token().await {
                return Ok(RetrievedToken {
                    token: held.token,
                    is_new: false,
                });
            }
        }

        if self.config.password.is_none() {
            return Err(ReporterError::Credential);
        }

        if let Some(existing) = self.view_token(client).await? {
            log::info!("Retrieved existing Reporter access token for {}", self.config.userid);
            let token = existing.token.clone();
            *self.token.write().await = Some(existing);
            return Ok(RetrievedToken {
                token,
                is_new: false,
            });
        }

        if !options.generate_new_if_needed {
            return Err(ReporterError::TokenUnavailable);
        }

        let generated = self.generate_token(client).await?;
        log::info!("Generated new Reporter access token for {}", self.config.userid);
        let token = generated.token.clone();
        *self.token.write().await = Some(generated);
        Ok(RetrievedToken {
            token,
            is_new: true,
        })
    }

    /// The held token, if it hasn't expired.
    pub(crate) async fn valid_token(&self) -> Option<AccessToken> {
        self.token
            .read()
            .await
            .as_ref()
            .filter(|token| token.is_valid())
            .cloned()
    }

    /// Asks the provider for the account's current token. `None` when there is
    /// none or it has expired.
    async fn view_token<Client: HttpClient>(
        &self,
        client: &Client,
    ) -> ReporterResult<Option<AccessToken>> {
        let input = query_input(&sales::VIEW_TOKEN, &ReportParams::new());
        let mut response = send(
            client,
            &self.config,
            &self.token_request(&input, None),
            Credential::Password,
        )
        .await?;
        let output = response::interpret(TOKEN_MODE, &mut response).await?;

        let ReportOutput::Xml(tree) = output else {
            log::warn!("viewToken returned a non-XML body, treating the token as absent");
            return Ok(None);
        };

        if let Some(message) = xml::find_text(&tree, "Message") {
            log::info!("No existing Reporter access token: {message}");
            return Ok(None);
        }

        let Some(token) = xml::find_text(&tree, "AccessToken") else {
            return Ok(None);
        };

        match xml::find_text(&tree, "ExpirationDate").and_then(parse_expiration) {
            Some(expires_at) if Utc::now() < expires_at => {
                Ok(Some(AccessToken::with_expiration(token, expires_at)))
            }
            Some(expires_at) => {
                log::info!("Existing Reporter access token expired at {expires_at}");
                Ok(None)
            }
            None => {
                log::warn!("Existing Reporter access token has no readable expiration date");
                Ok(None)
            }
        }
    }

    /// Two-step generation: the first request only yields a request id in
    /// its headers, the second confirms it and returns the token.
    async fn generate_token<Client: HttpClient>(
        &self,
        client: &Client,
    ) -> ReporterResult<AccessToken> {
        let input = query_input(&sales::GENERATE_TOKEN, &ReportParams::new());

        let mut pending = send(
            client,
            &self.config,
            &self.token_request(&input, None),
            Credential::Password,
        )
        .await?;

        let Some(request_id) = pending
            .header(SERVICE_REQUEST_ID)
            .map(|values| values.last().as_str().to_string())
        else {
            if !pending.status().is_success() {
                response::interpret(TOKEN_MODE, &mut pending).await?;
            }
            return Err(ReporterError::MissingHeader(SERVICE_REQUEST_ID));
        };
        log::debug!("Token generation pending with request id {request_id}");

        let query = [("isExistingToken", "Y"), ("requestId", request_id.as_str())];
        let mut confirmed = send(
            client,
            &self.config,
            &self.token_request(&input, Some(query.as_slice())),
            Credential::Password,
        )
        .await?;

        let output = response::interpret(TOKEN_MODE, &mut confirmed).await?;
        let tree = output.as_xml().ok_or(ReporterError::MissingAccessToken)?;
        let token = xml::find_text(tree, "AccessToken").ok_or(ReporterError::MissingAccessToken)?;

        Ok(AccessToken {
            token: token.to_string(),
            expires_at: xml::find_text(tree, "ExpirationDate").and_then(parse_expiration),
        })
    }

    fn token_request<'a>(
        &'a self,
        query_input: &'a str,
        query: Option<&'a [(&'a str, &'a str)]>,
    ) -> ServiceRequest<'a> {
        ServiceRequest {
            service_url: &self.config.sales_url,
            query,
            query_input,
            mode: TOKEN_MODE,
            account: self.config.account.as_deref(),
        }
    }
}

/// Reads the provider's expiration dates. Date-only values count from the
/// start of that day (UTC).
fn parse_expiration(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

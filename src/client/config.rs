use std::{fmt, path::Path};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{
    error::ReporterResult, ResponseMode, DEFAULT_BASE_URL, DEFAULT_FINANCE_URL,
    DEFAULT_SALES_URL, DEFAULT_VERSION,
};

/// Defaults used by [`Reporter::retrieve_access_token`](super::Reporter::retrieve_access_token).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenOptions {
    /// Ask the provider even when a usable token is already held.
    pub force_retrieve: bool,
    /// Generate a new token when the provider has no valid one.
    pub generate_new_if_needed: bool,
}

impl TokenOptions {
    /// Applies a per-call override; fields set on the override win.
    #[must_use]
    pub fn merged(self, overrides: &TokenOptionsOverride) -> Self {
        Self {
            force_retrieve: overrides.force_retrieve.unwrap_or(self.force_retrieve),
            generate_new_if_needed: overrides
                .generate_new_if_needed
                .unwrap_or(self.generate_new_if_needed),
        }
    }
}

/// Per-call override of [`TokenOptions`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenOptionsOverride {
    pub force_retrieve: Option<bool>,
    pub generate_new_if_needed: Option<bool>,
}

impl TokenOptionsOverride {
    #[must_use]
    pub fn force_retrieve(self, force_retrieve: bool) -> Self {
        Self {
            force_retrieve: Some(force_retrieve),
            ..self
        }
    }

    #[must_use]
    pub fn generate_new_if_needed(self, generate_new_if_needed: bool) -> Self {
        Self {
            generate_new_if_needed: Some(generate_new_if_needed),
            ..self
        }
    }
}

/// Per-request options for report operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Account to query instead of the configured one.
    pub account: Option<String>,
}

impl RequestOptions {
    #[must_use]
    pub fn with_account(account: impl Into<String>) -> Self {
        Self {
            account: Some(account.into()),
        }
    }
}

/// Configuration of a [`Reporter`](super::Reporter).
///
/// Deserializes from the same camelCase keys the provider documents
/// (`userid`, `accesstoken`, `baseUrl`, `tokenOptions`, ...), filling in the
/// production defaults for anything left out.
///
/// ```
/// use apple_reporter::{ReporterConfig, ResponseMode};
///
/// let config: ReporterConfig = serde_json::from_str(
///     r#"{ "userid": "me@example.com", "accesstoken": "abc", "mode": "Normal" }"#,
/// ).unwrap();
/// assert_eq!(config.mode, ResponseMode::Normal);
/// assert_eq!(config.sales_url, "/sales/v1");
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReporterConfig {
    pub userid: String,
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(
        default,
        rename = "accesstoken",
        alias = "accessToken",
        skip_serializing_if = "Option::is_none"
    )]
    pub access_token: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_sales_url")]
    pub sales_url: String,
    #[serde(default = "default_finance_url")]
    pub finance_url: String,
    #[serde(default)]
    pub mode: ResponseMode,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub token_options: TokenOptions,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_sales_url() -> String {
    DEFAULT_SALES_URL.to_string()
}

fn default_finance_url() -> String {
    DEFAULT_FINANCE_URL.to_string()
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string or number, got {other}"
        ))),
    }
}

impl ReporterConfig {
    /// Configuration with production defaults and no credentials.
    #[must_use]
    pub fn new(userid: impl Into<String>) -> Self {
        Self {
            userid: userid.into(),
            account: None,
            password: None,
            access_token: None,
            base_url: default_base_url(),
            sales_url: default_sales_url(),
            finance_url: default_finance_url(),
            mode: ResponseMode::default(),
            version: default_version(),
            token_options: TokenOptions::default(),
        }
    }

    /// Reads the configuration from environment variables.
    ///
    /// - `ITC_USERID` (required)
    /// - `ITC_PASSWORD`
    /// - `ITC_ACCESS_TOKEN`
    /// - `ITC_ACCOUNT`
    ///
    /// # Errors
    ///
    /// `EnvVar` if `ITC_USERID` is not set.
    pub fn from_env() -> ReporterResult<Self> {
        let userid = std::env::var("ITC_USERID")?;
        Ok(Self {
            password: std::env::var("ITC_PASSWORD").ok(),
            access_token: std::env::var("ITC_ACCESS_TOKEN").ok(),
            account: std::env::var("ITC_ACCOUNT").ok(),
            ..Self::new(userid)
        })
    }

    /// Loads a JSON configuration file.
    ///
    /// # Errors
    ///
    /// `Io` if the file can't be read, `Json` if it isn't a valid configuration.
    pub async fn from_json_file(path: impl AsRef<Path>) -> ReporterResult<Self> {
        let raw = async_fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&raw)?)
    }

    #[must_use]
    pub fn with_password(self, password: impl Into<String>) -> Self {
        Self {
            password: Some(password.into()),
            ..self
        }
    }

    #[must_use]
    pub fn with_access_token(self, access_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            ..self
        }
    }

    #[must_use]
    pub fn with_account(self, account: impl Into<String>) -> Self {
        Self {
            account: Some(account.into()),
            ..self
        }
    }

    #[must_use]
    pub fn with_base_url(self, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..self
        }
    }

    #[must_use]
    pub fn with_mode(self, mode: ResponseMode) -> Self {
        Self { mode, ..self }
    }

    #[must_use]
    pub fn with_version(self, version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..self
        }
    }

    #[must_use]
    pub fn with_token_options(self, token_options: TokenOptions) -> Self {
        Self {
            token_options,
            ..self
        }
    }
}

// Credentials stay out of logs.
impl fmt::Debug for ReporterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReporterConfig")
            .field("userid", &self.userid)
            .field("account", &self.account)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("sales_url", &self.sales_url)
            .field("finance_url", &self.finance_url)
            .field("mode", &self.mode)
            .field("version", &self.version)
            .field("token_options", &self.token_options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ReporterConfig::new("gy").with_access_token("itunesconnect-access-token");
        assert_eq!(config.base_url, "https://reportingitc-reporter.apple.com/reportservice");
        assert_eq!(config.finance_url, "/finance/v1");
        assert_eq!(config.mode, ResponseMode::RobotXml);
        assert_eq!(config.sales_url, "/sales/v1");
        assert_eq!(config.version, "1.0");
        assert!(!config.token_options.force_retrieve);
        assert!(!config.token_options.generate_new_if_needed);
    }

    #[test]
    fn deserializes_provider_keys() {
        let config: ReporterConfig = serde_json::from_str(
            r#"{
                "userid": "gy",
                "account": 654321,
                "password": "secret",
                "baseUrl": "http://localhost:8080/reportservice",
                "version": "2.2",
                "tokenOptions": { "generateNewIfNeeded": true }
            }"#,
        )
        .unwrap();
        assert_eq!(config.account.as_deref(), Some("654321"));
        assert_eq!(config.password.as_deref(), Some("secret"));
        assert_eq!(config.access_token, None);
        assert_eq!(config.base_url, "http://localhost:8080/reportservice");
        assert_eq!(config.finance_url, "/finance/v1");
        assert_eq!(config.version, "2.2");
        assert_eq!(
            config.token_options,
            TokenOptions {
                force_retrieve: false,
                generate_new_if_needed: true
            }
        );
    }

    #[test]
    fn override_wins_field_by_field() {
        let stored = TokenOptions {
            force_retrieve: false,
            generate_new_if_needed: true,
        };
        let merged = stored.merged(&TokenOptionsOverride::default().force_retrieve(true));
        assert!(merged.force_retrieve);
        assert!(merged.generate_new_if_needed);

        let merged = stored.merged(&TokenOptionsOverride::default().generate_new_if_needed(false));
        assert_eq!(merged, TokenOptions::default());
    }

    #[test]
    fn debug_redacts_credentials() {
        let config = ReporterConfig::new("gy").with_password("hunter2");
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }

    // The only test touching the ITC_* variables, so it can't race another one.
    #[test]
    fn reads_environment() {
        let vars = ["ITC_USERID", "ITC_PASSWORD", "ITC_ACCESS_TOKEN", "ITC_ACCOUNT"];

        for var in vars {
            std::env::remove_var(var);
        }
        assert!(matches!(
            ReporterConfig::from_env(),
            Err(crate::ReporterError::EnvVar(_))
        ));

        std::env::set_var("ITC_USERID", "gy");
        std::env::set_var("ITC_ACCESS_TOKEN", "abc");
        std::env::set_var("ITC_ACCOUNT", "123456");
        let config = ReporterConfig::from_env();
        for var in vars {
            std::env::remove_var(var);
        }

        let config = config.unwrap();
        assert_eq!(config.userid, "gy");
        assert_eq!(config.password, None);
        assert_eq!(config.access_token.as_deref(), Some("abc"));
        assert_eq!(config.account.as_deref(), Some("123456"));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[tokio::test]
    async fn loads_json_file() {
        let path = std::env::temp_dir().join(format!("apple-reporter-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "userid": "gy", "accessToken": "abc" }"#).unwrap();

        let config = ReporterConfig::from_json_file(&path).await.unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.userid, "gy");
        assert_eq!(config.access_token.as_deref(), Some("abc"));
    }
}

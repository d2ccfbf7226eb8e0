use http_client::{http_types::Method, HttpClient, Request, Response};
use serde::Serialize;
use url::Url;

use crate::{
    error::{ReporterError, ReporterResult},
    ResponseMode,
};

mod config;
mod context;
mod token;

pub use config::{ReporterConfig, RequestOptions, TokenOptions, TokenOptionsOverride};
pub use context::Reporter;
pub use token::{AccessToken, RetrievedToken};

pub(crate) const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Which credential a request is authenticated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Credential<'a> {
    /// The configured account password.
    Password,
    /// An access token, when one is held.
    AccessToken(Option<&'a str>),
}

/// One call to a Reporter service, before credentials are attached.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ServiceRequest<'a> {
    pub service_url: &'a str,
    pub query: Option<&'a [(&'a str, &'a str)]>,
    pub query_input: &'a str,
    pub mode: ResponseMode,
    pub account: Option<&'a str>,
}

#[derive(Serialize)]
struct JsonRequest<'a> {
    userid: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    account: Option<&'a str>,
    version: &'a str,
    mode: ResponseMode,
    #[serde(rename = "queryInput")]
    query_input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    accesstoken: Option<&'a str>,
}

/// Builds the `jsonRequest=` form body for `request`.
///
/// Fails with [`ReporterError::Configuration`] when the credential asked for
/// isn't available.
pub(crate) fn build_body(
    config: &ReporterConfig,
    request: &ServiceRequest<'_>,
    credential: Credential<'_>,
) -> ReporterResult<String> {
    let (password, accesstoken) = match credential {
        Credential::Password => (
            Some(
                config
                    .password
                    .as_deref()
                    .ok_or(ReporterError::Configuration("password"))?,
            ),
            None,
        ),
        Credential::AccessToken(token) => (
            None,
            Some(token.ok_or(ReporterError::Configuration("accesstoken"))?),
        ),
    };

    let data = JsonRequest {
        userid: &config.userid,
        account: request.account,
        version: &config.version,
        mode: request.mode,
        query_input: format!("[p=Reporter.properties, {}]", request.query_input),
        password,
        accesstoken,
    };

    Ok(format!("jsonRequest={}", serde_json::to_string(&data)?))
}

pub(crate) fn build_url(
    config: &ReporterConfig,
    service_url: &str,
    query: Option<&[(&str, &str)]>,
) -> ReporterResult<Url> {
    let mut url = Url::parse(&format!("{}{}", config.base_url, service_url))?;
    if let Some(q) = query {
        url.query_pairs_mut().extend_pairs(q);
    }
    Ok(url)
}

pub(crate) fn build_request(
    config: &ReporterConfig,
    request: &ServiceRequest<'_>,
    credential: Credential<'_>,
) -> ReporterResult<Request> {
    let body = build_body(config, request, credential)?;
    let url = build_url(config, request.service_url, request.query)?;

    log::debug!(
        "Built Reporter request: {} {} with {} credential",
        url,
        request.query_input,
        match credential {
            Credential::Password => "password",
            Credential::AccessToken(_) => "access token",
        }
    );

    let mut http_request = Request::new(Method::Post, url);
    // Set before the body so the body's text/plain mime doesn't take over
    http_request.insert_header("Content-Type", FORM_CONTENT_TYPE);
    http_request.set_body(body);
    Ok(http_request)
}

/// Issues one request. The response is returned as is; its status is not
/// looked at here.
pub(crate) async fn send<Client: HttpClient>(
    client: &Client,
    config: &ReporterConfig,
    request: &ServiceRequest<'_>,
    credential: Credential<'_>,
) -> ReporterResult<Response> {
    let http_request = build_request(config, request, credential)?;
    Ok(client.send(http_request).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockResponse, MockTransport};

    fn sales_request(query_input: &str) -> ServiceRequest<'_> {
        ServiceRequest {
            service_url: "/sales/v1",
            query: None,
            query_input,
            mode: ResponseMode::RobotXml,
            account: None,
        }
    }

    #[test]
    fn body_with_access_token() {
        let config = ReporterConfig::new("gy");
        let body = build_body(
            &config,
            &sales_request("Sales.getReport, 123456,Sales,Summary,Weekly,20150208"),
            Credential::AccessToken(Some("itunesconnect-access-token")),
        )
        .unwrap();
        assert_eq!(
            body,
            r#"jsonRequest={"userid":"gy","version":"1.0","mode":"Robot.XML","queryInput":"[p=Reporter.properties, Sales.getReport, 123456,Sales,Summary,Weekly,20150208]","accesstoken":"itunesconnect-access-token"}"#
        );
    }

    #[test]
    fn body_with_password_and_account() {
        let config = ReporterConfig::new("gy")
            .with_password("itunesconnect-account-password")
            .with_mode(ResponseMode::Normal);
        let request = ServiceRequest {
            account: Some("654321"),
            mode: config.mode,
            ..sales_request("Sales.viewToken")
        };
        let body = build_body(&config, &request, Credential::Password).unwrap();
        assert_eq!(
            body,
            r#"jsonRequest={"userid":"gy","account":"654321","version":"1.0","mode":"Normal","queryInput":"[p=Reporter.properties, Sales.viewToken]","password":"itunesconnect-account-password"}"#
        );
    }

    #[test]
    fn missing_credential_is_a_configuration_error() {
        let config = ReporterConfig::new("gy").with_access_token("abc");
        assert!(matches!(
            build_body(&config, &sales_request("Sales.viewToken"), Credential::Password),
            Err(ReporterError::Configuration("password"))
        ));
        assert!(matches!(
            build_body(&config, &sales_request("Sales.getVendors"), Credential::AccessToken(None)),
            Err(ReporterError::Configuration("accesstoken"))
        ));
    }

    #[test]
    fn url_with_query() {
        let config = ReporterConfig::new("gy");
        let url = build_url(
            &config,
            "/sales/v1",
            Some(&[("isExistingToken", "Y"), ("requestId", "abc-123")][..]),
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://reportingitc-reporter.apple.com/reportservice/sales/v1?isExistingToken=Y&requestId=abc-123"
        );
    }

    #[tokio::test]
    async fn send_posts_form() {
        let transport = MockTransport::new().with_response(MockResponse::ok("hello"));
        let config = ReporterConfig::new("gy").with_access_token("abc");

        let response = send(
            &transport,
            &config,
            &sales_request("Sales.getVendors"),
            Credential::AccessToken(config.access_token.as_deref()),
        )
        .await
        .unwrap();
        assert!(response.status().is_success());

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(
            requests[0].url,
            "https://reportingitc-reporter.apple.com/reportservice/sales/v1"
        );
        assert_eq!(requests[0].content_type.as_deref(), Some(FORM_CONTENT_TYPE));
        assert!(requests[0].body.starts_with("jsonRequest={\"userid\":\"gy\""));
    }

    #[tokio::test]
    async fn send_without_password_makes_no_request() {
        let transport = MockTransport::new();
        let config = ReporterConfig::new("gy");

        let result = send(
            &transport,
            &config,
            &sales_request("Sales.viewToken"),
            Credential::Password,
        )
        .await;
        assert!(matches!(result, Err(ReporterError::Configuration(_))));
        assert!(transport.requests().is_empty());
    }
}

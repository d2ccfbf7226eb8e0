use http_client::HttpClient;

use crate::{
    client::{send, Credential, Reporter, RequestOptions, ServiceRequest, TokenOptionsOverride},
    error::ReporterResult,
    reports::{
        param::{query_input, ReportParams},
        Operation,
    },
    response::{self, ReportOutput},
};

pub mod finance;
pub mod sales;

/// Sends `operation` with `params` to its service and interprets the answer.
///
/// The request is authenticated with the held access token. Without one, the
/// provider's current token is looked up first (this needs the password).
pub(crate) async fn reporter_request<Client: HttpClient>(
    reporter: &Reporter,
    client: &Client,
    operation: &Operation,
    params: &ReportParams,
    options: &RequestOptions,
) -> ReporterResult<ReportOutput> {
    // A held token is enough here even when the configured defaults force a refresh
    let token = reporter
        .retrieve_access_token(
            client,
            Some(&TokenOptionsOverride::default().force_retrieve(false)),
        )
        .await?
        .token;

    let config = reporter.config();
    let input = query_input(operation, params);
    let request = ServiceRequest {
        service_url: reporter.service_url(operation.service),
        query: None,
        query_input: &input,
        mode: config.mode,
        account: options.account.as_deref().or(config.account.as_deref()),
    };

    let mut response = send(client, config, &request, Credential::AccessToken(Some(&token))).await?;
    let output = response::interpret(config.mode, &mut response).await?;

    log::info!("Successfully called {}", operation.qualified_name());

    Ok(output)
}

use http_client::HttpClient;

use super::reporter_request;
use crate::{
    client::{Reporter, RequestOptions},
    error::ReporterResult,
    reports::{
        param::{ReportParams, SalesReportParams},
        sales, Operation,
    },
    response::ReportOutput,
};

/// Operations of the Sales service.
#[derive(Debug, Clone, Copy)]
pub struct Sales<'a> {
    reporter: &'a Reporter,
}

impl<'a> Sales<'a> {
    pub(crate) fn new(reporter: &'a Reporter) -> Self {
        Self { reporter }
    }

    #[must_use]
    pub fn version(&self) -> &'a str {
        self.reporter.version()
    }

    /// Accounts available to the user.
    pub async fn get_accounts<Client: HttpClient>(
        &self,
        client: &Client,
        options: &RequestOptions,
    ) -> ReporterResult<ReportOutput> {
        self.call(client, &sales::GET_ACCOUNTS, &ReportParams::new(), options)
            .await
    }

    /// Downloads a sales report.
    pub async fn get_report<Client: HttpClient>(
        &self,
        client: &Client,
        params: &SalesReportParams,
        options: &RequestOptions,
    ) -> ReporterResult<ReportOutput> {
        let params = ReportParams::from_serialize(params)?;
        self.call(client, &sales::GET_REPORT, &params, options)
            .await
    }

    /// Service status.
    pub async fn get_status<Client: HttpClient>(
        &self,
        client: &Client,
        options: &RequestOptions,
    ) -> ReporterResult<ReportOutput> {
        self.call(client, &sales::GET_STATUS, &ReportParams::new(), options)
            .await
    }

    /// Vendor numbers the account can report on.
    pub async fn get_vendors<Client: HttpClient>(
        &self,
        client: &Client,
        options: &RequestOptions,
    ) -> ReporterResult<ReportOutput> {
        self.call(client, &sales::GET_VENDORS, &ReportParams::new(), options)
            .await
    }

    /// Calls any Sales operation with untyped parameters and per-request
    /// options.
    pub async fn call<Client: HttpClient>(
        &self,
        client: &Client,
        operation: &Operation,
        params: &ReportParams,
        options: &RequestOptions,
    ) -> ReporterResult<ReportOutput> {
        reporter_request(self.reporter, client, operation, params, options).await
    }
}

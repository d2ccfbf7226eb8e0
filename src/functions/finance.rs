use http_client::HttpClient;

use super::reporter_request;
use crate::{
    client::{Reporter, RequestOptions},
    error::ReporterResult,
    reports::{
        finance,
        param::{FinanceReportParams, ReportParams},
        Operation,
    },
    response::ReportOutput,
};

/// Operations of the Finance service.
#[derive(Debug, Clone, Copy)]
pub struct Finance<'a> {
    reporter: &'a Reporter,
}

impl<'a> Finance<'a> {
    pub(crate) fn new(reporter: &'a Reporter) -> Self {
        Self { reporter }
    }

    #[must_use]
    pub fn version(&self) -> &'a str {
        self.reporter.version()
    }

    pub async fn get_accounts<Client: HttpClient>(
        &self,
        client: &Client,
        options: &RequestOptions,
    ) -> ReporterResult<ReportOutput> {
        self.call(client, &finance::GET_ACCOUNTS, &ReportParams::new(), options)
            .await
    }

    /// Downloads a financial report.
    pub async fn get_report<Client: HttpClient>(
        &self,
        client: &Client,
        params: &FinanceReportParams,
        options: &RequestOptions,
    ) -> ReporterResult<ReportOutput> {
        let params = ReportParams::from_serialize(params)?;
        self.call(client, &finance::GET_REPORT, &params, options)
            .await
    }

    pub async fn get_status<Client: HttpClient>(
        &self,
        client: &Client,
        options: &RequestOptions,
    ) -> ReporterResult<ReportOutput> {
        self.call(client, &finance::GET_STATUS, &ReportParams::new(), options)
            .await
    }

    /// Vendors and the regions each reports in.
    pub async fn get_vendors_and_regions<Client: HttpClient>(
        &self,
        client: &Client,
        options: &RequestOptions,
    ) -> ReporterResult<ReportOutput> {
        self.call(client, &finance::GET_VENDORS_AND_REGIONS, &ReportParams::new(), options)
            .await
    }

    /// Calls any Finance operation with untyped parameters and per-request
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

//! A rust library for interacting with Apple's iTunes Connect Reporter service.
//!
//! The Reporter service exposes Sales and Finance reports through a single
//! form-encoded endpoint per service. Every request carries a JSON document
//! naming the operation in the provider's `queryInput` mini-syntax, plus either
//! the account password or an access token.
//!
//! ```no_run
//! use apple_reporter::{Reporter, ReporterConfig, RequestOptions, SalesReportParams};
//!
//! # async fn run<C: http_client::HttpClient>(client: &C) -> apple_reporter::ReporterResult<()> {
//! let reporter = Reporter::new(ReporterConfig::new("user@example.com").with_access_token("token"));
//!
//! let params = SalesReportParams {
//!     vendor_number: Some("123456".into()),
//!     report_type: Some("Sales".into()),
//!     report_sub_type: Some("Summary".into()),
//!     date_type: Some("Weekly".into()),
//!     date: Some("20150208".into()),
//!     ..Default::default()
//! };
//! let report = reporter
//!     .sales()
//!     .get_report(client, &params, &RequestOptions::default())
//!     .await?;
//! println!("{report:?}");
//! # Ok(())
//! # }
//! ```
#![warn(clippy::pedantic)]

pub mod client;
pub mod error;
pub mod functions;
pub mod reports;
pub mod response;
pub mod xml;

#[cfg(test)]
pub(crate) mod mock;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use client::{
    AccessToken, RequestOptions, Reporter, ReporterConfig, RetrievedToken, TokenOptions,
    TokenOptionsOverride,
};
pub use error::{ProviderError, ReporterError, ReporterResult};
pub use functions::{finance::Finance, sales::Sales};
pub use reports::param::{FinanceReportParams, ReportParams, SalesReportParams};
pub use response::ReportOutput;

/// Production endpoint of the Reporter service.
pub const DEFAULT_BASE_URL: &str = "https://reportingitc-reporter.apple.com/reportservice";
pub const DEFAULT_SALES_URL: &str = "/sales/v1";
pub const DEFAULT_FINANCE_URL: &str = "/finance/v1";
pub const DEFAULT_VERSION: &str = "1.0";

/// Content mode requested from the provider.
///
/// Controls both what the provider sends back and whether responses are
/// structured as XML on this side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResponseMode {
    #[default]
    #[serde(rename = "Robot.XML")]
    RobotXml,
    #[serde(rename = "Normal")]
    Normal,
}

impl ResponseMode {
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseMode::RobotXml => "Robot.XML",
            ResponseMode::Normal => "Normal",
        }
    }
}

impl fmt::Display for ResponseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two report services, each served from its own path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    Sales,
    Finance,
}

impl Service {
    /// Namespace prefix used in `queryInput`, e.g. `Sales.getReport`.
    #[inline]
    #[must_use]
    pub fn namespace(&self) -> &'static str {
        match self {
            Service::Sales => "Sales",
            Service::Finance => "Finance",
        }
    }
}

use apple_reporter::{Reporter, ReporterConfig, RequestOptions, SalesReportParams};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let client = http_client::h1::H1Client::new();
    // ITC_USERID plus ITC_ACCESS_TOKEN or ITC_PASSWORD
    let reporter = Reporter::new(ReporterConfig::from_env()?);

    let args = std::env::args().collect::<Vec<_>>();
    let params = SalesReportParams {
        vendor_number: Some(
            args.get(1)
                .cloned()
                .ok_or_else(|| "Missing vendor number".to_string())?,
        ),
        report_type: Some("Sales".into()),
        report_sub_type: Some("Summary".into()),
        date_type: Some("Daily".into()),
        date: Some(
            args.get(2)
                .cloned()
                .ok_or_else(|| "Missing report date (YYYYMMDD)".to_string())?,
        ),
        ..Default::default()
    };

    let options = RequestOptions {
        account: args.get(3).cloned(),
    };

    match reporter.sales().get_report(&client, &params, &options).await {
        Ok(report) => match report.as_text() {
            Some(text) => println!("{text}"),
            None => println!("{report:?}"),
        },
        Err(e) => eprintln!("Error fetching report: {e}"),
    }

    Ok(())
}

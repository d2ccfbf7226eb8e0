//! Turns provider responses into report output or typed errors.
//!
//! Successful bodies may arrive gzip-compressed, flagged by the provider's own
//! `content-encoding: agzip` marker (not the standard `gzip`). In `Robot.XML`
//! mode a successful body is structured as XML when it parses and handed back
//! as text otherwise. Failure bodies are only parsed to pull the code and
//! message out of an `<Error>` document, and only in `Robot.XML` mode.
use std::io::Read;

use flate2::read::MultiGzDecoder;
use http_client::Response;
use serde_json::Value;

use crate::{
    error::{ProviderError, ReporterError, ReporterResult},
    xml, ResponseMode,
};

/// `content-encoding` value the provider uses for gzip bodies.
pub const AGZIP: &str = "agzip";

/// Body of a successful report request.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutput {
    /// The body parsed as XML, see [`crate::xml`] for the tree shape.
    Xml(Value),
    /// The body as text, either because `Normal` mode was requested or because
    /// it wasn't XML.
    Text(String),
}

impl ReportOutput {
    #[must_use]
    pub fn as_xml(&self) -> Option<&Value> {
        match self {
            ReportOutput::Xml(tree) => Some(tree),
            ReportOutput::Text(_) => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ReportOutput::Text(text) => Some(text),
            ReportOutput::Xml(_) => None,
        }
    }
}

/// Reads and classifies a provider response.
///
/// # Errors
///
/// - [`ReporterError::Provider`] for every non-success status.
/// - [`ReporterError::Http`] if the body can't be read,
///   [`ReporterError::Decompression`] if an `agzip` body isn't valid gzip.
///
/// Bodies that aren't valid UTF-8 are decoded lossily.
pub async fn interpret(mode: ResponseMode, response: &mut Response) -> ReporterResult<ReportOutput> {
    if !response.status().is_success() {
        let text = String::from_utf8_lossy(&response.body_bytes().await?).into_owned();
        log::debug!("Reporter request failed with status {}", response.status());
        return Err(provider_error(mode, text).into());
    }

    let bytes = response.body_bytes().await?;
    let text = if is_agzip(response) {
        gunzip(&bytes)?
    } else {
        String::from_utf8_lossy(&bytes).into_owned()
    };

    Ok(match mode {
        ResponseMode::RobotXml => match xml::parse(&text) {
            Ok(tree) => ReportOutput::Xml(tree),
            Err(e) => {
                log::debug!("Response body is not XML ({e}), returning it as text");
                ReportOutput::Text(text)
            }
        },
        ResponseMode::Normal => ReportOutput::Text(text),
    })
}

fn is_agzip(response: &Response) -> bool {
    response
        .header("content-encoding")
        .is_some_and(|values| values.last().as_str() == AGZIP)
}

// Invalid UTF-8 is replaced, not rejected.
fn gunzip(bytes: &[u8]) -> ReporterResult<String> {
    let mut raw = Vec::new();
    MultiGzDecoder::new(bytes)
        .read_to_end(&mut raw)
        .map_err(ReporterError::Decompression)?;
    Ok(String::from_utf8_lossy(&raw).into_owned())
}

/// Error for a failed response body. Only `Robot.XML` mode looks inside it.
pub(crate) fn provider_error(mode: ResponseMode, text: String) -> ProviderError {
    if mode == ResponseMode::RobotXml {
        match xml::parse(&text) {
            Ok(tree) => {
                if let Some(error) = error_document(&tree) {
                    return error;
                }
                log::debug!("Failure body is XML but not an Error document");
            }
            Err(e) => log::debug!("Failure body is not XML: {e}"),
        }
    }
    ProviderError::from_text(text)
}

/// Reads `{Error: {Message: [m], Code: [c]}}`.
fn error_document(tree: &Value) -> Option<ProviderError> {
    let error = tree.get("Error")?;
    let message = error.get("Message")?.get(0)?.as_str()?;
    let code = error
        .get("Code")
        .and_then(|code| code.get(0))
        .and_then(Value::as_str);
    Some(ProviderError::new(message, code))
}

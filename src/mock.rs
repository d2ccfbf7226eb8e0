//! Scripted `HttpClient` for tests: answers requests with queued responses,
//! in order, and records what was sent.
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use http_client::{http_types::StatusCode, Error, HttpClient, Request, Response};

#[derive(Debug, Clone)]
pub(crate) struct MockResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl MockResponse {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::status(200, body)
    }

    pub fn status(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

/// A request as the transport saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub content_type: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct MockTransport {
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        Self::default()
    }

    pub fn with_response(self, response: MockResponse) -> Self {
        // Mutex poisoning only happens if a test already panicked
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl HttpClient for MockTransport {
    async fn send(&self, mut req: Request) -> Result<Response, Error> {
        let body = req.body_string().await?;
        self.requests.lock().unwrap().push(RecordedRequest {
            method: req.method().to_string(),
            url: req.url().to_string(),
            content_type: req
                .header("Content-Type")
                .map(|values| values.last().as_str().to_string()),
            body,
        });

        let next = self.responses.lock().unwrap().pop_front();
        let Some(scripted) = next else {
            return Err(Error::from_str(
                StatusCode::InternalServerError,
                "no scripted response left",
            ));
        };

        let mut response = Response::new(scripted.status);
        for (name, value) in &scripted.headers {
            response.insert_header(name.as_str(), value.as_str());
        }
        response.set_body(scripted.body);
        Ok(response)
    }
}

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};

use super::error::TransportError;
use super::types::{TransportOutcome, WireBody};

/// Delivers a serialized payload to an endpoint and classifies the result.
///
/// Implementations never fail: every problem is folded into a [`TransportOutcome`].
pub trait Transport: Send + Sync {
    fn deliver(
        &self,
        endpoint: &str,
        body: &WireBody,
    ) -> impl Future<Output = TransportOutcome> + Send;
}

/// POSTs payloads over HTTP with `reqwest`.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(connect_timeout: Duration, request_timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()?;
        Ok(Self { client })
    }

    async fn post(&self, endpoint: &str, body: &WireBody) -> Result<TransportOutcome, TransportError> {
        let response = self
            .client
            .post(endpoint)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, body.content_type)
            .body(body.bytes.clone())
            .send()
            .await?;

        Ok(TransportOutcome::from_status(response.status()))
    }
}

impl Transport for HttpTransport {
    async fn deliver(&self, endpoint: &str, body: &WireBody) -> TransportOutcome {
        match self.post(endpoint, body).await {
            Ok(outcome) => outcome,
            Err(err) => TransportOutcome::Error(err),
        }
    }
}

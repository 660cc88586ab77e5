//! HTTP client helpers for tests.

use std::time::Duration;

use factmatch::gateway::{FactCheckResponse, ReadyResponse};
use serde_json::{Value, json};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct TestClient {
    client: reqwest::Client,
    base_url: String,
}

impl TestClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}/{}", self.base_url, path)
    }

    /// Sends a well-formed request for `text`. Returns the response and the status header.
    pub async fn fact_check(
        &self,
        text: &str,
    ) -> Result<(FactCheckResponse, String), TestClientError> {
        let body = json!({
            "QueryId": uuid::Uuid::new_v4(),
            "QueryType": "text",
            "QueryBody": text,
            "QueryDateTime": "2024-05-01 12:30:00",
        });
        let (status, header, value) = self.post_raw(body).await?;

        match status {
            200 => Ok((serde_json::from_value(value)?, header)),
            400 | 422 => Err(TestClientError::BadRequest(value.to_string())),
            status => Err(TestClientError::UnexpectedStatus(status, value.to_string())),
        }
    }

    /// Posts an arbitrary JSON body to `/fasttext`.
    pub async fn post_raw(&self, body: Value) -> Result<(u16, String, Value), TestClientError> {
        let resp = self
            .client
            .post(self.url("/fasttext"))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        let header = status_header(&resp);
        let value = resp.json().await?;
        Ok((status, header, value))
    }

    pub async fn health(&self) -> Result<String, TestClientError> {
        let resp = self.client.get(self.url("/health-check")).send().await?;

        if resp.status().is_success() {
            Ok(resp.json().await?)
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            Err(TestClientError::UnexpectedStatus(status, body))
        }
    }

    /// Returns the readiness body whatever the status code.
    pub async fn ready(&self) -> Result<(u16, ReadyResponse), TestClientError> {
        let resp = self.client.get(self.url("/ready")).send().await?;
        let status = resp.status().as_u16();
        Ok((status, resp.json().await?))
    }
}

fn status_header(resp: &reqwest::Response) -> String {
    resp.headers()
        .get("x-factmatch-status")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum TestClientError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Invalid response body: {0}")]
    InvalidBody(#[from] serde_json::Error),

    #[error("Unexpected HTTP status: {0} - Body: {1}")]
    UnexpectedStatus(u16, String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Response};
use serde_json::Value;
use url::Url;

use crate::error::{ExpenseError, Result};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A REST collection store addressed by path segments, e.g. `["expenses", id]`.
///
/// Every failure is already classified into an [`ExpenseError`] kind, so the
/// layers above never see transport details.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn get(&self, path: &[&str], query: &[(&str, &str)]) -> Result<Value>;

    async fn post(&self, path: &[&str], body: &Value) -> Result<Value>;

    async fn delete(&self, path: &[&str]) -> Result<()>;
}

/// [`Backend`] over HTTP with JSON bodies and a fixed per-request timeout.
pub struct HttpBackend {
    http: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let http = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { http, base_url })
    }

    fn endpoint(&self, path: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ExpenseError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
            })?
            .pop_if_empty()
            .extend(path);
        Ok(url)
    }

    /// Turn a non-success response into its error kind, keeping the server's
    /// `message` field when there is one.
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!(%status, %body, "request rejected");

        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(String::from));

        Err(ExpenseError::from_status(status, message))
    }

    async fn json(response: Response) -> Result<Value> {
        let body = response.text().await.map_err(classify)?;
        serde_json::from_str(&body).map_err(|e| {
            ExpenseError::DataFormat(format!("Invalid data format received from server: {e}"))
        })
    }
}

/// Map a transport error that produced no usable response.
fn classify(err: reqwest::Error) -> ExpenseError {
    tracing::debug!(error = %err, "transport failure");
    if err.is_timeout() {
        ExpenseError::Timeout
    } else if err.is_connect() || err.is_request() {
        ExpenseError::Connectivity
    } else {
        ExpenseError::Http(err)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    #[tracing::instrument(skip(self))]
    async fn get(&self, path: &[&str], query: &[(&str, &str)]) -> Result<Value> {
        let response = self
            .http
            .get(self.endpoint(path)?)
            .query(query)
            .send()
            .await
            .map_err(classify)?;

        Self::json(Self::check(response).await?).await
    }

    #[tracing::instrument(skip(self, body))]
    async fn post(&self, path: &[&str], body: &Value) -> Result<Value> {
        let response = self
            .http
            .post(self.endpoint(path)?)
            .json(body)
            .send()
            .await
            .map_err(classify)?;

        Self::json(Self::check(response).await?).await
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, path: &[&str]) -> Result<()> {
        let response = self
            .http
            .delete(self.endpoint(path)?)
            .send()
            .await
            .map_err(classify)?;

        Self::check(response).await?;
        Ok(())
    }
}

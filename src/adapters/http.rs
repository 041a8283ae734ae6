use crate::core::suggest::extract_price;
use crate::domain::ports::{RemoteEstimator, RemoteReply, RemoteRequest};
use crate::utils::error::{PricingError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const TEXT_FIELDS: [&str; 3] = ["text", "reason", "content"];

/// Remote estimation service reached over HTTP.
///
/// Posts the [`RemoteRequest`] as JSON and accepts either a structured
/// `suggestedPrice` field or a free-text answer.
#[derive(Debug, Clone)]
pub struct HttpEstimator {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpEstimator {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key: None,
            timeout: crate::core::suggest::DEFAULT_REMOTE_TIMEOUT,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RemoteEstimator for HttpEstimator {
    async fn estimate(&self, request: &RemoteRequest) -> Result<RemoteReply> {
        let mut builder = self
            .client
            .post(&self.endpoint)
            .json(request)
            .timeout(self.timeout);

        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        tracing::debug!("Posting estimate request to: {}", self.endpoint);

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                PricingError::RemoteTimeoutError {
                    millis: self.timeout.as_millis(),
                }
            } else {
                PricingError::HttpError(e)
            }
        })?;

        let status = response.status();
        tracing::debug!("Remote estimator response status: {}", status);

        let body = response.text().await?;
        if !status.is_success() {
            return Err(PricingError::RemoteStatusError {
                status: status.as_u16(),
                body,
            });
        }

        Ok(parse_reply(&body))
    }
}

/// Reads a reply body: JSON object, JSON string, or plain text.
pub fn parse_reply(body: &str) -> RemoteReply {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(map)) => {
            let suggested_price = map.get("suggestedPrice").and_then(|v| {
                v.as_f64()
                    .or_else(|| v.as_str().and_then(extract_price).map(|p| p as f64))
            });
            let text = TEXT_FIELDS
                .iter()
                .find_map(|field| map.get(*field).and_then(|v| v.as_str()))
                .unwrap_or_default()
                .to_string();
            RemoteReply {
                suggested_price,
                text,
            }
        }
        Ok(serde_json::Value::String(text)) => RemoteReply {
            suggested_price: None,
            text,
        },
        _ => RemoteReply {
            suggested_price: None,
            text: body.to_string(),
        },
    }
}

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tracing::{debug, warn};

use super::{request_body, ApiError, ApiResponse, Gateway};

/// [`Gateway`] over HTTP: every action is a JSON POST to one URL.
pub struct HttpGateway {
    client: Client,
    url: String,
}

impl HttpGateway {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Gateway for HttpGateway {
    fn call(&self, action: &str, params: Value) -> Result<ApiResponse, ApiError> {
        debug!(action, "POST {}", self.url);

        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .json(&request_body(action, params))
            .send()
            .map_err(|e| {
                warn!(action, "API call failed: {e}");
                ApiError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(action, status = status.as_u16(), "API call rejected");
            return Err(ApiError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        serde_json::from_slice(&body).map_err(|e| {
            warn!(action, "undecodable response: {e}");
            ApiError::Decode(e.to_string())
        })
    }
}

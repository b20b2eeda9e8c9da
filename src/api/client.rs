//! The client half of the relay contract.
//!
//! One call per user submission: POST the full history plus mode and model,
//! get back either a single assistant message or an `{ "error": ... }` body.
//! Nothing is retried and nothing can be cancelled once sent.

use thiserror::Error;

use crate::api::{ErrorBody, RelayMode, RelayRequest, RelayResponse, WireMessage};
use crate::utils::url::{endpoint_url, normalize_base_url};

#[derive(Debug, Error)]
pub enum RelayClientError {
    /// The relay could not be reached or the transfer broke down.
    #[error("relay request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The relay answered with an error status and (where parseable) its
    /// error body.
    #[error("relay returned {status}: {message}")]
    Api { status: u16, message: String },
}

#[derive(Clone)]
pub struct RelayClient {
    http: reqwest::Client,
    base_url: String,
}

impl RelayClient {
    pub fn new(base_url: &str) -> Self {
        RelayClient {
            http: reqwest::Client::new(),
            base_url: normalize_base_url(base_url),
        }
    }

    pub async fn send(
        &self,
        messages: Vec<WireMessage>,
        mode: RelayMode,
        model: &str,
    ) -> Result<RelayResponse, RelayClientError> {
        let request = RelayRequest {
            messages,
            mode,
            model: model.to_string(),
        };

        let response = self
            .http
            .post(endpoint_url(&self.base_url, "api/chat"))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => "unrecognized error response".to_string(),
            };
            return Err(RelayClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<RelayResponse>().await?)
    }
}

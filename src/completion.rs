use std::future::Future;
use std::pin::Pin;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::TurnError;
use crate::http_errors::transport_error;
use crate::transcript::Message;

/// Request body. Borrows the transcript instead of cloning it.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    // Refusals and tool calls send `"content": null`.
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatResponse {
    pub fn first_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
    }
}

pub type CompletionFuture<'a> = Pin<Box<dyn Future<Output = Result<ChatResponse, TurnError>> + 'a>>;

/// One request/response exchange with a completion endpoint.
pub trait CompletionTransport {
    fn complete<'a>(&'a self, request: ChatRequest<'a>) -> CompletionFuture<'a>;
}

pub struct HttpTransport {
    client: Client,
    endpoint: String,
    api_key: String,
    timeout_secs: Option<u64>,
}

impl HttpTransport {
    pub fn new(client: Client, cfg: &Config) -> Self {
        Self {
            client,
            endpoint: cfg.endpoint.clone(),
            api_key: cfg.api_key.clone(),
            timeout_secs: cfg.request_timeout_secs,
        }
    }

    async fn post(&self, request: ChatRequest<'_>) -> Result<ChatResponse, TurnError> {
        debug!(
            endpoint = %self.endpoint,
            model = %request.model,
            message_count = request.messages.len(),
            "sending completion request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| {
                warn!(endpoint = %self.endpoint, error = %err, "completion request failed");
                transport_error(err, &self.endpoint, self.timeout_secs)
            })?;

        let status = response.status();
        // `text` consumes the response, so the connection is handed back
        // whether or not the body reads cleanly.
        let body = response
            .text()
            .await
            .map_err(|err| transport_error(err, &self.endpoint, self.timeout_secs))?;

        if !status.is_success() {
            warn!(
                endpoint = %self.endpoint,
                status = %status,
                response_body_len = body.len(),
                "completion endpoint returned non-success status"
            );
            return Err(TurnError::Status { status, body });
        }

        let parsed = match serde_json::from_str::<ChatResponse>(&body) {
            Ok(parsed) => parsed,
            Err(source) => {
                warn!(
                    error = %source,
                    response_body_len = body.len(),
                    "undecodable completion response"
                );
                return Err(TurnError::Decode { source, body });
            }
        };
        debug!(choice_count = parsed.choices.len(), "received completion response");
        Ok(parsed)
    }
}

impl CompletionTransport for HttpTransport {
    fn complete<'a>(&'a self, request: ChatRequest<'a>) -> CompletionFuture<'a> {
        Box::pin(self.post(request))
    }
}

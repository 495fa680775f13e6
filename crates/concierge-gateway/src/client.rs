//! reqwest-based implementation of the support gateway.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use concierge_core::config::BackendConfig;

use crate::error::GatewayError;
use crate::SupportGateway;

/// Substitute answer when the backend reply lacks the `answer` field.
const FALLBACK_ANSWER: &str = "Sorry, the assistant did not return an answer. Please try again.";

/// Substitute confirmation when the ticket reply lacks the `message` field.
const FALLBACK_TICKET_MESSAGE: &str = "Ticket submitted successfully.";

/// Substitute message for non-JSON error bodies.
const GENERIC_BACKEND_FAILURE: &str = "The support backend is currently unavailable.";

#[derive(Serialize)]
struct QueryBody<'a> {
    query: &'a str,
}

#[derive(Serialize)]
struct CreateTicketBody<'a> {
    email: &'a str,
    issue_description: &'a str,
}

/// HTTP client for the support backend.
///
/// One POST per call, with a per-request timeout and bounded retry on
/// retryable failures. No caching and no idempotency keys: the controllers
/// already enforce at-most-one in-flight call per surface.
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
    retry_attempts: u32,
    retry_backoff: std::time::Duration,
}

impl GatewayClient {
    /// Create a client from backend settings.
    ///
    /// The underlying `reqwest::Client` carries the configured timeout, so a
    /// hung request can never pin a surface in its submitting state.
    pub fn new(config: &BackendConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry_attempts: config.retry_attempts,
            retry_backoff: std::time::Duration::from_millis(config.retry_backoff_ms),
        })
    }

    /// POST a JSON body and parse the JSON reply, retrying retryable
    /// failures up to the configured attempt budget.
    async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<Value, GatewayError> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt: u32 = 0;
        loop {
            match self.try_post(&url, body).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.retry_attempts && e.is_retryable() => {
                    attempt += 1;
                    tracing::warn!(
                        url = %url,
                        attempt,
                        error = %e,
                        "Backend call failed, retrying"
                    );
                    tokio::time::sleep(self.retry_backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn try_post<B: Serialize>(&self, url: &str, body: &B) -> Result<Value, GatewayError> {
        let response = self.http.post(url).json(body).send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout
            } else {
                GatewayError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = error_message(response).await;
            return Err(GatewayError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))
    }
}

/// Extract a display message from a non-success response.
///
/// The backend reports errors as JSON (`detail` in the FastAPI shape, with
/// `message` as a secondary field). Anything else gets a generic message.
async fn error_message(response: reqwest::Response) -> String {
    let is_json = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("application/json"))
        .unwrap_or(false);

    if !is_json {
        return GENERIC_BACKEND_FAILURE.to_string();
    }

    match response.json::<Value>().await {
        Ok(body) => extract_error_field(&body),
        Err(_) => GENERIC_BACKEND_FAILURE.to_string(),
    }
}

fn extract_error_field(body: &Value) -> String {
    body.get("detail")
        .or_else(|| body.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| GENERIC_BACKEND_FAILURE.to_string())
}

#[async_trait]
impl SupportGateway for GatewayClient {
    async fn ask(&self, question: &str) -> Result<String, GatewayError> {
        let body = self.post_json("/query", &QueryBody { query: question }).await?;
        let answer = body
            .get("answer")
            .and_then(Value::as_str)
            .unwrap_or(FALLBACK_ANSWER);
        tracing::debug!(answer_len = answer.len(), "Query answered");
        Ok(answer.to_string())
    }

    async fn submit_ticket(
        &self,
        email: &str,
        description: &str,
    ) -> Result<String, GatewayError> {
        let body = self
            .post_json(
                "/create-ticket",
                &CreateTicketBody {
                    email,
                    issue_description: description,
                },
            )
            .await?;
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or(FALLBACK_TICKET_MESSAGE);
        tracing::debug!("Ticket submitted");
        Ok(message.to_string())
    }
}

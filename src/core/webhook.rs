//! Webhook delivery.
//!
//! Posts usage reports as JSON to the configured n8n webhook endpoint.

use std::time::Duration;

use reqwest::{Client, ClientBuilder};
use serde::Serialize;

use crate::error::{CurtError, Result};

/// Default timeout for webhook requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Build a configured HTTP client.
///
/// # Errors
///
/// Returns error if client construction fails.
pub fn build_client(timeout: Duration) -> Result<Client> {
    ClientBuilder::new()
        .timeout(timeout)
        .user_agent(format!("curt/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| CurtError::Network(e.to_string()))
}

/// POST a JSON payload to the webhook.
///
/// Any 2xx status counts as delivered; the response body (n8n workflows often
/// answer with a short acknowledgement) is returned trimmed, or `None` when
/// empty. `timeout` names the client's configured timeout so a timeout error
/// can report the real duration.
///
/// # Errors
///
/// Returns error if:
/// - The request times out ([`CurtError::Timeout`])
/// - The connection fails ([`CurtError::Network`])
/// - The endpoint answers with a non-2xx status ([`CurtError::WebhookRejected`])
pub async fn post_report<T: Serialize + ?Sized>(
    client: &Client,
    url: &str,
    payload: &T,
    timeout: Duration,
) -> Result<Option<String>> {
    let response = client.post(url).json(payload).send().await.map_err(|e| {
        if e.is_timeout() {
            CurtError::Timeout(timeout.as_secs())
        } else {
            CurtError::Network(e.to_string())
        }
    })?;

    let status = response.status();
    // Read the body before judging the status so a rejection can carry the
    // endpoint's diagnostic text.
    let body = response.text().await.unwrap_or_default();

    if !status.is_success() {
        return Err(CurtError::WebhookRejected {
            status: status.as_u16(),
            body: body.trim().to_string(),
        });
    }

    let body = body.trim();
    Ok((!body.is_empty()).then(|| body.to_string()))
}

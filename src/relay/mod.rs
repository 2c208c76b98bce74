use std::time::Duration;

use log::{error, info};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::Config;

const RELAY_TIMEOUT: Duration = Duration::from_secs(10);
const SEND_TEXT_PATH: &str = "/msg/send_text";

// Failure to hand a message to the relay. No fallback exists, so these
// reach the webhook caller.
#[derive(Debug, Error)]
pub enum RelayError {
    // Any `code` other than 0, including a missing or non-numeric one
    #[error("Delivery failed: {0}")]
    Rejected(String),

    #[error("relay returned HTTP {0}")]
    Status(u16),

    #[error("relay request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Serialize)]
struct GuidRequest<'a> {
    app_key: &'a str,
    app_secret: &'a str,
    path: &'a str,
    data: SendTextData<'a>,
}

#[derive(Debug, Serialize)]
struct SendTextData<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    guid: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    conversation_id: Option<&'a str>,
    content: &'a str,
}

// Reads the relay's reply loosely: only a numeric zero `code` is success.
fn relay_outcome(body: &Value) -> Result<(), RelayError> {
    if body.get("code").and_then(Value::as_f64) == Some(0.0) {
        return Ok(());
    }
    let message = match body.get("message") {
        Some(Value::String(s)) => s.clone(),
        None | Some(Value::Null) => "unknown relay error".to_string(),
        Some(other) => other.to_string(),
    };
    Err(RelayError::Rejected(message))
}

pub struct JuheClient {
    api_base: String,
    app_key: String,
    app_secret: String,
    instance_guid: Option<String>,
    client: Client,
}

impl JuheClient {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            api_base: config.juhe_api_base.clone(),
            app_key: config.juhe_app_key.clone().unwrap_or_default(),
            app_secret: config.juhe_app_secret.clone().unwrap_or_default(),
            instance_guid: config.instance_guid.clone(),
            client,
        }
    }

    // Sends `content` as a text message to `conversation_id`, one attempt
    pub async fn send_text(
        &self,
        conversation_id: Option<&str>,
        content: &str,
    ) -> Result<(), RelayError> {
        info!("Sending message to WeChat Work: {:?} -> {:?}", content, conversation_id);

        let request = GuidRequest {
            app_key: &self.app_key,
            app_secret: &self.app_secret,
            path: SEND_TEXT_PATH,
            data: SendTextData {
                guid: self.instance_guid.as_deref(),
                conversation_id,
                content,
            },
        };

        let result = self.post(&request).await;
        if let Err(e) = &result {
            error!("Failed to send message to WeChat Work: {}", e);
        }
        result
    }

    async fn post(&self, request: &GuidRequest<'_>) -> Result<(), RelayError> {
        let response = self
            .client
            .post(&self.api_base)
            .json(request)
            .timeout(RELAY_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Relay HTTP {}: {}", status, body);
            return Err(RelayError::Status(status.as_u16()));
        }

        let text = response.text().await?;
        info!("Relay send result: {}", text);

        let body = serde_json::from_str::<Value>(&text).unwrap_or(Value::Null);
        relay_outcome(&body)
    }
}

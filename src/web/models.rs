use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::config::MissingSettings;

// Callback body posted by the chat platform. Fields are only checked for
// presence, so values of an unexpected JSON type read as absent.
#[derive(Debug, Default, Deserialize)]
pub struct InboundMessage {
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub msg_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub conversation_id: Option<String>,
}

impl InboundMessage {
    // Anything other than a JSON object is an empty payload
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        match value {
            Value::Object(_) => serde_json::from_value(value),
            _ => Ok(Self::default()),
        }
    }
}

// Strings pass through, numbers keep their textual form, the rest is dropped
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

// What an inbound callback asks for, decided once per request
#[derive(Debug, PartialEq, Eq)]
pub enum MessageKind {
    HealthCheck,
    Text {
        content: String,
        conversation_id: Option<String>,
    },
    Other {
        msg_type: Option<String>,
    },
}

impl MessageKind {
    pub fn classify(path: &str, message: InboundMessage) -> Self {
        if path.ends_with("/health") || message.kind.as_deref() == Some("health_check") {
            return MessageKind::HealthCheck;
        }

        let is_text = message.msg_type.as_deref() == Some("text");
        match message.content {
            Some(content) if is_text && !content.is_empty() => MessageKind::Text {
                content,
                conversation_id: message.conversation_id,
            },
            _ => MessageKind::Other {
                msg_type: message.msg_type,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EnvironmentInfo {
    pub runtime_version: &'static str,
    pub platform: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LivenessResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub service: &'static str,
    pub version: &'static str,
    pub environment: EnvironmentInfo,
}

#[derive(Debug, Serialize)]
pub struct ConfigStatus {
    pub coze_configured: bool,
    pub juhe_configured: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub config: ConfigStatus,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing: Option<MissingSettings>,
}

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl WebhookResponse {
    pub fn success(ai_response: String) -> Self {
        Self {
            status: "success",
            message: "Message processed successfully".to_string(),
            ai_response: Some(ai_response),
            stack: None,
        }
    }

    pub fn ignored() -> Self {
        Self {
            status: "ignored",
            message: "Non-text message ignored".to_string(),
            ai_response: None,
            stack: None,
        }
    }

    pub fn error(message: String, stack: Option<String>) -> Self {
        Self {
            status: "error",
            message,
            ai_response: None,
            stack,
        }
    }
}

use std::time::Duration;

use chrono::Utc;
use log::{debug, error, info, warn};
use rand::Rng;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::Config;

// Stays under the 30s budget a hosting platform usually gives a request
const COZE_TIMEOUT: Duration = Duration::from_secs(25);
const COZE_USER: &str = "wework_user";
const CONVERSATION_PREFIX: &str = "relay_";
const SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableReason {
    NoAnswer,
    Unauthorized,
    RateLimited,
    // transport failure or any other non-2xx
    ServiceDown,
}

impl UnavailableReason {
    fn from_status(status: Option<StatusCode>) -> Self {
        match status {
            Some(StatusCode::UNAUTHORIZED) => UnavailableReason::Unauthorized,
            Some(StatusCode::TOO_MANY_REQUESTS) => UnavailableReason::RateLimited,
            _ => UnavailableReason::ServiceDown,
        }
    }

    pub fn apology(&self) -> &'static str {
        match self {
            UnavailableReason::NoAnswer => "抱歉，我暂时无法回答这个问题。",
            UnavailableReason::Unauthorized => "抱歉，AI服务认证失败，请检查配置。",
            UnavailableReason::RateLimited => "抱歉，请求过于频繁，请稍后再试。",
            UnavailableReason::ServiceDown => {
                "抱歉，AI服务暂时不可用，请稍后再试。"
            }
        }
    }
}

// Outcome of one exchange with the AI backend, always displayable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiReply {
    Answer(String),
    Unavailable(UnavailableReason),
}

impl AiReply {
    pub fn into_text(self) -> String {
        match self {
            AiReply::Answer(text) => text,
            AiReply::Unavailable(reason) => reason.apology().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    conversation_id: String,
    bot_id: &'a str,
    user: &'a str,
    query: &'a str,
    chat_history: Vec<serde_json::Value>,
    stream: bool,
}

#[derive(Debug, Default, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    fn into_reply(self) -> AiReply {
        let answer = self
            .messages
            .into_iter()
            .find(|msg| msg.kind.as_deref() == Some("answer"));

        match answer.and_then(|msg| msg.content).filter(|c| !c.is_empty()) {
            Some(content) => AiReply::Answer(content),
            None => AiReply::Unavailable(UnavailableReason::NoAnswer),
        }
    }
}

// relay_<unix millis>_<9 base-36 chars>, collision-resistant but not unique
pub fn generate_conversation_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{}{}_{}", CONVERSATION_PREFIX, Utc::now().timestamp_millis(), suffix)
}

// Wrapper for the Coze v2 chat API
pub struct CozeClient {
    api_url: String,
    token: String,
    bot_id: String,
    client: Client,
}

impl CozeClient {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            api_url: config.coze_api_url.clone(),
            token: config.coze_api_token.clone().unwrap_or_default(),
            bot_id: config.coze_bot_id.clone().unwrap_or_default(),
            client,
        }
    }

    // Never errors: failures fold into AiReply::Unavailable
    pub async fn chat(&self, query: &str) -> AiReply {
        info!("Calling Coze API: {:?}", query);

        let payload = ChatRequest {
            conversation_id: generate_conversation_id(),
            bot_id: &self.bot_id,
            user: COZE_USER,
            query,
            chat_history: Vec::new(),
            stream: false,
        };
        debug!("Coze payload conversation id: {}", payload.conversation_id);

        let response = match self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.token)
            .json(&payload)
            .timeout(COZE_TIMEOUT)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
        {
            Ok(resp) => resp,
            Err(e) => {
                error!("Coze API call failed (status: {:?}): {}", e.status(), e);
                return AiReply::Unavailable(UnavailableReason::from_status(e.status()));
            }
        };

        info!("Coze API response status: {}", response.status());

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                error!("Failed to read Coze API response body: {}", e);
                return AiReply::Unavailable(UnavailableReason::ServiceDown);
            }
        };
        debug!("Coze API response body: {}", body);

        let parsed = serde_json::from_str::<ChatResponse>(&body).unwrap_or_else(|e| {
            warn!("Coze API response is not the expected JSON: {}", e);
            ChatResponse::default()
        });

        let reply = parsed.into_reply();
        if let AiReply::Unavailable(reason) = &reply {
            warn!("No answer message in Coze response ({:?})", reason);
        }
        reply
    }
}

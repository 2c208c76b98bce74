use actix_web::http::Method;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use anyhow::anyhow;
use chrono::{SecondsFormat, Utc};
use log::{debug, error, info};
use serde_json::Value;

use crate::config::Environment;
use crate::web::models::{
    ConfigStatus, EnvironmentInfo, ErrorResponse, HealthCheckResponse, InboundMessage,
    LivenessResponse, MessageKind, WebhookResponse,
};
use crate::AppState;

pub const SERVICE_NAME: &str = "WeChat-Coze Bot";

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

// Liveness endpoint, independent of configuration
pub async fn liveness() -> impl Responder {
    HttpResponse::Ok().json(LivenessResponse {
        status: "ok",
        timestamp: now_iso(),
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        environment: EnvironmentInfo {
            runtime_version: env!("RUSTC_VERSION"),
            platform: std::env::consts::OS,
        },
    })
}

// Chat platform callback
pub async fn webhook(
    req: HttpRequest,
    body: web::Bytes,
    data: web::Data<AppState>,
) -> HttpResponse {
    if *req.method() == Method::OPTIONS {
        return HttpResponse::Ok().finish();
    }

    if *req.method() != Method::POST {
        return HttpResponse::MethodNotAllowed().json(ErrorResponse {
            error: "Method not allowed",
            message: "Only POST requests are accepted",
            missing: None,
        });
    }

    match process(&req, &body, &data).await {
        Ok(response) => response,
        Err(e) => {
            error!("Error processing message: {:?}", e);
            let stack = match data.config.environment {
                Environment::Development => Some(format!("{:?}", e)),
                Environment::Production => None,
            };
            HttpResponse::InternalServerError().json(WebhookResponse::error(e.to_string(), stack))
        }
    }
}

async fn process(
    req: &HttpRequest,
    body: &[u8],
    data: &AppState,
) -> anyhow::Result<HttpResponse> {
    let message = parse_message(body)?;
    debug!("Received message: {:?}", message);

    match MessageKind::classify(req.path(), message) {
        MessageKind::HealthCheck => Ok(HttpResponse::Ok().json(HealthCheckResponse {
            status: "ok",
            timestamp: now_iso(),
            config: ConfigStatus {
                coze_configured: data.config.coze_configured(),
                juhe_configured: data.config.juhe_configured(),
            },
        })),
        // Checked before the message type so a broken deployment fails uniformly
        _ if data.config.missing().blocks_processing() => {
            let missing = data.config.missing();
            error!("Configuration incomplete: {:?}", missing);
            Ok(HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Configuration incomplete",
                message: "Please check the environment variable configuration",
                missing: Some(missing),
            }))
        }
        MessageKind::Text { content, conversation_id } => {
            info!("Processing message {:?} from {:?}", content, conversation_id);

            let reply = data.coze.chat(&content).await.into_text();
            info!("AI reply: {:?}", reply);

            data.relay.send_text(conversation_id.as_deref(), &reply).await?;

            Ok(HttpResponse::Ok().json(WebhookResponse::success(reply)))
        }
        MessageKind::Other { msg_type } => {
            info!("Ignoring non-text message: {:?}", msg_type);
            Ok(HttpResponse::Ok().json(WebhookResponse::ignored()))
        }
    }
}

// An empty body is an empty payload; only malformed JSON is an error
fn parse_message(body: &[u8]) -> anyhow::Result<InboundMessage> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(InboundMessage::default());
    }
    let value: Value =
        serde_json::from_slice(body).map_err(|e| anyhow!("Invalid JSON payload: {}", e))?;
    InboundMessage::from_value(value).map_err(|e| anyhow!("Invalid JSON payload: {}", e))
}

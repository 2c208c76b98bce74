use std::env;

use log::{info, warn};
use serde::Serialize;

pub const DEFAULT_COZE_API_URL: &str = "https://api.coze.cn/open_api/v2/chat";
pub const DEFAULT_JUHE_API_BASE: &str = "https://chat-api.juhebot.com/open/GuidRequest";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;

// Only development exposes error details to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(v) if v.eq_ignore_ascii_case("development") => Environment::Development,
            _ => Environment::Production,
        }
    }
}

// Process-wide settings, read once at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub coze_api_token: Option<String>,
    pub coze_bot_id: Option<String>,
    pub coze_api_url: String,
    pub juhe_app_key: Option<String>,
    pub juhe_app_secret: Option<String>,
    pub juhe_api_base: String,
    pub instance_guid: Option<String>,
    pub environment: Environment,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MissingSettings {
    pub coze_token: bool,
    pub coze_bot_id: bool,
    pub juhe_key: bool,
    pub juhe_secret: bool,
    pub instance_guid: bool,
}

impl MissingSettings {
    // The instance guid is reported but does not block processing
    pub fn blocks_processing(&self) -> bool {
        self.coze_token || self.coze_bot_id || self.juhe_key || self.juhe_secret
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    // Empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(raw) => raw.parse::<u16>().unwrap_or_else(|_| {
                warn!("Invalid PORT value {:?}, falling back to {}", raw, DEFAULT_PORT);
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        Self {
            coze_api_token: get("COZE_API_TOKEN"),
            coze_bot_id: get("COZE_BOT_ID"),
            coze_api_url: get("COZE_API_URL")
                .unwrap_or_else(|| DEFAULT_COZE_API_URL.to_string()),
            juhe_app_key: get("JUHE_APP_KEY"),
            juhe_app_secret: get("JUHE_APP_SECRET"),
            juhe_api_base: get("JUHE_API_BASE")
                .unwrap_or_else(|| DEFAULT_JUHE_API_BASE.to_string()),
            instance_guid: get("INSTANCE_GUID"),
            environment: Environment::parse(get("APP_ENV").as_deref()),
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
        }
    }

    pub fn missing(&self) -> MissingSettings {
        MissingSettings {
            coze_token: self.coze_api_token.is_none(),
            coze_bot_id: self.coze_bot_id.is_none(),
            juhe_key: self.juhe_app_key.is_none(),
            juhe_secret: self.juhe_app_secret.is_none(),
            instance_guid: self.instance_guid.is_none(),
        }
    }

    pub fn coze_configured(&self) -> bool {
        self.coze_api_token.is_some()
    }

    pub fn juhe_configured(&self) -> bool {
        self.juhe_app_key.is_some()
    }

    pub fn log_summary(&self) {
        let missing = self.missing();
        info!(
            "Config loaded (env: {:?}, coze: {}, juhe: {}, instance guid: {})",
            self.environment,
            self.coze_configured(),
            self.juhe_configured(),
            !missing.instance_guid
        );
        if missing.blocks_processing() {
            warn!("Configuration incomplete, messages will be rejected: {:?}", missing);
        }
    }
}

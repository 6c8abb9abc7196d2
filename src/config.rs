use crate::reply::{DEFAULT_PREVIEW_CHARS, MAX_PREVIEW_CHARS};
use dotenvy::dotenv;
use std::{env, str::FromStr, time::Duration};
use thiserror::Error;

const DEFAULT_SESSION_TTL_SECS: u64 = 3600;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    MissingEnv(&'static str),
    #[error("invalid HOSTING value (expected true|false): {0}")]
    InvalidHosting(String),
    #[error("invalid WEBHOOK_URL: {0}")]
    InvalidWebhookUrl(String),
    #[error("invalid VISION_PROVIDER (expected gemini|openai|groq): {0}")]
    InvalidProvider(String),
    #[error("invalid {0}: {1}")]
    InvalidUrl(&'static str, String),
}

/// Which hosted model the photos are sent to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisionProvider {
    Gemini,
    OpenAi,
    Groq,
}

impl VisionProvider {
    /// Environment variable holding this provider's API key.
    pub fn key_var(self) -> &'static str {
        match self {
            VisionProvider::Gemini => "GOOGLE_API_KEY",
            VisionProvider::OpenAi => "OPENAI_API_KEY",
            VisionProvider::Groq => "GROQ_API_KEY",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            VisionProvider::Gemini => "gemini-1.5-flash",
            VisionProvider::OpenAi => "gpt-4o-mini",
            VisionProvider::Groq => "meta-llama/llama-4-scout-17b-16e-instruct",
        }
    }

    pub fn default_timeout(self) -> Duration {
        match self {
            VisionProvider::OpenAi => Duration::from_secs(30),
            VisionProvider::Gemini | VisionProvider::Groq => Duration::from_secs(60),
        }
    }
}

impl FromStr for VisionProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(VisionProvider::Gemini),
            "openai" => Ok(VisionProvider::OpenAi),
            "groq" => Ok(VisionProvider::Groq),
            other => Err(ConfigError::InvalidProvider(other.to_string())),
        }
    }
}

#[derive(Clone, Debug)]
pub struct VisionConfig {
    pub provider: VisionProvider,
    /// `None` means the bot runs but answers every photo with a warning.
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
    pub base_url: Option<url::Url>,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub token: String,
    pub hosting: bool,
    pub webhook_url: Option<url::Url>,
    pub port: u16,
    pub vision: VisionConfig,
    pub session_ttl: Duration,
    pub session_capacity: usize,
    pub preview_chars: usize,
}

fn parse_or<T: FromStr>(var: &str, default: T) -> T {
    env::var(var)
        .ok()
        .and_then(|s| s.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn non_empty(var: &str) -> Option<String> {
    env::var(var).ok().filter(|s| !s.trim().is_empty())
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        if cfg!(not(test)) {
            let _ = dotenv();
        }

        let token =
            env::var("TELOXIDE_TOKEN").map_err(|_| ConfigError::MissingEnv("TELOXIDE_TOKEN"))?;

        let hosting = match non_empty("HOSTING") {
            None => false,
            Some(raw) => match raw.to_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                other => return Err(ConfigError::InvalidHosting(other.to_string())),
            },
        };

        let webhook_url = match non_empty("WEBHOOK_URL") {
            Some(s) => {
                let parsed =
                    url::Url::parse(&s).map_err(|_| ConfigError::InvalidWebhookUrl(s.clone()))?;
                Some(parsed)
            }
            None => None,
        };

        let port = parse_or("PORT", 8080u16);

        // Zero would expire every session on insert.
        let session_ttl = match parse_or("SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS) {
            0 => Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            secs => Duration::from_secs(secs),
        };

        // The four previews plus headings must fit one Telegram message.
        let preview_chars = match parse_or("PREVIEW_CHARS", DEFAULT_PREVIEW_CHARS) {
            0 => DEFAULT_PREVIEW_CHARS,
            n => n.min(MAX_PREVIEW_CHARS),
        };

        Ok(AppConfig {
            token,
            hosting,
            webhook_url,
            port,
            vision: VisionConfig::from_env()?,
            session_ttl,
            session_capacity: parse_or("SESSION_CAPACITY", 1000usize),
            preview_chars,
        })
    }
}

impl VisionConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let provider = match non_empty("VISION_PROVIDER") {
            Some(raw) => raw.parse::<VisionProvider>()?,
            None => VisionProvider::Gemini,
        };

        let base_var = match provider {
            VisionProvider::Gemini => Some("GEMINI_BASE_URL"),
            VisionProvider::OpenAi => Some("OPENAI_BASE_URL"),
            VisionProvider::Groq => None,
        };
        let base_url = match base_var.and_then(|var| non_empty(var).map(|v| (var, v))) {
            Some((var, raw)) => {
                Some(url::Url::parse(&raw).map_err(|_| ConfigError::InvalidUrl(var, raw.clone()))?)
            }
            None => None,
        };

        let timeout = match env::var("VISION_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
        {
            Some(secs) if secs > 0 => Duration::from_secs(secs),
            _ => provider.default_timeout(),
        };

        Ok(VisionConfig {
            provider,
            api_key: non_empty(provider.key_var()),
            model: non_empty("VISION_MODEL").unwrap_or_else(|| provider.default_model().to_string()),
            timeout,
            base_url,
        })
    }
}

//! Vision model backends: "given image bytes and an instruction, return text or a typed failure".
//!
//! No backend retries. A failed call is terminal for the photo that triggered it.

pub mod gemini;
pub mod groq;
pub mod openai;

use crate::config::{VisionConfig, VisionProvider};
use crate::photo::IncomingPhoto;
use async_trait::async_trait;
use std::{sync::Arc, time::Duration};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum VisionError {
    #[error("HTTP request error: {0}")]
    Transport(reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("vision request timed out after {0:?}")]
    Timeout(Duration),
    #[error("model returned no text")]
    EmptyResponse,
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("model client error: {0}")]
    Client(String),
}

impl VisionError {
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            VisionError::Timeout(timeout)
        } else {
            VisionError::Transport(err)
        }
    }
}

#[async_trait]
pub trait VisionBackend: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &str;

    async fn describe(
        &self,
        photo: &IncomingPhoto,
        instruction: &str,
    ) -> Result<String, VisionError>;
}

/// Error bodies can be large HTML pages; keep logs and errors readable.
pub(crate) fn truncate_for_log(value: &str, limit: usize) -> String {
    if value.chars().count() <= limit {
        return value.to_string();
    }
    let truncated: String = value.chars().take(limit).collect();
    format!("{truncated}... (truncated)")
}

/// Build the configured backend, or `None` when its API key is missing.
pub fn build_backend(cfg: &VisionConfig) -> Result<Option<Arc<dyn VisionBackend>>, VisionError> {
    let Some(api_key) = cfg.api_key.clone() else {
        warn!(
            "{} is not set; photos will be answered with a configuration warning",
            cfg.provider.key_var()
        );
        return Ok(None);
    };

    let backend: Arc<dyn VisionBackend> = match cfg.provider {
        VisionProvider::Gemini => Arc::new(gemini::Gemini::new(
            api_key,
            cfg.model.clone(),
            cfg.base_url.clone(),
            cfg.timeout,
        )?),
        VisionProvider::OpenAi => Arc::new(openai::OpenAiVision::new(
            api_key,
            cfg.model.clone(),
            cfg.base_url.clone(),
            cfg.timeout,
        )?),
        VisionProvider::Groq => Arc::new(groq::GroqVision::new(
            api_key,
            cfg.model.clone(),
            cfg.timeout,
        )?),
    };

    info!(
        "Vision backend: {} (model = {}, timeout = {:?})",
        backend.name(),
        cfg.model,
        cfg.timeout
    );
    Ok(Some(backend))
}

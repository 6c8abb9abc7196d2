mod types;
use super::{VisionBackend, VisionError, truncate_for_log};
use crate::photo::IncomingPhoto;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};
pub use types::*;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub struct Gemini {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl Gemini {
    pub fn new(
        api_key: String,
        model: String,
        base_url: Option<url::Url>,
        timeout: Duration,
    ) -> Result<Gemini, VisionError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(VisionError::Transport)?;
        let base_url = base_url
            .map(|u| u.as_str().trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Gemini {
            client,
            api_key,
            model,
            base_url,
            timeout,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl VisionBackend for Gemini {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn describe(
        &self,
        photo: &IncomingPhoto,
        instruction: &str,
    ) -> Result<String, VisionError> {
        let request_body =
            GenerateContentRequest::describe_image(instruction, photo.mime_type(), photo.base64());

        let res = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request_body)
            .send()
            .await
            .map_err(|e| VisionError::from_reqwest(e.without_url(), self.timeout))?;

        let status = res.status();
        let body_text = res
            .text()
            .await
            .map_err(|e| VisionError::from_reqwest(e.without_url(), self.timeout))?;

        if !status.is_success() {
            return Err(VisionError::Status {
                status: status.as_u16(),
                body: truncate_for_log(&body_text, 500),
            });
        }

        let parsed = serde_json::from_str::<GenerateContentResponse>(&body_text).map_err(|e| {
            VisionError::Decode(format!(
                "JSON deserialization mismatch: {e}; body: {}",
                truncate_for_log(&body_text, 500)
            ))
        })?;

        match parsed.first_candidate_text() {
            Some(text) => {
                debug!(chars = text.chars().count(), "gemini answered");
                Ok(text)
            }
            None => {
                warn!(
                    finish_reason = parsed.finish_reason().unwrap_or("<none>"),
                    "gemini returned no text"
                );
                Err(VisionError::EmptyResponse)
            }
        }
    }
}

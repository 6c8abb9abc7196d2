// Chat-completions backend: the image travels as a base64 data URL next to the instruction.

use super::{VisionBackend, VisionError, truncate_for_log};
use crate::photo::IncomingPhoto;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Serialize, Debug)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
}

#[derive(Serialize, Debug)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: Vec<ContentPart>,
}

#[derive(Serialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize, Debug)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Deserialize, Debug)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Deserialize, Debug)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

impl<'a> ChatRequest<'a> {
    pub fn describe_image(model: &'a str, instruction: &str, data_url: String) -> Self {
        ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: instruction.to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: data_url },
                    },
                ],
            }],
            max_tokens: 1500,
        }
    }
}

impl ChatResponse {
    /// `choices[0].message.content`, if it holds any text.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()?
            .message
            .content
            .as_deref()
            .filter(|t| !t.trim().is_empty())
    }
}

pub struct OpenAiVision {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
    timeout: Duration,
}

impl OpenAiVision {
    pub fn new(
        api_key: String,
        model: String,
        base_url: Option<url::Url>,
        timeout: Duration,
    ) -> Result<Self, VisionError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(VisionError::Transport)?;
        let base = base_url
            .map(|u| u.as_str().trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(OpenAiVision {
            client,
            api_key,
            model,
            endpoint: format!("{base}/chat/completions"),
            timeout,
        })
    }
}

#[async_trait]
impl VisionBackend for OpenAiVision {
    fn name(&self) -> &str {
        "openai"
    }

    async fn describe(
        &self,
        photo: &IncomingPhoto,
        instruction: &str,
    ) -> Result<String, VisionError> {
        let body = ChatRequest::describe_image(&self.model, instruction, photo.data_url());

        let res = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| VisionError::from_reqwest(e, self.timeout))?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(VisionError::Status {
                status: status.as_u16(),
                body: truncate_for_log(&text, 500),
            });
        }

        let parsed: ChatResponse = res.json().await.map_err(|e| {
            if e.is_timeout() {
                VisionError::Timeout(self.timeout)
            } else {
                VisionError::Decode(e.to_string())
            }
        })?;

        let text = parsed
            .first_content()
            .ok_or(VisionError::EmptyResponse)?
            .to_string();
        debug!(chars = text.chars().count(), "openai answered");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_body_has_text_and_data_url() {
        let req = ChatRequest::describe_image(
            "gpt-4o-mini",
            "describe",
            "data:image/jpeg;base64,AAAA".into(),
        );
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["model"], "gpt-4o-mini");
        assert_eq!(v["messages"][0]["role"], "user");
        assert_eq!(v["messages"][0]["content"][0]["type"], "text");
        assert_eq!(v["messages"][0]["content"][0]["text"], "describe");
        assert_eq!(v["messages"][0]["content"][1]["type"], "image_url");
        assert_eq!(
            v["messages"][0]["content"][1]["image_url"]["url"],
            "data:image/jpeg;base64,AAAA"
        );
    }

    #[test]
    fn reads_first_choice_content() {
        let resp: ChatResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": "[EN]: a dog" } }]
        }))
        .unwrap();
        assert_eq!(resp.first_content(), Some("[EN]: a dog"));
    }

    #[test]
    fn missing_or_blank_content_is_none() {
        let resp: ChatResponse = serde_json::from_value(json!({ "choices": [] })).unwrap();
        assert!(resp.first_content().is_none());

        let resp: ChatResponse = serde_json::from_value(json!({
            "choices": [{ "message": { "content": "  " } }]
        }))
        .unwrap();
        assert!(resp.first_content().is_none());
    }

    #[test]
    fn endpoint_respects_base_url() {
        let backend = OpenAiVision::new(
            "k".into(),
            "m".into(),
            Some(url::Url::parse("http://127.0.0.1:9999/v1/").unwrap()),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(backend.endpoint, "http://127.0.0.1:9999/v1/chat/completions");
    }
}

// Client-library backend: sends the photo through the groqai chat API.

use super::{VisionBackend, VisionError};
use crate::photo::IncomingPhoto;
use async_trait::async_trait;
use groqai::{ChatMessage, GroqClient, ImageUrl, MessageContent, MessagePart, Role};
use std::time::Duration;
use tracing::debug;

pub struct GroqVision {
    client: GroqClient,
    model: String,
    timeout: Duration,
}

impl GroqVision {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<Self, VisionError> {
        let client = GroqClient::with_api_key(api_key)
            .map_err(|e| VisionError::Client(format!("the Groq client could not be started: {e}")))?;
        Ok(GroqVision {
            client,
            model,
            timeout,
        })
    }
}

// Extracts usable text from a MessageContent structure.
fn extract_text_from_message_content(mc: &MessageContent) -> Option<String> {
    match mc {
        MessageContent::Text(s) => {
            if s.trim().is_empty() {
                None
            } else {
                Some(s.clone())
            }
        }
        MessageContent::Parts(parts) => {
            let mut out = String::new();
            for p in parts {
                if let MessagePart::Text { text } = p
                    && !text.trim().is_empty()
                {
                    if !out.is_empty() {
                        out.push('\n');
                    }
                    out.push_str(text.trim());
                }
            }
            if out.is_empty() { None } else { Some(out) }
        }
        _ => None,
    }
}

#[async_trait]
impl VisionBackend for GroqVision {
    fn name(&self) -> &str {
        "groq"
    }

    async fn describe(
        &self,
        photo: &IncomingPhoto,
        instruction: &str,
    ) -> Result<String, VisionError> {
        // Text first, image second.
        let vision_msg = ChatMessage {
            role: Role::User,
            content: MessageContent::Parts(vec![
                MessagePart::Text {
                    text: instruction.to_string(),
                },
                MessagePart::ImageUrl {
                    image_url: ImageUrl::new(photo.data_url()),
                },
            ]),
            tool_calls: None,
            tool_call_id: None,
        };

        let call = self
            .client
            .chat(&self.model)
            .messages(vec![vision_msg])
            .max_completion_tokens(1500)
            .temperature(0.4)
            .send();

        let resp = tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| VisionError::Timeout(self.timeout))?
            .map_err(|e| VisionError::Client(e.to_string()))?;

        let choice = resp.choices.first().ok_or(VisionError::EmptyResponse)?;
        let text =
            extract_text_from_message_content(&choice.message.content).ok_or(VisionError::EmptyResponse)?;
        debug!(chars = text.chars().count(), "groq answered");
        Ok(text)
    }
}

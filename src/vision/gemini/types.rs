// Payload and responses types

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// INPUT TYPES
// =============================================================================

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InputBlob {
    pub mime_type: String,
    pub data: String, // Base64 string
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub enum InputPart {
    #[serde(rename = "text")]
    Text(String),

    #[serde(rename = "inlineData")]
    InlineData(InputBlob),
}

#[derive(Serialize, Debug, Clone)]
pub struct InputContent {
    pub role: String,
    pub parts: Vec<InputPart>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<InputContent>,
    pub generation_config: GenerationConfig,
}

// =============================================================================
// RESPONSE TYPES
// =============================================================================

// Piece of response content, usually contains text.
#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePart {
    // Text returned by the model, if present.
    pub text: Option<String>,

    // Catch-all for any other unexpected fields.
    #[serde(flatten)]
    pub other: Value,
}

// Content wrapper in a candidate.
#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ResponseContent {
    // Parts may be absent, e.g. when the candidate was blocked.
    pub parts: Option<Vec<ResponsePart>>,

    #[serde(flatten)]
    pub other: Value,
}

// Candidate from the model (one of possible completions).
#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<ResponseContent>,

    // Set to e.g. "SAFETY" when the answer was withheld.
    pub finish_reason: Option<String>,

    #[serde(flatten)]
    pub other: Value,
}

// Top-level response for generateContent.
#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    pub candidates: Option<Vec<Candidate>>,

    // Catch-all for other top-level fields (usage, prompt feedback, etc.).
    #[serde(flatten)]
    pub other: Value,
}

// =============================================================================
// HELPER IMPLEMENTATIONS
// =============================================================================

impl GenerateContentRequest {
    /// One user turn: the instruction first, the image second.
    pub fn describe_image(instruction: &str, mime_type: &str, data_b64: String) -> Self {
        GenerateContentRequest {
            contents: vec![InputContent {
                role: "user".to_string(),
                parts: vec![
                    InputPart::Text(instruction.to_string()),
                    InputPart::InlineData(InputBlob {
                        mime_type: mime_type.to_string(),
                        data: data_b64,
                    }),
                ],
            }],
            generation_config: GenerationConfig {
                temperature: 0.4,
                max_output_tokens: 2048,
            },
        }
    }
}

impl GenerateContentResponse {
    // Return concatenated text from the first candidate's parts.
    pub fn first_candidate_text(&self) -> Option<String> {
        let candidate = self.candidates.as_ref()?.first()?;
        let parts = candidate.content.as_ref()?.parts.as_ref()?;

        let text: String = parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() { None } else { Some(text) }
    }

    pub fn finish_reason(&self) -> Option<&str> {
        self.candidates
            .as_ref()?
            .first()?
            .finish_reason
            .as_deref()
    }
}

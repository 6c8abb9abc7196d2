//! Renders prompt records and button follow-ups as Telegram HTML.

use crate::{actions::ButtonAction, parser::PromptRecord};
use html_escape::encode_text;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

pub const DEFAULT_PREVIEW_CHARS: usize = 150;
/// Largest preview that keeps the four-section summary inside one message.
pub const MAX_PREVIEW_CHARS: usize = 900;
/// Telegram's limit on message text, counted after entity parsing.
pub const MAX_MESSAGE_CHARS: usize = 4096;
// Copy replies are cut below the limit to leave room for the code entity.
const COPY_CHUNK_CHARS: usize = 4000;

pub const WELCOME_TEXT: &str = "📸 أهلاً بك! أرسل لي أي صورة وسأعطيك الوصف (Prompt) الخاص بها.\n\n\
Welcome! Send me any photo and I will write a text-to-image prompt for it. Use /help to see what I can do.";

pub const HELP_TEXT: &str = "How it works:\n\
1. Send a photo (as a photo, not as a file).\n\
2. I describe it as a prompt in English, Arabic, an enhanced variant and keywords.\n\
3. Use the buttons under the answer to get each part in full, ready to copy.";

pub const PROCESSING_TEXT: &str = "⏳ Analyzing your image...";
pub const MISSING_KEY_TEXT: &str = "⚠️ The image model API key is not configured, so photos cannot be analyzed right now.";
pub const FAILURE_TEXT: &str = "❌ حدث خطأ أثناء المعالجة. Something went wrong while analyzing the image, please try again.";
pub const SEND_PHOTO_TEXT: &str = "Send me a photo and I will turn it into a prompt. Use /help for details.";
pub const SESSION_EXPIRED_TEXT: &str = "⌛ This prompt is no longer available. Send the photo again to get a fresh one.";
pub const UNKNOWN_ACTION_TEXT: &str = "This button is no longer supported.";

/// First `max_chars` characters of `text`, with an ellipsis when something was cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}…", cut.trim_end())
}

fn section(out: &mut String, title: &str, body: &str, max_chars: usize) {
    out.push_str(&format!(
        "<b>{}</b>\n{}\n\n",
        title,
        encode_text(&preview(body, max_chars))
    ));
}

/// Split `text` into pieces of at most `max_chars` characters.
///
/// Cuts after the last newline, else the last space, of each window; a window
/// without either is cut hard. Concatenating the pieces gives back `text`.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut rest = text;
    while rest.chars().count() > max_chars {
        let hard = rest
            .char_indices()
            .nth(max_chars)
            .map_or(rest.len(), |(i, _)| i);
        let window = &rest[..hard];
        let cut = window
            .rfind('\n')
            .or_else(|| window.rfind(' '))
            .map_or(hard, |i| i + 1);
        chunks.push(rest[..cut].to_string());
        rest = &rest[cut..];
    }
    if !rest.is_empty() || chunks.is_empty() {
        chunks.push(rest.to_string());
    }
    chunks
}

/// Labeled summary of every field, each cut to `preview_chars` (at most [`MAX_PREVIEW_CHARS`]).
pub fn compose_summary(record: &PromptRecord, preview_chars: usize) -> String {
    let preview_chars = preview_chars.min(MAX_PREVIEW_CHARS);
    let mut out = String::from("✅ <b>Prompt ready</b>\n\n");
    section(&mut out, "🇬🇧 English", &record.english, preview_chars);
    section(&mut out, "🇸🇦 Arabic", &record.arabic, preview_chars);
    section(&mut out, "✨ Enhanced", &record.enhanced, preview_chars);
    section(&mut out, "🏷 Keywords", &record.keywords, preview_chars);
    out.push_str("<i>Use the buttons below for the full text.</i>");
    out
}

fn button(label: &str, action: ButtonAction) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(label, action.tag())
}

pub fn prompt_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            button("📋 English", ButtonAction::CopyEn),
            button("📋 العربية", ButtonAction::CopyAr),
        ],
        vec![
            button("✨ Enhanced", ButtonAction::CopyEnhanced),
            button("🏷 Keywords", ButtonAction::CopyKeywords),
        ],
        vec![
            button("🔄 Regenerate", ButtonAction::Regenerate),
            button("🎨 Generate image", ButtonAction::GenerateImage),
        ],
        vec![
            button("💾 Save", ButtonAction::SavePrompt),
            button("❓ Help", ButtonAction::Help),
        ],
    ])
}

/// Messages sent in response to a button press, in order.
///
/// Copy actions return the complete field, split over several messages when it
/// is longer than Telegram allows; `record` is `None` when the session expired.
pub fn compose_action_reply(action: ButtonAction, record: Option<&PromptRecord>) -> Vec<String> {
    if let Some(field) = action.field() {
        return match record {
            Some(r) => split_text(r.get(field), COPY_CHUNK_CHARS)
                .iter()
                .map(|chunk| format!("<code>{}</code>", encode_text(chunk)))
                .collect(),
            None => vec![SESSION_EXPIRED_TEXT.to_string()],
        };
    }

    let text = match action {
        ButtonAction::Regenerate => {
            "🔄 Regeneration is not available yet. Send the photo again for a new prompt.".to_string()
        }
        ButtonAction::GenerateImage => "🎨 Image generation is coming soon.".to_string(),
        ButtonAction::SavePrompt => "💾 Saving prompts is coming soon.".to_string(),
        _ => encode_text(HELP_TEXT).into_owned(),
    };
    vec![text]
}

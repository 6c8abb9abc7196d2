use crate::parser::Field;
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Inline button tags. The callback data carries only the tag; the text it
/// refers to is looked up in the user's session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    CopyEn,
    CopyAr,
    CopyEnhanced,
    CopyKeywords,
    Regenerate,
    GenerateImage,
    SavePrompt,
    Help,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown button action: {0}")]
pub struct ParseActionError(pub String);

impl ButtonAction {
    pub const ALL: [ButtonAction; 8] = [
        ButtonAction::CopyEn,
        ButtonAction::CopyAr,
        ButtonAction::CopyEnhanced,
        ButtonAction::CopyKeywords,
        ButtonAction::Regenerate,
        ButtonAction::GenerateImage,
        ButtonAction::SavePrompt,
        ButtonAction::Help,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            ButtonAction::CopyEn => "copy_en",
            ButtonAction::CopyAr => "copy_ar",
            ButtonAction::CopyEnhanced => "copy_enhanced",
            ButtonAction::CopyKeywords => "copy_keywords",
            ButtonAction::Regenerate => "regenerate",
            ButtonAction::GenerateImage => "generate_image",
            ButtonAction::SavePrompt => "save_prompt",
            ButtonAction::Help => "help",
        }
    }

    /// The record field a copy action returns, `None` for the other actions.
    pub fn field(self) -> Option<Field> {
        match self {
            ButtonAction::CopyEn => Some(Field::English),
            ButtonAction::CopyAr => Some(Field::Arabic),
            ButtonAction::CopyEnhanced => Some(Field::Enhanced),
            ButtonAction::CopyKeywords => Some(Field::Keywords),
            _ => None,
        }
    }
}

impl fmt::Display for ButtonAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ButtonAction {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ButtonAction::ALL
            .into_iter()
            .find(|a| a.tag() == s.trim())
            .ok_or_else(|| ParseActionError(s.to_string()))
    }
}

//! Splits the free-text answer of the vision model into a [`PromptRecord`].
//!
//! A marker line (`[EN]: ...`, `**English Prompt:** ...`) opens a section. The
//! section's value is the text after the marker on the same line plus every
//! following non-marker line, up to the next marker. A marker left alone on its
//! line therefore takes the lines below it.
//!
//! The model's output format is not guaranteed, so parsing never fails: any
//! field still missing after the scan gets fallback text derived from the raw
//! answer or from the English field.

use once_cell::sync::Lazy;
use regex::Regex;

/// Number of characters of raw model output used as the English prompt when no marker was found.
pub const FALLBACK_ENGLISH_CHARS: usize = 500;

pub const ENGLISH_PLACEHOLDER: &str = "No description could be generated for this image.";
pub const KEYWORDS_PLACEHOLDER: &str = "No keywords available.";

const ENHANCED_SUFFIX: &str = "ultra-detailed, cinematic lighting, sharp focus, 8k, masterpiece";
const ARABIC_PREFIX: &str = "(الترجمة العربية غير متوفرة)";

/// The four parts of a generated image prompt. Every field is always populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRecord {
    pub english: String,
    pub arabic: String,
    pub enhanced: String,
    pub keywords: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    English,
    Arabic,
    Enhanced,
    Keywords,
}

impl PromptRecord {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::English => &self.english,
            Field::Arabic => &self.arabic,
            Field::Enhanced => &self.enhanced,
            Field::Keywords => &self.keywords,
        }
    }
}

// `[EN]: text`, `**[AR]** text`; the colon is optional after a bracket tag.
static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:[#>*\-]+\s+)?(?:\*\*|__)?\s*\[(?P<name>[A-Za-z_ ]+)\]\s*(?:\*\*|__)?\s*:?\s*(?:\*\*|__)?\s*(?P<rest>.*)$")
        .expect("valid tag regex")
});

// `English Prompt: text`, `**Arabic:** text`, `### Keywords: text`; the colon is required.
static LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:[#>*\-]+\s+)?(?:\*\*|__)?\s*(?P<name>[A-Za-z][A-Za-z ]{0,30}?)\s*(?:\*\*|__)?\s*:\s*(?:\*\*|__)?\s*(?P<rest>.*)$")
        .expect("valid label regex")
});

fn field_for_tag(name: &str) -> Option<Field> {
    match name.trim().to_ascii_uppercase().as_str() {
        "EN" | "ENGLISH" => Some(Field::English),
        "AR" | "ARABIC" => Some(Field::Arabic),
        "ENHANCED" | "ARTISTIC" => Some(Field::Enhanced),
        "KEYWORDS" | "TAGS" => Some(Field::Keywords),
        _ => None,
    }
}

fn field_for_label(name: &str) -> Option<Field> {
    match name.trim().to_ascii_lowercase().as_str() {
        "english" | "english prompt" | "english description" => Some(Field::English),
        "arabic" | "arabic prompt" | "arabic translation" => Some(Field::Arabic),
        "enhanced" | "enhanced prompt" | "artistic" | "artistic prompt" => Some(Field::Enhanced),
        "keywords" | "tags" => Some(Field::Keywords),
        _ => None,
    }
}

/// Recognizes a marker line, returning the field it opens and the text after the marker.
pub fn match_marker(line: &str) -> Option<(Field, &str)> {
    if let Some(caps) = TAG_RE.captures(line)
        && let Some(field) = field_for_tag(&caps["name"])
    {
        return caps.name("rest").map(|m| (field, m.as_str()));
    }
    if let Some(caps) = LABEL_RE.captures(line)
        && let Some(field) = field_for_label(&caps["name"])
    {
        return caps.name("rest").map(|m| (field, m.as_str()));
    }
    None
}

#[derive(Default)]
struct Sections {
    english: Option<String>,
    arabic: Option<String>,
    enhanced: Option<String>,
    keywords: Option<String>,
}

impl Sections {
    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::English => &mut self.english,
            Field::Arabic => &mut self.arabic,
            Field::Enhanced => &mut self.enhanced,
            Field::Keywords => &mut self.keywords,
        }
    }

    // First non-empty occurrence of a marker wins.
    fn commit(&mut self, field: Field, lines: &[&str]) {
        let value = lines.join("\n").trim().to_string();
        let slot = self.slot(field);
        if slot.is_none() && !value.is_empty() {
            *slot = Some(value);
        }
    }
}

fn take_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

/// Parse raw model output into a fully populated [`PromptRecord`].
pub fn parse_prompt_response(raw: &str) -> PromptRecord {
    let mut sections = Sections::default();
    let mut current: Option<(Field, Vec<&str>)> = None;

    for line in raw.lines() {
        if let Some((field, rest)) = match_marker(line) {
            if let Some((open, lines)) = current.take() {
                sections.commit(open, &lines);
            }
            current = Some((field, vec![rest]));
        } else if let Some((_, lines)) = current.as_mut() {
            lines.push(line);
        }
    }
    if let Some((open, lines)) = current.take() {
        sections.commit(open, &lines);
    }

    let english = sections.english.unwrap_or_else(|| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            ENGLISH_PLACEHOLDER.to_string()
        } else {
            take_chars(trimmed, FALLBACK_ENGLISH_CHARS).trim_end().to_string()
        }
    });
    let enhanced = sections
        .enhanced
        .unwrap_or_else(|| format!("{english}, {ENHANCED_SUFFIX}"));
    let arabic = sections
        .arabic
        .unwrap_or_else(|| format!("{ARABIC_PREFIX} {english}"));
    let keywords = sections
        .keywords
        .unwrap_or_else(|| KEYWORDS_PLACEHOLDER.to_string());

    PromptRecord {
        english,
        arabic,
        enhanced,
        keywords,
    }
}

// Downloads the photo attached to a Telegram message and checks that it decodes.

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use image::ImageFormat;
use teloxide::{
    DownloadError,
    net::Download,
    prelude::*,
    types::{FileId, Message, PhotoSize},
};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum PhotoError {
    #[error("message has no photo")]
    NoPhoto,
    #[error("telegram get_file failed: {0}")]
    Telegram(#[from] teloxide::RequestError),
    #[error("photo download failed: {0}")]
    Download(#[from] DownloadError),
    #[error("photo could not be decoded: {0}")]
    Decode(#[from] image::ImageError),
}

/// An in-memory image ready to be sent to a vision model.
#[derive(Debug, Clone)]
pub struct IncomingPhoto {
    bytes: Vec<u8>,
    format: ImageFormat,
}

impl IncomingPhoto {
    /// Detects the format and decodes the image once, so malformed uploads fail here.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, PhotoError> {
        let format = image::guess_format(&bytes)?;
        let decoded = image::load_from_memory_with_format(&bytes, format)?;
        debug!(
            width = decoded.width(),
            height = decoded.height(),
            ?format,
            "decoded incoming photo"
        );
        Ok(IncomingPhoto { bytes, format })
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }

    pub fn base64(&self) -> String {
        general_purpose::STANDARD.encode(&self.bytes)
    }

    /// `data:<mime>;base64,<payload>` as accepted by OpenAI-style image parts.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), self.base64())
    }
}

/// Telegram lists sizes smallest first; prefer the biggest area, later entries on ties.
pub fn largest_photo(sizes: &[PhotoSize]) -> Option<&PhotoSize> {
    sizes
        .iter()
        .enumerate()
        .max_by_key(|(i, p)| (u64::from(p.width) * u64::from(p.height), *i))
        .map(|(_, p)| p)
}

// Returns the FileId of the largest available photo in the message.
pub fn largest_photo_file_id(msg: &Message) -> Option<FileId> {
    msg.photo()
        .and_then(largest_photo)
        .map(|p| p.file.id.clone())
}

/// Fetch the message's largest photo into memory. No size cap is applied.
pub async fn download_photo(bot: &Bot, msg: &Message) -> Result<Vec<u8>, PhotoError> {
    let file_id = largest_photo_file_id(msg).ok_or(PhotoError::NoPhoto)?;
    let file = bot.get_file(file_id).await?;
    let mut buf: Vec<u8> = Vec::new();
    bot.download_file(&file.path, &mut buf).await?;
    debug!(bytes = buf.len(), path = %file.path, "downloaded photo");
    Ok(buf)
}

/// Where the handlers get photo bytes from. Telegram in production.
#[async_trait]
pub trait PhotoSource: Send + Sync {
    async fn fetch(&self, bot: &Bot, msg: &Message) -> Result<Vec<u8>, PhotoError>;
}

pub struct TelegramPhotos;

#[async_trait]
impl PhotoSource for TelegramPhotos {
    async fn fetch(&self, bot: &Bot, msg: &Message) -> Result<Vec<u8>, PhotoError> {
        download_photo(bot, msg).await
    }
}

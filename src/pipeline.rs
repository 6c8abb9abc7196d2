// Photo-to-prompt pipeline shared by the handlers: decode, ask the model, parse, remember.

use crate::{
    config::AppConfig,
    parser::{PromptRecord, parse_prompt_response},
    photo::{IncomingPhoto, PhotoError, PhotoSource, TelegramPhotos},
    prompts::Prompt,
    reply::DEFAULT_PREVIEW_CHARS,
    session::SessionStore,
    vision::{VisionBackend, VisionError},
};
use std::{sync::Arc, time::Duration};
use thiserror::Error;
use tracing::{error, info};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("vision model is not configured")]
    NotConfigured,
    #[error(transparent)]
    Photo(#[from] PhotoError),
    #[error(transparent)]
    Vision(#[from] VisionError),
}

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub backend: Option<Arc<dyn VisionBackend>>,
    pub photos: Arc<dyn PhotoSource>,
    pub sessions: SessionStore,
    pub preview_chars: usize,
}

impl AppState {
    pub fn new(backend: Option<Arc<dyn VisionBackend>>, sessions: SessionStore) -> Self {
        AppState {
            backend,
            photos: Arc::new(TelegramPhotos),
            sessions,
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }

    /// Replace the Telegram download, e.g. with canned bytes in tests.
    pub fn with_photo_source(mut self, photos: Arc<dyn PhotoSource>) -> Self {
        self.photos = photos;
        self
    }

    pub fn from_config(cfg: &AppConfig, backend: Option<Arc<dyn VisionBackend>>) -> Self {
        AppState {
            backend,
            photos: Arc::new(TelegramPhotos),
            sessions: SessionStore::new(cfg.session_ttl, cfg.session_capacity),
            preview_chars: cfg.preview_chars,
        }
    }

    /// State without a model, handy for tests and dry runs.
    pub fn unconfigured() -> Self {
        Self::new(None, SessionStore::new(Duration::from_secs(3600), 1000))
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    /// Turn downloaded photo bytes into a prompt record and remember it for `user_id`.
    ///
    /// The session is written only on success; on error the previous record stays.
    pub async fn process_photo(
        &self,
        user_id: u64,
        bytes: Vec<u8>,
    ) -> Result<PromptRecord, PipelineError> {
        let backend = self.backend.as_ref().ok_or(PipelineError::NotConfigured)?;

        let photo = IncomingPhoto::from_bytes(bytes)?;
        let raw = backend
            .describe(&photo, Prompt::DescribeImage.text())
            .await
            .inspect_err(|e| error!(backend = backend.name(), "vision call failed: {e}"))?;

        let record = parse_prompt_response(&raw);
        self.sessions.insert(user_id, record.clone());
        info!(user_id, backend = backend.name(), "prompt generated");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photo::tests::tiny_jpeg;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Scripted {
        answer: Result<&'static str, u16>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(answer: Result<&'static str, u16>) -> Arc<Self> {
            Arc::new(Scripted {
                answer,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl VisionBackend for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn describe(
            &self,
            _photo: &IncomingPhoto,
            instruction: &str,
        ) -> Result<String, VisionError> {
            assert!(instruction.contains("[KEYWORDS]:"));
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.answer {
                Ok(text) => Ok(text.to_string()),
                Err(status) => Err(VisionError::Status {
                    status,
                    body: "unauthorized".to_string(),
                }),
            }
        }
    }

    fn state(backend: Arc<Scripted>) -> AppState {
        AppState::new(
            Some(backend as Arc<dyn VisionBackend>),
            SessionStore::new(Duration::from_secs(60), 10),
        )
    }

    #[tokio::test]
    async fn success_parses_and_stores_session() {
        let backend = Scripted::new(Ok(
            "[EN]: a red bicycle\n[AR]: دراجة حمراء\n[KEYWORDS]: bike, red, outdoor",
        ));
        let state = state(backend.clone());

        let record = state.process_photo(42, tiny_jpeg()).await.unwrap();
        assert_eq!(record.english, "a red bicycle");
        assert_eq!(state.sessions.get(42), Some(record));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn model_failure_keeps_previous_session() {
        let state = state(Scripted::new(Err(401)));
        let previous = parse_prompt_response("[EN]: an old prompt");
        state.sessions.insert(42, previous.clone());

        let err = state.process_photo(42, tiny_jpeg()).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Vision(VisionError::Status { status: 401, .. })
        ));
        assert_eq!(state.sessions.get(42), Some(previous));
    }

    #[tokio::test]
    async fn undecodable_photo_never_reaches_the_model() {
        let backend = Scripted::new(Ok("[EN]: unused"));
        let state = state(backend.clone());

        let err = state
            .process_photo(1, b"not an image".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Photo(PhotoError::Decode(_))));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
        assert!(state.sessions.get(1).is_none());
    }

    #[tokio::test]
    async fn missing_backend_is_reported() {
        let state = AppState::unconfigured();
        let err = state.process_photo(1, tiny_jpeg()).await.unwrap_err();
        assert!(matches!(err, PipelineError::NotConfigured));
    }
}

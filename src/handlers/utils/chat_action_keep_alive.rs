// Keeps "uploading photo"/"typing" visible while the vision model works.

use teloxide::{
    prelude::*,
    types::{ChatAction, ThreadId},
};
use tokio::{
    sync::oneshot,
    task::JoinHandle,
    time::{Duration, interval},
};

pub struct ChatActionKeepAlive {
    // Sender to signal the background task to stop.
    stop_tx: Option<oneshot::Sender<()>>,

    // Handle to the spawned Tokio task.
    handle: Option<JoinHandle<()>>,
}

impl ChatActionKeepAlive {
    // Telegram clears a chat action after ~5s, so re-send it on a shorter ticker.
    pub fn spawn(
        bot: Bot,
        chat_id: ChatId,
        thread_id: Option<ThreadId>,
        action: ChatAction,
        interval_secs: u64,
    ) -> Self {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(interval_secs.max(1)));
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let req = bot.send_chat_action(chat_id, action);
                        let res = match thread_id {
                            Some(tid) => req.message_thread_id(tid).await,
                            None => req.await,
                        };
                        if let Err(err) = res {
                            tracing::warn!("send_chat_action failed: {:?}", err);
                        }
                    }

                    _ = &mut stop_rx => {
                        break;
                    }
                }
            }
        });

        Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }

    // Stop the background task and wait for it to finish.
    pub async fn shutdown(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }

        if let Some(h) = self.handle.take() {
            let _ = h.await;
        }
    }
}

// Fallback cleanup when a handler returns early with `?`.
impl Drop for ChatActionKeepAlive {
    fn drop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }

        if let Some(h) = &self.handle {
            h.abort();
        }
    }
}

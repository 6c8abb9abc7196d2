// Photo messages: download, describe with the vision model, reply with the prompt and its buttons.

use crate::{
    handlers::utils::{ChatActionKeepAlive, extract_user_id, send_reply_or_plain},
    pipeline::{AppState, PipelineError},
    reply::{FAILURE_TEXT, MISSING_KEY_TEXT, PROCESSING_TEXT, compose_summary, prompt_keyboard},
};
use std::sync::Arc;
use teloxide::{prelude::*, types::ChatAction};
use tracing::{error, info, warn};

pub async fn handle_photo(
    bot: Bot,
    msg: Message,
    state: Arc<AppState>,
) -> Result<(), teloxide::RequestError> {
    let chat_id = msg.chat.id;
    info!("Photo received: chat_id = {}", chat_id);

    // No key: warn the user and never call the model.
    if !state.has_backend() {
        send_reply_or_plain(&bot, &msg, MISSING_KEY_TEXT, false, None).await?;
        return Ok(());
    }

    let user_id = match extract_user_id(&msg) {
        Ok(id) => id,
        Err(err_msg) => {
            send_reply_or_plain(&bot, &msg, err_msg, false, None).await?;
            return Ok(());
        }
    };

    let mut keep = ChatActionKeepAlive::spawn(
        bot.clone(),
        chat_id,
        msg.thread_id,
        ChatAction::Typing,
        4,
    );

    let placeholder = match send_reply_or_plain(&bot, &msg, PROCESSING_TEXT, false, None).await {
        Ok(m) => Some(m),
        Err(e) => {
            warn!("Could not send processing message: {e}");
            None
        }
    };

    let outcome: Result<_, PipelineError> = match state.photos.fetch(&bot, &msg).await {
        Ok(bytes) => state.process_photo(user_id, bytes).await,
        Err(e) => Err(e.into()),
    };

    keep.shutdown().await;

    if let Some(p) = placeholder
        && let Err(e) = bot.delete_message(p.chat.id, p.id).await
    {
        warn!("Could not delete processing message: {e}");
    }

    match outcome {
        Ok(record) => {
            let summary = compose_summary(&record, state.preview_chars);
            send_reply_or_plain(&bot, &msg, summary, true, Some(prompt_keyboard())).await?;
        }
        Err(e) => {
            error!(user_id, "Photo analysis failed: {e}");
            send_reply_or_plain(&bot, &msg, FAILURE_TEXT, false, None).await?;
        }
    }

    Ok(())
}

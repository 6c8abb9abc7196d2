// Inline button presses on a prompt reply.

use crate::{
    actions::ButtonAction,
    handlers::utils::{callback_chat_id, callback_thread_id},
    pipeline::AppState,
    reply::{UNKNOWN_ACTION_TEXT, compose_action_reply},
};
use std::sync::Arc;
use teloxide::{
    prelude::*,
    types::{CallbackQuery, ParseMode},
};
use tracing::{debug, warn};

pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> Result<(), teloxide::RequestError> {
    // Clear the button's loading state first.
    bot.answer_callback_query(q.id.clone()).await?;

    let user_id = q.from.id.0;
    let chat_id = callback_chat_id(&q);
    let thread_id = callback_thread_id(&q);
    let data = q.data.as_deref().unwrap_or("");
    debug!(user_id, data, "Callback query received");

    let texts = match data.parse::<ButtonAction>() {
        Ok(action) => {
            let record = state.sessions.get(user_id);
            compose_action_reply(action, record.as_ref())
        }
        Err(e) => {
            warn!(user_id, "{e}");
            vec![UNKNOWN_ACTION_TEXT.to_string()]
        }
    };

    // Long copy replies arrive as several messages.
    for text in texts {
        let mut req = bot.send_message(chat_id, text).parse_mode(ParseMode::Html);
        if let Some(tid) = thread_id {
            req = req.message_thread_id(tid);
        }
        req.await?;
    }

    Ok(())
}

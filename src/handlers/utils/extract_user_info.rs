// Keep message/user extraction logic in one place so handlers stay thin.

use teloxide::types::{CallbackQuery, ChatId, Message, ThreadId};

// Session key for the sender of a message. Channel posts have no sender.
pub fn extract_user_id(msg: &Message) -> Result<u64, String> {
    msg.from
        .as_ref()
        .map(|user| user.id.0)
        .ok_or_else(|| "The user could not be identified.".to_string())
}

// Chat to answer a button press in: the chat of the message carrying the
// keyboard, or the presser's private chat when that message is unavailable.
pub fn callback_chat_id(q: &CallbackQuery) -> ChatId {
    q.message
        .as_ref()
        .map(|m| m.chat().id)
        .unwrap_or_else(|| ChatId::from(q.from.id))
}

// Forum topic of the message carrying the keyboard, so answers stay in that topic.
pub fn callback_thread_id(q: &CallbackQuery) -> Option<ThreadId> {
    q.message
        .as_ref()
        .and_then(|m| m.regular_message())
        .filter(|m| m.chat.title().is_some())
        .and_then(|m| m.thread_id)
}

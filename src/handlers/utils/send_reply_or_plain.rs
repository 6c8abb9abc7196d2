// Sends a reply to a message, handling thread, HTML parsing and an optional keyboard

use teloxide::{
    prelude::*,
    requests::Requester,
    types::{InlineKeyboardMarkup, ParseMode, ReplyParameters, ThreadId},
};

pub async fn send_reply_or_plain(
    bot: &Bot,
    msg: &Message,
    text: impl Into<String>,
    parse_html: bool,
    keyboard: Option<InlineKeyboardMarkup>,
) -> Result<Message, teloxide::RequestError> {
    let chat_id = msg.chat.id;
    let thread_id: Option<ThreadId> = msg.thread_id;

    let mut req = bot.send_message(chat_id, text.into());

    // In groups, quote the photo so the answer is attributable.
    if msg.chat.title().is_some() {
        req = req.reply_parameters(ReplyParameters::new(msg.id).allow_sending_without_reply());
        if let Some(tid) = thread_id {
            req = req.message_thread_id(tid);
        }
    }
    if parse_html {
        req = req.parse_mode(ParseMode::Html);
    }
    if let Some(kb) = keyboard {
        req = req.reply_markup(kb);
    }

    req.await
}

pub mod chat_action_keep_alive;
pub use chat_action_keep_alive::ChatActionKeepAlive;

pub mod extract_user_info;
pub use extract_user_info::{callback_chat_id, callback_thread_id, extract_user_id};

pub mod send_reply_or_plain;
pub use send_reply_or_plain::send_reply_or_plain;

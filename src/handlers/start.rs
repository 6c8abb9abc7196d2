// Program entry for handling the /start command

use crate::{handlers::utils::send_reply_or_plain, reply::WELCOME_TEXT};
use teloxide::prelude::*;
use tracing::error;

pub async fn start(bot: Bot, msg: Message) -> Result<(), teloxide::RequestError> {
    let version = env!("CARGO_PKG_VERSION");
    let message = format!("{WELCOME_TEXT}\n\nphotoprompt-bot v{version}");

    if let Err(e) = send_reply_or_plain(&bot, &msg, message, false, None).await {
        error!("Telegram send failed: {e}");
        return Err(e);
    }

    Ok(())
}

mod callback;
mod photo;
mod start;
pub mod utils;

pub use callback::handle_callback;
pub use photo::handle_photo;
use start::start;

use crate::{
    commands::Command,
    handlers::utils::send_reply_or_plain,
    reply::{HELP_TEXT, SEND_PHOTO_TEXT},
};
use teloxide::{
    dispatching::{UpdateFilterExt, UpdateHandler},
    dptree,
    prelude::*,
    types::Update,
    utils::command::BotCommands,
};
use tracing::info;

pub async fn handle_command(bot: Bot, msg: Message, cmd: Command) -> ResponseResult<()> {
    info!("Command received: chat_id = {}, {:?}", msg.chat.id, cmd);
    match cmd {
        Command::Start => start(bot, msg).await?,
        Command::Help => {
            let text = format!("{HELP_TEXT}\n\n{}", Command::descriptions());
            send_reply_or_plain(&bot, &msg, text, false, None).await?;
        }
    }
    Ok(())
}

// Anything that is neither a command nor a photo. Groups are left alone.
async fn handle_other(bot: Bot, msg: Message) -> ResponseResult<()> {
    if msg.chat.is_private() {
        send_reply_or_plain(&bot, &msg, SEND_PHOTO_TEXT, false, None).await?;
    }
    Ok(())
}

pub fn get_update_handler() -> UpdateHandler<teloxide::RequestError> {
    let messages = Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(dptree::filter(|msg: Message| msg.photo().is_some()).endpoint(handle_photo))
        .branch(dptree::endpoint(handle_other));

    let callbacks = Update::filter_callback_query().endpoint(handle_callback);

    dptree::entry().branch(messages).branch(callbacks)
}

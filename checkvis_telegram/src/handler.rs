use crate::{Error, Result, TelegramBot, parse_request, starts_with_bot_command};
use checkvis_core::{Reply, ReplyFormat, Request};
use teloxide::prelude::*;
use teloxide::types::{ChatAction, ChatId, ParseMode};
use teloxide::{ApiError, RequestError};
use tracing::{debug, info, warn};

/// Handle any inbound message (commands or regular text)
pub async fn handle_message(bot: TelegramBot, msg: Message) -> Result<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let user_id = i64::try_from(user.id.0).map_err(|_| Error::InvalidUserId(user.id.0))?;

    let is_command = msg.entities().is_some_and(starts_with_bot_command);
    let Some(request) = parse_request(text, bot.username(), is_command) else {
        debug!("[{user_id}] Ignoring unknown command: {text}");
        return Ok(());
    };

    // Lookups hit the status page; show typing meanwhile
    if matches!(request, Request::Text(_)) {
        if let Err(e) = bot
            .bot
            .send_chat_action(msg.chat.id, ChatAction::Typing)
            .await
        {
            warn!("[{user_id}] Typing indicator failed: {e}");
        }
    }

    let Some(reply) = bot.handle(user_id, request).await else {
        return Ok(());
    };

    info!("[{user_id}] Response: {}", reply.text);
    send_reply(&bot.bot, msg.chat.id, reply).await
}

/// Send a reply; Markdown Telegram refuses to parse is resent as plain text.
#[allow(deprecated)]
async fn send_reply(bot: &Bot, chat_id: ChatId, reply: Reply) -> Result<()> {
    match reply.format {
        ReplyFormat::Plain => {
            bot.send_message(chat_id, reply.text).await?;
        }
        ReplyFormat::Markdown => {
            let sent = bot
                .send_message(chat_id, reply.text.clone())
                .parse_mode(ParseMode::Markdown)
                .await;
            match sent {
                Ok(_) => {}
                Err(RequestError::Api(ApiError::CantParseEntities(e))) => {
                    warn!("Markdown rejected ({e}), resending as plain text");
                    bot.send_message(chat_id, reply.text).await?;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
    Ok(())
}

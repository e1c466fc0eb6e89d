//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::types::{BotError, HandlerDeps, HandlerError, Sender};
use super::{route_callback, route_command, route_text};
use crate::telegram::bot::Command;
use crate::telegram::callbacks::CallbackAction;
use crate::telegram::reply::{deliver_to_callback, deliver_to_chat, Reply};

const ERROR_TEXT: &str = "❌ Что-то пошло не так, попробуй ещё раз позже";

/// Creates the main dispatcher schema for the Telegram bot.
///
/// Commands are tried first, then menu texts and follow-up input, then
/// button presses.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_commands = deps.clone();
    let deps_messages = deps.clone();
    let deps_callback = deps;

    dptree::entry()
        .branch(command_handler(deps_commands))
        .branch(message_handler(deps_messages))
        .branch(callback_handler(deps_callback))
}

fn log_failure(context: &str, telegram_id: i64, error: &BotError) {
    log::error!("{} failed for user {}: {}", context, telegram_id, error);
}

fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                let Some(sender) = msg.from.as_ref().map(Sender::from_user) else {
                    return Ok(());
                };
                log::info!("Received command {:?} from {}", cmd, sender.telegram_id);

                let replies = route_command(&deps, &sender, &cmd).unwrap_or_else(|e| {
                    log_failure("Command", sender.telegram_id, &e);
                    vec![Reply::text(ERROR_TEXT)]
                });
                deliver_to_chat(&bot, msg.chat.id, replies).await?;
                Ok(())
            }
        },
    ))
}

/// Menu buttons and free-text follow-ups in private chats
fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.chat.is_private() && msg.text().is_some())
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                let (Some(sender), Some(text)) = (msg.from.as_ref().map(Sender::from_user), msg.text()) else {
                    return Ok(());
                };

                let replies = match route_text(&deps, &sender, text) {
                    Ok(Some(replies)) => replies,
                    Ok(None) => {
                        log::debug!("Ignoring text from {}", sender.telegram_id);
                        return Ok(());
                    }
                    Err(e) => {
                        log_failure("Text handler", sender.telegram_id, &e);
                        vec![Reply::text(ERROR_TEXT)]
                    }
                };
                deliver_to_chat(&bot, msg.chat.id, replies).await?;
                Ok(())
            }
        })
}

fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move {
            let sender = Sender::from_user(&q.from);

            let replies = match q.data.as_deref().and_then(CallbackAction::parse) {
                Some(action) => {
                    log::info!("Callback {} from {}", action, sender.telegram_id);
                    route_callback(&deps, &sender, action).unwrap_or_else(|e| {
                        log_failure("Callback", sender.telegram_id, &e);
                        vec![Reply::alert(ERROR_TEXT)]
                    })
                }
                None => {
                    log::debug!("Ignoring unknown callback data {:?}", q.data);
                    Vec::new()
                }
            };
            deliver_to_callback(&bot, &q, replies).await?;
            Ok(())
        }
    })
}

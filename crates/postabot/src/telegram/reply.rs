//! What a handler wants sent back, and the code that sends it
//!
//! Handlers return a list of [`Reply`] values instead of calling the Bot API
//! themselves; [`deliver_to_chat`] and [`deliver_to_callback`] perform the
//! actual requests.

use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardMarkup, KeyboardMarkup, ParseMode, ReplyMarkup};

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// New message in the current chat
    Send { text: String, markup: Option<ReplyMarkup> },
    /// Replace the text (and inline keyboard) of the message the button belongs to
    Edit {
        text: String,
        markup: Option<InlineKeyboardMarkup>,
    },
    /// Remove the message the button belongs to
    Delete,
    /// Popup answer to a button press
    Alert(String),
    /// Message to some other chat, e.g. the owner of a payment
    Notify { chat_id: ChatId, text: String },
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Send {
            text: text.into(),
            markup: None,
        }
    }

    pub fn with_keyboard(text: impl Into<String>, keyboard: KeyboardMarkup) -> Self {
        Self::Send {
            text: text.into(),
            markup: Some(ReplyMarkup::Keyboard(keyboard)),
        }
    }

    pub fn with_inline(text: impl Into<String>, keyboard: InlineKeyboardMarkup) -> Self {
        Self::Send {
            text: text.into(),
            markup: Some(ReplyMarkup::InlineKeyboard(keyboard)),
        }
    }

    pub fn edit(text: impl Into<String>, keyboard: InlineKeyboardMarkup) -> Self {
        Self::Edit {
            text: text.into(),
            markup: Some(keyboard),
        }
    }

    pub fn alert(text: impl Into<String>) -> Self {
        Self::Alert(text.into())
    }
}

async fn send(bot: &Bot, chat_id: ChatId, text: String, markup: Option<ReplyMarkup>) -> ResponseResult<()> {
    let request = bot.send_message(chat_id, text).parse_mode(ParseMode::Html);
    match markup {
        Some(markup) => request.reply_markup(markup).await?,
        None => request.await?,
    };
    Ok(())
}

async fn notify(bot: &Bot, chat_id: ChatId, text: String) {
    // Recipient may have blocked the bot
    if let Err(e) = send(bot, chat_id, text, None).await {
        log::warn!("Failed to notify chat {}: {}", chat_id, e);
    }
}

/// Delivers replies to a text message or command.
pub async fn deliver_to_chat(bot: &Bot, chat_id: ChatId, replies: Vec<Reply>) -> ResponseResult<()> {
    for reply in delivery_order(replies) {
        match reply {
            Reply::Send { text, markup } => send(bot, chat_id, text, markup).await?,
            Reply::Notify { chat_id, text } => notify(bot, chat_id, text).await,
            Reply::Edit { .. } | Reply::Delete | Reply::Alert(_) => {
                log::warn!("Dropping callback-only reply {:?} for chat {}", reply, chat_id);
            }
        }
    }
    Ok(())
}

/// Moves notifications for other chats to the front, keeping relative order.
///
/// Those usually report state that is already committed (an approved
/// payment), so a failure on the pressed message must not hold them back.
pub(crate) fn delivery_order(replies: Vec<Reply>) -> Vec<Reply> {
    let (mut ordered, rest): (Vec<_>, Vec<_>) = replies
        .into_iter()
        .partition(|reply| matches!(reply, Reply::Notify { .. }));
    ordered.extend(rest);
    ordered
}

/// Delivers replies to a button press. The query is answered exactly once,
/// with the first `Alert` as a popup if there is one.
///
/// Failures to answer, edit or delete are logged and the remaining replies
/// still go out; only a failed `Send` aborts delivery.
pub async fn deliver_to_callback(bot: &Bot, q: &CallbackQuery, replies: Vec<Reply>) -> ResponseResult<()> {
    let alert = replies.iter().find_map(|reply| match reply {
        Reply::Alert(text) => Some(text.clone()),
        _ => None,
    });
    let answered = match alert {
        Some(text) => bot.answer_callback_query(q.id.clone()).text(text).show_alert(true).await,
        None => bot.answer_callback_query(q.id.clone()).await,
    };
    if let Err(e) = answered {
        log::warn!("Failed to answer callback query {:?}: {}", q.id, e);
    }

    let chat_id = q.message.as_ref().map(|m| m.chat().id).unwrap_or(ChatId::from(q.from.id));
    let message_id = q.message.as_ref().map(|m| m.id());

    for reply in delivery_order(replies) {
        match (reply, message_id) {
            (Reply::Alert(_), _) => {}
            (Reply::Send { text, markup }, _) => send(bot, chat_id, text, markup).await?,
            (Reply::Notify { chat_id, text }, _) => notify(bot, chat_id, text).await,
            (Reply::Edit { text, markup }, Some(message_id)) => {
                let request = bot
                    .edit_message_text(chat_id, message_id, text)
                    .parse_mode(ParseMode::Html);
                let edited = match markup {
                    Some(markup) => request.reply_markup(markup).await,
                    None => request.await,
                };
                if let Err(e) = edited {
                    log::warn!("Failed to edit message {} in chat {}: {}", message_id, chat_id, e);
                }
            }
            // The press came without its message (inline mode); show the screen as a new message
            (Reply::Edit { text, markup }, None) => {
                send(bot, chat_id, text, markup.map(ReplyMarkup::InlineKeyboard)).await?;
            }
            (Reply::Delete, Some(message_id)) => {
                if let Err(e) = bot.delete_message(chat_id, message_id).await {
                    log::warn!("Failed to delete message {} in chat {}: {}", message_id, chat_id, e);
                }
            }
            (Reply::Delete, None) => {}
        }
    }
    Ok(())
}

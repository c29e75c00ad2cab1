//! Telegram adapter: the teloxide [`Transport`] and update conversion

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{CallbackQueryId, FileId, InputFile, MessageId, UpdateKind};
use teloxide::{ApiError, RequestError};
use tracing::{debug, info};

use crate::transport::{Keyboard, Transport, TransportError};

use super::inbound::{Inbound, IncomingCallback, IncomingMessage, Sender};
use super::ui_builder::to_inline_keyboard;
use super::{process_inbound, BotContext};

/// Outbound calls through the Telegram Bot API
#[derive(Clone)]
pub struct TeloxideTransport {
    bot: Bot,
}

impl TeloxideTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn map_request_error(err: RequestError) -> Result<(), TransportError> {
    match err {
        // Pressing the button of the page already shown
        RequestError::Api(ApiError::MessageNotModified) => Ok(()),
        RequestError::Api(api) => Err(TransportError::Rejected(api.to_string())),
        other => Err(TransportError::Api(other.to_string())),
    }
}

fn finish<T>(result: Result<T, RequestError>) -> Result<(), TransportError> {
    match result {
        Ok(_) => Ok(()),
        Err(e) => map_request_error(e),
    }
}

#[async_trait]
impl Transport for TeloxideTransport {
    async fn send_message(&self, chat_id: i64, text: &str, keyboard: Option<&Keyboard>) -> Result<(), TransportError> {
        let mut request = self.bot.send_message(ChatId(chat_id), text);
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(to_inline_keyboard(keyboard));
        }
        finish(request.await)
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        photo_reference: &str,
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError> {
        let photo = InputFile::file_id(FileId(photo_reference.to_string()));
        let mut request = self.bot.send_photo(ChatId(chat_id), photo).caption(caption);
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(to_inline_keyboard(keyboard));
        }
        finish(request.await)
    }

    async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i32,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError> {
        let mut request = self
            .bot
            .edit_message_text(ChatId(chat_id), MessageId(message_id), text);
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(to_inline_keyboard(keyboard));
        }
        finish(request.await)
    }

    async fn edit_message_caption(
        &self,
        chat_id: i64,
        message_id: i32,
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError> {
        let mut request = self
            .bot
            .edit_message_caption(ChatId(chat_id), MessageId(message_id))
            .caption(caption);
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(to_inline_keyboard(keyboard));
        }
        finish(request.await)
    }

    async fn answer_callback(&self, callback_id: &str, text: Option<&str>) -> Result<(), TransportError> {
        let mut request = self
            .bot
            .answer_callback_query(CallbackQueryId(callback_id.to_string()));
        if let Some(text) = text {
            request = request.text(text);
        }
        finish(request.await)
    }
}

fn sender_of(user: &teloxide::types::User) -> Sender {
    Sender::new(user.id.0 as i64, user.username.as_deref())
}

/// Convert a Telegram message
pub fn incoming_message(msg: &Message) -> IncomingMessage {
    IncomingMessage {
        chat_id: msg.chat.id.0,
        sender: msg.from.as_ref().map(sender_of),
        text: msg.text().map(str::to_string),
        // Sizes are listed smallest first
        photo_reference: msg
            .photo()
            .and_then(|sizes| sizes.last())
            .map(|largest| largest.file.id.0.clone()),
        caption: msg.caption().map(str::to_string),
    }
}

/// Convert a button press
pub fn incoming_callback(q: &CallbackQuery) -> IncomingCallback {
    let message = q.message.as_ref();
    IncomingCallback {
        callback_id: q.id.0.clone(),
        sender: sender_of(&q.from),
        chat_id: message.map(|m| m.chat().id.0),
        message_id: message.map(|m| m.id().0),
        message_has_photo: message
            .and_then(|m| m.regular_message())
            .is_some_and(|m| m.photo().is_some()),
        payload: q.data.clone(),
    }
}

/// Convert any update; unsupported kinds become [`Inbound::Other`]
pub fn inbound_from_update(update: &Update) -> Inbound {
    match &update.kind {
        UpdateKind::Message(msg) => Inbound::Message(incoming_message(msg)),
        UpdateKind::CallbackQuery(q) => Inbound::Callback(incoming_callback(q)),
        _ => Inbound::Other,
    }
}

/// Long-poll Telegram until interrupted
pub async fn run_polling(bot: Bot, ctx: BotContext) {
    info!("Starting long polling dispatcher");

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(|msg: Message, ctx: BotContext| async move {
            debug!(chat_id = msg.chat.id.0, "Received message");
            process_inbound(&ctx, Inbound::Message(incoming_message(&msg))).await;
            Ok::<(), anyhow::Error>(())
        }))
        .branch(Update::filter_callback_query().endpoint(|q: CallbackQuery, ctx: BotContext| async move {
            process_inbound(&ctx, Inbound::Callback(incoming_callback(&q))).await;
            Ok::<(), anyhow::Error>(())
        }));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![ctx])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

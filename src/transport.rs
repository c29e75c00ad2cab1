//! Outbound chat transport
//!
//! Everything the bot says goes through the [`Transport`] trait. Handlers receive
//! it as an injected `Arc<dyn Transport>`; production wires in the teloxide
//! implementation behind a [`GatedTransport`](crate::admission_gate::GatedTransport),
//! tests wire in a recording double.

use async_trait::async_trait;

pub use crate::transport_errors::TransportError;

/// One inline button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardButton {
    pub label: String,
    /// Callback data delivered back when the button is pressed
    pub payload: String,
}

impl KeyboardButton {
    pub fn new(label: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            payload: payload.into(),
        }
    }
}

/// Inline keyboard attached to a message, row by row
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Keyboard {
    pub rows: Vec<Vec<KeyboardButton>>,
}

impl Keyboard {
    pub fn new(rows: Vec<Vec<KeyboardButton>>) -> Self {
        Self { rows }
    }

    /// All payloads in display order
    pub fn payloads(&self) -> Vec<&str> {
        self.rows
            .iter()
            .flat_map(|row| row.iter().map(|button| button.payload.as_str()))
            .collect()
    }
}

/// Outbound calls to the chat platform
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError>;

    /// Send a photo by platform file reference
    async fn send_photo(
        &self,
        chat_id: i64,
        photo_reference: &str,
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError>;

    async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i32,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError>;

    async fn edit_message_caption(
        &self,
        chat_id: i64,
        message_id: i32,
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError>;

    /// Acknowledge a button press, optionally with a short notice
    async fn answer_callback(&self, callback_id: &str, text: Option<&str>) -> Result<(), TransportError>;
}

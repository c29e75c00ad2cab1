//! Platform-independent view of an incoming update

/// The user behind an update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub user_id: i64,
    /// Public username, without the `@`
    pub handle: Option<String>,
}

impl Sender {
    pub fn new(user_id: i64, handle: Option<&str>) -> Self {
        Self {
            user_id,
            handle: handle.map(str::to_string),
        }
    }
}

/// A text or photo message
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IncomingMessage {
    pub chat_id: i64,
    /// Missing for channel posts
    pub sender: Option<Sender>,
    pub text: Option<String>,
    /// File reference of the largest photo size
    pub photo_reference: Option<String>,
    pub caption: Option<String>,
}

/// An inline button press
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingCallback {
    pub callback_id: String,
    pub sender: Sender,
    /// Chat and message the button belongs to; absent when the message is unavailable
    pub chat_id: Option<i64>,
    pub message_id: Option<i32>,
    pub message_has_photo: bool,
    pub payload: Option<String>,
}

/// One inbound update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Message(IncomingMessage),
    Callback(IncomingCallback),
    /// Update kinds the bot does not handle
    Other,
}

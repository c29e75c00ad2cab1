//! Shared helpers for integration tests: a temporary SQLite store and a
//! transport double that records every outbound call.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use charsheet::bot::BotContext;
use charsheet::db;
use charsheet::transport::{Keyboard, Transport, TransportError};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use tempfile::TempDir;

/// A store on a fresh database file; the directory lives as long as the value
pub struct TestStore {
    pub pool: SqlitePool,
    _dir: TempDir,
}

pub async fn test_store() -> Result<TestStore> {
    let dir = tempfile::tempdir()?;
    let options = SqliteConnectOptions::new().filename(dir.path().join("profiles.db"));
    let pool = db::connect_with(options).await?;
    db::init_database_schema(&pool).await?;
    Ok(TestStore { pool, _dir: dir })
}

/// One recorded outbound call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Message {
        chat_id: i64,
        text: String,
        keyboard: Option<Keyboard>,
    },
    Photo {
        chat_id: i64,
        photo_reference: String,
        caption: String,
        keyboard: Option<Keyboard>,
    },
    EditText {
        chat_id: i64,
        message_id: i32,
        text: String,
        keyboard: Option<Keyboard>,
    },
    EditCaption {
        chat_id: i64,
        message_id: i32,
        caption: String,
        keyboard: Option<Keyboard>,
    },
    Answer {
        callback_id: String,
        text: Option<String>,
    },
}

/// Transport double; edits fail with `edit_error` when it is set
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<Sent>>,
    edit_error: Mutex<Option<TransportError>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_edits_with(&self, error: TransportError) {
        *self.edit_error.lock().unwrap() = Some(error);
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    /// Texts of plain messages, in order
    pub fn messages(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Message { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    fn record(&self, sent: Sent) {
        self.sent.lock().unwrap().push(sent);
    }

    fn edit_result(&self) -> Result<(), TransportError> {
        match self.edit_error.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send_message(&self, chat_id: i64, text: &str, keyboard: Option<&Keyboard>) -> Result<(), TransportError> {
        self.record(Sent::Message {
            chat_id,
            text: text.to_string(),
            keyboard: keyboard.cloned(),
        });
        Ok(())
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        photo_reference: &str,
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError> {
        self.record(Sent::Photo {
            chat_id,
            photo_reference: photo_reference.to_string(),
            caption: caption.to_string(),
            keyboard: keyboard.cloned(),
        });
        Ok(())
    }

    async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i32,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError> {
        self.edit_result()?;
        self.record(Sent::EditText {
            chat_id,
            message_id,
            text: text.to_string(),
            keyboard: keyboard.cloned(),
        });
        Ok(())
    }

    async fn edit_message_caption(
        &self,
        chat_id: i64,
        message_id: i32,
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError> {
        self.edit_result()?;
        self.record(Sent::EditCaption {
            chat_id,
            message_id,
            caption: caption.to_string(),
            keyboard: keyboard.cloned(),
        });
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str, text: Option<&str>) -> Result<(), TransportError> {
        self.record(Sent::Answer {
            callback_id: callback_id.to_string(),
            text: text.map(str::to_string),
        });
        Ok(())
    }
}

/// A bot context over a fresh store and a recording transport
pub async fn test_context(admin_user_ids: Vec<i64>) -> Result<(BotContext, Arc<RecordingTransport>, TestStore)> {
    let store = test_store().await?;
    let transport = RecordingTransport::new();
    let ctx = BotContext::new(store.pool.clone(), transport.clone(), admin_user_ids);
    Ok((ctx, transport, store))
}

//! JSONL outbox for outgoing notifications.
//!
//! Each comment, e-mail, push reminder or cancellation is serialized as a
//! single JSON line with a `type` field and `timestamp`, appended to the file
//! via a buffered writer. A separate delivery process can tail the file.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rally_application::{EmailKind, NotificationDispatcher, NotificationError};
use rally_domain::{ActivityId, CommentTarget, Email, Identity, UserId};
use serde_json::{Value, json};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Outbox dispatcher that appends one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every record.
pub struct JsonlOutbox {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlOutbox {
    /// Open the outbox for appending, creating it and its parent
    /// directories if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, NotificationError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, record_type: &str, payload: Value) -> Result<(), NotificationError> {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        let record = if let Value::Object(mut map) = payload {
            map.insert("type".to_string(), Value::String(record_type.to_string()));
            map.insert("timestamp".to_string(), Value::String(timestamp));
            Value::Object(map)
        } else {
            json!({ "type": record_type, "timestamp": timestamp, "data": payload })
        };

        let line = serde_json::to_string(&record)
            .map_err(|e| NotificationError::Delivery(e.to_string()))?;

        let mut writer = self
            .writer
            .lock()
            .map_err(|_| NotificationError::Delivery("outbox lock poisoned".to_string()))?;
        writeln!(writer, "{}", line)?;
        writer.flush()?;
        Ok(())
    }
}

#[async_trait]
impl NotificationDispatcher for JsonlOutbox {
    async fn post_comment(
        &self,
        target: &CommentTarget,
        author: &Identity,
        text: &str,
    ) -> Result<(), NotificationError> {
        self.append(
            "comment",
            json!({ "target": target, "author": author, "text": text }),
        )
    }

    async fn send_email(
        &self,
        kind: EmailKind,
        to: &Email,
        payload: Value,
    ) -> Result<(), NotificationError> {
        self.append(
            "email",
            json!({ "template": kind, "to": to, "payload": payload }),
        )
    }

    async fn schedule_push(
        &self,
        activity: &ActivityId,
        user: &UserId,
        title: &str,
        body: &str,
        fire_at: DateTime<Utc>,
    ) -> Result<(), NotificationError> {
        self.append(
            "push",
            json!({
                "activity": activity,
                "user": user,
                "title": title,
                "body": body,
                "fire_at": fire_at,
            }),
        )
    }

    async fn cancel_reminders(&self, activity: &ActivityId) -> Result<(), NotificationError> {
        self.append("cancel_reminders", json!({ "activity": activity }))
    }
}

impl Drop for JsonlOutbox {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

//! Shared fakes for integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use jobwatch_core::notify::Notification;
use jobwatch_core::{Config, CoreError, MailSource, MessagePayload, Notifier, Pipeline, Result};

/// In-memory mailbox.
#[derive(Clone, Default)]
pub struct FakeMailbox {
    pub messages: Arc<Mutex<Vec<(String, MessagePayload)>>>,
    pub list_calls: Arc<Mutex<Vec<Option<i64>>>>,
    pub broken_id: Arc<Mutex<Option<String>>>,
}

impl FakeMailbox {
    pub fn push_plain(&self, id: &str, body: &str) {
        let payload = MessagePayload::single("text/plain", URL_SAFE_NO_PAD.encode(body));
        self.messages.lock().unwrap().push((id.to_string(), payload));
    }

    pub fn break_message(&self, id: &str) {
        *self.broken_id.lock().unwrap() = Some(id.to_string());
    }

    pub fn list_calls(&self) -> Vec<Option<i64>> {
        self.list_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailSource for FakeMailbox {
    fn name(&self) -> &str {
        "fake"
    }

    async fn list(&self, since: Option<i64>) -> Result<Vec<String>> {
        self.list_calls.lock().unwrap().push(since);
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .map(|(id, _)| id.clone())
            .collect())
    }

    async fn get(&self, message_id: &str) -> Result<MessagePayload> {
        if self.broken_id.lock().unwrap().as_deref() == Some(message_id) {
            return Err(CoreError::Custom(format!("cannot fetch {message_id}")));
        }
        self.messages
            .lock()
            .unwrap()
            .iter()
            .find(|(id, _)| id == message_id)
            .map(|(_, payload)| payload.clone())
            .ok_or_else(|| CoreError::Custom(format!("no message {message_id}")))
    }
}

/// Notifier that remembers every popup.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub shown: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn titles(&self) -> Vec<String> {
        self.shown.lock().unwrap().iter().map(|n| n.title.clone()).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) -> Result<()> {
        self.shown.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

/// Config with both models switched off so nothing touches the network.
pub fn offline_config() -> Config {
    let mut config = Config::default();
    config.summarizer.enabled = false;
    config.ner.enabled = false;
    config
}

pub async fn offline_pipeline(
    dir: &Path,
    mailbox: &FakeMailbox,
    notifier: &RecordingNotifier,
) -> Pipeline {
    Pipeline::load(
        &offline_config(),
        dir,
        Box::new(mailbox.clone()),
        Box::new(notifier.clone()),
    )
    .await
    .unwrap()
}

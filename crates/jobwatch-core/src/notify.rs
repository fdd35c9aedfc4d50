//! Desktop notifications and the persistent notification log.
//!
//! Popups are shortened to fit the platform's body limit; the log always
//! receives the full, untruncated message.

use crate::error::{CoreError, Result};
use crate::storage::{NotificationLog, NotificationsConfig};

/// Lines that survive popup truncation.
pub const LABELED_PREFIXES: &[&str] = &["Title:", "Company:", "Joining Date:", "Apply Here:"];

/// Stop adding labeled lines once this close to the budget.
const STOP_MARGIN: usize = 20;
const ELLIPSIS: &str = "...";

/// A popup ready to be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub app_name: String,
    pub timeout_seconds: u32,
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification) -> Result<()>;
}

/// Native desktop popups through the platform notification service.
#[derive(Debug, Default, Clone, Copy)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, notification: &Notification) -> Result<()> {
        notify_rust::Notification::new()
            .summary(&notification.title)
            .body(&notification.message)
            .appname(&notification.app_name)
            .timeout(notify_rust::Timeout::Milliseconds(
                notification.timeout_seconds.saturating_mul(1000),
            ))
            .show()
            .map(|_| ())
            .map_err(|e| CoreError::Custom(format!("desktop notification failed: {e}")))
    }
}

/// Shorten `message` to roughly `budget` characters for a popup.
///
/// Keeps the labeled lines that fit, in order, and appends `...`. When no
/// labeled line fits, falls back to the first `budget - 3` characters.
/// The result never exceeds `budget + 3` characters.
pub fn truncate_for_popup(message: &str, budget: usize) -> String {
    if message.chars().count() <= budget {
        return message.to_string();
    }

    let mut kept = String::new();
    let mut kept_len = 0;
    for line in message.split('\n') {
        if LABELED_PREFIXES.iter().any(|prefix| line.contains(prefix)) {
            let line_len = line.chars().count() + 1;
            if kept_len + line_len > budget {
                break;
            }
            kept.push_str(line);
            kept.push('\n');
            kept_len += line_len;
        }
        if kept_len >= budget.saturating_sub(STOP_MARGIN) {
            break;
        }
    }

    let kept = kept.trim();
    if kept.is_empty() {
        let head: String = message.chars().take(budget.saturating_sub(ELLIPSIS.len())).collect();
        format!("{head}{ELLIPSIS}")
    } else {
        format!("{kept}{ELLIPSIS}")
    }
}

/// What happened to a popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Shown,
    Failed(String),
    Disabled,
}

/// Sends popups and records every notification in the log.
pub struct NotificationCenter {
    notifier: Box<dyn Notifier>,
    log: NotificationLog,
    app_name: String,
    timeout_seconds: u32,
    max_message_length: usize,
    enabled: bool,
}

impl NotificationCenter {
    pub fn new(notifier: Box<dyn Notifier>, log: NotificationLog, config: &NotificationsConfig) -> Self {
        Self {
            notifier,
            log,
            app_name: config.app_name.clone(),
            timeout_seconds: config.timeout_seconds,
            max_message_length: config.max_message_length,
            enabled: config.enabled,
        }
    }

    pub fn log(&self) -> &NotificationLog {
        &self.log
    }

    /// Show a popup and append the full message to the log.
    ///
    /// A failed popup is logged and reported but does not stop the log
    /// append. Only a failed log write is an error.
    pub fn send(&self, title: &str, message: &str) -> Result<Delivery> {
        let delivery = if self.enabled {
            let popup = Notification {
                title: title.to_string(),
                message: truncate_for_popup(message, self.max_message_length),
                app_name: self.app_name.clone(),
                timeout_seconds: self.timeout_seconds,
            };
            match self.notifier.notify(&popup) {
                Ok(()) => Delivery::Shown,
                Err(e) => {
                    tracing::warn!(title, "failed to send notification: {e}");
                    Delivery::Failed(e.to_string())
                }
            }
        } else {
            Delivery::Disabled
        };

        self.log.append(title, message)?;
        tracing::info!(title, ?delivery, "notification recorded");
        Ok(delivery)
    }
}

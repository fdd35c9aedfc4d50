//! # Jobwatch Core Library
//!
//! This library provides the core logic for jobwatch, a background watcher
//! that polls a mailbox, picks out job-related messages, summarizes them and
//! raises desktop notifications, with follow-up reminders ahead of joining
//! dates. The `jobwatch` CLI is a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Mail**: the [`MailSource`] contract and MIME body text extraction
//! - **Classification**: keyword filter for job-related mail
//! - **Extraction**: ordered pattern table, fuzzy dates, entity recognition
//! - **Summarization**: structured summary with an abstractive-model
//!   `Details:` paragraph or a truncation fallback
//! - **Notifications**: desktop popups plus an append-only log
//! - **Scheduling**: week-before and day-before reminders for key dates
//! - **Storage**: flat files for the checkpoint, reminder list and config
//! - **Integrations**: Gmail over OAuth2, keyring-backed credentials
//!
//! ## Key Components
//!
//! - [`Pipeline`]: one processing pass over new mail
//! - [`PollLoop`]: periodic driver for the pipeline
//! - [`Config`]: application configuration management

pub mod classify;
pub mod error;
pub mod extract;
pub mod integrations;
pub mod mail;
pub mod models;
pub mod notify;
pub mod pipeline;
pub mod poll_loop;
pub mod scheduler;
pub mod storage;
pub mod summarize;

pub use classify::Classifier;
pub use error::{ConfigError, CoreError, OAuthError, Result, StorageError};
pub use extract::{ExtractedFields, FieldExtractor};
pub use integrations::GmailSource;
pub use mail::{MailSource, MessagePayload};
pub use models::ModelStatus;
pub use notify::{DesktopNotifier, NotificationCenter, Notifier};
pub use pipeline::{Pipeline, ProcessReport};
pub use poll_loop::{Job, PollLoop};
pub use scheduler::{DeadlineReport, ReminderScheduler};
pub use storage::{Config, ScheduledReminder};
pub use summarize::{EmailSummarizer, EmailSummary};

//! One processing pass over new mail.
//!
//! list since checkpoint -> fetch -> extract text -> classify ->
//! summarize -> notify -> schedule reminders -> advance checkpoint.

use std::path::Path;

use chrono::NaiveDate;

use crate::classify::Classifier;
use crate::error::Result;
use crate::extract::{EntityRecognizer, FieldExtractor, HfEntityRecognizer};
use crate::integrations::inference_token;
use crate::mail::{extract_text, MailSource};
use crate::models::ModelStatus;
use crate::notify::{NotificationCenter, Notifier};
use crate::scheduler::{DeadlineReport, ReminderScheduler};
use crate::storage::{
    CheckpointStore, Config, NotificationLog, ReminderStore, CHECKPOINT_FILE,
    NOTIFICATION_LOG_FILE, REMINDERS_FILE,
};
use crate::summarize::{EmailSummarizer, HfSummarizer, Summarizer};

pub const NEW_JOB_TITLE: &str = "New Job Email";

/// Counters for one processing pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessReport {
    pub fetched: usize,
    pub job_related: usize,
    pub reminders_scheduled: usize,
    pub since: Option<i64>,
}

pub struct Pipeline {
    source: Box<dyn MailSource>,
    classifier: Classifier,
    summarizer: EmailSummarizer,
    scheduler: ReminderScheduler,
    checkpoint: CheckpointStore,
    center: NotificationCenter,
}

impl Pipeline {
    pub fn new(
        source: Box<dyn MailSource>,
        classifier: Classifier,
        summarizer: EmailSummarizer,
        scheduler: ReminderScheduler,
        checkpoint: CheckpointStore,
        center: NotificationCenter,
    ) -> Self {
        Self {
            source,
            classifier,
            summarizer,
            scheduler,
            checkpoint,
            center,
        }
    }

    /// Build a pipeline from config with state files under `data_dir`.
    ///
    /// Models are loaded here, once. A model that fails to load stays
    /// unavailable and the pipeline uses the fallback path.
    pub async fn load(
        config: &Config,
        data_dir: &Path,
        source: Box<dyn MailSource>,
        notifier: Box<dyn Notifier>,
    ) -> Result<Self> {
        let token = if config.summarizer.enabled || config.ner.enabled {
            inference_token()
        } else {
            None
        };

        let recognizer: ModelStatus<Box<dyn EntityRecognizer>> =
            HfEntityRecognizer::load(&config.ner, token.clone())
                .await
                .map(|r| Box::new(r) as Box<dyn EntityRecognizer>);
        let model: ModelStatus<Box<dyn Summarizer>> =
            HfSummarizer::load(&config.summarizer, token)
                .await
                .map(|s| Box::new(s) as Box<dyn Summarizer>);

        let extractor = FieldExtractor::standard()?.with_recognizer(recognizer);
        let summarizer = EmailSummarizer::new(extractor, model, &config.summarizer);

        Ok(Self::new(
            source,
            Classifier::new(&config.classifier.keywords),
            summarizer,
            ReminderScheduler::new(ReminderStore::with_path(data_dir.join(REMINDERS_FILE))),
            CheckpointStore::with_path(data_dir.join(CHECKPOINT_FILE)),
            NotificationCenter::new(
                notifier,
                NotificationLog::with_path(data_dir.join(NOTIFICATION_LOG_FILE)),
                &config.notifications,
            ),
        ))
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    pub fn summarizer(&self) -> &EmailSummarizer {
        &self.summarizer
    }

    pub fn scheduler(&self) -> &ReminderScheduler {
        &self.scheduler
    }

    pub fn checkpoint(&self) -> &CheckpointStore {
        &self.checkpoint
    }

    pub fn center(&self) -> &NotificationCenter {
        &self.center
    }

    /// Process every message received since the checkpoint.
    ///
    /// `started_at` (epoch seconds) becomes the new checkpoint, and only
    /// when every message was listed and fetched. On error the checkpoint
    /// stays put and the same messages are seen again next pass.
    pub async fn process_emails(&self, today: NaiveDate, started_at: i64) -> Result<ProcessReport> {
        let since = self.checkpoint.load()?;
        let ids = self.source.list(since).await?;
        let mut report = ProcessReport {
            fetched: ids.len(),
            since,
            ..ProcessReport::default()
        };
        tracing::info!(source = self.source.name(), count = ids.len(), ?since, "fetched message list");

        for id in &ids {
            let payload = self.source.get(id).await?;
            let text = extract_text(&payload);
            if !self.classifier.is_job_related(&text) {
                continue;
            }
            report.job_related += 1;

            let summary = self.summarizer.summarize_email(&text, today).await;
            self.center.send(NEW_JOB_TITLE, &summary.text)?;

            if let Some(key_date) = summary.key_date {
                let added = self
                    .scheduler
                    .schedule_key_date_notifications(key_date, &summary.text, today)?;
                report.reminders_scheduled += added.len();
            }
        }

        self.checkpoint.save(started_at)?;
        tracing::info!(
            fetched = report.fetched,
            job_related = report.job_related,
            reminders = report.reminders_scheduled,
            "processing pass complete"
        );
        Ok(report)
    }

    /// Fire due reminders.
    pub fn check_deadline_notifications(&self, today: NaiveDate) -> Result<DeadlineReport> {
        self.scheduler.check_deadline_notifications(&self.center, today)
    }
}

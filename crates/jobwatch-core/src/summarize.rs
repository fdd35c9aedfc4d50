//! Structured summaries of job mail.
//!
//! The summary is a fixed-format block: a header, one labeled line per
//! extracted field, then a `Details:` paragraph from the abstractive model
//! (or a truncation of the body when the model is unavailable).

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use crate::error::{CoreError, Result};
use crate::extract::{ExtractedFields, FieldExtractor};
use crate::models::{InferenceClient, ModelStatus};
use crate::storage::SummarizerConfig;

pub const SUMMARY_HEADER: &str = "Job Opportunity Summary:\n";
pub const EMPTY_SUMMARY: &str = "No content to summarize.";

const PROBE_TEXT: &str = "The quarterly planning meeting has been moved to Thursday afternoon \
    so that the whole team can attend and review the hiring plan together.";

#[async_trait]
pub trait Summarizer: Send + Sync {
    fn name(&self) -> &str;

    async fn summarize(&self, text: &str, max_length: u32, min_length: u32) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct SummaryOutput {
    summary_text: String,
}

/// Abstractive summarization model behind an inference endpoint.
#[derive(Debug, Clone)]
pub struct HfSummarizer {
    client: InferenceClient,
}

impl HfSummarizer {
    pub fn new(client: InferenceClient) -> Self {
        Self { client }
    }

    /// Load the summarizer described by `config`, probing the endpoint once.
    pub async fn load(config: &SummarizerConfig, token: Option<String>) -> ModelStatus<Self> {
        if !config.enabled {
            return ModelStatus::unavailable("disabled in config");
        }

        let summarizer = Self::new(InferenceClient::new(&config.endpoint, &config.model, token));
        match summarizer.summarize(PROBE_TEXT, 20, 5).await {
            Ok(_) => {
                tracing::info!(model = %config.model, "summarizer loaded");
                ModelStatus::Ready(summarizer)
            }
            Err(e) => {
                tracing::warn!(
                    model = %config.model,
                    "error loading summarization model: {e}. Falling back to truncation."
                );
                ModelStatus::unavailable(e.to_string())
            }
        }
    }
}

#[async_trait]
impl Summarizer for HfSummarizer {
    fn name(&self) -> &str {
        self.client.model()
    }

    async fn summarize(&self, text: &str, max_length: u32, min_length: u32) -> Result<String> {
        let value = self
            .client
            .infer(
                text,
                json!({
                    "max_length": max_length,
                    "min_length": min_length,
                    "do_sample": false,
                }),
            )
            .await?;

        let outputs: Vec<SummaryOutput> = serde_json::from_value(value).map_err(|e| {
            CoreError::model(self.client.model(), format!("unexpected summary output: {e}"))
        })?;

        outputs
            .into_iter()
            .next()
            .map(|o| o.summary_text)
            .ok_or_else(|| CoreError::model(self.client.model(), "empty summary output"))
    }
}

/// Summary text plus the key date it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailSummary {
    pub text: String,
    pub key_date: Option<NaiveDate>,
    pub fields: ExtractedFields,
}

impl EmailSummary {
    fn empty() -> Self {
        Self {
            text: EMPTY_SUMMARY.to_string(),
            key_date: None,
            fields: ExtractedFields::default(),
        }
    }
}

pub struct EmailSummarizer {
    extractor: FieldExtractor,
    model: ModelStatus<Box<dyn Summarizer>>,
    max_length: u32,
    min_length: u32,
    fallback_chars: usize,
}

impl EmailSummarizer {
    pub fn new(
        extractor: FieldExtractor,
        model: ModelStatus<Box<dyn Summarizer>>,
        config: &SummarizerConfig,
    ) -> Self {
        Self {
            extractor,
            model,
            max_length: config.max_length,
            min_length: config.min_length,
            fallback_chars: config.fallback_chars,
        }
    }

    pub fn extractor(&self) -> &FieldExtractor {
        &self.extractor
    }

    pub fn model(&self) -> &ModelStatus<Box<dyn Summarizer>> {
        &self.model
    }

    /// Build the structured summary for one message body.
    pub async fn summarize_email(&self, text: &str, today: NaiveDate) -> EmailSummary {
        if text.trim().is_empty() {
            return EmailSummary::empty();
        }

        let fields = self.extractor.extract(text, today).await;
        let details = self.details(text).await;

        EmailSummary {
            text: render_summary(&fields, &details),
            key_date: fields.key_date,
            fields,
        }
    }

    async fn details(&self, text: &str) -> String {
        let Some(model) = self.model.as_ready() else {
            return truncate_details(text, self.fallback_chars);
        };

        match model.summarize(text, self.max_length, self.min_length).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::warn!(model = model.name(), "summarization failed: {e}");
                truncate_details(text, self.fallback_chars)
            }
        }
    }
}

/// Render the fixed-format summary block.
pub fn render_summary(fields: &ExtractedFields, details: &str) -> String {
    let mut out = String::from(SUMMARY_HEADER);

    if let Some(title) = &fields.job_title {
        out.push_str(&format!("Title: {title}\n"));
    }
    if !fields.company.is_empty() {
        out.push_str(&format!("Company: {}\n", fields.company.join(", ")));
    }
    if !fields.location.is_empty() {
        out.push_str(&format!("Location: {}\n", fields.location.join(", ")));
    }
    if let Some(date) = fields.key_date {
        out.push_str(&format!("Joining Date: {}\n", date.format("%Y-%m-%d")));
    }
    if let Some(salary) = &fields.salary {
        out.push_str(&format!("Salary: ₹{salary}\n"));
    }
    if let Some(job_type) = &fields.job_type {
        out.push_str(&format!("Type: {}\n", capitalize(job_type)));
    }
    if let Some(link) = &fields.application_link {
        out.push_str(&format!("Apply Here: {link}\n"));
    }

    out.push_str(&format!("\nDetails: {details}"));
    out
}

/// First `max_chars` characters, with `...` appended when cut.
pub fn truncate_details(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    format!("{head}...")
}

/// Upper-case the first character and lower-case the rest.
fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

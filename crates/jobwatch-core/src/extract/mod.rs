//! Structured field extraction from job mail.
//!
//! Pattern rules fill the title, salary, job type, link and key date.
//! Company and location come from the entity recognizer when it loaded,
//! and are left empty otherwise.

pub mod dates;
pub mod entities;
pub mod patterns;

use chrono::NaiveDate;
use serde::Serialize;

pub use dates::parse_fuzzy_date;
pub use entities::{companies_and_locations, Entity, EntityRecognizer, HfEntityRecognizer};
pub use patterns::{Field, PatternRule, PatternTable, JOB_TYPES};

use crate::error::{CoreError, Result};
use crate::models::ModelStatus;

/// Words that end in a period without ending the sentence.
const ABBREVIATIONS: &[&str] = &[
    "sr", "jr", "mr", "mrs", "ms", "dr", "st", "no", "co", "inc", "ltd", "vs", "asst", "assoc",
];

/// Fields pulled out of one message body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractedFields {
    pub job_title: Option<String>,
    pub company: Vec<String>,
    pub location: Vec<String>,
    pub salary: Option<String>,
    pub job_type: Option<String>,
    pub application_link: Option<String>,
    pub key_date: Option<NaiveDate>,
}

impl ExtractedFields {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

pub struct FieldExtractor {
    table: PatternTable,
    recognizer: ModelStatus<Box<dyn EntityRecognizer>>,
}

impl FieldExtractor {
    pub fn new(table: PatternTable, recognizer: ModelStatus<Box<dyn EntityRecognizer>>) -> Self {
        Self { table, recognizer }
    }

    /// Standard rule table without entity recognition.
    pub fn standard() -> Result<Self> {
        let table = PatternTable::standard()
            .map_err(|e| CoreError::Custom(format!("invalid extraction pattern: {e}")))?;
        Ok(Self::new(table, ModelStatus::unavailable("not loaded")))
    }

    pub fn with_recognizer(mut self, recognizer: ModelStatus<Box<dyn EntityRecognizer>>) -> Self {
        self.recognizer = recognizer;
        self
    }

    pub fn table(&self) -> &PatternTable {
        &self.table
    }

    pub fn recognizer(&self) -> &ModelStatus<Box<dyn EntityRecognizer>> {
        &self.recognizer
    }

    /// Pattern-only pass. Dates without a year are resolved against `today`.
    pub fn extract_patterns(&self, text: &str, today: NaiveDate) -> ExtractedFields {
        let mut fields = ExtractedFields::default();
        if text.trim().is_empty() {
            return fields;
        }

        fields.job_title = self
            .table
            .first_capture(Field::JobTitle, text)
            .map(|(_, value)| first_sentence(value))
            .filter(|title| !title.is_empty());

        fields.salary = self
            .table
            .first_capture(Field::Salary, text)
            .map(|(_, value)| value.to_string());

        // Rule names for job types are the canonical lowercase keyword.
        fields.job_type = self
            .table
            .first_capture(Field::JobType, text)
            .map(|(rule, _)| rule.name.to_string());

        fields.application_link = self
            .table
            .first_capture(Field::ApplicationLink, text)
            .map(|(_, value)| value.to_string());

        fields.key_date = self.table.rules_for(Field::KeyDate).find_map(|rule| {
            let raw = rule.capture(text)?;
            let parsed = parse_fuzzy_date(raw, today);
            if parsed.is_none() {
                tracing::debug!(rule = rule.name, raw, "key date capture did not parse");
            }
            parsed
        });

        fields
    }

    /// Full pass: patterns, then company and location from the recognizer.
    pub async fn extract(&self, text: &str, today: NaiveDate) -> ExtractedFields {
        let mut fields = self.extract_patterns(text, today);
        if text.trim().is_empty() {
            return fields;
        }

        if let Some(recognizer) = self.recognizer.as_ready() {
            match recognizer.recognize(text).await {
                Ok(entities) => {
                    let (company, location) = companies_and_locations(&entities);
                    fields.company = company;
                    fields.location = location;
                }
                Err(e) => {
                    tracing::warn!(model = recognizer.name(), "entity recognition failed: {e}");
                }
            }
        }

        fields
    }
}

/// Cut a captured line at its first sentence boundary.
fn first_sentence(value: &str) -> String {
    let mut chars = value.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let at_boundary = chars.peek().map_or(true, |(_, next)| next.is_whitespace());
        if !at_boundary {
            continue;
        }
        let word = value[..idx]
            .rsplit(|ch: char| ch.is_whitespace())
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();
        if c == '.' && ABBREVIATIONS.contains(&word.as_str()) {
            continue;
        }
        return value[..idx].trim().trim_end_matches([',', ';', ':']).to_string();
    }
    value.trim().trim_end_matches(['.', ',', ';', ':']).to_string()
}

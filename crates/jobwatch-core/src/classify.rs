//! Keyword classifier for job-related mail.
//!
//! A message is job-related when its lowercased text contains any keyword
//! as a substring. There is no scoring or negation handling, so broad words
//! like "team" produce false positives.

pub const DEFAULT_KEYWORDS: &[&str] = &[
    "job",
    "career",
    "position",
    "hiring",
    "apply",
    "interview",
    "opportunity",
    "joining",
    "role",
    "manager",
    "team",
    "start",
    "welcome",
    "appoint",
    "employment",
];

const PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone)]
pub struct Classifier {
    keywords: Vec<String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORDS.iter().copied())
    }
}

impl Classifier {
    /// Build a classifier; keywords are lowercased, empty ones dropped.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// First keyword found in `text`, if any.
    pub fn matched_keyword(&self, text: &str) -> Option<&str> {
        let lower = text.to_lowercase();
        self.keywords
            .iter()
            .find(|k| lower.contains(k.as_str()))
            .map(String::as_str)
    }

    pub fn is_job_related(&self, text: &str) -> bool {
        let hit = self.matched_keyword(text);
        let preview: String = text.to_lowercase().chars().take(PREVIEW_CHARS).collect();
        tracing::debug!(
            job_related = hit.is_some(),
            keyword = hit.unwrap_or(""),
            "job-related check (text: {preview}...)"
        );
        hit.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn appointment_letter_is_job_related() {
        let c = Classifier::default();
        assert!(c.is_job_related("We are happy to APPOINT you as Software Engineer."));
    }

    #[test]
    fn unrelated_text_is_not() {
        let c = Classifier::default();
        assert!(!c.is_job_related("Your parcel was delivered to the front door."));
        assert!(!c.is_job_related(""));
    }

    #[test]
    fn substring_hits_count() {
        // "jobs" and "restart" both contain keywords.
        let c = Classifier::default();
        assert_eq!(c.matched_keyword("Weekly jobs digest"), Some("job"));
        assert_eq!(c.matched_keyword("please restart the router"), Some("start"));
    }

    #[test]
    fn custom_keywords_are_normalised() {
        let c = Classifier::new(["  Offer ", "", "RECRUITER"]);
        assert_eq!(c.keywords(), &["offer".to_string(), "recruiter".to_string()]);
        assert!(c.is_job_related("A recruiter reached out"));
        assert!(!c.is_job_related("job"));
    }

    proptest! {
        #[test]
        fn any_text_containing_a_keyword_matches(
            prefix in "[a-z ]{0,20}",
            suffix in "[a-z ]{0,20}",
            idx in 0usize..DEFAULT_KEYWORDS.len(),
            upper in any::<bool>(),
        ) {
            let kw = DEFAULT_KEYWORDS[idx];
            let kw = if upper { kw.to_uppercase() } else { kw.to_string() };
            let text = format!("{prefix}{kw}{suffix}");
            prop_assert!(Classifier::default().is_job_related(&text));
        }

        #[test]
        fn digits_and_punctuation_never_match(text in "[0-9 .,!?-]{0,60}") {
            prop_assert!(!Classifier::default().is_job_related(&text));
        }
    }
}

//! Ordered `(pattern, field)` rule table.
//!
//! Rules are evaluated top to bottom; for each field the first rule that
//! produces a value wins. Key-date rules only produce a value when the
//! captured text parses as a date, so a match that fails to parse falls
//! through to the next key-date rule.

use regex::Regex;

/// Field a rule populates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    JobTitle,
    Salary,
    JobType,
    ApplicationLink,
    KeyDate,
}

/// Job types recognised in the text, in priority order.
pub const JOB_TYPES: &[&str] = &[
    "full-time",
    "part-time",
    "remote",
    "contract",
    "internship",
    "work at home",
];

/// One extraction rule. Capture group 1 holds the raw value.
#[derive(Debug, Clone)]
pub struct PatternRule {
    pub field: Field,
    pub name: &'static str,
    regex: Regex,
}

impl PatternRule {
    pub fn new(field: Field, name: &'static str, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            field,
            name,
            regex: Regex::new(pattern)?,
        })
    }

    /// Trimmed capture group 1 of the first match, if non-empty.
    pub fn capture<'t>(&self, text: &'t str) -> Option<&'t str> {
        let caps = self.regex.captures(text)?;
        let value = caps.get(1)?.as_str().trim();
        (!value.is_empty()).then_some(value)
    }
}

/// The full ordered rule table.
#[derive(Debug, Clone)]
pub struct PatternTable {
    rules: Vec<PatternRule>,
}

impl PatternTable {
    /// The standard rule set for appointment letters and job postings.
    pub fn standard() -> Result<Self, regex::Error> {
        let mut rules = vec![
            PatternRule::new(Field::JobTitle, "appoint-you-as", r"(?i)appoint you as\s*([^\n]+)")?,
            PatternRule::new(Field::JobTitle, "position-colon", r"(?i)position\s*:\s*([^\n]+)")?,
            PatternRule::new(Field::JobTitle, "joining-as", r"(?i)joining as\s*([^\n]+)")?,
            PatternRule::new(
                Field::Salary,
                "ctc-salary-compensation",
                r"(?i)(?:CTC|salary|compensation)\s*(?:will be|of)?\s*₹?\$?(\d[\d,]*(?:-\d+,\d+)?)",
            )?,
        ];

        for job_type in JOB_TYPES.iter().copied() {
            rules.push(PatternRule::new(
                Field::JobType,
                job_type,
                &format!("(?i)({})", regex::escape(job_type)),
            )?);
        }

        rules.extend([
            PatternRule::new(Field::ApplicationLink, "url", r"(https?://[^\s]+)")?,
            PatternRule::new(
                Field::KeyDate,
                "joining-on",
                r"(?i)join(?:ing)?\s*(?:us\s*)?on\s*([^\n]+)",
            )?,
            PatternRule::new(Field::KeyDate, "deadline-colon", r"(?i)deadline\s*:\s*([^\n]+)")?,
            PatternRule::new(Field::KeyDate, "apply-by", r"(?i)apply by\s*([^\n]+)")?,
            PatternRule::new(Field::KeyDate, "submit-by", r"(?i)submit by\s*([^\n]+)")?,
        ]);

        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    /// Rules for `field`, in evaluation order.
    pub fn rules_for(&self, field: Field) -> impl Iterator<Item = &PatternRule> {
        self.rules.iter().filter(move |r| r.field == field)
    }

    /// First non-empty capture for `field`, with the rule that produced it.
    pub fn first_capture<'t>(&self, field: Field, text: &'t str) -> Option<(&PatternRule, &'t str)> {
        self.rules_for(field)
            .find_map(|rule| rule.capture(text).map(|value| (rule, value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PatternTable {
        PatternTable::standard().unwrap()
    }

    fn rule(name: &str) -> PatternRule {
        table()
            .rules()
            .iter()
            .find(|r| r.name == name)
            .cloned()
            .unwrap_or_else(|| panic!("no rule named {name}"))
    }

    #[test]
    fn appoint_you_as_rule() {
        assert_eq!(
            rule("appoint-you-as").capture("We appoint you as  Sr. Developer\nRegards"),
            Some("Sr. Developer")
        );
    }

    #[test]
    fn position_colon_rule() {
        assert_eq!(
            rule("position-colon").capture("Position : Data Analyst II"),
            Some("Data Analyst II")
        );
        assert_eq!(rule("position-colon").capture("a senior position in QA"), None);
    }

    #[test]
    fn joining_as_rule() {
        assert_eq!(
            rule("joining-as").capture("Thanks for JOINING AS Intern"),
            Some("Intern")
        );
    }

    #[test]
    fn salary_rule_variants() {
        let r = rule("ctc-salary-compensation");
        assert_eq!(r.capture("CTC will be 1,200,000."), Some("1,200,000"));
        assert_eq!(r.capture("a salary of $85,000 per year"), Some("85,000"));
        assert_eq!(r.capture("Compensation ₹12,00,000"), Some("12,00,000"));
        assert_eq!(r.capture("salary: competitive"), None);
        assert_eq!(r.capture("salary, benefits and perks"), None);
    }

    #[test]
    fn url_rule() {
        assert_eq!(
            rule("url").capture("Apply at https://jobs.example.com/123?ref=mail now"),
            Some("https://jobs.example.com/123?ref=mail")
        );
    }

    #[test]
    fn key_date_rules_capture_rest_of_line() {
        assert_eq!(
            rule("joining-on").capture("You will be joining us on 2025-03-01.\nThanks"),
            Some("2025-03-01.")
        );
        assert_eq!(rule("joining-on").capture("join on Monday"), Some("Monday"));
        assert_eq!(rule("deadline-colon").capture("Deadline: 5 May"), Some("5 May"));
        assert_eq!(rule("apply-by").capture("apply by March 3"), Some("March 3"));
        assert_eq!(rule("submit-by").capture("Submit by 04/01/2025"), Some("04/01/2025"));
    }

    #[test]
    fn job_type_rules_follow_priority_order() {
        let t = table();
        let text = "This is a remote, full-time role";
        let (rule, value) = t.first_capture(Field::JobType, text).unwrap();
        assert_eq!(rule.name, "full-time");
        assert_eq!(value, "full-time");
    }

    #[test]
    fn first_title_rule_wins() {
        let t = table();
        let text = "Position: Analyst\nWe appoint you as Lead Analyst";
        let (rule, value) = t.first_capture(Field::JobTitle, text).unwrap();
        assert_eq!(rule.name, "appoint-you-as");
        assert_eq!(value, "Lead Analyst");
    }

    #[test]
    fn table_order_is_stable() {
        let names: Vec<_> = table().rules_for(Field::KeyDate).map(|r| r.name).collect();
        assert_eq!(names, ["joining-on", "deadline-colon", "apply-by", "submit-by"]);
    }
}

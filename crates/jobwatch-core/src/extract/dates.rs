//! Fuzzy date parsing for free-form mail text.
//!
//! Scans a snippet for the earliest date-looking token run and ignores the
//! words around it ("2025-03-01.", "Monday, 3rd March", "March 3 at 10am").
//! Components the snippet leaves out (year, day) are taken from the
//! reference date. Snippets with no calendar date fall back to a bare
//! ordinal day, then a weekday name, then relative English phrases
//! such as "tomorrow" via `chrono-english`.

use std::sync::LazyLock;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use chrono_english::{parse_date_string, Dialect};
use regex::{Captures, Regex};

const MONTH: &str = r"(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)";

static ISO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})(?:T\d{1,2}:\d{2}(?::\d{2})?)?\b")
        .expect("valid ISO date regex")
});

static NUMERIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})[-/.](\d{1,2})[-/.](\d{2}|\d{4})\b").expect("valid numeric date regex")
});

static DAY_MONTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(\d{{1,2}})(?:st|nd|rd|th)?(?:\s+of\s+|\s+|-){MONTH}\b\.?(?:(?:,?\s+|-)(\d{{4}})\b)?"
    ))
    .expect("valid day-month regex")
});

static MONTH_DAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b{MONTH}\b\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?\b,?(?:\s+(\d{{4}})\b)?"
    ))
    .expect("valid month-day regex")
});

static MONTH_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b{MONTH}\b\.?,?\s+(\d{{4}})\b")).expect("valid month-year regex")
});

static ORDINAL_DAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)\b").expect("valid ordinal day regex")
});

static WEEKDAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(monday|tuesday|wednesday|thursday|friday|saturday|sunday|mon|tues?|wed|thu(?:rs?)?|fri|sat|sun)\b",
    )
    .expect("valid weekday regex")
});

static NUMERIC_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[-/.]\d").expect("valid numeric run regex"));

#[derive(Debug, Clone, Copy)]
enum Form {
    Iso,
    Numeric,
    DayMonth,
    MonthDay,
    MonthYear,
}

/// Parse the first recognisable date in `text`.
///
/// Returns `None` when nothing in the text forms a valid calendar date.
pub fn parse_fuzzy_date(text: &str, reference: NaiveDate) -> Option<NaiveDate> {
    calendar_date(text, reference)
        .or_else(|| ordinal_day(text, reference))
        .or_else(|| weekday(text, reference))
        .or_else(|| english_phrase(text, reference))
}

fn calendar_date(text: &str, reference: NaiveDate) -> Option<NaiveDate> {
    let forms: [(&Regex, Form); 5] = [
        (&ISO_RE, Form::Iso),
        (&NUMERIC_RE, Form::Numeric),
        (&DAY_MONTH_RE, Form::DayMonth),
        (&MONTH_DAY_RE, Form::MonthDay),
        (&MONTH_YEAR_RE, Form::MonthYear),
    ];

    // (start, longer-first, date)
    let mut candidates: Vec<(usize, std::cmp::Reverse<usize>, NaiveDate)> = Vec::new();
    for (re, form) in forms {
        for caps in re.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            if let Some(date) = build(form, &caps, reference) {
                candidates.push((whole.start(), std::cmp::Reverse(whole.len()), date));
            }
        }
    }

    candidates.sort_by_key(|(start, len, _)| (*start, *len));
    candidates.first().map(|(_, _, date)| *date)
}

/// "the 5th": that day of the reference month.
fn ordinal_day(text: &str, reference: NaiveDate) -> Option<NaiveDate> {
    let day = ORDINAL_DAY_RE.captures(text)?.get(1)?.as_str().parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(reference.year(), reference.month(), day)
}

/// "Monday": the next such day on or after the reference date.
fn weekday(text: &str, reference: NaiveDate) -> Option<NaiveDate> {
    let name = WEEKDAY_RE.captures(text)?.get(1)?.as_str();
    let target = name.get(..3)?.parse::<Weekday>().ok()?;
    let ahead = (7 + target.num_days_from_monday() - reference.weekday().num_days_from_monday()) % 7;
    reference.checked_add_days(Days::new(u64::from(ahead)))
}

fn english_phrase(text: &str, reference: NaiveDate) -> Option<NaiveDate> {
    let phrase = text.trim().trim_end_matches(['.', ',', ';', ':', '!']);
    // A numeric run that failed calendar validation is not a date.
    if phrase.is_empty() || NUMERIC_RUN_RE.is_match(phrase) {
        return None;
    }
    let now = reference.and_hms_opt(0, 0, 0)?.and_utc();
    parse_date_string(phrase, now, Dialect::Us)
        .ok()
        .map(|parsed| parsed.date_naive())
}

fn build(form: Form, caps: &Captures<'_>, reference: NaiveDate) -> Option<NaiveDate> {
    let num = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
    let year_or_ref = |i: usize| {
        caps.get(i)
            .and_then(|m| m.as_str().parse::<i32>().ok())
            .unwrap_or_else(|| reference.year())
    };

    match form {
        Form::Iso => {
            let year = caps.get(1)?.as_str().parse::<i32>().ok()?;
            NaiveDate::from_ymd_opt(year, num(2)?, num(3)?)
        }
        Form::Numeric => {
            let (first, second) = (num(1)?, num(2)?);
            let year = expand_year(caps.get(3)?.as_str().parse::<i32>().ok()?);
            // Month-first unless the first number cannot be a month.
            let (month, day) = if first > 12 { (second, first) } else { (first, second) };
            NaiveDate::from_ymd_opt(year, month, day)
        }
        Form::DayMonth => {
            let month = month_number(caps.get(2)?.as_str())?;
            NaiveDate::from_ymd_opt(year_or_ref(3), month, num(1)?)
        }
        Form::MonthDay => {
            let month = month_number(caps.get(1)?.as_str())?;
            NaiveDate::from_ymd_opt(year_or_ref(3), month, num(2)?)
        }
        Form::MonthYear => {
            let month = month_number(caps.get(1)?.as_str())?;
            let year = caps.get(2)?.as_str().parse::<i32>().ok()?;
            let day = reference.day().min(days_in_month(year, month)?);
            NaiveDate::from_ymd_opt(year, month, day)
        }
    }
}

fn expand_year(year: i32) -> i32 {
    if year < 100 {
        2000 + year
    } else {
        year
    }
}

fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_ascii_lowercase();
    let month = match lower.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    u32::try_from((next - first).num_days()).ok()
}

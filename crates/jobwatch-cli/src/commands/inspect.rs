use std::path::PathBuf;

use clap::Args;
use jobwatch_core::mail::body::html_to_text;
use jobwatch_core::{Classifier, Config, EmailSummarizer, FieldExtractor, ModelStatus};
use serde_json::json;

use super::{parse_day, runtime, CliResult};

#[derive(Args)]
pub struct InspectArgs {
    /// Message body to inspect (plain text, or HTML with --html)
    file: PathBuf,
    /// Reference date for relative dates (YYYY-MM-DD, default today)
    #[arg(long)]
    today: Option<String>,
    /// Treat the file as HTML and strip markup first
    #[arg(long)]
    html: bool,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Classify, extract and summarize one file without any model calls.
pub fn run(args: InspectArgs) -> CliResult {
    let config = Config::load_or_default();
    let today = parse_day(args.today.as_deref())?;

    let raw = std::fs::read_to_string(&args.file)?;
    let is_html = args.html
        || args
            .file
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"));
    let text = if is_html { html_to_text(&raw) } else { raw };

    let classifier = Classifier::new(&config.classifier.keywords);
    let keyword = classifier.matched_keyword(&text).map(str::to_string);

    let summarizer = EmailSummarizer::new(
        FieldExtractor::standard()?,
        ModelStatus::unavailable("offline inspection"),
        &config.summarizer,
    );
    let summary = runtime()?.block_on(summarizer.summarize_email(&text, today));

    if args.json {
        let out = json!({
            "job_related": keyword.is_some(),
            "keyword": keyword,
            "fields": summary.fields,
            "summary": summary.text,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        match &keyword {
            Some(k) => println!("job-related: yes (keyword \"{k}\")"),
            None => println!("job-related: no"),
        }
        println!();
        println!("{}", summary.text);
    }
    Ok(())
}

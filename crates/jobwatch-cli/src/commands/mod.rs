pub mod auth;
pub mod completions;
pub mod config;
pub mod inspect;
pub mod log;
pub mod process;
pub mod reminders;
pub mod run;

use std::error::Error;

use chrono::NaiveDate;
use jobwatch_core::storage::{data_dir, NotificationLog};
use jobwatch_core::{Config, DesktopNotifier, GmailSource, Pipeline};

pub type CliResult<T = ()> = Result<T, Box<dyn Error>>;

/// Runtime for commands that talk to the network.
pub fn runtime() -> CliResult<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Parse a `YYYY-MM-DD` argument, defaulting to today.
pub fn parse_day(raw: Option<&str>) -> CliResult<NaiveDate> {
    match raw {
        Some(raw) => Ok(NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|e| format!("invalid date '{raw}' (expected YYYY-MM-DD): {e}"))?),
        None => Ok(today()),
    }
}

/// Full pipeline over Gmail with desktop popups.
pub async fn load_pipeline(config: &Config) -> jobwatch_core::Result<Pipeline> {
    let dir = data_dir()?;
    Pipeline::load(
        config,
        &dir,
        Box::new(GmailSource::new(&config.gmail)),
        Box::new(DesktopNotifier),
    )
    .await
}

pub fn notification_log() -> CliResult<NotificationLog> {
    Ok(NotificationLog::open()?)
}

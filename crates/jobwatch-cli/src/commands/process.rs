use jobwatch_core::notify::NotificationCenter;
use jobwatch_core::storage::{NotificationLog, ReminderStore};
use jobwatch_core::{Config, DesktopNotifier, ReminderScheduler};

use super::{load_pipeline, runtime, today, CliResult};

pub fn process() -> CliResult {
    let config = Config::load()?;
    let report = runtime()?.block_on(async {
        let pipeline = load_pipeline(&config).await?;
        pipeline
            .process_emails(today(), chrono::Utc::now().timestamp())
            .await
    })?;

    println!(
        "fetched {} message(s), {} job-related, {} reminder(s) scheduled",
        report.fetched, report.job_related, report.reminders_scheduled
    );
    Ok(())
}

pub fn check() -> CliResult {
    let config = Config::load()?;
    let scheduler = ReminderScheduler::new(ReminderStore::open()?);
    let center = NotificationCenter::new(
        Box::new(DesktopNotifier),
        NotificationLog::open()?,
        &config.notifications,
    );

    let report = scheduler.check_deadline_notifications(&center, today())?;
    println!(
        "{} reminder(s) fired, {} failed to display, {} pending",
        report.fired, report.failed, report.pending
    );
    Ok(())
}

//! Long-running poll loop.
//!
//! Two periodic jobs share one cadence: process new mail, then fire due
//! reminders. Due jobs are checked on every tick. A job's next run is
//! measured from when it finished, so a slow pass pushes the next one back.
//! Job errors are logged and the loop keeps going.

use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};

use crate::pipeline::Pipeline;
use crate::storage::PollConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    ProcessEmails,
    CheckDeadlines,
}

#[derive(Debug, Clone)]
struct PeriodicJob {
    job: Job,
    every: Duration,
    next_run: Instant,
}

impl PeriodicJob {
    fn is_due(&self, now: Instant) -> bool {
        now >= self.next_run
    }
}

pub struct PollLoop {
    pipeline: Pipeline,
    every: Duration,
    tick: Duration,
    run_on_start: bool,
}

impl PollLoop {
    pub fn new(pipeline: Pipeline, config: &PollConfig) -> Self {
        Self {
            pipeline,
            every: Duration::from_secs(config.interval_minutes.max(1) * 60),
            tick: Duration::from_secs(config.tick_seconds.max(1)),
            run_on_start: config.run_on_start,
        }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Run until `shutdown` resolves. An in-flight job finishes first.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let start = Instant::now();
        let first_run = if self.run_on_start { start } else { start + self.every };
        let mut jobs = [Job::ProcessEmails, Job::CheckDeadlines].map(|job| PeriodicJob {
            job,
            every: self.every,
            next_run: first_run,
        });

        tracing::info!(
            interval_secs = self.every.as_secs(),
            source = self.pipeline.source_name(),
            "poll loop started"
        );

        let mut ticker = tokio::time::interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("shutdown requested, stopping poll loop");
                    break;
                }
                _ = ticker.tick() => {
                    for periodic in jobs.iter_mut() {
                        if periodic.is_due(Instant::now()) {
                            self.run_job(periodic.job).await;
                            periodic.next_run = Instant::now() + periodic.every;
                        }
                    }
                }
            }
        }
    }

    /// Run one job now, logging rather than returning its error.
    pub async fn run_job(&self, job: Job) {
        let today = chrono::Local::now().date_naive();
        match job {
            Job::ProcessEmails => {
                let started_at = chrono::Utc::now().timestamp();
                if let Err(e) = self.pipeline.process_emails(today, started_at).await {
                    tracing::error!("Error processing emails: {e}");
                }
            }
            Job::CheckDeadlines => {
                if let Err(e) = self.pipeline.check_deadline_notifications(today) {
                    tracing::error!("Error checking deadline notifications: {e}");
                }
            }
        }
    }
}

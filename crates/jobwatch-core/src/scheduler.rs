//! Key-date reminders.
//!
//! Each key date yields up to two reminders (one week before, one day
//! before). A candidate already in the past is dropped at scheduling time.
//! Due reminders fire once and are removed from the store.

use chrono::{Days, NaiveDate};

use crate::error::Result;
use crate::notify::{Delivery, NotificationCenter};
use crate::storage::{ReminderStore, ScheduledReminder};

pub const REMINDER_TITLE: &str = "Joining Date Reminder";

const WEEK_BEFORE: &str = "Reminder: Joining date for job is in one week.";
const DAY_BEFORE: &str = "Reminder: Joining date for job is tomorrow.";

/// Outcome of one deadline sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeadlineReport {
    pub fired: usize,
    pub failed: usize,
    pub pending: usize,
}

/// Reminders for `key_date` that are still ahead of (or on) `today`.
pub fn plan_reminders(key_date: NaiveDate, summary: &str, today: NaiveDate) -> Vec<ScheduledReminder> {
    let offsets = [(Days::new(7), WEEK_BEFORE), (Days::new(1), DAY_BEFORE)];

    offsets
        .into_iter()
        .filter_map(|(offset, prefix)| {
            let date = key_date.checked_sub_days(offset)?;
            (date >= today).then(|| ScheduledReminder::new(date, format!("{prefix}\n{summary}")))
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct ReminderScheduler {
    store: ReminderStore,
}

impl ReminderScheduler {
    pub fn new(store: ReminderStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ReminderStore {
        &self.store
    }

    /// Append the reminders for `key_date` to the store.
    ///
    /// Returns the reminders that were added (possibly none).
    pub fn schedule_key_date_notifications(
        &self,
        key_date: NaiveDate,
        summary: &str,
        today: NaiveDate,
    ) -> Result<Vec<ScheduledReminder>> {
        let planned = plan_reminders(key_date, summary, today);
        if planned.is_empty() {
            tracing::debug!(%key_date, "key date too close, no reminders scheduled");
            return Ok(planned);
        }

        let mut all = self.store.load_all()?;
        all.extend(planned.iter().cloned());
        self.store.save_all(&all)?;

        for reminder in &planned {
            tracing::info!(date = %reminder.date, %key_date, "reminder scheduled");
        }
        Ok(planned)
    }

    /// Fire every due reminder and keep only the pending ones.
    ///
    /// Due reminders are dropped whether or not their popup was shown.
    pub fn check_deadline_notifications(
        &self,
        center: &NotificationCenter,
        today: NaiveDate,
    ) -> Result<DeadlineReport> {
        let (due, pending): (Vec<_>, Vec<_>) = self
            .store
            .load_all()?
            .into_iter()
            .partition(|r| r.is_due(today));

        let mut report = DeadlineReport {
            pending: pending.len(),
            ..DeadlineReport::default()
        };

        for reminder in &due {
            match center.send(REMINDER_TITLE, &reminder.message) {
                Ok(Delivery::Failed(_)) => report.failed += 1,
                Ok(_) => report.fired += 1,
                Err(e) => {
                    tracing::error!(date = %reminder.date, "failed to record reminder: {e}");
                    report.failed += 1;
                }
            }
        }

        if !due.is_empty() {
            self.store.save_all(&pending)?;
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::notify::{Notification, Notifier};
    use crate::storage::{NotificationLog, NotificationsConfig};
    use std::sync::{Arc, Mutex};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[derive(Clone, Default)]
    struct Recorder {
        titles: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    impl Notifier for Recorder {
        fn notify(&self, notification: &Notification) -> Result<()> {
            if self.fail {
                return Err(CoreError::Custom("daemon down".into()));
            }
            self.titles.lock().unwrap().push(notification.title.clone());
            Ok(())
        }
    }

    fn setup(dir: &tempfile::TempDir, notifier: Recorder) -> (ReminderScheduler, NotificationCenter) {
        let scheduler = ReminderScheduler::new(ReminderStore::with_path(
            dir.path().join("notification_schedule.json"),
        ));
        let center = NotificationCenter::new(
            Box::new(notifier),
            NotificationLog::with_path(dir.path().join("notifications.txt")),
            &NotificationsConfig::default(),
        );
        (scheduler, center)
    }

    #[test]
    fn plans_both_reminders() {
        let planned = plan_reminders(d(2025, 3, 1), "S", d(2025, 2, 20));
        assert_eq!(
            planned,
            vec![
                ScheduledReminder::new(d(2025, 2, 22), format!("{WEEK_BEFORE}\nS")),
                ScheduledReminder::new(d(2025, 2, 28), format!("{DAY_BEFORE}\nS")),
            ]
        );
    }

    #[test]
    fn drops_past_candidates() {
        // Week-before lands in the past, day-before is today.
        let planned = plan_reminders(d(2025, 2, 21), "S", d(2025, 2, 20));
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].date, d(2025, 2, 20));

        assert!(plan_reminders(d(2025, 2, 20), "S", d(2025, 2, 20)).is_empty());
    }

    #[test]
    fn scheduling_appends_without_dedup() {
        let dir = tempfile::tempdir().unwrap();
        let (scheduler, _) = setup(&dir, Recorder::default());

        scheduler
            .schedule_key_date_notifications(d(2025, 3, 1), "S", d(2025, 2, 20))
            .unwrap();
        scheduler
            .schedule_key_date_notifications(d(2025, 3, 1), "S", d(2025, 2, 20))
            .unwrap();

        assert_eq!(scheduler.store().load_all().unwrap().len(), 4);
    }

    #[test]
    fn due_reminders_fire_once() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = Recorder::default();
        let (scheduler, center) = setup(&dir, recorder.clone());
        scheduler
            .store()
            .save_all(&[
                ScheduledReminder::new(d(2025, 2, 22), "week"),
                ScheduledReminder::new(d(2025, 2, 28), "day"),
            ])
            .unwrap();

        let report = scheduler.check_deadline_notifications(&center, d(2025, 2, 22)).unwrap();
        assert_eq!(report, DeadlineReport { fired: 1, failed: 0, pending: 1 });
        assert_eq!(
            scheduler.store().load_all().unwrap(),
            vec![ScheduledReminder::new(d(2025, 2, 28), "day")]
        );

        let again = scheduler.check_deadline_notifications(&center, d(2025, 2, 22)).unwrap();
        assert_eq!(again.fired, 0);
        assert_eq!(recorder.titles.lock().unwrap().as_slice(), [REMINDER_TITLE]);
        assert_eq!(
            center.log().read_all().unwrap().unwrap(),
            format!("{REMINDER_TITLE}: week\n")
        );
    }

    #[test]
    fn overdue_reminders_fire_on_late_check() {
        let dir = tempfile::tempdir().unwrap();
        let (scheduler, center) = setup(&dir, Recorder::default());
        scheduler
            .store()
            .save_all(&[
                ScheduledReminder::new(d(2025, 2, 22), "week"),
                ScheduledReminder::new(d(2025, 2, 28), "day"),
            ])
            .unwrap();

        let report = scheduler.check_deadline_notifications(&center, d(2025, 3, 5)).unwrap();

        assert_eq!(report.fired, 2);
        assert!(scheduler.store().load_all().unwrap().is_empty());
    }

    #[test]
    fn failed_popups_are_still_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = Recorder {
            fail: true,
            ..Recorder::default()
        };
        let (scheduler, center) = setup(&dir, recorder);
        scheduler
            .store()
            .save_all(&[ScheduledReminder::new(d(2025, 2, 22), "week")])
            .unwrap();

        let report = scheduler.check_deadline_notifications(&center, d(2025, 2, 22)).unwrap();

        assert_eq!(report.failed, 1);
        assert!(scheduler.store().load_all().unwrap().is_empty());
    }
}

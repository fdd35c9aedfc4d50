use clap::Subcommand;
use jobwatch_core::storage::{ReminderStore, ScheduledReminder};

use super::{parse_day, CliResult};

#[derive(Subcommand)]
pub enum RemindersAction {
    /// List scheduled reminders
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a reminder by hand
    Add {
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        date: String,
        /// Reminder text
        #[arg(long)]
        message: String,
    },
    /// Remove every scheduled reminder
    Clear,
}

pub fn run(action: RemindersAction) -> CliResult {
    let store = ReminderStore::open()?;
    match action {
        RemindersAction::List { json } => {
            let mut reminders = store.load_all()?;
            reminders.sort_by_key(|r| r.date);
            if json {
                println!("{}", serde_json::to_string_pretty(&reminders)?);
            } else if reminders.is_empty() {
                println!("no reminders scheduled");
            } else {
                for r in &reminders {
                    let first_line = r.message.lines().next().unwrap_or_default();
                    println!("{}  {first_line}", r.date.format("%Y-%m-%d"));
                }
            }
        }
        RemindersAction::Add { date, message } => {
            let date = parse_day(Some(&date))?;
            let mut reminders = store.load_all()?;
            reminders.push(ScheduledReminder::new(date, message));
            store.save_all(&reminders)?;
            println!("reminder added for {}", date.format("%Y-%m-%d"));
        }
        RemindersAction::Clear => {
            let count = store.load_all()?.len();
            store.save_all(&[])?;
            println!("{count} reminder(s) removed");
        }
    }
    Ok(())
}

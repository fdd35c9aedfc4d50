use clap::Subcommand;

use super::{notification_log, CliResult};

#[derive(Subcommand)]
pub enum LogAction {
    /// Print the notification log
    Show {
        /// Only the last N lines
        #[arg(long)]
        tail: Option<usize>,
    },
    /// Print the log file location
    Path,
}

pub fn run(action: LogAction) -> CliResult {
    let log = notification_log()?;
    match action {
        LogAction::Show { tail } => {
            let content = log.read_for_display();
            match tail {
                Some(n) => {
                    let lines: Vec<&str> = content.lines().collect();
                    let start = lines.len().saturating_sub(n);
                    for line in &lines[start..] {
                        println!("{line}");
                    }
                }
                None => print!("{}", ensure_trailing_newline(&content)),
            }
        }
        LogAction::Path => println!("{}", log.path().display()),
    }
    Ok(())
}

fn ensure_trailing_newline(content: &str) -> String {
    if content.ends_with('\n') {
        content.to_string()
    } else {
        format!("{content}\n")
    }
}

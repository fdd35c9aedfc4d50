use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
#[cfg(feature = "viewer")]
mod viewer;

#[derive(Parser)]
#[command(name = "jobwatch", version, about = "Watch a mailbox for job emails")]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the poll loop (with the notification viewer unless headless)
    Run {
        /// Run only the poll loop, without a window
        #[arg(long)]
        headless: bool,
    },
    /// Process new mail once and exit
    Process,
    /// Fire due reminders once and exit
    Check,
    /// Scheduled reminder management
    Reminders {
        #[command(subcommand)]
        action: commands::reminders::RemindersAction,
    },
    /// Classify, extract and summarize a text file offline
    Inspect(commands::inspect::InspectArgs),
    /// Notification log
    Log {
        #[command(subcommand)]
        action: commands::log::LogAction,
    },
    /// Open the notification viewer
    View,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Authentication management for mail and model services
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Generate shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run { headless } => commands::run::run(headless),
        Commands::Process => commands::process::process(),
        Commands::Check => commands::process::check(),
        Commands::Reminders { action } => commands::reminders::run(action),
        Commands::Inspect(args) => commands::inspect::run(args),
        Commands::Log { action } => commands::log::run(action),
        Commands::View => commands::run::view(),
        Commands::Config { action } => commands::config::run(action),
        Commands::Auth { action } => commands::auth::run(action),
        Commands::Completions { shell } => commands::completions::run(shell),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

use clap::Subcommand;
use jobwatch_core::integrations::{inference_token, keyring_store, HF_TOKEN_KEY};
use jobwatch_core::{Config, GmailSource};

use super::{runtime, CliResult};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Gmail: login / logout / status
    Gmail {
        #[command(subcommand)]
        action: AuthOp,
    },
    /// Inference API token for the summarizer and entity recognizer
    Huggingface {
        #[command(subcommand)]
        action: AuthOp,
    },
}

#[derive(Subcommand)]
pub enum AuthOp {
    /// Authenticate with the service
    Login {
        /// API token (for the inference API)
        #[arg(long)]
        token: Option<String>,
        /// OAuth client ID (for Gmail)
        #[arg(long)]
        client_id: Option<String>,
        /// OAuth client secret (for Gmail)
        #[arg(long)]
        client_secret: Option<String>,
    },
    /// Remove credentials
    Logout,
    /// Check authentication status
    Status,
}

pub fn run(action: AuthAction) -> CliResult {
    match action {
        AuthAction::Gmail { action: op } => handle_gmail(op),
        AuthAction::Huggingface { action: op } => handle_huggingface(op),
    }
}

fn handle_gmail(op: AuthOp) -> CliResult {
    let config = Config::load()?;
    match op {
        AuthOp::Login {
            client_id,
            client_secret,
            ..
        } => {
            if let (Some(cid), Some(csec)) = (client_id.as_deref(), client_secret.as_deref()) {
                GmailSource::set_credentials(cid, csec)?;
            } else if client_id.is_some() || client_secret.is_some() {
                return Err("--client-id and --client-secret must be given together".into());
            }
            let gmail = GmailSource::new(&config.gmail);
            if !gmail.has_credentials() {
                return Err("--client-id and --client-secret required for Gmail".into());
            }
            runtime()?.block_on(gmail.authenticate())?;
            println!("Gmail authenticated");
        }
        AuthOp::Logout => {
            GmailSource::new(&config.gmail).disconnect()?;
            println!("Gmail disconnected");
        }
        AuthOp::Status => {
            let gmail = GmailSource::new(&config.gmail);
            println!(
                "{}",
                if gmail.is_authenticated() {
                    "authenticated"
                } else {
                    "not authenticated"
                }
            );
        }
    }
    Ok(())
}

fn handle_huggingface(op: AuthOp) -> CliResult {
    match op {
        AuthOp::Login { token, .. } => {
            let tok = token.ok_or("--token required for the inference API")?;
            keyring_store::set(HF_TOKEN_KEY, &tok)?;
            println!("inference token stored");
        }
        AuthOp::Logout => {
            keyring_store::delete(HF_TOKEN_KEY)?;
            println!("inference token removed");
        }
        AuthOp::Status => {
            println!(
                "{}",
                if inference_token().is_some() {
                    "token configured"
                } else {
                    "no token"
                }
            );
        }
    }
    Ok(())
}

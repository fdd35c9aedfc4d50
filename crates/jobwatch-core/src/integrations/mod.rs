pub mod gmail;
pub mod oauth;

pub use gmail::GmailSource;

/// Keyring entry holding the inference API token.
pub const HF_TOKEN_KEY: &str = "huggingface_token";
/// Environment variable that overrides the stored inference token.
pub const HF_TOKEN_ENV: &str = "HF_API_TOKEN";

/// Inference API token from the environment, falling back to the keyring.
pub fn inference_token() -> Option<String> {
    std::env::var(HF_TOKEN_ENV)
        .ok()
        .filter(|t| !t.trim().is_empty())
        .or_else(|| keyring_store::get(HF_TOKEN_KEY).ok().flatten())
}

/// Thin wrapper around the OS keyring for credential storage.
pub mod keyring_store {
    use crate::error::Result;

    const SERVICE: &str = "jobwatch";

    pub fn get(key: &str) -> Result<Option<String>> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        match entry.get_password() {
            Ok(pw) => Ok(Some(pw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn set(key: &str, value: &str) -> Result<()> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        entry.set_password(value)?;
        Ok(())
    }

    pub fn delete(key: &str) -> Result<()> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

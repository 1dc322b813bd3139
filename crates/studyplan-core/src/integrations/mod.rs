pub mod traits;
pub mod trello;
pub mod udemy;

pub use traits::Integration;
pub use trello::{ExportSummary, TrelloClient, TrelloCredentials, TrelloIntegration};
pub use udemy::CurriculumClient;

/// Thin wrapper around the OS keyring for credential storage.
pub mod keyring_store {
    use crate::error::Result;

    const SERVICE: &str = "studyplan";

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

/// Keep at most `max` characters of a response body for error messages.
pub(crate) fn truncate_body(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

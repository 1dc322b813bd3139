use crate::error::Result;

/// Every external service the app talks to implements this trait.
/// Integrations are stateless between calls -- credentials come from
/// the OS keyring, looked up by `name()`.
pub trait Integration: Send + Sync {
    /// Unique identifier (e.g. "udemy", "trello").
    fn name(&self) -> &str;

    /// Human-readable display name.
    fn display_name(&self) -> &str;

    /// Whether the service can be used right now.
    fn is_authenticated(&self) -> bool;

    /// Remove stored credentials.
    fn disconnect(&mut self) -> Result<()> {
        Ok(()) // default no-op
    }
}

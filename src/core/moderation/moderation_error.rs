// Errors shared by every moderation service.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModerationError {
    /// The validator rejected the input. Always surfaced to the caller.
    #[error("Invalid content: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// The input could not be scored (malformed post, non-finite numbers...).
    #[error("Computation error: {0}")]
    Computation(String),

    /// A health check failed. Only ever seen inside `get_health`.
    #[error("Health check failed: {0}")]
    Health(String),
}

impl ModerationError {
    pub fn is_validation(&self) -> bool {
        matches!(self, ModerationError::Validation(_))
    }
}

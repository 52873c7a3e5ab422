// Validation port - the contract every input validator has to satisfy.
//
// The moderation core never inspects raw user text directly. Everything goes
// through a ContentValidator first, which rejects malicious input and hands back
// a sanitized copy. The default implementation lives in infra/validation.

use serde::{Deserialize, Serialize};

/// Outcome of validating a single piece of user input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    /// Cleaned-up input, only present when `is_valid` is true.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sanitized: Option<String>,
    pub errors: Vec<String>,
}

impl ValidationResult {
    /// Create a passing result carrying the sanitized input.
    pub fn valid(sanitized: String) -> Self {
        Self {
            is_valid: true,
            sanitized: Some(sanitized),
            errors: Vec::new(),
        }
    }

    /// Create a failing result with a single error message.
    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            sanitized: None,
            errors: vec![error.into()],
        }
    }

    /// The text downstream code should analyse: the sanitized copy when there is
    /// one, otherwise the original input.
    pub fn text_or<'a>(&'a self, original: &'a str) -> &'a str {
        self.sanitized.as_deref().unwrap_or(original)
    }
}

/// Trait for validating and sanitizing user-supplied input.
///
/// Implementations must reject XSS and SQL-injection patterns, enforce length and
/// charset limits, and sanitize idempotently (sanitizing sanitized text is a no-op).
pub trait ContentValidator: Send + Sync {
    /// Validate post content.
    fn validate_content(&self, content: &str) -> ValidationResult;

    /// Validate a link before it is followed or displayed.
    fn validate_url(&self, url: &str) -> ValidationResult;

    /// Validate an author display name.
    fn validate_author(&self, author: &str) -> ValidationResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_or_prefers_sanitized_copy() {
        let result = ValidationResult::valid("clean".to_string());
        assert_eq!(result.text_or("<dirty>"), "clean");

        let rejected = ValidationResult::invalid("nope");
        assert_eq!(rejected.text_or("original"), "original");
        assert_eq!(rejected.errors, vec!["nope".to_string()]);
    }
}

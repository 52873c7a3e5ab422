// Default implementation of the ContentValidator port.
//
// Checks, in order:
// - emptiness and length limits
// - script injection (XSS) markers
// - SQL injection markers
//
// Anything that passes is sanitized: angle brackets, `javascript:` and inline
// event handlers are stripped and the result is trimmed. Sanitization is applied
// until nothing changes, so running it twice never alters the output.

use crate::core::validation::{ContentValidator, ValidationResult};
use once_cell::sync::Lazy;
use regex::Regex;

pub const DEFAULT_MAX_CONTENT_LENGTH: usize = 10_000;
const MAX_URL_LENGTH: usize = 2_048;
const MAX_AUTHOR_LENGTH: usize = 100;

static XSS_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)<script\b",
        r"(?i)javascript:",
        r"(?i)\bon\w+\s*=",
        r"(?i)<iframe\b",
        r"(?i)<object\b",
        r"(?i)<embed\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("XSS pattern is valid"))
    .collect()
});

static SQL_INJECTION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // ' OR 1=1 / ' AND 'a'='a
        r"(?i)'\s*(or|and)\s+('[^']*'|\w+)\s*=",
        // '; DROP ...
        r"(?i);\s*(select|update|delete|insert|drop|create|alter|exec|union)\b",
        // admin'-- / ...; --
        r"(?m)('|;)\s*--\s*$",
        r"(?i)\bunion\s+(all\s+)?select\b",
        r"(?i)\b(drop|alter|create|truncate)\s+table\b",
        r"(?i)\bdelete\s+from\b",
        r"(?i)\binsert\s+into\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("SQL injection pattern is valid"))
    .collect()
});

static ANGLE_BRACKETS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[<>]").expect("valid regex"));
static JS_PROTOCOL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)javascript:").expect("valid regex"));
static EVENT_HANDLER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bon\w+\s*=").expect("valid regex"));

static URL_FORMAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[a-z][a-z0-9+.\-]*://[^\s/?#]+[^\s]*$").expect("valid regex")
});
static AUTHOR_CHARSET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9\s\-_.]+$").expect("valid regex"));

const UNSAFE_PROTOCOLS: [&str; 4] = ["javascript:", "data:", "vbscript:", "file:"];

/// Security-focused validator used by the moderation services.
#[derive(Debug, Clone)]
pub struct InputValidator {
    max_content_length: usize,
}

impl InputValidator {
    pub fn new() -> Self {
        Self {
            max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
        }
    }

    /// Override the maximum post length (counted in characters).
    pub fn with_max_content_length(mut self, max_content_length: usize) -> Self {
        self.max_content_length = max_content_length;
        self
    }

    fn contains_xss(content: &str) -> bool {
        XSS_PATTERNS.iter().any(|p| p.is_match(content))
    }

    fn contains_sql_injection(content: &str) -> bool {
        SQL_INJECTION_PATTERNS.iter().any(|p| p.is_match(content))
    }

    /// Strip dangerous fragments until the text stops changing.
    pub fn sanitize(input: &str) -> String {
        let mut current = input.to_string();
        loop {
            let stripped = ANGLE_BRACKETS.replace_all(&current, "");
            let stripped = JS_PROTOCOL.replace_all(&stripped, "");
            let stripped = EVENT_HANDLER.replace_all(&stripped, "");
            let next = stripped.trim().to_string();

            if next == current {
                return next;
            }
            current = next;
        }
    }
}

impl Default for InputValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentValidator for InputValidator {
    fn validate_content(&self, content: &str) -> ValidationResult {
        if content.trim().is_empty() {
            return ValidationResult::invalid("Content cannot be empty");
        }

        if content.chars().count() > self.max_content_length {
            return ValidationResult::invalid("Content exceeds maximum length");
        }

        if Self::contains_xss(content) {
            return ValidationResult::invalid("Content contains potentially malicious scripts");
        }

        if Self::contains_sql_injection(content) {
            return ValidationResult::invalid("Content contains SQL injection patterns");
        }

        let sanitized = Self::sanitize(content);
        if sanitized.is_empty() {
            return ValidationResult::invalid("Content cannot be empty");
        }

        ValidationResult::valid(sanitized)
    }

    fn validate_url(&self, url: &str) -> ValidationResult {
        if url.chars().count() > MAX_URL_LENGTH {
            return ValidationResult::invalid("URL too long");
        }

        let lower = url.trim().to_lowercase();
        if UNSAFE_PROTOCOLS.iter().any(|p| lower.starts_with(p)) {
            return ValidationResult::invalid("URL contains potentially unsafe protocol");
        }

        if !URL_FORMAT.is_match(url) {
            return ValidationResult::invalid("Invalid URL format");
        }

        ValidationResult::valid(url.to_string())
    }

    fn validate_author(&self, author: &str) -> ValidationResult {
        if author.is_empty() {
            return ValidationResult::invalid("Author name cannot be empty");
        }

        if author.chars().count() > MAX_AUTHOR_LENGTH {
            return ValidationResult::invalid("Author name too long");
        }

        if !AUTHOR_CHARSET.is_match(author) {
            return ValidationResult::invalid("Invalid characters in author name");
        }

        ValidationResult::valid(Self::sanitize(author))
    }
}

// Content analysis - classifies raw post text.
//
// Produces the sentiment class, link statistics and a rough language-quality
// score. The free functions below are shared with the spam detector and the
// credibility assessor so every component measures text the same way.

use super::moderation_error::ModerationError;
use super::moderation_models::{ContentAnalysis, Sentiment};
use super::rules::{rules_for, RuleCategory};
use crate::core::validation::ContentValidator;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

static LINK_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(https?://\S+)|(\w+\.\w+/\S*)").expect("link regex is valid"));
static HTTP_LINK_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://\S+").expect("http link regex is valid"));

/// Analyzer for a single piece of post text.
pub struct ContentAnalyzer {
    validator: Arc<dyn ContentValidator>,
}

impl ContentAnalyzer {
    pub fn new(validator: Arc<dyn ContentValidator>) -> Self {
        Self { validator }
    }

    /// Validate, sanitize and classify `content`.
    pub fn analyze_content(&self, content: &str) -> Result<ContentAnalysis, ModerationError> {
        let validation = self.validator.validate_content(content);
        if !validation.is_valid {
            tracing::warn!(
                errors = ?validation.errors,
                "Invalid content provided to content analyzer"
            );
            return Err(ModerationError::Validation(validation.errors));
        }

        let analysis = analyze_text(validation.text_or(content));
        tracing::debug!(
            sentiment = ?analysis.sentiment,
            link_count = analysis.link_count,
            language_quality = analysis.language_quality,
            "Content analysis completed"
        );
        Ok(analysis)
    }
}

/// Classify already-sanitized text.
pub fn analyze_text(text: &str) -> ContentAnalysis {
    ContentAnalysis {
        sentiment: classify_sentiment(text),
        link_count: count_links(text),
        suspicious_links: suspicious_links(text),
        language_quality: language_quality(text),
    }
}

/// Promotional wins over informative; everything else is neutral.
pub fn classify_sentiment(text: &str) -> Sentiment {
    if rules_for(RuleCategory::Promotional).any_match(text) {
        Sentiment::Promotional
    } else if rules_for(RuleCategory::Informative).any_match(text) {
        Sentiment::Informative
    } else {
        Sentiment::Neutral
    }
}

/// URL-like tokens: full http(s) links or bare `host.tld/path` fragments.
pub fn extract_links(text: &str) -> Vec<String> {
    LINK_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Only fully qualified http(s) links.
pub fn extract_http_links(text: &str) -> Vec<String> {
    HTTP_LINK_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

pub fn count_links(text: &str) -> usize {
    LINK_PATTERN.find_iter(text).count()
}

/// Links pointing at shorteners, invite links and the like.
pub fn suspicious_links(text: &str) -> Vec<String> {
    let suspicious = rules_for(RuleCategory::Suspicious);
    extract_links(text)
        .into_iter()
        .filter(|link| suspicious.any_match(link))
        .collect()
}

/// Heuristic 0.0 - 1.0 score. Word lengths are counted in characters.
pub fn language_quality(text: &str) -> f64 {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return 0.0;
    }

    let word_count = words.len() as f64;
    let total_len: usize = words.iter().map(|w| w.chars().count()).sum();
    let avg_word_len = total_len as f64 / word_count;
    let has_punctuation = text.contains(&['.', '!', '?'][..]);
    let longer_words = words.iter().filter(|w| w.chars().count() > 2).count() as f64;

    let mut quality: f64 = 0.5;
    if avg_word_len > 4.0 {
        quality += 0.2;
    }
    if has_punctuation {
        quality += 0.2;
    }
    if longer_words / word_count > 0.8 {
        quality += 0.1;
    }

    quality.min(1.0)
}

/// Pictographic emoji, symbols and dingbats, counted per code point.
pub fn count_emojis(text: &str) -> usize {
    text.chars().filter(|c| is_emoji(*c)).count()
}

fn is_emoji(c: char) -> bool {
    matches!(
        c as u32,
        0x1F600..=0x1F64F
            | 0x1F300..=0x1F5FF
            | 0x1F680..=0x1F6FF
            | 0x1F1E0..=0x1F1FF
            | 0x2600..=0x26FF
            | 0x2700..=0x27BF
    )
}

/// Fraction of characters that are uppercase ASCII letters.
pub fn uppercase_ratio(text: &str) -> f64 {
    let total = text.chars().count();
    if total == 0 {
        return 0.0;
    }
    let upper = text.chars().filter(|c| c.is_ascii_uppercase()).count();
    upper as f64 / total as f64
}

// Spam detection - two tiers over the same rule tables.
//
// - `detect_spam`: cheap synchronous screen used by the submission gate before a
//   post is accepted. Never fails; invalid input is simply "not spam" with the
//   validator's messages as reasons.
// - `analyze_spam`: the authoritative, cached score the moderation queue reads
//   (risk score, risk flags, factor breakdown).
//
// The two tiers use different scales and thresholds and may disagree; only
// `analyze_spam` should drive moderation decisions.

use super::content_analyzer::{count_emojis, count_links, suspicious_links, uppercase_ratio};
use super::content_analyzer::{classify_sentiment, language_quality};
use super::moderation_error::ModerationError;
use super::moderation_models::{
    Post, QuickSpamCheck, SpamContentAnalysis, SpamDetectionResult, SpamFactors,
};
use super::result_cache::{CacheError, CacheKey, ResultCache};
use super::rules::{quick_screen_rules, rules_for, scam_risk_rules, RuleCategory};
use crate::core::validation::ContentValidator;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;

const HEALTH_CHECK_POST_ID: &str = "__spam_health_check__";

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct SpamDetector<C: ResultCache<SpamDetectionResult>> {
    validator: Arc<dyn ContentValidator>,
    cache: C,
}

impl<C: ResultCache<SpamDetectionResult>> SpamDetector<C> {
    pub fn new(validator: Arc<dyn ContentValidator>, cache: C) -> Self {
        Self { validator, cache }
    }

    /// Quick screen for the submission gate.
    pub fn detect_spam(&self, content: &str) -> QuickSpamCheck {
        let validation = self.validator.validate_content(content);
        if !validation.is_valid {
            return QuickSpamCheck::rejected(validation.errors);
        }

        let check = quick_screen(validation.text_or(content));
        tracing::debug!(
            is_spam = check.is_spam,
            confidence = check.confidence,
            reasons = ?check.reasons,
            "Quick spam detection completed"
        );
        check
    }

    /// Full spam analysis, cached per post revision.
    pub async fn analyze_spam(&self, post: &Post) -> Result<SpamDetectionResult, ModerationError> {
        let validation = self.validator.validate_content(&post.content);
        if !validation.is_valid {
            tracing::warn!(
                post_id = %post.id,
                errors = ?validation.errors,
                "Invalid content provided to spam detector"
            );
            return Err(ModerationError::Validation(validation.errors));
        }

        let key = CacheKey::for_post(post);
        match self.cache.get(&key) {
            Ok(Some(cached)) => {
                tracing::debug!(post_id = %post.id, "Returning cached spam analysis result");
                return Ok(cached);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(post_id = %post.id, error = %e, "Spam cache read failed, recomputing");
            }
        }

        let result = score_post(post, validation.text_or(&post.content));

        if let Err(e) = self.cache.insert(key, result.clone()) {
            tracing::warn!(post_id = %post.id, error = %e, "Failed to cache spam analysis");
        }

        tracing::info!(
            post_id = %post.id,
            is_spam = result.is_spam,
            risk_score = result.risk_score,
            confidence = result.confidence,
            "Spam analysis completed"
        );
        Ok(result)
    }

    pub fn clear_cache(&self) -> Result<(), CacheError> {
        self.cache.clear()
    }

    pub fn invalidate_post(&self, post_id: &str) -> Result<usize, CacheError> {
        self.cache.invalidate_post(post_id)
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Exercise the cache's write path without touching real entries.
    pub fn check_cache(&self) -> Result<usize, CacheError> {
        self.cache.invalidate_post(HEALTH_CHECK_POST_ID)?;
        Ok(self.cache.len())
    }
}

// ============================================================================
// SCORING
// ============================================================================

/// Score sanitized text for the submission gate.
pub fn quick_screen(text: &str) -> QuickSpamCheck {
    let mut reasons = Vec::new();
    let mut score = 0.0;

    if count_emojis(text) > 5 {
        score += 30.0;
        reasons.push("Excessive emojis".to_string());
    }

    let hits = quick_screen_rules().evaluate(text);
    score += hits.score;
    if hits.any(RuleCategory::Promotional) {
        reasons.push("Promotional language".to_string());
    }
    if hits.any(RuleCategory::Scam) {
        reasons.push("Scam indicators".to_string());
    }

    if rules_for(RuleCategory::Suspicious).any_match(text) {
        score += 40.0;
        reasons.push("Suspicious links".to_string());
    }

    if uppercase_ratio(text) > 0.3 {
        score += 20.0;
        reasons.push("Excessive capitals".to_string());
    }

    QuickSpamCheck {
        is_spam: score > 50.0,
        confidence: (score / 100.0).min(1.0),
        reasons,
    }
}

/// Compute the seven spam factors for a post whose content is `text`.
pub fn spam_factors(post: &Post, text: &str) -> SpamFactors {
    SpamFactors {
        repetitive_content: rules_for(RuleCategory::Repetitive).any_match(text),
        suspicious_links: rules_for(RuleCategory::Suspicious).any_match(text),
        promo_phrases: rules_for(RuleCategory::Promotional).match_count(text) >= 2,
        bot_like_pattern: is_bot_like(post),
        duplicate_content: unique_word_ratio(text) < 0.6,
        excessive_emojis: count_emojis(text) as f64 > text.chars().count() as f64 * 0.1,
        excessive_caps: uppercase_ratio(text) > 0.3,
    }
}

/// Full risk analysis of one post. `text` is the sanitized content.
pub fn score_post(post: &Post, text: &str) -> SpamDetectionResult {
    let factors = spam_factors(post, text);
    let risk_score = risk_score(&factors, text);
    let confidence = (factors.count() as f64 / 4.0).min(1.0);

    SpamDetectionResult {
        post_id: post.id.clone(),
        is_spam: risk_score > 70 && confidence > 0.6,
        confidence,
        risk_flags: risk_flags(&factors, risk_score),
        content_analysis: SpamContentAnalysis {
            sentiment: classify_sentiment(text),
            link_count: count_links(text),
            suspicious_links: suspicious_links(text),
            detected_copy_paste: factors.duplicate_content || factors.repetitive_content,
            language_quality: language_quality(text),
        },
        factors,
        risk_score,
        processed_at: Utc::now(),
    }
}

fn risk_score(factors: &SpamFactors, text: &str) -> u8 {
    let weighted = [
        (factors.repetitive_content, 25.0),
        (factors.suspicious_links, 30.0),
        (factors.promo_phrases, 35.0),
        (factors.bot_like_pattern, 20.0),
        (factors.duplicate_content, 15.0),
        (factors.excessive_emojis, 10.0),
        (factors.excessive_caps, 15.0),
    ];
    let mut score: f64 = weighted
        .iter()
        .filter(|(fired, _)| *fired)
        .map(|(_, weight)| weight)
        .sum();
    score += scam_risk_rules().evaluate(text).score;

    score.clamp(0.0, 100.0) as u8
}

fn risk_flags(factors: &SpamFactors, risk_score: u8) -> Vec<String> {
    let mut flags = Vec::new();
    if factors.suspicious_links {
        flags.push("Suspicious Links".to_string());
    }
    if factors.promo_phrases {
        flags.push("Promotional Language".to_string());
    }
    if factors.repetitive_content {
        flags.push("Repetitive Content".to_string());
    }
    if factors.bot_like_pattern {
        flags.push("Bot-like Pattern".to_string());
    }
    if risk_score > 80 {
        flags.push("High Risk Content".to_string());
    }
    flags
}

/// Many tickers and tags around almost no text.
fn is_bot_like(post: &Post) -> bool {
    post.cashtags.len() > 5 && post.hashtags.len() > 8 && post.content.chars().count() < 50
}

/// Distinct words over total words, ignoring case. 1.0 for text without words.
fn unique_word_ratio(text: &str) -> f64 {
    let words: Vec<String> = text.split_whitespace().map(str::to_lowercase).collect();
    if words.is_empty() {
        return 1.0;
    }
    let unique: HashSet<&String> = words.iter().collect();
    unique.len() as f64 / words.len() as f64
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::cache::TtlCache;
    use crate::infra::validation::InputValidator;
    use chrono::{Duration as ChronoDuration, TimeZone};
    use std::time::Duration;

    fn detector() -> SpamDetector<TtlCache<SpamDetectionResult>> {
        SpamDetector::new(
            Arc::new(InputValidator::new()),
            TtlCache::new(Duration::from_secs(300), 1000),
        )
    }

    fn post(id: &str, content: &str) -> Post {
        let mut post = Post::new(id, "alice", content);
        post.updated_at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        post
    }

    #[test]
    fn quick_check_flags_scam_pitch() {
        let check = detector().detect_spam(
            "Guaranteed 100% profit! Join my Telegram channel for insider trading signals!",
        );
        assert!(check.is_spam);
        assert_eq!(check.confidence, 1.0);
        assert!(check.reasons.contains(&"Promotional language".to_string()));
        assert!(check.reasons.contains(&"Scam indicators".to_string()));
        assert!(check.reasons.contains(&"Suspicious links".to_string()));
    }

    #[test]
    fn quick_check_on_empty_content() {
        let check = detector().detect_spam("");
        assert!(!check.is_spam);
        assert_eq!(check.confidence, 0.0);
        assert!(check
            .reasons
            .iter()
            .any(|reason| reason.contains("cannot be empty")));
    }

    #[test]
    fn quick_check_passes_ordinary_text() {
        let check = detector().detect_spam("Trimmed my position after the earnings call.");
        assert!(!check.is_spam);
        assert!(check.reasons.is_empty());
        assert_eq!(check.confidence, 0.0);
    }

    #[test]
    fn quick_check_counts_caps_and_emojis() {
        let check = quick_screen("MOON NOW 🚀🚀🚀🚀🚀🚀");
        assert_eq!(
            check.reasons,
            vec!["Excessive emojis".to_string(), "Excessive capitals".to_string()]
        );
        // 30 + 20 sits exactly on the threshold
        assert!(!check.is_spam);
        assert!((check.confidence - 0.5).abs() < 1e-9);
    }

    #[test]
    fn bot_like_pattern_needs_all_three_signals() {
        let mut bot = post("bot", "moon soon!");
        assert_eq!(bot.content.chars().count(), 10);
        bot.cashtags = (0..6).map(|i| format!("$T{i}")).collect();
        bot.hashtags = (0..9).map(|i| format!("#tag{i}")).collect();
        assert!(spam_factors(&bot, &bot.content).bot_like_pattern);

        bot.hashtags.pop();
        assert!(!spam_factors(&bot, &bot.content).bot_like_pattern);
    }

    #[test]
    fn scam_pitch_scores_high_without_enough_corroboration() {
        let text = "Guaranteed profit with zero risk, this is risk free. Join my channel on t.me/signals";
        let result = score_post(&post("p1", text), text);

        assert!(result.factors.promo_phrases);
        assert!(result.factors.suspicious_links);
        assert_eq!(result.factors.count(), 2);
        assert_eq!(result.confidence, 0.5);
        assert_eq!(result.risk_score, 65);
        assert!(!result.is_spam);
        assert_eq!(
            result.risk_flags,
            vec!["Suspicious Links".to_string(), "Promotional Language".to_string()]
        );
        assert_eq!(result.content_analysis.suspicious_links, vec!["t.me/signals"]);
    }

    #[test]
    fn corroborated_spam_is_flagged() {
        let text = format!(
            "BUYYYY NOW!!! easy money, guaranteed profit. {}",
            "bit.ly/pump ".repeat(6)
        );
        let result = score_post(&post("p2", &text), &text);

        assert!(result.factors.repetitive_content);
        assert!(result.factors.suspicious_links);
        assert!(result.factors.promo_phrases);
        assert!(result.factors.duplicate_content);
        assert!(result.factors.count() >= 4);
        assert_eq!(result.risk_score, 100);
        assert!(result.is_spam);
        assert!(result.risk_flags.contains(&"High Risk Content".to_string()));
        assert!(result.content_analysis.detected_copy_paste);
    }

    #[test]
    fn case_is_preserved_for_caps_checks() {
        let text = "AAAA THIS IS LOUD";
        let factors = spam_factors(&post("p3", text), text);
        assert!(factors.excessive_caps);
        assert!(factors.repetitive_content);
    }

    #[test]
    fn scores_stay_in_range() {
        let corpus = [
            "gm",
            "Quarterly results beat estimates, revenue growth 12%.",
            "🚀🚀🚀🚀🚀🚀🚀🚀🚀🚀",
            "act now act now act now act now act now act now",
            "send bitcoin for this investment opportunity, limited time offer, act now, exclusive deal",
            "Guaranteed profit! Risk free! Easy money! Instant wealth! dm for signals bit.ly/x",
        ];
        for (i, text) in corpus.iter().enumerate() {
            let result = score_post(&post(&format!("c{i}"), text), text);
            assert!(result.risk_score <= 100);
            assert!((0.0..=1.0).contains(&result.confidence));

            let check = quick_screen(text);
            assert!((0.0..=1.0).contains(&check.confidence));
        }
    }

    #[tokio::test]
    async fn analyze_spam_is_cached_per_revision() {
        let detector = detector();
        let mut p = post("p4", "Data shows margins expanding this quarter.");

        let first = detector.analyze_spam(&p).await.unwrap();
        let second = detector.analyze_spam(&p).await.unwrap();
        assert_eq!(first.processed_at, second.processed_at);
        assert_eq!(first.risk_score, second.risk_score);
        assert_eq!(detector.cache_len(), 1);

        p.updated_at = p.updated_at + ChronoDuration::seconds(1);
        detector.analyze_spam(&p).await.unwrap();
        assert_eq!(detector.cache_len(), 2);

        assert_eq!(detector.invalidate_post("p4").unwrap(), 2);
        detector.clear_cache().unwrap();
        assert_eq!(detector.cache_len(), 0);
    }

    #[tokio::test]
    async fn analyze_spam_rejects_invalid_content() {
        let detector = detector();
        let err = detector
            .analyze_spam(&post("p5", "<script>alert(1)</script>"))
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(detector.cache_len(), 0);
    }

    #[test]
    fn cache_check_leaves_entries_alone() {
        let detector = detector();
        assert_eq!(detector.check_cache().unwrap(), 0);
    }
}

// Credibility assessment - how much a post can be trusted.
//
// Two scorers live here:
// - `calculate_credibility`: the full, cached assessment of a `Post`. Produces the
//   factor breakdown, the content-type classification and the community tallies.
// - `calculate_simple_credibility_score`: a lightweight synchronous number for call
//   sites that only hold raw text, an author name and engagement counts.
//
// The two formulas are independent and can disagree for the same text. See
// credibility_strategy.rs for which one wins when both are possible.
//
// Community votes go through the `CommunityVoteStore` port. Votes show up in the
// community fields of `PostCredibility` but never move `score`.

use super::content_analyzer::{extract_http_links, language_quality};
use super::moderation_error::ModerationError;
use super::moderation_models::{
    AiAnalysis, CommunityVotes, ContentType, CredibilityFactors, CredibilityLevel, Post,
    PostCredibility, SimplePostInput, VoteType,
};
use super::result_cache::{CacheError, CacheKey, ResultCache};
use super::rules::{
    ai_verification_rules, lightweight_credibility_rules, rules_for, RuleCategory, SOURCE_DOMAINS,
};
use crate::core::validation::ContentValidator;
use async_trait::async_trait;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use thiserror::Error;

pub const DEFAULT_AUTHOR_RELIABILITY: f64 = 50.0;
const NEUTRAL_SIMPLE_SCORE: u8 = 50;
const MAX_FACTUAL_CLAIMS: usize = 5;
const MAX_VERIFICATION_SOURCES: usize = 3;
const HEALTH_CHECK_POST_ID: &str = "__credibility_health_check__";

static PRICE_TARGET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\d+(\.\d+)?").expect("price target regex is valid"));
static PERCENTAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(\.\d+)?%").expect("percentage regex is valid"));

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum VoteStoreError {
    #[error("Storage error: {0}")]
    StorageError(String),
}

impl From<VoteStoreError> for ModerationError {
    fn from(err: VoteStoreError) -> Self {
        ModerationError::Computation(err.to_string())
    }
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

/// Trait for persisting community votes on posts.
#[async_trait]
pub trait CommunityVoteStore: Send + Sync {
    /// Record one vote. Returns the post's tallies after the vote.
    async fn record_vote(
        &self,
        post_id: &str,
        vote: VoteType,
    ) -> Result<CommunityVotes, VoteStoreError>;

    /// Current tallies for a post. Posts nobody voted on have all-zero tallies.
    async fn get_votes(&self, post_id: &str) -> Result<CommunityVotes, VoteStoreError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct CredibilityAssessor<C, V>
where
    C: ResultCache<PostCredibility>,
    V: CommunityVoteStore,
{
    validator: Arc<dyn ContentValidator>,
    cache: C,
    votes: V,
    default_author_reliability: f64,
}

impl<C, V> CredibilityAssessor<C, V>
where
    C: ResultCache<PostCredibility>,
    V: CommunityVoteStore,
{
    pub fn new(validator: Arc<dyn ContentValidator>, cache: C, votes: V) -> Self {
        Self {
            validator,
            cache,
            votes,
            default_author_reliability: DEFAULT_AUTHOR_RELIABILITY,
        }
    }

    /// Reliability assumed when the caller does not supply one.
    pub fn with_default_author_reliability(mut self, reliability: f64) -> Self {
        self.default_author_reliability = reliability;
        self
    }

    pub fn default_author_reliability(&self) -> f64 {
        self.default_author_reliability
    }

    /// Full credibility assessment, cached per post revision.
    ///
    /// `author_reliability` (0-100) defaults to the configured value. Out-of-range
    /// values are clamped; NaN or infinity is rejected.
    ///
    /// The cache key is the post revision only, so a cached result is returned
    /// even if a different reliability is passed within the TTL.
    pub async fn calculate_credibility(
        &self,
        post: &Post,
        author_reliability: Option<f64>,
    ) -> Result<PostCredibility, ModerationError> {
        let validation = self.validator.validate_content(&post.content);
        if !validation.is_valid {
            tracing::warn!(
                post_id = %post.id,
                errors = ?validation.errors,
                "Invalid content provided to credibility assessor"
            );
            return Err(ModerationError::Validation(validation.errors));
        }

        let reliability = author_reliability.unwrap_or(self.default_author_reliability);
        if !reliability.is_finite() {
            tracing::error!(post_id = %post.id, reliability, "Author reliability is not a finite number");
            return Err(ModerationError::Computation(format!(
                "author reliability must be finite, got {reliability}"
            )));
        }
        let reliability = reliability.clamp(0.0, 100.0);

        let key = CacheKey::for_post(post);
        match self.cache.get(&key) {
            Ok(Some(cached)) => {
                tracing::debug!(post_id = %post.id, "Returning cached credibility result");
                return Ok(cached);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(post_id = %post.id, error = %e, "Credibility cache read failed, recomputing");
            }
        }

        let votes = self.votes.get_votes(&post.id).await.map_err(|e| {
            tracing::error!(post_id = %post.id, error = %e, "Failed to load community votes");
            ModerationError::from(e)
        })?;

        let credibility = assess_post(post, validation.text_or(&post.content), reliability, votes);

        if let Err(e) = self.cache.insert(key, credibility.clone()) {
            tracing::warn!(post_id = %post.id, error = %e, "Failed to cache credibility result");
        }

        tracing::info!(
            post_id = %post.id,
            score = credibility.score,
            level = ?credibility.level,
            "Credibility analysis completed"
        );
        Ok(credibility)
    }

    /// Lightweight score for call sites without a full post. Never fails.
    pub fn calculate_simple_credibility_score(&self, input: &SimplePostInput) -> u8 {
        simple_credibility_score(self.validator.as_ref(), input)
    }

    /// Record a community vote and drop every cached assessment of the post.
    pub async fn update_credibility_from_community(
        &self,
        post_id: &str,
        vote: VoteType,
    ) -> Result<(), ModerationError> {
        let tallies = self.votes.record_vote(post_id, vote).await.map_err(|e| {
            tracing::error!(post_id, vote = %vote, error = %e, "Failed to record community vote");
            ModerationError::from(e)
        })?;

        match self.cache.invalidate_post(post_id) {
            Ok(removed) => {
                tracing::debug!(post_id, removed, "Invalidated cached credibility");
            }
            Err(e) => {
                tracing::warn!(post_id, error = %e, "Failed to invalidate cached credibility");
            }
        }

        tracing::info!(
            post_id,
            vote = %vote,
            total_votes = tallies.total(),
            "Community credibility vote recorded"
        );
        Ok(())
    }

    pub fn clear_cache(&self) -> Result<(), CacheError> {
        self.cache.clear()
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
// FULL ASSESSMENT
// ============================================================================

/// Assess one post. `text` is the sanitized content and `reliability` is already
/// clamped to 0-100.
pub fn assess_post(
    post: &Post,
    text: &str,
    reliability: f64,
    votes: CommunityVotes,
) -> PostCredibility {
    let has_source_links = has_source_links(text);
    let has_data_evidence = has_data_evidence(text);

    let factors = CredibilityFactors {
        has_source_links,
        has_data_evidence,
        author_reliability: reliability,
        community_votes: votes.total(),
        ai_verification_score: ai_verification_score(text),
    };

    let ai_analysis = AiAnalysis {
        content_type: classify_content_type(text),
        factual_claims: extract_factual_claims(text),
        verification_sources: verification_sources(text),
        confidence_score: ai_confidence(text),
        risk_flags: content_risk_flags(text),
    };

    let score = credibility_score(&factors, &ai_analysis);
    let now = Utc::now();

    PostCredibility {
        post_id: post.id.clone(),
        score,
        level: CredibilityLevel::from_score(score),
        community_score: votes.community_score(),
        community_votes: votes,
        factors,
        ai_analysis,
        last_updated: now,
        calculated_at: now,
    }
}

/// Allow-listed http(s) links, or a named citation of a filing or wire service.
pub fn has_source_links(text: &str) -> bool {
    !verification_sources(text).is_empty()
        || rules_for(RuleCategory::SourceCitation).any_match(text)
}

pub fn has_data_evidence(text: &str) -> bool {
    rules_for(RuleCategory::DataEvidence).any_match(text)
}

/// Up to three links pointing at allow-listed domains.
pub fn verification_sources(text: &str) -> Vec<String> {
    extract_http_links(text)
        .into_iter()
        .filter(|link| {
            let link = link.to_lowercase();
            SOURCE_DOMAINS.iter().any(|domain| link.contains(domain))
        })
        .take(MAX_VERIFICATION_SOURCES)
        .collect()
}

pub fn ai_verification_score(text: &str) -> u8 {
    let mut score = 50.0;
    if has_source_links(text) {
        score += 25.0;
    }
    if has_data_evidence(text) {
        score += 20.0;
    }
    score += ai_verification_rules().evaluate(text).score;
    clamp_score(score)
}

pub fn classify_content_type(text: &str) -> ContentType {
    if has_source_links(text) && has_data_evidence(text) {
        ContentType::DataBacked
    } else if rules_for(RuleCategory::Promotional).any_match(text) {
        ContentType::Promotional
    } else if rules_for(RuleCategory::Speculative).any_match(text) {
        ContentType::Speculative
    } else {
        ContentType::Opinion
    }
}

/// Price targets first, then percentages, at most five in total.
pub fn extract_factual_claims(text: &str) -> Vec<String> {
    PRICE_TARGET
        .find_iter(text)
        .chain(PERCENTAGE.find_iter(text))
        .map(|m| m.as_str().to_string())
        .take(MAX_FACTUAL_CLAIMS)
        .collect()
}

/// Fraction of five quality checks that pass.
pub fn ai_confidence(text: &str) -> f64 {
    let checks = [
        has_source_links(text),
        has_data_evidence(text),
        text.chars().count() > 100,
        !text.contains("!!"),
        language_quality(text) > 0.7,
    ];
    checks.iter().filter(|passed| **passed).count() as f64 / checks.len() as f64
}

pub fn content_risk_flags(text: &str) -> Vec<String> {
    let mut flags = Vec::new();
    if rules_for(RuleCategory::Promotional).any_match(text) {
        flags.push("Promotional Content".to_string());
    }
    flags
}

fn credibility_score(factors: &CredibilityFactors, ai: &AiAnalysis) -> u8 {
    let mut score = 40.0;
    if factors.has_source_links {
        score += 25.0;
    }
    if factors.has_data_evidence {
        score += 20.0;
    }
    score += (f64::from(factors.ai_verification_score) - 50.0) * 0.3;
    score += (factors.author_reliability - 50.0) * 0.2;
    score -= ai.risk_flags.len() as f64 * 10.0;
    if ai.confidence_score > 0.8 {
        score += 10.0;
    }
    clamp_score(score)
}

// ============================================================================
// LIGHTWEIGHT SCORE
// ============================================================================

/// Lightweight credibility for raw input. Invalid content scores a neutral 50.
pub fn simple_credibility_score(validator: &dyn ContentValidator, input: &SimplePostInput) -> u8 {
    let validation = validator.validate_content(&input.content);
    if !validation.is_valid {
        tracing::warn!(errors = ?validation.errors, "Invalid content in simple credibility scoring");
        return NEUTRAL_SIMPLE_SCORE;
    }
    let text = validation.text_or(&input.content);
    if text.is_empty() {
        tracing::warn!("Content is empty after validation");
        return NEUTRAL_SIMPLE_SCORE;
    }

    let mut score = 50.0;
    if has_source_links(text) {
        score += 20.0;
    }
    if has_data_evidence(text) {
        score += 15.0;
    }
    // technical analysis +8, promotional -15 per match
    score += lightweight_credibility_rules().evaluate(text).score;
    score += author_name_adjustment(&input.author);

    if let Some(engagement) = &input.engagement {
        let weighted = f64::from(engagement.likes) + 2.0 * f64::from(engagement.replies);
        let ratio = weighted / f64::from(engagement.shares.max(1));
        if ratio > 5.0 {
            score += 10.0;
        }
    }

    let length = text.chars().count();
    if length > 200 {
        score += 5.0;
    }
    if length > 500 {
        score += 5.0;
    }

    let final_score = clamp_score(score);
    tracing::debug!(
        final_score,
        author = %input.author.chars().take(20).collect::<String>(),
        "Simple credibility score calculated"
    );
    final_score
}

fn author_name_adjustment(author: &str) -> f64 {
    let author = author.to_lowercase();
    let mut adjustment = 0.0;
    if author.contains("expert") || author.contains("analyst") {
        adjustment += 15.0;
    }
    if author.contains("trader") || author.contains("pro") {
        adjustment += 10.0;
    }
    if author.contains("meme") || author.contains("lord") {
        adjustment -= 20.0;
    }
    adjustment
}

fn clamp_score(score: f64) -> u8 {
    score.round().clamp(0.0, 100.0) as u8
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::moderation::Engagement;
    use crate::infra::cache::TtlCache;
    use crate::infra::validation::InputValidator;
    use crate::infra::votes::InMemoryVoteStore;
    use chrono::{Duration as ChronoDuration, TimeZone};
    use std::time::Duration;

    const SEC_TEXT: &str =
        "According to SEC filings, AAPL shows strong quarterly results with P/E ratio improvement.";

    type TestAssessor = CredibilityAssessor<TtlCache<PostCredibility>, InMemoryVoteStore>;

    fn assessor() -> TestAssessor {
        CredibilityAssessor::new(
            Arc::new(InputValidator::new()),
            TtlCache::new(Duration::from_secs(600), 500),
            InMemoryVoteStore::new(),
        )
    }

    fn post(id: &str, content: &str) -> Post {
        let mut post = Post::new(id, "alice", content);
        post.updated_at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        post
    }

    fn simple(content: &str, author: &str) -> SimplePostInput {
        SimplePostInput {
            content: content.to_string(),
            author: author.to_string(),
            timestamp: Utc::now(),
            engagement: None,
        }
    }

    #[tokio::test]
    async fn sec_filing_citation_is_data_backed() {
        let credibility = assessor()
            .calculate_credibility(&post("sec", SEC_TEXT), None)
            .await
            .unwrap();

        assert_eq!(credibility.ai_analysis.content_type, ContentType::DataBacked);
        assert!(credibility.ai_analysis.risk_flags.is_empty());
        assert!(credibility.factors.has_source_links);
        assert!(credibility.factors.has_data_evidence);
        assert_eq!(credibility.factors.ai_verification_score, 95);
        // 40 + 25 + 20 + 0.3 * 45, confidence 0.8 earns no bonus
        assert_eq!(credibility.score, 99);
        assert_eq!(credibility.level, CredibilityLevel::Trusted);
        assert_eq!(credibility.community_score, 50);
    }

    #[tokio::test]
    async fn promotional_post_is_penalized() {
        let credibility = assessor()
            .calculate_credibility(&post("promo", "Guaranteed profit, this is easy money"), None)
            .await
            .unwrap();

        assert_eq!(credibility.ai_analysis.content_type, ContentType::Promotional);
        assert_eq!(credibility.ai_analysis.risk_flags, vec!["Promotional Content"]);
        assert_eq!(credibility.factors.ai_verification_score, 30);
        // 40 + 0.3 * -20 - 10
        assert_eq!(credibility.score, 24);
        assert_eq!(credibility.level, CredibilityLevel::Low);
    }

    #[test]
    fn credibility_scores_stay_in_range() {
        let maximal = "The earnings report on https://sec.gov/filing confirms revenue growth; \
                       the moving average, macd, rsi and fibonacci levels all support the breakout thesis.";
        let heavy_promo = "Guaranteed profit!! easy money, risk free, get rich quick with \
                           binary options and instant wealth!! pump and dump insider trading";
        let corpus = [
            (maximal, 100.0),
            (maximal, 0.0),
            (heavy_promo, 0.0),
            (heavy_promo, 100.0),
            (SEC_TEXT, 50.0),
            ("", 50.0),
            ("hi", 0.0),
        ];

        for (text, reliability) in corpus {
            let credibility =
                assess_post(&post("c", text), text, reliability, CommunityVotes::default());
            assert!(credibility.score <= 100, "{text:?} scored {}", credibility.score);
            assert_eq!(
                credibility.level,
                CredibilityLevel::from_score(credibility.score)
            );
        }

        // 40 + 25 + 20 + 15 + 10 + 10 before clamping
        let top = assess_post(&post("max", maximal), maximal, 100.0, CommunityVotes::default());
        assert_eq!(top.factors.ai_verification_score, 100);
        assert!(top.ai_analysis.confidence_score > 0.8);
        assert_eq!(top.score, 100);
        assert_eq!(top.level, CredibilityLevel::Trusted);

        let bottom = assess_post(
            &post("min", heavy_promo),
            heavy_promo,
            0.0,
            CommunityVotes::default(),
        );
        assert_eq!(bottom.factors.ai_verification_score, 0);
        assert_eq!(bottom.level, CredibilityLevel::Unverified);
    }

    #[tokio::test]
    async fn author_reliability_is_clamped_and_checked() {
        let assessor = assessor();
        let high = assessor
            .calculate_credibility(&post("r1", "Holding through the quarter."), Some(250.0))
            .await
            .unwrap();
        assert_eq!(high.factors.author_reliability, 100.0);

        let err = assessor
            .calculate_credibility(&post("r2", "Holding through the quarter."), Some(f64::NAN))
            .await
            .unwrap_err();
        assert!(matches!(err, ModerationError::Computation(_)));
    }

    #[tokio::test]
    async fn invalid_content_is_rejected() {
        let err = assessor()
            .calculate_credibility(&post("bad", "   "), None)
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn community_vote_invalidates_cached_result() {
        let assessor = assessor();
        let mut p = post("voted", SEC_TEXT);

        let before = assessor.calculate_credibility(&p, None).await.unwrap();
        p.updated_at = p.updated_at + ChronoDuration::seconds(5);
        assessor.calculate_credibility(&p, None).await.unwrap();
        assert_eq!(assessor.cache_len(), 2);

        assessor
            .update_credibility_from_community("voted", VoteType::Helpful)
            .await
            .unwrap();
        assessor
            .update_credibility_from_community("voted", VoteType::Misleading)
            .await
            .unwrap();
        assert_eq!(assessor.cache_len(), 0);

        let after = assessor.calculate_credibility(&p, None).await.unwrap();
        assert_eq!(after.community_votes.helpful, 1);
        assert_eq!(after.community_votes.misleading, 1);
        assert_eq!(after.factors.community_votes, 2);
        assert_eq!(after.community_score, 50);
        // votes never move the score
        assert_eq!(after.score, before.score);
    }

    #[tokio::test]
    async fn cached_result_is_reused_within_ttl() {
        let assessor = assessor();
        let p = post("cached", SEC_TEXT);
        let first = assessor.calculate_credibility(&p, None).await.unwrap();
        let second = assessor.calculate_credibility(&p, Some(0.0)).await.unwrap();
        assert_eq!(first.calculated_at, second.calculated_at);
        assert_eq!(first.score, second.score);
    }

    #[test]
    fn factual_claims_list_prices_before_percentages() {
        let claims = extract_factual_claims("Up 12% to $150, target $175.50 and 3.5% yield, 8% margin");
        assert_eq!(claims, vec!["$150", "$175.50", "12%", "3.5%", "8%"]);

        let many = "$1 $2 $3 $4 $5 $6 7%";
        assert_eq!(extract_factual_claims(many).len(), 5);
    }

    #[test]
    fn verification_sources_are_allow_listed_links() {
        let text = "See https://www.sec.gov/a https://bit.ly/x https://Reuters.com/b \
                    https://wsj.com/c https://ft.com/d";
        assert_eq!(
            verification_sources(text),
            vec![
                "https://www.sec.gov/a",
                "https://Reuters.com/b",
                "https://wsj.com/c"
            ]
        );
        assert!(verification_sources("reuters.com/markets without a scheme").is_empty());
    }

    #[test]
    fn content_type_priority() {
        assert_eq!(
            classify_content_type("Earnings report at https://sec.gov/x, guaranteed profit"),
            ContentType::DataBacked
        );
        assert_eq!(
            classify_content_type("Risk free gains, probably"),
            ContentType::Promotional
        );
        assert_eq!(
            classify_content_type("This might bounce tomorrow"),
            ContentType::Speculative
        );
        assert_eq!(classify_content_type("Bought more today"), ContentType::Opinion);
    }

    #[test]
    fn confidence_counts_quality_checks() {
        assert_eq!(ai_confidence("a b!!"), 0.0);
        assert!((ai_confidence("ok") - 0.2).abs() < 1e-9);
    }

    #[test]
    fn simple_score_examples() {
        let validator = InputValidator::new();

        assert_eq!(
            simple_credibility_score(&validator, &simple("Holding for now", "alice")),
            50
        );
        // sourced (+20) + data (+15) + analyst (+15)
        assert_eq!(
            simple_credibility_score(
                &validator,
                &simple("Balance sheet on https://sec.gov/x looks clean", "MarketAnalyst")
            ),
            100
        );
        // meme lord (-20) and two promotional phrases (-30)
        assert_eq!(
            simple_credibility_score(
                &validator,
                &simple("Guaranteed profit, risk free", "meme_lord")
            ),
            0
        );
        // MACD and RSI each add 8
        assert_eq!(
            simple_credibility_score(&validator, &simple("MACD cross with RSI at 40", "bob")),
            66
        );
    }

    #[test]
    fn simple_score_engagement_and_length() {
        let validator = InputValidator::new();
        let mut input = simple(&"steady hands ".repeat(20), "bob");
        assert!(input.content.trim().chars().count() > 200);
        input.engagement = Some(Engagement {
            likes: 10,
            replies: 1,
            shares: 0,
        });
        // +10 engagement, +5 length over 200
        assert_eq!(simple_credibility_score(&validator, &input), 65);
    }

    #[test]
    fn simple_score_is_neutral_for_invalid_content() {
        let validator = InputValidator::new();
        assert_eq!(simple_credibility_score(&validator, &simple("", "bob")), 50);
        assert_eq!(
            simple_credibility_score(&validator, &simple("<script>x</script>", "expert")),
            50
        );
    }
}

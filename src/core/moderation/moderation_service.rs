// Moderation service - the single entry point callers use.
//
// Composes the content analyzer, the spam detector, the credibility assessor and
// the content flagger.
// Every scoring method is a straight delegation; the facade itself only owns:
// - cache fan-out (`clear_cache`)
// - health reporting (`get_health`, never fails)
// - the credibility precedence rule (`credibility_score`)
// - review-queue triage and badge metrics helpers
//
// NO transport or storage dependencies here - caches and the vote store are
// injected through their ports.

use super::content_analyzer::ContentAnalyzer;
use super::content_flagger::ContentFlagger;
use super::credibility_assessor::{CommunityVoteStore, CredibilityAssessor};
use super::credibility_strategy::{
    select_strategy, CredibilityRequest, CredibilityStrategy, FullCredibilityStrategy,
    LightweightCredibilityStrategy, StrategyScore,
};
use super::moderation_error::ModerationError;
use super::moderation_models::{
    AuthorCredibilityMetrics, ContentAnalysis, CreateFlagData, CredibilityLevel, FlagReason,
    HealthReport, HealthStatus, Post, PostCredibility, PostFlag, PostVisibility, QuickSpamCheck,
    ReviewPriority, SimplePostInput, SpamDetectionResult, VoteType,
};
use super::result_cache::ResultCache;
use super::spam_detector::SpamDetector;
use crate::core::validation::ContentValidator;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;

const HEALTH_CLEAN_TEXT: &str = "Health check: data shows steady quarterly results.";
const HEALTH_SPAM_TEXT: &str = "Guaranteed profit! Join my Telegram channel, act now.";

pub struct ModerationService<SC, CC, V>
where
    SC: ResultCache<SpamDetectionResult>,
    CC: ResultCache<PostCredibility>,
    V: CommunityVoteStore,
{
    validator: Arc<dyn ContentValidator>,
    analyzer: ContentAnalyzer,
    spam: SpamDetector<SC>,
    credibility: Arc<CredibilityAssessor<CC, V>>,
    flagger: ContentFlagger,
    full_strategy: FullCredibilityStrategy<CC, V>,
    lightweight_strategy: LightweightCredibilityStrategy,
}

impl<SC, CC, V> ModerationService<SC, CC, V>
where
    SC: ResultCache<SpamDetectionResult>,
    CC: ResultCache<PostCredibility>,
    V: CommunityVoteStore,
{
    /// Wire the facade from its sub-services. All of them should share `validator`.
    pub fn new(
        validator: Arc<dyn ContentValidator>,
        spam: SpamDetector<SC>,
        credibility: CredibilityAssessor<CC, V>,
    ) -> Self {
        let credibility = Arc::new(credibility);
        Self {
            analyzer: ContentAnalyzer::new(Arc::clone(&validator)),
            full_strategy: FullCredibilityStrategy::new(Arc::clone(&credibility)),
            lightweight_strategy: LightweightCredibilityStrategy::new(Arc::clone(&validator)),
            validator,
            spam,
            credibility,
            flagger: ContentFlagger::new(),
        }
    }

    // ------------------------------------------------------------------------
    // Delegation
    // ------------------------------------------------------------------------

    pub fn analyze_content(&self, content: &str) -> Result<ContentAnalysis, ModerationError> {
        self.analyzer.analyze_content(content)
    }

    /// Submission-gate pre-filter. Use `analyze_spam` for moderation decisions.
    pub fn detect_spam(&self, content: &str) -> QuickSpamCheck {
        self.spam.detect_spam(content)
    }

    pub async fn analyze_spam(&self, post: &Post) -> Result<SpamDetectionResult, ModerationError> {
        self.spam.analyze_spam(post).await
    }

    pub async fn calculate_credibility(
        &self,
        post: &Post,
        author_reliability: Option<f64>,
    ) -> Result<PostCredibility, ModerationError> {
        self.credibility
            .calculate_credibility(post, author_reliability)
            .await
    }

    pub fn calculate_simple_credibility_score(&self, input: &SimplePostInput) -> u8 {
        self.credibility.calculate_simple_credibility_score(input)
    }

    pub async fn update_credibility_from_community(
        &self,
        post_id: &str,
        vote: VoteType,
    ) -> Result<(), ModerationError> {
        self.credibility
            .update_credibility_from_community(post_id, vote)
            .await
    }

    /// File a user report against a post. The flag starts out `pending`.
    pub fn submit_flag(&self, data: CreateFlagData) -> Result<PostFlag, ModerationError> {
        self.flagger.submit_flag(data)
    }

    /// Credibility through whichever strategy the request allows. A request that
    /// carries a post always uses the full strategy.
    pub async fn credibility_score(
        &self,
        request: &CredibilityRequest,
    ) -> Result<StrategyScore, ModerationError> {
        let strategy = select_strategy(request, &self.full_strategy, &self.lightweight_strategy);
        let score = strategy.score(request).await?;
        tracing::debug!(strategy = strategy.name(), score, "Credibility score computed");
        Ok(StrategyScore {
            strategy: strategy.name(),
            score,
            level: CredibilityLevel::from_score(score),
        })
    }

    // ------------------------------------------------------------------------
    // Triage
    // ------------------------------------------------------------------------

    pub fn review_priority(&self, result: &SpamDetectionResult) -> ReviewPriority {
        result.review_priority()
    }

    pub fn visibility(&self, result: &SpamDetectionResult) -> PostVisibility {
        result.visibility()
    }

    /// Fold an author's assessed posts into the numbers the badge engine reads.
    pub fn author_metrics<'a, I>(&self, assessments: I) -> AuthorCredibilityMetrics
    where
        I: IntoIterator<Item = &'a PostCredibility>,
    {
        let mut metrics = AuthorCredibilityMetrics::default();
        for credibility in assessments {
            metrics.record(credibility);
        }
        metrics
    }

    // ------------------------------------------------------------------------
    // Caches and health
    // ------------------------------------------------------------------------

    /// Empty both result caches. Faults are logged and skipped.
    pub fn clear_cache(&self) {
        if let Err(e) = self.spam.clear_cache() {
            tracing::warn!(error = %e, "Failed to clear spam cache");
        }
        if let Err(e) = self.credibility.clear_cache() {
            tracing::warn!(error = %e, "Failed to clear credibility cache");
        }
        tracing::info!("Moderation caches cleared");
    }

    /// Check every component. Never fails: problems are reported in the result.
    ///
    /// A failing scoring check makes the report `error`; a cache fault only
    /// makes it `degraded` because scoring still works without the cache.
    pub fn get_health(&self) -> HealthReport {
        let mut details = BTreeMap::new();
        let mut status = HealthStatus::Healthy;

        let checks: [(&str, Result<String, ModerationError>); 4] = [
            ("validator", self.check_validator()),
            ("contentAnalyzer", self.check_analyzer()),
            ("spamDetector", self.check_spam_rules()),
            ("contentFlagger", self.check_flagger()),
        ];
        for (name, outcome) in checks {
            match outcome {
                Ok(detail) => {
                    details.insert(name.to_string(), detail);
                }
                Err(e) => {
                    tracing::error!(component = name, error = %e, "Health check failed");
                    details.insert(name.to_string(), e.to_string());
                    status = HealthStatus::Error;
                }
            }
        }

        let caches = [
            ("spamCache", self.spam.check_cache()),
            ("credibilityCache", self.credibility.check_cache()),
        ];
        for (name, outcome) in caches {
            match outcome {
                Ok(entries) => {
                    details.insert(name.to_string(), format!("ok ({entries} entries)"));
                }
                Err(e) => {
                    tracing::warn!(component = name, error = %e, "Cache health check failed");
                    details.insert(name.to_string(), format!("degraded: {e}"));
                    if status == HealthStatus::Healthy {
                        status = HealthStatus::Degraded;
                    }
                }
            }
        }

        tracing::debug!(status = ?status, "Moderation health check completed");
        HealthReport {
            status,
            details,
            checked_at: Utc::now(),
        }
    }

    fn check_validator(&self) -> Result<String, ModerationError> {
        let clean = self.validator.validate_content(HEALTH_CLEAN_TEXT);
        if !clean.is_valid {
            return Err(ModerationError::Health(format!(
                "validator rejected clean text: {}",
                clean.errors.join(", ")
            )));
        }
        if self.validator.validate_content("").is_valid {
            return Err(ModerationError::Health(
                "validator accepted empty content".to_string(),
            ));
        }
        Ok("ok".to_string())
    }

    fn check_analyzer(&self) -> Result<String, ModerationError> {
        self.analyzer
            .analyze_content(HEALTH_CLEAN_TEXT)
            .map(|analysis| format!("ok ({:?})", analysis.sentiment).to_lowercase())
            .map_err(|e| ModerationError::Health(format!("content analyzer failed: {e}")))
    }

    fn check_flagger(&self) -> Result<String, ModerationError> {
        let incomplete = CreateFlagData {
            post_id: "health-check".to_string(),
            ..Default::default()
        };
        if self.flagger.submit_flag(incomplete).is_ok() {
            return Err(ModerationError::Health(
                "content flagger accepted a flag without a reason".to_string(),
            ));
        }
        let complete = CreateFlagData {
            post_id: "health-check".to_string(),
            reason: Some(FlagReason::Other),
            ..Default::default()
        };
        self.flagger
            .submit_flag(complete)
            .map(|_| "ok".to_string())
            .map_err(|e| ModerationError::Health(format!("content flagger failed: {e}")))
    }

    fn check_spam_rules(&self) -> Result<String, ModerationError> {
        if !self.spam.detect_spam(HEALTH_SPAM_TEXT).is_spam {
            return Err(ModerationError::Health(
                "spam rules did not flag a known spam sample".to_string(),
            ));
        }
        Ok("ok".to_string())
    }
}

// Moderation domain models - data structures for spam and credibility scoring.
//
// These are pure domain types with no storage or transport dependencies.
// Everything serializes to camelCase JSON with ISO-8601 timestamps so results
// can be handed straight to the moderation queue or the badge engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// INPUT
// ============================================================================

/// Market sentiment the author attached to a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostSentiment {
    Bullish,
    Bearish,
    #[default]
    Neutral,
}

/// A community post. Owned by the platform; this crate only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub content: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub likes: u32,
    #[serde(default, alias = "comments")]
    pub replies: u32,
    #[serde(default)]
    pub shares: u32,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub cashtags: Vec<String>,
    #[serde(default)]
    pub sentiment: PostSentiment,
}

impl Post {
    /// Convenience constructor for a fresh post with no engagement yet.
    pub fn new(
        id: impl Into<String>,
        author: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            content: content.into(),
            author: author.into(),
            created_at: now,
            updated_at: now,
            likes: 0,
            replies: 0,
            shares: 0,
            hashtags: Vec::new(),
            cashtags: Vec::new(),
            sentiment: PostSentiment::Neutral,
        }
    }

    pub fn engagement(&self) -> Engagement {
        Engagement {
            likes: self.likes,
            replies: self.replies,
            shares: self.shares,
        }
    }
}

/// Engagement counters. Missing counters deserialize as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Engagement {
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub replies: u32,
    #[serde(default)]
    pub shares: u32,
}

/// Raw input for call sites that don't have a full `Post` (chat messages, previews).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplePostInput {
    pub content: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub engagement: Option<Engagement>,
}

// ============================================================================
// CONTENT ANALYSIS
// ============================================================================

/// Coarse classification of what a piece of text is trying to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Promotional,
    Neutral,
    Informative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentAnalysis {
    pub sentiment: Sentiment,
    pub link_count: usize,
    pub suspicious_links: Vec<String>,
    /// 0.0 - 1.0
    pub language_quality: f64,
}

// ============================================================================
// SPAM
// ============================================================================

/// The seven independent signals behind a full spam analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpamFactors {
    pub repetitive_content: bool,
    pub suspicious_links: bool,
    pub promo_phrases: bool,
    pub bot_like_pattern: bool,
    pub duplicate_content: bool,
    pub excessive_emojis: bool,
    pub excessive_caps: bool,
}

impl SpamFactors {
    /// How many signals fired.
    pub fn count(&self) -> usize {
        [
            self.repetitive_content,
            self.suspicious_links,
            self.promo_phrases,
            self.bot_like_pattern,
            self.duplicate_content,
            self.excessive_emojis,
            self.excessive_caps,
        ]
        .iter()
        .filter(|fired| **fired)
        .count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpamContentAnalysis {
    pub sentiment: Sentiment,
    pub link_count: usize,
    pub suspicious_links: Vec<String>,
    pub detected_copy_paste: bool,
    pub language_quality: f64,
}

/// Authoritative spam verdict for a post, as consumed by the moderation queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpamDetectionResult {
    pub post_id: String,
    pub is_spam: bool,
    /// 0.0 - 1.0
    pub confidence: f64,
    pub factors: SpamFactors,
    /// 0 - 100
    pub risk_score: u8,
    pub risk_flags: Vec<String>,
    pub content_analysis: SpamContentAnalysis,
    pub processed_at: DateTime<Utc>,
}

/// Result of the cheap submission-gate screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickSpamCheck {
    pub is_spam: bool,
    pub confidence: f64,
    pub reasons: Vec<String>,
}

impl QuickSpamCheck {
    /// A "not spam" result that carries why the check could not run.
    pub fn rejected(reasons: Vec<String>) -> Self {
        Self {
            is_spam: false,
            confidence: 0.0,
            reasons,
        }
    }
}

/// Where a flagged post should land in the review queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewPriority {
    Low,
    Medium,
    High,
    Urgent,
}

/// How the feed should render a post given its spam verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostVisibility {
    Visible,
    Warning,
    Hidden,
}

impl SpamDetectionResult {
    pub fn review_priority(&self) -> ReviewPriority {
        if self.is_spam || self.risk_score > 80 {
            ReviewPriority::Urgent
        } else if self.risk_score > 70 {
            ReviewPriority::High
        } else if self.risk_score > 50 {
            ReviewPriority::Medium
        } else {
            ReviewPriority::Low
        }
    }

    pub fn visibility(&self) -> PostVisibility {
        if self.is_spam && self.confidence > 0.8 {
            PostVisibility::Hidden
        } else if self.risk_score > 50 || !self.risk_flags.is_empty() {
            PostVisibility::Warning
        } else {
            PostVisibility::Visible
        }
    }
}

// ============================================================================
// CREDIBILITY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredibilityLevel {
    Trusted,
    Mixed,
    Low,
    Unverified,
}

impl CredibilityLevel {
    /// Bucket a 0-100 score. Thresholds are inclusive lower bounds.
    pub fn from_score(score: u8) -> Self {
        match score {
            70..=u8::MAX => CredibilityLevel::Trusted,
            40..=69 => CredibilityLevel::Mixed,
            20..=39 => CredibilityLevel::Low,
            _ => CredibilityLevel::Unverified,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    DataBacked,
    Speculative,
    Opinion,
    Promotional,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredibilityFactors {
    pub has_source_links: bool,
    pub has_data_evidence: bool,
    /// 0 - 100
    pub author_reliability: f64,
    /// Total community votes cast on the post.
    pub community_votes: u32,
    /// 0 - 100
    pub ai_verification_score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAnalysis {
    pub content_type: ContentType,
    pub factual_claims: Vec<String>,
    pub verification_sources: Vec<String>,
    /// 0.0 - 1.0
    pub confidence_score: f64,
    pub risk_flags: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    Helpful,
    Misleading,
    Accurate,
}

impl std::fmt::Display for VoteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoteType::Helpful => write!(f, "helpful"),
            VoteType::Misleading => write!(f, "misleading"),
            VoteType::Accurate => write!(f, "accurate"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityVotes {
    pub helpful: u32,
    pub misleading: u32,
    pub accurate: u32,
}

impl CommunityVotes {
    pub fn record(&mut self, vote: VoteType) {
        match vote {
            VoteType::Helpful => self.helpful = self.helpful.saturating_add(1),
            VoteType::Misleading => self.misleading = self.misleading.saturating_add(1),
            VoteType::Accurate => self.accurate = self.accurate.saturating_add(1),
        }
    }

    pub fn total(&self) -> u32 {
        self.helpful
            .saturating_add(self.misleading)
            .saturating_add(self.accurate)
    }

    /// Share of positive votes on a 0-100 scale; 50 (neutral) when nobody voted.
    pub fn community_score(&self) -> u8 {
        let total = self.total();
        if total == 0 {
            return 50;
        }
        let positive = self.helpful as f64 + self.accurate as f64;
        (positive * 100.0 / total as f64).round().clamp(0.0, 100.0) as u8
    }
}

/// Full credibility assessment of a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCredibility {
    pub post_id: String,
    /// 0 - 100
    pub score: u8,
    pub level: CredibilityLevel,
    pub factors: CredibilityFactors,
    pub ai_analysis: AiAnalysis,
    pub community_score: u8,
    pub community_votes: CommunityVotes,
    pub last_updated: DateTime<Utc>,
    pub calculated_at: DateTime<Utc>,
}

/// Aggregated per-author numbers the badge engine decides eligibility from.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorCredibilityMetrics {
    pub total_posts: u32,
    /// Posts that scored as trusted (>= 70).
    pub verified_posts: u32,
    pub sourced_posts: u32,
    pub average_credibility_score: f64,
}

impl AuthorCredibilityMetrics {
    /// Fold one more assessed post into the running totals.
    pub fn record(&mut self, credibility: &PostCredibility) {
        self.total_posts = self.total_posts.saturating_add(1);
        if credibility.level == CredibilityLevel::Trusted {
            self.verified_posts = self.verified_posts.saturating_add(1);
        }
        if credibility.factors.has_source_links {
            self.sourced_posts = self.sourced_posts.saturating_add(1);
        }

        let n = self.total_posts as f64;
        self.average_credibility_score =
            (self.average_credibility_score * (n - 1.0) + credibility.score as f64) / n;
    }
}

// ============================================================================
// FLAGS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagReason {
    Spam,
    Misinformation,
    Harassment,
    InappropriateContent,
    Scam,
    HateSpeech,
    OffTopic,
    Duplicate,
    SelfPromotion,
    Other,
}

/// Where a flag sits in the review queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationStatus {
    #[default]
    Pending,
    Reviewed,
    Approved,
    Rejected,
}

/// A user report as submitted. `reason` is optional on the wire so a missing
/// one can be rejected with a validation error instead of a parse failure.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFlagData {
    pub post_id: String,
    #[serde(default)]
    pub reporter_id: String,
    #[serde(default)]
    pub reporter_username: String,
    #[serde(default)]
    pub reason: Option<FlagReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostFlag {
    pub id: String,
    pub post_id: String,
    pub reporter_id: String,
    pub reporter_username: String,
    pub reason: FlagReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: ModerationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moderator_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// HEALTH
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: HealthStatus,
    pub details: BTreeMap<String, String>,
    pub checked_at: DateTime<Utc>,
}

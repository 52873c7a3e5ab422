// Credibility strategies.
//
// Two interchangeable scorers behind one trait:
// - `FullCredibilityStrategy`: the cached assessment of a complete `Post`.
// - `LightweightCredibilityStrategy`: the quick score over raw input.
//
// Precedence: when a full post is available the full strategy is authoritative.
// The lightweight strategy only answers requests that carry raw input.

use super::credibility_assessor::{simple_credibility_score, CommunityVoteStore, CredibilityAssessor};
use super::moderation_error::ModerationError;
use super::moderation_models::{CredibilityLevel, Post, PostCredibility, SimplePostInput};
use super::result_cache::ResultCache;
use crate::core::validation::ContentValidator;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

/// What a caller has at hand when it asks for a credibility number.
#[derive(Debug, Clone)]
pub enum CredibilityRequest {
    /// A stored post. Scored by the full strategy.
    Post {
        post: Post,
        author_reliability: Option<f64>,
    },
    /// Text, author and engagement without a post record.
    Raw(SimplePostInput),
}

impl CredibilityRequest {
    pub fn for_post(post: Post) -> Self {
        CredibilityRequest::Post {
            post,
            author_reliability: None,
        }
    }

    /// The raw view of the request. Posts are reduced to their content, author,
    /// creation time and engagement.
    pub fn simple_input(&self) -> SimplePostInput {
        match self {
            CredibilityRequest::Post { post, .. } => SimplePostInput {
                content: post.content.clone(),
                author: post.author.clone(),
                timestamp: post.created_at,
                engagement: Some(post.engagement()),
            },
            CredibilityRequest::Raw(input) => input.clone(),
        }
    }
}

impl From<Post> for CredibilityRequest {
    fn from(post: Post) -> Self {
        CredibilityRequest::for_post(post)
    }
}

impl From<SimplePostInput> for CredibilityRequest {
    fn from(input: SimplePostInput) -> Self {
        CredibilityRequest::Raw(input)
    }
}

/// A score together with the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyScore {
    pub strategy: &'static str,
    pub score: u8,
    pub level: CredibilityLevel,
}

#[async_trait]
pub trait CredibilityStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn score(&self, request: &CredibilityRequest) -> Result<u8, ModerationError>;
}

// ============================================================================
// STRATEGIES
// ============================================================================

pub struct FullCredibilityStrategy<C, V>
where
    C: ResultCache<PostCredibility>,
    V: CommunityVoteStore,
{
    assessor: Arc<CredibilityAssessor<C, V>>,
}

impl<C, V> FullCredibilityStrategy<C, V>
where
    C: ResultCache<PostCredibility>,
    V: CommunityVoteStore,
{
    pub fn new(assessor: Arc<CredibilityAssessor<C, V>>) -> Self {
        Self { assessor }
    }
}

#[async_trait]
impl<C, V> CredibilityStrategy for FullCredibilityStrategy<C, V>
where
    C: ResultCache<PostCredibility>,
    V: CommunityVoteStore,
{
    fn name(&self) -> &'static str {
        "full"
    }

    async fn score(&self, request: &CredibilityRequest) -> Result<u8, ModerationError> {
        match request {
            CredibilityRequest::Post {
                post,
                author_reliability,
            } => {
                let credibility = self
                    .assessor
                    .calculate_credibility(post, *author_reliability)
                    .await?;
                Ok(credibility.score)
            }
            CredibilityRequest::Raw(_) => Err(ModerationError::Computation(
                "full credibility scoring needs a post".to_string(),
            )),
        }
    }
}

pub struct LightweightCredibilityStrategy {
    validator: Arc<dyn ContentValidator>,
}

impl LightweightCredibilityStrategy {
    pub fn new(validator: Arc<dyn ContentValidator>) -> Self {
        Self { validator }
    }
}

#[async_trait]
impl CredibilityStrategy for LightweightCredibilityStrategy {
    fn name(&self) -> &'static str {
        "lightweight"
    }

    async fn score(&self, request: &CredibilityRequest) -> Result<u8, ModerationError> {
        Ok(simple_credibility_score(
            self.validator.as_ref(),
            &request.simple_input(),
        ))
    }
}

/// Pick the strategy for a request: full for posts, lightweight for raw input.
pub fn select_strategy<'a>(
    request: &CredibilityRequest,
    full: &'a dyn CredibilityStrategy,
    lightweight: &'a dyn CredibilityStrategy,
) -> &'a dyn CredibilityStrategy {
    match request {
        CredibilityRequest::Post { .. } => full,
        CredibilityRequest::Raw(_) => lightweight,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::cache::TtlCache;
    use crate::infra::validation::InputValidator;
    use crate::infra::votes::InMemoryVoteStore;
    use chrono::Utc;
    use std::time::Duration;

    fn strategies() -> (
        FullCredibilityStrategy<TtlCache<PostCredibility>, InMemoryVoteStore>,
        LightweightCredibilityStrategy,
    ) {
        let validator: Arc<dyn ContentValidator> = Arc::new(InputValidator::new());
        let assessor = CredibilityAssessor::new(
            Arc::clone(&validator),
            TtlCache::new(Duration::from_secs(600), 500),
            InMemoryVoteStore::new(),
        );
        (
            FullCredibilityStrategy::new(Arc::new(assessor)),
            LightweightCredibilityStrategy::new(validator),
        )
    }

    #[tokio::test]
    async fn posts_go_to_the_full_strategy() {
        let (full, lightweight) = strategies();
        let request = CredibilityRequest::for_post(Post::new(
            "p1",
            "alice",
            "Earnings report on https://sec.gov/filing shows revenue growth.",
        ));

        let chosen = select_strategy(&request, &full, &lightweight);
        assert_eq!(chosen.name(), "full");
        let score = chosen.score(&request).await.unwrap();

        // the two formulas disagree on the same text
        let light = lightweight.score(&request).await.unwrap();
        assert_ne!(score, light);
    }

    #[tokio::test]
    async fn raw_input_goes_to_the_lightweight_strategy() {
        let (full, lightweight) = strategies();
        let request = CredibilityRequest::from(SimplePostInput {
            content: "MACD crossing the moving average".to_string(),
            author: "chart_analyst".to_string(),
            timestamp: Utc::now(),
            engagement: None,
        });

        let chosen = select_strategy(&request, &full, &lightweight);
        assert_eq!(chosen.name(), "lightweight");
        // 50 + 8 + 8 + 15
        assert_eq!(chosen.score(&request).await.unwrap(), 81);
        assert!(full.score(&request).await.is_err());
    }

    #[test]
    fn simple_input_from_post_keeps_engagement() {
        let mut post = Post::new("p2", "bob", "hello");
        post.likes = 4;
        post.replies = 2;
        let input = CredibilityRequest::from(post.clone()).simple_input();
        assert_eq!(input.author, "bob");
        assert_eq!(input.timestamp, post.created_at);
        assert_eq!(input.engagement.map(|e| e.replies), Some(2));
    }
}

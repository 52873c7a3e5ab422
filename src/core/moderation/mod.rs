// Core moderation module - spam detection, credibility scoring and user flags.
//
// Pure domain logic. Caches and the vote store are ports implemented in infra.

pub mod content_analyzer;
pub mod content_flagger;
pub mod credibility_assessor;
pub mod credibility_strategy;
pub mod moderation_config;
pub mod moderation_error;
pub mod moderation_models;
pub mod moderation_service;
pub mod result_cache;
pub mod rules;
pub mod spam_detector;

pub use content_analyzer::ContentAnalyzer;
pub use content_flagger::ContentFlagger;
pub use credibility_assessor::{
    CommunityVoteStore, CredibilityAssessor, VoteStoreError, DEFAULT_AUTHOR_RELIABILITY,
};
pub use credibility_strategy::{
    CredibilityRequest, CredibilityStrategy, FullCredibilityStrategy,
    LightweightCredibilityStrategy, StrategyScore,
};
pub use moderation_config::ModerationConfig;
pub use moderation_error::ModerationError;
pub use moderation_models::*;
pub use moderation_service::ModerationService;
pub use result_cache::{CacheError, CacheKey, ResultCache};
pub use spam_detector::SpamDetector;

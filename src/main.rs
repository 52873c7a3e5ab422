// Command-line front end for the moderation engine.
//
// Usage: community_moderation <posts.json>
//
// Reads a JSON array of posts, runs each one through the submission gate, the
// full spam analysis and the credibility assessment, and prints a JSON report
// to stdout. Logs (including the final health report) go to stderr.
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Score the input and print the report

use anyhow::{Context, Result};
use community_moderation::core::moderation::{
    AuthorCredibilityMetrics, CredibilityAssessor, ModerationConfig, ModerationService, Post,
    PostCredibility, PostVisibility, QuickSpamCheck, ReviewPriority, SpamDetectionResult,
    SpamDetector,
};
use community_moderation::core::validation::ContentValidator;
use community_moderation::infra::cache::TtlCache;
use community_moderation::infra::validation::InputValidator;
use community_moderation::infra::votes::InMemoryVoteStore;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

type Service =
    ModerationService<TtlCache<SpamDetectionResult>, TtlCache<PostCredibility>, InMemoryVoteStore>;

/// One line of the moderation report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PostReport {
    post_id: String,
    gate: QuickSpamCheck,
    spam: Option<SpamDetectionResult>,
    credibility: Option<PostCredibility>,
    priority: Option<ReviewPriority>,
    visibility: Option<PostVisibility>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let path = std::env::args()
        .nth(1)
        .context("Usage: community_moderation <posts.json>")?;

    let config = ModerationConfig::from_env();
    tracing::info!(?config, "Loaded moderation config");

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    let service = build_service(&config);

    let posts = load_posts(Path::new(&path))?;
    tracing::info!(count = posts.len(), path = %path, "Loaded posts");

    let reports = moderate_posts(&service, &posts).await;
    println!(
        "{}",
        serde_json::to_string_pretty(&reports).context("Failed to serialize report")?
    );

    let health = service.get_health();
    tracing::info!(status = ?health.status, details = ?health.details, "Moderation health");

    Ok(())
}

/// Composition root: one validator shared by every service, one cache each.
fn build_service(config: &ModerationConfig) -> Service {
    let validator: Arc<dyn ContentValidator> = Arc::new(
        InputValidator::new().with_max_content_length(config.max_content_length),
    );

    let spam = SpamDetector::new(
        Arc::clone(&validator),
        TtlCache::new(config.spam_cache_ttl, config.spam_cache_capacity),
    );
    let credibility = CredibilityAssessor::new(
        Arc::clone(&validator),
        TtlCache::new(config.credibility_cache_ttl, config.credibility_cache_capacity),
        InMemoryVoteStore::new(),
    )
    .with_default_author_reliability(config.default_author_reliability);

    ModerationService::new(validator, spam, credibility)
}

fn load_posts(path: &Path) -> Result<Vec<Post>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read posts from {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of posts", path.display()))
}

async fn moderate_posts(service: &Service, posts: &[Post]) -> Vec<PostReport> {
    let mut reports = Vec::with_capacity(posts.len());
    let mut authors: BTreeMap<&str, AuthorCredibilityMetrics> = BTreeMap::new();

    for post in posts {
        let mut errors = Vec::new();

        let spam = match service.analyze_spam(post).await {
            Ok(result) => Some(result),
            Err(e) => {
                errors.push(e.to_string());
                None
            }
        };
        let credibility = match service.calculate_credibility(post, None).await {
            Ok(result) => Some(result),
            Err(e) => {
                errors.push(e.to_string());
                None
            }
        };

        if let Some(credibility) = &credibility {
            authors
                .entry(post.author.as_str())
                .or_default()
                .record(credibility);
        }

        reports.push(PostReport {
            post_id: post.id.clone(),
            gate: service.detect_spam(&post.content),
            priority: spam.as_ref().map(|s| service.review_priority(s)),
            visibility: spam.as_ref().map(|s| service.visibility(s)),
            spam,
            credibility,
            errors,
        });
    }

    for (author, metrics) in &authors {
        tracing::info!(
            author,
            total_posts = metrics.total_posts,
            verified_posts = metrics.verified_posts,
            sourced_posts = metrics.sourced_posts,
            average_score = metrics.average_credibility_score,
            "Author credibility metrics"
        );
    }

    reports
}

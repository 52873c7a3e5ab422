// Content flagging - turns user reports into pending review-queue entries.
//
// Flags only record that a post needs a look. Scoring and triage stay with the
// spam detector and the facade's `review_priority` / `visibility` helpers.

use super::moderation_error::ModerationError;
use super::moderation_models::{CreateFlagData, ModerationStatus, PostFlag};
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};

// Shared by every flagger so ids stay unique within a process.
static FLAG_SEQUENCE: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Default)]
pub struct ContentFlagger;

impl ContentFlagger {
    pub fn new() -> Self {
        Self
    }

    /// Accept a user report. Fails with `Validation` when the post id is blank
    /// or no reason was given; otherwise returns a `pending` flag.
    pub fn submit_flag(&self, data: CreateFlagData) -> Result<PostFlag, ModerationError> {
        let mut errors = Vec::new();
        if data.post_id.trim().is_empty() {
            errors.push("Valid postId is required".to_string());
        }
        if data.reason.is_none() {
            errors.push("Flag reason is required".to_string());
        }
        let reason = match data.reason {
            Some(reason) if errors.is_empty() => reason,
            _ => {
                tracing::warn!(post_id = %data.post_id, errors = ?errors, "Rejected content flag");
                return Err(ModerationError::Validation(errors));
            }
        };

        let now = Utc::now();
        let seq = FLAG_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let flag = PostFlag {
            id: format!("flag-{}-{}", now.timestamp_millis(), seq),
            post_id: data.post_id,
            reporter_id: data.reporter_id,
            reporter_username: data.reporter_username,
            reason,
            description: data.description,
            status: ModerationStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            moderator_notes: None,
            created_at: now,
            updated_at: now,
        };

        tracing::info!(
            flag_id = %flag.id,
            post_id = %flag.post_id,
            reason = ?flag.reason,
            "Content flag submitted"
        );
        Ok(flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::moderation::FlagReason;

    fn report(post_id: &str, reason: Option<FlagReason>) -> CreateFlagData {
        CreateFlagData {
            post_id: post_id.to_string(),
            reporter_id: "u42".to_string(),
            reporter_username: "carol".to_string(),
            reason,
            description: Some("pump and dump".to_string()),
        }
    }

    #[test]
    fn accepted_flag_is_pending() {
        let flag = ContentFlagger::new()
            .submit_flag(report("p1", Some(FlagReason::Scam)))
            .unwrap();

        assert!(flag.id.starts_with("flag-"));
        assert_eq!(flag.post_id, "p1");
        assert_eq!(flag.reporter_username, "carol");
        assert_eq!(flag.reason, FlagReason::Scam);
        assert_eq!(flag.status, ModerationStatus::Pending);
        assert_eq!(flag.description.as_deref(), Some("pump and dump"));
        assert_eq!(flag.created_at, flag.updated_at);
        assert!(flag.reviewed_by.is_none());
    }

    #[test]
    fn flag_ids_are_unique() {
        let flagger = ContentFlagger::new();
        let a = flagger.submit_flag(report("p1", Some(FlagReason::Spam))).unwrap();
        let b = flagger.submit_flag(report("p1", Some(FlagReason::Spam))).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn missing_fields_are_rejected() {
        let flagger = ContentFlagger::new();

        let err = flagger
            .submit_flag(report("  ", Some(FlagReason::Spam)))
            .unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("Valid postId is required"));

        let err = flagger.submit_flag(report("p1", None)).unwrap_err();
        assert!(err.to_string().contains("Flag reason is required"));

        match flagger.submit_flag(report("", None)) {
            Err(ModerationError::Validation(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn flag_serializes_camel_case() {
        let flag = ContentFlagger::new()
            .submit_flag(report("p9", Some(FlagReason::SelfPromotion)))
            .unwrap();
        let json = serde_json::to_value(&flag).unwrap();
        assert_eq!(json["postId"], "p9");
        assert_eq!(json["reason"], "self_promotion");
        assert_eq!(json["status"], "pending");
        assert!(json.get("reviewedBy").is_none());
    }
}

// Community moderation engine: rule-based spam detection and credibility scoring
// for social-trading posts.
//
// `core` holds the domain logic and the ports it needs; `infra` holds the
// implementations the binary wires together.

#[path = "core/core_layer.rs"]
pub mod core;

#[path = "infra/infra_layer.rs"]
pub mod infra;

pub use crate::core::moderation::{ModerationConfig, ModerationError, ModerationService};

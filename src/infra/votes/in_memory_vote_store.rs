// In-memory implementation of CommunityVoteStore.
//
// Tallies live in a DashMap keyed by post id, so votes arriving from concurrent
// requests never need an outer lock. Nothing survives a restart.

use crate::core::moderation::{CommunityVoteStore, CommunityVotes, VoteStoreError, VoteType};
use async_trait::async_trait;
use dashmap::DashMap;

#[derive(Default)]
pub struct InMemoryVoteStore {
    /// Maps post_id -> tallies
    votes: DashMap<String, CommunityVotes>,
}

impl InMemoryVoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of posts with at least one vote.
    pub fn voted_posts(&self) -> usize {
        self.votes.len()
    }
}

#[async_trait]
impl CommunityVoteStore for InMemoryVoteStore {
    async fn record_vote(
        &self,
        post_id: &str,
        vote: VoteType,
    ) -> Result<CommunityVotes, VoteStoreError> {
        // entry() holds the shard lock, so the increment is atomic
        let mut entry = self.votes.entry(post_id.to_string()).or_default();
        entry.record(vote);
        Ok(*entry)
    }

    async fn get_votes(&self, post_id: &str) -> Result<CommunityVotes, VoteStoreError> {
        Ok(self
            .votes
            .get(post_id)
            .map(|entry| *entry)
            .unwrap_or_default())
    }
}

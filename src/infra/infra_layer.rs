// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "cache/ttl_cache.rs"]
pub mod cache;

#[path = "validation/input_validator.rs"]
pub mod validation;

#[path = "votes/in_memory_vote_store.rs"]
pub mod votes;

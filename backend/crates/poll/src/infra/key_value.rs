//! Key/Value Client Port
//!
//! The commands the remote store needs from a key/value service. Each call is
//! one round trip and atomic on the server.

use std::collections::HashMap;

use crate::error::PollResult;

#[trait_variant::make(KeyValue: Send)]
pub trait LocalKeyValue {
    /// Set several hash fields at once
    async fn hset_multiple(&self, key: &str, fields: &[(&str, &str)]) -> PollResult<()>;

    async fn hset(&self, key: &str, field: &str, value: &str) -> PollResult<()>;

    async fn hexists(&self, key: &str, field: &str) -> PollResult<bool>;

    /// Every field of a hash; empty when the key is absent
    async fn hgetall(&self, key: &str) -> PollResult<HashMap<String, String>>;

    /// Add a set member; true if it was not present
    async fn sadd(&self, key: &str, member: &str) -> PollResult<bool>;

    /// Add `member` if absent, remove it if present; true if it is a member
    /// afterwards
    async fn toggle_member(&self, key: &str, member: &str) -> PollResult<bool>;

    async fn smembers(&self, key: &str) -> PollResult<Vec<String>>;

    /// The whole list
    async fn lrange_all(&self, key: &str) -> PollResult<Vec<String>>;

    /// Unless hash `key` already has `guard`, write `fields` into it and
    /// append `item` to list `list_key`. True if it wrote.
    ///
    /// `fields` must include `guard`.
    async fn publish_once(
        &self,
        key: &str,
        guard: &str,
        fields: &[(&str, &str)],
        list_key: &str,
        item: &str,
    ) -> PollResult<bool>;
}

//! Backend Selection
//!
//! The store is chosen at startup from [`PollConfig`]; [`AnyStore`] lets that
//! runtime choice fit the generic [`Poll`](crate::application::poll::Poll).

use crate::application::config::{BackendKind, PollConfig};
use crate::domain::entity::{answer::Answer, user::User};
use crate::domain::repository::Store;
use crate::domain::value_object::{answer_id::AnswerId, user_id::UserId};
use crate::error::PollResult;
use crate::infra::{kv::KvStore, memory::MemoryStore, redis_kv::RedisKv};

#[derive(Debug)]
pub enum AnyStore {
    Memory(MemoryStore),
    Remote(KvStore<RedisKv>),
}

impl AnyStore {
    /// Build the configured backend, connecting to the remote store if needed.
    pub async fn connect(config: &PollConfig) -> PollResult<Self> {
        match &config.backend {
            BackendKind::Memory => {
                tracing::info!("Created in-memory store");
                Ok(Self::Memory(MemoryStore::new()))
            }
            BackendKind::Redis { url } => {
                let kv = RedisKv::connect(url, config.remote_timeout).await?;
                tracing::info!(timeout_ms = config.remote_timeout_ms(), "Created redis store");
                Ok(Self::Remote(KvStore::new(kv)))
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Remote(_) => "redis",
        }
    }
}

impl Store for AnyStore {
    async fn add_answer(&self, user: &User, answer: &Answer) -> PollResult<()> {
        match self {
            Self::Memory(store) => store.add_answer(user, answer).await,
            Self::Remote(store) => store.add_answer(user, answer).await,
        }
    }

    async fn list_answers(&self) -> PollResult<Vec<Answer>> {
        match self {
            Self::Memory(store) => store.list_answers().await,
            Self::Remote(store) => store.list_answers().await,
        }
    }

    async fn get_answer_by_id(&self, id: &AnswerId) -> PollResult<Answer> {
        match self {
            Self::Memory(store) => store.get_answer_by_id(id).await,
            Self::Remote(store) => store.get_answer_by_id(id).await,
        }
    }

    async fn respond(&self, user: &User, answer: &Answer) -> PollResult<()> {
        match self {
            Self::Memory(store) => store.respond(user, answer).await,
            Self::Remote(store) => store.respond(user, answer).await,
        }
    }

    async fn toggle_vote(&self, user: &User, answer: &Answer) -> PollResult<bool> {
        match self {
            Self::Memory(store) => store.toggle_vote(user, answer).await,
            Self::Remote(store) => store.toggle_vote(user, answer).await,
        }
    }

    async fn find_user(&self, id: &UserId) -> PollResult<Option<User>> {
        match self {
            Self::Memory(store) => store.find_user(id).await,
            Self::Remote(store) => store.find_user(id).await,
        }
    }
}

//! Key/Value Store
//!
//! [`KvStore`] implements the store contract on top of a remote key/value
//! service exposing hashes, sets and lists.
//!
//! Key schema:
//! - `answerids`: list of answer ids in first-add order
//! - `answer:<id>`: hash `{id, asker, addressee, content, response, timestamp}`;
//!   asker and addressee hold user ids, empty for the anonymous sentinel
//! - `voters:<id>`: set of user ids
//! - `user:<id>`: hash `{login, name}`
//!
//! Users and voters are written before the answer itself. The answer's fields
//! and its order entry then land in one atomic step, so a reader never meets
//! a half-written answer or a user id without its record, and a failed add
//! can simply be retried.

use std::collections::HashMap;

use crate::domain::entity::answer::{Answer, AnswerParts};
use crate::domain::entity::user::User;
use crate::domain::repository::Store;
use crate::domain::value_object::{answer_id::AnswerId, user_id::UserId};
use crate::error::{PollError, PollResult};
use crate::infra::key_value::KeyValue;

pub const ORDER_KEY: &str = "answerids";

pub fn answer_key(id: &AnswerId) -> String {
    format!("answer:{id}")
}

pub fn voters_key(id: &AnswerId) -> String {
    format!("voters:{id}")
}

pub fn user_key(id: &UserId) -> String {
    format!("user:{id}")
}

/// Store backed by a [`KeyValue`] service
#[derive(Debug, Clone)]
pub struct KvStore<K> {
    kv: K,
}

impl<K> KvStore<K>
where
    K: KeyValue + Sync,
{
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    pub fn client(&self) -> &K {
        &self.kv
    }

    async fn upsert_user(&self, user: &User) -> PollResult<()> {
        if user.is_anonymous() {
            return Ok(());
        }
        self.kv
            .hset_multiple(
                &user_key(user.id()),
                &[("login", user.login()), ("name", user.name())],
            )
            .await
    }

    /// Resolve a stored user id. The empty id is the anonymous sentinel.
    async fn load_user(&self, raw_id: &str) -> PollResult<User> {
        if raw_id.is_empty() {
            return Ok(User::anonymous());
        }

        let id = UserId::new(raw_id);
        let record = self.kv.hgetall(&user_key(&id)).await?;
        let (Some(login), Some(name)) = (record.get("login"), record.get("name")) else {
            return Err(PollError::CorruptRecord(format!("user:{raw_id} is missing")));
        };

        let user = User::new(login.as_str(), name.as_str());
        if user.id() != &id {
            return Err(PollError::CorruptRecord(format!(
                "user:{raw_id} holds login of another id"
            )));
        }
        Ok(user)
    }

    /// Read an answer back; `None` while absent or not yet fully written.
    async fn load_answer(&self, id: &AnswerId) -> PollResult<Option<Answer>> {
        let record = self.kv.hgetall(&answer_key(id)).await?;
        let Some(content) = record.get("content") else {
            return Ok(None);
        };

        let timestamp = required_field(&record, id, "timestamp")?
            .parse::<i64>()
            .map_err(|e| PollError::CorruptRecord(format!("answer:{id} timestamp: {e}")))?;
        let asker = self.load_user(required_field(&record, id, "asker")?).await?;
        let addressee = self.load_user(required_field(&record, id, "addressee")?).await?;
        let response = required_field(&record, id, "response")?.to_string();

        let mut voters = Vec::new();
        for voter_id in self.kv.smembers(&voters_key(id)).await? {
            voters.push(self.load_user(&voter_id).await?);
        }

        Ok(Some(Answer::from_parts(AnswerParts {
            id: id.clone(),
            content: content.clone(),
            asker,
            addressee,
            response,
            timestamp,
            voters,
        })))
    }

    async fn ensure_exists(&self, id: &AnswerId) -> PollResult<()> {
        if self.kv.hexists(&answer_key(id), "content").await? {
            Ok(())
        } else {
            Err(PollError::AnswerNotFound(id.to_string()))
        }
    }
}

fn required_field<'a>(
    record: &'a HashMap<String, String>,
    id: &AnswerId,
    name: &str,
) -> PollResult<&'a str> {
    record
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| PollError::CorruptRecord(format!("answer:{id} has no {name} field")))
}

impl<K> Store for KvStore<K>
where
    K: KeyValue + Sync,
{
    async fn add_answer(&self, _user: &User, answer: &Answer) -> PollResult<()> {
        let id = answer.id();

        self.upsert_user(answer.asker()).await?;
        self.upsert_user(answer.addressee()).await?;
        for voter in answer.voters() {
            self.upsert_user(voter).await?;
        }

        for voter in answer.voters() {
            self.kv.sadd(&voters_key(id), voter.id().as_str()).await?;
        }

        let timestamp = answer.timestamp().to_string();
        let published = self
            .kv
            .publish_once(
                &answer_key(id),
                "content",
                &[
                    ("id", id.as_str()),
                    ("asker", answer.asker().id().as_str()),
                    ("addressee", answer.addressee().id().as_str()),
                    ("response", answer.response()),
                    ("timestamp", timestamp.as_str()),
                    ("content", answer.content()),
                ],
                ORDER_KEY,
                id.as_str(),
            )
            .await?;

        if published {
            tracing::info!(answer_id = %id, "Answer added");
        } else {
            tracing::info!(answer_id = %id, "Answer re-asked, voters merged");
        }
        Ok(())
    }

    async fn list_answers(&self) -> PollResult<Vec<Answer>> {
        let ids = self.kv.lrange_all(ORDER_KEY).await?;
        let mut answers = Vec::with_capacity(ids.len());
        for raw in ids {
            let id = AnswerId::new(raw);
            let answer = self.load_answer(&id).await?.ok_or_else(|| {
                PollError::CorruptRecord(format!("listed id {id} has no answer"))
            })?;
            answers.push(answer);
        }

        tracing::debug!(count = answers.len(), "Answers listed");
        Ok(answers)
    }

    async fn get_answer_by_id(&self, id: &AnswerId) -> PollResult<Answer> {
        self.load_answer(id)
            .await?
            .ok_or_else(|| PollError::AnswerNotFound(id.to_string()))
    }

    async fn respond(&self, user: &User, answer: &Answer) -> PollResult<()> {
        // Answers are never deleted, so this check can't go stale
        self.ensure_exists(answer.id()).await?;
        self.upsert_user(user).await?;
        self.kv
            .hset(&answer_key(answer.id()), "response", answer.response())
            .await?;

        tracing::info!(answer_id = %answer.id(), "Response stored");
        Ok(())
    }

    async fn toggle_vote(&self, user: &User, answer: &Answer) -> PollResult<bool> {
        if user.is_anonymous() {
            return Err(PollError::UnidentifiedVoter);
        }
        self.ensure_exists(answer.id()).await?;
        self.upsert_user(user).await?;

        let voted = self
            .kv
            .toggle_member(&voters_key(answer.id()), user.id().as_str())
            .await?;

        tracing::info!(
            answer_id = %answer.id(),
            user_id = %user.id(),
            voted,
            "Vote toggled"
        );
        Ok(voted)
    }

    async fn find_user(&self, id: &UserId) -> PollResult<Option<User>> {
        if id.is_unidentified() {
            return Ok(None);
        }
        let record = self.kv.hgetall(&user_key(id)).await?;
        match (record.get("login"), record.get("name")) {
            (Some(login), Some(name)) => Ok(Some(User::new(login.as_str(), name.as_str()))),
            _ => Ok(None),
        }
    }
}

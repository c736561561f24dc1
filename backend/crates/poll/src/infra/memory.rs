//! In-Memory Store

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::domain::entity::{answer::Answer, user::User};
use crate::domain::repository::Store;
use crate::domain::value_object::{answer_id::AnswerId, user_id::UserId};
use crate::error::{PollError, PollResult};

#[derive(Default)]
struct Inner {
    /// Ids in first-add order
    order: Vec<AnswerId>,
    answers: HashMap<AnswerId, Answer>,
    users: HashMap<UserId, User>,
}

impl Inner {
    fn upsert_user(&mut self, user: &User) {
        if !user.is_anonymous() {
            self.users.insert(user.id().clone(), user.clone());
        }
    }
}

/// Process-local store.
///
/// One `RwLock` guards everything; each mutation is a single critical section,
/// so a toggle can't interleave with another toggle or with a listing.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.order.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore").finish_non_exhaustive()
    }
}

impl Store for MemoryStore {
    async fn add_answer(&self, _user: &User, answer: &Answer) -> PollResult<()> {
        let mut inner = self.inner.write().await;

        inner.upsert_user(answer.asker());
        inner.upsert_user(answer.addressee());
        for voter in answer.voters() {
            inner.upsert_user(voter);
        }

        match inner.answers.get_mut(answer.id()) {
            Some(existing) => {
                existing.merge_voters(answer);
                tracing::info!(answer_id = %answer.id(), "Answer re-asked, voters merged");
            }
            None => {
                let mut stored = answer.clone();
                stored.clear_viewer();
                inner.order.push(answer.id().clone());
                inner.answers.insert(answer.id().clone(), stored);
                tracing::info!(answer_id = %answer.id(), "Answer added");
            }
        }

        Ok(())
    }

    async fn list_answers(&self) -> PollResult<Vec<Answer>> {
        let inner = self.inner.read().await;
        inner
            .order
            .iter()
            .map(|id| {
                inner
                    .answers
                    .get(id)
                    .cloned()
                    .ok_or_else(|| PollError::CorruptRecord(format!("listed id {id} has no answer")))
            })
            .collect()
    }

    async fn get_answer_by_id(&self, id: &AnswerId) -> PollResult<Answer> {
        let inner = self.inner.read().await;
        inner
            .answers
            .get(id)
            .cloned()
            .ok_or_else(|| PollError::AnswerNotFound(id.to_string()))
    }

    async fn respond(&self, user: &User, answer: &Answer) -> PollResult<()> {
        let mut inner = self.inner.write().await;
        let stored = inner
            .answers
            .get_mut(answer.id())
            .ok_or_else(|| PollError::AnswerNotFound(answer.id().to_string()))?;
        stored.set_response(answer.response());
        inner.upsert_user(user);

        tracing::info!(answer_id = %answer.id(), "Response stored");
        Ok(())
    }

    async fn toggle_vote(&self, user: &User, answer: &Answer) -> PollResult<bool> {
        if user.is_anonymous() {
            return Err(PollError::UnidentifiedVoter);
        }

        let mut inner = self.inner.write().await;
        let stored = inner
            .answers
            .get_mut(answer.id())
            .ok_or_else(|| PollError::AnswerNotFound(answer.id().to_string()))?;
        let voted = stored.toggle_vote(user)?;
        inner.upsert_user(user);

        tracing::info!(
            answer_id = %answer.id(),
            user_id = %user.id(),
            voted,
            "Vote toggled"
        );
        Ok(voted)
    }

    async fn find_user(&self, id: &UserId) -> PollResult<Option<User>> {
        Ok(self.inner.read().await.users.get(id).cloned())
    }
}

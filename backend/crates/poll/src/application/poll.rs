//! Poll Use Cases
//!
//! [`Poll`] is what the transport layer talks to. It forwards to the
//! configured [`Store`] and logs every failure on the way out.

use std::sync::Arc;

use crate::domain::entity::{answer::Answer, user::User};
use crate::domain::repository::Store;
use crate::domain::value_object::{answer_id::AnswerId, user_id::UserId};
use crate::error::{PollError, PollResult};

pub struct Poll<S>
where
    S: Store,
{
    store: Arc<S>,
}

impl<S> Clone for Poll<S>
where
    S: Store,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> Poll<S>
where
    S: Store + Sync,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub async fn add_answer(&self, user: &User, answer: &Answer) -> PollResult<()> {
        self.store
            .add_answer(user, answer)
            .await
            .inspect_err(PollError::log)
    }

    pub async fn list_answers(&self) -> PollResult<Vec<Answer>> {
        self.store.list_answers().await.inspect_err(PollError::log)
    }

    pub async fn get_answer_by_id(&self, id: &AnswerId) -> PollResult<Answer> {
        self.store
            .get_answer_by_id(id)
            .await
            .inspect_err(PollError::log)
    }

    pub async fn respond(&self, user: &User, answer: &Answer) -> PollResult<()> {
        self.store
            .respond(user, answer)
            .await
            .inspect_err(PollError::log)
    }

    pub async fn toggle_vote(&self, user: &User, answer: &Answer) -> PollResult<bool> {
        self.store
            .toggle_vote(user, answer)
            .await
            .inspect_err(PollError::log)
    }

    pub async fn find_user(&self, id: &UserId) -> PollResult<Option<User>> {
        self.store.find_user(id).await.inspect_err(PollError::log)
    }

    /// All answers, each seen from `viewer`'s side so `upvoted()` is meaningful
    pub async fn answers_for(&self, viewer: &User) -> PollResult<Vec<Answer>> {
        let answers = self.list_answers().await?;
        tracing::debug!(count = answers.len(), "Serving answer list");
        Ok(answers
            .into_iter()
            .map(|answer| answer.with_viewer(viewer.clone()))
            .collect())
    }

    /// Toggle `user`'s vote on the answer stored under `id`
    pub async fn vote_by_id(&self, user: &User, id: &AnswerId) -> PollResult<bool> {
        let answer = self.get_answer_by_id(id).await?;
        self.toggle_vote(user, &answer).await
    }

    /// Store `text` as the response to the answer under `id`.
    ///
    /// Whether `user` may respond is decided by the caller.
    pub async fn respond_by_id(
        &self,
        user: &User,
        id: &AnswerId,
        text: impl Into<String>,
    ) -> PollResult<Answer> {
        let answer = self.get_answer_by_id(id).await?.with_response(text);
        self.respond(user, &answer).await?;
        Ok(answer)
    }
}

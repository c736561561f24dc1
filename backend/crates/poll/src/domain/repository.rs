//! Repository Traits
//!
//! The store contract. Implementations are in the infrastructure layer and
//! must be indistinguishable to callers.

use crate::domain::entity::{answer::Answer, user::User};
use crate::domain::value_object::{answer_id::AnswerId, user_id::UserId};
use crate::error::PollResult;

/// Answer store trait
#[trait_variant::make(Store: Send)]
pub trait LocalStore {
    /// Persist a new answer.
    ///
    /// Upserts the user records of every identified participant, stores the
    /// answer once and appends its id to the listing order. Adding an id that
    /// is already stored keeps the stored fields and unions the new initial
    /// voters into the voter set.
    async fn add_answer(&self, user: &User, answer: &Answer) -> PollResult<()>;

    /// All answers in the order they were first added
    async fn list_answers(&self) -> PollResult<Vec<Answer>>;

    /// Find an answer, failing with `AnswerNotFound` when absent
    async fn get_answer_by_id(&self, id: &AnswerId) -> PollResult<Answer>;

    /// Overwrite the stored response with `answer.response()`.
    ///
    /// Whether `user` may respond is decided by the caller.
    async fn respond(&self, user: &User, answer: &Answer) -> PollResult<()>;

    /// Flip `user`'s vote on `answer` and return whether they vote afterwards
    async fn toggle_vote(&self, user: &User, answer: &Answer) -> PollResult<bool>;

    /// Read back a user record written by any of the operations above
    async fn find_user(&self, id: &UserId) -> PollResult<Option<User>>;
}

//! Answer Entity
//!
//! The aggregate of the board: a question addressed to someone, its response,
//! and the set of users currently voting for it.

use std::collections::BTreeMap;

use chrono::Utc;

use crate::domain::entity::user::User;
use crate::domain::value_object::answer_id::{AnswerId, answer_id_for};
use crate::domain::value_object::user_id::UserId;
use crate::error::{PollError, PollResult};

/// Answer entity
///
/// Invariants:
/// - `id` depends on `content` only.
/// - An anonymous answer stores the anonymous sentinel as asker, so the real
///   asker can't be recovered from it.
/// - `voters` never holds the unidentified id.
#[derive(Debug, Clone)]
pub struct Answer {
    id: AnswerId,
    content: String,
    asker: User,
    addressee: User,
    anonymous: bool,
    /// Empty until the addressee responds
    response: String,
    /// Unix seconds at creation
    timestamp: i64,
    voters: BTreeMap<UserId, User>,
    /// Presentation-only: whose point of view `upvoted()` answers for
    viewer: Option<User>,
}

/// Persisted state of an answer, as a backend reads it back.
#[derive(Debug, Clone)]
pub struct AnswerParts {
    pub id: AnswerId,
    pub content: String,
    pub asker: User,
    pub addressee: User,
    pub response: String,
    pub timestamp: i64,
    pub voters: Vec<User>,
}

impl Answer {
    /// Create a new answer as posted by `asker`.
    ///
    /// A non-anonymous asker starts as the only voter. An asker without an
    /// identity is always recorded anonymously.
    pub fn new(
        content: impl Into<String>,
        asker: User,
        addressee: Option<User>,
        anonymous: bool,
    ) -> Self {
        let content = content.into();
        let anonymous = anonymous || asker.is_anonymous();

        let mut voters = BTreeMap::new();
        let asker = if anonymous {
            User::anonymous()
        } else {
            voters.insert(asker.id().clone(), asker.clone());
            asker
        };

        Self {
            id: answer_id_for(&content),
            content,
            asker,
            addressee: addressee.unwrap_or_else(User::anonymous),
            anonymous,
            response: String::new(),
            timestamp: Utc::now().timestamp(),
            voters,
            viewer: None,
        }
    }

    /// Rebuild a stored answer. Anonymity follows from the stored asker.
    pub fn from_parts(parts: AnswerParts) -> Self {
        let voters = parts
            .voters
            .into_iter()
            .filter(|u| !u.is_anonymous())
            .map(|u| (u.id().clone(), u))
            .collect();

        Self {
            id: parts.id,
            content: parts.content,
            anonymous: parts.asker.is_anonymous(),
            asker: parts.asker,
            addressee: parts.addressee,
            response: parts.response,
            timestamp: parts.timestamp,
            voters,
            viewer: None,
        }
    }

    pub fn id(&self) -> &AnswerId {
        &self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn asker(&self) -> &User {
        &self.asker
    }

    pub fn addressee(&self) -> &User {
        &self.addressee
    }

    pub fn is_anonymous(&self) -> bool {
        self.anonymous
    }

    pub fn response(&self) -> &str {
        &self.response
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Voters in id order
    pub fn voters(&self) -> impl Iterator<Item = &User> {
        self.voters.values()
    }

    pub fn votes(&self) -> usize {
        self.voters.len()
    }

    pub fn has_voted(&self, user: &User) -> bool {
        !user.is_anonymous() && self.voters.contains_key(user.id())
    }

    /// Flip `user`'s vote and return whether they are voting afterwards.
    pub fn toggle_vote(&mut self, user: &User) -> PollResult<bool> {
        if user.is_anonymous() {
            return Err(PollError::UnidentifiedVoter);
        }
        if self.voters.remove(user.id()).is_some() {
            Ok(false)
        } else {
            self.voters.insert(user.id().clone(), user.clone());
            Ok(true)
        }
    }

    /// Union `other`'s voters into this answer (re-asking identical content).
    pub fn merge_voters(&mut self, other: &Answer) {
        for voter in other.voters() {
            self.voters
                .entry(voter.id().clone())
                .or_insert_with(|| voter.clone());
        }
    }

    /// Overwrite the response.
    pub fn set_response(&mut self, text: impl Into<String>) {
        self.response = text.into();
    }

    pub fn with_response(mut self, text: impl Into<String>) -> Self {
        self.set_response(text);
        self
    }

    /// Attach the viewing user for `upvoted()`. Never persisted.
    pub fn set_viewer(&mut self, viewer: User) {
        self.viewer = Some(viewer);
    }

    pub fn with_viewer(mut self, viewer: User) -> Self {
        self.set_viewer(viewer);
        self
    }

    pub fn clear_viewer(&mut self) {
        self.viewer = None;
    }

    pub fn viewer(&self) -> Option<&User> {
        self.viewer.as_ref()
    }

    /// Whether the attached viewer votes for this answer.
    pub fn upvoted(&self) -> bool {
        self.viewer.as_ref().is_some_and(|v| self.has_voted(v))
    }
}

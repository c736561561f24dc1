//! DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

use crate::domain::entity::{answer::Answer, user::User};
use crate::domain::roster::Roster;
use crate::error::{PollError, PollResult};

/// Serialized answer as served to a viewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerView {
    pub id: String,
    /// Display name, empty for anonymous answers
    pub asker: String,
    /// Roster index, 0 when unknown
    pub addressee: usize,
    pub content: String,
    pub response: String,
    /// Whether the viewer attached to the answer votes for it
    pub upvoted: bool,
    pub votes: usize,
    pub timestamp: i64,
}

impl AnswerView {
    pub fn render(answer: &Answer, roster: &impl Roster) -> Self {
        Self {
            id: answer.id().to_string(),
            asker: answer.asker().name().to_string(),
            addressee: roster.index_of(answer.addressee()),
            content: answer.content().to_string(),
            response: answer.response().to_string(),
            upvoted: answer.upvoted(),
            votes: answer.votes(),
            timestamp: answer.timestamp(),
        }
    }

    /// Render a listing from `viewer`'s side
    pub fn render_all(answers: Vec<Answer>, viewer: &User, roster: &impl Roster) -> Vec<Self> {
        answers
            .into_iter()
            .map(|answer| Self::render(&answer.with_viewer(viewer.clone()), roster))
            .collect()
    }
}

/// Request to post a new answer
#[derive(Debug, Clone, Deserialize)]
pub struct AddAnswerRequest {
    pub content: String,
    #[serde(default)]
    pub anonymous: bool,
    /// Roster index of the addressee, 0 for nobody in particular
    #[serde(default)]
    pub addressee: usize,
}

impl AddAnswerRequest {
    /// Turn the request into a new answer asked by `asker`.
    pub fn into_answer(self, asker: User, roster: &impl Roster) -> PollResult<Answer> {
        if self.content.trim().is_empty() {
            return Err(PollError::MalformedInput("answer content is empty".into()));
        }

        let addressee = match self.addressee {
            0 => None,
            index => Some(roster.reverse_lookup(index).ok_or_else(|| {
                PollError::MalformedInput(format!("no addressee at roster index {index}"))
            })?),
        };

        Ok(Answer::new(self.content, asker, addressee, self.anonymous))
    }
}

/// Request to respond to an answer
#[derive(Debug, Clone, Deserialize)]
pub struct RespondRequest {
    pub response: String,
}

//! Poll Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, store contract, roster port
//! - `application/` - Configuration, backend selection, use cases
//! - `infra/` - In-memory and key/value store backends, file roster
//! - `presentation/` - Serialized answer shape and request DTOs
//!
//! ## Privacy Model
//! - Answer and user ids are content digests, so identical questions collapse
//!   into one answer whoever asks them
//! - An anonymous answer stores the anonymous sentinel as its asker; the real
//!   asker is neither a voter nor logged
//! - Vote toggles are atomic on every backend

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::{AnyStore, BackendKind, Poll, PollConfig};
pub use domain::entity::{Answer, AnswerParts, User};
pub use domain::repository::Store;
pub use domain::roster::Roster;
pub use domain::value_object::{
    answer_id::{AnswerId, answer_id_for},
    user_id::{UserId, user_id_for},
};
pub use error::{PollError, PollResult};
pub use infra::{FileRoster, KvStore, MemoryStore, RedisKv};
pub use presentation::dto::{AddAnswerRequest, AnswerView, RespondRequest};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult, OptionExt, ResultExt},
    kind::ErrorKind,
};

#[cfg(test)]
mod tests;

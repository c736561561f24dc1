//! Domain Entities

pub mod answer;
pub mod user;

pub use answer::{Answer, AnswerParts};
pub use user::User;

//! Domain Layer
//!
//! Contains entities, value objects, the store contract and the roster port.

pub mod entity;
pub mod repository;
pub mod roster;
pub mod value_object;

// Re-exports
pub use entity::{answer::Answer, user::User};
pub use repository::{LocalStore, Store};
pub use roster::Roster;

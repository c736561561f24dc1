//! Application Layer
//!
//! Configuration, backend selection and the poll use cases.

pub mod backend;
pub mod config;
pub mod poll;

pub use backend::AnyStore;
pub use config::{BackendKind, PollConfig};
pub use poll::Poll;

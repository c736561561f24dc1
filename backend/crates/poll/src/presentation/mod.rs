//! Presentation Layer
//!
//! Serialized answer shape and request DTOs for the transport layer.

pub mod dto;

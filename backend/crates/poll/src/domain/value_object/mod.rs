//! Value Object Module

pub mod answer_id;
pub mod user_id;

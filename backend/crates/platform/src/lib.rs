//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Content digests (SHA-1, URL-safe Base64) used to derive ids

pub mod crypto;

//! Core types and shared logic for the scour purge service.
//!
//! This crate defines what the other crates agree on:
//! - Application configuration (server, files tree, metadata store, admin)
//! - User identifier validation and the `home::<uid>` storage key convention

pub mod config;
pub mod error;
pub mod user;

pub use error::{Error, Result};
pub use user::{home_storage_id, validate_uid};

/// Maximum accepted length of a user identifier.
pub const MAX_UID_LEN: usize = 64;

//! HTTP request handlers.

pub mod admin;

pub use admin::*;

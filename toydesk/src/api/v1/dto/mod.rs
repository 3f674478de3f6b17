//! v1 API Data Transfer Objects.
//!
//! Wire types for the v1 REST API, kept apart from the domain types in
//! `catalog`, `context` and `models`.

pub mod admin;
pub mod chat;
pub mod common;
pub mod history;
pub mod session;

pub use admin::*;
pub use chat::*;
pub use common::*;
pub use history::*;
pub use session::*;

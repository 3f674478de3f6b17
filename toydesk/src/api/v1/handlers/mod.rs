pub mod admin;
pub mod chat;
pub(crate) mod health;
pub mod history;
pub mod sessions;

pub use health::health_check;

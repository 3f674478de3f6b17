pub mod api;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod context;
pub mod conversation;
pub mod db;
pub mod error;
pub mod llm;
pub mod models;
pub mod services;

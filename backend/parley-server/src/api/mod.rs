pub mod auth;
pub mod chat;
pub mod error;
pub mod extractors;
pub mod files;
pub mod oauth;

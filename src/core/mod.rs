//! Core utilities: configuration, errors, access decisions, HTTP API

pub mod access;
pub mod config;
pub mod error;
pub mod subscription;
pub mod web_server;

pub use error::{AppError, AppResult};

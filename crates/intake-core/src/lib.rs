//! Core types for the feedback-intake service.
//!
//! This crate holds configuration, the error taxonomy, the submission model,
//! the attachment selection state machine, and folder-name sanitization.
//! It has no knowledge of HTTP or of the external services; those live in
//! `intake-services` and `intake-api`.

pub mod config;
pub mod error;
pub mod models;
pub mod sanitize;
pub mod selection;

pub use config::Config;
pub use error::{AppError, LogLevel};
pub use models::{Attachment, Submission};

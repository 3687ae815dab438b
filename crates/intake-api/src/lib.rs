//! Feedback-intake API library.
//!
//! HTTP handlers, application state, and setup for the intake service.
//! The binary in `main.rs` wires configuration and the real service clients;
//! integration tests build the same router against in-memory doubles.

mod handlers;
mod telemetry;

pub mod error;
pub mod guard;
pub mod setup;
pub mod state;

pub use error::HttpAppError;
pub use telemetry::init_telemetry;

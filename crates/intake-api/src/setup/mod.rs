//! Application setup and initialization
//!
//! Router construction lives here so the binary and the integration tests
//! build the exact same application, differing only in the injected services.

pub mod routes;
pub mod server;

pub use routes::build_router;
pub use server::start_server;

//! Upscaler API Library
//!
//! HTTP handlers, error mapping and application setup. The binary in `main.rs` only
//! loads configuration and calls into `setup`.

pub mod api_doc;
pub mod error;
mod handlers;
pub mod middleware;
pub mod setup;
pub mod state;
pub mod telemetry;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use handlers::upload::UpscaleResponse;
pub use state::AppState;

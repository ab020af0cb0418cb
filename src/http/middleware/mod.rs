//! Cross-cutting request middleware.
//!
//! # Order (outermost first)
//! ```text
//! request id → request span → metrics → CORS → deadline → handler
//! ```

pub mod cors;
pub mod deadline;

pub use cors::cors_middleware;
pub use deadline::{deadline_layer, handle_middleware_error};

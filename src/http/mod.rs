//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID)
//!     → middleware/ (CORS, deadline)
//!     → handlers.rs (ping, list, get-by-id)
//!     → store (ProductRepository)
//!     → JSON body or error.rs envelope
//! ```

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod request;
pub mod server;

pub use error::{ApiError, ErrorBody};
pub use request::{RequestIdExt, X_REQUEST_ID};
pub use server::{build_router, AppState, HttpServer};

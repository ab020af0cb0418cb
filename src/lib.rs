//! Traced product listing API library.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod store;

pub use config::AppConfig;
pub use error::AppError;
pub use http::{AppState, HttpServer};
pub use lifecycle::Shutdown;
pub use store::{Product, ProductRepository};

//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!     → tracing.rs (request spans with remote parents)
//!
//! telemetry.rs wires them into one subscriber and exports spans:
//!     → OTLP collector (HTTP/protobuf)
//!     → stdout (development)
//! ```
//!
//! # Design Decisions
//! - `tracing` is the only instrumentation API; OpenTelemetry sits behind it
//! - Request ID flows through every span
//! - Metrics are cheap (no-ops without a recorder)

pub mod logging;
pub mod metrics;
pub mod telemetry;
pub mod tracing;

pub use telemetry::{setup, TelemetryError, TelemetryGuard};

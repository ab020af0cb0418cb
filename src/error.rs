//! Process-level error reporting.

use crate::lifecycle::StartupError;
use crate::observability::TelemetryError;

/// Everything that can end the process with a failure.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),

    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    /// The run failed and flushing telemetry afterwards failed too.
    #[error("{run}; additionally, {shutdown}")]
    Joined {
        run: StartupError,
        shutdown: TelemetryError,
    },
}

/// Combine the run outcome with the telemetry shutdown outcome.
///
/// Neither error is dropped: when both failed, both are reported.
pub fn join(
    run: Result<(), StartupError>,
    shutdown: Result<(), TelemetryError>,
) -> Result<(), AppError> {
    match (run, shutdown) {
        (Ok(()), Ok(())) => Ok(()),
        (Err(run), Ok(())) => Err(AppError::Startup(run)),
        (Ok(()), Err(shutdown)) => Err(AppError::Telemetry(shutdown)),
        (Err(run), Err(shutdown)) => Err(AppError::Joined { run, shutdown }),
    }
}

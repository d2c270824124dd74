use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("device rejected operation: {0}")]
    Device(String),
}

/// Capability seam between the run loop and a programmable current source.
///
/// The loop calls `configure` once before the first tick, `apply` once per
/// grid point in application order, and `shutdown` exactly once at
/// termination. `shutdown` must be safe on a driver whose `configure` never
/// ran or failed.
pub trait SourceDriver: Send {
    fn configure(&mut self) -> Result<(), DriverError>;
    fn apply(&mut self, amps: f64) -> Result<(), DriverError>;
    fn query_status(&mut self) -> Result<String, DriverError>;
    fn shutdown(&mut self) -> Result<(), DriverError>;
}

use crate::driver::{DriverError, SourceDriver};

/// In-memory stand-in for a programmable current source.
#[derive(Debug, Clone, Default)]
pub struct SimulatedSource {
    output_on: bool,
    fail_configure: bool,
    applied_count: u64,
    last_amps: f64,
    peak_amps: f64,
    shutdown_calls: u32,
}

impl SimulatedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source whose initialization is rejected, for exercising the abort
    /// path.
    pub fn failing_configure() -> Self {
        Self {
            fail_configure: true,
            ..Self::default()
        }
    }

    pub fn applied_count(&self) -> u64 {
        self.applied_count
    }

    pub fn last_amps(&self) -> f64 {
        self.last_amps
    }

    pub fn peak_amps(&self) -> f64 {
        self.peak_amps
    }

    pub fn shutdown_calls(&self) -> u32 {
        self.shutdown_calls
    }

    pub fn is_output_on(&self) -> bool {
        self.output_on
    }
}

impl SourceDriver for SimulatedSource {
    fn configure(&mut self) -> Result<(), DriverError> {
        if self.fail_configure {
            return Err(DriverError::Device("configure rejected".into()));
        }
        self.output_on = true;
        Ok(())
    }

    fn apply(&mut self, amps: f64) -> Result<(), DriverError> {
        if !self.output_on {
            return Err(DriverError::Device("output not enabled".into()));
        }
        self.applied_count += 1;
        self.last_amps = amps;
        self.peak_amps = self.peak_amps.max(amps);
        Ok(())
    }

    fn query_status(&mut self) -> Result<String, DriverError> {
        Ok(format!(
            "simulated source: {} points applied, peak {:.6} A",
            self.applied_count, self.peak_amps
        ))
    }

    fn shutdown(&mut self) -> Result<(), DriverError> {
        self.output_on = false;
        self.shutdown_calls += 1;
        Ok(())
    }
}

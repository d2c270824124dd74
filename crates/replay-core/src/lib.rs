pub mod driver;
pub mod driver_sim;
pub mod resample;
mod resample_proptest;
pub mod run_flag;
pub mod run_loop;

pub use driver::{DriverError, SourceDriver};
pub use driver_sim::SimulatedSource;
pub use resample::{
    resample, GridPoint, MalformedKind, ResampleConfig, ResampleError, ResampledSeries, Sample,
};
pub use run_flag::{RunFlag, RunState};
pub use run_loop::{RunConfig, RunController, RunError, RunStats};

use crate::driver::{DriverError, SourceDriver};
use crate::resample::ResampledSeries;
use crate::run_flag::RunFlag;
use serde::Serialize;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct RunConfig {
    /// Pace of the replay; one grid point is applied per tick.
    pub tick_interval: Duration,
    /// Upper bound on any single sleep, so a stop request is observed
    /// promptly even with a coarse tick.
    pub wait_slice: Duration,
    /// Cycle the sequence until stopped, as the instrument's own trigger
    /// loop would.
    pub repeat: bool,
    /// Abort after this many consecutive apply failures. `None` keeps the
    /// loop running through intermittent driver errors.
    pub apply_error_limit: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(1),
            wait_slice: Duration::from_millis(50),
            repeat: true,
            apply_error_limit: None,
        }
    }
}

#[derive(Clone, Default, Debug, Serialize)]
pub struct RunStats {
    pub ticks_executed: u64,
    pub cycles_completed: u64,
    pub apply_errors: u64,
    pub max_lag_us: u64,
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("driver initialization failed: {0}")]
    DriverInit(#[source] DriverError),
    #[error("driver failed {consecutive} consecutive ticks")]
    DriverStalled { consecutive: u64 },
}

/// Drives a [`SourceDriver`] through a resampled sequence until stopped.
///
/// Cancellation is cooperative: the loop checks the shared [`RunFlag`]
/// before every tick and between sleep slices, so a device call in flight
/// always completes before the loop winds down. Shutdown runs exactly once
/// on every exit path, including initialization failure and drop.
pub struct RunController<D: SourceDriver> {
    driver: D,
    config: RunConfig,
    flag: Arc<RunFlag>,
    stats: RunStats,
    configured: bool,
    shutdown_done: bool,
}

impl<D: SourceDriver> RunController<D> {
    pub fn new(driver: D, config: RunConfig, flag: Arc<RunFlag>) -> Self {
        Self {
            driver,
            config,
            flag,
            stats: RunStats::default(),
            configured: false,
            shutdown_done: false,
        }
    }

    pub fn flag(&self) -> &Arc<RunFlag> {
        &self.flag
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn run(&mut self, series: &ResampledSeries) -> Result<RunStats, RunError> {
        if let Err(e) = self.driver.configure() {
            self.finish();
            return Err(RunError::DriverInit(e));
        }
        self.configured = true;

        let mut consecutive_errors = 0u64;
        let mut next_tick = Instant::now();

        'playback: while !series.is_empty() && !self.flag.is_stop_requested() {
            for point in series.points() {
                if self.flag.is_stop_requested() {
                    break 'playback;
                }
                match self.driver.apply(point.amps) {
                    Ok(()) => consecutive_errors = 0,
                    Err(e) => {
                        self.stats.apply_errors += 1;
                        consecutive_errors += 1;
                        log::warn!("apply failed at grid index {}: {}", point.index, e);
                        if let Some(limit) = self.config.apply_error_limit {
                            if consecutive_errors >= limit {
                                self.finish();
                                return Err(RunError::DriverStalled {
                                    consecutive: consecutive_errors,
                                });
                            }
                        }
                    }
                }
                self.stats.ticks_executed += 1;
                next_tick += self.config.tick_interval;
                self.wait_until(next_tick);
            }
            if self.flag.is_stop_requested() {
                break;
            }
            self.stats.cycles_completed += 1;
            if !self.config.repeat {
                break;
            }
        }

        self.finish();
        Ok(self.stats.clone())
    }

    /// Sleep toward the deadline in bounded slices, bailing out as soon as a
    /// stop is requested. Lag is carried by the caller's pacer; only the
    /// worst observed overrun is recorded.
    fn wait_until(&mut self, deadline: Instant) {
        loop {
            if self.flag.is_stop_requested() {
                return;
            }
            let now = Instant::now();
            if now >= deadline {
                let lag_us = now.duration_since(deadline).as_micros() as u64;
                self.stats.max_lag_us = self.stats.max_lag_us.max(lag_us);
                return;
            }
            thread::sleep((deadline - now).min(self.config.wait_slice));
        }
    }

    /// Terminal transition: final status query, driver release, flag to
    /// `Stopped`. Latched so repeated stop requests and the drop guard
    /// cannot release the driver twice. Errors here are logged and
    /// swallowed so every cleanup step gets its chance to run.
    fn finish(&mut self) {
        if self.shutdown_done {
            return;
        }
        self.shutdown_done = true;

        if self.configured {
            match self.driver.query_status() {
                Ok(status) => log::info!("final driver status: {}", status),
                Err(e) => log::warn!("final status query failed: {}", e),
            }
        }
        if let Err(e) = self.driver.shutdown() {
            log::warn!("driver shutdown failed: {}", e);
        }
        self.flag.mark_stopped();
    }
}

impl<D: SourceDriver> Drop for RunController<D> {
    fn drop(&mut self) {
        self.finish();
    }
}

use crate::markers::ControlFiles;
use crate::runlog::{RunEventKind, RunLogger};
use crate::runtime::config::RuntimeConfig;
use crate::runtime::logging::init_tracing;
use crate::scpi::{ScpiConfig, ScpiSource};
use crate::waveform;
use replay_core::{
    resample, DriverError, ResampleConfig, RunConfig, RunController, RunFlag, SimulatedSource,
    SourceDriver,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

enum ReplayDriver {
    Simulated(SimulatedSource),
    Scpi(ScpiSource),
}

impl SourceDriver for ReplayDriver {
    fn configure(&mut self) -> Result<(), DriverError> {
        match self {
            Self::Simulated(d) => d.configure(),
            Self::Scpi(d) => d.configure(),
        }
    }

    fn apply(&mut self, amps: f64) -> Result<(), DriverError> {
        match self {
            Self::Simulated(d) => d.apply(amps),
            Self::Scpi(d) => d.apply(amps),
        }
    }

    fn query_status(&mut self) -> Result<String, DriverError> {
        match self {
            Self::Simulated(d) => d.query_status(),
            Self::Scpi(d) => d.query_status(),
        }
    }

    fn shutdown(&mut self) -> Result<(), DriverError> {
        match self {
            Self::Simulated(d) => d.shutdown(),
            Self::Scpi(d) => d.shutdown(),
        }
    }
}

pub fn run_from_args() -> i32 {
    let config = RuntimeConfig::from_env();
    if config.show_help {
        RuntimeConfig::print_help();
        return 0;
    }
    run(config)
}

pub fn run(config: RuntimeConfig) -> i32 {
    let _log_guard = init_tracing(config.json_logs, config.log_dir.as_deref());

    let journal = config.run_log.as_ref().and_then(|path| {
        match RunLogger::new(path) {
            Ok(logger) => {
                info!(path = %path.display(), "run journal enabled");
                Some(Arc::new(logger))
            }
            Err(e) => {
                warn!(error = %e, path = %path.display(), "failed to open run journal");
                None
            }
        }
    });

    let loaded = match waveform::load(&config.input_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            error!(error = %e, "cannot read waveform");
            return 2;
        }
    };
    let resample_config = ResampleConfig {
        step_s: config.step_ms / 1e3,
        ..ResampleConfig::default()
    };
    let series = match resample(&loaded.samples, &resample_config) {
        Ok(series) => series,
        Err(e) => {
            error!(error = %e, "waveform rejected");
            return 2;
        }
    };
    info!(
        raw_samples = loaded.samples.len(),
        dropped_rows = loaded.dropped_rows,
        grid_points = series.len(),
        step_ms = config.step_ms,
        "waveform resampled onto uniform grid"
    );

    let markers = ControlFiles::for_run(config.run_id.as_deref());
    if let Err(e) = markers.write_pid() {
        warn!(error = %e, path = %markers.pid_path().display(), "failed to write pid marker");
    }

    let flag = Arc::new(RunFlag::new());

    let monitor = {
        let journal = journal.clone();
        markers.spawn_monitor(Arc::clone(&flag), config.poll_interval, move || {
            if let Some(journal) = &journal {
                let _ = journal.event(
                    RunEventKind::StopRequested,
                    json!({"source": "control-marker"}),
                );
            }
        })
    };

    {
        let flag = Arc::clone(&flag);
        let journal = journal.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            info!("interrupt received, stopping");
            if let Some(journal) = &journal {
                let _ = journal.event(RunEventKind::StopRequested, json!({"source": "interrupt"}));
            }
            flag.request_stop();
        }) {
            warn!(error = %e, "failed to install interrupt handler");
        }
    }

    let driver = if config.simulate {
        info!("using simulated source");
        ReplayDriver::Simulated(SimulatedSource::new())
    } else {
        let scpi_config = ScpiConfig {
            addr: config.instrument_addr.clone(),
            ..ScpiConfig::default()
        };
        match ScpiSource::connect(scpi_config) {
            Ok(source) => ReplayDriver::Scpi(source),
            Err(e) => {
                error!(error = %e, addr = %config.instrument_addr, "cannot reach instrument");
                if let Some(journal) = &journal {
                    let _ =
                        journal.event(RunEventKind::RunFailed, json!({"error": e.to_string()}));
                }
                // No driver was acquired; cleanup is just the markers and
                // the monitor.
                flag.request_stop();
                if let Err(e) = markers.write_terminated() {
                    warn!(error = %e, "failed to update control marker");
                }
                let _ = monitor.join();
                return 1;
            }
        }
    };

    if let Some(journal) = &journal {
        let _ = journal.event(
            RunEventKind::RunStarted,
            json!({
                "input": config.input_path.display().to_string(),
                "grid_points": series.len(),
                "step_ms": config.step_ms,
                "simulate": config.simulate,
            }),
        );
    }

    let run_config = RunConfig {
        tick_interval: Duration::from_secs_f64(config.step_ms / 1e3),
        repeat: !config.single_pass,
        ..RunConfig::default()
    };
    info!(
        tick_ms = config.step_ms,
        repeat = !config.single_pass,
        "starting replay loop"
    );
    let mut controller = RunController::new(driver, run_config, Arc::clone(&flag));
    let outcome = controller.run(&series);
    drop(controller);

    let exit_code = match &outcome {
        Ok(stats) => {
            info!(
                ticks_executed = stats.ticks_executed,
                cycles_completed = stats.cycles_completed,
                apply_errors = stats.apply_errors,
                max_lag_us = stats.max_lag_us,
                "run complete"
            );
            if let Some(journal) = &journal {
                let _ = journal.event(
                    RunEventKind::RunCompleted,
                    serde_json::to_value(stats).unwrap_or_default(),
                );
            }
            0
        }
        Err(e) => {
            error!(error = %e, "run aborted");
            if let Some(journal) = &journal {
                let _ = journal.event(RunEventKind::RunFailed, json!({"error": e.to_string()}));
            }
            1
        }
    };

    if let Err(e) = markers.write_terminated() {
        warn!(error = %e, path = %markers.control_path().display(), "failed to update control marker");
    }
    let _ = monitor.join();
    exit_code
}

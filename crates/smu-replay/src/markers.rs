//! Control-file signaling between this process and the tool that launched
//! it.
//!
//! Two small files in the temp directory, namespaced by run id: a pid marker
//! written once at startup, and a control marker polled by a monitor thread.
//! Writing exactly `stop` into the control marker requests a cooperative
//! stop; on termination the process overwrites it with `terminated`.

use replay_core::RunFlag;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_RUN_ID: &str = "default";

const STOP_COMMAND: &str = "stop";
const TERMINATED_STATUS: &str = "terminated";

#[derive(Debug, Clone)]
pub struct ControlFiles {
    control_path: PathBuf,
    pid_path: PathBuf,
}

impl ControlFiles {
    pub fn for_run(run_id: Option<&str>) -> Self {
        Self::in_dir(&std::env::temp_dir(), run_id)
    }

    pub fn in_dir(dir: &Path, run_id: Option<&str>) -> Self {
        let id = run_id.unwrap_or(DEFAULT_RUN_ID);
        Self {
            control_path: dir.join(format!("smu_replay_control_{id}.txt")),
            pid_path: dir.join(format!("smu_replay_pid_{id}.txt")),
        }
    }

    pub fn control_path(&self) -> &Path {
        &self.control_path
    }

    pub fn pid_path(&self) -> &Path {
        &self.pid_path
    }

    /// Record this process for out-of-band control. Written once at startup,
    /// never read back.
    pub fn write_pid(&self) -> io::Result<()> {
        std::fs::write(&self.pid_path, std::process::id().to_string())
    }

    pub fn write_terminated(&self) -> io::Result<()> {
        std::fs::write(&self.control_path, TERMINATED_STATUS)
    }

    /// Poll the control marker until either it requests a stop or the run
    /// ends for another reason. The monitor shares nothing with the tick
    /// loop but the flag; an unreadable marker is logged and polling
    /// continues.
    pub fn spawn_monitor(
        &self,
        flag: Arc<RunFlag>,
        interval: Duration,
        mut on_stop: impl FnMut() + Send + 'static,
    ) -> JoinHandle<()> {
        let path = self.control_path.clone();
        thread::spawn(move || {
            while !flag.is_stop_requested() {
                match std::fs::read_to_string(&path) {
                    Ok(body) if body.trim() == STOP_COMMAND => {
                        info!(path = %path.display(), "stop command observed");
                        on_stop();
                        flag.request_stop();
                        break;
                    }
                    Ok(_) => {}
                    // The marker usually does not exist until someone wants
                    // us to stop.
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => {
                        warn!(error = %e, path = %path.display(), "control marker unreadable");
                    }
                }
                thread::sleep(interval);
            }
        })
    }
}

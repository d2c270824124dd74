use std::io::Write;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus};
use std::thread;
use std::time::{Duration, Instant};

const WAVEFORM: &str = "time ids\n\
    0.000 0.0005\n\
    0.001 0.0010\n\
    0.002 0.0002\n\
    0.0021 0.0009\n\
    0.003 0.0001\n";

fn binary_path() -> String {
    // Prefer the test-built binary when available to avoid extra cargo
    // builds.
    std::env::var("CARGO_BIN_EXE_smu-replay").unwrap_or_else(|_| {
        let candidates = [
            "../../target/release/smu-replay",
            "target/release/smu-replay",
            "./target/release/smu-replay",
            "../../target/debug/smu-replay",
            "target/debug/smu-replay",
            "./target/debug/smu-replay",
        ];
        for candidate in candidates {
            if std::path::Path::new(candidate).exists() {
                return candidate.to_string();
            }
        }
        panic!(
            "Failed to locate smu-replay binary. Expected CARGO_BIN_EXE_smu-replay or a build in target/{{release,debug}}/smu-replay."
        );
    })
}

struct ReplayProcess {
    child: Child,
}

impl ReplayProcess {
    fn spawn(args: &[&str]) -> Self {
        let child = Command::new(binary_path())
            .args(args)
            .spawn()
            .expect("Failed to start smu-replay");
        Self { child }
    }

    fn wait_for_exit(&mut self, timeout: Duration) -> Option<ExitStatus> {
        let start = Instant::now();
        while start.elapsed() < timeout {
            if let Ok(Some(status)) = self.child.try_wait() {
                return Some(status);
            }
            thread::sleep(Duration::from_millis(100));
        }
        None
    }

    fn pid(&self) -> u32 {
        self.child.id()
    }
}

impl Drop for ReplayProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn marker_path(kind: &str, run_id: &str) -> PathBuf {
    std::env::temp_dir().join(format!("smu_replay_{kind}_{run_id}.txt"))
}

fn write_waveform(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("waveform.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(WAVEFORM.as_bytes()).unwrap();
    path
}

fn wait_for_file(path: &PathBuf, timeout: Duration) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if path.exists() {
            return true;
        }
        thread::sleep(Duration::from_millis(50));
    }
    false
}

#[test]
fn stop_marker_terminates_cycling_run() {
    let run_id = "itest-stopfile";
    let control = marker_path("control", run_id);
    let pid_marker = marker_path("pid", run_id);
    let _ = std::fs::remove_file(&control);
    let _ = std::fs::remove_file(&pid_marker);

    let dir = tempfile::tempdir().unwrap();
    let waveform = write_waveform(&dir);
    let mut process = ReplayProcess::spawn(&[
        "--simulate",
        "--input",
        waveform.to_str().unwrap(),
        "--poll-ms",
        "100",
        run_id,
    ]);

    // Startup is complete once the pid marker appears.
    assert!(
        wait_for_file(&pid_marker, Duration::from_secs(10)),
        "pid marker never appeared"
    );
    assert_eq!(
        std::fs::read_to_string(&pid_marker).unwrap(),
        process.pid().to_string()
    );

    // Let the replay cycle for a moment, then request a stop.
    thread::sleep(Duration::from_millis(300));
    std::fs::write(&control, "stop").unwrap();

    let status = process
        .wait_for_exit(Duration::from_secs(10))
        .expect("process did not stop after the stop command");
    assert!(status.success(), "expected a clean stop, got {status:?}");
    assert_eq!(std::fs::read_to_string(&control).unwrap(), "terminated");
}

#[test]
fn single_pass_run_completes_on_its_own() {
    let run_id = "itest-singlepass";
    let control = marker_path("control", run_id);
    let _ = std::fs::remove_file(&control);

    let dir = tempfile::tempdir().unwrap();
    let waveform = write_waveform(&dir);
    let mut process = ReplayProcess::spawn(&[
        "--simulate",
        "--single-pass",
        "--input",
        waveform.to_str().unwrap(),
        run_id,
    ]);

    let status = process
        .wait_for_exit(Duration::from_secs(10))
        .expect("single-pass run did not finish");
    assert!(status.success());
    assert_eq!(std::fs::read_to_string(&control).unwrap(), "terminated");
}

#[test]
fn missing_input_is_a_startup_failure() {
    let mut process = ReplayProcess::spawn(&[
        "--simulate",
        "--input",
        "/nonexistent/waveform.csv",
        "itest-noinput",
    ]);
    let status = process
        .wait_for_exit(Duration::from_secs(10))
        .expect("process should exit immediately");
    assert!(!status.success());
}

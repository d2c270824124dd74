use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub show_help: bool,
    /// Namespaces the control and pid markers; the single positional
    /// argument.
    pub run_id: Option<String>,
    pub input_path: PathBuf,
    pub instrument_addr: String,
    pub simulate: bool,
    pub step_ms: f64,
    pub poll_interval: Duration,
    pub single_pass: bool,
    pub json_logs: bool,
    pub log_dir: Option<PathBuf>,
    pub run_log: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            show_help: false,
            run_id: None,
            input_path: PathBuf::from("current.csv"),
            instrument_addr: "10.0.0.38:5025".to_string(),
            simulate: false,
            step_ms: 1.0,
            poll_interval: Duration::from_millis(500),
            single_pass: false,
            json_logs: false,
            log_dir: None,
            run_log: None,
        }
    }
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        let args: Vec<String> = std::env::args().collect();
        Self::from_args(&args)
    }

    pub fn from_args(args: &[String]) -> Self {
        let mut cfg = RuntimeConfig::default();
        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--input" => {
                    if i + 1 < args.len() {
                        cfg.input_path = PathBuf::from(&args[i + 1]);
                        i += 1;
                    }
                }
                "--address" => {
                    if i + 1 < args.len() {
                        cfg.instrument_addr = args[i + 1].clone();
                        i += 1;
                    }
                }
                "--simulate" => {
                    cfg.simulate = true;
                }
                "--step-ms" => {
                    if i + 1 < args.len() {
                        cfg.step_ms = args[i + 1].parse().unwrap_or(1.0);
                        i += 1;
                    }
                }
                "--poll-ms" => {
                    if i + 1 < args.len() {
                        let ms = args[i + 1].parse().unwrap_or(500);
                        cfg.poll_interval = Duration::from_millis(ms);
                        i += 1;
                    }
                }
                "--single-pass" => {
                    cfg.single_pass = true;
                }
                "--json-logs" => {
                    cfg.json_logs = true;
                }
                "--log-dir" => {
                    if i + 1 < args.len() {
                        cfg.log_dir = Some(PathBuf::from(&args[i + 1]));
                        i += 1;
                    }
                }
                "--run-log" => {
                    if i + 1 < args.len() {
                        cfg.run_log = Some(PathBuf::from(&args[i + 1]));
                        i += 1;
                    }
                }
                "--help" | "-h" => {
                    cfg.show_help = true;
                    break;
                }
                other => {
                    if !other.starts_with('-') && cfg.run_id.is_none() {
                        cfg.run_id = Some(other.to_string());
                    }
                }
            }
            i += 1;
        }
        cfg
    }

    pub fn print_help() {
        println!(
            r#"smu-replay - Replay a current waveform through a programmable source

USAGE:
    smu-replay [OPTIONS] [RUN_ID]

ARGS:
    RUN_ID                  Namespaces the control/pid marker files [default: default]

OPTIONS:
    --input <PATH>          Whitespace-delimited (time, current) file [default: current.csv]
    --address <ADDR>        Instrument TCP address [default: 10.0.0.38:5025]
    --simulate              Drive an in-memory source instead of the instrument
    --step-ms <MS>          Grid step in milliseconds [default: 1.0]
    --poll-ms <MS>          Control marker poll interval [default: 500]
    --single-pass           Play the sequence once instead of cycling until stopped
    --json-logs             Output logs in JSON format (for log aggregation)
    --log-dir <DIR>         Also write logs to a daily-rolled file in DIR
    --run-log <PATH>        Append run events to a JSONL journal
    -h, --help              Print this help message

ENVIRONMENT VARIABLES:
    RUST_LOG                Set log filter (e.g., RUST_LOG=debug,smu_replay=trace)

EXAMPLES:
    # Replay current.csv against the default instrument address
    smu-replay

    # Namespaced run controlled by an external tool
    smu-replay --input sweep.csv bench7

    # Hardware-free smoke test
    smu-replay --simulate --single-pass --input sweep.csv
"#
        );
    }
}

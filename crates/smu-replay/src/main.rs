mod markers;
mod runlog;
mod runtime;
mod scpi;
mod waveform;

fn main() {
    std::process::exit(runtime::app::run_from_args());
}

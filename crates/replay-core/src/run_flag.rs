use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle of a replay run. Transitions move forward only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Running,
    StopRequested,
    Stopped,
}

impl RunState {
    fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Running,
            1 => Self::StopRequested,
            _ => Self::Stopped,
        }
    }
}

/// The single piece of state shared between the tick loop, the marker
/// monitor, and the interrupt handler.
///
/// All three stop paths funnel through [`RunFlag::request_stop`]; none of
/// them performs teardown. The flag is monotone: once a stop is requested it
/// can never read as running again, no matter how the callers interleave.
#[derive(Debug, Default)]
pub struct RunFlag(AtomicU8);

impl RunFlag {
    pub fn new() -> Self {
        Self(AtomicU8::new(RunState::Running as u8))
    }

    pub fn state(&self) -> RunState {
        RunState::from_raw(self.0.load(Ordering::Acquire))
    }

    /// Ask the tick loop to wind down. Safe to call from any thread, any
    /// number of times, including after the run has stopped.
    pub fn request_stop(&self) {
        self.0
            .fetch_max(RunState::StopRequested as u8, Ordering::AcqRel);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.state() != RunState::Running
    }

    /// Recorded by the run loop once shutdown has completed.
    pub(crate) fn mark_stopped(&self) {
        self.0.fetch_max(RunState::Stopped as u8, Ordering::AcqRel);
    }
}

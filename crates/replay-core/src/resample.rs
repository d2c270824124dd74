use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// One raw measurement: seconds since the series origin, source current in
/// amperes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time_s: f64,
    pub amps: f64,
}

impl Sample {
    pub fn new(time_s: f64, amps: f64) -> Self {
        Self { time_s, amps }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ResampleConfig {
    /// Grid step in seconds.
    pub step_s: f64,
    /// Tolerance absorbing floating-point jitter when comparing gaps against
    /// the grid step.
    pub tolerance_s: f64,
}

impl Default for ResampleConfig {
    fn default() -> Self {
        Self {
            step_s: 1e-3,
            tolerance_s: 1e-6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MalformedKind {
    NonFiniteTimestamp,
    NegativeTimestamp,
    OutOfOrder,
}

impl fmt::Display for MalformedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFiniteTimestamp => write!(f, "non-finite timestamp"),
            Self::NegativeTimestamp => write!(f, "negative timestamp"),
            Self::OutOfOrder => write!(f, "timestamp not in ascending order"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ResampleError {
    /// Fewer than two usable samples reached the resampler.
    #[error("insufficient data: {count} samples, need at least 2")]
    InsufficientData { count: usize },
    /// The timestamp stream is unusable. Sorting is the caller's job; the
    /// resampler only rejects.
    #[error("malformed input at sample {index}: {kind}")]
    MalformedInput { index: usize, kind: MalformedKind },
    #[error("grid step {step_s} is not a positive finite interval")]
    InvalidStep { step_s: f64 },
}

/// One element of the uniform output series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridPoint {
    pub index: usize,
    pub amps: f64,
}

/// Uniform fixed-step series produced by [`resample`].
///
/// Timestamps are derived, never copied from the input: the i-th point lives
/// at `i * step_s`. The cadence is defined purely by the count of emitted
/// points, so under heavy bursts the nominal grid is shorter than the true
/// elapsed time of the raw series. Callers treating the grid as wall time
/// must account for that approximation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResampledSeries {
    step_s: f64,
    values: Vec<f64>,
}

impl ResampledSeries {
    pub fn step_s(&self) -> f64 {
        self.step_s
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Derived timestamp of a grid index.
    pub fn timestamp(&self, index: usize) -> f64 {
        index as f64 * self.step_s
    }

    pub fn points(&self) -> impl Iterator<Item = GridPoint> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(index, &amps)| GridPoint { index, amps })
    }
}

/// Flatten an irregularly spaced series onto a uniform grid without losing
/// peak information.
///
/// Single pass with lookahead. A sample whose successor is at least one grid
/// step away is emitted unchanged. Otherwise the scan jumps to the first
/// sample a full step away (or the last sample if none is), emits the
/// maximum over the right-open interval in between, then emits the boundary
/// sample itself. Any transient excursion inside a skipped burst therefore
/// survives decimation.
pub fn resample(samples: &[Sample], config: &ResampleConfig) -> Result<ResampledSeries, ResampleError> {
    if !(config.step_s.is_finite() && config.step_s > 0.0) {
        return Err(ResampleError::InvalidStep {
            step_s: config.step_s,
        });
    }
    validate(samples)?;

    let delta = config.step_s;
    let threshold = delta - config.tolerance_s;
    let n = samples.len();
    let mut values = Vec::with_capacity(n);

    let mut i = 0;
    while i < n {
        if i == n - 1 {
            values.push(samples[i].amps);
            break;
        }

        let gap = samples[i + 1].time_s - samples[i].time_s;
        if gap >= threshold {
            values.push(samples[i].amps);
            i += 1;
            continue;
        }

        // Burst: the next sample lands inside the current grid step. Find
        // the first sample a full step away, falling back to the last one.
        let current_time = samples[i].time_s;
        let boundary = samples[i + 1..]
            .iter()
            .position(|s| s.time_s - current_time >= threshold)
            .map(|offset| i + 1 + offset)
            .unwrap_or(n - 1);
        let boundary_time = samples[boundary].time_s;

        // Peak over [current_time, boundary_time). The interval is empty
        // when every remaining sample shares the current timestamp.
        let lo = samples.partition_point(|s| s.time_s < current_time);
        let hi = samples.partition_point(|s| s.time_s < boundary_time);
        let peak = if lo == hi {
            samples[i].amps
        } else {
            samples[lo..hi]
                .iter()
                .fold(f64::NEG_INFINITY, |acc, s| acc.max(s.amps))
        };

        values.push(peak);
        values.push(samples[boundary].amps);
        i = boundary + 1;
    }

    Ok(ResampledSeries {
        step_s: delta,
        values,
    })
}

fn validate(samples: &[Sample]) -> Result<(), ResampleError> {
    if samples.len() < 2 {
        return Err(ResampleError::InsufficientData {
            count: samples.len(),
        });
    }
    for (index, sample) in samples.iter().enumerate() {
        if !sample.time_s.is_finite() {
            return Err(ResampleError::MalformedInput {
                index,
                kind: MalformedKind::NonFiniteTimestamp,
            });
        }
        if sample.time_s < 0.0 {
            return Err(ResampleError::MalformedInput {
                index,
                kind: MalformedKind::NegativeTimestamp,
            });
        }
        if index > 0 && sample.time_s < samples[index - 1].time_s {
            return Err(ResampleError::MalformedInput {
                index,
                kind: MalformedKind::OutOfOrder,
            });
        }
    }
    Ok(())
}

//! Whitespace-delimited `(time, current)` input loading.
//!
//! The expected shape is one header line followed by two numeric columns.
//! Rows with missing or non-numeric fields are dropped before the series
//! reaches the resampler; it is the resampler that decides whether enough
//! usable data remains.

use replay_core::Sample;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum WaveformError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("read failed: {0}")]
    Read(#[from] io::Error),
}

#[derive(Debug)]
pub struct LoadedWaveform {
    pub samples: Vec<Sample>,
    pub dropped_rows: usize,
}

pub fn load(path: &Path) -> Result<LoadedWaveform, WaveformError> {
    let file = File::open(path).map_err(|source| WaveformError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);

    let mut samples = Vec::new();
    let mut dropped_rows = 0usize;
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if lineno == 0 {
            // Header row.
            continue;
        }
        let row = line.trim();
        if row.is_empty() {
            continue;
        }
        match parse_row(row) {
            Some(sample) => samples.push(sample),
            None => dropped_rows += 1,
        }
    }

    if dropped_rows > 0 {
        warn!(
            dropped_rows,
            path = %path.display(),
            "dropped rows with missing or non-numeric fields"
        );
    }
    Ok(LoadedWaveform {
        samples,
        dropped_rows,
    })
}

fn parse_row(row: &str) -> Option<Sample> {
    let mut fields = row.split_whitespace();
    let time_s: f64 = fields.next()?.parse().ok()?;
    let amps: f64 = fields.next()?.parse().ok()?;
    if !time_s.is_finite() || !amps.is_finite() {
        return None;
    }
    Some(Sample::new(time_s, amps))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fixture(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_two_column_rows() {
        let file = write_fixture("time ids\n0.0 0.001\n0.001 0.002\n");
        let loaded = load(file.path()).unwrap();
        assert_eq!(loaded.dropped_rows, 0);
        assert_eq!(
            loaded.samples,
            vec![Sample::new(0.0, 0.001), Sample::new(0.001, 0.002)]
        );
    }

    #[test]
    fn drops_malformed_rows() {
        let file = write_fixture("time ids\n0.0 0.001\nbogus 0.5\n0.002\n0.003 nan\n0.004 0.004\n");
        let loaded = load(file.path()).unwrap();
        assert_eq!(loaded.dropped_rows, 3);
        assert_eq!(loaded.samples.len(), 2);
    }

    #[test]
    fn skips_header_and_blank_lines() {
        let file = write_fixture("time ids\n\n0.0 1.0\n\n0.001 2.0\n");
        let loaded = load(file.path()).unwrap();
        assert_eq!(loaded.samples.len(), 2);
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let err = load(Path::new("/nonexistent/waveform.csv")).unwrap_err();
        assert!(matches!(err, WaveformError::Open { .. }));
    }
}

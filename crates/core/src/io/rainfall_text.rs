//! Text rainfall file reading
//!
//! Reads `timestamp <delimiter> intensity` rows (three header lines skipped)
//! and resamples them onto a one-minute grid by backward fill: every grid
//! time takes the first observation at or after it.

use crate::error::{Error, Result};
use crate::rainfall::{RainfallParams, RainfallSeries};
use chrono::{Duration, NaiveDateTime, Timelike};
use std::path::Path;
use tracing::debug;

const HEADER_LINES: usize = 3;

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Read a text rainfall file into a padded one-minute series
pub fn read_rainfall_text<P: AsRef<Path>>(path: P) -> Result<RainfallSeries> {
    let text = std::fs::read_to_string(path.as_ref())?;
    parse_rainfall_text(&text, RainfallParams::default())
}

/// Parse rainfall text and resample to `params.timestep_seconds`
pub fn parse_rainfall_text(text: &str, params: RainfallParams) -> Result<RainfallSeries> {
    let mut observations: Vec<(NaiveDateTime, f64)> = Vec::new();

    for (idx, line) in text.lines().enumerate().skip(HEADER_LINES) {
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }
        let (stamp, value) = split_record(line).ok_or_else(|| Error::Parse {
            line: line_no,
            reason: format!("expected timestamp and intensity, got '{}'", line.trim()),
        })?;

        let time = parse_timestamp(stamp).ok_or_else(|| Error::Parse {
            line: line_no,
            reason: format!("unrecognised timestamp '{}'", stamp),
        })?;
        let intensity: f64 = value.replace(',', ".").parse().map_err(|_| Error::Parse {
            line: line_no,
            reason: format!("invalid intensity '{}'", value),
        })?;

        if let Some(&(previous, _)) = observations.last() {
            if time < previous {
                return Err(Error::Parse {
                    line: line_no,
                    reason: "timestamps must be in ascending order".into(),
                });
            }
        }
        observations.push((time, intensity));
    }

    let resampled = backward_fill(&observations, params.timestep_seconds)?;
    debug!(
        "Resampled {} rainfall observations to {} samples of {} s",
        observations.len(),
        resampled.len(),
        params.timestep_seconds
    );
    RainfallSeries::with_params(resampled, params)
}

/// Split a row on a tab, or else on the first run of two or more spaces
fn split_record(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    let (stamp, rest) = match line.split_once('\t') {
        Some(parts) => parts,
        None => {
            let idx = line.find("  ")?;
            (&line[..idx], &line[idx..])
        }
    };
    let value = rest.split('\t').map(str::trim).find(|s| !s.is_empty())?;
    Some((stamp.trim(), value))
}

fn parse_timestamp(stamp: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(stamp, fmt).ok())
}

fn backward_fill(observations: &[(NaiveDateTime, f64)], timestep_seconds: u32) -> Result<Vec<f64>> {
    let (Some(&(first, _)), Some(&(last, _))) = (observations.first(), observations.last()) else {
        return Ok(Vec::new());
    };
    if timestep_seconds == 0 {
        return Err(Error::InvalidParameter {
            name: "timestep_seconds",
            value: "0".into(),
            reason: "timestep must be positive".into(),
        });
    }
    let step = Duration::seconds(i64::from(timestep_seconds));

    let mut grid_time = first
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(first);

    let mut values = Vec::new();
    let mut cursor = 0;
    while grid_time <= last {
        while cursor < observations.len() && observations[cursor].0 < grid_time {
            cursor += 1;
        }
        match observations.get(cursor) {
            Some(&(_, value)) => values.push(value),
            None => break,
        }
        grid_time += step;
    }
    Ok(values)
}

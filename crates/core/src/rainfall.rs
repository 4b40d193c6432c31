//! Rainfall intensity series
//!
//! A rainfall event sampled at a fixed timestep (one minute by default), with
//! a trailing run of zero-valued samples so runoff computed near the end of
//! the event can still drain out.

use crate::error::{Error, Result};
use ndarray::{s, Array1, ArrayView1};

/// Sampling parameters for a rainfall series
#[derive(Debug, Clone)]
pub struct RainfallParams {
    /// Sample spacing in seconds. Default: 60
    pub timestep_seconds: u32,
    /// Zero samples appended after the event. Default: 60
    pub pad_samples: usize,
}

impl Default for RainfallParams {
    fn default() -> Self {
        Self {
            timestep_seconds: 60,
            pad_samples: 60,
        }
    }
}

/// Uniformly sampled rainfall intensities, zero-padded at the end
#[derive(Debug, Clone, PartialEq)]
pub struct RainfallSeries {
    values: Array1<f64>,
    pad_samples: usize,
    timestep_seconds: u32,
}

impl RainfallSeries {
    /// Build a series from one-minute intensities, appending the default pad
    pub fn new(intensities: Vec<f64>) -> Result<Self> {
        Self::with_params(intensities, RainfallParams::default())
    }

    /// Build a series with explicit sampling parameters
    pub fn with_params(intensities: Vec<f64>, params: RainfallParams) -> Result<Self> {
        if params.timestep_seconds == 0 {
            return Err(Error::InvalidParameter {
                name: "timestep_seconds",
                value: "0".into(),
                reason: "timestep must be positive".into(),
            });
        }
        if let Some(bad) = intensities.iter().find(|v| !v.is_finite()) {
            return Err(Error::InvalidParameter {
                name: "intensity",
                value: bad.to_string(),
                reason: "intensities must be finite".into(),
            });
        }

        let mut padded = intensities;
        padded.resize(padded.len() + params.pad_samples, 0.0);

        Ok(Self {
            values: Array1::from(padded),
            pad_samples: params.pad_samples,
            timestep_seconds: params.timestep_seconds,
        })
    }

    /// Number of samples, pad included
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of samples before the pad
    pub fn unpadded_len(&self) -> usize {
        self.values.len() - self.pad_samples
    }

    pub fn timestep_seconds(&self) -> u32 {
        self.timestep_seconds
    }

    /// All samples, pad included
    pub fn values(&self) -> ArrayView1<'_, f64> {
        self.values.view()
    }

    /// Sum of intensities over `[start, end)`, clamped to the series bounds
    pub fn window_sum(&self, start: usize, end: usize) -> (f64, bool) {
        let end = end.min(self.values.len());
        if start >= end {
            return (0.0, false);
        }
        let window = self.values.slice(s![start..end]);
        let any_rain = window.iter().any(|&v| v != 0.0);
        (window.sum(), any_rain)
    }
}

//! Synthetic recordings for demonstrations and tests
//!
//! Each channel carries a sine wave with a slowly varying amplitude plus a
//! little uniform noise drawn from a seeded generator, so the same seed always
//! gives the same samples.

use std::f64::consts::PI;

use ndarray::Array2;

use crate::error::{Error, Result};
use crate::signal::SyncSignal;
use crate::signal_set::SignalSet;
use crate::tags::Tags;

/// Rate and span of one synthetic run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSpec {
    pub sampling_rate: f64,
    pub start: f64,
    pub stop: f64,
}

impl RunSpec {
    pub fn new(sampling_rate: f64, start: f64, stop: f64) -> Self {
        Self {
            sampling_rate,
            start,
            stop,
        }
    }

    /// Samples needed to cover `[start, stop]`, both ends included
    pub fn sample_count(&self) -> Result<usize> {
        if !(self.sampling_rate.is_finite() && self.sampling_rate > 0.0) {
            return Err(Error::InvalidSignal(format!(
                "sampling rate must be positive and finite, got {}",
                self.sampling_rate
            )));
        }
        if !(self.start.is_finite() && self.stop.is_finite()) || self.stop < self.start {
            return Err(Error::InvalidSignal(format!(
                "invalid run span [{}, {}]",
                self.start, self.stop
            )));
        }

        let span = ((self.stop - self.start) * self.sampling_rate).round();
        if !span.is_finite() || span >= MAX_RUN_SAMPLES as f64 {
            return Err(Error::InvalidSignal(format!(
                "run of {} s at {} Hz exceeds {} samples",
                self.stop - self.start,
                self.sampling_rate,
                MAX_RUN_SAMPLES
            )));
        }
        (span as usize)
            .checked_add(1)
            .ok_or_else(|| Error::InvalidSignal("run too long".to_string()))
    }
}

/// Upper bound on the samples per channel of one synthetic run
pub const MAX_RUN_SAMPLES: usize = 1 << 28;

/// Parse a run written as `RATE:START:STOP`
pub fn parse_run_spec(spec: &str) -> Result<RunSpec> {
    let parts: Vec<&str> = spec.split(':').collect();
    if parts.len() != 3 {
        return Err(Error::InvalidSignal(format!(
            "run must be written RATE:START:STOP, got '{}'",
            spec
        )));
    }

    let field = |i: usize, what: &str| -> Result<f64> {
        parts[i]
            .trim()
            .parse()
            .map_err(|_| Error::InvalidSignal(format!("invalid {} '{}' in '{}'", what, parts[i], spec)))
    };

    let run = RunSpec::new(field(0, "rate")?, field(1, "start")?, field(2, "stop")?);
    if run.stop < run.start {
        return Err(Error::InvalidSignal(format!("run '{}' stops before it starts", spec)));
    }
    run.sample_count()?;
    Ok(run)
}

/// One run of `channels` synthetic channels
pub fn synthetic_run(spec: RunSpec, channels: usize, rng: &mut fastrand::Rng) -> Result<SyncSignal> {
    let samples = spec.sample_count()?;

    // Linearly spaced base frequencies, kept well under Nyquist
    let nyquist = spec.sampling_rate / 2.0;
    let frequencies: Vec<f64> = (0..channels)
        .map(|c| nyquist * 0.05 * (1.0 + c as f64) / channels.max(1) as f64)
        .collect();

    let mut data = Array2::<f64>::zeros((channels, samples));
    for (c, mut row) in data.outer_iter_mut().enumerate() {
        let freq = frequencies[c];
        for (i, value) in row.iter_mut().enumerate() {
            let t = spec.start + i as f64 / spec.sampling_rate;
            let amplitude = 0.5 + 0.3 * (2.0 * PI * 0.1 * freq * t).sin();
            *value = amplitude * (2.0 * PI * freq * t).sin() + 0.01 * (rng.f64() - 0.5);
        }
    }

    SyncSignal::new(spec.sampling_rate, spec.start, data)
}

/// A recording site with one channel per component.
///
/// Tags are `<site>_<component>` for each channel plus `<site>` for the whole
/// group. Runs are joined, so overlapping specs are rejected.
pub fn synthetic_site(
    site: &str,
    components: &[&str],
    runs: &[RunSpec],
    rng: &mut fastrand::Rng,
) -> Result<SignalSet> {
    let channels = components.len();
    let mut entries: Vec<(String, Vec<usize>)> = components
        .iter()
        .enumerate()
        .map(|(i, c)| (format!("{}_{}", site, c), vec![i]))
        .collect();
    entries.push((site.to_string(), (0..channels).collect()));
    let tags = Tags::new(channels, entries)?;

    let mut specs = runs.iter();
    let Some(first) = specs.next() else {
        return Err(Error::InvalidSignal(format!("site '{}' has no runs", site)));
    };

    let mut set = SignalSet::new(tags.clone(), [synthetic_run(*first, channels, rng)?])?;
    for spec in specs {
        let run = SignalSet::new(tags.clone(), [synthetic_run(*spec, channels, rng)?])?;
        set = set.join(&run)?;
    }
    Ok(set)
}

use std::fmt;
use std::sync::Arc;

use ndarray::{s, Array2, ArrayView1};
use serde_json::Value;

use crate::error::{Error, Result};

/// Fraction of one sample period below which two instants are treated as equal.
/// Must stay above the f64 resolution of epoch timestamps (about 0.2 µs).
pub const TIME_TOLERANCE: f64 = 1e-2;

/// Relative tolerance when comparing sampling rates
pub(crate) const RATE_TOLERANCE: f64 = 1e-9;

/// Whether two sampling rates are equal within `RATE_TOLERANCE`
pub(crate) fn rates_match(a: f64, b: f64) -> bool {
    let scale = a.abs().max(b.abs());
    (a - b).abs() <= RATE_TOLERANCE * scale
}

/// One channel of a run: a row of a shared sample block, starting `offset`
/// samples into that row.
#[derive(Debug, Clone)]
struct Lane {
    block: Arc<Array2<f64>>,
    row: usize,
    offset: usize,
    calibration: Option<Arc<Value>>,
}

/// A homogeneously sampled multichannel block.
///
/// Every channel shares the sampling rate, start time and sample count. The
/// samples themselves live in reference-counted blocks: slicing in time or
/// selecting channels only adjusts offsets and row indices, so derived runs
/// alias the storage of the run that first allocated it.
#[derive(Debug, Clone)]
pub struct SyncSignal {
    sampling_rate: f64,
    start: f64,
    sample_count: usize,
    lanes: Vec<Lane>,
}

impl SyncSignal {
    /// Wrap a `(channels, samples)` block recorded at `sampling_rate` Hz,
    /// whose first sample was taken at `start` seconds.
    pub fn new(sampling_rate: f64, start: f64, samples: Array2<f64>) -> Result<Self> {
        Self::from_shared(sampling_rate, start, Arc::new(samples))
    }

    /// Same as [`SyncSignal::new`] for a block that is already shared
    pub fn from_shared(sampling_rate: f64, start: f64, samples: Arc<Array2<f64>>) -> Result<Self> {
        if !sampling_rate.is_finite() || sampling_rate <= 0.0 {
            return Err(Error::InvalidSignal(format!(
                "sampling rate must be positive, got {}",
                sampling_rate
            )));
        }
        if !start.is_finite() {
            return Err(Error::InvalidSignal(format!("start time must be finite, got {}", start)));
        }

        let (channels, sample_count) = samples.dim();
        if channels == 0 || sample_count == 0 {
            return Err(Error::InvalidSignal(format!(
                "sample block must hold at least one channel and one sample, got {}x{}",
                channels, sample_count
            )));
        }

        let lanes = (0..channels)
            .map(|row| Lane {
                block: samples.clone(),
                row,
                offset: 0,
                calibration: None,
            })
            .collect();

        Ok(Self {
            sampling_rate,
            start,
            sample_count,
            lanes,
        })
    }

    /// Attach opaque per-channel calibration metadata.
    ///
    /// The metadata travels with each channel through slicing, selection and
    /// concatenation but is never interpreted.
    pub fn with_calibration(mut self, calibration: Vec<Option<Value>>) -> Result<Self> {
        if calibration.len() != self.lanes.len() {
            return Err(Error::Shape(format!(
                "expected calibration for {} channels, got {}",
                self.lanes.len(),
                calibration.len()
            )));
        }
        for (lane, cal) in self.lanes.iter_mut().zip(calibration) {
            lane.calibration = cal.map(Arc::new);
        }
        Ok(self)
    }

    pub fn sampling_rate(&self) -> f64 {
        self.sampling_rate
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    /// Time of the last sample
    pub fn stop(&self) -> f64 {
        self.time_at(self.sample_count - 1)
    }

    /// Closed interval `[start, stop]`
    pub fn interval(&self) -> (f64, f64) {
        (self.start, self.stop())
    }

    pub fn duration(&self) -> f64 {
        self.stop() - self.start
    }

    pub fn period(&self) -> f64 {
        1.0 / self.sampling_rate
    }

    pub fn channel_count(&self) -> usize {
        self.lanes.len()
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Time of sample `index`
    pub fn time_at(&self, index: usize) -> f64 {
        self.start + index as f64 / self.sampling_rate
    }

    /// Samples of one channel, borrowed from the backing block
    pub fn channel(&self, channel: usize) -> Option<ArrayView1<'_, f64>> {
        self.lanes.get(channel).map(|lane| {
            lane.block
                .slice(s![lane.row, lane.offset..lane.offset + self.sample_count])
        })
    }

    pub fn calibration(&self, channel: usize) -> Option<&Value> {
        self.lanes.get(channel).and_then(|lane| lane.calibration.as_deref())
    }

    /// Copy the run into a contiguous `(channels, samples)` block
    pub fn to_array(&self) -> Array2<f64> {
        let mut out = Array2::<f64>::zeros((self.lanes.len(), self.sample_count));
        for (ch, mut row) in out.outer_iter_mut().enumerate() {
            if let Some(view) = self.channel(ch) {
                row.assign(&view);
            }
        }
        out
    }

    /// Whether any channel of `self` reads from the same block as `other`
    pub fn shares_storage_with(&self, other: &SyncSignal) -> bool {
        self.lanes
            .iter()
            .any(|a| other.lanes.iter().any(|b| Arc::ptr_eq(&a.block, &b.block)))
    }

    pub fn same_rate(&self, other: &SyncSignal) -> bool {
        rates_match(self.sampling_rate, other.sampling_rate)
    }

    /// Inclusive range of sample indices whose times fall in `[t0, t1]`
    fn index_window(&self, t0: f64, t1: f64) -> Option<(usize, usize)> {
        if !(t0 <= t1) {
            return None;
        }

        let last = (self.sample_count - 1) as f64;
        let lo = ((t0 - self.start) * self.sampling_rate - TIME_TOLERANCE)
            .ceil()
            .max(0.0);
        let hi = ((t1 - self.start) * self.sampling_rate + TIME_TOLERANCE)
            .floor()
            .min(last);

        if hi < lo {
            None
        } else {
            Some((lo as usize, hi as usize))
        }
    }

    /// `len` samples starting at sample `first`, sharing storage
    fn slice_samples(&self, first: usize, len: usize) -> SyncSignal {
        SyncSignal {
            sampling_rate: self.sampling_rate,
            start: self.time_at(first),
            sample_count: len,
            lanes: self
                .lanes
                .iter()
                .map(|lane| Lane {
                    offset: lane.offset + first,
                    ..lane.clone()
                })
                .collect(),
        }
    }

    /// The samples lying in `[t0, t1]`.
    ///
    /// No interpolation happens: the result starts at the first sample at or
    /// after `t0` and ends at the last one at or before `t1`. A window that
    /// catches fewer than two samples gives `None`.
    pub fn slice_time(&self, t0: f64, t1: f64) -> Option<SyncSignal> {
        let (first, last) = self.index_window(t0, t1)?;
        if last == first {
            return None;
        }
        Some(self.slice_samples(first, last - first + 1))
    }

    /// Remove the samples that [`SyncSignal::slice_time`] would return,
    /// keeping the leading and trailing remainders.
    ///
    /// When `slice_time` would give `None` nothing is removed, so the two
    /// operations always partition the run's samples.
    pub fn exclude_time(&self, t0: f64, t1: f64) -> Vec<SyncSignal> {
        let (first, last) = match self.index_window(t0, t1) {
            Some((first, last)) if last > first => (first, last),
            _ => return vec![self.clone()],
        };

        let mut remainders = Vec::with_capacity(2);
        if first > 0 {
            remainders.push(self.slice_samples(0, first));
        }
        if last + 1 < self.sample_count {
            remainders.push(self.slice_samples(last + 1, self.sample_count - last - 1));
        }
        remainders
    }

    /// Closed-interval overlap test; runs sharing an endpoint overlap
    pub fn overlaps(&self, other: &SyncSignal) -> bool {
        self.start <= other.stop() && other.start <= self.stop()
    }

    /// Overlapping, or at the same rate with at most one sample period between
    /// the end of one and the start of the other
    pub fn is_adjacent_or_overlapping(&self, other: &SyncSignal) -> bool {
        if self.overlaps(other) {
            return true;
        }
        if !self.same_rate(other) {
            return false;
        }
        let gap = (other.start - self.stop()).max(self.start - other.stop());
        gap <= self.period() * (1.0 + TIME_TOLERANCE)
    }

    /// Whether both sample grids line up at whole-sample offsets
    fn grid_aligned(&self, other: &SyncSignal) -> bool {
        let phase = (other.start - self.start) * self.sampling_rate;
        (phase - phase.round()).abs() <= TIME_TOLERANCE
    }

    /// Stack the channels of `other` after those of `self`.
    ///
    /// Both runs must be synchronous: same rate, same start, same length.
    pub fn concat_channels(&self, other: &SyncSignal) -> Result<SyncSignal> {
        if !self.same_rate(other) {
            return Err(Error::RateMismatch(self.sampling_rate, other.sampling_rate));
        }
        if self.sample_count != other.sample_count {
            return Err(Error::AlignmentMismatch(format!(
                "sample counts differ ({} vs {})",
                self.sample_count, other.sample_count
            )));
        }
        if (self.start - other.start).abs() > TIME_TOLERANCE * self.period() {
            return Err(Error::AlignmentMismatch(format!(
                "start times differ ({:.6} vs {:.6})",
                self.start, other.start
            )));
        }

        let mut lanes = self.lanes.clone();
        lanes.extend(other.lanes.iter().cloned());

        Ok(SyncSignal {
            sampling_rate: self.sampling_rate,
            start: self.start,
            sample_count: self.sample_count,
            lanes,
        })
    }

    /// Cut both runs to their common interval and stack their channels.
    ///
    /// Gives `None` when rates differ, intervals do not overlap, the sample
    /// grids are offset by a fraction of a sample, or the common interval
    /// holds fewer than two samples.
    pub fn intersect_channels(&self, other: &SyncSignal) -> Option<SyncSignal> {
        if !self.same_rate(other) || !self.overlaps(other) {
            return None;
        }
        if !self.grid_aligned(other) {
            tracing::trace!(
                "Sample grids offset: {:.6} vs {:.6} at {} Hz",
                self.start,
                other.start,
                self.sampling_rate
            );
            return None;
        }

        let lo = self.start.max(other.start);
        let hi = self.stop().min(other.stop());
        let left = self.slice_time(lo, hi)?;
        let right = other.slice_time(lo, hi)?;
        left.concat_channels(&right).ok()
    }

    /// Keep the channels at `indices`, in that order, sharing storage
    pub fn select_channels(&self, indices: &[usize]) -> Result<SyncSignal> {
        let lanes = indices
            .iter()
            .map(|&i| {
                self.lanes.get(i).cloned().ok_or_else(|| {
                    Error::Shape(format!(
                        "channel {} out of range for a {}-channel run",
                        i,
                        self.lanes.len()
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(SyncSignal {
            sampling_rate: self.sampling_rate,
            start: self.start,
            sample_count: self.sample_count,
            lanes,
        })
    }
}

impl fmt::Display for SyncSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Hz [{:.6}, {:.6}] ({} channels x {} samples)",
            self.sampling_rate,
            self.start,
            self.stop(),
            self.channel_count(),
            self.sample_count
        )
    }
}

use serde::Serialize;
use serde_json::json;

use crate::error::{Error, Result};
use crate::mask::RunMask;
use crate::signal::{rates_match, SyncSignal};
use crate::tags::Tags;

/// A tag registry bound to a sequence of runs over the same channels.
///
/// Runs are individually synchronous but need not share rate or span with
/// each other. Every operation returns a new set; the sample storage of the
/// runs is shared, not copied.
#[derive(Debug, Clone)]
pub struct SignalSet {
    tags: Tags,
    runs: Vec<SyncSignal>,
}

/// Timing summary of one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunInfo {
    pub sampling_rate: f64,
    pub start: f64,
    pub stop: f64,
    pub sample_count: usize,
}

impl SignalSet {
    /// Bind one or more runs to a tag registry.
    ///
    /// Every run must carry exactly `tags.channel_count()` channels.
    pub fn new(tags: Tags, runs: impl IntoIterator<Item = SyncSignal>) -> Result<Self> {
        let runs: Vec<SyncSignal> = runs.into_iter().collect();
        if runs.is_empty() {
            return Err(Error::InvalidSignal("a signal set needs at least one run".to_string()));
        }
        if let Some(run) = runs.iter().find(|r| r.channel_count() != tags.channel_count()) {
            return Err(Error::Shape(format!(
                "run has {} channels but the tags describe {}",
                run.channel_count(),
                tags.channel_count()
            )));
        }
        Ok(Self { tags, runs })
    }

    /// A set with tags but no runs, as produced by a merge with nothing in common
    pub fn empty(tags: Tags) -> Self {
        Self {
            tags,
            runs: Vec::new(),
        }
    }

    fn from_parts(tags: Tags, runs: Vec<SyncSignal>) -> Self {
        Self { tags, runs }
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn runs(&self) -> &[SyncSignal] {
        &self.runs
    }

    pub fn run(&self, index: usize) -> Option<&SyncSignal> {
        self.runs.get(index)
    }

    pub fn nb_runs(&self) -> usize {
        self.runs.len()
    }

    pub fn channel_count(&self) -> usize {
        self.tags.channel_count()
    }

    /// True when the set holds no runs
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn sampling_rates(&self) -> Vec<f64> {
        self.runs.iter().map(SyncSignal::sampling_rate).collect()
    }

    pub fn starts(&self) -> Vec<f64> {
        self.runs.iter().map(SyncSignal::start).collect()
    }

    pub fn stops(&self) -> Vec<f64> {
        self.runs.iter().map(SyncSignal::stop).collect()
    }

    pub fn intervals(&self) -> Vec<(f64, f64)> {
        self.runs.iter().map(SyncSignal::interval).collect()
    }

    /// Sample count of each run
    pub fn sizes(&self) -> Vec<usize> {
        self.runs.iter().map(SyncSignal::sample_count).collect()
    }

    /// Seconds covered by all runs together
    pub fn total_duration(&self) -> f64 {
        self.runs.iter().map(SyncSignal::duration).sum()
    }

    pub fn run_info(&self) -> Vec<RunInfo> {
        self.runs
            .iter()
            .map(|r| RunInfo {
                sampling_rate: r.sampling_rate(),
                start: r.start(),
                stop: r.stop(),
                sample_count: r.sample_count(),
            })
            .collect()
    }

    /// JSON summary of channels, tags and runs
    pub fn describe(&self) -> serde_json::Value {
        json!({
            "channel_count": self.channel_count(),
            "nb_runs": self.nb_runs(),
            "tags": self.tags.iter().map(|(n, i)| (n.to_string(), json!(i))).collect::<serde_json::Map<_, _>>(),
            "runs": self.run_info(),
        })
    }

    /// Concatenate the runs of two sets recorded over the same channels.
    ///
    /// Runs keep their boundaries and come out sorted by start time. Gaps are
    /// fine, overlaps are not.
    pub fn join(&self, other: &SignalSet) -> Result<SignalSet> {
        if self.tags != other.tags {
            let ours: Vec<&str> = self.tags.names().collect();
            let theirs: Vec<&str> = other.tags.names().collect();
            return Err(Error::TagMismatch(format!("{:?} vs {:?}", ours, theirs)));
        }

        let mut runs: Vec<SyncSignal> = self.runs.iter().chain(&other.runs).cloned().collect();
        runs.sort_by(|a, b| a.start().total_cmp(&b.start()));
        check_disjoint(&runs)?;

        tracing::debug!(
            "Joined {} + {} runs over {} channels",
            self.nb_runs(),
            other.nb_runs(),
            self.channel_count()
        );
        Ok(Self::from_parts(self.tags.clone(), runs))
    }

    /// Restrict every run to `[t0, t1]`, or with `exclude` cut that window out.
    ///
    /// Runs left with nothing are dropped; an interior exclusion splits a run
    /// in two, both kept in place.
    pub fn extract_t(&self, t0: f64, t1: f64, exclude: bool) -> SignalSet {
        let runs = if exclude {
            self.runs.iter().flat_map(|r| r.exclude_time(t0, t1)).collect()
        } else {
            self.runs.iter().filter_map(|r| r.slice_time(t0, t1)).collect()
        };
        Self::from_parts(self.tags.clone(), runs)
    }

    /// Keep the runs at the positions set in `mask`
    pub fn select_runs(&self, mask: &[bool]) -> Result<SignalSet> {
        if mask.len() != self.runs.len() {
            return Err(Error::Shape(format!(
                "mask has {} entries for {} runs",
                mask.len(),
                self.runs.len()
            )));
        }
        let runs = self
            .runs
            .iter()
            .zip(mask)
            .filter(|(_, keep)| **keep)
            .map(|(r, _)| r.clone())
            .collect();
        Ok(Self::from_parts(self.tags.clone(), runs))
    }

    /// Mask of the runs satisfying `predicate`
    pub fn mask_where(&self, predicate: impl Fn(&SyncSignal) -> bool) -> RunMask {
        self.runs.iter().map(predicate).collect()
    }

    /// Mask of the runs sampled at `sampling_rate`
    pub fn mask_rate(&self, sampling_rate: f64) -> RunMask {
        self.mask_where(|r| rates_match(r.sampling_rate(), sampling_rate))
    }

    /// Channels named by `tag`, with the registry re-derived on the new axis
    pub fn get(&self, tag: &str) -> Result<SignalSet> {
        let indices = self.tags.lookup(tag)?.to_vec();
        self.select_channels(&indices)
    }

    /// Union of the channels named by `tags`, kept in their original order.
    ///
    /// The registry is restricted to the union of channels, as in
    /// [`select_channels`](Self::select_channels): every tag whose channels
    /// all lie in that union survives, including tags not named in `tags`.
    /// Asking for `E_1` and `B_3` also keeps a tag covering exactly those two.
    pub fn get_many(&self, tags: &[&str]) -> Result<SignalSet> {
        let mut indices = Vec::new();
        for tag in tags {
            indices.extend_from_slice(self.tags.lookup(tag)?);
        }
        indices.sort_unstable();
        indices.dedup();
        self.select_channels(&indices)
    }

    /// Channels at `indices`, in that order.
    ///
    /// Tags whose channels all survive are kept and renumbered; the others
    /// are dropped.
    pub fn select_channels(&self, indices: &[usize]) -> Result<SignalSet> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.channel_count()) {
            return Err(Error::Shape(format!(
                "channel {} out of range for {} channels",
                bad,
                self.channel_count()
            )));
        }

        let runs = self
            .runs
            .iter()
            .map(|r| r.select_channels(indices))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_parts(self.tags.restrict(indices), runs))
    }

    /// Synchronous intersection of two sets.
    ///
    /// Each pair of runs sharing a sampling rate and an overlapping interval
    /// yields one run carrying the channels of both, cut to the common
    /// interval. The channels of `other` follow those of `self`. When no pair
    /// matches the result has zero runs, which is not an error.
    pub fn merge(&self, other: &SignalSet) -> Result<SignalSet> {
        let tags = self.tags.union(&other.tags.remap(self.channel_count()))?;

        let mut runs: Vec<SyncSignal> = self
            .runs
            .iter()
            .flat_map(|a| other.runs.iter().filter_map(move |b| a.intersect_channels(b)))
            .collect();
        runs.sort_by(|a, b| a.start().total_cmp(&b.start()));

        tracing::debug!(
            "Merged {}x{} runs into {} synchronous runs over {} channels",
            self.nb_runs(),
            other.nb_runs(),
            runs.len(),
            tags.channel_count()
        );
        Ok(Self::from_parts(tags, runs))
    }
}

/// Fail on the first pair of overlapping runs in a start-sorted sequence
fn check_disjoint(runs: &[SyncSignal]) -> Result<()> {
    for pair in runs.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        if prev.overlaps(next) {
            return Err(Error::Overlap {
                first_start: prev.start(),
                first_stop: prev.stop(),
                second_start: next.start(),
                second_stop: next.stop(),
            });
        }
    }
    Ok(())
}

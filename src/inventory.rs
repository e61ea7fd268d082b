use std::collections::BTreeSet;

use crate::error::Result;
use crate::signal_set::SignalSet;
use crate::tags::wildcard;

/// Unordered collection of signal sets, possibly with unrelated vocabularies.
///
/// Typically one set per recording site. The inventory searches the sets by
/// tag and packs them into a single synchronous set.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    sets: Vec<SignalSet>,
}

impl Inventory {
    pub fn new(sets: impl IntoIterator<Item = SignalSet>) -> Self {
        Self {
            sets: sets.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn sets(&self) -> &[SignalSet] {
        &self.sets
    }

    pub fn iter(&self) -> impl Iterator<Item = &SignalSet> {
        self.sets.iter()
    }

    /// Every tag name defined by any member
    pub fn tags(&self) -> BTreeSet<String> {
        self.sets
            .iter()
            .flat_map(|s| s.tags().names().map(str::to_string))
            .collect()
    }

    /// Members defining at least one of `names`, each cut down to the channels
    /// those names cover. Members defining none of them are left out.
    pub fn select_channels(&self, names: &[&str]) -> Result<Inventory> {
        let mut selected = Vec::new();
        for set in &self.sets {
            let present: Vec<&str> = names
                .iter()
                .copied()
                .filter(|n| set.tags().contains(n))
                .collect();
            if present.is_empty() {
                continue;
            }
            selected.push(set.get_many(&present)?);
        }

        tracing::debug!(
            "Selected {} of {} signal sets for {:?}",
            selected.len(),
            self.sets.len(),
            names
        );
        Ok(Inventory { sets: selected })
    }

    /// [`Inventory::select_channels`] over every tag name matching a shell
    /// wildcard
    pub fn filter(&self, pattern: &str) -> Result<Inventory> {
        let matcher = wildcard(pattern)?;
        let tags = self.tags();
        let names: Vec<&str> = tags
            .iter()
            .map(String::as_str)
            .filter(|n| matcher.is_match(n))
            .collect();
        self.select_channels(&names)
    }

    /// Fuse every member into one synchronous set.
    ///
    /// Members sharing an identical registry are the same channels split over
    /// several files, so they are joined first. The resulting groups are then
    /// merged in turn: a run survives only where every group has data at a
    /// common sampling rate. `None` means no such instant exists.
    pub fn pack(&self) -> Result<Option<SignalSet>> {
        let mut groups: Vec<SignalSet> = Vec::new();
        for set in &self.sets {
            match groups.iter_mut().find(|g| g.tags() == set.tags()) {
                Some(group) => *group = group.join(set)?,
                None => groups.push(set.clone()),
            }
        }

        let mut remaining = groups.into_iter();
        let Some(mut packed) = remaining.next() else {
            return Ok(None);
        };
        for group in remaining {
            packed = packed.merge(&group)?;
        }

        if packed.is_empty() {
            tracing::warn!(
                "No common synchronous run across {} signal sets ({} channels)",
                self.sets.len(),
                packed.channel_count()
            );
            return Ok(None);
        }

        tracing::debug!(
            "Packed {} signal sets into {} runs over {} channels",
            self.sets.len(),
            packed.nb_runs(),
            packed.channel_count()
        );
        Ok(Some(packed))
    }
}

impl FromIterator<SignalSet> for Inventory {
    fn from_iter<T: IntoIterator<Item = SignalSet>>(iter: T) -> Self {
        Self::new(iter)
    }
}

impl<'a> IntoIterator for &'a Inventory {
    type Item = &'a SignalSet;
    type IntoIter = std::slice::Iter<'a, SignalSet>;

    fn into_iter(self) -> Self::IntoIter {
        self.sets.iter()
    }
}

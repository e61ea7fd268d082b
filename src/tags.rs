use regex::Regex;
use serde::Serialize;

use crate::error::{Error, Result};

/// Ordered registry mapping tag names to groups of channel indices.
///
/// A tag can alias a single channel or any subset of channels, contiguous or
/// not, and several tags may share indices. Registries are never modified in
/// place: filtering, remapping and unions build new values.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Tags {
    channel_count: usize,
    entries: Vec<(String, Vec<usize>)>,
}

impl Tags {
    /// Build a registry over `channel_count` channels.
    ///
    /// Every index must lie in `[0, channel_count)`. Repeating a name with the
    /// same indices is tolerated, repeating it with different ones is a
    /// [`Error::TagCollision`].
    pub fn new<S, I>(channel_count: usize, entries: impl IntoIterator<Item = (S, I)>) -> Result<Self>
    where
        S: Into<String>,
        I: IntoIterator<Item = usize>,
    {
        let mut tags = Self::empty(channel_count);
        for (name, indices) in entries {
            let name = name.into();
            let indices: Vec<usize> = indices.into_iter().collect();

            if let Some(&bad) = indices.iter().find(|&&i| i >= channel_count) {
                return Err(Error::Shape(format!(
                    "tag '{}' references channel {} but only {} channels exist",
                    name, bad, channel_count
                )));
            }

            tags.insert(name, indices)?;
        }
        Ok(tags)
    }

    /// Registry with no names over `channel_count` channels
    pub fn empty(channel_count: usize) -> Self {
        Self {
            channel_count,
            entries: Vec::new(),
        }
    }

    /// One tag per channel, named `<prefix><index>`
    pub fn enumerate(channel_count: usize, prefix: &str) -> Self {
        Self {
            channel_count,
            entries: (0..channel_count)
                .map(|i| (format!("{}{}", prefix, i), vec![i]))
                .collect(),
        }
    }

    fn insert(&mut self, name: String, indices: Vec<usize>) -> Result<()> {
        match self.entries.iter().find(|(existing, _)| *existing == name) {
            Some((_, existing)) if *existing == indices => Ok(()),
            Some((_, existing)) => Err(Error::TagCollision {
                name,
                left: existing.clone(),
                right: indices,
            }),
            None => {
                self.entries.push((name, indices));
                Ok(())
            }
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// Number of tag names
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Tag names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[usize])> {
        self.entries.iter().map(|(n, i)| (n.as_str(), i.as_slice()))
    }

    /// Channel indices bound to `name`
    pub fn lookup(&self, name: &str) -> Result<&[usize]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, indices)| indices.as_slice())
            .ok_or_else(|| Error::UnknownTag(name.to_string()))
    }

    /// Keep only the names matching a shell-style wildcard (`*`, `?`, `[...]`).
    ///
    /// A pattern matching nothing gives an empty registry over the same
    /// channel axis.
    pub fn filter(&self, pattern: &str) -> Result<Self> {
        let matcher = wildcard(pattern)?;
        Ok(Self {
            channel_count: self.channel_count,
            entries: self
                .entries
                .iter()
                .filter(|(n, _)| matcher.is_match(n))
                .cloned()
                .collect(),
        })
    }

    /// Shift every index by `offset`, growing the channel axis accordingly.
    ///
    /// Used to place a registry after `offset` channels of another block.
    pub fn remap(&self, offset: usize) -> Self {
        Self {
            channel_count: self.channel_count + offset,
            entries: self
                .entries
                .iter()
                .map(|(n, indices)| (n.clone(), indices.iter().map(|i| i + offset).collect()))
                .collect(),
        }
    }

    /// Merge two registries over a shared channel axis.
    ///
    /// The caller is responsible for remapping `other` so that the index
    /// spaces line up; names present in both must agree on their indices.
    pub fn union(&self, other: &Self) -> Result<Self> {
        let mut merged = self.clone();
        merged.channel_count = self.channel_count.max(other.channel_count);
        for (name, indices) in &other.entries {
            merged.insert(name.clone(), indices.clone())?;
        }
        Ok(merged)
    }

    /// Re-derive the registry on a new channel axis made of `indices`.
    ///
    /// Position `k` of the new axis is old channel `indices[k]`. Only tags
    /// whose channels all survive are kept, renumbered to the new positions.
    pub fn restrict(&self, indices: &[usize]) -> Self {
        let position = |old: usize| indices.iter().position(|&i| i == old);

        let entries = self
            .entries
            .iter()
            .filter_map(|(name, tag_indices)| {
                tag_indices
                    .iter()
                    .map(|&i| position(i))
                    .collect::<Option<Vec<usize>>>()
                    .map(|renumbered| (name.clone(), renumbered))
            })
            .collect();

        Self {
            channel_count: indices.len(),
            entries,
        }
    }
}

/// Two registries are equal when they define the same names over the same
/// indices; registration order does not matter.
impl PartialEq for Tags {
    fn eq(&self, other: &Self) -> bool {
        self.channel_count == other.channel_count
            && self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .all(|(name, indices)| other.lookup(name).is_ok_and(|o| o == indices.as_slice()))
    }
}

/// Compile a shell wildcard into an anchored regular expression
pub fn wildcard(pattern: &str) -> Result<Regex> {
    let mut expr = String::with_capacity(pattern.len() + 8);
    expr.push('^');

    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            '[' => {
                let mut class = String::new();
                let mut closed = false;
                if chars.peek() == Some(&'!') {
                    chars.next();
                    class.push('^');
                }
                for inner in chars.by_ref() {
                    if inner == ']' {
                        closed = true;
                        break;
                    }
                    if inner == '\\' || inner == '[' || inner == '^' {
                        class.push('\\');
                    }
                    class.push(inner);
                }
                if !closed {
                    return Err(Error::InvalidPattern(pattern.to_string()));
                }
                expr.push('[');
                expr.push_str(&class);
                expr.push(']');
            }
            other => expr.push_str(&regex::escape(&other.to_string())),
        }
    }
    expr.push('$');

    Regex::new(&expr).map_err(|_| Error::InvalidPattern(pattern.to_string()))
}

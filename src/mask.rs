use std::ops::Deref;

/// Boolean selection over the runs of a signal set, by position
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunMask(Vec<bool>);

impl RunMask {
    pub fn new(bits: Vec<bool>) -> Self {
        Self(bits)
    }

    /// Mask of `len` runs, all set to `value`
    pub fn filled(len: usize, value: bool) -> Self {
        Self(vec![value; len])
    }

    /// Everything the mask leaves out
    pub fn negate(&self) -> Self {
        Self(self.0.iter().map(|b| !b).collect())
    }

    /// Element-wise conjunction; the shorter mask bounds the result
    pub fn and(&self, other: &RunMask) -> Self {
        Self(self.0.iter().zip(&other.0).map(|(a, b)| *a && *b).collect())
    }

    /// Element-wise disjunction; the shorter mask bounds the result
    pub fn or(&self, other: &RunMask) -> Self {
        Self(self.0.iter().zip(&other.0).map(|(a, b)| *a || *b).collect())
    }

    /// Number of selected runs
    pub fn count(&self) -> usize {
        self.0.iter().filter(|b| **b).count()
    }

    pub fn into_inner(self) -> Vec<bool> {
        self.0
    }
}

impl Deref for RunMask {
    type Target = [bool];

    fn deref(&self) -> &[bool] {
        &self.0
    }
}

impl From<Vec<bool>> for RunMask {
    fn from(bits: Vec<bool>) -> Self {
        Self(bits)
    }
}

impl FromIterator<bool> for RunMask {
    fn from_iter<T: IntoIterator<Item = bool>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

//! Error types for the signal algebra

use thiserror::Error;

/// Result type for every fallible algebra operation
pub type Result<T> = std::result::Result<T, Error>;

/// Failures reported by tag registries, runs, signal sets and inventories.
///
/// None of these leave a value in an inconsistent state: every operation works
/// on immutable inputs and only builds its output once all checks pass.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// `join` operands carry different tag vocabularies
    #[error("Tag mismatch: {0}")]
    TagMismatch(String),

    /// `join` would combine runs whose intervals overlap
    #[error("Overlapping runs: [{first_start:.6}, {first_stop:.6}] and [{second_start:.6}, {second_stop:.6}]")]
    Overlap {
        first_start: f64,
        first_stop: f64,
        second_start: f64,
        second_stop: f64,
    },

    /// Channel concatenation between runs sampled at different rates
    #[error("Sampling rate mismatch: {0} Hz vs {1} Hz")]
    RateMismatch(f64, f64),

    /// Channel concatenation between runs with different start or length
    #[error("Alignment mismatch: {0}")]
    AlignmentMismatch(String),

    /// A mask or index argument has the wrong length or range
    #[error("Shape error: {0}")]
    Shape(String),

    /// The requested tag is not defined in the registry
    #[error("Unknown tag: {0}")]
    UnknownTag(String),

    /// Two registries define the same name with different channel indices
    #[error("Tag collision on '{name}': {left:?} vs {right:?}")]
    TagCollision {
        name: String,
        left: Vec<usize>,
        right: Vec<usize>,
    },

    /// Raw samples or metadata that cannot form a run
    #[error("Invalid signal: {0}")]
    InvalidSignal(String),

    /// A wildcard pattern that cannot be compiled
    #[error("Invalid tag pattern '{0}'")]
    InvalidPattern(String),
}

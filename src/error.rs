use thiserror::Error;

/// Errors raised by the k-mer and motif routines. Every variant is returned at the point of
/// violation; nothing is coerced or truncated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A byte outside the alphabet in use.
    #[error("invalid symbol {symbol:?} at position {position}")]
    InvalidSymbol { symbol: char, position: usize },

    /// Hamming distance between operands of different length.
    #[error("length mismatch: {left} != {right}")]
    LengthMismatch { left: usize, right: usize },

    /// Clump window shorter than `k` or longer than the sequence.
    #[error("invalid window of length {window} for k = {k} over a sequence of length {len}")]
    InvalidWindow { window: usize, k: usize, len: usize },

    /// The number does not fit in a pattern of `k` symbols.
    #[error("{number} cannot be decoded into a pattern of length {k}")]
    InvalidLength { number: u64, k: usize },

    /// Empty strand collection, zero `k`, strands shorter than `k`, or out-of-range parameters.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Profile-based searches need every strand to have the same length.
    #[error("strand {index} has length {found}, expected {expected}")]
    UnequalStrandLength {
        index: usize,
        expected: usize,
        found: usize,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

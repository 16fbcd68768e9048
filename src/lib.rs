//! Algorithms from the first two chapters of *Bioinformatics Algorithms*: k-mer counting,
//! clump finding and skew over a single genome (`ch1`), and motif finding over a collection of
//! strands (`ch2`).

pub mod ch1;
pub mod ch2;
mod error;

pub use error::{Error, Result};

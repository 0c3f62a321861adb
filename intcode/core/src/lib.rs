//! Intcode interpreter core.
//!
//! An [`Engine`] executes a program of arbitrary-precision signed words against
//! its own growable memory. Input instructions suspend the engine when its queue is empty, so a
//! caller can feed values one at a time and resume. A [`Pipeline`] chains
//! several engines over one shared [`Program`], optionally routing the last
//! engine's output back into the first.

use std::ops::Deref;
use std::sync::Arc;

use num_bigint::BigInt;

pub mod config;
pub mod decode;
pub mod engine;
pub mod error;
pub mod memory;
pub mod pipeline;
pub mod state;

pub use config::EngineConfig;
pub use decode::{decode, Instruction, Opcode, ParamMode};
pub use engine::Engine;
pub use error::{Fault, PipelineError, Result};
pub use memory::Memory;
pub use pipeline::{Pipeline, Topology};
pub use state::{Registers, Status};

/// Machine word. Unbounded signed integer; arithmetic never wraps or overflows.
pub type Word = BigInt;

/// Immutable program image shared between engines.
///
/// Cloning is cheap: every clone points at the same words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program(Arc<[Word]>);

impl Program {
    pub fn new(words: impl Into<Arc<[Word]>>) -> Self {
        Self(words.into())
    }

    pub fn words(&self) -> &[Word] {
        &self.0
    }
}

impl Deref for Program {
    type Target = [Word];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Word>> for Program {
    fn from(words: Vec<Word>) -> Self {
        Self::new(words)
    }
}

impl From<&[Word]> for Program {
    fn from(words: &[Word]) -> Self {
        Self::new(words)
    }
}

impl<const N: usize> From<[Word; N]> for Program {
    fn from(words: [Word; N]) -> Self {
        Self::new(words.to_vec())
    }
}

impl From<&[i64]> for Program {
    fn from(words: &[i64]) -> Self {
        words.iter().copied().map(Word::from).collect()
    }
}

impl<const N: usize> From<[i64; N]> for Program {
    fn from(words: [i64; N]) -> Self {
        Self::from(&words[..])
    }
}

impl FromIterator<Word> for Program {
    fn from_iter<I: IntoIterator<Item = Word>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect::<Vec<_>>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_words() {
        let program = Program::from([1i64, 0, 0, 0, 99]);
        let copy = program.clone();
        assert!(Arc::ptr_eq(&program.0, &copy.0));
        assert_eq!(copy.len(), 5);
        assert_eq!(copy[4], Word::from(99));
    }

    #[test]
    fn small_and_big_sources_agree() {
        let small: &[i64] = &[104, -7, 99];
        let big: Vec<Word> = small.iter().copied().map(Word::from).collect();
        assert_eq!(Program::from(small), Program::from(big));
    }
}

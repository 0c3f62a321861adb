use thiserror::Error;

use crate::Word;

pub type Result<T> = std::result::Result<T, Fault>;

/// Fatal execution faults. A fault aborts the current `run` and is never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("unknown opcode {opcode} at address {address}")]
    UnknownOpcode { opcode: Word, address: usize },
    #[error("unknown parameter mode {digit} at address {address}")]
    UnknownMode { digit: u32, address: usize },
    #[error("invalid memory address {address}")]
    InvalidAddress { address: Word },
    #[error("memory address {address} exceeds the {limit}-cell limit")]
    AddressOutOfRange { address: Word, limit: usize },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("stage {stage} faulted: {source}")]
    Fault {
        stage: usize,
        #[source]
        source: Fault,
    },
    #[error("stage {stage} produced no signal to forward")]
    NoSignal { stage: usize },
    #[error("pipeline has {stages} stages but {phases} phase settings were given")]
    PhaseCountMismatch { stages: usize, phases: usize },
}

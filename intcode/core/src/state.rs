use std::fmt;

use serde::Serialize;

use crate::Word;

/// Execution status of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    Running,
    /// Suspended at an Input instruction with an empty queue. Resumable.
    AwaitingInput,
    /// Reached Halt. Terminal until reset.
    Halted,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Running => "running",
            Status::AwaitingInput => "awaiting-input",
            Status::Halted => "halted",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine registers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Registers {
    pub ip: usize,
    pub relative_base: Word,
}

impl Registers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cell index `offset` words past the instruction pointer.
    pub fn operand_index(&self, offset: usize) -> usize {
        self.ip + offset
    }
}

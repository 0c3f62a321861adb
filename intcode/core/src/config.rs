use serde::{Deserialize, Serialize};

use crate::decode::ParamMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Mode applied to operands whose mode digit is absent from the instruction word.
    /// `Immediate` reproduces the legacy interpreter; destinations still resolve as
    /// addresses either way.
    pub missing_mode: ParamMode,
    /// Optional cap on memory cells. Accesses at or above it fault. `None` leaves
    /// memory unbounded.
    pub memory_limit: Option<usize>,
}

impl EngineConfig {
    pub fn legacy() -> Self {
        Self {
            missing_mode: ParamMode::Immediate,
            ..Self::default()
        }
    }

    pub fn with_missing_mode(mut self, mode: ParamMode) -> Self {
        self.missing_mode = mode;
        self
    }

    pub fn with_memory_limit(mut self, limit: usize) -> Self {
        self.memory_limit = Some(limit);
        self
    }
}

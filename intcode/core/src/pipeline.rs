//! Chains of engines sharing one program.
//!
//! Each stage is seeded with a phase value, then signals are passed from stage
//! to stage. In a feedback pipeline the last stage's output wraps around to the
//! first stage and the round-robin continues until every stage has halted.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::error::PipelineError;
use crate::{Program, Word};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topology {
    /// One pass from the first stage to the last.
    Serial,
    /// Round-robin with the last stage feeding the first, until all halt.
    #[default]
    Feedback,
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    stages: Vec<Engine>,
    topology: Topology,
}

impl Pipeline {
    pub fn new(program: impl Into<Program>, stages: usize, config: EngineConfig) -> Self {
        let program = program.into();
        let stages = (0..stages)
            .map(|_| Engine::with_config(program.clone(), config))
            .collect();
        Self {
            stages,
            topology: Topology::Feedback,
        }
    }

    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn stages(&self) -> &[Engine] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn all_halted(&self) -> bool {
        self.stages.iter().all(Engine::is_halted)
    }

    /// Reset every stage, seed phases, and drive `signal` through the chain.
    ///
    /// Returns the last signal emitted by the final stage.
    pub fn run(&mut self, phases: &[Word], signal: Word) -> Result<Word, PipelineError> {
        if phases.len() != self.stages.len() {
            return Err(PipelineError::PhaseCountMismatch {
                stages: self.stages.len(),
                phases: phases.len(),
            });
        }
        for (engine, phase) in self.stages.iter_mut().zip(phases) {
            engine.reset();
            engine.push_input(phase.clone());
        }
        debug!(?phases, %signal, topology = ?self.topology, "pipeline start");

        let mut signal = signal;
        let mut pass = 0usize;
        loop {
            for stage in 0..self.stages.len() {
                signal = self.forward(stage, signal)?;
            }
            pass += 1;
            debug!(pass, %signal, "pipeline pass complete");

            if self.topology == Topology::Serial || self.all_halted() {
                break;
            }
        }
        Ok(signal)
    }

    /// Run one stage with `signal` and return the value it hands on.
    fn forward(&mut self, stage: usize, signal: Word) -> Result<Word, PipelineError> {
        let engine = &mut self.stages[stage];
        if engine.is_halted() {
            return engine
                .last_output()
                .cloned()
                .ok_or(PipelineError::NoSignal { stage });
        }

        let produced = engine
            .run([signal])
            .map_err(|source| PipelineError::Fault { stage, source })?;
        match produced {
            Some(value) => Ok(value),
            // A stage that halted without new output re-emits its last value.
            None if engine.is_halted() => engine
                .last_output()
                .cloned()
                .ok_or(PipelineError::NoSignal { stage }),
            None => Err(PipelineError::NoSignal { stage }),
        }
    }
}

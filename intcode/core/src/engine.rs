//! Fetch/decode/execute loop and the suspend/resume protocol.
//!
//! `run` drives the engine until it either halts or reaches an Input
//! instruction with nothing queued. In the second case the instruction pointer
//! stays on the Input instruction, so the next `run` retries it with the newly
//! supplied values.

use std::collections::VecDeque;

use num_traits::Zero;
use tracing::{debug, trace, warn};

use crate::config::EngineConfig;
use crate::decode::{decode, Instruction, Opcode, ParamMode};
use crate::error::Result;
use crate::memory::Memory;
use crate::state::{Registers, Status};
use crate::{Program, Word};

#[derive(Debug, Clone)]
pub struct Engine {
    program: Program,
    config: EngineConfig,
    memory: Memory,
    regs: Registers,
    status: Status,
    inputs: VecDeque<Word>,
    outputs: Vec<Word>,
    steps: u64,
}

impl Engine {
    pub fn new(program: impl Into<Program>) -> Self {
        Self::with_config(program, EngineConfig::default())
    }

    pub fn with_config(program: impl Into<Program>, config: EngineConfig) -> Self {
        let program = program.into();
        let memory = Memory::from_program(&program, config.memory_limit);
        Self {
            program,
            config,
            memory,
            regs: Registers::new(),
            status: Status::Running,
            inputs: VecDeque::new(),
            outputs: Vec::new(),
            steps: 0,
        }
    }

    /// Reinitialise memory, registers, queues and status from the program.
    pub fn reset(&mut self) {
        self.memory.load(&self.program);
        self.regs = Registers::new();
        self.status = Status::Running;
        self.inputs.clear();
        self.outputs.clear();
        self.steps = 0;
        debug!(words = self.program.len(), "engine reset");
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_halted(&self) -> bool {
        self.status == Status::Halted
    }

    pub fn is_awaiting_input(&self) -> bool {
        self.status == Status::AwaitingInput
    }

    pub fn registers(&self) -> &Registers {
        &self.regs
    }

    pub fn instruction_pointer(&self) -> usize {
        self.regs.ip
    }

    pub fn relative_base(&self) -> &Word {
        &self.regs.relative_base
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Instructions completed since construction or the last reset.
    pub fn steps_executed(&self) -> u64 {
        self.steps
    }

    pub fn push_input(&mut self, value: Word) {
        self.inputs.push_back(value);
    }

    pub fn extend_input(&mut self, values: impl IntoIterator<Item = Word>) {
        self.inputs.extend(values);
    }

    pub fn pending_inputs(&self) -> &VecDeque<Word> {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Word] {
        &self.outputs
    }

    pub fn last_output(&self) -> Option<&Word> {
        self.outputs.last()
    }

    /// Remove and return the newest output.
    pub fn pop_output(&mut self) -> Option<Word> {
        self.outputs.pop()
    }

    pub fn take_outputs(&mut self) -> Vec<Word> {
        std::mem::take(&mut self.outputs)
    }

    /// Queue `inputs` and execute until the engine halts or waits for input.
    ///
    /// Returns the newest output produced during this call. A halted engine
    /// executes nothing, discards `inputs` and returns `None`.
    pub fn run(&mut self, inputs: impl IntoIterator<Item = Word>) -> Result<Option<Word>> {
        let mark = self.resume(inputs)?;
        Ok(self.outputs[mark..].last().cloned())
    }

    /// Like [`Engine::run`] but returns every output produced during this call.
    pub fn run_collect(&mut self, inputs: impl IntoIterator<Item = Word>) -> Result<Vec<Word>> {
        let mark = self.resume(inputs)?;
        Ok(self.outputs[mark..].to_vec())
    }

    fn resume(&mut self, inputs: impl IntoIterator<Item = Word>) -> Result<usize> {
        let mark = self.outputs.len();
        if self.is_halted() {
            debug!("run on halted engine ignored");
            return Ok(mark);
        }
        self.inputs.extend(inputs);
        self.status = Status::Running;

        while self.status == Status::Running {
            if let Err(fault) = self.step() {
                warn!(%fault, ip = self.regs.ip, "execution fault");
                return Err(fault);
            }
        }
        debug!(
            status = %self.status,
            ip = self.regs.ip,
            produced = self.outputs.len() - mark,
            "run stopped"
        );
        Ok(mark)
    }

    /// Execute a single instruction.
    ///
    /// Nothing is committed until every fallible access has succeeded, so a
    /// fault or an input suspension leaves the instruction pointer on this
    /// instruction.
    pub fn step(&mut self) -> Result<Status> {
        if self.is_halted() {
            return Ok(self.status);
        }

        let ip = self.regs.ip;
        let word = self.memory.read_at(ip)?;
        let instr = decode(&word, ip, self.config.missing_mode)?;
        trace!(ip, %word, op = instr.opcode.mnemonic(), rb = %self.regs.relative_base, "step");

        let mut next_ip = ip + instr.width();
        let result = match instr.opcode {
            Opcode::Add => Some(self.param(&instr, 0)? + self.param(&instr, 1)?),
            Opcode::Multiply => Some(self.param(&instr, 0)? * self.param(&instr, 1)?),
            Opcode::Input => match self.inputs.front() {
                Some(value) => Some(value.clone()),
                None => {
                    // Leave ip on this instruction; the next run retries it.
                    self.status = Status::AwaitingInput;
                    debug!(ip, "awaiting input");
                    return Ok(self.status);
                }
            },
            Opcode::Output => {
                let value = self.param(&instr, 0)?;
                self.outputs.push(value);
                None
            }
            Opcode::JumpIfTrue | Opcode::JumpIfFalse => {
                let cond = self.param(&instr, 0)?;
                let target = self.param(&instr, 1)?;
                if cond.is_zero() != (instr.opcode == Opcode::JumpIfTrue) {
                    next_ip = self.memory.address(&target)?;
                }
                None
            }
            Opcode::LessThan | Opcode::Equals => {
                let a = self.param(&instr, 0)?;
                let b = self.param(&instr, 1)?;
                let hit = if instr.opcode == Opcode::LessThan {
                    a < b
                } else {
                    a == b
                };
                Some(Word::from(u8::from(hit)))
            }
            Opcode::AdjustRelativeBase => {
                let delta = self.param(&instr, 0)?;
                self.regs.relative_base += delta;
                None
            }
            Opcode::Halt => {
                self.status = Status::Halted;
                debug!(ip, steps = self.steps + 1, "halted");
                None
            }
        };

        if let (Some(value), Some(dest)) = (result, instr.destination()) {
            self.store(&instr, dest, value)?;
            if instr.opcode == Opcode::Input {
                self.inputs.pop_front();
            }
        }

        self.regs.ip = next_ip;
        self.steps += 1;
        Ok(self.status)
    }

    /// Read operand `index` as a source value.
    fn param(&mut self, instr: &Instruction, index: usize) -> Result<Word> {
        let raw = self.memory.read_at(self.regs.operand_index(index + 1))?;
        match instr.mode(index) {
            ParamMode::Immediate => Ok(raw),
            ParamMode::Position => self.memory.read(&raw),
            ParamMode::Relative => {
                let addr = &self.regs.relative_base + raw;
                self.memory.read(&addr)
            }
        }
    }

    /// Write `value` through destination operand `index`.
    fn store(&mut self, instr: &Instruction, index: usize, value: Word) -> Result<()> {
        let raw = self.memory.read_at(self.regs.operand_index(index + 1))?;
        let addr = match instr.mode(index).for_destination() {
            ParamMode::Relative => &self.regs.relative_base + raw,
            _ => raw,
        };
        self.memory.write(&addr, value)
    }
}

//! Instruction word decoding.
//!
//! The low two decimal digits select the opcode. The remaining digits, read
//! least-significant first, give one parameter mode per operand.

use num_traits::{ToPrimitive, Zero};
use serde::{Deserialize, Serialize};

use crate::error::{Fault, Result};
use crate::Word;

/// How an operand's encoded value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamMode {
    /// Operand is an address to dereference.
    #[default]
    Position,
    /// Operand is the value itself.
    Immediate,
    /// Operand is an offset from the relative base to dereference.
    Relative,
}

impl ParamMode {
    pub fn from_digit(digit: u32) -> Option<Self> {
        match digit {
            0 => Some(Self::Position),
            1 => Some(Self::Immediate),
            2 => Some(Self::Relative),
            _ => None,
        }
    }

    /// Mode used when the operand is a write destination. Immediate destinations
    /// are written through their literal address.
    pub fn for_destination(self) -> Self {
        match self {
            Self::Immediate => Self::Position,
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Add,
    Multiply,
    Input,
    Output,
    JumpIfTrue,
    JumpIfFalse,
    LessThan,
    Equals,
    AdjustRelativeBase,
    Halt,
}

impl Opcode {
    pub fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            1 => Self::Add,
            2 => Self::Multiply,
            3 => Self::Input,
            4 => Self::Output,
            5 => Self::JumpIfTrue,
            6 => Self::JumpIfFalse,
            7 => Self::LessThan,
            8 => Self::Equals,
            9 => Self::AdjustRelativeBase,
            99 => Self::Halt,
            _ => return None,
        })
    }

    pub fn code(self) -> u32 {
        match self {
            Self::Add => 1,
            Self::Multiply => 2,
            Self::Input => 3,
            Self::Output => 4,
            Self::JumpIfTrue => 5,
            Self::JumpIfFalse => 6,
            Self::LessThan => 7,
            Self::Equals => 8,
            Self::AdjustRelativeBase => 9,
            Self::Halt => 99,
        }
    }

    /// Number of operands following the instruction word.
    pub fn arity(self) -> usize {
        match self {
            Self::Add | Self::Multiply | Self::LessThan | Self::Equals => 3,
            Self::JumpIfTrue | Self::JumpIfFalse => 2,
            Self::Input | Self::Output | Self::AdjustRelativeBase => 1,
            Self::Halt => 0,
        }
    }

    /// Whether the last operand is a write destination.
    pub fn writes(self) -> bool {
        matches!(
            self,
            Self::Add | Self::Multiply | Self::Input | Self::LessThan | Self::Equals
        )
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Multiply => "MUL",
            Self::Input => "IN",
            Self::Output => "OUT",
            Self::JumpIfTrue => "JNZ",
            Self::JumpIfFalse => "JZ",
            Self::LessThan => "LT",
            Self::Equals => "EQ",
            Self::AdjustRelativeBase => "ARB",
            Self::Halt => "HALT",
        }
    }
}

pub const MAX_OPERANDS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    /// Modes for operands `0..opcode.arity()`. Unused slots hold `Position`.
    pub modes: [ParamMode; MAX_OPERANDS],
}

impl Instruction {
    pub fn mode(&self, operand: usize) -> ParamMode {
        self.modes[operand]
    }

    /// Number of words the instruction occupies, including the instruction word.
    pub fn width(&self) -> usize {
        1 + self.opcode.arity()
    }

    /// Operand index written by this instruction, if any. Always the last operand.
    pub fn destination(&self) -> Option<usize> {
        self.opcode.writes().then(|| self.opcode.arity() - 1)
    }
}

/// Decode the instruction word found at `address`.
///
/// Mode digits that are absent from `word` take `missing`. An explicit `0`
/// digit is always `Position`. Digits above the opcode's arity are ignored.
pub fn decode(word: &Word, address: usize, missing: ParamMode) -> Result<Instruction> {
    // Remainders keep the dividend's sign, so negative words never match.
    let opcode = (word % 100u32)
        .to_u32()
        .and_then(Opcode::from_code)
        .ok_or_else(|| Fault::UnknownOpcode {
            opcode: word.clone(),
            address,
        })?;

    let mut modes = [ParamMode::Position; MAX_OPERANDS];
    let mut rest = word / 100u32;
    for slot in modes.iter_mut().take(opcode.arity()) {
        *slot = if rest.is_zero() {
            missing
        } else {
            let digit = (&rest % 10u32).to_u32().unwrap_or(u32::MAX);
            ParamMode::from_digit(digit).ok_or(Fault::UnknownMode { digit, address })?
        };
        rest /= 10u32;
    }

    Ok(Instruction { opcode, modes })
}

//! The nybble opcode vocabulary.
//!
//! Opcodes `0..=6` carry a one-nybble operand; the rest stand alone.

use std::fmt;

use crate::{
    error::{Error, Result},
    types::DeltaKind,
};

pub const OP_RESET: u8 = 0;
pub const OP_SET_AUTO_INCREMENT: u8 = 1;
pub const OP_SET_REPEAT: u8 = 2;
pub const OP_ADD_PPEM: u8 = 3;
pub const OP_ADD_POINT: u8 = 4;
pub const OP_SET_SHIFT: u8 = 5;
pub const OP_MISC: u8 = 6;
pub const OP_RESERVED: u8 = 7;
pub const OP_RTGAH: u8 = 14;
pub const OP_END: u8 = 15;

/// Whether `opcode` is followed by an operand nybble
pub const fn has_operand(opcode: u8) -> bool {
    opcode <= OP_MISC
}

/// A set of state fields: bit 0 ppem, bit 1 point, bit 2 shift.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Mask(u8);

impl Mask {
    pub const NONE: Self = Self(0);
    pub const PPEM: Self = Self(1);
    pub const POINT: Self = Self(2);
    pub const SHIFT: Self = Self(4);
    pub const ALL: Self = Self(7);

    pub fn new(bits: u8) -> Result<Self> {
        if bits > 7 {
            return Err(Error::InvariantViolation("mask has bits above 7"));
        }
        Ok(Self(bits))
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Mask) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn union(self, other: Mask) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn name(self) -> &'static str {
        match self.0 {
            0 => "nothing",
            1 => "ppem",
            2 => "point index",
            3 => "ppem and point index",
            4 => "shift",
            5 => "ppem and shift",
            6 => "point index and shift",
            _ => "ppem, point index, and shift",
        }
    }
}

impl fmt::Display for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Operands of the misc opcode (6)
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Misc {
    SetXAxis,
    SetYAxis,
    IncrementDeltaShift,
    DecrementDeltaShift,
    IncrementDeltaBase,
    DecrementDeltaBase,
    AddPpem32,
    AddPpem64,
    AddPoint32,
    AddPoint64,
    AddRepeat16,
    AddRepeat32,
    AddRepeat64,
}

impl Misc {
    pub const fn from_operand(operand: u8) -> Option<Self> {
        Some(match operand {
            0 => Misc::SetXAxis,
            1 => Misc::SetYAxis,
            2 => Misc::IncrementDeltaShift,
            3 => Misc::DecrementDeltaShift,
            4 => Misc::IncrementDeltaBase,
            5 => Misc::DecrementDeltaBase,
            6 => Misc::AddPpem32,
            7 => Misc::AddPpem64,
            8 => Misc::AddPoint32,
            9 => Misc::AddPoint64,
            10 => Misc::AddRepeat16,
            11 => Misc::AddRepeat32,
            12 => Misc::AddRepeat64,
            _ => return None,
        })
    }

    pub const fn operand(self) -> u8 {
        self as u8
    }

    pub const fn name(self) -> &'static str {
        match self {
            Misc::SetXAxis => "Set to x-axis",
            Misc::SetYAxis => "Set to y-axis",
            Misc::IncrementDeltaShift => "Increment SDS by 1",
            Misc::DecrementDeltaShift => "Decrement SDS by 1",
            Misc::IncrementDeltaBase => "Increment SDB by 48",
            Misc::DecrementDeltaBase => "Decrement SDB by 48",
            Misc::AddPpem32 => "Increment ppem by 32",
            Misc::AddPpem64 => "Increment ppem by 64",
            Misc::AddPoint32 => "Increment point by 32",
            Misc::AddPoint64 => "Increment point by 64",
            Misc::AddRepeat16 => "Increment repeat by 16",
            Misc::AddRepeat32 => "Increment repeat by 32",
            Misc::AddRepeat64 => "Increment repeat by 64",
        }
    }
}

/// One decoded opcode with its operand
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    Reset(Mask),
    SetAutoIncrement(Mask),
    /// Operand nybble; the repeat becomes `n + 1`.
    SetRepeat(u8),
    AddPpem(u8),
    AddPoint(u8),
    /// Grain nybble of the new shift
    SetShift(u8),
    Misc(Misc),
    Delta(DeltaKind),
    Rtgah,
    End,
}

impl Instruction {
    /// Decode the instruction at the start of `nybbles`, returning it and its width.
    pub fn read(nybbles: &[u8]) -> Result<(Self, usize)> {
        let &opcode = nybbles.first().ok_or(Error::TruncatedStream)?;
        if !has_operand(opcode) {
            let inst = match opcode {
                OP_RESERVED => return Err(Error::ReservedOpcode(opcode)),
                OP_RTGAH => Instruction::Rtgah,
                OP_END => Instruction::End,
                _ => DeltaKind::from_opcode(opcode)
                    .map(Instruction::Delta)
                    .ok_or(Error::ReservedOpcode(opcode))?,
            };
            return Ok((inst, 1));
        }
        let &operand = nybbles.get(1).ok_or(Error::TruncatedStream)?;
        if operand > 15 {
            return Err(Error::InvalidOperand { opcode, operand });
        }
        let mask = || Mask::new(operand).map_err(|_| Error::InvalidOperand { opcode, operand });
        let inst = match opcode {
            OP_RESET => Instruction::Reset(mask()?),
            OP_SET_AUTO_INCREMENT => Instruction::SetAutoIncrement(mask()?),
            OP_SET_REPEAT => Instruction::SetRepeat(operand),
            OP_ADD_PPEM => Instruction::AddPpem(operand),
            OP_ADD_POINT => Instruction::AddPoint(operand),
            OP_SET_SHIFT => Instruction::SetShift(operand),
            _ => Instruction::Misc(Misc::from_operand(operand).ok_or(Error::UnknownMisc(operand))?),
        };
        Ok((inst, 2))
    }

    pub const fn opcode(self) -> u8 {
        match self {
            Instruction::Reset(_) => OP_RESET,
            Instruction::SetAutoIncrement(_) => OP_SET_AUTO_INCREMENT,
            Instruction::SetRepeat(_) => OP_SET_REPEAT,
            Instruction::AddPpem(_) => OP_ADD_PPEM,
            Instruction::AddPoint(_) => OP_ADD_POINT,
            Instruction::SetShift(_) => OP_SET_SHIFT,
            Instruction::Misc(_) => OP_MISC,
            Instruction::Delta(kind) => kind.opcode(),
            Instruction::Rtgah => OP_RTGAH,
            Instruction::End => OP_END,
        }
    }

    pub const fn operand(self) -> Option<u8> {
        match self {
            Instruction::Reset(mask) | Instruction::SetAutoIncrement(mask) => Some(mask.bits()),
            Instruction::SetRepeat(n)
            | Instruction::AddPpem(n)
            | Instruction::AddPoint(n)
            | Instruction::SetShift(n) => Some(n),
            Instruction::Misc(misc) => Some(misc.operand()),
            Instruction::Delta(_) | Instruction::Rtgah | Instruction::End => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Instruction::Reset(mask) => write!(f, "Reset {mask}"),
            Instruction::SetAutoIncrement(mask) => write!(f, "Set auto-increment for {mask}"),
            Instruction::SetRepeat(n) => write!(f, "Set repeat to {}", u32::from(n) + 1),
            Instruction::AddPpem(n) => write!(f, "Increment ppem by {}", u32::from(n) + 1),
            Instruction::AddPoint(n) => write!(f, "Increment point by {}", u32::from(n) + 1),
            Instruction::SetShift(n) => write!(f, "Set shift to {n}"),
            Instruction::Misc(misc) => f.write_str(misc.name()),
            Instruction::Delta(kind) => f.write_str(kind.name()),
            Instruction::Rtgah => f.write_str("RTGAH"),
            Instruction::End => f.write_str("End of hints"),
        }
    }
}

//! Error types for hint compression, packing and Spark program parsing.

use std::{io, result};

use read_fonts::ReadError;

/// Errors that can occur while compressing or decompressing delta hints.
///
/// Every error is fatal to the glyph being processed; nothing partial is
/// handed back to the caller.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("delta shift out of range: {shift} is not representable in the delta-shift grid")]
    GranularityExhausted { shift: f64 },

    #[error("base PPEM {0} is below 9")]
    BasePpemTooLow(u32),

    #[error("prolog cannot hold {field} value {value}")]
    PrologOverflow { field: &'static str, value: f64 },

    #[error("invariant violated: {0}")]
    InvariantViolation(&'static str),

    #[error("no Huffman code for opcode {opcode} (operand {operand:?})")]
    MissingHuffmanCode { opcode: u8, operand: Option<u8> },

    #[error("nybble stream ended unexpectedly")]
    TruncatedStream,

    #[error("reserved opcode {0} in nybble stream")]
    ReservedOpcode(u8),

    #[error("value {0} does not fit in a nybble")]
    InvalidNybble(u8),

    #[error("prolog granularity {0} is above 6")]
    InvalidGranularity(u8),

    #[error("unknown misc operand {0}")]
    UnknownMisc(u8),

    #[error("operand {operand} is not valid for opcode {opcode}")]
    InvalidOperand { opcode: u8, operand: u8 },

    #[error("bit pattern matches no Huffman code")]
    InvalidCode,

    #[error("bad compressed hints header")]
    BadHeader,

    #[error("packed stream too long: {0} bytes")]
    StreamTooLong(usize),

    #[error("failed to read Spark hints: {0}")]
    Read(#[from] ReadError),

    #[error("bad Spark hints header")]
    BadSparkHeader,

    #[error("unknown Spark opcode 0x{opcode:02X} at offset {offset}")]
    UnknownSparkOpcode { opcode: u8, offset: usize },

    #[error("Spark opcode 0x{opcode:02X} has invalid operand {value}")]
    BadSparkOperand { opcode: u8, value: u32 },

    #[error("bit I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = result::Result<T, Error>;

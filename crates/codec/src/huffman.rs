//! The fixed fused Huffman code table.
//!
//! Opcodes with an operand are coded together with it; the other opcodes are
//! coded alone. Codes are prefix-free and at most 15 bits long.

use std::fmt;

use crate::{
    error::{Error, Result},
    opcode::{OP_END, has_operand},
    stream::NybbleStream,
};

/// A Huffman symbol: a bare opcode or an opcode fused with its operand
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FusedKey {
    Op(u8),
    OpArg(u8, u8),
}

impl FusedKey {
    pub fn new(opcode: u8, operand: Option<u8>) -> Self {
        match operand {
            Some(operand) => FusedKey::OpArg(opcode, operand),
            None => FusedKey::Op(opcode),
        }
    }

    pub const fn opcode(self) -> u8 {
        match self {
            FusedKey::Op(opcode) | FusedKey::OpArg(opcode, _) => opcode,
        }
    }

    pub const fn operand(self) -> Option<u8> {
        match self {
            FusedKey::Op(_) => None,
            FusedKey::OpArg(_, operand) => Some(operand),
        }
    }

    /// The nybbles this symbol stands for
    pub fn nybbles(self) -> impl Iterator<Item = u8> {
        std::iter::once(self.opcode()).chain(self.operand())
    }
}

impl fmt::Display for FusedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FusedKey::Op(opcode) => write!(f, "{opcode}"),
            FusedKey::OpArg(opcode, operand) => write!(f, "({opcode}, {operand})"),
        }
    }
}

/// A code of `len` bits, most significant bit first
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Code {
    pub bits: u16,
    pub len: u8,
}

impl Code {
    pub const fn new(bits: u16, len: u8) -> Self {
        Self { bits, len }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$b}", self.bits, width = usize::from(self.len))
    }
}

/// Longest code in [`FUSED_CODES`]
pub const MAX_CODE_LEN: u8 = 15;

use FusedKey::{Op, OpArg};

#[rustfmt::skip]
pub const FUSED_CODES: [(FusedKey, Code); 91] = [
    (OpArg(0, 1), Code::new(0b101100, 6)),
    (OpArg(0, 2), Code::new(0b11111, 5)),
    (OpArg(0, 3), Code::new(0b011011, 6)),

    (OpArg(1, 1), Code::new(0b1111010, 7)),
    (OpArg(1, 2), Code::new(0b011001, 6)),
    (OpArg(1, 3), Code::new(0b101110001, 9)),
    (OpArg(1, 4), Code::new(0b11110001001, 11)),
    (OpArg(1, 5), Code::new(0b101111, 6)),
    (OpArg(1, 6), Code::new(0b100001, 6)),
    (OpArg(1, 7), Code::new(0b01000, 5)),

    (OpArg(2, 0), Code::new(0b10100, 5)),
    (OpArg(2, 1), Code::new(0b00111, 5)),
    (OpArg(2, 2), Code::new(0b1011011, 7)),
    (OpArg(2, 3), Code::new(0b00000, 5)),
    (OpArg(2, 4), Code::new(0b10111001, 8)),
    (OpArg(2, 5), Code::new(0b000010, 6)),
    (OpArg(2, 6), Code::new(0b111001111, 9)),
    (OpArg(2, 7), Code::new(0b101110000, 9)),
    (OpArg(2, 8), Code::new(0b000101110, 9)),
    (OpArg(2, 9), Code::new(0b10010110, 8)),
    (OpArg(2, 10), Code::new(0b1110011010, 10)),
    (OpArg(2, 11), Code::new(0b1110011011, 10)),
    (OpArg(2, 12), Code::new(0b0001011010, 10)),
    (OpArg(2, 13), Code::new(0b0101110000, 10)),
    (OpArg(2, 14), Code::new(0b0001011000, 10)),
    (OpArg(2, 15), Code::new(0b0101110001, 10)),

    (OpArg(3, 0), Code::new(0b1001001, 7)),
    (OpArg(3, 1), Code::new(0b010011, 6)),
    (OpArg(3, 2), Code::new(0b11101011, 8)),
    (OpArg(3, 3), Code::new(0b00011, 5)),
    (OpArg(3, 4), Code::new(0b111001110, 9)),
    (OpArg(3, 5), Code::new(0b001001, 6)),
    (OpArg(3, 6), Code::new(0b11110001000, 11)),
    (OpArg(3, 7), Code::new(0b1000001110, 10)),
    (OpArg(3, 8), Code::new(0b10000011110, 11)),
    (OpArg(3, 9), Code::new(0b10000010, 8)),
    (OpArg(3, 10), Code::new(0b100000111110, 12)),
    (OpArg(3, 11), Code::new(0b1000001100, 10)),
    (OpArg(3, 12), Code::new(0b10000011111110, 14)),
    (OpArg(3, 13), Code::new(0b100000111111111, 15)),
    (OpArg(3, 14), Code::new(0b100000111111110, 15)),
    (OpArg(3, 15), Code::new(0b0001011001, 10)),

    (OpArg(4, 0), Code::new(0b1110111, 7)),
    (OpArg(4, 1), Code::new(0b001011, 6)),
    (OpArg(4, 2), Code::new(0b1011101, 7)),
    (OpArg(4, 3), Code::new(0b1110110, 7)),
    (OpArg(4, 4), Code::new(0b0101111, 7)),
    (OpArg(4, 5), Code::new(0b1001010, 7)),
    (OpArg(4, 6), Code::new(0b0100101, 7)),
    (OpArg(4, 7), Code::new(0b1000000, 7)),
    (OpArg(4, 8), Code::new(0b0000110, 7)),
    (OpArg(4, 9), Code::new(0b0100100, 7)),
    (OpArg(4, 10), Code::new(0b11110110, 8)),
    (OpArg(4, 11), Code::new(0b11110111, 8)),
    (OpArg(4, 12), Code::new(0b11110000, 8)),
    (OpArg(4, 13), Code::new(0b11101010, 8)),
    (OpArg(4, 14), Code::new(0b11100100, 8)),
    (OpArg(4, 15), Code::new(0b10001, 5)),

    (OpArg(5, 0), Code::new(0b0101001, 7)),
    (OpArg(5, 1), Code::new(0b010111001, 9)),
    (OpArg(5, 2), Code::new(0b01011101, 8)),
    (OpArg(5, 3), Code::new(0b0001010, 7)),
    (OpArg(5, 4), Code::new(0b1111001, 7)),
    (OpArg(5, 5), Code::new(0b010110, 6)),
    (OpArg(5, 6), Code::new(0b001000, 6)),
    (OpArg(5, 7), Code::new(0b0000111, 7)),
    (OpArg(5, 8), Code::new(0b0101000, 7)),
    (OpArg(5, 9), Code::new(0b011000, 6)),
    (OpArg(5, 10), Code::new(0b011010, 6)),
    (OpArg(5, 11), Code::new(0b1110100, 7)),
    (OpArg(5, 12), Code::new(0b11100101, 8)),
    (OpArg(5, 13), Code::new(0b111100011, 9)),
    (OpArg(5, 14), Code::new(0b111001100, 9)),
    (OpArg(5, 15), Code::new(0b1011010, 7)),

    (OpArg(6, 0), Code::new(0b0001000, 7)),
    (OpArg(6, 1), Code::new(0b00110, 5)),
    (OpArg(6, 2), Code::new(0b0001011011, 10)),
    (OpArg(6, 3), Code::new(0b1000001101, 10)),
    (OpArg(6, 8), Code::new(0b111000, 6)),
    (OpArg(6, 9), Code::new(0b000101111, 9)),
    (OpArg(6, 10), Code::new(0b10010111, 8)),
    (OpArg(6, 11), Code::new(0b1111000101, 10)),
    (OpArg(6, 12), Code::new(0b1000001111110, 13)),

    (Op(8), Code::new(0b0111, 4)),
    (Op(9), Code::new(0b001010, 6)),
    (Op(10), Code::new(0b1001000, 7)),
    (Op(11), Code::new(0b010101, 6)),
    (Op(12), Code::new(0b0001001, 7)),
    (Op(13), Code::new(0b110, 3)),
    (Op(14), Code::new(0b10011, 5)),
    (Op(15), Code::new(0b10101, 5)),
];

/// The code for `key`, if the table has one
pub fn code_for(key: FusedKey) -> Option<Code> {
    FUSED_CODES.iter().find(|(k, _)| *k == key).map(|&(_, code)| code)
}

/// The symbol whose code is exactly these `len` bits
pub fn lookup(bits: u16, len: u8) -> Option<FusedKey> {
    FUSED_CODES
        .iter()
        .find(|(_, code)| code.len == len && code.bits == bits)
        .map(|&(key, _)| key)
}

/// Whether the table can code `key`; opcodes with operands must be fused.
pub fn is_codable(key: FusedKey) -> bool {
    let fused = matches!(key, FusedKey::OpArg(..));
    fused == has_operand(key.opcode()) && code_for(key).is_some()
}

/// Split a stream body into the symbols the packer codes, up to and including the end opcode.
///
/// Only the framing is checked here; unknown opcodes come back as symbols.
pub fn symbols(stream: &NybbleStream) -> Result<Vec<FusedKey>> {
    let nybbles = stream.as_slice();
    let mut pos = stream.prolog()?.len;
    let mut keys = Vec::new();
    loop {
        let &opcode = nybbles.get(pos).ok_or(Error::TruncatedStream)?;
        let key = if has_operand(opcode) {
            let &operand = nybbles.get(pos + 1).ok_or(Error::TruncatedStream)?;
            pos += 2;
            FusedKey::OpArg(opcode, operand)
        } else {
            pos += 1;
            FusedKey::Op(opcode)
        };
        keys.push(key);
        if opcode == OP_END {
            return Ok(keys);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_prefix_free() {
        for (i, (key_a, a)) in FUSED_CODES.iter().enumerate() {
            for (key_b, b) in &FUSED_CODES[i + 1..] {
                let (short, long) = if a.len <= b.len { (a, b) } else { (b, a) };
                let prefix = long.bits >> (long.len - short.len);
                assert_ne!(prefix, short.bits, "{key_a} and {key_b} share a prefix");
            }
        }
    }

    #[test]
    fn codes_fit_their_length() {
        for (key, code) in FUSED_CODES {
            assert!(code.len >= 1 && code.len <= MAX_CODE_LEN, "{key}");
            assert!(u32::from(code.bits) < 1 << code.len, "{key}");
        }
    }

    #[test]
    fn kraft_sum_is_below_one() {
        let sum: f64 = FUSED_CODES.iter().map(|(_, code)| 0.5f64.powi(i32::from(code.len))).sum();
        assert!(sum <= 1.0);
    }

    #[test]
    fn coverage() {
        for opcode in 8..16 {
            assert!(is_codable(FusedKey::Op(opcode)), "opcode {opcode}");
        }
        for operand in 0..16 {
            for opcode in 2..6 {
                assert!(is_codable(FusedKey::OpArg(opcode, operand)));
            }
        }
        for operand in [0, 1, 2, 3, 8, 9, 10, 11, 12] {
            assert!(is_codable(FusedKey::OpArg(6, operand)));
        }
        for operand in 4..8 {
            assert!(!is_codable(FusedKey::OpArg(6, operand)));
        }
        assert!(!is_codable(FusedKey::OpArg(0, 0)));
        assert!(!is_codable(FusedKey::Op(7)));
        assert!(!is_codable(FusedKey::Op(3)));
    }

    #[test]
    fn symbols_of_empty_stream() {
        let keys = symbols(&NybbleStream::empty_hints()).unwrap();
        assert_eq!(keys, vec![FusedKey::Op(14), FusedKey::Op(15)]);
        let unterminated = NybbleStream::from_nybbles(vec![3, 0, 0, 0, 0, 2]).unwrap();
        assert!(matches!(symbols(&unterminated), Err(Error::TruncatedStream)));
    }

    #[test]
    fn lookup_inverts_code_for() {
        assert_eq!(code_for(FusedKey::Op(13)), Some(Code::new(0b110, 3)));
        assert_eq!(lookup(0b110, 3), Some(FusedKey::Op(13)));
        assert_eq!(lookup(0b11, 2), None);
        assert_eq!(Code::new(0b0111, 4).to_string(), "0111");
    }
}

//! The nybble stream and its prolog.

use std::fmt;

use crate::{
    error::{Error, Result},
    grain::{MAX_DELTA_SHIFT, grain_to_shift},
    opcode::Instruction,
};

/// Nybble that announces a two-nybble base ppem
pub const LONG_PPEM: u8 = 15;

/// Ppem represented by a short-form prolog nybble of zero
pub const MIN_BASE_PPEM: u32 = 9;

/// The stream produced for a glyph whose only hint is RTGAH
pub const EMPTY_STREAM: [u8; 7] = [3, 0, 0, 0, 0, 14, 15];

/// A compressed hint program, one value `0..=15` per element.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct NybbleStream(Vec<u8>);

impl NybbleStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap existing nybbles, rejecting values above 15.
    pub fn from_nybbles(nybbles: Vec<u8>) -> Result<Self> {
        if let Some(&bad) = nybbles.iter().find(|&&n| n > 15) {
            return Err(Error::InvalidNybble(bad));
        }
        Ok(Self(nybbles))
    }

    pub fn empty_hints() -> Self {
        Self(EMPTY_STREAM.to_vec())
    }

    pub(crate) fn push(&mut self, nybble: u8) {
        debug_assert!(nybble <= 15);
        self.0.push(nybble);
    }

    pub(crate) fn push_pair(&mut self, opcode: u8, operand: u8) {
        self.push(opcode);
        self.push(operand);
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn prolog(&self) -> Result<Prolog> {
        Prolog::read(&self.0)
    }

    /// Instructions after the prolog, stopping after the end opcode.
    pub fn instructions(&self) -> Result<Instructions<'_>> {
        let prolog = self.prolog()?;
        Ok(Instructions { nybbles: &self.0, pos: prolog.len, done: false })
    }

    /// Bytes taken by the stream packed two nybbles per byte
    pub fn packed_len(&self) -> usize {
        self.0.len().div_ceil(2)
    }
}

impl AsRef<[u8]> for NybbleStream {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for NybbleStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for nybble in &self.0 {
            write!(f, "{nybble:X}")?;
        }
        Ok(())
    }
}

/// Iterator over `(offset, instruction)` pairs of a stream body
pub struct Instructions<'a> {
    nybbles: &'a [u8],
    pos: usize,
    done: bool,
}

impl Iterator for Instructions<'_> {
    type Item = Result<(usize, Instruction)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let offset = self.pos;
        match Instruction::read(&self.nybbles[offset..]) {
            Ok((inst, width)) => {
                self.pos += width;
                self.done = inst == Instruction::End;
                Some(Ok((offset, inst)))
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// The fixed-width header of a nybble stream
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Prolog {
    /// Granularity the base shift is expressed in
    pub granularity: u8,
    pub shift_grain: u8,
    pub base_ppem: u32,
    pub base_point: u32,
    /// Number of nybbles taken, 5 or 7
    pub len: usize,
}

impl Prolog {
    pub fn read(nybbles: &[u8]) -> Result<Self> {
        let at = |i: usize| nybbles.get(i).copied().ok_or(Error::TruncatedStream);
        let granularity = at(0)?;
        if granularity > MAX_DELTA_SHIFT {
            return Err(Error::InvalidGranularity(granularity));
        }
        let shift_grain = at(1)?;
        let (base_ppem, point_at) = match at(2)? {
            LONG_PPEM => (16 * u32::from(at(3)?) + u32::from(at(4)?), 5),
            short => (MIN_BASE_PPEM + u32::from(short), 3),
        };
        let base_point = 16 * u32::from(at(point_at)?) + u32::from(at(point_at + 1)?);
        Ok(Self { granularity, shift_grain, base_ppem, base_point, len: point_at + 2 })
    }

    pub fn base_shift(&self) -> f64 {
        grain_to_shift(i64::from(self.shift_grain), self.granularity)
    }

    pub(crate) fn write(&self, stream: &mut NybbleStream) {
        stream.push(self.granularity);
        stream.push(self.shift_grain);
        if self.base_ppem < MIN_BASE_PPEM + u32::from(LONG_PPEM) {
            stream.push((self.base_ppem - MIN_BASE_PPEM) as u8);
        } else {
            stream.push(LONG_PPEM);
            stream.push((self.base_ppem / 16) as u8);
            stream.push((self.base_ppem % 16) as u8);
        }
        stream.push((self.base_point / 16) as u8);
        stream.push((self.base_point % 16) as u8);
    }
}

//! Machine state shared by the encoder and the decoder.
//!
//! The encoder steps this state alongside the instructions it emits, and the
//! decoder steps it while replaying them; both must reach the same values.

use crate::{
    grain::{grain_to_shift, shift_to_grain},
    opcode::Mask,
    stream::Prolog,
    types::Axis,
};

/// Delta shift in effect at the start of every stream
pub const DEFAULT_DELTA_SHIFT: u8 = 3;

/// Delta base in effect at the start of every stream
pub const DEFAULT_DELTA_BASE: u32 = 9;

/// Values a reset restores, taken from the prolog
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Base {
    pub shift: f64,
    pub ppem: u32,
    pub point: u32,
}

impl From<&Prolog> for Base {
    fn from(prolog: &Prolog) -> Self {
        Self { shift: prolog.base_shift(), ppem: prolog.base_ppem, point: prolog.base_point }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EncoderState {
    pub axis: Axis,
    pub shift: f64,
    pub ppem: u32,
    pub point: u32,
    pub delta_base: u32,
    /// Always within `0..=MAX_DELTA_SHIFT`
    pub delta_shift: u8,
    /// Always at least 1
    pub repeat: u32,
    pub auto_increment: Mask,
    pub base: Base,
}

impl EncoderState {
    pub fn new(base: Base) -> Self {
        Self {
            axis: Axis::X,
            shift: base.shift,
            ppem: base.ppem,
            point: base.point,
            delta_base: DEFAULT_DELTA_BASE,
            delta_shift: DEFAULT_DELTA_SHIFT,
            repeat: 1,
            auto_increment: Mask::ALL,
            base,
        }
    }

    /// Restore the fields selected by `mask` to their base values.
    pub fn reset(&mut self, mask: Mask) {
        if mask.contains(Mask::PPEM) {
            self.ppem = self.base.ppem;
        }
        if mask.contains(Mask::POINT) {
            self.point = self.base.point;
        }
        if mask.contains(Mask::SHIFT) {
            self.shift = self.base.shift;
        }
    }

    /// Apply the post-increment that follows every emitted hint.
    pub fn advance(&mut self) {
        let mask = self.auto_increment;
        if mask.contains(Mask::PPEM) {
            self.ppem = self.ppem.saturating_add(self.repeat);
        }
        if mask.contains(Mask::POINT) {
            self.point = self.point.saturating_add(self.repeat);
        }
        if mask.contains(Mask::SHIFT) {
            self.shift = self.shift_after(self.repeat);
        }
    }

    /// The shift `grains` grains past the current one, at the current granularity
    pub fn shift_after(&self, grains: u32) -> f64 {
        let grain = shift_to_grain(self.shift, self.delta_shift) + i64::from(grains);
        grain_to_shift(grain, self.delta_shift)
    }
}

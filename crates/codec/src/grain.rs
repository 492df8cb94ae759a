//! Conversions between pixel shifts and grain counts.
//!
//! A grain is `1 / 2^delta_shift` pixels. Nybble grains `0..=15` map to the
//! signed steps `-8..=-1, 1..=8`; zero is never encoded.

use crate::error::{Error, Result};

/// Finest granularity the format can express
pub const MAX_DELTA_SHIFT: u8 = 6;

fn scale(delta_shift: u8) -> f64 {
    f64::from(1u32 << delta_shift)
}

/// Shift in pixels for a grain value at `delta_shift`.
///
/// `grain` may lie outside `0..=15` when it results from auto-increment
/// arithmetic.
pub fn grain_to_shift(grain: i64, delta_shift: u8) -> f64 {
    let steps = grain - 8 + i64::from(grain >= 8);
    steps as f64 / scale(delta_shift)
}

/// Inverse of [`grain_to_shift`], truncating toward zero.
pub fn shift_to_grain(shift: f64, delta_shift: u8) -> i64 {
    let steps = shift * scale(delta_shift);
    let skip = if steps > 0.0 { 1.0 } else { 0.0 };
    (steps + 8.0 - skip) as i64
}

/// True when `shift` is a whole number of grains no more than 8 grains from zero.
pub fn can_represent(delta_shift: u8, shift: f64) -> bool {
    let steps = shift * scale(delta_shift);
    steps.fract() == 0.0 && steps.abs() <= 8.0
}

/// Find the granularity closest to `delta_shift` at which `shift` is representable.
///
/// Refines until the shift is a whole number of grains, then coarsens while
/// it is more than 8 grains away from zero. Coarsening that loses exactness
/// or leaves `0..=6` fails.
pub fn fit_delta_shift(delta_shift: u8, shift: f64) -> Result<u8> {
    let exhausted = || Error::GranularityExhausted { shift };
    if !shift.is_finite() {
        return Err(exhausted());
    }
    let mut ds = delta_shift;
    let mut steps = shift * scale(ds);
    while steps.fract() != 0.0 {
        if ds >= MAX_DELTA_SHIFT {
            return Err(exhausted());
        }
        ds += 1;
        steps *= 2.0;
    }
    while steps.abs() > 8.0 {
        ds = ds.checked_sub(1).ok_or_else(exhausted)?;
        steps /= 2.0;
        if steps.fract() != 0.0 {
            return Err(exhausted());
        }
    }
    Ok(ds)
}

/// The coarsest granularity at which `shift` is a whole number of grains.
pub fn coarsest_delta_shift(shift: f64) -> Result<u8> {
    (0..=MAX_DELTA_SHIFT)
        .find(|&ds| (shift * scale(ds)).fract() == 0.0)
        .ok_or(Error::GranularityExhausted { shift })
}

/// The signed grain count of `shift` at `delta_shift`, assumed exact.
pub fn steps(shift: f64, delta_shift: u8) -> i64 {
    (shift * scale(delta_shift)) as i64
}

/// The nybble for a signed, nonzero step count in `-8..=8`.
pub fn steps_to_nybble(steps: i64) -> i64 {
    steps + 8 - i64::from(steps > 0)
}

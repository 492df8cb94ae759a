//! Decoder replaying a nybble stream back into phase maps.

use log::trace;

use crate::{
    error::{Error, Result},
    grain::{MAX_DELTA_SHIFT, grain_to_shift},
    group::DELTA_BASE_STEP,
    opcode::{Instruction, Mask, Misc, OP_MISC},
    state::{Base, EncoderState},
    stream::NybbleStream,
    types::{Axis, PhaseMap},
};

/// Replay `stream`, returning the hints before RTGAH (if there was one) and after.
pub fn decode(stream: &NybbleStream) -> Result<(Option<PhaseMap>, PhaseMap)> {
    let prolog = stream.prolog()?;
    let mut state = EncoderState::new(Base::from(&prolog));
    let mut pre = None;
    let mut current = PhaseMap::new();

    for item in stream.instructions()? {
        let (offset, inst) = item?;
        trace!("{offset:03} {inst}");
        match inst {
            Instruction::Reset(mask) => state.reset(mask),
            Instruction::SetAutoIncrement(mask) => state.auto_increment = mask,
            Instruction::SetRepeat(n) => state.repeat = u32::from(n) + 1,
            Instruction::AddPpem(n) => state.ppem = state.ppem.saturating_add(u32::from(n) + 1),
            Instruction::AddPoint(n) => state.point = state.point.saturating_add(u32::from(n) + 1),
            Instruction::SetShift(grain) => {
                state.shift = grain_to_shift(i64::from(grain), state.delta_shift)
            }
            Instruction::Misc(misc) => apply_misc(&mut state, misc)?,
            Instruction::Delta(kind) => {
                let point = kind.has_point().then_some(state.point);
                current.insert(state.axis, state.ppem, state.shift, kind, point)?;
                state.advance();
            }
            Instruction::Rtgah => {
                pre = Some(std::mem::take(&mut current));
                state.reset(Mask::ALL);
            }
            Instruction::End => return Ok((pre, current)),
        }
    }
    Err(Error::TruncatedStream)
}

fn apply_misc(state: &mut EncoderState, misc: Misc) -> Result<()> {
    let invalid = || Error::InvalidOperand { opcode: OP_MISC, operand: misc.operand() };
    match misc {
        Misc::SetXAxis | Misc::SetYAxis => {
            state.axis = if misc == Misc::SetYAxis { Axis::Y } else { Axis::X };
            state.reset(Mask::ALL);
        }
        Misc::IncrementDeltaShift => {
            if state.delta_shift >= MAX_DELTA_SHIFT {
                return Err(invalid());
            }
            state.delta_shift += 1;
        }
        Misc::DecrementDeltaShift => {
            state.delta_shift = state.delta_shift.checked_sub(1).ok_or_else(invalid)?
        }
        Misc::IncrementDeltaBase => {
            state.delta_base = state.delta_base.saturating_add(DELTA_BASE_STEP)
        }
        Misc::DecrementDeltaBase => {
            state.delta_base = state.delta_base.checked_sub(DELTA_BASE_STEP).ok_or_else(invalid)?
        }
        Misc::AddPpem32 => state.ppem = state.ppem.saturating_add(32),
        Misc::AddPpem64 => state.ppem = state.ppem.saturating_add(64),
        Misc::AddPoint32 => state.point = state.point.saturating_add(32),
        Misc::AddPoint64 => state.point = state.point.saturating_add(64),
        Misc::AddRepeat16 => state.repeat = state.repeat.saturating_add(16),
        Misc::AddRepeat32 => state.repeat = state.repeat.saturating_add(32),
        Misc::AddRepeat64 => state.repeat = state.repeat.saturating_add(64),
    }
    Ok(())
}

//! Encoder from phase maps to a nybble stream.

use log::{debug, trace};

use crate::{
    decode::decode,
    error::{Error, Result},
    grain::{coarsest_delta_shift, fit_delta_shift, shift_to_grain, steps, steps_to_nybble},
    group::{GroupMarker, delta_base_steps, group},
    opcode::{
        Mask, Misc, OP_ADD_POINT, OP_ADD_PPEM, OP_END, OP_MISC, OP_RESET, OP_RTGAH,
        OP_SET_AUTO_INCREMENT, OP_SET_REPEAT, OP_SET_SHIFT,
    },
    options::Options,
    state::{Base, EncoderState},
    stream::{MIN_BASE_PPEM, NybbleStream, Prolog},
    types::{Axis, HintTuple, PhaseMap, PpemMap, Shift, flatten},
};

/// Largest step one add-ppem or add-point opcode can take
const MAX_ADD: u32 = 16;

/// Largest value a two-nybble prolog field can hold
const MAX_PROLOG_FIELD: u32 = 255;

/// Encode with default options.
pub fn encode(pre: Option<&PhaseMap>, post: &PhaseMap) -> Result<NybbleStream> {
    encode_with(pre, post, &Options::default())
}

/// Encode the hints before RTGAH (if the glyph has an RTGAH) and after it.
///
/// The whole stream is built locally; nothing is returned on failure.
pub fn encode_with(
    pre: Option<&PhaseMap>,
    post: &PhaseMap,
    options: &Options,
) -> Result<NybbleStream> {
    let stream = if pre.is_none_or(PhaseMap::is_empty) && post.is_empty() {
        NybbleStream::empty_hints()
    } else {
        let prolog = prolog_for(pre.into_iter().chain([post]))?;
        let mut encoder = Encoder::new(&prolog);
        prolog.write(&mut encoder.out);
        if let Some(pre) = pre {
            encoder.process_phase(pre)?;
            encoder.out.push(OP_RTGAH);
            encoder.state.reset(Mask::ALL);
        }
        encoder.process_phase(post)?;
        encoder.out.push(OP_END);
        encoder.out
    };

    if options.verify {
        verify(&stream, pre, post)?;
    }
    Ok(stream)
}

fn verify(stream: &NybbleStream, pre: Option<&PhaseMap>, post: &PhaseMap) -> Result<()> {
    let (decoded_pre, decoded_post) = decode(stream)?;
    let same_pre = match (pre, decoded_pre.as_ref()) {
        (Some(a), Some(b)) => a == b,
        (None, None) => true,
        // the empty stream always carries its RTGAH
        (None, Some(b)) => b.is_empty() && post.is_empty(),
        (Some(_), None) => false,
    };
    if !same_pre || decoded_post != *post {
        return Err(Error::InvariantViolation("round trip mismatch"));
    }
    Ok(())
}

/// Compute the prolog from the smallest shift, ppem and point over all maps.
fn prolog_for<'a>(maps: impl Iterator<Item = &'a PhaseMap> + Clone) -> Result<Prolog> {
    let min_shift = maps
        .clone()
        .filter_map(PhaseMap::min_shift)
        .min()
        .map_or(0.0, Shift::to_f64);
    let granularity = coarsest_delta_shift(min_shift)?;
    let shift_grain = steps_to_nybble(steps(min_shift, granularity));
    let shift_grain = u8::try_from(shift_grain)
        .ok()
        .filter(|&grain| grain <= 15)
        .ok_or(Error::PrologOverflow { field: "base shift", value: min_shift })?;

    let base_ppem = maps.clone().filter_map(PhaseMap::min_ppem).min().unwrap_or(MIN_BASE_PPEM);
    if base_ppem < MIN_BASE_PPEM {
        return Err(Error::BasePpemTooLow(base_ppem));
    }
    if base_ppem > MAX_PROLOG_FIELD {
        return Err(Error::PrologOverflow { field: "base ppem", value: f64::from(base_ppem) });
    }
    let base_point = maps.filter_map(PhaseMap::min_point).min().unwrap_or(0);
    if base_point > MAX_PROLOG_FIELD {
        return Err(Error::PrologOverflow { field: "base point", value: f64::from(base_point) });
    }

    debug!(
        "prolog: granularity {granularity}, base shift {min_shift}, \
         base ppem {base_ppem}, base point {base_point}"
    );
    let mut prolog = Prolog { granularity, shift_grain, base_ppem, base_point, len: 0 };
    let mut scratch = NybbleStream::new();
    prolog.write(&mut scratch);
    prolog.len = scratch.len();
    Ok(prolog)
}

struct Encoder {
    state: EncoderState,
    out: NybbleStream,
}

impl Encoder {
    fn new(prolog: &Prolog) -> Self {
        Self { state: EncoderState::new(Base::from(prolog)), out: NybbleStream::new() }
    }

    fn misc(&mut self, misc: Misc, times: u32) {
        for _ in 0..times {
            self.out.push_pair(OP_MISC, misc.operand());
        }
    }

    fn process_phase(&mut self, phase: &PhaseMap) -> Result<()> {
        for (axis, ppems) in phase.axes() {
            if self.state.axis != axis {
                let misc = match axis {
                    Axis::X => Misc::SetXAxis,
                    Axis::Y => Misc::SetYAxis,
                };
                self.misc(misc, 1);
                self.state.axis = axis;
            }
            self.state.reset(Mask::ALL);
            self.process_axis(axis, ppems)?;
        }
        Ok(())
    }

    fn process_axis(&mut self, axis: Axis, ppems: &PpemMap) -> Result<()> {
        let plan = group(flatten(ppems), self.state.delta_shift, self.state.delta_base)?;
        debug!("{axis} axis: {} markers", plan.len());
        for (i, marker) in plan.iter().enumerate() {
            trace!("{marker:?}");
            match *marker {
                GroupMarker::Mask(mask) => {
                    if self.state.auto_increment != mask {
                        self.out.push_pair(OP_SET_AUTO_INCREMENT, mask.bits());
                        self.state.auto_increment = mask;
                    }
                }
                GroupMarker::Sds(delta_shift) => self.set_delta_shift(delta_shift),
                GroupMarker::Sdb(delta_base) => {
                    let steps = delta_base_steps(self.state.delta_base, delta_base)?;
                    let misc = if delta_base < self.state.delta_base {
                        Misc::DecrementDeltaBase
                    } else {
                        Misc::IncrementDeltaBase
                    };
                    self.misc(misc, steps);
                    self.state.delta_base = delta_base;
                }
                GroupMarker::Hint(tuple) => {
                    let next = match plan.get(i + 1) {
                        Some(GroupMarker::Hint(next)) => Some(next),
                        _ => None,
                    };
                    self.process_tuple(&tuple, next)?;
                }
            }
        }
        Ok(())
    }

    fn set_delta_shift(&mut self, delta_shift: u8) {
        let current = self.state.delta_shift;
        if delta_shift > current {
            self.misc(Misc::IncrementDeltaShift, u32::from(delta_shift - current));
        } else {
            self.misc(Misc::DecrementDeltaShift, u32::from(current - delta_shift));
        }
        self.state.delta_shift = delta_shift;
    }

    fn process_tuple(&mut self, tuple: &HintTuple, next: Option<&HintTuple>) -> Result<()> {
        let mut reset = Mask::NONE;
        if tuple.ppem < self.state.ppem {
            reset = reset.union(Mask::PPEM);
        }
        if tuple.point.is_some_and(|point| point < self.state.point) {
            reset = reset.union(Mask::POINT);
        }
        if !reset.is_empty() {
            self.out.push_pair(OP_RESET, reset.bits());
            self.state.reset(reset);
        }

        self.match_ppem(tuple.ppem);
        self.match_shift(tuple.shift.to_f64())?;
        if let Some(point) = tuple.point {
            self.match_point(point);
        }
        if let Some(next) = next {
            self.infer_repeat(tuple, next);
        }

        self.out.push(tuple.kind.opcode());
        self.state.advance();
        Ok(())
    }

    fn match_ppem(&mut self, ppem: u32) {
        let mut delta = ppem - self.state.ppem;
        while delta >= MAX_ADD {
            self.out.push_pair(OP_ADD_PPEM, 15);
            delta -= MAX_ADD;
        }
        if delta > 0 {
            self.out.push_pair(OP_ADD_PPEM, (delta - 1) as u8);
        }
        self.state.ppem = ppem;
    }

    fn match_point(&mut self, point: u32) {
        let mut delta = point - self.state.point;
        while delta > 0 {
            if delta >= 64 {
                self.misc(Misc::AddPoint64, 1);
                delta -= 64;
            } else if delta >= 32 {
                self.misc(Misc::AddPoint32, 1);
                delta -= 32;
            } else if delta >= MAX_ADD {
                self.out.push_pair(OP_ADD_POINT, 15);
                delta -= MAX_ADD;
            } else {
                self.out.push_pair(OP_ADD_POINT, (delta - 1) as u8);
                delta = 0;
            }
        }
        self.state.point = point;
    }

    fn match_shift(&mut self, shift: f64) -> Result<()> {
        if shift == self.state.shift {
            return Ok(());
        }
        let delta_shift = fit_delta_shift(self.state.delta_shift, shift)?;
        self.set_delta_shift(delta_shift);
        let grain = steps_to_nybble(steps(shift, delta_shift));
        self.out.push_pair(OP_SET_SHIFT, grain as u8);
        self.state.shift = shift;
        Ok(())
    }

    /// Set the repeat so the auto-increment after `tuple` lands on `next`.
    fn infer_repeat(&mut self, tuple: &HintTuple, next: &HintTuple) {
        let mask = self.state.auto_increment;
        let ds = self.state.delta_shift;
        let mut deltas = Vec::with_capacity(3);
        if mask.contains(Mask::PPEM) {
            deltas.push(i64::from(next.ppem) - i64::from(tuple.ppem));
        }
        if mask.contains(Mask::SHIFT) {
            deltas.push(
                shift_to_grain(next.shift.to_f64(), ds) - shift_to_grain(tuple.shift.to_f64(), ds),
            );
        }
        if mask.contains(Mask::POINT)
            && let (Some(from), Some(to)) = (tuple.point, next.point)
        {
            deltas.push(i64::from(to) - i64::from(from));
        }
        let Some(repeat) = deltas.into_iter().filter(|&d| d > 0).min() else {
            return;
        };

        // repeat is positive and below the u32 range of the fields it came from
        let repeat = repeat as u32;
        self.state.repeat = repeat;
        let low = (repeat - 1) % 16;
        self.out.push_pair(OP_SET_REPEAT, low as u8);
        let mut rest = repeat - low - 1;
        while rest > 0 {
            if rest >= 64 {
                self.misc(Misc::AddRepeat64, 1);
                rest -= 64;
            } else if rest >= 32 {
                self.misc(Misc::AddRepeat32, 1);
                rest -= 32;
            } else {
                self.misc(Misc::AddRepeat16, 1);
                rest -= 16;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DeltaKind::*;
    use pretty_assertions::assert_eq;

    fn nybbles(pre: Option<&PhaseMap>, post: &PhaseMap) -> Vec<u8> {
        encode(pre, post).unwrap().into_vec()
    }

    #[test]
    fn empty_hints() {
        let empty = PhaseMap::new();
        assert_eq!(nybbles(None, &empty), vec![3, 0, 0, 0, 0, 14, 15]);
        assert_eq!(nybbles(Some(&empty), &empty), vec![3, 0, 0, 0, 0, 14, 15]);
    }

    #[test]
    fn delta_base_is_stepped_and_restored() {
        let mut post = PhaseMap::new();
        post.insert(Axis::X, 13, 0.5, DeltaP, Some(4)).unwrap();
        post.insert(Axis::X, 70, 0.25, DeltaP, Some(12)).unwrap();
        assert_eq!(
            nybbles(None, &post),
            vec![2, 8, 4, 0, 4, 5, 11, 8, 6, 4, 3, 15, 3, 15, 3, 15, 3, 7, 5, 9, 4, 6, 8, 6, 5, 15]
        );
    }

    #[test]
    fn long_form_base_ppem() {
        let mut post = PhaseMap::new();
        post.insert(Axis::Y, 30, -1.0, DeltaG, None).unwrap();
        // y axis flip, then the hint at base values
        assert_eq!(nybbles(None, &post), vec![0, 7, 15, 1, 14, 0, 0, 6, 1, 12, 15]);
    }

    fn bare_encoder() -> Encoder {
        let prolog = Prolog { granularity: 3, shift_grain: 8, base_ppem: 9, base_point: 0, len: 5 };
        Encoder::new(&prolog)
    }

    #[test]
    fn ppem_of_64_takes_four_steps() {
        let mut encoder = bare_encoder();
        encoder.match_ppem(9 + 64);
        assert_eq!(encoder.out.as_slice(), &[3, 15, 3, 15, 3, 15, 3, 15]);
        assert_eq!(encoder.state.ppem, 73);
    }

    #[test]
    fn point_steps_use_misc_shortcuts() {
        let mut encoder = bare_encoder();
        encoder.match_point(64 + 32 + 16 + 3);
        assert_eq!(encoder.out.as_slice(), &[6, 9, 6, 8, 4, 15, 4, 2]);
        assert_eq!(encoder.state.point, 115);
    }

    #[test]
    fn long_repeat_uses_misc_increments() {
        let mut post = PhaseMap::new();
        post.insert(Axis::X, 20, 0.5, DeltaP, Some(0)).unwrap();
        post.insert(Axis::X, 20, 0.5, DeltaP, Some(100)).unwrap();
        let out = nybbles(None, &post);
        // repeat 100 = 4 + 64 + 32
        let body = &out[5..];
        let at = body.windows(2).position(|w| w == [OP_SET_REPEAT, 3]).unwrap();
        assert_eq!(&body[at..at + 6], &[2, 3, 6, 12, 6, 11]);
    }

    #[test]
    fn prolog_errors() {
        let mut post = PhaseMap::new();
        post.insert(Axis::X, 8, 0.5, DeltaP, Some(0)).unwrap();
        assert!(matches!(encode(None, &post), Err(Error::BasePpemTooLow(8))));

        let mut post = PhaseMap::new();
        post.insert(Axis::X, 300, 0.5, DeltaP, Some(0)).unwrap();
        assert!(matches!(
            encode(None, &post),
            Err(Error::PrologOverflow { field: "base ppem", .. })
        ));

        let mut post = PhaseMap::new();
        post.insert(Axis::X, 20, 0.5, DeltaP, Some(256)).unwrap();
        assert!(matches!(
            encode(None, &post),
            Err(Error::PrologOverflow { field: "base point", .. })
        ));

        let mut post = PhaseMap::new();
        post.insert(Axis::X, 20, -9.0, DeltaP, Some(0)).unwrap();
        assert!(matches!(
            encode(None, &post),
            Err(Error::PrologOverflow { field: "base shift", .. })
        ));

        let mut post = PhaseMap::new();
        post.insert(Axis::X, 20, 1.0 / 128.0, DeltaP, Some(0)).unwrap();
        assert!(matches!(encode(None, &post), Err(Error::GranularityExhausted { .. })));
    }

    #[test]
    fn verify_accepts_good_streams() {
        let mut pre = PhaseMap::new();
        pre.insert(Axis::X, 18, -1.0, StrokeDelta, Some(14)).unwrap();
        let mut post = PhaseMap::new();
        post.insert(Axis::Y, 14, 0.625, DeltaP, Some(26)).unwrap();
        let options = Options::new().verify(true);
        assert!(encode_with(Some(&pre), &post, &options).is_ok());
        assert!(encode_with(None, &PhaseMap::new(), &options).is_ok());
    }
}

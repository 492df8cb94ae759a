//! Spark hint programs: the uncompressed delta-hint bytecode of a glyph.
//!
//! A program is a short header followed by axis switches, delta base and
//! shift settings, an optional RTGAH, and delta instructions in three ppem
//! bands. [`SparkHints::analyze`] turns a program into the phase maps the
//! encoder consumes.
//!
//! # Example
//!
//! ```
//! use sparkhints_codec::SparkHints;
//!
//! let bytes = [0x7F, 0xF9, 0x00, 0x09, 0xA2, 0x00, 0x0E, 0x01, 0x5A];
//! let hints = SparkHints::parse(&bytes).unwrap();
//! assert_eq!(hints.to_string(), "STROKEDELTA: Point 14 3/8@14\n");
//! ```

use std::fmt;

use log::debug;
use read_fonts::FontData;

use crate::{
    error::{Error, Result},
    grain::{MAX_DELTA_SHIFT, coarsest_delta_shift, grain_to_shift, steps},
    state::{DEFAULT_DELTA_BASE, DEFAULT_DELTA_SHIFT},
    types::{Axis, DeltaKind, PhaseMap},
};

const SVTCA_Y: u8 = 0x00;
const SVTCA_X: u8 = 0x01;
const SDB: u8 = 0x5E;
const SDS: u8 = 0x5F;
const PREFIX: u8 = 0x7F;
const NEW_PREFIX: u8 = 0xB0;
const RTGAH: u8 = 0x0B;
const MONO: u8 = 0xF8;
const GRAY: u8 = 0xF9;

/// Which header the program was stored with
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HeaderStyle {
    /// `7F F8|F9 len`
    Old,
    /// `B0 F8|F9 7F len`
    New,
    /// The two-byte program `B0 0B`
    RtgahOnly,
}

/// The delta opcode for each kind in bands 1, 2 and 3
const DELTA_OPCODES: [(DeltaKind, [u8; 3]); 6] = [
    (DeltaKind::DeltaP, [0x5D, 0x71, 0x72]),
    (DeltaKind::DeltaK, [0xA7, 0xA8, 0xA9]),
    (DeltaKind::DeltaL, [0xAA, 0xAB, 0xAC]),
    (DeltaKind::DeltaS, [0xAD, 0xAE, 0xAF]),
    (DeltaKind::DeltaG, [0xA1, 0xA5, 0xA6]),
    (DeltaKind::StrokeDelta, [0xA2, 0xA3, 0xA4]),
];

fn delta_opcode(opcode: u8) -> Option<(DeltaKind, u8)> {
    DELTA_OPCODES.iter().find_map(|(kind, opcodes)| {
        let band = opcodes.iter().position(|&op| op == opcode)?;
        Some((*kind, band as u8 + 1))
    })
}

/// A packed delta spec: high nybble ppem offset, low nybble shift grain.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct DeltaSpec(pub u8);

impl DeltaSpec {
    /// The ppem and shift this spec means in `band` under the given delta base and shift.
    pub fn resolve(self, band: u8, delta_base: u32, delta_shift: u8) -> (u32, f64) {
        let ppem = u32::from(self.0 >> 4) + delta_base + 16 * (u32::from(band) - 1);
        let shift = grain_to_shift(i64::from(self.0 & 0x0F), delta_shift);
        (ppem, shift)
    }
}

/// A delta instruction in one band.
///
/// Every point receives every spec. DELTAP pairs each point with its own
/// spec instead, so it is kept as one entry per pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SparkDelta {
    pub kind: DeltaKind,
    /// 1, 2 or 3
    pub band: u8,
    pub entries: Vec<(Option<u16>, Vec<DeltaSpec>)>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SparkInstruction {
    SetAxis(Axis),
    Sdb(u8),
    Sds(u8),
    Rtgah,
    Delta(SparkDelta),
}

/// A parsed Spark hint program
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SparkHints {
    pub gray: bool,
    pub style: HeaderStyle,
    pub instructions: Vec<SparkInstruction>,
}

impl SparkHints {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let data = FontData::new(bytes);
        let first = data.read_at::<u8>(0)?;
        let second = data.read_at::<u8>(1)?;
        let (style, gray, header_len) = match (first, second) {
            (NEW_PREFIX, RTGAH) if bytes.len() == 2 => {
                return Ok(Self {
                    gray: false,
                    style: HeaderStyle::RtgahOnly,
                    instructions: vec![SparkInstruction::Rtgah],
                });
            }
            (PREFIX, MONO | GRAY) => (HeaderStyle::Old, second == GRAY, 4),
            (NEW_PREFIX, MONO | GRAY) => {
                if data.read_at::<u8>(2)? != PREFIX {
                    return Err(Error::BadSparkHeader);
                }
                (HeaderStyle::New, second == GRAY, 5)
            }
            _ => return Err(Error::BadSparkHeader),
        };
        let len = usize::from(data.read_at::<u16>(header_len - 2)?);
        if len != bytes.len() {
            return Err(Error::BadSparkHeader);
        }

        let mut reader = Reader { data, pos: header_len };
        let mut instructions = Vec::new();
        while reader.pos < len {
            instructions.push(reader.instruction()?);
        }
        debug!("parsed {} Spark instructions", instructions.len());
        Ok(Self { gray, style, instructions })
    }

    /// Split the program's hints at RTGAH into phase maps.
    ///
    /// The first map is `None` when the program has no RTGAH.
    pub fn analyze(&self) -> Result<(Option<PhaseMap>, PhaseMap)> {
        let mut axis = Axis::X;
        let mut delta_base = DEFAULT_DELTA_BASE;
        let mut delta_shift = DEFAULT_DELTA_SHIFT;
        let mut pre = None;
        let mut current = PhaseMap::new();
        for inst in &self.instructions {
            match inst {
                SparkInstruction::SetAxis(new_axis) => axis = *new_axis,
                SparkInstruction::Sdb(base) => delta_base = u32::from(*base),
                SparkInstruction::Sds(shift) => delta_shift = *shift,
                SparkInstruction::Rtgah => pre = Some(std::mem::take(&mut current)),
                SparkInstruction::Delta(delta) => {
                    for (point, specs) in &delta.entries {
                        for spec in specs {
                            let (ppem, shift) = spec.resolve(delta.band, delta_base, delta_shift);
                            current.insert(axis, ppem, shift, delta.kind, point.map(u32::from))?;
                        }
                    }
                }
            }
        }
        Ok((pre, current))
    }
}

struct Reader<'a> {
    data: FontData<'a>,
    pos: usize,
}

impl Reader<'_> {
    fn u8(&mut self) -> Result<u8> {
        let value = self.data.read_at::<u8>(self.pos)?;
        self.pos += 1;
        Ok(value)
    }

    fn u16(&mut self) -> Result<u16> {
        let value = self.data.read_at::<u16>(self.pos)?;
        self.pos += 2;
        Ok(value)
    }

    fn specs(&mut self) -> Result<Vec<DeltaSpec>> {
        let count = self.u8()?;
        (0..count).map(|_| self.u8().map(DeltaSpec)).collect()
    }

    fn instruction(&mut self) -> Result<SparkInstruction> {
        let offset = self.pos;
        let opcode = self.u8()?;
        let inst = match opcode {
            SVTCA_Y => SparkInstruction::SetAxis(Axis::Y),
            SVTCA_X => SparkInstruction::SetAxis(Axis::X),
            SDB => SparkInstruction::Sdb(self.u8()?),
            SDS => {
                let shift = self.u8()?;
                if shift > MAX_DELTA_SHIFT {
                    return Err(Error::BadSparkOperand { opcode, value: u32::from(shift) });
                }
                SparkInstruction::Sds(shift)
            }
            PREFIX => {
                if self.u8()? != RTGAH {
                    return Err(Error::UnknownSparkOpcode { opcode, offset });
                }
                SparkInstruction::Rtgah
            }
            _ => {
                let (kind, band) =
                    delta_opcode(opcode).ok_or(Error::UnknownSparkOpcode { opcode, offset })?;
                SparkInstruction::Delta(self.delta(kind, band)?)
            }
        };
        Ok(inst)
    }

    fn delta(&mut self, kind: DeltaKind, band: u8) -> Result<SparkDelta> {
        let entries = match kind {
            DeltaKind::DeltaP => {
                let count = self.u8()?;
                (0..count)
                    .map(|_| Ok((Some(self.u16()?), vec![DeltaSpec(self.u8()?)])))
                    .collect::<Result<_>>()?
            }
            DeltaKind::DeltaK => {
                let count = self.u8()?;
                let points = (0..count).map(|_| self.u16()).collect::<Result<Vec<_>>>()?;
                let specs = self.specs()?;
                points.into_iter().map(|point| (Some(point), specs.clone())).collect()
            }
            DeltaKind::DeltaG => vec![(None, self.specs()?)],
            DeltaKind::DeltaL | DeltaKind::DeltaS | DeltaKind::StrokeDelta => {
                let point = self.u16()?;
                vec![(Some(point), self.specs()?)]
            }
        };
        Ok(SparkDelta { kind, band, entries })
    }
}

/// A shift as a reduced fraction, like `-1` or `3/8`.
fn fraction(shift: f64) -> String {
    match coarsest_delta_shift(shift) {
        Ok(0) => format!("{}", steps(shift, 0)),
        Ok(ds) => format!("{}/{}", steps(shift, ds), 1u32 << ds),
        Err(_) => format!("{shift}"),
    }
}

impl fmt::Display for SparkHints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut delta_base = DEFAULT_DELTA_BASE;
        let mut delta_shift = DEFAULT_DELTA_SHIFT;
        for inst in &self.instructions {
            match inst {
                SparkInstruction::SetAxis(axis) => writeln!(f, "SVTCA[{axis}]")?,
                SparkInstruction::Sdb(base) => {
                    delta_base = u32::from(*base);
                    writeln!(f, "SDB[{base}]")?;
                }
                SparkInstruction::Sds(shift) => {
                    delta_shift = *shift;
                    writeln!(f, "SDS[{shift}]")?;
                }
                SparkInstruction::Rtgah => writeln!(f, "RTGAH")?,
                SparkInstruction::Delta(delta) => {
                    let entries: Vec<String> = delta
                        .entries
                        .iter()
                        .map(|(point, specs)| {
                            let mut resolved: Vec<(u32, f64)> = specs
                                .iter()
                                .map(|spec| spec.resolve(delta.band, delta_base, delta_shift))
                                .collect();
                            resolved.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));
                            let specs: Vec<String> = resolved
                                .into_iter()
                                .map(|(ppem, shift)| format!("{}@{ppem}", fraction(shift)))
                                .collect();
                            match point {
                                Some(point) => format!("Point {point} {}", specs.join(", ")),
                                None => specs.join(", "),
                            }
                        })
                        .collect();
                    writeln!(f, "{}: {}", delta.kind, entries.join("; "))?;
                }
            }
        }
        Ok(())
    }
}

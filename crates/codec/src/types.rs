//! Delta hint records and the phase maps built from them
//!
//! A phase map is the analyzed form of a glyph's Spark hints: for each axis,
//! ppem, and sub-pixel shift, the set of delta hints that apply there. Two of
//! them describe a glyph, one for hints before RTGAH and one for hints after.

use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet},
    fmt,
    hash::{Hash, Hasher},
};

use crate::error::{Error, Result};

/// Projection axis a delta hint moves points along
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub const fn is_y(self) -> bool {
        matches!(self, Axis::Y)
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::X => "x",
            Axis::Y => "y",
        })
    }
}

/// The delta-hint instruction family
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeltaKind {
    DeltaP,
    DeltaK,
    DeltaL,
    DeltaS,
    DeltaG,
    StrokeDelta,
}

impl DeltaKind {
    pub const ALL: [DeltaKind; 6] = [
        DeltaKind::DeltaP,
        DeltaKind::DeltaK,
        DeltaKind::DeltaL,
        DeltaKind::DeltaS,
        DeltaKind::DeltaG,
        DeltaKind::StrokeDelta,
    ];

    pub const fn index(self) -> u8 {
        self as u8
    }

    /// The nybble opcode that emits this hint (8..=13)
    pub const fn opcode(self) -> u8 {
        8 + self.index()
    }

    pub const fn from_opcode(opcode: u8) -> Option<Self> {
        match opcode {
            8 => Some(DeltaKind::DeltaP),
            9 => Some(DeltaKind::DeltaK),
            10 => Some(DeltaKind::DeltaL),
            11 => Some(DeltaKind::DeltaS),
            12 => Some(DeltaKind::DeltaG),
            13 => Some(DeltaKind::StrokeDelta),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            DeltaKind::DeltaP => "DELTAP",
            DeltaKind::DeltaK => "DELTAK",
            DeltaKind::DeltaL => "DELTAL",
            DeltaKind::DeltaS => "DELTAS",
            DeltaKind::DeltaG => "DELTAG",
            DeltaKind::StrokeDelta => "STROKEDELTA",
        }
    }

    /// DELTAG is global and is the only kind without a point index.
    pub const fn has_point(self) -> bool {
        !matches!(self, DeltaKind::DeltaG)
    }
}

impl fmt::Display for DeltaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A sub-pixel shift, in pixels.
///
/// Shifts are dyadic fractions, so `f64` holds them exactly. Equality and
/// ordering are total so shifts can key ordered maps.
#[derive(Copy, Clone, Debug, Default)]
pub struct Shift(f64);

impl Shift {
    pub fn new(pixels: f64) -> Self {
        // fold -0.0 into 0.0 so equal shifts hash equally
        Self(if pixels == 0.0 { 0.0 } else { pixels })
    }

    pub const fn to_f64(self) -> f64 {
        self.0
    }
}

impl From<f64> for Shift {
    fn from(pixels: f64) -> Self {
        Self::new(pixels)
    }
}

impl From<Shift> for f64 {
    fn from(shift: Shift) -> Self {
        shift.0
    }
}

impl PartialEq for Shift {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Shift {}

impl PartialOrd for Shift {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Shift {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for Shift {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// One delta hint at a given (axis, ppem, shift) coordinate
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeltaHint {
    pub kind: DeltaKind,
    pub point: Option<u32>,
}

impl DeltaHint {
    /// Fails if `point` is present for DELTAG or missing for any other kind.
    pub fn new(kind: DeltaKind, point: Option<u32>) -> Result<Self> {
        if kind.has_point() != point.is_some() {
            return Err(Error::InvariantViolation("point index does not match delta kind"));
        }
        Ok(Self { kind, point })
    }
}

/// A flattened hint: one occurrence of a delta hint at a grid-fitting condition.
///
/// Field order gives the ascending order used when emitting groups.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HintTuple {
    pub ppem: u32,
    pub shift: Shift,
    pub point: Option<u32>,
    pub kind: DeltaKind,
}

impl HintTuple {
    pub fn new(ppem: u32, shift: impl Into<Shift>, point: Option<u32>, kind: DeltaKind) -> Self {
        Self { ppem, shift: shift.into(), point, kind }
    }
}

/// Shift to the hints applied at that shift
pub type ShiftMap = BTreeMap<Shift, BTreeSet<DeltaHint>>;

/// Ppem to shift map, for one axis
pub type PpemMap = BTreeMap<u32, ShiftMap>;

/// All delta hints of one phase (before or after RTGAH), by axis, ppem and shift.
///
/// Entries are only created by [`PhaseMap::insert`], so there are never
/// empty inner maps and two maps with the same hints compare equal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PhaseMap {
    axes: BTreeMap<Axis, PpemMap>,
}

impl PhaseMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    /// Number of individual hints in the map
    pub fn len(&self) -> usize {
        self.axes
            .values()
            .flat_map(|ppems| ppems.values())
            .flat_map(|shifts| shifts.values())
            .map(BTreeSet::len)
            .sum()
    }

    /// Record a hint, returning `false` if it was already present.
    pub fn insert(
        &mut self,
        axis: Axis,
        ppem: u32,
        shift: impl Into<Shift>,
        kind: DeltaKind,
        point: Option<u32>,
    ) -> Result<bool> {
        let shift = shift.into();
        if shift.to_f64() == 0.0 || !shift.to_f64().is_finite() {
            return Err(Error::InvariantViolation("delta hints need a nonzero finite shift"));
        }
        let hint = DeltaHint::new(kind, point)?;
        Ok(self
            .axes
            .entry(axis)
            .or_default()
            .entry(ppem)
            .or_default()
            .entry(shift)
            .or_default()
            .insert(hint))
    }

    pub fn axis(&self, axis: Axis) -> Option<&PpemMap> {
        self.axes.get(&axis)
    }

    /// Axes present in the map, X before Y
    pub fn axes(&self) -> impl Iterator<Item = (Axis, &PpemMap)> {
        self.axes.iter().map(|(axis, ppems)| (*axis, ppems))
    }

    fn shift_maps(&self) -> impl Iterator<Item = &ShiftMap> {
        self.axes.values().flat_map(|ppems| ppems.values())
    }

    pub fn min_ppem(&self) -> Option<u32> {
        self.axes.values().filter_map(|ppems| ppems.keys().next().copied()).min()
    }

    pub fn min_shift(&self) -> Option<Shift> {
        self.shift_maps().filter_map(|shifts| shifts.keys().next().copied()).min()
    }

    /// Smallest point index; DELTAG hints have none and are ignored.
    pub fn min_point(&self) -> Option<u32> {
        self.shift_maps()
            .flat_map(|shifts| shifts.values())
            .flat_map(|hints| hints.iter().filter_map(|hint| hint.point))
            .min()
    }
}

/// Flatten one axis of a phase map into ascending hint tuples.
pub fn flatten(ppems: &PpemMap) -> Vec<HintTuple> {
    let mut tuples: Vec<HintTuple> = ppems
        .iter()
        .flat_map(|(&ppem, shifts)| {
            shifts.iter().flat_map(move |(&shift, hints)| {
                hints.iter().map(move |hint| HintTuple {
                    ppem,
                    shift,
                    point: hint.point,
                    kind: hint.kind,
                })
            })
        })
        .collect();
    tuples.sort();
    tuples
}

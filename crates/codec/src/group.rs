//! Grouping of one axis' hints into auto-increment runs.
//!
//! Hints sharing two coordinates (then, of what is left, hints sharing one)
//! are gathered greedily, biggest group first. Each group is emitted under
//! the mask that auto-increments its free coordinates, so consecutive hints
//! need no explicit field changes.

use indexmap::IndexMap;
use log::debug;
use std::collections::BTreeSet;

use crate::{
    error::{Error, Result},
    grain::{can_represent, fit_delta_shift},
    opcode::Mask,
    types::{HintTuple, Shift},
};

/// Width of the ppem window one delta base covers (three bands of 16)
pub const DELTA_BASE_STEP: u32 = 48;

/// One coordinate of a group key
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Coord<T> {
    Wildcard,
    Fixed(T),
}

impl<T> Coord<T> {
    pub const fn is_wildcard(&self) -> bool {
        matches!(self, Coord::Wildcard)
    }
}

/// The coordinates a group has in common; wildcards are free to vary.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey {
    pub ppem: Coord<u32>,
    pub shift: Coord<Shift>,
    pub point: Coord<Option<u32>>,
}

impl GroupKey {
    /// The auto-increment mask that walks the wildcarded coordinates
    pub fn mask(&self) -> Mask {
        let mut mask = Mask::NONE;
        if self.ppem.is_wildcard() {
            mask = mask.union(Mask::PPEM);
        }
        if self.point.is_wildcard() {
            mask = mask.union(Mask::POINT);
        }
        if self.shift.is_wildcard() {
            mask = mask.union(Mask::SHIFT);
        }
        mask
    }

    fn doubles(tuple: &HintTuple) -> [Self; 3] {
        use Coord::*;
        [
            Self { ppem: Fixed(tuple.ppem), shift: Fixed(tuple.shift), point: Wildcard },
            Self { ppem: Fixed(tuple.ppem), shift: Wildcard, point: Fixed(tuple.point) },
            Self { ppem: Wildcard, shift: Fixed(tuple.shift), point: Fixed(tuple.point) },
        ]
    }

    fn singles(tuple: &HintTuple) -> [Self; 3] {
        use Coord::*;
        [
            Self { ppem: Fixed(tuple.ppem), shift: Wildcard, point: Wildcard },
            Self { ppem: Wildcard, shift: Wildcard, point: Fixed(tuple.point) },
            Self { ppem: Wildcard, shift: Fixed(tuple.shift), point: Wildcard },
        ]
    }
}

/// An item of the ordered plan the encoder walks
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum GroupMarker {
    Mask(Mask),
    /// Switch to a new delta shift
    Sds(u8),
    /// Switch to a new delta base
    Sdb(u32),
    Hint(HintTuple),
}

type Buckets = IndexMap<GroupKey, BTreeSet<usize>>;

/// Plan the emission order for one axis' hints.
///
/// `delta_shift` is the granularity in effect when the plan starts and
/// `delta_base` the base it starts from and returns to.
pub fn group(
    tuples: impl IntoIterator<Item = HintTuple>,
    delta_shift: u8,
    delta_base: u32,
) -> Result<Vec<GroupMarker>> {
    let tuples: Vec<HintTuple> = tuples.into_iter().collect::<BTreeSet<_>>().into_iter().collect();

    let mut doubles = Buckets::new();
    let mut singles = Buckets::new();
    for (i, tuple) in tuples.iter().enumerate() {
        for key in GroupKey::doubles(tuple) {
            doubles.entry(key).or_default().insert(i);
        }
        for key in GroupKey::singles(tuple) {
            singles.entry(key).or_default().insert(i);
        }
    }

    let mut groups = Vec::new();
    while let Some(group) = take_largest(&mut doubles) {
        remove_members(&mut doubles, &group.1);
        remove_members(&mut singles, &group.1);
        groups.push(group);
    }
    while let Some(group) = take_largest(&mut singles) {
        remove_members(&mut singles, &group.1);
        groups.push(group);
    }
    groups.sort_by(|a, b| a.0.cmp(&b.0));

    let claimed: BTreeSet<usize> =
        groups.iter().flat_map(|(_, members)| members.iter().copied()).collect();
    let leftovers: Vec<usize> = (0..tuples.len()).filter(|i| !claimed.contains(i)).collect();
    debug!(
        "{} hints in {} groups, {} left over",
        tuples.len(),
        groups.len(),
        leftovers.len()
    );

    let mut plan = Vec::with_capacity(tuples.len() + groups.len() + 1);
    for (key, members) in &groups {
        plan.push(GroupMarker::Mask(key.mask()));
        plan.extend(members.iter().map(|&i| GroupMarker::Hint(tuples[i])));
    }
    if !leftovers.is_empty() {
        plan.push(GroupMarker::Mask(Mask::ALL));
        plan.extend(leftovers.iter().map(|&i| GroupMarker::Hint(tuples[i])));
    }

    insert_base_changes(plan, delta_shift, delta_base)
}

/// Remove and return the first bucket of the largest size, if it holds at least two.
fn take_largest(buckets: &mut Buckets) -> Option<(GroupKey, BTreeSet<usize>)> {
    let mut best: Option<(usize, usize)> = None;
    for (index, members) in buckets.values().enumerate() {
        let size = members.len();
        if size >= 2 && best.is_none_or(|(_, best_size)| size > best_size) {
            best = Some((index, size));
        }
    }
    let (index, _) = best?;
    buckets.shift_remove_index(index)
}

fn remove_members(buckets: &mut Buckets, members: &BTreeSet<usize>) {
    for bucket in buckets.values_mut() {
        bucket.retain(|i| !members.contains(i));
    }
}

/// Insert granularity and delta-base changes in front of the hints that need them.
fn insert_base_changes(
    plan: Vec<GroupMarker>,
    delta_shift: u8,
    delta_base: u32,
) -> Result<Vec<GroupMarker>> {
    let mut out = Vec::with_capacity(plan.len());
    let mut ds = delta_shift;
    let mut base = delta_base;
    for marker in plan {
        if let GroupMarker::Hint(tuple) = marker {
            let shift = tuple.shift.to_f64();
            if !can_represent(ds, shift) {
                ds = fit_delta_shift(ds, shift)?;
                out.push(GroupMarker::Sds(ds));
            }
            if tuple.ppem < base {
                base = delta_base;
                out.push(GroupMarker::Sdb(base));
            }
            while tuple.ppem >= base + DELTA_BASE_STEP {
                base += DELTA_BASE_STEP;
                out.push(GroupMarker::Sdb(base));
            }
        }
        out.push(marker);
    }
    if base != delta_base {
        out.push(GroupMarker::Sdb(delta_base));
    }
    Ok(out)
}

/// Number of 48-ppem steps between two delta bases.
pub fn delta_base_steps(from: u32, to: u32) -> Result<u32> {
    let distance = from.abs_diff(to);
    if distance % DELTA_BASE_STEP != 0 {
        return Err(Error::InvariantViolation("delta base change is not a multiple of 48"));
    }
    Ok(distance / DELTA_BASE_STEP)
}

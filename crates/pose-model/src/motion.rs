//! Motion categories and per-frame flag sets.
//!
//! The category list is fixed. A [`MotionSet`] always holds exactly one flag
//! per category, so completeness is guaranteed by the type rather than by
//! checking map keys.

use std::collections::BTreeMap;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// A qualitative movement label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Motion {
    Advancing,
    Retreating,
    Enclosing,
    Spreading,
    Directing,
    Indirecting,
    Gliding,
    Punching,
    Dabbing,
    Flicking,
    Slashing,
    Wringing,
    Pressing,
}

impl Motion {
    /// Number of categories.
    pub const COUNT: usize = 13;

    /// All categories in their fixed log/display order.
    pub const ALL: [Motion; Motion::COUNT] = [
        Motion::Advancing,
        Motion::Retreating,
        Motion::Enclosing,
        Motion::Spreading,
        Motion::Directing,
        Motion::Indirecting,
        Motion::Gliding,
        Motion::Punching,
        Motion::Dabbing,
        Motion::Flicking,
        Motion::Slashing,
        Motion::Wringing,
        Motion::Pressing,
    ];

    /// Position in [`Motion::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Motion::Advancing => "Advancing",
            Motion::Retreating => "Retreating",
            Motion::Enclosing => "Enclosing",
            Motion::Spreading => "Spreading",
            Motion::Directing => "Directing",
            Motion::Indirecting => "Indirecting",
            Motion::Gliding => "Gliding",
            Motion::Punching => "Punching",
            Motion::Dabbing => "Dabbing",
            Motion::Flicking => "Flicking",
            Motion::Slashing => "Slashing",
            Motion::Wringing => "Wringing",
            Motion::Pressing => "Pressing",
        }
    }

    /// Case-insensitive lookup by name.
    pub fn from_name(name: &str) -> Option<Motion> {
        let name = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.name().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for Motion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One boolean per motion category.
///
/// Serializes as an object with all 13 category names as keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "BTreeMap<Motion, bool>", from = "BTreeMap<Motion, bool>")]
pub struct MotionSet([bool; Motion::COUNT]);

impl MotionSet {
    /// All categories false.
    pub const fn empty() -> Self {
        Self([false; Motion::COUNT])
    }

    /// Build from flags in [`Motion::ALL`] order.
    pub const fn from_flags(flags: [bool; Motion::COUNT]) -> Self {
        Self(flags)
    }

    /// Flags in [`Motion::ALL`] order.
    pub fn flags(&self) -> [bool; Motion::COUNT] {
        self.0
    }

    pub fn contains(&self, motion: Motion) -> bool {
        self.0[motion.index()]
    }

    pub fn set(&mut self, motion: Motion, active: bool) {
        self.0[motion.index()] = active;
    }

    pub fn insert(&mut self, motion: Motion) {
        self.set(motion, true);
    }

    /// True when no category is active.
    pub fn is_empty(&self) -> bool {
        !self.0.iter().any(|flag| *flag)
    }

    /// Number of active categories.
    pub fn count(&self) -> usize {
        self.0.iter().filter(|flag| **flag).count()
    }

    /// Active categories in fixed order.
    pub fn active(&self) -> impl Iterator<Item = Motion> + '_ {
        Motion::ALL.iter().copied().filter(|m| self.contains(*m))
    }

    /// Names of active categories in fixed order.
    pub fn labels(&self) -> Vec<&'static str> {
        self.active().map(Motion::name).collect()
    }

    /// `(category, flag)` pairs for all 13 categories.
    pub fn iter(&self) -> impl Iterator<Item = (Motion, bool)> + '_ {
        Motion::ALL.iter().map(|m| (*m, self.contains(*m)))
    }
}

impl FromIterator<Motion> for MotionSet {
    fn from_iter<T: IntoIterator<Item = Motion>>(iter: T) -> Self {
        let mut set = MotionSet::empty();
        for motion in iter {
            set.insert(motion);
        }
        set
    }
}

impl BitOrAssign<&MotionSet> for MotionSet {
    fn bitor_assign(&mut self, rhs: &MotionSet) {
        for (flag, other) in self.0.iter_mut().zip(rhs.0.iter()) {
            *flag |= *other;
        }
    }
}

impl BitOr for MotionSet {
    type Output = MotionSet;

    fn bitor(mut self, rhs: MotionSet) -> MotionSet {
        self |= &rhs;
        self
    }
}

impl From<MotionSet> for BTreeMap<Motion, bool> {
    fn from(set: MotionSet) -> Self {
        set.iter().collect()
    }
}

impl From<BTreeMap<Motion, bool>> for MotionSet {
    fn from(map: BTreeMap<Motion, bool>) -> Self {
        let mut set = MotionSet::empty();
        for (motion, active) in map {
            set.set(motion, active);
        }
        set
    }
}

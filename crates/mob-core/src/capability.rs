use std::ops::{BitOr, BitOrAssign};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Actuator channel that an active goal or behavior owns exclusively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Capability {
    Move,
    Look,
    Jump,
    Target,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::Move,
        Capability::Look,
        Capability::Jump,
        Capability::Target,
    ];

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Set of [`Capability`] flags, packed into one byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CapabilitySet(u8);

impl CapabilitySet {
    pub const EMPTY: Self = Self(0);
    pub const MOVE: Self = Self(Capability::Move.bit());
    pub const LOOK: Self = Self(Capability::Look.bit());
    pub const JUMP: Self = Self(Capability::Jump.bit());
    pub const TARGET: Self = Self(Capability::Target.bit());
    pub const ALL: Self = Self::of(&Capability::ALL);

    pub const fn of(caps: &[Capability]) -> Self {
        let mut bits = 0u8;
        let mut i = 0;
        while i < caps.len() {
            bits |= caps[i].bit();
            i += 1;
        }
        Self(bits)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, cap: Capability) -> bool {
        self.0 & cap.bit() != 0
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    pub fn insert(&mut self, cap: Capability) {
        self.0 |= cap.bit();
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl From<Capability> for CapabilitySet {
    fn from(cap: Capability) -> Self {
        Self(cap.bit())
    }
}

impl BitOr for CapabilitySet {
    type Output = CapabilitySet;

    fn bitor(self, rhs: CapabilitySet) -> CapabilitySet {
        self.union(rhs)
    }
}

impl BitOrAssign for CapabilitySet {
    fn bitor_assign(&mut self, rhs: CapabilitySet) {
        self.0 |= rhs.0;
    }
}

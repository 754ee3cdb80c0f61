//! Per-agent expiring key/value memory.
//!
//! Values are stored under `&'static str` keys and may carry a time-to-live
//! measured in ticks. Owners call [`Blackboard::forget_outdated`] once per tick
//! (brains do this first thing) to age and drop expired entries.

use std::any::Any;
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::marker::PhantomData;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Typed key. The `&'static str` name doubles as the stable identity used for
/// ordering, logs, and persistence.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemKey<T: 'static> {
    name: &'static str,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: 'static> Copy for MemKey<T> {}

impl<T: 'static> Clone for MemKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> MemKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _phantom: PhantomData,
        }
    }

    pub const fn name(self) -> &'static str {
        self.name
    }

    pub const fn erased(self) -> KeyId {
        KeyId(self.name)
    }
}

/// Type-erased key, for declaring reads/writes and status conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyId(pub &'static str);

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl<T: 'static> From<MemKey<T>> for KeyId {
    fn from(key: MemKey<T>) -> Self {
        key.erased()
    }
}

/// Condition a key can be tested against.
///
/// `Registered` passes whenever the key is known to the blackboard, whether or
/// not a live value exists. `Present` requires a live value; `Absent` requires
/// none. Brains validate at build time that every key tested this way is
/// declared, so `Absent` never silently fails on a typo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MemoryStatus {
    Registered,
    Present,
    Absent,
}

struct MemoryEntry {
    value: Box<dyn Any>,
    ttl: Option<u64>,
}

#[derive(Default)]
pub struct Blackboard {
    values: BTreeMap<&'static str, MemoryEntry>,
    registered: BTreeSet<&'static str>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops all live values. Registrations survive.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Declares a key. Registration makes `MemoryStatus::Registered` pass and
    /// allows [`Blackboard::load`] to restore the key.
    pub fn register(&mut self, key: impl Into<KeyId>) {
        self.registered.insert(key.into().0);
    }

    pub fn is_registered(&self, key: impl Into<KeyId>) -> bool {
        let key = key.into();
        self.registered.contains(key.0) || self.values.contains_key(key.0)
    }

    /// Stores a value with no expiry.
    pub fn set<T: 'static>(&mut self, key: MemKey<T>, value: T) {
        self.values.insert(
            key.name,
            MemoryEntry {
                value: Box::new(value),
                ttl: None,
            },
        );
    }

    /// Stores a value that expires after `ttl` sweeps of
    /// [`Blackboard::forget_outdated`]. A ttl of 0 behaves like 1: the value
    /// lives for the remainder of the current tick.
    pub fn set_with_ttl<T: 'static>(&mut self, key: MemKey<T>, value: T, ttl: u64) {
        self.values.insert(
            key.name,
            MemoryEntry {
                value: Box::new(value),
                ttl: Some(ttl),
            },
        );
    }

    pub fn get<T: 'static>(&self, key: MemKey<T>) -> Option<&T> {
        let entry = self.values.get(key.name)?;
        entry.value.downcast_ref::<T>().or_else(|| {
            panic!(
                "blackboard type mismatch for key {:?} (stored type differs from requested)",
                key.name
            )
        })
    }

    pub fn get_mut<T: 'static>(&mut self, key: MemKey<T>) -> Option<&mut T> {
        let entry = self.values.get_mut(key.name)?;
        entry.value.downcast_mut::<T>().or_else(|| {
            panic!(
                "blackboard type mismatch for key {:?} (stored type differs from requested)",
                key.name
            )
        })
    }

    pub fn erase<T: 'static>(&mut self, key: MemKey<T>) -> Option<T> {
        let entry = self.values.remove(key.name)?;
        entry.value.downcast::<T>().map(|b| *b).ok().or_else(|| {
            panic!(
                "blackboard type mismatch for key {:?} (stored type differs from requested)",
                key.name
            )
        })
    }

    /// Removes a value without naming its type.
    pub fn erase_erased(&mut self, key: impl Into<KeyId>) {
        self.values.remove(key.into().0);
    }

    pub fn has(&self, key: impl Into<KeyId>) -> bool {
        self.values.contains_key(key.into().0)
    }

    pub fn has_all_of(&self, keys: &[KeyId]) -> bool {
        keys.iter().all(|k| self.has(*k))
    }

    pub fn has_any_of(&self, keys: &[KeyId]) -> bool {
        keys.iter().any(|k| self.has(*k))
    }

    /// Remaining sweeps before the value under `key` expires, if it has a ttl.
    pub fn ttl(&self, key: impl Into<KeyId>) -> Option<u64> {
        self.values.get(key.into().0)?.ttl
    }

    pub fn check(&self, key: impl Into<KeyId>, status: MemoryStatus) -> bool {
        let key = key.into();
        match status {
            MemoryStatus::Registered => self.is_registered(key),
            MemoryStatus::Present => self.has(key),
            MemoryStatus::Absent => !self.has(key),
        }
    }

    pub fn check_all(&self, conditions: &[(KeyId, MemoryStatus)]) -> bool {
        conditions.iter().all(|(k, s)| self.check(*k, *s))
    }

    /// Ages every ttl-carrying value by one tick and drops the expired ones.
    ///
    /// A value stored with ttl `n` on tick `t` (after that tick's sweep) stays
    /// visible through tick `t + n - 1` and is gone from tick `t + n` on.
    pub fn forget_outdated(&mut self) {
        self.values.retain(|_, entry| match entry.ttl.as_mut() {
            None => true,
            Some(t) => {
                *t = t.saturating_sub(1);
                *t > 0
            }
        });
    }

    /// Snapshots live values through a caller-supplied encoder.
    ///
    /// The encoder decides which entries persist (return `None` to skip one,
    /// e.g. for values holding handles) and how to represent them. Entries come
    /// out sorted by key name.
    pub fn save<V>(&self, mut saver: impl FnMut(KeyId, &dyn Any) -> Option<V>) -> BlackboardState<V> {
        let mut entries = Vec::new();
        for (&name, entry) in &self.values {
            if let Some(value) = saver(KeyId(name), entry.value.as_ref()) {
                entries.push(MemoryEntryState {
                    key: Cow::Borrowed(name),
                    value,
                    ttl: entry.ttl,
                });
            }
        }
        BlackboardState { entries }
    }

    /// Replaces live values from a snapshot through a caller-supplied decoder.
    ///
    /// Only registered keys are restored; unknown keys in the snapshot are
    /// skipped, as are entries the decoder returns `None` for.
    pub fn load<V>(
        &mut self,
        state: &BlackboardState<V>,
        mut loader: impl FnMut(KeyId, &V) -> Option<Box<dyn Any>>,
    ) {
        self.values.clear();
        for saved in &state.entries {
            let Some(name) = self.registered.get(saved.key.as_ref()).copied() else {
                continue;
            };
            if let Some(value) = loader(KeyId(name), &saved.value) {
                self.values.insert(
                    name,
                    MemoryEntry {
                        value,
                        ttl: saved.ttl,
                    },
                );
            }
        }
    }
}

/// One persisted memory entry; `V` is the caller's serializable value type.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MemoryEntryState<V> {
    pub key: Cow<'static, str>,
    pub value: V,
    pub ttl: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BlackboardState<V> {
    pub entries: Vec<MemoryEntryState<V>>,
}

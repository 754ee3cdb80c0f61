use std::fmt;

use mob_core::{KeyId, MemoryStatus, WorldMut};

use crate::behavior::{Behavior, BehaviorKey};

/// Stable name for an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActivityId(pub &'static str);

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Named group of behaviors plus the memory conditions under which the group
/// is eligible for selection.
///
/// Core activities ignore the eligibility conditions: their behaviors are
/// always candidates. For selectable activities, the brain picks the first
/// eligible one in declaration order each tick, falling back to the declared
/// default.
pub struct Activity<W>
where
    W: WorldMut + 'static,
{
    pub(crate) id: ActivityId,
    pub(crate) requirements: Vec<(KeyId, MemoryStatus)>,
    pub(crate) erase_when_stopped: Vec<KeyId>,
    pub(crate) behaviors: Vec<(u32, BehaviorKey, Box<dyn Behavior<W>>)>,
}

impl<W> Activity<W>
where
    W: WorldMut + 'static,
{
    pub fn new(id: ActivityId) -> Self {
        Self {
            id,
            requirements: Vec::new(),
            erase_when_stopped: Vec::new(),
            behaviors: Vec::new(),
        }
    }

    pub fn id(&self) -> ActivityId {
        self.id
    }

    /// Adds an eligibility condition. All conditions must hold for the
    /// activity to be selectable.
    pub fn require(mut self, key: impl Into<KeyId>, status: MemoryStatus) -> Self {
        self.requirements.push((key.into(), status));
        self
    }

    /// Marks a key to erase from the blackboard when this activity stops
    /// being the selected one, for scratch state that must not leak into the
    /// next activity.
    pub fn erase_when_stopped(mut self, key: impl Into<KeyId>) -> Self {
        self.erase_when_stopped.push(key.into());
        self
    }

    /// Adds a behavior at a priority. Ties are legal; among equal priorities,
    /// declaration order decides who is asked first.
    pub fn behavior(mut self, priority: u32, key: BehaviorKey, behavior: impl Behavior<W>) -> Self {
        self.behaviors.push((priority, key, Box::new(behavior)));
        self
    }
}

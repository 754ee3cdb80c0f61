use std::fmt;

use mob_core::{
    Blackboard, CapabilitySet, DeterministicRng, KeyId, MemoryStatus, TickContext, WorldMut,
};

/// Stable name for a behavior within its activity, used in logs and saved
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BehaviorKey(pub &'static str);

impl fmt::Display for BehaviorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Run-duration budget in ticks, drawn once each time a behavior starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationRange {
    min: u64,
    max: u64,
}

/// Budget used when [`Behavior::run_for`] is not overridden.
pub const DEFAULT_RUN_TICKS: u64 = 60;

impl DurationRange {
    pub const fn fixed(ticks: u64) -> Self {
        Self {
            min: ticks,
            max: ticks,
        }
    }

    pub const fn between(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    pub(crate) fn sample(self, rng: &mut impl DeterministicRng) -> u64 {
        let (min, max) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        let span = max - min;
        if span == 0 {
            min
        } else if span == u64::MAX {
            // span + 1 would wrap; here every u64 is a legal draw.
            rng.next_u64()
        } else {
            min + rng.next_below(span + 1)
        }
    }
}

impl Default for DurationRange {
    fn default() -> Self {
        Self::fixed(DEFAULT_RUN_TICKS)
    }
}

/// One memory-gated, time-budgeted behavior inside an [`Activity`](crate::Activity).
///
/// The brain starts a behavior when its activity is active, its
/// [`preconditions`](Behavior::preconditions) hold on the blackboard,
/// [`check_extra_start_conditions`](Behavior::check_extra_start_conditions)
/// passes, and it wins arbitration over its claimed capabilities. It stops the
/// behavior when any precondition stops holding, when
/// [`can_still_use`](Behavior::can_still_use) says no, or when the duration
/// budget runs out, whichever comes first. A precondition invalidated mid-run
/// tears the behavior down at the next tick boundary, never mid-tick.
pub trait Behavior<W>: 'static
where
    W: WorldMut + 'static,
{
    /// Memory conditions that must hold for the behavior to start and to keep
    /// running. Fixed for the behavior's lifetime; the brain caches them at
    /// registration.
    fn preconditions(&self) -> Vec<(KeyId, MemoryStatus)> {
        Vec::new()
    }

    /// Capability flags owned while running. Most brain behaviors claim
    /// nothing and co-run freely; claim flags only for actuator-level
    /// exclusion.
    fn claims(&self) -> CapabilitySet {
        CapabilitySet::EMPTY
    }

    /// Budget drawn at each start. The brain force-stops the behavior when it
    /// runs out, even if `can_still_use` still says yes.
    fn run_for(&self) -> DurationRange {
        DurationRange::default()
    }

    /// Keys this behavior may write, for build-time schema validation.
    fn writes(&self) -> Vec<KeyId> {
        Vec::new()
    }

    /// World-dependent start check, consulted after memory preconditions.
    fn check_extra_start_conditions(
        &mut self,
        _ctx: &TickContext,
        _agent: W::Agent,
        _world: &W,
        _blackboard: &Blackboard,
    ) -> bool {
        true
    }

    /// Whether a running behavior wants to keep going. Defaults to one-shot:
    /// the behavior runs for a single tick unless this is overridden.
    fn can_still_use(
        &mut self,
        _ctx: &TickContext,
        _agent: W::Agent,
        _world: &W,
        _blackboard: &Blackboard,
    ) -> bool {
        false
    }

    fn start(
        &mut self,
        _ctx: &TickContext,
        _agent: W::Agent,
        _world: &mut W,
        _blackboard: &mut Blackboard,
    ) {
    }

    fn tick(
        &mut self,
        _ctx: &TickContext,
        _agent: W::Agent,
        _world: &mut W,
        _blackboard: &mut Blackboard,
    ) {
    }

    fn stop(
        &mut self,
        _ctx: &TickContext,
        _agent: W::Agent,
        _world: &mut W,
        _blackboard: &mut Blackboard,
    ) {
    }
}

use std::fmt;

use mob_core::{CapabilitySet, TickContext, WorldMut};

/// Stable name for a goal, used in logs and saved state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GoalKey(pub &'static str);

impl fmt::Display for GoalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// How often an idle goal's `can_start` probe actually runs.
///
/// `OneIn(n)` draws from the per-agent stream RNG, so a probe that would be
/// expensive every tick fires on average once every `n` ticks while staying
/// reproducible for a given simulation seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeSampling {
    EveryTick,
    OneIn(u32),
}

/// One candidate behavior in a [`GoalSelector`](crate::GoalSelector) pool.
///
/// Probes (`can_start`, `can_continue`) take `&W` and must not mutate the
/// world; lifecycle callbacks (`start`, `tick`, `stop`) get `&mut W` to file
/// actuator requests. All callbacks must return within the tick; goals poll
/// long-running work, they never wait for it.
pub trait Goal<W>: 'static
where
    W: WorldMut + 'static,
{
    /// Capability flags this goal owns while running. Fixed for the goal's
    /// lifetime; the selector caches the value at registration.
    fn flags(&self) -> CapabilitySet;

    fn can_start(&mut self, ctx: &TickContext, agent: W::Agent, world: &W) -> bool;

    /// Whether a running goal may keep running. Defaults to re-asking
    /// `can_start`.
    fn can_continue(&mut self, ctx: &TickContext, agent: W::Agent, world: &W) -> bool {
        self.can_start(ctx, agent, world)
    }

    fn start(&mut self, _ctx: &TickContext, _agent: W::Agent, _world: &mut W) {}

    fn tick(&mut self, _ctx: &TickContext, _agent: W::Agent, _world: &mut W) {}

    fn stop(&mut self, _ctx: &TickContext, _agent: W::Agent, _world: &mut W) {}

    /// Opts out of the selector's reduced continuation cadence; the goal is
    /// re-evaluated every simulation tick.
    fn requires_update_every_tick(&self) -> bool {
        false
    }

    /// A running goal that reports `false` here keeps its flags even against a
    /// higher-priority challenger, until it yields on its own.
    fn interruptible(&self) -> bool {
        true
    }

    fn probe_sampling(&self) -> ProbeSampling {
        ProbeSampling::EveryTick
    }
}

use std::borrow::Cow;

use mob_core::{CapabilitySet, DeterministicRng, TickContext, WorldMut};
use mob_tools::{TraceEvent, TraceSink};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::goal::{Goal, GoalKey, ProbeSampling};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalSelectorConfig {
    /// Re-evaluate running goals' continuation every this many ticks; between
    /// rechecks a running goal keeps its claim without being probed. Goals
    /// reporting `requires_update_every_tick` are probed every tick anyway.
    /// `0` and `1` both mean every tick.
    pub recheck_interval: u32,
}

impl Default for GoalSelectorConfig {
    fn default() -> Self {
        Self {
            recheck_interval: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Undecided,
    Keep,
    Drop,
}

struct GoalEntry<W>
where
    W: WorldMut + 'static,
{
    key: GoalKey,
    priority: u32,
    seq: u64,
    flags: CapabilitySet,
    running: bool,
    decision: Decision,
    goal: Box<dyn Goal<W>>,
}

/// Flat priority arbiter: one per decision subsystem per agent.
///
/// Each tick the selector builds the set of goals that get to run. Running
/// non-interruptible goals claim their flags first; everything else is visited
/// in priority order (lower number first, ties by registration order), and a
/// goal survives only if its flags are disjoint from everything already
/// claimed. Losers are stopped, newcomers started, and every survivor ticked,
/// all in priority order.
pub struct GoalSelector<W>
where
    W: WorldMut + 'static,
{
    pub agent: W::Agent,
    pub config: GoalSelectorConfig,
    entries: Vec<GoalEntry<W>>,
    disabled: CapabilitySet,
    trace: Option<Box<dyn TraceSink>>,
    next_seq: u64,
}

impl<W> GoalSelector<W>
where
    W: WorldMut + 'static,
{
    pub fn new(agent: W::Agent) -> Self {
        Self::with_config(agent, GoalSelectorConfig::default())
    }

    pub fn with_config(agent: W::Agent, config: GoalSelectorConfig) -> Self {
        Self {
            agent,
            config,
            entries: Vec::new(),
            disabled: CapabilitySet::EMPTY,
            trace: None,
            next_seq: 0,
        }
    }

    /// Registers a goal at a priority. Ties are legal; among equal priorities,
    /// registration order decides who is asked first. Keys name goals in
    /// traces and saved state, so registering one twice panics: a restore
    /// naming a shared key would mark every holder running at once.
    pub fn add(&mut self, priority: u32, key: GoalKey, goal: impl Goal<W>) {
        assert!(
            self.entries.iter().all(|e| e.key != key),
            "goal key {:?} is already registered",
            key.0
        );
        let flags = goal.flags();
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(GoalEntry {
            key,
            priority,
            seq,
            flags,
            running: false,
            decision: Decision::Undecided,
            goal: Box::new(goal),
        });
        // Stable sort keeps registration order among equal priorities.
        self.entries.sort_by_key(|e| e.priority);
    }

    /// Removes a goal, stopping it first if it is running. Returns whether the
    /// key was present.
    pub fn remove(&mut self, key: GoalKey, ctx: &TickContext, world: &mut W) -> bool {
        let Some(idx) = self.entries.iter().position(|e| e.key == key) else {
            return false;
        };
        let mut entry = self.entries.remove(idx);
        if entry.running {
            entry.goal.stop(ctx, self.agent, world);
            if let Some(sink) = self.trace.as_deref_mut() {
                sink.emit(
                    TraceEvent::new(ctx.tick, "goal.stop")
                        .with_a(idx as u64)
                        .with_b(u64::from(entry.priority)),
                );
            }
        }
        true
    }

    /// Administratively blocks flags: running owners are stopped at the next
    /// tick and idle goals needing them cannot start, until re-enabled.
    pub fn disable_flags(&mut self, flags: CapabilitySet) {
        self.disabled |= flags;
    }

    pub fn enable_flags(&mut self, flags: CapabilitySet) {
        self.disabled = self.disabled.without(flags);
    }

    pub fn disabled_flags(&self) -> CapabilitySet {
        self.disabled
    }

    pub fn is_running(&self, key: GoalKey) -> bool {
        self.entries.iter().any(|e| e.key == key && e.running)
    }

    pub fn running_goals(&self) -> impl Iterator<Item = GoalKey> + '_ {
        self.entries.iter().filter(|e| e.running).map(|e| e.key)
    }

    pub fn set_trace_sink(&mut self, sink: impl TraceSink + 'static) {
        self.trace = Some(Box::new(sink));
    }

    pub fn tick(&mut self, ctx: &TickContext, world: &mut W) {
        let recheck_due = self.config.recheck_interval <= 1
            || ctx.tick % u64::from(self.config.recheck_interval) == 0;
        let mut claimed = self.disabled;

        // Running non-interruptible goals claim first; nothing outranks them.
        for entry in self.entries.iter_mut() {
            entry.decision = Decision::Undecided;
            if !entry.running || entry.goal.interruptible() {
                continue;
            }
            let evicted = entry.flags.intersects(self.disabled);
            let due = recheck_due || entry.goal.requires_update_every_tick();
            let keep = !evicted
                && (!due || entry.goal.can_continue(ctx, self.agent, &*world))
                && !entry.flags.intersects(claimed);
            if keep {
                claimed |= entry.flags;
                entry.decision = Decision::Keep;
            } else {
                entry.decision = Decision::Drop;
            }
        }

        // Priority pass over everything else. Flags are checked before probes,
        // so a blocked candidate is not even sampled this tick.
        for entry in self.entries.iter_mut() {
            if entry.decision != Decision::Undecided {
                continue;
            }
            if entry.flags.intersects(claimed) {
                entry.decision = Decision::Drop;
                continue;
            }
            let keep = if entry.running {
                let due = recheck_due || entry.goal.requires_update_every_tick();
                !due || entry.goal.can_continue(ctx, self.agent, &*world)
            } else {
                Self::probe_due(ctx, self.agent, entry)
                    && entry.goal.can_start(ctx, self.agent, &*world)
            };
            if keep {
                claimed |= entry.flags;
                entry.decision = Decision::Keep;
            } else {
                entry.decision = Decision::Drop;
            }
        }

        // Stop losers, then start newcomers, then tick every survivor.
        for (idx, entry) in self.entries.iter_mut().enumerate() {
            if entry.running && entry.decision == Decision::Drop {
                entry.goal.stop(ctx, self.agent, world);
                entry.running = false;
                if let Some(sink) = self.trace.as_deref_mut() {
                    sink.emit(
                        TraceEvent::new(ctx.tick, "goal.stop")
                            .with_a(idx as u64)
                            .with_b(u64::from(entry.priority)),
                    );
                }
            }
        }
        for (idx, entry) in self.entries.iter_mut().enumerate() {
            if !entry.running && entry.decision == Decision::Keep {
                entry.goal.start(ctx, self.agent, world);
                entry.running = true;
                if let Some(sink) = self.trace.as_deref_mut() {
                    sink.emit(
                        TraceEvent::new(ctx.tick, "goal.start")
                            .with_a(idx as u64)
                            .with_b(u64::from(entry.priority)),
                    );
                }
            }
        }
        for entry in self.entries.iter_mut() {
            if entry.running {
                entry.goal.tick(ctx, self.agent, world);
            }
        }
    }

    fn probe_due(ctx: &TickContext, agent: W::Agent, entry: &GoalEntry<W>) -> bool {
        match entry.goal.probe_sampling() {
            ProbeSampling::EveryTick => true,
            ProbeSampling::OneIn(n) => {
                let n = u64::from(n.max(1));
                ctx.sampling_rng(agent, entry.seq).next_below(n) == 0
            }
        }
    }

    /// Snapshot of which goals are running, by key name.
    pub fn state(&self) -> GoalSelectorState {
        GoalSelectorState {
            running: self
                .entries
                .iter()
                .filter(|e| e.running)
                .map(|e| Cow::Borrowed(e.key.0))
                .collect(),
        }
    }

    /// Marks goals running without invoking `start`, for resuming a saved
    /// agent. Names that match no registered goal are ignored.
    pub fn restore(&mut self, state: &GoalSelectorState) {
        for entry in self.entries.iter_mut() {
            entry.running = state.running.iter().any(|name| name.as_ref() == entry.key.0);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GoalSelectorState {
    pub running: Vec<Cow<'static, str>>,
}

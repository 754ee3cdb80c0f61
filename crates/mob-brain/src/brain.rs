use std::any::Any;
use std::borrow::Cow;
use std::collections::BTreeSet;

use mob_core::{
    AgentId, Blackboard, BlackboardState, CapabilitySet, KeyId, MemoryStatus, TickContext, WorldMut,
};
use mob_tools::{emit, TraceEvent};
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::activity::{Activity, ActivityId};
use crate::behavior::{Behavior, BehaviorKey, DurationRange};
use crate::sensor::Sensor;

/// Construction-time wiring error. Brains fail fast on these instead of
/// letting a typo'd key or id silently never match at runtime.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BrainError {
    #[error("activity `{0}` is declared twice")]
    DuplicateActivity(ActivityId),

    #[error("behavior `{key}` is declared twice in activity `{activity}`")]
    DuplicateBehavior {
        activity: ActivityId,
        key: BehaviorKey,
    },

    #[error("default activity `{0}` is not a declared selectable activity")]
    UnknownDefaultActivity(ActivityId),

    #[error("no default activity declared")]
    MissingDefaultActivity,

    #[error("memory key `{key}` used by `{user}` is not in the agent's schema (never written by a sensor or behavior, never registered)")]
    UndeclaredMemory { user: &'static str, key: KeyId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Drop,
    Keep,
    Start,
}

struct SensorSlot<W>
where
    W: WorldMut + 'static,
{
    every: u32,
    offset: u32,
    sensor: Box<dyn Sensor<W>>,
}

struct BehaviorSlot<W>
where
    W: WorldMut + 'static,
{
    activity: ActivityId,
    core: bool,
    key: BehaviorKey,
    priority: u32,
    seq: u64,
    preconditions: Vec<(KeyId, MemoryStatus)>,
    claims: CapabilitySet,
    run_for: DurationRange,
    /// `Some(n)` while running with `n` budget ticks left.
    remaining: Option<u64>,
    decision: Decision,
    behavior: Box<dyn Behavior<W>>,
}

struct ActivityDef {
    id: ActivityId,
    core: bool,
    requirements: Vec<(KeyId, MemoryStatus)>,
    erase_when_stopped: Vec<KeyId>,
}

/// Sensor/memory/activity scheduler: one per agent.
///
/// Tick order is fixed: expired memories are swept, due sensors fire in
/// registration order, the selectable activity is elected, then behaviors go
/// through the same stop/start/tick arbitration goals do. Running behaviors
/// from a deselected activity are not force-stopped; they keep ticking until
/// their own continuation fails or their budget runs out.
pub struct Brain<W>
where
    W: WorldMut + 'static,
{
    pub agent: W::Agent,
    pub blackboard: Blackboard,
    sensors: Vec<SensorSlot<W>>,
    activities: Vec<ActivityDef>,
    slots: Vec<BehaviorSlot<W>>,
    active: ActivityId,
    default_activity: ActivityId,
}

impl<W> Brain<W>
where
    W: WorldMut + 'static,
{
    pub fn builder(agent: W::Agent) -> BrainBuilder<W> {
        BrainBuilder::new(agent)
    }

    pub fn active_activity(&self) -> ActivityId {
        self.active
    }

    pub fn is_active(&self, id: ActivityId) -> bool {
        self.active == id
    }

    pub fn is_behavior_running(&self, activity: ActivityId, key: BehaviorKey) -> bool {
        self.slots
            .iter()
            .any(|s| s.activity == activity && s.key == key && s.remaining.is_some())
    }

    pub fn running_behaviors(&self) -> impl Iterator<Item = (ActivityId, BehaviorKey)> + '_ {
        self.slots
            .iter()
            .filter(|s| s.remaining.is_some())
            .map(|s| (s.activity, s.key))
    }

    pub fn tick(&mut self, ctx: &TickContext, world: &mut W) {
        self.blackboard.forget_outdated();

        for slot in self.sensors.iter_mut() {
            if (ctx.tick + u64::from(slot.offset)) % u64::from(slot.every) == 0 {
                slot.sensor
                    .sense(ctx, self.agent, &*world, &mut self.blackboard);
            }
        }

        self.select_activity(ctx);
        self.run_behaviors(ctx, world);
    }

    /// First eligible selectable activity in declaration order wins; the
    /// default is the unconditional fallback and is never tested as a
    /// candidate.
    fn select_activity(&mut self, ctx: &TickContext) {
        let mut selected = self.default_activity;
        for def in &self.activities {
            if def.core || def.id == self.default_activity {
                continue;
            }
            if self.blackboard.check_all(&def.requirements) {
                selected = def.id;
                break;
            }
        }
        if selected == self.active {
            return;
        }

        let previous = self.active;
        if let Some(old) = self.activities.iter().find(|d| d.id == previous) {
            for key in &old.erase_when_stopped {
                self.blackboard.erase_erased(*key);
            }
        }
        self.active = selected;

        let a = self.activity_index(selected);
        let b = self.activity_index(previous);
        emit(
            &mut self.blackboard,
            TraceEvent::new(ctx.tick, "brain.activity").with_a(a).with_b(b),
        );
    }

    fn activity_index(&self, id: ActivityId) -> u64 {
        self.activities
            .iter()
            .position(|d| d.id == id)
            .map(|i| i as u64)
            .unwrap_or(u64::MAX)
    }

    fn run_behaviors(&mut self, ctx: &TickContext, world: &mut W) {
        let selected = self.active;
        let agent = self.agent;
        let mut claimed = CapabilitySet::EMPTY;

        // Decide survivors in priority order. Running behaviors stop on budget
        // exhaustion, lost claims, broken preconditions, or their own say-so,
        // checked in that order; deselection alone never stops them.
        {
            let bb = &self.blackboard;
            for slot in self.slots.iter_mut() {
                slot.decision = Decision::Drop;
                match slot.remaining {
                    Some(remaining) => {
                        let keep = remaining > 0
                            && !slot.claims.intersects(claimed)
                            && bb.check_all(&slot.preconditions)
                            && slot.behavior.can_still_use(ctx, agent, &*world, bb);
                        if keep {
                            claimed |= slot.claims;
                            slot.decision = Decision::Keep;
                        }
                    }
                    None => {
                        if !(slot.core || slot.activity == selected) {
                            continue;
                        }
                        if slot.claims.intersects(claimed) {
                            continue;
                        }
                        if !bb.check_all(&slot.preconditions) {
                            continue;
                        }
                        if !slot
                            .behavior
                            .check_extra_start_conditions(ctx, agent, &*world, bb)
                        {
                            continue;
                        }
                        claimed |= slot.claims;
                        slot.decision = Decision::Start;
                    }
                }
            }
        }

        // Stop losers.
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            if slot.remaining.is_none() || slot.decision != Decision::Drop {
                continue;
            }
            let timed_out = slot.remaining == Some(0);
            slot.behavior.stop(ctx, agent, world, &mut self.blackboard);
            slot.remaining = None;
            let tag = if timed_out {
                "brain.behavior.timeout"
            } else {
                "brain.behavior.stop"
            };
            emit(
                &mut self.blackboard,
                TraceEvent::new(ctx.tick, tag).with_a(idx as u64),
            );
        }

        // Start newcomers, each with a freshly drawn budget.
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            if slot.decision != Decision::Start {
                continue;
            }
            let budget = slot.run_for.sample(&mut ctx.sampling_rng(agent, slot.seq));
            slot.behavior.start(ctx, agent, world, &mut self.blackboard);
            slot.remaining = Some(budget);
            emit(
                &mut self.blackboard,
                TraceEvent::new(ctx.tick, "brain.behavior.start")
                    .with_a(idx as u64)
                    .with_b(budget),
            );
        }

        // Tick every survivor and spend one budget tick.
        for slot in self.slots.iter_mut() {
            if slot.remaining.is_some() {
                slot.behavior.tick(ctx, agent, world, &mut self.blackboard);
            }
            if let Some(remaining) = slot.remaining.as_mut() {
                *remaining = remaining.saturating_sub(1);
            }
        }
    }

    /// Minimal state to resume deterministically: active activity, running
    /// behaviors with remaining budgets, and memories with remaining expiry.
    pub fn state<V>(&self, saver: impl FnMut(KeyId, &dyn Any) -> Option<V>) -> BrainState<V> {
        BrainState {
            activity: Cow::Borrowed(self.active.0),
            behaviors: self
                .slots
                .iter()
                .filter_map(|s| {
                    s.remaining.map(|remaining| BehaviorSlotState {
                        activity: Cow::Borrowed(s.activity.0),
                        key: Cow::Borrowed(s.key.0),
                        remaining,
                    })
                })
                .collect(),
            memory: self.blackboard.save(saver),
        }
    }

    /// Restores a snapshot without invoking any `start` callback; restored
    /// behaviors resume with their saved budgets at the next tick. A saved
    /// activity that no longer exists falls back to the default; saved
    /// behaviors that match no slot are dropped.
    pub fn restore<V>(
        &mut self,
        state: &BrainState<V>,
        loader: impl FnMut(KeyId, &V) -> Option<Box<dyn Any>>,
    ) {
        self.blackboard.load(&state.memory, loader);
        self.active = self
            .activities
            .iter()
            .map(|d| d.id)
            .find(|id| id.0 == state.activity.as_ref())
            .unwrap_or(self.default_activity);
        for slot in self.slots.iter_mut() {
            slot.remaining = state
                .behaviors
                .iter()
                .find(|b| b.activity.as_ref() == slot.activity.0 && b.key.as_ref() == slot.key.0)
                .map(|b| b.remaining);
        }
    }
}

/// Ticks a set of brains in stable agent order, so a herd stays deterministic
/// no matter how the caller stores them.
pub fn tick_brains<W>(ctx: &TickContext, world: &mut W, brains: &mut [Brain<W>])
where
    W: WorldMut + 'static,
{
    brains.sort_by_key(|b| b.agent.stable_id());
    for brain in brains.iter_mut() {
        brain.tick(ctx, world);
    }
}

/// Assembles and validates a [`Brain`].
pub struct BrainBuilder<W>
where
    W: WorldMut + 'static,
{
    agent: W::Agent,
    sensors: Vec<SensorSlot<W>>,
    activities: Vec<ActivityDef>,
    slots: Vec<BehaviorSlot<W>>,
    schema: BTreeSet<&'static str>,
    default_activity: Option<ActivityId>,
    next_seq: u64,
}

impl<W> BrainBuilder<W>
where
    W: WorldMut + 'static,
{
    pub fn new(agent: W::Agent) -> Self {
        Self {
            agent,
            sensors: Vec::new(),
            activities: Vec::new(),
            slots: Vec::new(),
            schema: BTreeSet::new(),
            default_activity: None,
            next_seq: 0,
        }
    }

    /// Registers a sensor. Sensing phase is staggered by agent id so herds
    /// sharing a cadence do not all sense on the same tick.
    pub fn sensor(mut self, sensor: impl Sensor<W>) -> Self {
        let every = sensor.interval().max(1);
        let offset = (self.agent.stable_id() % u64::from(every)) as u32;
        for key in sensor.writes() {
            self.schema.insert(key.0);
        }
        self.sensors.push(SensorSlot {
            every,
            offset,
            sensor: Box::new(sensor),
        });
        self
    }

    /// Declares a key no sensor or behavior writes, e.g. one filled in by the
    /// surrounding simulation.
    pub fn register_memory(mut self, key: impl Into<KeyId>) -> Self {
        self.schema.insert(key.into().0);
        self
    }

    /// Adds an always-active activity; its eligibility conditions are ignored.
    pub fn core_activity(self, activity: Activity<W>) -> Self {
        self.push_activity(activity, true)
    }

    /// Adds a selectable activity. Declaration order is candidate priority.
    pub fn activity(self, activity: Activity<W>) -> Self {
        self.push_activity(activity, false)
    }

    /// Names the fallback activity, selected whenever no candidate is
    /// eligible. Required, and must refer to a selectable activity.
    pub fn default_activity(mut self, id: ActivityId) -> Self {
        self.default_activity = Some(id);
        self
    }

    fn push_activity(mut self, activity: Activity<W>, core: bool) -> Self {
        let Activity {
            id,
            requirements,
            erase_when_stopped,
            behaviors,
        } = activity;
        self.activities.push(ActivityDef {
            id,
            core,
            requirements,
            erase_when_stopped,
        });
        for (priority, key, behavior) in behaviors {
            let preconditions = behavior.preconditions();
            let claims = behavior.claims();
            let run_for = behavior.run_for();
            for written in behavior.writes() {
                self.schema.insert(written.0);
            }
            let seq = self.next_seq;
            self.next_seq += 1;
            self.slots.push(BehaviorSlot {
                activity: id,
                core,
                key,
                priority,
                seq,
                preconditions,
                claims,
                run_for,
                remaining: None,
                decision: Decision::Drop,
                behavior,
            });
        }
        self
    }

    pub fn build(self) -> Result<Brain<W>, BrainError> {
        let BrainBuilder {
            agent,
            sensors,
            activities,
            mut slots,
            schema,
            default_activity,
            next_seq: _,
        } = self;

        for (i, def) in activities.iter().enumerate() {
            if activities[..i].iter().any(|d| d.id == def.id) {
                return Err(BrainError::DuplicateActivity(def.id));
            }
        }
        for (i, slot) in slots.iter().enumerate() {
            if slots[..i]
                .iter()
                .any(|s| s.activity == slot.activity && s.key == slot.key)
            {
                return Err(BrainError::DuplicateBehavior {
                    activity: slot.activity,
                    key: slot.key,
                });
            }
        }

        let default_activity = default_activity.ok_or(BrainError::MissingDefaultActivity)?;
        if !activities
            .iter()
            .any(|d| d.id == default_activity && !d.core)
        {
            return Err(BrainError::UnknownDefaultActivity(default_activity));
        }

        for slot in &slots {
            for (key, _) in &slot.preconditions {
                if !schema.contains(key.0) {
                    return Err(BrainError::UndeclaredMemory {
                        user: slot.key.0,
                        key: *key,
                    });
                }
            }
        }
        for def in &activities {
            for (key, _) in &def.requirements {
                if !schema.contains(key.0) {
                    return Err(BrainError::UndeclaredMemory {
                        user: def.id.0,
                        key: *key,
                    });
                }
            }
            for key in &def.erase_when_stopped {
                if !schema.contains(key.0) {
                    return Err(BrainError::UndeclaredMemory {
                        user: def.id.0,
                        key: *key,
                    });
                }
            }
        }

        // Stable sort keeps declaration order among equal priorities.
        slots.sort_by_key(|s| s.priority);

        let mut blackboard = Blackboard::new();
        for &name in &schema {
            blackboard.register(KeyId(name));
        }

        Ok(Brain {
            agent,
            blackboard,
            sensors,
            activities,
            slots,
            active: default_activity,
            default_activity,
        })
    }
}

/// One running behavior's saved identity and remaining budget.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BehaviorSlotState {
    pub activity: Cow<'static, str>,
    pub key: Cow<'static, str>,
    pub remaining: u64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BrainState<V> {
    pub activity: Cow<'static, str>,
    pub behaviors: Vec<BehaviorSlotState>,
    pub memory: BlackboardState<V>,
}

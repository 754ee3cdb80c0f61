use std::collections::BTreeMap;

use mob::brain::{Activity, ActivityId, Behavior, BehaviorKey, Brain, DurationRange, Sensor};
use mob::core::{
    Blackboard, CapabilitySet, KeyId, MemKey, MemoryStatus, MobWorldMut, MobWorldView, TickContext,
    Vec3, WorldMut, WorldView,
};
use mob::goal::{Goal, GoalKey, GoalSelector, ProbeSampling};
use mob::tools::{TraceLog, TRACE_LOG};

const HUNGRY: MemKey<()> = MemKey::new("hungry");
const PREDATOR_NEAR: MemKey<u64> = MemKey::new("predator.near");

const GRAZE: ActivityId = ActivityId("graze");
const PANIC: ActivityId = ActivityId("panic");

#[derive(Default)]
struct Meadow {
    positions: BTreeMap<u64, Vec3>,
    predator: Option<u64>,
    hunger: u32,
    bleats: u32,
    move_request: Option<(u64, Vec3, f32)>,
    look_request: Option<(u64, Vec3)>,
}

impl WorldView for Meadow {
    type Agent = u64;
}

impl WorldMut for Meadow {}

impl MobWorldView for Meadow {
    fn position(&self, agent: u64) -> Option<Vec3> {
        self.positions.get(&agent).copied()
    }

    fn facing(&self, agent: u64) -> Option<Vec3> {
        self.look_request
            .filter(|(a, _)| *a == agent)
            .map(|(_, at)| at)
    }

    fn target_of(&self, _agent: u64) -> Option<u64> {
        None
    }
}

impl MobWorldMut for Meadow {
    fn request_move(&mut self, agent: u64, to: Vec3, speed: f32) {
        self.move_request = Some((agent, to, speed));
    }

    fn clear_move(&mut self, agent: u64) {
        if self.move_request.is_some_and(|(a, _, _)| a == agent) {
            self.move_request = None;
        }
    }

    fn request_look(&mut self, agent: u64, at: Vec3) {
        self.look_request = Some((agent, at));
    }

    fn request_jump(&mut self, _agent: u64) {}

    fn set_target(&mut self, _agent: u64, _target: Option<u64>) {}
}

/// Runs away from the predator; highest priority, owns movement outright.
struct FleeGoal;

impl Goal<Meadow> for FleeGoal {
    fn flags(&self) -> CapabilitySet {
        CapabilitySet::MOVE
    }

    fn can_start(&mut self, _ctx: &TickContext, _agent: u64, world: &Meadow) -> bool {
        world.predator.is_some()
    }

    fn requires_update_every_tick(&self) -> bool {
        true
    }

    fn tick(&mut self, _ctx: &TickContext, agent: u64, world: &mut Meadow) {
        let (Some(me), Some(threat)) = (
            world.position(agent),
            world.predator.and_then(|p| world.position(p)),
        ) else {
            return;
        };
        let away = me + (me - threat) * 0.5;
        world.request_move(agent, away, 1.4);
    }

    fn stop(&mut self, _ctx: &TickContext, agent: u64, world: &mut Meadow) {
        world.clear_move(agent);
    }
}

/// Ambles to a random nearby point; probes rarely so the mob mostly idles.
struct WanderGoal {
    target: Vec3,
}

impl Goal<Meadow> for WanderGoal {
    fn flags(&self) -> CapabilitySet {
        CapabilitySet::MOVE
    }

    fn probe_sampling(&self) -> ProbeSampling {
        ProbeSampling::OneIn(8)
    }

    fn can_start(&mut self, _ctx: &TickContext, _agent: u64, _world: &Meadow) -> bool {
        true
    }

    fn can_continue(&mut self, _ctx: &TickContext, agent: u64, world: &Meadow) -> bool {
        world
            .position(agent)
            .is_some_and(|me| me.distance_sq(self.target) > 0.25)
    }

    fn start(&mut self, ctx: &TickContext, agent: u64, world: &mut Meadow) {
        use mob::core::DeterministicRng;
        let mut rng = ctx.rng_for_agent(agent, 11);
        let me = world.position(agent).unwrap_or(Vec3::ZERO);
        self.target = me
            + Vec3::new(
                rng.next_f32_unit() * 8.0 - 4.0,
                0.0,
                rng.next_f32_unit() * 8.0 - 4.0,
            );
    }

    fn tick(&mut self, _ctx: &TickContext, agent: u64, world: &mut Meadow) {
        world.request_move(agent, self.target, 0.7);
    }

    fn stop(&mut self, _ctx: &TickContext, agent: u64, world: &mut Meadow) {
        world.clear_move(agent);
    }
}

/// Writes `predator.near` whenever a predator exists; short ttl so the fact
/// fades a moment after the threat leaves.
struct ThreatSensor;

impl Sensor<Meadow> for ThreatSensor {
    fn writes(&self) -> Vec<KeyId> {
        vec![PREDATOR_NEAR.erased()]
    }

    fn interval(&self) -> u32 {
        1
    }

    fn sense(&mut self, _ctx: &TickContext, _agent: u64, world: &Meadow, bb: &mut Blackboard) {
        if let Some(p) = world.predator {
            bb.set_with_ttl(PREDATOR_NEAR, p, 5);
        }
    }
}

/// Flags hunger every so often; grazing drains it back down.
struct HungerSensor;

impl Sensor<Meadow> for HungerSensor {
    fn writes(&self) -> Vec<KeyId> {
        vec![HUNGRY.erased()]
    }

    fn interval(&self) -> u32 {
        10
    }

    fn sense(&mut self, _ctx: &TickContext, _agent: u64, world: &Meadow, bb: &mut Blackboard) {
        if world.hunger >= 30 {
            bb.set_with_ttl(HUNGRY, (), 15);
        }
    }
}

struct GrazeBehavior;

impl Behavior<Meadow> for GrazeBehavior {
    fn preconditions(&self) -> Vec<(KeyId, MemoryStatus)> {
        vec![(HUNGRY.erased(), MemoryStatus::Present)]
    }

    fn run_for(&self) -> DurationRange {
        DurationRange::between(20, 40)
    }

    fn can_still_use(
        &mut self,
        _ctx: &TickContext,
        _agent: u64,
        _world: &Meadow,
        _bb: &Blackboard,
    ) -> bool {
        true
    }

    fn tick(&mut self, _ctx: &TickContext, _agent: u64, world: &mut Meadow, _bb: &mut Blackboard) {
        world.hunger = world.hunger.saturating_sub(2);
    }
}

struct BleatBehavior;

impl Behavior<Meadow> for BleatBehavior {
    fn run_for(&self) -> DurationRange {
        DurationRange::fixed(10)
    }

    fn can_still_use(
        &mut self,
        _ctx: &TickContext,
        _agent: u64,
        _world: &Meadow,
        _bb: &Blackboard,
    ) -> bool {
        true
    }

    fn start(&mut self, _ctx: &TickContext, _agent: u64, world: &mut Meadow, _bb: &mut Blackboard) {
        world.bleats += 1;
    }
}

fn main() {
    let agent = 7u64;

    let mut world = Meadow::default();
    world.positions.insert(agent, Vec3::ZERO);
    world.positions.insert(99, Vec3::new(6.0, 0.0, 0.0));

    let mut selector = GoalSelector::new(agent);
    selector.add(0, GoalKey("flee"), FleeGoal);
    selector.add(5, GoalKey("wander"), WanderGoal { target: Vec3::ZERO });

    let mut brain = Brain::builder(agent)
        .sensor(ThreatSensor)
        .sensor(HungerSensor)
        .activity(
            Activity::new(PANIC)
                .require(PREDATOR_NEAR, MemoryStatus::Present)
                .erase_when_stopped(PREDATOR_NEAR)
                .behavior(0, BehaviorKey("bleat"), BleatBehavior),
        )
        .activity(Activity::new(GRAZE).behavior(0, BehaviorKey("graze"), GrazeBehavior))
        .default_activity(GRAZE)
        .build()
        .expect("brain wiring");
    brain.blackboard.set(TRACE_LOG, TraceLog::default());

    for tick in 0..120u64 {
        let ctx = TickContext {
            tick,
            dt_seconds: 0.05,
            seed: 42,
        };

        world.hunger += 1;
        world.predator = (40..60).contains(&tick).then_some(99);

        selector.tick(&ctx, &mut world);
        brain.tick(&ctx, &mut world);

        // Movement integration: step toward the requested target.
        if let Some((who, to, speed)) = world.move_request {
            if let Some(pos) = world.positions.get_mut(&who) {
                let step = (to - *pos) * (0.1 * speed);
                *pos = *pos + step;
            }
        }
    }

    println!(
        "final: hunger={} bleats={} running_goals={:?}",
        world.hunger,
        world.bleats,
        selector.running_goals().collect::<Vec<_>>()
    );
    let events = &brain.blackboard.get(TRACE_LOG).unwrap().events;
    for e in events {
        println!("[tick={}] {} a={} b={}", e.tick, e.tag, e.a, e.b);
    }
}

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mob_brain::{Activity, ActivityId, Behavior, BehaviorKey, Brain, Sensor};
use mob_core::{
    Blackboard, CapabilitySet, KeyId, MemKey, MemoryStatus, TickContext, WorldMut, WorldView,
};

const ROUTINE: ActivityId = ActivityId("routine");
const ALERT: ActivityId = ActivityId("alert");
const UPKEEP: ActivityId = ActivityId("upkeep");
const PULSE: MemKey<u64> = MemKey::new("pulse");
const DANGER: MemKey<()> = MemKey::new("danger");

#[derive(Default)]
struct World;

impl WorldView for World {
    type Agent = u64;
}

impl WorldMut for World {}

struct PulseSensor;

impl Sensor<World> for PulseSensor {
    fn writes(&self) -> Vec<KeyId> {
        vec![PULSE.erased()]
    }

    fn interval(&self) -> u32 {
        1
    }

    fn sense(&mut self, ctx: &TickContext, _agent: u64, _world: &World, bb: &mut Blackboard) {
        bb.set(PULSE, ctx.tick);
    }
}

struct DangerSensor;

impl Sensor<World> for DangerSensor {
    fn writes(&self) -> Vec<KeyId> {
        vec![DANGER.erased()]
    }

    fn interval(&self) -> u32 {
        5
    }

    fn sense(&mut self, _ctx: &TickContext, _agent: u64, _world: &World, bb: &mut Blackboard) {
        bb.set_with_ttl(DANGER, (), 3);
    }
}

struct Busy {
    claims: CapabilitySet,
}

impl Behavior<World> for Busy {
    fn claims(&self) -> CapabilitySet {
        self.claims
    }

    fn can_still_use(
        &mut self,
        _ctx: &TickContext,
        _agent: u64,
        _world: &World,
        _bb: &Blackboard,
    ) -> bool {
        true
    }
}

fn slate(id: ActivityId, keys: [&'static str; 4]) -> Activity<World> {
    let claims = [
        CapabilitySet::MOVE,
        CapabilitySet::LOOK,
        CapabilitySet::EMPTY,
        CapabilitySet::TARGET,
    ];
    let mut activity = Activity::new(id);
    for (i, key) in keys.into_iter().enumerate() {
        activity = activity.behavior(i as u32, BehaviorKey(key), Busy { claims: claims[i] });
    }
    activity
}

fn bench_brain_tick(c: &mut Criterion) {
    let mut brain = Brain::builder(1u64)
        .sensor(PulseSensor)
        .sensor(DangerSensor)
        .core_activity(slate(UPKEEP, ["look", "swim", "blink", "drift"]))
        .activity(
            slate(ALERT, ["flee", "scan", "yell", "hide"])
                .require(DANGER, MemoryStatus::Present),
        )
        .activity(slate(ROUTINE, ["graze", "roam", "rest", "groom"]))
        .default_activity(ROUTINE)
        .build()
        .expect("brain wiring");
    let mut world = World::default();

    let mut tick: u64 = 0;
    c.bench_function("mob-brain/tick(behaviors=12)", |b| {
        b.iter(|| {
            let ctx = TickContext {
                tick,
                dt_seconds: 0.1,
                seed: 0,
            };
            brain.tick(&ctx, &mut world);
            black_box(brain.active_activity());
            tick = tick.wrapping_add(1);
        })
    });
}

criterion_group!(benches, bench_brain_tick);
criterion_main!(benches);

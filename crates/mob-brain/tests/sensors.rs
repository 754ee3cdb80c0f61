use mob_brain::{tick_brains, Activity, ActivityId, Brain, Sensor};
use mob_core::{Blackboard, KeyId, MemKey, TickContext, WorldMut, WorldView};

const IDLE: ActivityId = ActivityId("idle");
const SEEN: MemKey<Vec<u64>> = MemKey::new("seen");
const PULSE: MemKey<u64> = MemKey::new("pulse");
const ECHO: MemKey<u64> = MemKey::new("echo");

#[derive(Default)]
struct Field;

impl WorldView for Field {
    type Agent = u64;
}

impl WorldMut for Field {}

/// Appends the tick of every firing, so tests can read the cadence back.
struct CadenceSensor {
    every: u32,
}

impl Sensor<Field> for CadenceSensor {
    fn writes(&self) -> Vec<KeyId> {
        vec![SEEN.erased()]
    }

    fn interval(&self) -> u32 {
        self.every
    }

    fn sense(&mut self, ctx: &TickContext, _agent: u64, _world: &Field, bb: &mut Blackboard) {
        if let Some(seen) = bb.get_mut(SEEN) {
            seen.push(ctx.tick);
        } else {
            bb.set(SEEN, vec![ctx.tick]);
        }
    }
}

struct PulseSensor;

impl Sensor<Field> for PulseSensor {
    fn writes(&self) -> Vec<KeyId> {
        vec![PULSE.erased()]
    }

    fn interval(&self) -> u32 {
        1
    }

    fn sense(&mut self, ctx: &TickContext, _agent: u64, _world: &Field, bb: &mut Blackboard) {
        bb.set(PULSE, ctx.tick);
    }
}

/// Reads what [`PulseSensor`] wrote earlier in the same pass.
struct EchoSensor;

impl Sensor<Field> for EchoSensor {
    fn writes(&self) -> Vec<KeyId> {
        vec![ECHO.erased()]
    }

    fn interval(&self) -> u32 {
        1
    }

    fn sense(&mut self, _ctx: &TickContext, _agent: u64, _world: &Field, bb: &mut Blackboard) {
        if let Some(pulse) = bb.get(PULSE).copied() {
            bb.set(ECHO, pulse + 1);
        }
    }
}

fn ctx(tick: u64) -> TickContext {
    TickContext {
        tick,
        dt_seconds: 0.05,
        seed: 29,
    }
}

fn cadence_brain(agent: u64, every: u32) -> Brain<Field> {
    Brain::builder(agent)
        .sensor(CadenceSensor { every })
        .activity(Activity::new(IDLE))
        .default_activity(IDLE)
        .build()
        .expect("brain wiring")
}

#[test]
fn interval_is_staggered_by_agent_id() {
    let mut world = Field::default();
    let mut herd = vec![cadence_brain(7, 20), cadence_brain(0, 20)];
    for tick in 0..60 {
        tick_brains(&ctx(tick), &mut world, &mut herd);
    }

    // tick_brains reorders by stable id, so herd[0] is agent 0 afterwards.
    assert_eq!(herd[0].agent, 0);
    assert_eq!(herd[0].blackboard.get(SEEN), Some(&vec![0, 20, 40]));
    assert_eq!(herd[1].blackboard.get(SEEN), Some(&vec![13, 33, 53]));
}

#[test]
fn zero_interval_is_clamped_to_every_tick() {
    let mut world = Field::default();
    let mut brain = cadence_brain(3, 0);
    for tick in 0..4 {
        brain.tick(&ctx(tick), &mut world);
    }
    assert_eq!(brain.blackboard.get(SEEN), Some(&vec![0, 1, 2, 3]));
}

#[test]
fn later_sensors_see_earlier_writes_from_the_same_pass() {
    let mut world = Field::default();
    let mut brain = Brain::builder(0u64)
        .sensor(PulseSensor)
        .sensor(EchoSensor)
        .activity(Activity::new(IDLE))
        .default_activity(IDLE)
        .build()
        .expect("brain wiring");

    for tick in 0..3 {
        brain.tick(&ctx(tick), &mut world);
        assert_eq!(brain.blackboard.get(PULSE), Some(&tick));
        assert_eq!(brain.blackboard.get(ECHO), Some(&(tick + 1)));
    }
}

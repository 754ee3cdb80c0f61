use mob_brain::{Activity, ActivityId, Behavior, BehaviorKey, Brain, BrainError, Sensor};
use mob_core::{Blackboard, KeyId, MemKey, MemoryStatus, TickContext, WorldMut, WorldView};

const IDLE: ActivityId = ActivityId("idle");
const FIGHT: ActivityId = ActivityId("fight");
const UPKEEP: ActivityId = ActivityId("upkeep");

const THREAT: MemKey<u64> = MemKey::new("threat");
const ORDERS: MemKey<u32> = MemKey::new("orders");

struct Den;

impl WorldView for Den {
    type Agent = u64;
}

impl WorldMut for Den {}

struct Noop {
    preconditions: Vec<(KeyId, MemoryStatus)>,
}

impl Noop {
    fn new() -> Self {
        Self {
            preconditions: Vec::new(),
        }
    }

    fn needs(mut self, key: impl Into<KeyId>, status: MemoryStatus) -> Self {
        self.preconditions.push((key.into(), status));
        self
    }
}

impl Behavior<Den> for Noop {
    fn preconditions(&self) -> Vec<(KeyId, MemoryStatus)> {
        self.preconditions.clone()
    }
}

struct ThreatSensor;

impl Sensor<Den> for ThreatSensor {
    fn writes(&self) -> Vec<KeyId> {
        vec![THREAT.erased()]
    }

    fn sense(&mut self, _ctx: &TickContext, _agent: u64, _world: &Den, _bb: &mut Blackboard) {}
}

#[test]
fn duplicate_activity_is_rejected() {
    let err = Brain::<Den>::builder(1u64)
        .activity(Activity::new(IDLE))
        .activity(Activity::new(IDLE))
        .default_activity(IDLE)
        .build()
        .err()
        .expect("build must fail");
    assert_eq!(err, BrainError::DuplicateActivity(IDLE));
}

#[test]
fn duplicate_behavior_key_in_one_activity_is_rejected() {
    let err = Brain::<Den>::builder(1u64)
        .activity(
            Activity::new(IDLE)
                .behavior(0, BehaviorKey("loaf"), Noop::new())
                .behavior(5, BehaviorKey("loaf"), Noop::new()),
        )
        .default_activity(IDLE)
        .build()
        .err()
        .expect("build must fail");
    assert_eq!(
        err,
        BrainError::DuplicateBehavior {
            activity: IDLE,
            key: BehaviorKey("loaf"),
        }
    );
}

#[test]
fn same_behavior_key_may_appear_in_two_activities() {
    let brain = Brain::<Den>::builder(1u64)
        .activity(Activity::new(IDLE).behavior(0, BehaviorKey("watch"), Noop::new()))
        .activity(
            Activity::new(FIGHT)
                .behavior(0, BehaviorKey("watch"), Noop::new()),
        )
        .default_activity(IDLE)
        .build();
    assert!(brain.is_ok());
}

#[test]
fn missing_default_is_rejected() {
    let err = Brain::<Den>::builder(1u64)
        .activity(Activity::new(IDLE))
        .build()
        .err()
        .expect("build must fail");
    assert_eq!(err, BrainError::MissingDefaultActivity);
}

#[test]
fn undeclared_default_is_rejected() {
    let err = Brain::<Den>::builder(1u64)
        .activity(Activity::new(IDLE))
        .default_activity(FIGHT)
        .build()
        .err()
        .expect("build must fail");
    assert_eq!(err, BrainError::UnknownDefaultActivity(FIGHT));
}

#[test]
fn core_activity_cannot_be_the_default() {
    let err = Brain::<Den>::builder(1u64)
        .core_activity(Activity::new(UPKEEP))
        .activity(Activity::new(IDLE))
        .default_activity(UPKEEP)
        .build()
        .err()
        .expect("build must fail");
    assert_eq!(err, BrainError::UnknownDefaultActivity(UPKEEP));
}

#[test]
fn behavior_precondition_must_be_in_schema() {
    let err = Brain::<Den>::builder(1u64)
        .activity(
            Activity::new(IDLE).behavior(
                0,
                BehaviorKey("cower"),
                Noop::new().needs(THREAT, MemoryStatus::Present),
            ),
        )
        .default_activity(IDLE)
        .build()
        .err()
        .expect("build must fail");
    assert_eq!(
        err,
        BrainError::UndeclaredMemory {
            user: "cower",
            key: THREAT.erased(),
        }
    );
}

#[test]
fn activity_requirement_must_be_in_schema() {
    let err = Brain::<Den>::builder(1u64)
        .activity(Activity::new(FIGHT).require(THREAT, MemoryStatus::Present))
        .activity(Activity::new(IDLE))
        .default_activity(IDLE)
        .build()
        .err()
        .expect("build must fail");
    assert_eq!(
        err,
        BrainError::UndeclaredMemory {
            user: "fight",
            key: THREAT.erased(),
        }
    );
}

#[test]
fn erase_list_must_be_in_schema() {
    let err = Brain::<Den>::builder(1u64)
        .activity(Activity::new(FIGHT).erase_when_stopped(THREAT))
        .activity(Activity::new(IDLE))
        .default_activity(IDLE)
        .build()
        .err()
        .expect("build must fail");
    assert_eq!(
        err,
        BrainError::UndeclaredMemory {
            user: "fight",
            key: THREAT.erased(),
        }
    );
}

#[test]
fn sensor_writes_and_registered_keys_satisfy_the_schema() {
    let brain = Brain::<Den>::builder(1u64)
        .sensor(ThreatSensor)
        .register_memory(ORDERS)
        .activity(
            Activity::new(FIGHT)
                .require(THREAT, MemoryStatus::Present)
                .behavior(
                    0,
                    BehaviorKey("obey"),
                    Noop::new().needs(ORDERS, MemoryStatus::Present),
                ),
        )
        .activity(Activity::new(IDLE))
        .default_activity(IDLE)
        .build()
        .expect("schema satisfied");

    assert!(brain.blackboard.is_registered(THREAT.erased()));
    assert!(brain.blackboard.is_registered(ORDERS.erased()));
}

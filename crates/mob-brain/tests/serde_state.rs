#![cfg(feature = "serde")]

use std::any::Any;
use std::borrow::Cow;

use mob_brain::{
    Activity, ActivityId, Behavior, BehaviorKey, BehaviorSlotState, Brain, BrainState,
};
use mob_core::{BlackboardState, KeyId, MemoryEntryState, WorldMut, WorldView};

const DAILY: ActivityId = ActivityId("daily");

struct Pen;

impl WorldView for Pen {
    type Agent = u64;
}

impl WorldMut for Pen {}

struct Eat;

impl Behavior<Pen> for Eat {}

fn brain() -> Brain<Pen> {
    Brain::builder(0u64)
        .activity(Activity::new(DAILY).behavior(0, BehaviorKey("eat"), Eat))
        .default_activity(DAILY)
        .build()
        .expect("brain wiring")
}

#[test]
fn brain_state_json_roundtrip() {
    let state = BrainState::<String> {
        activity: Cow::Borrowed("daily"),
        behaviors: vec![BehaviorSlotState {
            activity: Cow::Borrowed("daily"),
            key: Cow::Borrowed("eat"),
            remaining: 9,
        }],
        memory: BlackboardState {
            entries: vec![MemoryEntryState {
                key: Cow::Borrowed("hungry"),
                value: "yes".to_string(),
                ttl: Some(4),
            }],
        },
    };

    let json = serde_json::to_string(&state).expect("serialize");
    let back: BrainState<String> = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, state);
}

#[test]
fn restore_accepts_deserialized_owned_names() {
    let json = r#"{
        "activity": "daily",
        "behaviors": [{"activity": "daily", "key": "eat", "remaining": 3}],
        "memory": {"entries": []}
    }"#;
    let state: BrainState<String> = serde_json::from_str(json).expect("deserialize");
    assert!(matches!(state.activity, Cow::Owned(_)));

    let mut brain = brain();
    brain.restore(&state, |_key: KeyId, _value: &String| -> Option<Box<dyn Any>> {
        None
    });
    assert_eq!(brain.active_activity(), DAILY);
    assert!(brain.is_behavior_running(DAILY, BehaviorKey("eat")));
}

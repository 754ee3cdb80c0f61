//! Deterministic, engine-agnostic mob AI kernel primitives.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod agent;
pub mod blackboard;
pub mod capability;
pub mod math;
pub mod rng;
pub mod tick;
pub mod world;

pub use agent::AgentId;
pub use blackboard::{Blackboard, BlackboardState, KeyId, MemKey, MemoryEntryState, MemoryStatus};
pub use capability::{Capability, CapabilitySet};
pub use math::Vec3;
pub use rng::{DeterministicRng, SplitMix64};
pub use tick::TickContext;
pub use world::{
    MobWorldMut, MobWorldView, PathTicket, PathWorldMut, PathWorldView, WorldMut, WorldView,
};

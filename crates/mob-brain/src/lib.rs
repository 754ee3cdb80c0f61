//! Sensor/memory/activity scheduling for mob agents.
//!
//! A [`Brain`] owns an agent's [`Blackboard`](mob_core::Blackboard), a set of
//! periodic [`Sensor`]s that keep it filled with facts about the world, and a
//! set of [`Activity`] groups whose [`Behavior`]s run against those facts.
//! Each tick: expired memories are swept, due sensors fire, one selectable
//! activity is elected, and behaviors are arbitrated the same way goals are:
//! in priority order, gated by memory preconditions and capability claims.
//!
//! Brains are assembled through [`BrainBuilder`], which validates the memory
//! schema and activity wiring up front and returns a [`BrainError`] instead of
//! letting a typo'd key silently never match.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod activity;
pub mod behavior;
pub mod brain;
pub mod sensor;

pub use activity::{Activity, ActivityId};
pub use behavior::{Behavior, BehaviorKey, DurationRange, DEFAULT_RUN_TICKS};
pub use brain::{tick_brains, BehaviorSlotState, Brain, BrainBuilder, BrainError, BrainState};
pub use sensor::{Sensor, DEFAULT_SENSE_INTERVAL};

//! Priority goal arbitration for mob agents.
//!
//! A [`GoalSelector`] owns a flat, priority-ordered pool of [`Goal`]s and, once
//! per simulation tick, decides which of them run. Goals declare the actuator
//! [capabilities](mob_core::Capability) they need; at most one running goal
//! owns each capability at any time.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod goal;
pub mod selector;

pub use goal::{Goal, GoalKey, ProbeSampling};
pub use selector::{GoalSelector, GoalSelectorConfig, GoalSelectorState};

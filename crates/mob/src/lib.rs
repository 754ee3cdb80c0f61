//! Umbrella crate that re-exports the `mob-*` building blocks.
//!
//! This crate is intended as a convenient entrypoint for users and as a home for docs.rs guides.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

#[cfg(feature = "core")]
#[cfg_attr(docsrs, doc(cfg(feature = "core")))]
pub use mob_core as core;

#[cfg(feature = "tools")]
#[cfg_attr(docsrs, doc(cfg(feature = "tools")))]
pub use mob_tools as tools;

#[cfg(feature = "goal")]
#[cfg_attr(docsrs, doc(cfg(feature = "goal")))]
pub use mob_goal as goal;

#[cfg(feature = "brain")]
#[cfg_attr(docsrs, doc(cfg(feature = "brain")))]
pub use mob_brain as brain;

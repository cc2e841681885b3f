//! Integration module for connecting point, mask and group containers with
//! the tracker.
//!
//! This module provides the traits the tracker reads its inputs through,
//! in-memory implementations of them, and a configuration builder.

mod builder;
mod memory;
mod source;

pub use builder::ParticleFilterConfigBuilder;
pub use memory::{GroupMap, MaskStore, PointStore};
pub use source::{GroupDirectory, MaskSource, PointEntry, PointSource};

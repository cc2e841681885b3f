//! Mask-constrained point tracking.
//!
//! Fills the frames between sparse ground-truth point labels with a discrete
//! particle filter whose particles live on per-frame mask pixels. Each span
//! between two labels is filtered forward, filtered again backward, and the
//! two passes are blended.

pub mod integration;
pub mod tracker;

pub use integration::{
    GroupDirectory, GroupMap, MaskSource, MaskStore, ParticleFilterConfigBuilder, PointEntry,
    PointSource, PointStore,
};
pub use tracker::{
    ConfigError, Frame, ParticleFilterConfig, ParticleFilterEngine, Pixel, Position,
    TrackedPoint, TrackedPointSet, track, track_with_progress,
};

mod config;
mod engine;
mod geometry;
mod ground_truth;
mod mask_index;
mod motion_model;
mod particle;
mod progress;
mod segment_state;
mod segment_tracker;
mod tracked;

pub use config::{ConfigError, ParticleFilterConfig};
pub use engine::{ParticleFilterEngine, track, track_with_progress};
pub use geometry::{CoordinateScale, EntityId, Frame, GroupId, ImageSize, Pixel, Position, Velocity};
pub use ground_truth::{Anchor, GroupAnchors, extract_ground_truth};
pub use mask_index::{Mask, MaskIndex};
pub use motion_model::{MotionKind, MotionModel, Proposal};
pub use particle::{Particle, ParticleSet};
pub use progress::ProgressReporter;
pub use segment_state::SegmentPhase;
pub use segment_tracker::{FrameEstimate, Segment, SegmentTrack, SegmentTracker};
pub use tracked::{PointOrigin, TrackedPoint, TrackedPointSet};

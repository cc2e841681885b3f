//! Forward filtering and backward smoothing across one anchor-to-anchor span.

use log::{debug, warn};
use rand::Rng;

use crate::tracker::config::ParticleFilterConfig;
use crate::tracker::geometry::{Frame, Pixel, Position, Velocity};
use crate::tracker::mask_index::MaskIndex;
use crate::tracker::motion_model::{MotionModel, anchor_velocity};
use crate::tracker::particle::ParticleSet;
use crate::tracker::segment_state::SegmentPhase;

/// Span between two anchors of one group, in mask coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start_frame: Frame,
    pub start: Position,
    pub end_frame: Frame,
    pub end: Position,
}

impl Segment {
    pub fn new(start_frame: Frame, start: Position, end_frame: Frame, end: Position) -> Self {
        Self {
            start_frame,
            start,
            end_frame,
            end,
        }
    }

    #[inline]
    pub fn span(&self) -> i64 {
        self.end_frame - self.start_frame
    }

    /// Frames strictly between the two anchors.
    pub fn internal_frames(&self) -> std::ops::Range<Frame> {
        (self.start_frame + 1)..self.end_frame.max(self.start_frame + 1)
    }

    /// Position of `frame` along the segment in [0, 1].
    pub fn fraction(&self, frame: Frame) -> f32 {
        if self.span() <= 0 {
            return 0.0;
        }
        ((frame - self.start_frame) as f32 / self.span() as f32).clamp(0.0, 1.0)
    }
}

/// Filter output for a single frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameEstimate {
    pub frame: Frame,
    pub position: Position,
    pub velocity: Option<Velocity>,
    /// No particle landed on the mask; the position is a hold/mean fallback.
    pub degenerate: bool,
}

/// Everything one segment run produced, ascending by frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentTrack {
    pub forward: Vec<FrameEstimate>,
    pub backward: Vec<FrameEstimate>,
    pub smoothed: Vec<FrameEstimate>,
    pub degenerate_frames: usize,
    pub exhausted_proposals: usize,
}

struct PassResult {
    estimates: Vec<FrameEstimate>,
    degenerate_frames: usize,
    exhausted_proposals: usize,
}

pub struct SegmentTracker<'a> {
    config: &'a ParticleFilterConfig,
    masks: &'a MaskIndex,
    model: MotionModel,
    phase: SegmentPhase,
}

impl<'a> SegmentTracker<'a> {
    pub fn new(config: &'a ParticleFilterConfig, masks: &'a MaskIndex) -> Self {
        Self {
            config,
            masks,
            model: MotionModel::from_config(config),
            phase: SegmentPhase::default(),
        }
    }

    pub fn phase(&self) -> SegmentPhase {
        self.phase
    }

    /// Estimate every internal frame of `segment`.
    ///
    /// The anchors themselves are never re-estimated.
    pub fn run<R: Rng + ?Sized>(&mut self, segment: &Segment, rng: &mut R) -> SegmentTrack {
        if segment.span() <= 1 {
            self.phase = SegmentPhase::Finalized;
            return SegmentTrack::default();
        }

        let seed_velocity = self
            .config
            .use_velocity_model
            .then(|| anchor_velocity(&segment.start, &segment.end, segment.span()));

        let forward = self.filter_pass(
            segment.start,
            seed_velocity,
            segment.internal_frames(),
            rng,
        );
        let mut backward = self.filter_pass(
            segment.end,
            seed_velocity.map(|v| -v),
            segment.internal_frames().rev(),
            rng,
        );
        backward.estimates.reverse();

        self.phase = SegmentPhase::Smooth;
        let smoothed = self.blend(segment, &forward.estimates, &backward.estimates);

        let degenerate_frames = smoothed.iter().filter(|e| e.degenerate).count();
        let exhausted_proposals = forward.exhausted_proposals + backward.exhausted_proposals;
        debug!(
            "segment {}..{}: {} internal frames, forward degenerate {}, backward degenerate {}, exhausted proposals {}",
            segment.start_frame,
            segment.end_frame,
            smoothed.len(),
            forward.degenerate_frames,
            backward.degenerate_frames,
            exhausted_proposals
        );

        self.phase = SegmentPhase::Finalized;
        SegmentTrack {
            forward: forward.estimates,
            backward: backward.estimates,
            smoothed,
            degenerate_frames,
            exhausted_proposals,
        }
    }

    fn filter_pass<R, I>(
        &mut self,
        origin: Position,
        velocity: Option<Velocity>,
        frames: I,
        rng: &mut R,
    ) -> PassResult
    where
        R: Rng + ?Sized,
        I: Iterator<Item = Frame>,
    {
        let masks = self.masks;
        self.phase = SegmentPhase::Seeded;
        let mut particles = ParticleSet::seeded(
            self.config.num_particles,
            Pixel::from_position(&origin),
            velocity,
        );

        let mut previous = origin;
        let mut estimates = Vec::new();
        let mut degenerate_frames = 0;
        let mut exhausted_proposals = 0;

        for frame in frames {
            let mask = masks.pixels_at(frame);

            self.phase = SegmentPhase::Propagate;
            for particle in particles.particles_mut() {
                let proposal = self.model.propose(particle, mask, rng);
                if !proposal.accepted && !mask.is_empty() {
                    exhausted_proposals += 1;
                }
                *particle = proposal.particle;
            }

            self.phase = SegmentPhase::Weigh;
            let survived = particles.weigh(mask);
            if !survived {
                degenerate_frames += 1;
                debug!(
                    "frame {}: no particle on mask ({} pixels), using fallback estimate",
                    frame,
                    mask.len()
                );
            }

            let (mean, mean_velocity) = particles
                .weighted_mean()
                .unwrap_or((previous, velocity));
            let position = mask.snap(mean);

            self.phase = SegmentPhase::Resample;
            particles.resample_if_needed(rng);

            estimates.push(FrameEstimate {
                frame,
                position,
                velocity: mean_velocity,
                degenerate: !survived,
            });
            previous = position;
        }

        if degenerate_frames > 0 {
            warn!(
                "{} of {} frames fell back to a hold/mean estimate",
                degenerate_frames,
                estimates.len()
            );
        }

        PassResult {
            estimates,
            degenerate_frames,
            exhausted_proposals,
        }
    }

    /// Linear blend by frame fraction: the forward pass dominates near the
    /// start anchor, the backward pass near the end anchor. A degenerate side
    /// defers to the other; when both degenerate the forward estimate stands.
    fn blend(
        &self,
        segment: &Segment,
        forward: &[FrameEstimate],
        backward: &[FrameEstimate],
    ) -> Vec<FrameEstimate> {
        forward
            .iter()
            .zip(backward)
            .map(|(fwd, bwd)| {
                let mask = self.masks.pixels_at(fwd.frame);
                match (fwd.degenerate, bwd.degenerate) {
                    (false, false) => {
                        let alpha = segment.fraction(fwd.frame);
                        let coords = fwd.position.coords * (1.0 - alpha) + bwd.position.coords * alpha;
                        let velocity = match (fwd.velocity, bwd.velocity) {
                            (Some(f), Some(b)) => Some(f * (1.0 - alpha) - b * alpha),
                            (f, _) => f,
                        };
                        FrameEstimate {
                            frame: fwd.frame,
                            position: mask.snap(Position::from(coords)),
                            velocity,
                            degenerate: false,
                        }
                    }
                    (true, false) => FrameEstimate {
                        velocity: bwd.velocity.map(|v| -v),
                        ..*bwd
                    },
                    _ => *fwd,
                }
            })
            .collect()
    }
}

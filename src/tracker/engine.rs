//! Drives ground-truth extraction and segment tracking over every group.

use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::integration::{GroupDirectory, MaskSource, PointSource};
use crate::tracker::config::ParticleFilterConfig;
use crate::tracker::geometry::{CoordinateScale, GroupId};
use crate::tracker::ground_truth::extract_ground_truth;
use crate::tracker::mask_index::MaskIndex;
use crate::tracker::progress::ProgressReporter;
use crate::tracker::segment_tracker::{Segment, SegmentTracker};
use crate::tracker::tracked::{PointOrigin, TrackedPoint, TrackedPointSet};

pub struct ParticleFilterEngine {
    config: ParticleFilterConfig,
}

impl Default for ParticleFilterEngine {
    fn default() -> Self {
        Self::new(ParticleFilterConfig::default())
    }
}

impl ParticleFilterEngine {
    pub fn new(config: ParticleFilterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParticleFilterConfig {
        &self.config
    }

    /// Fill every group's unlabeled frames between its anchors.
    ///
    /// Absent or empty inputs, an invalid configuration and unusable image
    /// sizes all yield an empty set. Progress always ends at 100.
    pub fn track(
        &self,
        points: Option<&dyn PointSource>,
        masks: Option<&dyn MaskSource>,
        groups: Option<&dyn GroupDirectory>,
        on_progress: &mut dyn FnMut(u8),
    ) -> TrackedPointSet {
        let mut progress = ProgressReporter::start(on_progress);
        let mut result = TrackedPointSet::new();

        if let Err(err) = self.config.validate() {
            warn!("particle filter configuration rejected: {}", err);
            progress.finish();
            return result;
        }

        let (points, masks, groups) = match (points, masks, groups) {
            (Some(p), Some(m), Some(g)) if !p.is_empty() && !m.is_empty() && !g.is_empty() => {
                (p, m, g)
            }
            _ => {
                warn!("point, mask or group input is missing or empty; nothing to track");
                progress.finish();
                return result;
            }
        };

        let scale = match CoordinateScale::between(points.image_size(), masks.image_size()) {
            Ok(scale) => scale,
            Err(err) => {
                warn!("cannot map points onto masks: {}", err);
                progress.finish();
                return result;
            }
        };
        if !scale.is_identity() {
            info!(
                "point and mask image sizes differ; scaling points by {} x {}",
                scale.x, scale.y
            );
        }

        let extracted = extract_ground_truth(points, groups);
        progress.set_total(extracted.iter().map(|g| g.segment_count()).sum());

        for group in &extracted {
            for anchor in &group.anchors {
                result.insert(
                    group.group,
                    anchor.frame,
                    TrackedPoint {
                        position: anchor.position,
                        entity: anchor.entity,
                        origin: PointOrigin::Anchor,
                    },
                );
            }

            for (index, (start, end)) in group.segments().enumerate() {
                let segment = Segment::new(
                    start.frame,
                    scale.apply(&start.position),
                    end.frame,
                    scale.apply(&end.position),
                );
                let mask_index = MaskIndex::from_source(masks, segment.start_frame..=segment.end_frame);
                let mut rng = self.segment_rng(group.group, index);

                let track = SegmentTracker::new(&self.config, &mask_index).run(&segment, &mut rng);
                for estimate in &track.smoothed {
                    result.insert(
                        group.group,
                        estimate.frame,
                        TrackedPoint {
                            position: scale.invert(&estimate.position),
                            entity: group.representative,
                            origin: PointOrigin::Estimate,
                        },
                    );
                }
                progress.segment_done();
            }

            debug!(
                "group {}: {} anchors, {} tracked frames",
                group.group,
                group.anchors.len(),
                result.group(group.group).map_or(0, |frames| frames.len())
            );
        }

        progress.finish();
        result
    }

    /// Independent generator per segment so no state crosses segments.
    fn segment_rng(&self, group: GroupId, segment: usize) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(
                seed ^ group.wrapping_mul(0x9E37_79B9_7F4A_7C15)
                    ^ (segment as u64).wrapping_add(1).wrapping_mul(0xC2B2_AE3D_27D4_EB4F),
            ),
            None => StdRng::from_os_rng(),
        }
    }
}

/// Track with `config` and no progress hook.
pub fn track(
    points: Option<&dyn PointSource>,
    masks: Option<&dyn MaskSource>,
    groups: Option<&dyn GroupDirectory>,
    config: &ParticleFilterConfig,
) -> TrackedPointSet {
    track_with_progress(points, masks, groups, config, &mut |_: u8| {})
}

/// Track with `config`, reporting 0-100 progress to `on_progress`.
pub fn track_with_progress(
    points: Option<&dyn PointSource>,
    masks: Option<&dyn MaskSource>,
    groups: Option<&dyn GroupDirectory>,
    config: &ParticleFilterConfig,
    on_progress: &mut dyn FnMut(u8),
) -> TrackedPointSet {
    ParticleFilterEngine::new(config.clone()).track(points, masks, groups, on_progress)
}

//! Mask-constrained proposal models.
//!
//! Both variants share a two-branch structure: with probability
//! `random_walk_prob` the particle jumps to a uniformly drawn pixel of the
//! destination mask, otherwise it moves locally. Local draws off the mask are
//! rejected and redrawn up to the attempt budget, after which the particle
//! holds its previous pixel.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::tracker::config::ParticleFilterConfig;
use crate::tracker::geometry::{Pixel, Position, Velocity};
use crate::tracker::mask_index::Mask;
use crate::tracker::particle::Particle;

/// Local proposal shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionKind {
    /// Uniform over mask pixels within the transition radius.
    RandomWalk,
    /// Normal around `position + velocity`, with the velocity diffusing by
    /// process noise each step.
    ConstantVelocity,
}

/// Result of advancing one particle by one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Proposal {
    pub particle: Particle,
    /// `false` when the attempt budget ran out and the particle held.
    pub accepted: bool,
}

#[derive(Debug, Clone)]
pub struct MotionModel {
    kind: MotionKind,
    transition_radius: f32,
    random_walk_prob: f32,
    max_attempts: usize,
    noise: Option<Normal<f32>>,
}

impl MotionModel {
    pub fn from_config(config: &ParticleFilterConfig) -> Self {
        let kind = if config.use_velocity_model {
            MotionKind::ConstantVelocity
        } else {
            MotionKind::RandomWalk
        };
        let noise = match kind {
            MotionKind::ConstantVelocity if config.velocity_noise_std > 0.0 => {
                Normal::new(0.0, config.velocity_noise_std).ok()
            }
            _ => None,
        };
        Self {
            kind,
            transition_radius: config.transition_radius,
            random_walk_prob: config.random_walk_prob,
            max_attempts: config.max_proposal_attempts.max(1),
            noise,
        }
    }

    pub fn kind(&self) -> MotionKind {
        self.kind
    }

    /// Advance `particle` onto `mask`, the mask of the destination frame.
    pub fn propose<R: Rng + ?Sized>(&self, particle: &Particle, mask: &Mask, rng: &mut R) -> Proposal {
        let velocity = match self.kind {
            MotionKind::ConstantVelocity => {
                let v = particle.velocity.unwrap_or_else(Velocity::zeros);
                Some(v + self.draw_noise(rng))
            }
            MotionKind::RandomWalk => None,
        };

        if mask.is_empty() {
            return Proposal {
                particle: Particle::new(particle.pixel, velocity),
                accepted: false,
            };
        }

        if rng.random::<f32>() < self.random_walk_prob {
            let pixel = mask.pixels()[rng.random_range(0..mask.len())];
            return Proposal {
                particle: Particle::new(pixel, velocity),
                accepted: true,
            };
        }

        for _ in 0..self.max_attempts {
            let candidate = match self.kind {
                MotionKind::RandomWalk => self.draw_in_radius(particle.pixel, mask, rng),
                MotionKind::ConstantVelocity => {
                    let v = particle.velocity.unwrap_or_else(Velocity::zeros);
                    let predicted = particle.position() + v;
                    let jitter = self.draw_noise(rng);
                    Pixel::try_from_position(&(predicted + jitter))
                }
            };
            if let Some(pixel) = candidate.filter(|p| mask.contains(p)) {
                return Proposal {
                    particle: Particle::new(pixel, velocity),
                    accepted: true,
                };
            }
        }

        Proposal {
            particle: Particle::new(particle.pixel, velocity),
            accepted: false,
        }
    }

    /// Uniform integer offset within the transition disk, drawn over the part
    /// of the disk's square that overlaps the mask's bounding box. `None` if
    /// the draw falls outside the disk or the two do not overlap.
    fn draw_in_radius<R: Rng + ?Sized>(&self, center: Pixel, mask: &Mask, rng: &mut R) -> Option<Pixel> {
        let (lo, hi) = mask.bounds()?;
        let radius = f64::from(self.transition_radius);
        let r = radius.floor().min(f64::from(u32::MAX)) as i64;
        let (cx, cy) = (i64::from(center.x), i64::from(center.y));

        let (x_lo, x_hi) = ((cx - r).max(i64::from(lo.x)), (cx + r).min(i64::from(hi.x)));
        let (y_lo, y_hi) = ((cy - r).max(i64::from(lo.y)), (cy + r).min(i64::from(hi.y)));
        if x_lo > x_hi || y_lo > y_hi {
            return None;
        }

        let x = rng.random_range(x_lo..=x_hi);
        let y = rng.random_range(y_lo..=y_hi);
        let dx = (x - cx) as f64;
        let dy = (y - cy) as f64;
        if dx * dx + dy * dy > radius * radius {
            return None;
        }
        Some(Pixel::new(u32::try_from(x).ok()?, u32::try_from(y).ok()?))
    }

    fn draw_noise<R: Rng + ?Sized>(&self, rng: &mut R) -> Velocity {
        match &self.noise {
            Some(normal) => Velocity::new(normal.sample(rng), normal.sample(rng)),
            None => Velocity::zeros(),
        }
    }
}

/// Velocity implied by moving between two anchors over `frames` frames.
pub fn anchor_velocity(from: &Position, to: &Position, frames: i64) -> Velocity {
    if frames <= 0 {
        return Velocity::zeros();
    }
    (to - from) / frames as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn corridor() -> Mask {
        Mask::from_pixels((0..=100).flat_map(|x| (45..=55).map(move |y| Pixel::new(x, y))))
    }

    fn config(velocity: bool) -> ParticleFilterConfig {
        ParticleFilterConfig {
            use_velocity_model: velocity,
            random_walk_prob: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_random_walk_stays_within_radius() {
        let model = MotionModel::from_config(&config(false));
        let mask = corridor();
        let mut rng = StdRng::seed_from_u64(11);
        let start = Particle::new(Pixel::new(50, 50), None);

        for _ in 0..200 {
            let proposal = model.propose(&start, &mask, &mut rng);
            assert!(proposal.accepted);
            assert!(mask.contains(&proposal.particle.pixel));
            assert!(proposal.particle.pixel.distance_sq(&start.position()) <= 100.0);
            assert!(proposal.particle.velocity.is_none());
        }
    }

    #[test]
    fn test_holds_when_mask_unreachable() {
        let model = MotionModel::from_config(&config(false));
        let far = Mask::from_pixels([Pixel::new(500, 500)]);
        let mut rng = StdRng::seed_from_u64(1);
        let start = Particle::new(Pixel::new(10, 10), None);

        let proposal = model.propose(&start, &far, &mut rng);
        assert!(!proposal.accepted);
        assert_eq!(proposal.particle.pixel, start.pixel);
    }

    #[test]
    fn test_global_branch_reaches_far_pixels() {
        let cfg = ParticleFilterConfig {
            random_walk_prob: 1.0,
            ..Default::default()
        };
        let model = MotionModel::from_config(&cfg);
        let far = Mask::from_pixels([Pixel::new(500, 500)]);
        let mut rng = StdRng::seed_from_u64(1);

        let proposal = model.propose(&Particle::new(Pixel::new(10, 10), None), &far, &mut rng);
        assert!(proposal.accepted);
        assert_eq!(proposal.particle.pixel, Pixel::new(500, 500));
    }

    #[test]
    fn test_empty_mask_holds() {
        let model = MotionModel::from_config(&config(true));
        let mut rng = StdRng::seed_from_u64(2);
        let start = Particle::new(Pixel::new(3, 3), Some(Velocity::new(1.0, 0.0)));

        let proposal = model.propose(&start, &Mask::default(), &mut rng);
        assert!(!proposal.accepted);
        assert_eq!(proposal.particle.pixel, start.pixel);
        assert!(proposal.particle.velocity.is_some());
    }

    #[test]
    fn test_velocity_model_follows_velocity() {
        let cfg = ParticleFilterConfig {
            velocity_noise_std: 0.0,
            ..config(true)
        };
        let model = MotionModel::from_config(&cfg);
        assert_eq!(model.kind(), MotionKind::ConstantVelocity);
        let mut rng = StdRng::seed_from_u64(5);
        let start = Particle::new(Pixel::new(20, 50), Some(Velocity::new(4.0, 0.0)));

        let proposal = model.propose(&start, &corridor(), &mut rng);
        assert!(proposal.accepted);
        assert_eq!(proposal.particle.pixel, Pixel::new(24, 50));
        assert_eq!(proposal.particle.velocity, Some(Velocity::new(4.0, 0.0)));
    }

    #[test]
    fn test_huge_radius_stays_on_mask() {
        let cfg = ParticleFilterConfig {
            transition_radius: 1.0e10,
            ..config(false)
        };
        assert!(cfg.validate().is_ok());
        let model = MotionModel::from_config(&cfg);
        let mask = corridor();
        let mut rng = StdRng::seed_from_u64(8);
        let start = Particle::new(Pixel::new(50, 50), None);

        for _ in 0..50 {
            let proposal = model.propose(&start, &mask, &mut rng);
            assert!(proposal.accepted);
            assert!(mask.contains(&proposal.particle.pixel));
        }
    }

    #[test]
    fn test_velocity_prediction_off_image_is_rejected() {
        let cfg = ParticleFilterConfig {
            velocity_noise_std: 0.0,
            ..config(true)
        };
        let model = MotionModel::from_config(&cfg);
        let column = Mask::from_pixels((0..=10).map(|y| Pixel::new(0, y)));
        let mut rng = StdRng::seed_from_u64(3);
        let start = Particle::new(Pixel::new(2, 3), Some(Velocity::new(-20.0, 0.0)));

        let proposal = model.propose(&start, &column, &mut rng);
        assert!(!proposal.accepted);
        assert_eq!(proposal.particle.pixel, Pixel::new(2, 3));
        assert_eq!(proposal.particle.velocity, Some(Velocity::new(-20.0, 0.0)));
    }

    #[test]
    fn test_anchor_velocity() {
        let v = anchor_velocity(&Position::new(50.0, 50.0), &Position::new(150.0, 30.0), 10);
        assert!((v.x - 10.0).abs() < 1e-6);
        assert!((v.y + 2.0).abs() < 1e-6);
        assert_eq!(anchor_velocity(&Position::origin(), &Position::new(1.0, 1.0), 0), Velocity::zeros());
    }
}

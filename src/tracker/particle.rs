//! Weighted particle generations with binary mask weighting and systematic
//! resampling.

use ndarray::{Array1, Axis};
use rand::Rng;

use crate::tracker::geometry::{Pixel, Position, Velocity};
use crate::tracker::mask_index::Mask;

/// A candidate state: a mask pixel plus, under the velocity model, a velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub pixel: Pixel,
    pub velocity: Option<Velocity>,
}

impl Particle {
    #[inline]
    pub fn new(pixel: Pixel, velocity: Option<Velocity>) -> Self {
        Self { pixel, velocity }
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.pixel.to_position()
    }
}

/// One generation of particles and their normalized weights.
#[derive(Debug, Clone)]
pub struct ParticleSet {
    particles: Vec<Particle>,
    weights: Array1<f64>,
}

impl ParticleSet {
    /// `n` identical particles at `pixel` with uniform weights.
    pub fn seeded(n: usize, pixel: Pixel, velocity: Option<Velocity>) -> Self {
        let particles = vec![Particle::new(pixel, velocity); n];
        let weights = uniform(n);
        Self { particles, weights }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    /// Zero the weight of every particle off the mask and renormalize.
    ///
    /// Returns `false` when no particle survives; the weights are then reset
    /// to uniform so the estimate becomes the plain mean of the proposals.
    pub fn weigh(&mut self, mask: &Mask) -> bool {
        for (weight, particle) in self.weights.iter_mut().zip(&self.particles) {
            if !mask.contains(&particle.pixel) {
                *weight = 0.0;
            }
        }

        let total = self.weights.sum();
        if total > 0.0 {
            self.weights /= total;
            true
        } else {
            self.weights = uniform(self.len());
            false
        }
    }

    /// 1 / sum(w^2).
    pub fn effective_sample_size(&self) -> f64 {
        let sum_sq = self.weights.dot(&self.weights);
        if sum_sq > 0.0 { 1.0 / sum_sq } else { 0.0 }
    }

    /// Systematic resampling when the effective sample size falls below half
    /// the population. Returns whether resampling happened.
    pub fn resample_if_needed<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        let n = self.len();
        if n == 0 || self.effective_sample_size() >= n as f64 / 2.0 {
            return false;
        }
        self.resample(rng);
        true
    }

    pub fn resample<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let n = self.len();
        if n == 0 {
            return;
        }

        let mut cumulative = self.weights.clone();
        cumulative.accumulate_axis_inplace(Axis(0), |&prev, cur| *cur += prev);

        let step = 1.0 / n as f64;
        let offset = rng.random::<f64>() * step;
        let mut idx = 0;
        let mut resampled = Vec::with_capacity(n);
        for i in 0..n {
            let u = offset + i as f64 * step;
            while idx < n - 1 && cumulative[idx] < u {
                idx += 1;
            }
            resampled.push(self.particles[idx]);
        }

        self.particles = resampled;
        self.weights = uniform(n);
    }

    /// Weighted mean position, and mean velocity when particles carry one.
    pub fn weighted_mean(&self) -> Option<(Position, Option<Velocity>)> {
        if self.is_empty() {
            return None;
        }

        let mut x = 0.0f64;
        let mut y = 0.0f64;
        let mut vx = 0.0f64;
        let mut vy = 0.0f64;
        let mut has_velocity = false;
        for (particle, &w) in self.particles.iter().zip(self.weights.iter()) {
            x += w * particle.pixel.x as f64;
            y += w * particle.pixel.y as f64;
            if let Some(v) = particle.velocity {
                has_velocity = true;
                vx += w * v.x as f64;
                vy += w * v.y as f64;
            }
        }

        let position = Position::new(x as f32, y as f32);
        let velocity = has_velocity.then(|| Velocity::new(vx as f32, vy as f32));
        Some((position, velocity))
    }
}

fn uniform(n: usize) -> Array1<f64> {
    if n == 0 {
        Array1::zeros(0)
    } else {
        Array1::from_elem(n, 1.0 / n as f64)
    }
}

//! Builder for assembling a validated `ParticleFilterConfig`.

use crate::tracker::{ConfigError, ParticleFilterConfig};

/// Fluent builder over `ParticleFilterConfig`, starting from its defaults.
#[derive(Debug, Clone, Default)]
pub struct ParticleFilterConfigBuilder {
    config: ParticleFilterConfig,
}

impl ParticleFilterConfigBuilder {
    /// Create a new builder with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of particles per generation.
    pub fn num_particles(mut self, n: usize) -> Self {
        self.config.num_particles = n;
        self
    }

    /// Set the local proposal radius in pixels.
    pub fn transition_radius(mut self, radius: f32) -> Self {
        self.config.transition_radius = radius;
        self
    }

    /// Set the probability of proposing anywhere on the destination mask.
    pub fn random_walk_prob(mut self, p: f32) -> Self {
        self.config.random_walk_prob = p;
        self
    }

    /// Enable the constant-velocity proposal with the given process noise.
    pub fn velocity_model(mut self, noise_std: f32) -> Self {
        self.config.use_velocity_model = true;
        self.config.velocity_noise_std = noise_std;
        self
    }

    /// Set the per-particle proposal attempt budget.
    pub fn max_proposal_attempts(mut self, attempts: usize) -> Self {
        self.config.max_proposal_attempts = attempts;
        self
    }

    /// Fix the base seed so runs are reproducible.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Validate and return the configuration.
    pub fn build(self) -> Result<ParticleFilterConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

//! Particle filter configuration and its validation errors.

use thiserror::Error;

/// Reasons a configuration or coordinate setup cannot be used.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("particle count must be positive")]
    ZeroParticles,
    #[error("transition radius must be positive and finite, got {0}")]
    InvalidTransitionRadius(f32),
    #[error("random walk probability must lie in [0, 1], got {0}")]
    InvalidRandomWalkProb(f32),
    #[error("velocity noise std must be non-negative and finite, got {0}")]
    InvalidVelocityNoise(f32),
    #[error("proposal attempt budget must be positive")]
    ZeroProposalAttempts,
    #[error("invalid image size {width} x {height}")]
    InvalidImageSize { width: u32, height: u32 },
}

/// Configuration for the mask-constrained particle filter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleFilterConfig {
    /// Particles per generation.
    pub num_particles: usize,
    /// Radius (pixels) of the local proposal neighbourhood.
    pub transition_radius: f32,
    /// Probability of proposing from the whole destination mask.
    pub random_walk_prob: f32,
    /// Track velocity with a constant-velocity proposal.
    pub use_velocity_model: bool,
    /// Velocity process noise, also the spread of the velocity proposal.
    pub velocity_noise_std: f32,
    /// Draws per particle before it holds its previous position.
    pub max_proposal_attempts: usize,
    /// Base seed for reproducible runs. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for ParticleFilterConfig {
    fn default() -> Self {
        Self {
            num_particles: 1000,
            transition_radius: 10.0,
            random_walk_prob: 0.1,
            use_velocity_model: false,
            velocity_noise_std: 2.0,
            max_proposal_attempts: 32,
            seed: None,
        }
    }
}

impl ParticleFilterConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_particles == 0 {
            return Err(ConfigError::ZeroParticles);
        }
        if !(self.transition_radius.is_finite() && self.transition_radius > 0.0) {
            return Err(ConfigError::InvalidTransitionRadius(self.transition_radius));
        }
        if !(0.0..=1.0).contains(&self.random_walk_prob) {
            return Err(ConfigError::InvalidRandomWalkProb(self.random_walk_prob));
        }
        if !(self.velocity_noise_std.is_finite() && self.velocity_noise_std >= 0.0) {
            return Err(ConfigError::InvalidVelocityNoise(self.velocity_noise_std));
        }
        if self.max_proposal_attempts == 0 {
            return Err(ConfigError::ZeroProposalAttempts);
        }
        Ok(())
    }
}

/// Lifecycle of one segment as it moves through the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SegmentPhase {
    /// Particles placed at the starting anchor
    #[default]
    Seeded,
    /// Particles advanced one frame by the motion model
    Propagate,
    /// Weights set from mask membership and normalized
    Weigh,
    /// Population resampled if its effective size collapsed
    Resample,
    /// Forward and backward estimates being blended
    Smooth,
    /// Estimates ready; particles discarded
    Finalized,
}

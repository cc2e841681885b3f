//! Pixel and coordinate-space primitives shared by the tracker.

use nalgebra::{Point2, Vector2};

use crate::tracker::config::ConfigError;

/// Frame index along the time axis.
pub type Frame = i64;

/// Opaque identifier of a labeled entity.
pub type EntityId = u64;

/// Opaque identifier of a group of entities that form one trajectory.
pub type GroupId = u64;

/// Real-valued pixel coordinate (x, y).
pub type Position = Point2<f32>;

/// Velocity in pixels per frame (vx, vy).
pub type Velocity = Vector2<f32>;

/// Integer pixel coordinate inside a mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Pixel {
    pub x: u32,
    pub y: u32,
}

impl Pixel {
    #[inline]
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Round a real position onto the pixel grid, clamping negatives to zero.
    #[inline]
    pub fn from_position(position: &Position) -> Self {
        Self {
            x: position.x.round().max(0.0) as u32,
            y: position.y.round().max(0.0) as u32,
        }
    }

    /// Round a real position onto the pixel grid. `None` when it lands off the
    /// image (negative, too large, or not finite).
    #[inline]
    pub fn try_from_position(position: &Position) -> Option<Self> {
        let on_grid = 0.0..=u32::MAX as f32;
        let x = position.x.round();
        let y = position.y.round();
        (on_grid.contains(&x) && on_grid.contains(&y)).then(|| Self::new(x as u32, y as u32))
    }

    #[inline]
    pub fn to_position(self) -> Position {
        Position::new(self.x as f32, self.y as f32)
    }

    /// Squared Euclidean distance to a real position.
    #[inline]
    pub fn distance_sq(&self, position: &Position) -> f32 {
        let dx = self.x as f32 - position.x;
        let dy = self.y as f32 - position.y;
        dx * dx + dy * dy
    }
}

/// Width and height of the image a container's coordinates refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    #[inline]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Per-axis scale mapping point-space coordinates into mask space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateScale {
    pub x: f32,
    pub y: f32,
}

impl Default for CoordinateScale {
    fn default() -> Self {
        Self::identity()
    }
}

impl CoordinateScale {
    pub fn identity() -> Self {
        Self { x: 1.0, y: 1.0 }
    }

    /// Scale between the point and mask image sizes.
    ///
    /// Unknown sizes on either side, or equal sizes, give the identity. A
    /// known size with a zero dimension is rejected.
    pub fn between(
        point_size: Option<ImageSize>,
        mask_size: Option<ImageSize>,
    ) -> Result<Self, ConfigError> {
        let (Some(point_size), Some(mask_size)) = (point_size, mask_size) else {
            return Ok(Self::identity());
        };
        if point_size == mask_size {
            return Ok(Self::identity());
        }
        for size in [point_size, mask_size] {
            if !size.is_valid() {
                return Err(ConfigError::InvalidImageSize {
                    width: size.width,
                    height: size.height,
                });
            }
        }
        Ok(Self {
            x: mask_size.width as f32 / point_size.width as f32,
            y: mask_size.height as f32 / point_size.height as f32,
        })
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        self.x == 1.0 && self.y == 1.0
    }

    /// Point space to mask space.
    #[inline]
    pub fn apply(&self, position: &Position) -> Position {
        Position::new(position.x * self.x, position.y * self.y)
    }

    /// Mask space back to point space.
    #[inline]
    pub fn invert(&self, position: &Position) -> Position {
        Position::new(position.x / self.x, position.y / self.y)
    }
}

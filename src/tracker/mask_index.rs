//! Per-frame lookup of valid pixel coordinates.

use std::collections::{HashMap, HashSet};
use std::ops::RangeInclusive;

use crate::integration::MaskSource;
use crate::tracker::geometry::{Frame, Pixel, Position};

/// The set of valid pixels at one frame.
///
/// Pixels are kept both as a list (uniform draws, nearest-pixel scans) and as
/// a hash set (membership, queried once per particle per frame).
#[derive(Debug, Clone, Default)]
pub struct Mask {
    pixels: Vec<Pixel>,
    lookup: HashSet<Pixel>,
    bounds: Option<(Pixel, Pixel)>,
}

impl Mask {
    pub fn from_pixels<I: IntoIterator<Item = Pixel>>(pixels: I) -> Self {
        let mut lookup = HashSet::new();
        let mut unique = Vec::new();
        let mut bounds: Option<(Pixel, Pixel)> = None;
        for pixel in pixels {
            if lookup.insert(pixel) {
                unique.push(pixel);
                bounds = Some(match bounds {
                    Some((lo, hi)) => (
                        Pixel::new(lo.x.min(pixel.x), lo.y.min(pixel.y)),
                        Pixel::new(hi.x.max(pixel.x), hi.y.max(pixel.y)),
                    ),
                    None => (pixel, pixel),
                });
            }
        }
        Self {
            pixels: unique,
            lookup,
            bounds,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    /// Inclusive bounding box `(min, max)`, or `None` for an empty mask.
    #[inline]
    pub fn bounds(&self) -> Option<(Pixel, Pixel)> {
        self.bounds
    }

    #[inline]
    pub fn contains(&self, pixel: &Pixel) -> bool {
        self.lookup.contains(pixel)
    }

    /// Whether the pixel nearest to `position` belongs to the mask.
    #[inline]
    pub fn contains_position(&self, position: &Position) -> bool {
        self.contains(&Pixel::from_position(position))
    }

    /// Closest mask pixel to `position`, or `None` for an empty mask.
    pub fn nearest(&self, position: &Position) -> Option<Pixel> {
        let mut best: Option<(Pixel, f32)> = None;
        for &pixel in &self.pixels {
            let d = pixel.distance_sq(position);
            match best {
                Some((_, best_d)) if best_d <= d => {}
                _ => best = Some((pixel, d)),
            }
        }
        best.map(|(pixel, _)| pixel)
    }

    /// Move `position` onto the mask if its pixel lies outside it.
    ///
    /// In-mask positions and positions against an empty mask come back
    /// unchanged.
    pub fn snap(&self, position: Position) -> Position {
        if self.is_empty() || self.contains_position(&position) {
            return position;
        }
        self.nearest(&position)
            .map(Pixel::to_position)
            .unwrap_or(position)
    }
}

/// Masks for a span of frames, keyed by frame.
#[derive(Debug, Clone, Default)]
pub struct MaskIndex {
    masks: HashMap<Frame, Mask>,
    empty: Mask,
}

impl MaskIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every frame in `frames` from a mask container.
    pub fn from_source(source: &dyn MaskSource, frames: RangeInclusive<Frame>) -> Self {
        let mut index = Self::new();
        for frame in frames {
            let pixels = source.mask_at_frame(frame);
            if !pixels.is_empty() {
                index.insert(frame, Mask::from_pixels(pixels));
            }
        }
        index
    }

    pub fn insert(&mut self, frame: Frame, mask: Mask) {
        self.masks.insert(frame, mask);
    }

    /// Mask at `frame`; empty for an untrackable frame.
    pub fn pixels_at(&self, frame: Frame) -> &Mask {
        self.masks.get(&frame).unwrap_or(&self.empty)
    }

    pub fn frame_count(&self) -> usize {
        self.masks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: u32, y0: u32, side: u32) -> Mask {
        Mask::from_pixels(
            (x0..x0 + side).flat_map(|x| (y0..y0 + side).map(move |y| Pixel::new(x, y))),
        )
    }

    #[test]
    fn test_dedup_and_membership() {
        let mask = Mask::from_pixels([Pixel::new(1, 1), Pixel::new(1, 1), Pixel::new(2, 3)]);
        assert_eq!(mask.len(), 2);
        assert!(mask.contains(&Pixel::new(2, 3)));
        assert!(!mask.contains(&Pixel::new(3, 2)));
        assert!(mask.contains_position(&Position::new(1.3, 0.8)));
    }

    #[test]
    fn test_nearest_pixel() {
        let mask = Mask::from_pixels([Pixel::new(0, 0), Pixel::new(10, 10), Pixel::new(20, 20)]);
        assert_eq!(mask.nearest(&Position::new(12.0, 9.0)), Some(Pixel::new(10, 10)));
        assert_eq!(Mask::default().nearest(&Position::new(1.0, 1.0)), None);
    }

    #[test]
    fn test_snap() {
        let mask = square(10, 10, 5);
        let inside = Position::new(12.0, 12.0);
        assert_eq!(mask.snap(inside), inside);

        let snapped = mask.snap(Position::new(30.0, 12.0));
        assert_eq!(snapped, Position::new(14.0, 12.0));

        let p = Position::new(3.0, 4.0);
        assert_eq!(Mask::default().snap(p), p);
    }

    #[test]
    fn test_bounds() {
        let mask = Mask::from_pixels([Pixel::new(7, 2), Pixel::new(3, 9), Pixel::new(5, 5)]);
        assert_eq!(mask.bounds(), Some((Pixel::new(3, 2), Pixel::new(7, 9))));
        assert_eq!(Mask::default().bounds(), None);
    }

    #[test]
    fn test_index_missing_frame_is_empty() {
        let mut index = MaskIndex::new();
        index.insert(2, square(0, 0, 3));
        assert_eq!(index.pixels_at(2).len(), 9);
        assert!(index.pixels_at(3).is_empty());
        assert_eq!(index.frame_count(), 1);
    }
}

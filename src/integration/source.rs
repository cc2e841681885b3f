//! Traits for the data containers the tracker reads from.

use std::collections::{BTreeMap, BTreeSet};

use crate::tracker::{EntityId, Frame, GroupId, ImageSize, Pixel, Position};

/// A labeled point owned by an entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointEntry {
    pub entity: EntityId,
    pub position: Position,
}

impl PointEntry {
    pub fn new(entity: EntityId, x: f32, y: f32) -> Self {
        Self {
            entity,
            position: Position::new(x, y),
        }
    }
}

/// Read access to sparse point labels.
///
/// # Example
///
/// ```ignore
/// use std::collections::BTreeMap;
/// use masktrack_rs::{PointEntry, PointSource};
///
/// struct Labels { /* ... */ }
///
/// impl PointSource for Labels {
///     fn points_at_frame(&self, frame: i64) -> Vec<PointEntry> { vec![] }
///     fn all_entries(&self) -> BTreeMap<i64, Vec<PointEntry>> { BTreeMap::new() }
/// }
/// ```
pub trait PointSource {
    /// Entries labeled at `frame`, in container order.
    fn points_at_frame(&self, frame: Frame) -> Vec<PointEntry>;

    /// Every labeled frame with its entries, ascending by frame.
    fn all_entries(&self) -> BTreeMap<Frame, Vec<PointEntry>>;

    /// Size of the image the point coordinates refer to, if known.
    fn image_size(&self) -> Option<ImageSize> {
        None
    }

    fn is_empty(&self) -> bool {
        self.all_entries().values().all(Vec::is_empty)
    }
}

/// Read access to per-frame masks.
pub trait MaskSource {
    /// Pixels valid at `frame`. Empty when nothing is recorded there.
    fn mask_at_frame(&self, frame: Frame) -> Vec<Pixel>;

    /// Size of the image the mask coordinates refer to, if known.
    fn image_size(&self) -> Option<ImageSize> {
        None
    }

    fn is_empty(&self) -> bool;
}

/// Read-only directory mapping groups to their member entities.
pub trait GroupDirectory {
    /// Groups with their members, in directory order.
    fn groups_with_members(&self) -> BTreeMap<GroupId, BTreeSet<EntityId>>;

    fn is_empty(&self) -> bool {
        self.groups_with_members().is_empty()
    }
}

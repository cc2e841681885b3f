//! In-memory containers implementing the source traits.

use std::collections::{BTreeMap, BTreeSet};

use super::{GroupDirectory, MaskSource, PointEntry, PointSource};
use crate::tracker::{EntityId, Frame, GroupId, ImageSize, Pixel};

/// Point labels stored per frame, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct PointStore {
    entries: BTreeMap<Frame, Vec<PointEntry>>,
    image_size: Option<ImageSize>,
}

impl PointStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image_size(mut self, size: ImageSize) -> Self {
        self.image_size = Some(size);
        self
    }

    pub fn add(&mut self, frame: Frame, entity: EntityId, x: f32, y: f32) {
        self.entries
            .entry(frame)
            .or_default()
            .push(PointEntry::new(entity, x, y));
    }
}

impl PointSource for PointStore {
    fn points_at_frame(&self, frame: Frame) -> Vec<PointEntry> {
        self.entries.get(&frame).cloned().unwrap_or_default()
    }

    fn all_entries(&self) -> BTreeMap<Frame, Vec<PointEntry>> {
        self.entries.clone()
    }

    fn image_size(&self) -> Option<ImageSize> {
        self.image_size
    }

    fn is_empty(&self) -> bool {
        self.entries.values().all(Vec::is_empty)
    }
}

/// Masks stored per frame. A frame may hold several masks; reads return
/// their union.
#[derive(Debug, Clone, Default)]
pub struct MaskStore {
    masks: BTreeMap<Frame, Vec<Vec<Pixel>>>,
    image_size: Option<ImageSize>,
}

impl MaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image_size(mut self, size: ImageSize) -> Self {
        self.image_size = Some(size);
        self
    }

    pub fn add(&mut self, frame: Frame, pixels: Vec<Pixel>) {
        self.masks.entry(frame).or_default().push(pixels);
    }

    /// Add the axis-aligned rectangle `[x0, x1] x [y0, y1]` (inclusive) at `frame`.
    pub fn add_rect(&mut self, frame: Frame, x0: u32, x1: u32, y0: u32, y1: u32) {
        let pixels = (x0..=x1)
            .flat_map(|x| (y0..=y1).map(move |y| Pixel::new(x, y)))
            .collect();
        self.add(frame, pixels);
    }
}

impl MaskSource for MaskStore {
    fn mask_at_frame(&self, frame: Frame) -> Vec<Pixel> {
        self.masks
            .get(&frame)
            .map(|masks| masks.iter().flatten().copied().collect())
            .unwrap_or_default()
    }

    fn image_size(&self) -> Option<ImageSize> {
        self.image_size
    }

    fn is_empty(&self) -> bool {
        self.masks.values().flatten().all(Vec::is_empty)
    }
}

/// Group directory backed by an ordered map.
#[derive(Debug, Clone, Default)]
pub struct GroupMap {
    groups: BTreeMap<GroupId, BTreeSet<EntityId>>,
}

impl GroupMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_member(&mut self, group: GroupId, entity: EntityId) {
        self.groups.entry(group).or_default().insert(entity);
    }

    pub fn add_group<I: IntoIterator<Item = EntityId>>(&mut self, group: GroupId, members: I) {
        self.groups.entry(group).or_default().extend(members);
    }
}

impl GroupDirectory for GroupMap {
    fn groups_with_members(&self) -> BTreeMap<GroupId, BTreeSet<EntityId>> {
        self.groups.clone()
    }

    fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_store_unions_masks() {
        let mut store = MaskStore::new();
        assert!(store.is_empty());
        store.add(0, vec![Pixel::new(1, 1)]);
        store.add(0, vec![Pixel::new(2, 2), Pixel::new(3, 3)]);
        assert_eq!(store.mask_at_frame(0).len(), 3);
        assert!(store.mask_at_frame(1).is_empty());
        assert!(!store.is_empty());
    }

    #[test]
    fn test_add_rect_is_inclusive() {
        let mut store = MaskStore::new();
        store.add_rect(4, 0, 2, 0, 1);
        assert_eq!(store.mask_at_frame(4).len(), 6);
    }

    #[test]
    fn test_point_store_keeps_insertion_order() {
        let mut store = PointStore::new();
        store.add(3, 7, 1.0, 2.0);
        store.add(3, 5, 3.0, 4.0);
        let entries = store.points_at_frame(3);
        assert_eq!(entries[0].entity, 7);
        assert_eq!(entries[1].entity, 5);
        assert!(store.points_at_frame(4).is_empty());
    }

    #[test]
    fn test_group_map() {
        let mut groups = GroupMap::new();
        assert!(groups.is_empty());
        groups.add_group(2, [10, 11]);
        groups.add_member(1, 3);
        let listed: Vec<GroupId> = groups.groups_with_members().keys().copied().collect();
        assert_eq!(listed, vec![1, 2]);
    }
}

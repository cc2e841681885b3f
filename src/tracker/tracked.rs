//! The tracker's output: one position per (group, frame).

use std::collections::BTreeMap;

use crate::tracker::geometry::{EntityId, Frame, GroupId, Position};

/// Whether an output row is ground truth or filled in by the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointOrigin {
    Anchor,
    Estimate,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedPoint {
    pub position: Position,
    /// Anchor's own entity, or the group's representative for estimates.
    pub entity: EntityId,
    pub origin: PointOrigin,
}

/// Tracked positions keyed by group, then frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackedPointSet {
    groups: BTreeMap<GroupId, BTreeMap<Frame, TrackedPoint>>,
}

impl TrackedPointSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, group: GroupId, frame: Frame, point: TrackedPoint) {
        self.groups.entry(group).or_default().insert(frame, point);
    }

    pub fn get(&self, group: GroupId, frame: Frame) -> Option<&TrackedPoint> {
        self.groups.get(&group)?.get(&frame)
    }

    /// Every tracked frame of `group`, ascending.
    pub fn group(&self, group: GroupId) -> Option<&BTreeMap<Frame, TrackedPoint>> {
        self.groups.get(&group)
    }

    pub fn groups(&self) -> impl Iterator<Item = GroupId> + '_ {
        self.groups.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.groups.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.values().all(BTreeMap::is_empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (GroupId, Frame, &TrackedPoint)> + '_ {
        self.groups.iter().flat_map(|(&group, frames)| {
            frames.iter().map(move |(&frame, point)| (group, frame, point))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_query() {
        let mut set = TrackedPointSet::new();
        assert!(set.is_empty());
        let point = TrackedPoint {
            position: Position::new(1.0, 2.0),
            entity: 4,
            origin: PointOrigin::Anchor,
        };
        set.insert(2, 10, point);
        set.insert(2, 11, point);
        set.insert(1, 0, point);

        assert_eq!(set.len(), 3);
        assert_eq!(set.get(2, 11), Some(&point));
        assert!(set.get(3, 0).is_none());
        assert_eq!(set.groups().collect::<Vec<_>>(), vec![1, 2]);
        let rows: Vec<(GroupId, Frame)> = set.iter().map(|(g, f, _)| (g, f)).collect();
        assert_eq!(rows, vec![(1, 0), (2, 10), (2, 11)]);
    }
}

//! Collects ground-truth anchors per group from the point container.

use std::collections::{BTreeMap, HashMap};

use log::warn;

use crate::integration::{GroupDirectory, PointSource};
use crate::tracker::geometry::{EntityId, Frame, GroupId, Position};

/// A ground-truth labeled position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub frame: Frame,
    pub position: Position,
    /// Entity that carried the label.
    pub entity: EntityId,
}

/// Anchors of one group, ascending by frame.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupAnchors {
    pub group: GroupId,
    /// Entity estimated positions are attributed to.
    pub representative: EntityId,
    pub anchors: Vec<Anchor>,
}

impl GroupAnchors {
    /// Consecutive anchor pairs bounding each segment.
    pub fn segments(&self) -> impl Iterator<Item = (&Anchor, &Anchor)> {
        self.anchors.windows(2).map(|pair| (&pair[0], &pair[1]))
    }

    pub fn segment_count(&self) -> usize {
        self.anchors.len().saturating_sub(1)
    }
}

/// Extract ordered anchors for every group that has at least one label.
///
/// When two entities of a group are labeled at the same frame, the later one
/// in container order wins.
pub fn extract_ground_truth(
    points: &dyn PointSource,
    groups: &dyn GroupDirectory,
) -> Vec<GroupAnchors> {
    let directory = groups.groups_with_members();

    let mut membership: HashMap<EntityId, Vec<GroupId>> = HashMap::new();
    for (&group, members) in &directory {
        for &entity in members {
            membership.entry(entity).or_default().push(group);
        }
    }

    let mut by_group: HashMap<GroupId, BTreeMap<Frame, Anchor>> = HashMap::new();
    for (frame, entries) in points.all_entries() {
        for entry in entries {
            let Some(owners) = membership.get(&entry.entity) else {
                continue;
            };
            for &group in owners {
                let anchor = Anchor {
                    frame,
                    position: entry.position,
                    entity: entry.entity,
                };
                if let Some(previous) = by_group.entry(group).or_default().insert(frame, anchor) {
                    warn!(
                        "group {} has several labels at frame {} (entities {} and {}); keeping entity {}",
                        group, frame, previous.entity, entry.entity, entry.entity
                    );
                }
            }
        }
    }

    directory
        .iter()
        .filter_map(|(&group, members)| {
            let anchors = by_group.remove(&group)?;
            let representative = members.iter().next().copied()?;
            Some(GroupAnchors {
                group,
                representative,
                anchors: anchors.into_values().collect(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integration::{GroupMap, PointStore};

    #[test]
    fn test_anchors_sorted_per_group() {
        let mut points = PointStore::new();
        points.add(10, 1, 100.0, 0.0);
        points.add(0, 1, 0.0, 0.0);
        points.add(5, 2, 50.0, 0.0);
        points.add(5, 9, 1.0, 1.0);

        let mut groups = GroupMap::new();
        groups.add_group(1, [1, 2]);

        let extracted = extract_ground_truth(&points, &groups);
        assert_eq!(extracted.len(), 1);
        let frames: Vec<Frame> = extracted[0].anchors.iter().map(|a| a.frame).collect();
        assert_eq!(frames, vec![0, 5, 10]);
        assert_eq!(extracted[0].representative, 1);
        assert_eq!(extracted[0].segment_count(), 2);
    }

    #[test]
    fn test_later_entry_wins_on_shared_frame() {
        let mut points = PointStore::new();
        points.add(3, 1, 10.0, 10.0);
        points.add(3, 2, 20.0, 20.0);

        let mut groups = GroupMap::new();
        groups.add_group(7, [1, 2]);

        let extracted = extract_ground_truth(&points, &groups);
        assert_eq!(extracted[0].anchors.len(), 1);
        assert_eq!(extracted[0].anchors[0].entity, 2);
        assert_eq!(extracted[0].anchors[0].position, Position::new(20.0, 20.0));
    }

    #[test]
    fn test_group_without_labels_is_skipped() {
        let mut points = PointStore::new();
        points.add(0, 1, 1.0, 1.0);

        let mut groups = GroupMap::new();
        groups.add_group(1, [1]);
        groups.add_group(2, [42]);

        let extracted = extract_ground_truth(&points, &groups);
        assert_eq!(extracted.len(), 1);
        assert_eq!(extracted[0].group, 1);
    }

    #[test]
    fn test_segments_pair_consecutive_anchors() {
        let mut points = PointStore::new();
        for (i, frame) in [0, 4, 9].into_iter().enumerate() {
            points.add(frame, 1, i as f32, 0.0);
        }
        let mut groups = GroupMap::new();
        groups.add_member(1, 1);

        let extracted = extract_ground_truth(&points, &groups);
        let spans: Vec<(Frame, Frame)> = extracted[0]
            .segments()
            .map(|(a, b)| (a.frame, b.frame))
            .collect();
        assert_eq!(spans, vec![(0, 4), (4, 9)]);
    }
}

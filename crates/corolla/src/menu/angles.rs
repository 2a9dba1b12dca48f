//! Direction assignment for the items of a menu level.
//!
//! Angles are degrees, 0° at the top and growing clockwise. Items with a fixed angle
//! act as anchors; the free items between two consecutive anchors are spread evenly
//! over the wedge the anchors enclose. When a level hangs below a parent, the
//! direction back to that parent (the back link) gets a slot of its own in whatever
//! wedge it falls into.

use super::tree::{MenuTree, NodeIndex};
use super::{DEFAULT_COLLISION_THRESHOLD, FULL_TURN, angular_distance, back_link};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("fixed angle {angle} of item {index} is outside [0, 360)")]
    OutOfRange { index: usize, angle: f64 },
    #[error("fixed angle {angle} of item {index} does not increase over the previous fixed angle")]
    NotIncreasing { index: usize, angle: f64 },
    #[error("fixed angle {angle} of item {index} collides with the parent link at {back_link}")]
    BackLinkCollision {
        index: usize,
        angle: f64,
        back_link: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleAllocator {
    collision_threshold: f64,
}

impl Default for AngleAllocator {
    fn default() -> Self {
        Self::new(DEFAULT_COLLISION_THRESHOLD)
    }
}

impl AngleAllocator {
    pub fn new(collision_threshold: f64) -> Self {
        Self {
            collision_threshold: collision_threshold.max(0.0),
        }
    }

    pub fn collision_threshold(&self) -> f64 {
        self.collision_threshold
    }

    /// Computes one angle per sibling. `fixed[i]` is the caller's angle for item `i`,
    /// if any; the returned list has the same length and keeps every fixed value.
    pub fn allocate(
        &self,
        fixed: &[Option<f64>],
        back_link: Option<f64>,
    ) -> Result<Vec<f64>, LayoutError> {
        let count = fixed.len();
        if count == 0 {
            return Ok(Vec::new());
        }

        let back_link = back_link.map(|b| b.rem_euclid(FULL_TURN));
        let mut anchors = self.anchors(fixed, back_link)?;

        if anchors.is_empty() {
            let first = match back_link {
                Some(b) => Self::opposing_angle(count, b),
                None => 0.0,
            };
            anchors.push((0, first));
        }

        let mut angles = vec![0.0; count];

        for (k, &(begin_index, begin)) in anchors.iter().enumerate() {
            let (end_index, mut end) = anchors[(k + 1) % anchors.len()];
            angles[begin_index] = begin;

            if end <= begin {
                end += FULL_TURN;
            }

            let mut slots = (end_index + count - begin_index - 1) % count;

            let back_link = back_link
                .map(|b| if b < begin { b + FULL_TURN } else { b })
                .filter(|&b| b > begin && b < end);
            if back_link.is_some() {
                slots += 1;
            }

            let gap = (end - begin) / (slots + 1) as f64;
            let mut index = (begin_index + 1) % count;
            let mut step = 1.0;
            let mut pending_gap = back_link;

            while index != end_index {
                let mut angle = begin + gap * step;

                // the back link takes the first slot whose half-gap reaches it
                if let Some(b) = pending_gap
                    && angle + gap / 2.0 - b > 0.0
                {
                    step += 1.0;
                    angle = begin + gap * step;
                    pending_gap = None;
                }

                angles[index] = angle.rem_euclid(FULL_TURN);
                index = (index + 1) % count;
                step += 1.0;
            }
        }

        Ok(angles)
    }

    /// Validated `(index, angle)` pairs of the fixed items.
    fn anchors(
        &self,
        fixed: &[Option<f64>],
        back_link: Option<f64>,
    ) -> Result<Vec<(usize, f64)>, LayoutError> {
        let anchors: Vec<(usize, f64)> = fixed
            .iter()
            .enumerate()
            .filter_map(|(index, angle)| angle.map(|a| (index, a)))
            .collect();

        let mut previous: Option<f64> = None;
        for &(index, angle) in &anchors {
            if !(0.0..FULL_TURN).contains(&angle) {
                return Err(LayoutError::OutOfRange { index, angle });
            }
            if previous.is_some_and(|p| angle <= p) {
                return Err(LayoutError::NotIncreasing { index, angle });
            }
            previous = Some(angle);
        }

        if let Some(back_link) = back_link
            && let Some(&(index, angle)) = anchors
                .iter()
                .find(|(_, a)| angular_distance(*a, back_link) <= self.collision_threshold)
        {
            return Err(LayoutError::BackLinkCollision {
                index,
                angle,
                back_link,
            });
        }

        Ok(anchors)
    }

    /// Of the `count` evenly spaced candidates that leave one slot for the back link,
    /// the one farthest from it. Ties go to the first candidate.
    fn opposing_angle(count: usize, back_link: f64) -> f64 {
        let wedge = FULL_TURN / (count + 1) as f64;
        let mut best = (back_link + wedge).rem_euclid(FULL_TURN);

        for i in 1..count {
            let candidate = (back_link + (i + 1) as f64 * wedge).rem_euclid(FULL_TURN);
            if angular_distance(candidate, back_link) > angular_distance(best, back_link) {
                best = candidate;
            }
        }
        best
    }

    /// Lays out every level below `root` of `tree` and returns the resulting angle for
    /// each node, indexed by `NodeIndex`. Nothing in the tree is modified.
    pub fn allocate_tree(&self, tree: &MenuTree) -> Result<Vec<f64>, LayoutError> {
        let mut angles = vec![0.0; tree.len()];
        let mut pending: Vec<(NodeIndex, Option<f64>)> = vec![(tree.root(), None)];

        while let Some((node, link)) = pending.pop() {
            let children = tree.children(node);
            if children.is_empty() {
                continue;
            }

            let level = self.allocate(&tree.fixed_child_angles(node), link)?;
            for (&child, angle) in children.iter().zip(level) {
                angles[child.get()] = angle;
                pending.push((child, Some(back_link(angle))));
            }
        }

        Ok(angles)
    }

    /// Assigns angles to the whole tree, or leaves it untouched on error.
    pub fn layout(&self, tree: &mut MenuTree) -> Result<(), LayoutError> {
        let angles = self.allocate_tree(tree)?;
        for (index, angle) in angles.into_iter().enumerate() {
            tree.node_mut(NodeIndex::from(index)).angle = angle;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MenuStructure;

    const EPS: f64 = 1e-9;

    fn assert_angles(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-6, "{actual:?} vs {expected:?}");
        }
    }

    #[test]
    fn test_free_items_start_at_the_top() {
        let angles = AngleAllocator::default()
            .allocate(&[None; 4], None)
            .unwrap();
        assert_angles(&angles, &[0.0, 90.0, 180.0, 270.0]);
    }

    #[test]
    fn test_free_items_fill_wedges_between_anchors() {
        let fixed = [None, Some(10.0), None, Some(200.0), None];
        let angles = AngleAllocator::default().allocate(&fixed, None).unwrap();

        let gap = 170.0 / 3.0;
        assert_angles(
            &angles,
            &[200.0 + 2.0 * gap, 10.0, 105.0, 200.0, 200.0 + gap],
        );
    }

    #[test]
    fn test_single_item() {
        let allocator = AngleAllocator::default();
        assert_angles(&allocator.allocate(&[None], None).unwrap(), &[0.0]);
        assert_angles(&allocator.allocate(&[None], Some(90.0)).unwrap(), &[270.0]);
        assert_angles(&allocator.allocate(&[Some(33.0)], None).unwrap(), &[33.0]);
        assert!(allocator.allocate(&[], Some(90.0)).unwrap().is_empty());
    }

    #[test]
    fn test_default_anchor_opposes_the_back_link() {
        // three items plus the back link make four slots of 90°
        let angles = AngleAllocator::default()
            .allocate(&[None; 3], Some(180.0))
            .unwrap();
        assert_angles(&angles, &[0.0, 90.0, 270.0]);
    }

    #[test]
    fn test_back_link_gets_its_own_slot() {
        // anchor at 0°, back link at 90° inside the single 360° wedge
        let fixed = [Some(0.0), None, None];
        let angles = AngleAllocator::default()
            .allocate(&fixed, Some(90.0))
            .unwrap();
        assert_angles(&angles, &[0.0, 180.0, 270.0]);
    }

    #[test]
    fn test_back_link_outside_a_wedge_is_ignored_there() {
        let fixed = [Some(90.0), None, Some(270.0), None];
        let angles = AngleAllocator::default()
            .allocate(&fixed, Some(0.0))
            .unwrap();
        // the upper wedge [270, 450) holds item 3 and the back link
        assert_angles(&angles, &[90.0, 180.0, 270.0, 330.0]);
    }

    #[test]
    fn test_rejects_decreasing_fixed_angles() {
        let fixed = [Some(90.0), None, Some(45.0)];
        assert_eq!(
            AngleAllocator::default().allocate(&fixed, None),
            Err(LayoutError::NotIncreasing {
                index: 2,
                angle: 45.0
            })
        );

        let equal = [Some(90.0), Some(90.0)];
        assert!(AngleAllocator::default().allocate(&equal, None).is_err());
    }

    #[test]
    fn test_rejects_out_of_range_angles() {
        let allocator = AngleAllocator::default();
        for angle in [-1.0, 360.0, 720.0, f64::NAN] {
            assert!(matches!(
                allocator.allocate(&[None, Some(angle)], None),
                Err(LayoutError::OutOfRange { index: 1, .. })
            ));
        }
    }

    #[test]
    fn test_rejects_back_link_collisions() {
        let allocator = AngleAllocator::default();
        assert!(matches!(
            allocator.allocate(&[Some(180.5), None], Some(180.0)),
            Err(LayoutError::BackLinkCollision { index: 0, .. })
        ));
        // collisions are measured around the circle
        assert!(allocator.allocate(&[None, Some(359.5)], Some(0.2)).is_err());
        assert!(allocator.allocate(&[Some(182.0), None], Some(180.0)).is_ok());

        let strict = AngleAllocator::new(0.0);
        assert!(strict.allocate(&[Some(180.0)], Some(180.0)).is_err());
        assert!(strict.allocate(&[Some(180.5)], Some(180.0)).is_ok());
    }

    #[test]
    fn test_feeding_results_back_is_stable() {
        let allocator = AngleAllocator::default();
        let first = allocator
            .allocate(&[None, Some(120.0), None, None, None], None)
            .unwrap();
        assert_angles(&first, &[48.0, 120.0, 192.0, 264.0, 336.0]);
        let fixed: Vec<_> = first.iter().copied().map(Some).collect();
        assert_eq!(allocator.allocate(&fixed, None).unwrap(), first);
    }

    #[test]
    fn test_tree_layout_links_levels() {
        let structure = MenuStructure::new("root").with_children(vec![
            MenuStructure::new("up").with_children(vec![
                MenuStructure::new("x"),
                MenuStructure::new("y"),
                MenuStructure::new("z"),
            ]),
            MenuStructure::new("right"),
            MenuStructure::new("down"),
            MenuStructure::new("left"),
        ]);
        let mut tree = MenuTree::build(&structure);
        AngleAllocator::default().layout(&mut tree).unwrap();

        assert_angles(&tree.child_angles(tree.root()), &[0.0, 90.0, 180.0, 270.0]);
        let up = tree.children(tree.root())[0];
        // back link points down, items fill the other three quarters
        assert_angles(&tree.child_angles(up), &[0.0, 90.0, 270.0]);
    }

    #[test]
    fn test_tree_layout_is_all_or_nothing() {
        let structure = MenuStructure::new("root").with_children(vec![
            MenuStructure::new("a").with_children(vec![MenuStructure::new("ok")]),
            MenuStructure::new("b").with_angle(90.0).with_children(vec![
                MenuStructure::new("bad").with_angle(270.0),
            ]),
        ]);
        let mut tree = MenuTree::build(&structure);
        let before: Vec<f64> = tree.iter().map(|(_, n)| n.angle).collect();

        let err = AngleAllocator::default().layout(&mut tree).unwrap_err();
        assert!(matches!(err, LayoutError::BackLinkCollision { .. }));

        let after: Vec<f64> = tree.iter().map(|(_, n)| n.angle).collect();
        assert_eq!(before.len(), after.len());
        assert!(before.iter().zip(&after).all(|(a, b)| (a - b).abs() < EPS));
    }
}

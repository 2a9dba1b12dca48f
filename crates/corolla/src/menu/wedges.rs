use super::{FULL_TURN, angular_distance};
use hyprwarp::wm::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WedgeHit {
    Center,
    Child(usize),
    Parent,
}

/// Maps pointer positions to the item whose direction is closest, measured from the
/// current center. Inside the dead zone around the center nothing but the center
/// itself is hit.
#[derive(Debug, Clone)]
pub struct SelectionWedges {
    center: Point,
    inner_radius: f64,
    item_angles: Vec<f64>,
    parent_angle: Option<f64>,
    current: WedgeHit,
}

impl SelectionWedges {
    pub fn new(inner_radius: f64) -> Self {
        Self {
            center: Point::default(),
            inner_radius,
            item_angles: Vec::new(),
            parent_angle: None,
            current: WedgeHit::Center,
        }
    }

    pub fn set_center(&mut self, center: Point) {
        self.center = center;
    }

    pub fn set_inner_radius(&mut self, inner_radius: f64) {
        self.inner_radius = inner_radius;
    }

    /// Replaces the ring and forgets the current hit.
    pub fn set_item_angles(&mut self, item_angles: Vec<f64>, parent_angle: Option<f64>) {
        self.item_angles = item_angles;
        self.parent_angle = parent_angle;
        self.current = WedgeHit::Center;
    }

    pub fn current(&self) -> WedgeHit {
        self.current
    }

    /// Pointer direction around the center, 0° up and clockwise.
    fn pointer_angle(&self, pointer: Point) -> f64 {
        let (dx, dy) = (pointer.x - self.center.x, pointer.y - self.center.y);
        dx.atan2(-dy).to_degrees().rem_euclid(FULL_TURN)
    }

    pub fn hit(&self, pointer: Point) -> WedgeHit {
        let (dx, dy) = (pointer.x - self.center.x, pointer.y - self.center.y);

        // dead zone
        if dx.hypot(dy) <= self.inner_radius {
            return WedgeHit::Center;
        }

        let angle = self.pointer_angle(pointer);
        let items = self
            .item_angles
            .iter()
            .enumerate()
            .map(|(i, &a)| (WedgeHit::Child(i), a));
        let parent = self.parent_angle.map(|a| (WedgeHit::Parent, a));

        items
            .chain(parent)
            .min_by(|(_, a), (_, b)| {
                angular_distance(angle, *a).total_cmp(&angular_distance(angle, *b))
            })
            .map_or(WedgeHit::Center, |(hit, _)| hit)
    }

    /// Records the wedge under `pointer` and returns it when it differs from the last one.
    pub fn update(&mut self, pointer: Point) -> Option<WedgeHit> {
        let hit = self.hit(pointer);
        if hit == self.current {
            return None;
        }
        self.current = hit;
        Some(hit)
    }
}

pub mod angles;
pub mod chain;
pub mod controller;
pub mod render;
pub mod state;
pub mod tree;
pub mod wedges;

pub use angles::{AngleAllocator, LayoutError};
pub use chain::SelectionChain;
pub use controller::{
    DesktopError, DisplayGeometry, ErrorCode, InputManipulator, MenuListener, NavigationError,
    PieMenu,
};
pub use render::NodeVisual;
pub use state::NodeState;
pub use tree::{ItemId, MenuId, MenuNode, MenuTree, NodeIndex};
pub use wedges::{SelectionWedges, WedgeHit};

pub const FULL_TURN: f64 = 360.0;
pub const DEFAULT_COLLISION_THRESHOLD: f64 = 1.0; // degrees between a fixed item and the back link
pub const CLAMP_MARGIN: f64 = 10.0; // px kept free at monitor edges
pub const CANCEL_BUTTON: u32 = 3;

/// Shortest angular distance between two directions, in degrees.
pub fn angular_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(FULL_TURN);
    d.min(FULL_TURN - d)
}

/// Direction pointing back at the parent from a ring laid out around `angle`.
pub fn back_link(angle: f64) -> f64 {
    (angle + FULL_TURN / 2.0).rem_euclid(FULL_TURN)
}

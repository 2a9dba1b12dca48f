use super::angles::{AngleAllocator, LayoutError};
use super::chain::SelectionChain;
use super::render::{self, NodeVisual};
use super::state::{NodeState, set_state, set_state_with_active};
use super::tree::{ItemId, MenuId, MenuTree, NodeIndex};
use super::wedges::{SelectionWedges, WedgeHit};
use super::{CANCEL_BUTTON, CLAMP_MARGIN, back_link};
use crate::config::{MenuStructure, Settings};
use hyprwarp::wm::{Point, Rect, WarpError};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DesktopError {
    #[error("input grab failed: {0}")]
    Grab(String),
    #[error("pointer warp failed: {0}")]
    Warp(#[from] WarpError),
}

pub trait InputManipulator {
    fn warp_pointer(&mut self, to: Point) -> Result<(), DesktopError>;
    fn grab_input(&mut self) -> Result<(), DesktopError>;
    fn release_input(&mut self);
}

pub trait DisplayGeometry {
    fn pointer_position(&self) -> Option<Point>;
    fn monitor_bounds(&self) -> Option<Rect>;
}

/// Receives the outcome of a menu session. Called synchronously from the controller.
pub trait MenuListener {
    fn on_hover(&mut self, menu: MenuId, item: &ItemId);
    fn on_select(&mut self, menu: MenuId, item: &ItemId);
    fn on_cancel(&mut self, menu: MenuId);
    /// The session was closed from outside, without a selection.
    fn on_hide(&mut self, _menu: MenuId) {}
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorCode {
    #[error("{0}")]
    UnknownError(String),
    #[error("another menu is already open")]
    AlreadyActive,
    #[error("menu structure is missing {0}")]
    PropertyMissing(&'static str),
    #[error("invalid menu json: {0}")]
    InvalidJson(String),
    #[error(transparent)]
    InvalidAngles(#[from] LayoutError),
}

impl ErrorCode {
    pub fn code(&self) -> i32 {
        match self {
            Self::UnknownError(_) => -1,
            Self::AlreadyActive => -2,
            Self::PropertyMissing(_) => -3,
            Self::InvalidJson(_) => -4,
            Self::InvalidAngles(_) => -5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("no menu is open")]
    Idle,
    #[error("the current center has no child {0}")]
    NoSuchChild(usize),
    #[error("the root has no parent")]
    AtRoot,
}

struct Session {
    id: MenuId,
    tree: MenuTree,
    chain: SelectionChain,
    anchors: HashMap<NodeIndex, Point>,
    wedges: SelectionWedges,
    listener: Box<dyn MenuListener>,
    pointer: Point,
}

/// Drives one radial menu at a time: layout on open, navigation through the selection
/// chain and pointer placement through the desktop collaborator.
pub struct PieMenu<D> {
    desktop: D,
    settings: Settings,
    allocator: AngleAllocator,
    session: Option<Session>,
}

/// Anchor for a center under `pointer`, kept far enough from the monitor edges for
/// the whole menu to fit.
fn clamp_anchor(settings: &Settings, bounds: Option<Rect>, pointer: Point) -> Point {
    match bounds {
        Some(bounds) => bounds
            .clamp(pointer, CLAMP_MARGIN + settings.max_radius())
            .floor(),
        None => pointer.floor(),
    }
}

impl<D: InputManipulator + DisplayGeometry> PieMenu<D> {
    pub fn new(desktop: D, settings: Settings, allocator: AngleAllocator) -> Self {
        Self {
            desktop,
            settings,
            allocator,
            session: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn menu_id(&self) -> Option<MenuId> {
        self.session.as_ref().map(|s| s.id)
    }

    pub fn chain(&self) -> Option<&SelectionChain> {
        self.session.as_ref().map(|s| &s.chain)
    }

    pub fn tree(&self) -> Option<&MenuTree> {
        self.session.as_ref().map(|s| &s.tree)
    }

    pub fn anchor(&self, node: NodeIndex) -> Option<Point> {
        self.session.as_ref()?.anchors.get(&node).copied()
    }

    /// Applies new sizing and layout settings. An open menu keeps its angles.
    pub fn set_settings(&mut self, settings: Settings, collision_threshold: f64) {
        if let Some(session) = &mut self.session {
            session.wedges.set_inner_radius(settings.inner_radius());
        }
        self.settings = settings;
        self.allocator = AngleAllocator::new(collision_threshold);
    }

    pub fn show(
        &mut self,
        id: MenuId,
        structure: &MenuStructure,
        edit_mode: bool,
        listener: Box<dyn MenuListener>,
    ) -> Result<MenuId, ErrorCode> {
        if self.session.is_some() {
            return Err(ErrorCode::AlreadyActive);
        }
        if structure.children.is_empty() {
            return Err(ErrorCode::PropertyMissing("children"));
        }

        let mut tree = MenuTree::build(structure);
        self.allocator.layout(&mut tree)?;

        self.desktop
            .grab_input()
            .map_err(|e| ErrorCode::UnknownError(e.to_string()))?;

        let pointer = self.desktop.pointer_position().unwrap_or_default();
        let bounds = self.desktop.monitor_bounds();
        let anchor = if edit_mode {
            bounds.map_or(pointer.floor(), |b| b.center().floor())
        } else {
            let anchor = clamp_anchor(&self.settings, bounds, pointer);
            if let Err(e) = self.desktop.warp_pointer(anchor) {
                self.desktop.release_input();
                return Err(ErrorCode::UnknownError(e.to_string()));
            }
            anchor
        };

        let root = tree.root();
        set_state_with_active(&mut tree, root, NodeState::CenterHovered, None);

        let mut wedges = SelectionWedges::new(self.settings.inner_radius());
        wedges.set_center(anchor);
        wedges.set_item_angles(tree.child_angles(root), None);

        log::debug!("Opened menu {} with {} items", id, tree.len());

        self.session = Some(Session {
            id,
            tree,
            chain: SelectionChain::new(root),
            anchors: HashMap::from([(root, anchor)]),
            wedges,
            listener,
            pointer: if edit_mode { pointer } else { anchor },
        });

        Ok(id)
    }

    /// Makes child `index` of the current center the new center. Selecting a leaf
    /// reports it to the listener and closes the menu.
    pub fn select_child(&mut self, index: usize) -> Result<(), NavigationError> {
        let Self {
            desktop,
            settings,
            allocator,
            session,
        } = self;
        let session = session.as_mut().ok_or(NavigationError::Idle)?;

        let center = session.chain.center();
        let child = session
            .tree
            .child(center, index)
            .ok_or(NavigationError::NoSuchChild(index))?;

        set_state_with_active(&mut session.tree, center, NodeState::Parent, Some(index));
        session.chain.push(child);

        let pointer = desktop.pointer_position().unwrap_or(session.pointer);
        let anchor = clamp_anchor(settings, desktop.monitor_bounds(), pointer);
        if let Err(e) = desktop.warp_pointer(anchor) {
            log::warn!("Failed to move the pointer to the new center: {}", e);
        }
        session.anchors.insert(child, anchor);
        session.pointer = anchor;

        let back = back_link(session.tree.node(child).angle);
        if !session.tree.node(child).is_leaf() {
            match allocator.allocate(&session.tree.fixed_child_angles(child), Some(back)) {
                Ok(angles) => session.tree.set_child_angles(child, &angles),
                Err(e) => log::warn!("Keeping the previous layout of {}: {}", child, e),
            }
        }
        session.wedges.set_center(anchor);
        session
            .wedges
            .set_item_angles(session.tree.child_angles(child), Some(back));

        set_state_with_active(&mut session.tree, child, NodeState::CenterHovered, None);
        log::debug!(
            "Selected {} (chain depth {})",
            session.tree.node(child).id,
            session.chain.len()
        );

        if session.tree.node(child).is_leaf() {
            let id = session.tree.node(child).id.clone();
            session.listener.on_select(session.id, &id);
            self.close();
        }

        Ok(())
    }

    /// Returns to the parent of the current center and restores its ring.
    pub fn select_parent(&mut self) -> Result<(), NavigationError> {
        let Self {
            desktop,
            settings,
            allocator,
            session,
        } = self;
        let session = session.as_mut().ok_or(NavigationError::Idle)?;
        let Some(parent) = session.chain.parent() else {
            return Err(NavigationError::AtRoot);
        };

        set_state_with_active(&mut session.tree, parent, NodeState::CenterHovered, None);
        if let Some(popped) = session.chain.pop() {
            session.anchors.remove(&popped);
        }

        let back = (session.chain.len() > 1).then(|| back_link(session.tree.node(parent).angle));
        match allocator.allocate(&session.tree.fixed_child_angles(parent), back) {
            Ok(angles) => session.tree.set_child_angles(parent, &angles),
            Err(e) => log::warn!("Keeping the previous layout of {}: {}", parent, e),
        }

        let pointer = desktop.pointer_position().unwrap_or(session.pointer);
        let anchor = clamp_anchor(settings, desktop.monitor_bounds(), pointer);
        if let Err(e) = desktop.warp_pointer(anchor) {
            log::warn!("Failed to move the pointer back to the parent: {}", e);
        }
        session.anchors.insert(parent, anchor);
        session.pointer = anchor;

        session.wedges.set_center(anchor);
        session
            .wedges
            .set_item_angles(session.tree.child_angles(parent), back);

        log::debug!(
            "Returned to {} (chain depth {})",
            session.tree.node(parent).id,
            session.chain.len()
        );
        Ok(())
    }

    pub fn hover_child(&mut self, index: usize) -> Result<(), NavigationError> {
        let session = self.session.as_mut().ok_or(NavigationError::Idle)?;
        let center = session.chain.center();
        let child = session
            .tree
            .child(center, index)
            .ok_or(NavigationError::NoSuchChild(index))?;

        set_state_with_active(&mut session.tree, center, NodeState::Center, Some(index));
        if let Some(parent) = session.chain.parent() {
            set_state(&mut session.tree, parent, NodeState::Parent);
        }

        let id = session.tree.node(child).id.clone();
        session.listener.on_hover(session.id, &id);
        Ok(())
    }

    pub fn hover_center(&mut self) -> Result<(), NavigationError> {
        let session = self.session.as_mut().ok_or(NavigationError::Idle)?;
        let center = session.chain.center();

        set_state_with_active(&mut session.tree, center, NodeState::CenterHovered, None);
        if let Some(parent) = session.chain.parent() {
            set_state(&mut session.tree, parent, NodeState::Parent);
        }

        let id = session.tree.node(center).id.clone();
        session.listener.on_hover(session.id, &id);
        Ok(())
    }

    pub fn hover_parent(&mut self) -> Result<(), NavigationError> {
        let session = self.session.as_mut().ok_or(NavigationError::Idle)?;
        let Some(parent) = session.chain.parent() else {
            return Err(NavigationError::AtRoot);
        };
        let center = session.chain.center();

        set_state_with_active(&mut session.tree, center, NodeState::CenterHovered, None);
        set_state(&mut session.tree, parent, NodeState::ParentHovered);

        let id = session.tree.node(parent).id.clone();
        session.listener.on_hover(session.id, &id);
        Ok(())
    }

    /// Aborts the open menu. Does nothing when idle.
    pub fn cancel(&mut self) {
        if let Some(session) = &mut self.session {
            log::debug!("Cancelled menu {}", session.id);
            session.listener.on_cancel(session.id);
            self.close();
        }
    }

    /// Closes the open menu without a selection. Does nothing when idle.
    pub fn hide(&mut self) {
        if let Some(session) = &mut self.session {
            log::debug!("Hid menu {}", session.id);
            session.listener.on_hide(session.id);
            self.close();
        }
    }

    fn close(&mut self) {
        if self.session.take().is_some() {
            self.desktop.release_input();
        }
    }

    /// Hovers whatever lies under `pointer`, if that changed since the last motion.
    pub fn on_motion(&mut self, pointer: Point) -> Result<(), NavigationError> {
        let session = self.session.as_mut().ok_or(NavigationError::Idle)?;
        session.pointer = pointer;

        match session.wedges.update(pointer) {
            Some(WedgeHit::Center) => self.hover_center(),
            Some(WedgeHit::Child(index)) => self.hover_child(index),
            Some(WedgeHit::Parent) => self.hover_parent(),
            None => Ok(()),
        }
    }

    /// Commits the hovered wedge. The secondary button cancels instead.
    pub fn on_release(&mut self, button: u32) -> Result<(), NavigationError> {
        if button == CANCEL_BUTTON {
            self.cancel();
            return Ok(());
        }

        let session = self.session.as_ref().ok_or(NavigationError::Idle)?;
        match session.wedges.current() {
            WedgeHit::Child(index) => self.select_child(index),
            WedgeHit::Parent => self.select_parent(),
            WedgeHit::Center => Ok(()),
        }
    }

    pub fn frame(&self) -> Vec<NodeVisual> {
        self.session
            .as_ref()
            .map(|s| render::frame(&self.settings, &s.tree, &s.anchors))
            .unwrap_or_default()
    }
}

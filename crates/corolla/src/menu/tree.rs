use super::state::NodeState;
use crate::config::MenuStructure;
use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};

/// Path-like item identifier reported to listeners, e.g. `/0/2`.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct ItemId(String);

hyprwarp::impl_string_newtype!(ItemId);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Display, From, Into,
)]
#[serde(transparent)]
pub struct MenuId(u32);

impl MenuId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1).max(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into)]
pub struct NodeIndex(usize);

impl NodeIndex {
    pub const ROOT: Self = Self(0);

    pub fn get(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct MenuNode {
    pub id: ItemId,
    pub name: String,
    pub icon: String,
    /// Direction requested by the caller. The allocator never moves these.
    pub fixed_angle: Option<f64>,
    pub angle: f64,
    pub parent: Option<NodeIndex>,
    pub children: Vec<NodeIndex>,
    pub state: NodeState,
    pub active_child: Option<usize>,
}

impl MenuNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Arena holding one menu session's items. The root is always `NodeIndex::ROOT`.
#[derive(Debug, Clone)]
pub struct MenuTree {
    nodes: Vec<MenuNode>,
}

impl MenuTree {
    /// Copies `structure` into an arena and assigns ids to items that have none.
    /// Root level items get `/<index>`, deeper ones `<parent id>/<index>`.
    pub fn build(structure: &MenuStructure) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        let root_id = structure.id.clone().unwrap_or_else(|| ItemId::new("/"));
        let root = tree.push(structure, root_id, None);
        tree.nodes[root.0].angle = 0.0;
        tree.nodes[root.0].fixed_angle = None;

        let mut pending = vec![(root, structure)];
        while let Some((parent, source)) = pending.pop() {
            for (i, child) in source.children.iter().enumerate() {
                let id = child
                    .id
                    .clone()
                    .unwrap_or_else(|| tree.child_id(parent, i));
                let index = tree.push(child, id, Some(parent));
                tree.nodes[parent.0].children.push(index);
                pending.push((index, child));
            }
        }

        tree
    }

    fn push(&mut self, source: &MenuStructure, id: ItemId, parent: Option<NodeIndex>) -> NodeIndex {
        let fixed_angle = source.angle.map(|h| h.0);
        self.nodes.push(MenuNode {
            id,
            name: source.name.clone(),
            icon: source.icon.clone(),
            fixed_angle,
            angle: fixed_angle.unwrap_or_default(),
            parent,
            children: Vec::with_capacity(source.children.len()),
            state: NodeState::Invisible,
            active_child: None,
        });
        NodeIndex(self.nodes.len() - 1)
    }

    fn child_id(&self, parent: NodeIndex, index: usize) -> ItemId {
        if parent == NodeIndex::ROOT {
            ItemId::new(format!("/{index}"))
        } else {
            ItemId::new(format!("{}/{index}", self.nodes[parent.0].id))
        }
    }

    pub fn root(&self) -> NodeIndex {
        NodeIndex::ROOT
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, index: NodeIndex) -> &MenuNode {
        &self.nodes[index.0]
    }

    pub fn node_mut(&mut self, index: NodeIndex) -> &mut MenuNode {
        &mut self.nodes[index.0]
    }

    pub fn children(&self, index: NodeIndex) -> &[NodeIndex] {
        &self.nodes[index.0].children
    }

    pub fn child(&self, index: NodeIndex, nth: usize) -> Option<NodeIndex> {
        self.nodes[index.0].children.get(nth).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, &MenuNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeIndex(i), n))
    }

    /// Fixed angles of the children of `index`, in child order.
    pub fn fixed_child_angles(&self, index: NodeIndex) -> Vec<Option<f64>> {
        self.children(index)
            .iter()
            .map(|&c| self.nodes[c.0].fixed_angle)
            .collect()
    }

    pub fn child_angles(&self, index: NodeIndex) -> Vec<f64> {
        self.children(index)
            .iter()
            .map(|&c| self.nodes[c.0].angle)
            .collect()
    }

    pub fn set_child_angles(&mut self, index: NodeIndex, angles: &[f64]) {
        let children = self.nodes[index.0].children.clone();
        for (child, &angle) in children.into_iter().zip(angles) {
            self.nodes[child.0].angle = angle;
        }
    }
}

use super::tree::{MenuTree, NodeIndex};
use serde::Serialize;
use strum::Display as StrumDisplay;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, StrumDisplay)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NodeState {
    /// Children of grandchildren, and everything below a hidden node.
    #[default]
    Invisible,
    /// The active node while one of its children is hovered.
    Center,
    /// The active node while the pointer rests in the middle.
    CenterHovered,
    Child,
    ChildHovered,
    Grandchild,
    /// Children of the hovered child.
    GrandchildHovered,
    /// The back-navigation link. Drawn like `Child`.
    Parent,
    ParentHovered,
}

impl NodeState {
    pub fn visual(self) -> Self {
        match self {
            Self::Parent => Self::Child,
            Self::ParentHovered => Self::ChildHovered,
            other => other,
        }
    }

    pub fn is_visible(self) -> bool {
        self != Self::Invisible
    }

    pub fn is_center(self) -> bool {
        matches!(self, Self::Center | Self::CenterHovered)
    }

    /// State a child at `index` takes when its parent enters `self`. `None` leaves
    /// the child and its subtree untouched.
    fn for_child(self, index: usize, active_child: Option<usize>) -> Option<Self> {
        let active = active_child == Some(index);
        match self {
            Self::CenterHovered => Some(Self::Child),
            Self::Center if active => Some(Self::ChildHovered),
            Self::Center => Some(Self::Child),
            Self::Child => Some(Self::Grandchild),
            Self::ChildHovered => Some(Self::GrandchildHovered),
            Self::Parent | Self::ParentHovered if active => None,
            Self::Parent => Some(Self::Grandchild),
            Self::ParentHovered => Some(Self::GrandchildHovered),
            Self::Invisible | Self::Grandchild | Self::GrandchildHovered => Some(Self::Invisible),
        }
    }
}

/// Sets `state` on `node`, keeping its active child, and updates its whole subtree.
pub fn set_state(tree: &mut MenuTree, node: NodeIndex, state: NodeState) {
    let active = tree.node(node).active_child;
    set_state_with_active(tree, node, state, active);
}

/// Sets `state` and the active child index on `node`, then applies the state table to
/// every descendant. Descendants reached this way lose their active child.
pub fn set_state_with_active(
    tree: &mut MenuTree,
    node: NodeIndex,
    state: NodeState,
    active_child: Option<usize>,
) {
    let entry = tree.node_mut(node);
    entry.state = state;
    entry.active_child = active_child.filter(|&i| i < entry.children.len());

    let active = entry.active_child;
    let children = entry.children.clone();
    for (i, child) in children.into_iter().enumerate() {
        if let Some(child_state) = state.for_child(i, active) {
            set_state_with_active(tree, child, child_state, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MenuStructure;

    fn tree() -> MenuTree {
        let leaf = |n: &str| MenuStructure::new(n);
        let grandchildren = || vec![leaf("x").with_children(vec![leaf("deep")]), leaf("y")];
        MenuTree::build(&MenuStructure::new("root").with_children(vec![
            leaf("a").with_children(grandchildren()),
            leaf("b").with_children(grandchildren()),
            leaf("c"),
        ]))
    }

    fn states(tree: &MenuTree, of: NodeIndex) -> Vec<NodeState> {
        tree.children(of).iter().map(|&c| tree.node(c).state).collect()
    }

    #[test]
    fn test_center_hovered_shows_plain_children() {
        let mut tree = tree();
        let root = tree.root();
        set_state_with_active(&mut tree, root, NodeState::CenterHovered, None);

        assert_eq!(states(&tree, root), vec![NodeState::Child; 3]);
        for &child in tree.children(root) {
            for &grandchild in tree.children(child) {
                assert_eq!(tree.node(grandchild).state, NodeState::Grandchild);
                for &deep in tree.children(grandchild) {
                    assert_eq!(tree.node(deep).state, NodeState::Invisible);
                }
            }
        }
    }

    #[test]
    fn test_center_marks_the_active_child() {
        let mut tree = tree();
        let root = tree.root();
        set_state_with_active(&mut tree, root, NodeState::Center, Some(1));

        assert_eq!(
            states(&tree, root),
            vec![NodeState::Child, NodeState::ChildHovered, NodeState::Child]
        );
        let hovered = tree.children(root)[1];
        assert_eq!(
            states(&tree, hovered),
            vec![NodeState::GrandchildHovered; 2]
        );
        let plain = tree.children(root)[0];
        assert_eq!(states(&tree, plain), vec![NodeState::Grandchild; 2]);
    }

    #[test]
    fn test_parent_leaves_the_active_child_alone() {
        let mut tree = tree();
        let root = tree.root();
        let a = tree.children(root)[0];
        set_state_with_active(&mut tree, a, NodeState::CenterHovered, None);
        set_state_with_active(&mut tree, root, NodeState::Parent, Some(0));

        assert_eq!(tree.node(a).state, NodeState::CenterHovered);
        assert_eq!(states(&tree, a), vec![NodeState::Child; 2]);
        assert_eq!(
            states(&tree, root),
            vec![
                NodeState::CenterHovered,
                NodeState::Grandchild,
                NodeState::Grandchild
            ]
        );

        set_state(&mut tree, root, NodeState::ParentHovered);
        assert_eq!(tree.node(root).active_child, Some(0));
        assert_eq!(
            states(&tree, root),
            vec![
                NodeState::CenterHovered,
                NodeState::GrandchildHovered,
                NodeState::GrandchildHovered
            ]
        );
    }

    #[test]
    fn test_invisible_hides_everything() {
        let mut tree = tree();
        let root = tree.root();
        set_state_with_active(&mut tree, root, NodeState::CenterHovered, None);
        set_state_with_active(&mut tree, root, NodeState::Invisible, None);

        assert!(tree.iter().all(|(_, n)| n.state == NodeState::Invisible));
    }

    #[test]
    fn test_out_of_range_active_child_is_dropped() {
        let mut tree = tree();
        let root = tree.root();
        set_state_with_active(&mut tree, root, NodeState::Center, Some(7));

        assert_eq!(tree.node(root).active_child, None);
        assert_eq!(states(&tree, root), vec![NodeState::Child; 3]);
    }

    #[test]
    fn test_parent_states_render_as_children() {
        assert_eq!(NodeState::Parent.visual(), NodeState::Child);
        assert_eq!(NodeState::ParentHovered.visual(), NodeState::ChildHovered);
        assert_eq!(NodeState::Grandchild.visual(), NodeState::Grandchild);
        assert_eq!(NodeState::ParentHovered.to_string(), "parent_hovered");
    }
}

use super::state::NodeState;
use super::tree::{ItemId, MenuTree, NodeIndex};
use crate::config::Settings;
use hyprwarp::wm::Point;
use serde::Serialize;
use std::collections::HashMap;

/// Everything a renderer needs to draw one visible node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeVisual {
    pub id: ItemId,
    pub icon: String,
    pub state: NodeState,
    /// `state` with the parent states folded into the child ones.
    pub visual: NodeState,
    pub position: Point,
    pub size: f64,
    /// Label shown inside a center: the hovered child's name, or its own.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// Lays out every visible node of `tree`. Nodes with an entry in `anchors` are drawn
/// there, everything else hangs off its parent along its angle at the tier offset.
pub fn frame(
    settings: &Settings,
    tree: &MenuTree,
    anchors: &HashMap<NodeIndex, Point>,
) -> Vec<NodeVisual> {
    let mut visuals = Vec::new();
    let root = tree.root();
    if !tree.node(root).state.is_visible() {
        return visuals;
    }

    let mut pending = vec![(root, anchors.get(&root).copied().unwrap_or_default())];
    while let Some((index, origin)) = pending.pop() {
        let node = tree.node(index);
        let style = settings.tier(node.state);

        let position = match anchors.get(&index) {
            Some(&anchor) => anchor,
            None => {
                let radians = node.angle.to_radians();
                origin.offset(
                    radians.sin() * style.offset,
                    -radians.cos() * style.offset,
                )
            }
        };

        let caption = node.state.is_center().then(|| {
            node.active_child
                .and_then(|i| tree.child(index, i))
                .map_or_else(|| node.name.clone(), |c| tree.node(c).name.clone())
        });

        visuals.push(NodeVisual {
            id: node.id.clone(),
            icon: node.icon.clone(),
            state: node.state,
            visual: node.state.visual(),
            position,
            size: style.size,
            caption,
        });

        for &child in node.children.iter().rev() {
            if tree.node(child).state.is_visible() {
                pending.push((child, position));
            }
        }
    }

    visuals
}

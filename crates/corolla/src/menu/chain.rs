use super::tree::NodeIndex;

/// Path of selected items from the root down to the node currently shown in the
/// middle of the menu. Index 0 is always that center node, index 1 its parent and
/// the last entry the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionChain {
    // root first, center last
    nodes: Vec<NodeIndex>,
}

impl SelectionChain {
    pub fn new(root: NodeIndex) -> Self {
        Self { nodes: vec![root] }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false, a chain holds at least the root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn center(&self) -> NodeIndex {
        self.nodes[self.nodes.len() - 1]
    }

    pub fn parent(&self) -> Option<NodeIndex> {
        self.get(1)
    }

    /// `get(0)` is the center, `get(len - 1)` the root.
    pub fn get(&self, index: usize) -> Option<NodeIndex> {
        let len = self.nodes.len();
        (index < len).then(|| self.nodes[len - 1 - index])
    }

    pub fn is_at_root(&self) -> bool {
        self.nodes.len() < 2
    }

    pub fn push(&mut self, node: NodeIndex) {
        self.nodes.push(node);
    }

    /// Removes the center and returns it. The root is never popped.
    pub fn pop(&mut self) -> Option<NodeIndex> {
        if self.is_at_root() {
            return None;
        }
        self.nodes.pop()
    }

    /// Center first.
    pub fn iter(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.nodes.iter().rev().copied()
    }

    pub fn to_vec(&self) -> Vec<NodeIndex> {
        self.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idx(i: usize) -> NodeIndex {
        NodeIndex::from(i)
    }

    #[test]
    fn test_center_comes_first() {
        let mut chain = SelectionChain::new(NodeIndex::ROOT);
        chain.push(idx(3));
        chain.push(idx(7));

        assert_eq!(chain.center(), idx(7));
        assert_eq!(chain.parent(), Some(idx(3)));
        assert_eq!(chain.get(2), Some(NodeIndex::ROOT));
        assert_eq!(chain.get(3), None);
        assert_eq!(chain.to_vec(), vec![idx(7), idx(3), NodeIndex::ROOT]);
    }

    #[test]
    fn test_root_is_never_popped() {
        let mut chain = SelectionChain::new(NodeIndex::ROOT);
        assert!(chain.is_at_root());
        assert_eq!(chain.pop(), None);
        assert_eq!(chain.parent(), None);

        chain.push(idx(1));
        assert!(!chain.is_at_root());
        assert_eq!(chain.pop(), Some(idx(1)));
        assert_eq!(chain.pop(), None);
        assert_eq!(chain.len(), 1);
        assert!(!chain.is_empty());
    }
}

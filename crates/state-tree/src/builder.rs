//! Construction of [`StateTree`]s.

use crate::tree::{NodeId, StateNode, StateTree};
use crate::StateTreeError;

/// Builds a tree top-down, starting from its root.
///
/// ```
/// use state_tree::{Lifecycle, TreeBuilder};
///
/// struct Plain;
/// impl Lifecycle<()> for Plain {}
///
/// let mut builder = TreeBuilder::new("demo", "root", Plain, ());
/// let root = builder.root();
/// let idle = builder.add_child(root, "idle", Plain).unwrap();
/// builder.add_child(root, "busy", Plain).unwrap();
/// let tree = builder.fallback(idle).build();
/// assert_eq!(tree.len(), 3);
/// ```
pub struct TreeBuilder<S, K> {
    label: &'static str,
    nodes: Vec<StateNode<S, K>>,
    blackboard: K,
    fallback: Option<NodeId>,
    iteration_cap: Option<usize>,
}

impl<S, K> TreeBuilder<S, K> {
    pub fn new(label: &'static str, root_name: &'static str, root: S, blackboard: K) -> Self {
        Self {
            label,
            nodes: vec![StateNode::new(root_name, None, root)],
            blackboard,
            fallback: None,
            iteration_cap: None,
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Appends a child under `parent`. Sibling names must be unique.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        name: &'static str,
        state: S,
    ) -> Result<NodeId, StateTreeError> {
        let parent_node = self
            .nodes
            .get(parent.index())
            .ok_or(StateTreeError::UnknownNode(parent))?;
        if parent_node
            .children
            .iter()
            .any(|child| self.nodes[child.index()].name == name)
        {
            return Err(StateTreeError::DuplicateChild {
                parent: parent_node.name,
                name,
            });
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(StateNode::new(name, Some(parent), state));
        self.nodes[parent.index()].children.push(id);
        Ok(id)
    }

    /// Leaf activated when resolution fails before any leaf was ever stable.
    /// Defaults to the first leaf reached by following first children.
    #[must_use]
    pub fn fallback(mut self, node: NodeId) -> Self {
        self.fallback = Some(node);
        self
    }

    /// Overrides the number of transitions allowed per resolution pass.
    #[must_use]
    pub fn iteration_cap(mut self, cap: usize) -> Self {
        self.iteration_cap = Some(cap.max(1));
        self
    }

    pub fn build(self) -> StateTree<S, K> {
        let iteration_cap = self
            .iteration_cap
            .unwrap_or_else(|| default_iteration_cap(&self.nodes));
        let fallback = self
            .fallback
            .filter(|node| node.index() < self.nodes.len())
            .unwrap_or_else(|| first_leaf(&self.nodes));
        StateTree {
            label: self.label,
            nodes: self.nodes,
            blackboard: self.blackboard,
            entered: false,
            last_stable: None,
            fallback,
            iteration_cap,
        }
    }
}

fn first_leaf<S, K>(nodes: &[StateNode<S, K>]) -> NodeId {
    let mut current = NodeId(0);
    while let Some(&child) = nodes[current.index()].children.first() {
        current = child;
    }
    current
}

/// Twice depth times breadth, never below eight.
fn default_iteration_cap<S, K>(nodes: &[StateNode<S, K>]) -> usize {
    let breadth = nodes
        .iter()
        .map(|node| node.children.len())
        .max()
        .unwrap_or(0)
        .max(1);
    let depth = (0..nodes.len())
        .map(|index| {
            let mut depth = 0;
            let mut current = nodes[index].parent;
            while let Some(parent) = current {
                depth += 1;
                current = nodes[parent.index()].parent;
            }
            depth
        })
        .max()
        .unwrap_or(0);
    (2 * (depth + 1) * breadth).max(8)
}

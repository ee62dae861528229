//! Arena-backed state tree and stable-leaf resolution.
//!
//! # Semantics
//!
//! - Entering a node runs its [`Lifecycle::enter`] hook with a [`Scope`]
//! - Deactivating a node first deactivates its active descendants, deepest
//!   first, then runs [`Lifecycle::exit`] and rolls back the node's scoped
//!   changes in recorded order
//! - A failed transition leaves the active path untouched
//! - Resolution stops at the first leaf that requests nothing, or after the
//!   iteration cap, in which case the last stable leaf is reactivated

use tracing::{debug, error, warn};

use crate::scope::{Rollback, roll_back};
use crate::{Lifecycle, Scope, State, StateTreeError, Transition};

/// Index of a node in its tree's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// One node of a [`StateTree`].
pub struct StateNode<S, K> {
    pub(crate) name: &'static str,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) active_child: Option<NodeId>,
    pub(crate) state: S,
    pub(crate) rollbacks: Vec<Rollback<K>>,
}

impl<S, K> StateNode<S, K> {
    pub(crate) fn new(name: &'static str, parent: Option<NodeId>, state: S) -> Self {
        Self {
            name,
            parent,
            children: Vec::new(),
            active_child: None,
            state,
            rollbacks: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn active_child(&self) -> Option<NodeId> {
        self.active_child
    }

    /// Nodes with children are folders; only leaves should drive behavior.
    pub fn is_folder(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// Scoped changes currently held by this node.
    pub fn pending_rollbacks(&self) -> usize {
        self.rollbacks.len()
    }
}

/// Outcome of [`StateTree::resolve_stable_leaf`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    /// Active leaf after resolution.
    pub leaf: NodeId,
    /// Successful transitions performed during the pass.
    pub transitions: usize,
    /// Set when resolution ended on a failed request, a folder, or the cap.
    pub fault: Option<StateTreeError>,
}

impl Resolution {
    pub fn is_clean(&self) -> bool {
        self.fault.is_none()
    }
}

pub struct StateTree<S, K> {
    pub(crate) label: &'static str,
    pub(crate) nodes: Vec<StateNode<S, K>>,
    pub(crate) blackboard: K,
    pub(crate) entered: bool,
    pub(crate) last_stable: Option<NodeId>,
    pub(crate) fallback: NodeId,
    pub(crate) iteration_cap: usize,
}

impl<S, K> StateTree<S, K> {
    pub const ROOT: NodeId = NodeId(0);

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn node(&self, id: NodeId) -> Option<&StateNode<S, K>> {
        self.nodes.get(id.index())
    }

    pub fn name(&self, id: NodeId) -> &'static str {
        self.node(id).map_or("?", StateNode::name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First node with the given name, in creation order.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.name == name)
            .map(|index| NodeId(index as u32))
    }

    pub fn blackboard(&self) -> &K {
        &self.blackboard
    }

    pub fn iteration_cap(&self) -> usize {
        self.iteration_cap
    }

    pub fn last_stable(&self) -> Option<NodeId> {
        self.last_stable
    }

    /// Deepest node reachable from the root by following active children.
    pub fn active_leaf(&self) -> NodeId {
        let mut current = Self::ROOT;
        while let Some(child) = self.nodes[current.index()].active_child {
            current = child;
        }
        current
    }

    /// Active path from the root down to the active leaf.
    pub fn active_path(&self) -> Vec<NodeId> {
        let mut path = vec![Self::ROOT];
        let mut current = Self::ROOT;
        while let Some(child) = self.nodes[current.index()].active_child {
            path.push(child);
            current = child;
        }
        path
    }

    pub fn is_active(&self, id: NodeId) -> bool {
        if !self.entered || id.index() >= self.nodes.len() {
            return false;
        }
        let mut current = id;
        while let Some(parent) = self.nodes[current.index()].parent {
            if self.nodes[parent.index()].active_child != Some(current) {
                return false;
            }
            current = parent;
        }
        true
    }

    fn check(&self, id: NodeId) -> Result<&StateNode<S, K>, StateTreeError> {
        self.node(id).ok_or(StateTreeError::UnknownNode(id))
    }

    fn child_named(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.nodes[parent.index()]
            .children
            .iter()
            .copied()
            .find(|child| self.nodes[child.index()].name == name)
    }
}

impl<S: Lifecycle<K>, K> StateTree<S, K> {
    /// Activates the root if it is not active yet.
    pub fn enter(&mut self) {
        if !self.entered {
            self.entered = true;
            self.enter_node(Self::ROOT);
        }
    }

    /// Activates the child of `node` named `name`, deactivating whatever
    /// was active below `node`.
    pub fn transition_to_child(
        &mut self,
        node: NodeId,
        name: &'static str,
    ) -> Result<NodeId, StateTreeError> {
        let parent = self.check(node)?;
        if !self.is_active(node) {
            return Err(StateTreeError::Inactive { node: parent.name });
        }
        let child = self
            .child_named(node, name)
            .ok_or(StateTreeError::ChildNotFound {
                parent: parent.name,
                name,
            })?;
        self.switch_to_child(node, child);
        Ok(child)
    }

    /// Activates the sibling of `node` named `name` through their parent.
    pub fn transition_to_sibling(
        &mut self,
        node: NodeId,
        name: &'static str,
    ) -> Result<NodeId, StateTreeError> {
        let current = self.check(node)?;
        let parent = current
            .parent
            .ok_or(StateTreeError::NoParent { node: current.name })?;
        if !self.is_active(node) {
            return Err(StateTreeError::Inactive { node: current.name });
        }
        let sibling = self
            .child_named(parent, name)
            .ok_or(StateTreeError::SiblingNotFound {
                node: current.name,
                name,
            })?;
        self.switch_to_child(parent, sibling);
        Ok(sibling)
    }

    /// Deactivates `node` and everything below it; its parent becomes the
    /// active leaf without being re-entered.
    pub fn transition_to_parent(&mut self, node: NodeId) -> Result<NodeId, StateTreeError> {
        let current = self.check(node)?;
        let parent = current
            .parent
            .ok_or(StateTreeError::NoParent { node: current.name })?;
        if !self.is_active(node) {
            return Err(StateTreeError::Inactive { node: current.name });
        }
        self.deactivate_descendants(parent);
        Ok(parent)
    }

    /// Makes `target` the active leaf, entering every node on the way down
    /// that is not already active.
    pub fn force_activate(&mut self, target: NodeId) -> Result<(), StateTreeError> {
        self.check(target)?;
        self.enter();
        let mut chain = vec![target];
        let mut current = target;
        while let Some(parent) = self.nodes[current.index()].parent {
            chain.push(parent);
            current = parent;
        }
        chain.reverse();
        for pair in chain.windows(2) {
            let (parent, child) = (pair[0], pair[1]);
            if self.nodes[parent.index()].active_child != Some(child) {
                self.switch_to_child(parent, child);
            }
        }
        self.deactivate_descendants(target);
        Ok(())
    }

    /// Exits every active node below `node`, deepest first.
    pub fn deactivate_descendants(&mut self, node: NodeId) {
        let mut chain = Vec::new();
        let mut current = self.nodes[node.index()].active_child;
        while let Some(child) = current {
            chain.push(child);
            current = self.nodes[child.index()].active_child;
        }
        for &child in chain.iter().rev() {
            self.exit_node(child);
            self.nodes[child.index()].active_child = None;
        }
        self.nodes[node.index()].active_child = None;
    }

    /// Exits every active node including the root.
    pub fn shutdown(&mut self) {
        if self.entered {
            self.deactivate_descendants(Self::ROOT);
            self.exit_node(Self::ROOT);
            self.entered = false;
        }
    }

    fn switch_to_child(&mut self, parent: NodeId, child: NodeId) {
        self.deactivate_descendants(parent);
        self.nodes[parent.index()].active_child = Some(child);
        self.enter_node(child);
    }

    fn enter_node(&mut self, id: NodeId) {
        let StateNode {
            name,
            state,
            rollbacks,
            ..
        } = &mut self.nodes[id.index()];
        debug!(tree = self.label, state = *name, "enter");
        let mut scope = Scope::new(&mut self.blackboard, rollbacks);
        state.enter(&mut scope);
    }

    fn exit_node(&mut self, id: NodeId) {
        let StateNode {
            name,
            state,
            rollbacks,
            ..
        } = &mut self.nodes[id.index()];
        debug!(tree = self.label, state = *name, "exit");
        state.exit(&mut self.blackboard);
        roll_back(rollbacks, &mut self.blackboard);
    }

    fn apply(&mut self, leaf: NodeId, request: Transition) -> Result<NodeId, StateTreeError> {
        match request {
            Transition::Child(name) => self.transition_to_child(leaf, name),
            Transition::Sibling(name) => self.transition_to_sibling(leaf, name),
            Transition::Parent => self.transition_to_parent(leaf),
        }
    }

    /// Reactivates the last stable leaf, or the designated fallback.
    fn recover(&mut self) -> NodeId {
        let target = self.last_stable.unwrap_or(self.fallback);
        if self.force_activate(target).is_err() {
            // Both candidates come from this tree; the root always exists.
            self.deactivate_descendants(Self::ROOT);
            return Self::ROOT;
        }
        self.last_stable = Some(target);
        target
    }

    fn settle(&mut self, leaf: NodeId, transitions: usize, fault: Option<StateTreeError>) -> Resolution {
        let node = &self.nodes[leaf.index()];
        if node.is_folder() {
            let folder = StateTreeError::FolderAsLeaf { node: node.name };
            error!(tree = self.label, %folder, "falling back");
            let leaf = self.recover();
            return Resolution {
                leaf,
                transitions,
                fault: Some(fault.unwrap_or(folder)),
            };
        }
        self.last_stable = Some(leaf);
        Resolution {
            leaf,
            transitions,
            fault,
        }
    }

    /// Follows transition requests from the active leaf until one is
    /// content, and returns that leaf.
    pub fn resolve_stable_leaf<C: ?Sized>(&mut self, ctx: &C) -> Resolution
    where
        S: State<C, K>,
    {
        self.enter();
        for transitions in 0..self.iteration_cap {
            let leaf = self.active_leaf();
            let node = &mut self.nodes[leaf.index()];
            let Some(request) = node.state.try_transition(ctx, &self.blackboard) else {
                return self.settle(leaf, transitions, None);
            };
            let from = node.name;
            match self.apply(leaf, request) {
                Ok(next) => {
                    debug!(tree = self.label, from, to = self.name(next), ?request, "transition");
                }
                Err(err) => {
                    warn!(tree = self.label, from, ?request, %err, "transition rejected");
                    return self.settle(leaf, transitions, Some(err));
                }
            }
        }

        let last = self.name(self.active_leaf());
        let fault = StateTreeError::TransitionCycle {
            limit: self.iteration_cap,
            last,
        };
        error!(tree = self.label, %fault, "resolution did not converge");
        let leaf = self.recover();
        Resolution {
            leaf,
            transitions: self.iteration_cap,
            fault: Some(fault),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use super::*;
    use crate::TreeBuilder;

    /// Requests each node makes, keyed by node name.
    type Script = HashMap<&'static str, Transition>;
    type Log = Rc<RefCell<Vec<String>>>;

    #[derive(Default)]
    struct Blackboard {
        mood: i32,
        speed: i32,
    }

    fn mood(bb: &mut Blackboard) -> &mut i32 {
        &mut bb.mood
    }

    fn speed(bb: &mut Blackboard) -> &mut i32 {
        &mut bb.speed
    }

    struct Probe {
        name: &'static str,
        log: Log,
        mood: Option<i32>,
        speed: Option<i32>,
    }

    impl Lifecycle<Blackboard> for Probe {
        fn enter(&mut self, scope: &mut Scope<'_, Blackboard>) {
            self.log.borrow_mut().push(format!("enter {}", self.name));
            if let Some(value) = self.mood {
                scope.temporary_change(mood, value);
            }
            if let Some(value) = self.speed {
                scope.temporary_change(speed, value);
            }
        }

        fn exit(&mut self, _blackboard: &mut Blackboard) {
            self.log.borrow_mut().push(format!("exit {}", self.name));
        }
    }

    impl State<Script, Blackboard> for Probe {
        fn try_transition(&mut self, script: &Script, _: &Blackboard) -> Option<Transition> {
            script.get(self.name).copied()
        }
    }

    struct Fixture {
        tree: StateTree<Probe, Blackboard>,
        log: Log,
    }

    /// root
    /// ├── a
    /// │   └── deep (mood 7)
    /// └── b (mood 3, speed 9)
    fn fixture() -> Fixture {
        let log: Log = Rc::default();
        let probe = |name, mood, speed| Probe {
            name,
            log: log.clone(),
            mood,
            speed,
        };
        let mut builder = TreeBuilder::new("test", "root", probe("root", None, None), Blackboard::default());
        let root = builder.root();
        let a = builder.add_child(root, "a", probe("a", None, None)).unwrap();
        builder.add_child(a, "deep", probe("deep", Some(7), None)).unwrap();
        builder.add_child(root, "b", probe("b", Some(3), Some(9))).unwrap();
        Fixture {
            tree: builder.build(),
            log,
        }
    }

    fn names(tree: &StateTree<Probe, Blackboard>) -> Vec<&'static str> {
        tree.active_path().into_iter().map(|id| tree.name(id)).collect()
    }

    fn script(entries: &[(&'static str, Transition)]) -> Script {
        entries.iter().copied().collect()
    }

    #[test]
    fn child_then_sibling_then_parent() {
        let Fixture { mut tree, .. } = fixture();
        tree.enter();
        let a = tree.transition_to_child(StateTree::<Probe, Blackboard>::ROOT, "a").unwrap();
        let deep = tree.transition_to_child(a, "deep").unwrap();
        assert_eq!(names(&tree), ["root", "a", "deep"]);

        assert_eq!(tree.transition_to_parent(deep).unwrap(), a);
        assert_eq!(names(&tree), ["root", "a"]);

        let b = tree.transition_to_sibling(a, "b").unwrap();
        assert_eq!(tree.active_leaf(), b);
        assert!(!tree.is_active(a));
    }

    #[test]
    fn deactivation_exits_deepest_first() {
        let Fixture { mut tree, log } = fixture();
        let resolution = tree.resolve_stable_leaf(&script(&[
            ("root", Transition::Child("a")),
            ("a", Transition::Child("deep")),
        ]));
        assert_eq!(tree.name(resolution.leaf), "deep");
        log.borrow_mut().clear();

        let root = StateTree::<Probe, Blackboard>::ROOT;
        tree.transition_to_child(root, "b").unwrap();
        assert_eq!(*log.borrow(), ["exit deep", "exit a", "enter b"]);
    }

    #[test]
    fn exit_rolls_back_scoped_changes() {
        let Fixture { mut tree, .. } = fixture();
        tree.enter();
        let root = StateTree::<Probe, Blackboard>::ROOT;
        let b = tree.transition_to_child(root, "b").unwrap();
        assert_eq!((tree.blackboard().mood, tree.blackboard().speed), (3, 9));
        assert_eq!(tree.node(b).unwrap().pending_rollbacks(), 2);

        // Re-entering a node restores before applying again.
        let b = tree.transition_to_sibling(b, "b").unwrap();
        assert_eq!((tree.blackboard().mood, tree.blackboard().speed), (3, 9));
        let a = tree.transition_to_sibling(b, "a").unwrap();
        assert_eq!((tree.blackboard().mood, tree.blackboard().speed), (0, 0));
        assert_eq!(tree.node(b).unwrap().pending_rollbacks(), 0);

        tree.transition_to_child(a, "deep").unwrap();
        assert_eq!(tree.blackboard().mood, 7);
        tree.shutdown();
        assert_eq!(tree.blackboard().mood, 0);
    }

    #[test]
    fn resolution_follows_requests_to_a_content_leaf() {
        let Fixture { mut tree, .. } = fixture();
        let resolution = tree.resolve_stable_leaf(&script(&[
            ("root", Transition::Child("a")),
            ("a", Transition::Sibling("b")),
        ]));
        assert!(resolution.is_clean());
        assert_eq!(tree.name(resolution.leaf), "b");
        assert_eq!(resolution.transitions, 2);
        assert_eq!(tree.last_stable(), Some(resolution.leaf));
    }

    #[test]
    fn rejected_request_keeps_the_leaf() {
        let Fixture { mut tree, .. } = fixture();
        let resolution = tree.resolve_stable_leaf(&script(&[
            ("root", Transition::Child("b")),
            ("b", Transition::Child("missing")),
        ]));
        assert_eq!(tree.name(resolution.leaf), "b");
        assert_eq!(
            resolution.fault,
            Some(StateTreeError::ChildNotFound {
                parent: "b",
                name: "missing"
            })
        );
    }

    #[test]
    fn content_folder_falls_back_to_a_leaf() {
        let Fixture { mut tree, .. } = fixture();
        let resolution = tree.resolve_stable_leaf(&Script::new());
        assert_eq!(
            resolution.fault,
            Some(StateTreeError::FolderAsLeaf { node: "root" })
        );
        assert_eq!(tree.name(resolution.leaf), "deep");
        assert_eq!(names(&tree), ["root", "a", "deep"]);
    }

    #[test]
    fn mutual_siblings_hit_the_cap_and_recover() {
        let Fixture { mut tree, log } = fixture();
        let settled = tree.resolve_stable_leaf(&script(&[("root", Transition::Child("b"))]));
        assert_eq!(tree.name(settled.leaf), "b");

        let cycle = script(&[
            ("a", Transition::Sibling("b")),
            ("b", Transition::Sibling("a")),
        ]);
        log.borrow_mut().clear();
        let resolution = tree.resolve_stable_leaf(&cycle);
        assert!(matches!(
            resolution.fault,
            Some(StateTreeError::TransitionCycle { .. })
        ));
        assert_eq!(resolution.leaf, settled.leaf);
        assert_eq!(names(&tree), ["root", "b"]);
        assert!(log.borrow().len() <= 2 * tree.iteration_cap() + 2);

        // Exactly one active child per node along the path, none elsewhere.
        let path = tree.active_path();
        for id in (0..tree.len() as u32).map(NodeId) {
            assert_eq!(tree.is_active(id), path.contains(&id));
        }
        assert_eq!((tree.blackboard().mood, tree.blackboard().speed), (3, 9));
    }

    #[test]
    fn cycle_without_history_uses_designated_fallback() {
        let log: Log = Rc::default();
        let probe = |name| Probe {
            name,
            log: log.clone(),
            mood: None,
            speed: None,
        };
        let mut builder = TreeBuilder::new("cycle", "root", probe("root"), Blackboard::default());
        let root = builder.root();
        builder.add_child(root, "ping", probe("ping")).unwrap();
        let pong = builder.add_child(root, "pong", probe("pong")).unwrap();
        let mut tree = builder.fallback(pong).iteration_cap(5).build();

        let resolution = tree.resolve_stable_leaf(&script(&[
            ("root", Transition::Child("ping")),
            ("ping", Transition::Sibling("pong")),
            ("pong", Transition::Sibling("ping")),
        ]));
        assert_eq!(
            resolution.fault,
            Some(StateTreeError::TransitionCycle { limit: 5, last: "ping" })
        );
        assert_eq!(resolution.leaf, pong);
        assert_eq!(tree.active_leaf(), pong);
    }

    #[test]
    fn root_cannot_climb() {
        let Fixture { mut tree, .. } = fixture();
        tree.enter();
        let root = StateTree::<Probe, Blackboard>::ROOT;
        assert_eq!(
            tree.transition_to_parent(root),
            Err(StateTreeError::NoParent { node: "root" })
        );
        assert_eq!(
            tree.transition_to_sibling(root, "a"),
            Err(StateTreeError::NoParent { node: "root" })
        );
    }
}

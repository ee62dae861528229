//! Hooks implemented by the payload of every tree node.

use crate::Scope;

/// Move requested by the active leaf.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Transition {
    /// Activate the named child of the requesting node.
    Child(&'static str),
    /// Activate the named child of the requesting node's parent.
    Sibling(&'static str),
    /// Deactivate the requesting node, leaving its parent as the leaf.
    Parent,
}

/// Enter and exit hooks.
///
/// Separate from [`State`] so activation bookkeeping does not depend on the
/// decision context type.
pub trait Lifecycle<K> {
    /// Called when the node becomes active. Changes made through `scope`
    /// are undone when the node exits.
    fn enter(&mut self, _scope: &mut Scope<'_, K>) {}

    /// Called when the node is deactivated, before its scoped changes are
    /// rolled back.
    fn exit(&mut self, _blackboard: &mut K) {}
}

/// A node that can ask to move the active path while it is the leaf.
pub trait State<C: ?Sized, K>: Lifecycle<K> {
    /// Returns `None` when the node is content to stay the active leaf.
    fn try_transition(&mut self, ctx: &C, blackboard: &K) -> Option<Transition>;
}

impl<K, S: Lifecycle<K> + ?Sized> Lifecycle<K> for Box<S> {
    #[inline]
    fn enter(&mut self, scope: &mut Scope<'_, K>) {
        (**self).enter(scope)
    }

    #[inline]
    fn exit(&mut self, blackboard: &mut K) {
        (**self).exit(blackboard)
    }
}

impl<C: ?Sized, K, S: State<C, K> + ?Sized> State<C, K> for Box<S> {
    #[inline]
    fn try_transition(&mut self, ctx: &C, blackboard: &K) -> Option<Transition> {
        (**self).try_transition(ctx, blackboard)
    }
}

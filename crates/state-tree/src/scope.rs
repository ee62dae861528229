//! Scoped blackboard changes.
//!
//! A node entering the active path may tweak the shared blackboard. Every
//! tweak made through a [`Scope`] records how to undo itself, and the tree
//! replays those undo steps when the node exits.

/// Deferred restore step recorded for one blackboard change.
pub type Rollback<K> = Box<dyn FnOnce(&mut K)>;

/// Blackboard access handed to [`Lifecycle::enter`](crate::Lifecycle::enter).
pub struct Scope<'a, K> {
    blackboard: &'a mut K,
    rollbacks: &'a mut Vec<Rollback<K>>,
}

impl<'a, K> Scope<'a, K> {
    pub(crate) fn new(blackboard: &'a mut K, rollbacks: &'a mut Vec<Rollback<K>>) -> Self {
        Self {
            blackboard,
            rollbacks,
        }
    }

    pub fn blackboard(&self) -> &K {
        &*self.blackboard
    }

    /// Number of changes recorded so far by the entering node.
    pub fn recorded(&self) -> usize {
        self.rollbacks.len()
    }
}

impl<K: 'static> Scope<'_, K> {
    /// Sets the field selected by `field` to `value` until the node exits.
    ///
    /// Restores replay in the order they were recorded, so a node should
    /// change any given field at most once per activation.
    pub fn temporary_change<T: 'static>(&mut self, field: fn(&mut K) -> &mut T, value: T) {
        let previous = core::mem::replace(field(self.blackboard), value);
        self.rollbacks
            .push(Box::new(move |blackboard: &mut K| *field(blackboard) = previous));
    }

    /// Records an arbitrary restore step without changing anything now.
    pub fn on_exit(&mut self, restore: impl FnOnce(&mut K) + 'static) {
        self.rollbacks.push(Box::new(restore));
    }
}

/// Replays and clears `rollbacks` in recorded order.
pub(crate) fn roll_back<K>(rollbacks: &mut Vec<Rollback<K>>, blackboard: &mut K) {
    for restore in rollbacks.drain(..) {
        restore(blackboard);
    }
}

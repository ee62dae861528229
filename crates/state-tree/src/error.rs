use crate::NodeId;

/// Failures raised by transitions and resolution.
///
/// A failed transition request never changes the active path.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StateTreeError {
    #[error("'{parent}' has no child named '{name}'")]
    ChildNotFound {
        parent: &'static str,
        name: &'static str,
    },

    #[error("'{node}' has no sibling named '{name}'")]
    SiblingNotFound {
        node: &'static str,
        name: &'static str,
    },

    #[error("'{node}' is the root and has no parent")]
    NoParent { node: &'static str },

    #[error("'{node}' is not on the active path")]
    Inactive { node: &'static str },

    #[error("'{parent}' already has a child named '{name}'")]
    DuplicateChild {
        parent: &'static str,
        name: &'static str,
    },

    #[error("no node with id {0:?}")]
    UnknownNode(NodeId),

    #[error("folder '{node}' settled as the active leaf")]
    FolderAsLeaf { node: &'static str },

    #[error("no stable leaf after {limit} transitions, last active '{last}'")]
    TransitionCycle { limit: usize, last: &'static str },
}

impl StateTreeError {
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ChildNotFound { .. } => "STATE_CHILD_NOT_FOUND",
            Self::SiblingNotFound { .. } => "STATE_SIBLING_NOT_FOUND",
            Self::NoParent { .. } => "STATE_NO_PARENT",
            Self::Inactive { .. } => "STATE_INACTIVE",
            Self::DuplicateChild { .. } => "STATE_DUPLICATE_CHILD",
            Self::UnknownNode(_) => "STATE_UNKNOWN_NODE",
            Self::FolderAsLeaf { .. } => "STATE_FOLDER_AS_LEAF",
            Self::TransitionCycle { .. } => "STATE_TRANSITION_CYCLE",
        }
    }

    /// Whether the error points at a badly authored tree rather than a
    /// request that was merely inapplicable.
    pub const fn is_authoring_defect(&self) -> bool {
        matches!(
            self,
            Self::ChildNotFound { .. }
                | Self::SiblingNotFound { .. }
                | Self::DuplicateChild { .. }
                | Self::FolderAsLeaf { .. }
                | Self::TransitionCycle { .. }
        )
    }
}

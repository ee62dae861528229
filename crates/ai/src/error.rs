//! Errors surfaced by the decision engine.

use skirmish_core::{BoardError, ErrorContext, ErrorSeverity, Faction, GameError, UnitId};
use state_tree::StateTreeError;

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum AiError {
    /// The board refused a planned primitive.
    #[error("board rejected {action}: {source}")]
    Rejected {
        action: &'static str,
        context: ErrorContext,
        #[source]
        source: BoardError,
    },

    /// A strategy tree misbehaved while resolving.
    #[error("{tree} tree: {source}")]
    Resolution {
        tree: &'static str,
        #[source]
        source: StateTreeError,
    },

    #[error("unit {0} vanished before it could act")]
    UnitGone(UnitId),

    #[error("unit {0} is still mid-action")]
    UnitBusy(UnitId),

    #[error("faction {0} asked to play out of turn")]
    OutOfTurn(Faction),

    #[error("no affordable template for a deploy")]
    Unaffordable,

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl AiError {
    pub(crate) fn rejected(action: &'static str, context: ErrorContext, source: BoardError) -> Self {
        Self::Rejected {
            action,
            context,
            source,
        }
    }
}

impl GameError for AiError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Rejected { source, .. } => match source.severity() {
                // Planner believed the primitive legal.
                ErrorSeverity::Validation => ErrorSeverity::Internal,
                other => other,
            },
            Self::Resolution { source, .. } if source.is_authoring_defect() => {
                ErrorSeverity::Internal
            }
            Self::Resolution { .. } => ErrorSeverity::Recoverable,
            Self::UnitGone(_) | Self::UnitBusy(_) | Self::OutOfTurn(_) | Self::Unaffordable => {
                ErrorSeverity::Recoverable
            }
            Self::Config(_) => ErrorSeverity::Fatal,
        }
    }

    fn context(&self) -> Option<&ErrorContext> {
        match self {
            Self::Rejected { context, .. } => Some(context),
            _ => None,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Rejected { source, .. } => source.error_code(),
            Self::Resolution { source, .. } => source.error_code(),
            Self::UnitGone(_) => "AI_UNIT_GONE",
            Self::UnitBusy(_) => "AI_UNIT_BUSY",
            Self::OutOfTurn(_) => "AI_OUT_OF_TURN",
            Self::Unaffordable => "AI_UNAFFORDABLE",
            Self::Config(_) => "AI_CONFIG",
        }
    }
}

//! Errors raised when the board refuses a command.

use crate::error::{ErrorSeverity, GameError};
use crate::state::{Faction, Position, UnitId};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoardError {
    #[error("unit {0} not found")]
    UnitNotFound(UnitId),

    #[error("unit {unit} belongs to {owner}, not the active faction")]
    NotActiveFaction { unit: UnitId, owner: Faction },

    #[error("unit {0} is mid-action and cannot be commanded")]
    UnitBusy(UnitId),

    #[error("unit {0} has already attacked this turn")]
    Exhausted(UnitId),

    #[error("path is empty")]
    EmptyPath,

    #[error("path must start at {expected}, found {found}")]
    PathOrigin { expected: Position, found: Position },

    #[error("path steps from {from} to {to} are not adjacent")]
    PathGap { from: Position, to: Position },

    #[error("cell {0} is out of bounds")]
    OutOfBounds(Position),

    #[error("cell {0} is blocked")]
    Blocked(Position),

    #[error("move needs {needed} points, unit has {available}")]
    InsufficientMovePoints { needed: u32, available: u32 },

    #[error("unknown unit template '{0}'")]
    UnknownTemplate(String),

    #[error("{faction} cannot afford template '{template}'")]
    InsufficientMana { faction: Faction, template: String },

    #[error("cell {0} is not deployable")]
    NotDeployable(Position),
}

impl GameError for BoardError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Blocked(_)
            | Self::InsufficientMovePoints { .. }
            | Self::InsufficientMana { .. }
            | Self::NotDeployable(_)
            | Self::UnitBusy(_)
            | Self::Exhausted(_) => ErrorSeverity::Recoverable,
            Self::UnitNotFound(_)
            | Self::NotActiveFaction { .. }
            | Self::EmptyPath
            | Self::PathOrigin { .. }
            | Self::PathGap { .. }
            | Self::OutOfBounds(_)
            | Self::UnknownTemplate(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnitNotFound(_) => "BOARD_UNIT_NOT_FOUND",
            Self::NotActiveFaction { .. } => "BOARD_NOT_ACTIVE_FACTION",
            Self::UnitBusy(_) => "BOARD_UNIT_BUSY",
            Self::Exhausted(_) => "BOARD_UNIT_EXHAUSTED",
            Self::EmptyPath => "BOARD_EMPTY_PATH",
            Self::PathOrigin { .. } => "BOARD_PATH_ORIGIN",
            Self::PathGap { .. } => "BOARD_PATH_GAP",
            Self::OutOfBounds(_) => "BOARD_OUT_OF_BOUNDS",
            Self::Blocked(_) => "BOARD_BLOCKED",
            Self::InsufficientMovePoints { .. } => "BOARD_INSUFFICIENT_MOVE_POINTS",
            Self::UnknownTemplate(_) => "BOARD_UNKNOWN_TEMPLATE",
            Self::InsufficientMana { .. } => "BOARD_INSUFFICIENT_MANA",
            Self::NotDeployable(_) => "BOARD_NOT_DEPLOYABLE",
        }
    }
}

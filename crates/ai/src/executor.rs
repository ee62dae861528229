//! Plays primitive actions back through the board's command surface.

use skirmish_core::{
    BoardCommands, BoardEvent, CardinalDirection, ErrorContext, Position, UnitId,
};
use tracing::debug;

use crate::error::AiError;

/// Smallest unit of play the engine hands to the board.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PrimitiveAction {
    Move {
        unit: UnitId,
        /// Origin first, destination last.
        path: Vec<Position>,
    },
    Attack {
        unit: UnitId,
        direction: CardinalDirection,
    },
    Deploy {
        template: String,
        cell: Position,
    },
    PassTurn,
}

impl PrimitiveAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Move { .. } => "move",
            Self::Attack { .. } => "attack",
            Self::Deploy { .. } => "deploy",
            Self::PassTurn => "pass_turn",
        }
    }

    pub fn unit(&self) -> Option<UnitId> {
        match self {
            Self::Move { unit, .. } | Self::Attack { unit, .. } => Some(*unit),
            Self::Deploy { .. } | Self::PassTurn => None,
        }
    }

    /// Cell the action targets: the move destination, the deploy cell, or
    /// nothing for attacks and turn passes.
    pub fn cell(&self) -> Option<Position> {
        match self {
            Self::Move { path, .. } => path.last().copied(),
            Self::Deploy { cell, .. } => Some(*cell),
            Self::Attack { .. } | Self::PassTurn => None,
        }
    }
}

/// Applies `action`, returning the events the board reported.
pub fn apply<B: BoardCommands>(
    board: &mut B,
    action: &PrimitiveAction,
) -> Result<Vec<BoardEvent>, AiError> {
    let mut context = ErrorContext::new(board.turn());
    if let Some(unit) = action.unit() {
        context = context.with_unit(unit);
    }
    if let Some(cell) = action.cell() {
        context = context.with_cell(cell);
    }
    debug!(action = action.name(), unit = ?action.unit(), cell = ?action.cell(), "apply");

    let outcome = match action {
        PrimitiveAction::Move { unit, path } => board.move_unit(*unit, path),
        PrimitiveAction::Attack { unit, direction } => board.attack(*unit, *direction),
        PrimitiveAction::Deploy { template, cell } => board.deploy(template, *cell),
        PrimitiveAction::PassTurn => Ok(board.pass_turn()),
    };
    outcome.map_err(|source| AiError::rejected(action.name(), context, source))
}

//! Commands that mutate the board.
//!
//! Every command validates against the current state before touching it, so
//! a rejected command leaves the board unchanged. Accepted commands report
//! what happened as a list of [`BoardEvent`]s.
mod direction;
mod error;

pub use direction::{CardinalDirection, rotate_damage_area};
pub use error::BoardError;

use crate::engine::BoardEvent;
use crate::env::BoardQuery;
use crate::state::{Position, UnitId};

pub trait BoardCommands: BoardQuery {
    /// Walks `unit` along `path`, which starts at the unit's cell.
    ///
    /// Charges the leave cost of every cell but the last, captures a
    /// structure at the destination, and applies the destination tile's
    /// entry damage.
    fn move_unit(&mut self, unit: UnitId, path: &[Position]) -> Result<Vec<BoardEvent>, BoardError>;

    /// Strikes the unit's damage area rotated toward `direction`.
    fn attack(
        &mut self,
        unit: UnitId,
        direction: CardinalDirection,
    ) -> Result<Vec<BoardEvent>, BoardError>;

    /// Pays for `template` out of the active faction's mana and places the
    /// new unit at `cell`.
    fn deploy(&mut self, template: &str, cell: Position) -> Result<Vec<BoardEvent>, BoardError>;

    /// Hands the turn to the rival.
    ///
    /// The outgoing faction's units are restored and its structures harvested.
    fn pass_turn(&mut self) -> Vec<BoardEvent>;
}

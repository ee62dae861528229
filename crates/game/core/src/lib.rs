//! Board model for elemental skirmish games.
//!
//! `skirmish-core` defines the grid, tiles, units, structures, and mana pools
//! that both the decision engine and the composition root operate on. Reads go
//! through [`BoardQuery`], mutation through [`BoardCommands`], and every
//! accepted command reports its outcome as [`BoardEvent`]s. [`Board`] is the
//! in-memory implementation.
pub mod action;
pub mod element;
pub mod engine;
pub mod env;
pub mod error;
pub mod state;

pub use action::{BoardCommands, BoardError, CardinalDirection, rotate_damage_area};
pub use element::Element;
pub use engine::{Board, BoardBuilder, BoardEvent};
pub use env::{
    Adjacency, BoardQuery, GridShape, MoveCost, ORTHOGONAL_OFFSETS, SURROUNDING_OFFSETS, Tile,
    UnitTemplate,
};
pub use error::{ErrorContext, ErrorSeverity, GameError};
pub use state::{Faction, Mana, Position, Structure, StructureId, Unit, UnitId};

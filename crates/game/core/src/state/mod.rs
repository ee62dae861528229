//! Mutable board entities: units, structures, and resource pools.
mod common;
mod entities;
mod mana;

pub use common::{Faction, Position, StructureId, UnitId};
pub use entities::{Structure, Unit};
pub use mana::Mana;

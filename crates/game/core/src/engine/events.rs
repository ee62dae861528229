use crate::element::Element;
use crate::state::{Faction, Position, StructureId, UnitId};

/// Observable outcome of a board command.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoardEvent {
    UnitAdded {
        unit: UnitId,
        owner: Faction,
        cell: Position,
    },
    UnitMoved {
        unit: UnitId,
        path: Vec<Position>,
    },
    UnitDamaged {
        unit: UnitId,
        amount: u32,
        remaining: u32,
    },
    UnitKilled {
        unit: UnitId,
        owner: Faction,
        cell: Position,
    },
    StructureCaptured {
        structure: StructureId,
        by: Faction,
        element: Element,
    },
    ManaHarvested {
        faction: Faction,
        element: Element,
        amount: u32,
    },
    TurnStarted {
        faction: Faction,
        turn: u32,
    },
}

impl BoardEvent {
    /// Whether the event changes which units stand where.
    pub fn changes_unit_layout(&self) -> bool {
        matches!(
            self,
            BoardEvent::UnitAdded { .. } | BoardEvent::UnitMoved { .. } | BoardEvent::UnitKilled { .. }
        )
    }
}

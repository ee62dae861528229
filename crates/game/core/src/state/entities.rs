use crate::element::Element;
use crate::env::UnitTemplate;

use super::{Faction, Position, StructureId, UnitId};

/// A unit standing on the board.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Unit {
    pub id: UnitId,
    /// Name of the template the unit was deployed from.
    pub template: String,
    pub owner: Faction,
    pub position: Position,
    pub element: Element,
    pub health: u32,
    pub max_health: u32,
    pub move_points: u32,
    pub max_move_points: u32,
    pub damage: u32,
    /// Offsets relative to the unit, authored facing up.
    pub damage_area: Vec<Position>,
    /// Set once the unit has attacked this turn.
    pub exhausted: bool,
    /// Cleared while the unit is mid-action and must not receive commands.
    pub selectable: bool,
}

impl Unit {
    pub fn from_template(
        id: UnitId,
        template: &UnitTemplate,
        owner: Faction,
        position: Position,
    ) -> Self {
        Self {
            id,
            template: template.name.clone(),
            owner,
            position,
            element: template.element,
            health: template.health,
            max_health: template.health,
            move_points: template.move_points,
            max_move_points: template.move_points,
            damage: template.damage,
            damage_area: template.damage_area.clone(),
            exhausted: false,
            selectable: true,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Current health as a fraction of maximum, in `[0, 1]`.
    pub fn health_ratio(&self) -> f32 {
        if self.max_health == 0 {
            return 0.0;
        }
        self.health as f32 / self.max_health as f32
    }

    /// Whether the unit can still be given a command this turn.
    pub fn can_act(&self) -> bool {
        self.is_alive() && self.selectable && (self.move_points > 0 || !self.exhausted)
    }

    pub(crate) fn restore(&mut self) {
        self.move_points = self.max_move_points;
        self.exhausted = false;
        self.selectable = true;
    }
}

/// A capturable fort that yields mana to its owner every turn.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Structure {
    pub id: StructureId,
    pub position: Position,
    pub owner: Option<Faction>,
    /// Element harvested by the owner; set on capture.
    pub element: Option<Element>,
}

impl Structure {
    pub fn is_owned_by(&self, faction: Faction) -> bool {
        self.owner == Some(faction)
    }

    pub fn is_unclaimed(&self) -> bool {
        self.owner.is_none()
    }
}

//! Read-only view of the board.
//!
//! The decision engine only ever observes the board through [`BoardQuery`];
//! mutation goes through [`BoardCommands`](crate::BoardCommands).
mod map;
mod templates;

pub use map::{
    Adjacency, GridShape, MoveCost, ORTHOGONAL_OFFSETS, SURROUNDING_OFFSETS, Tile,
};
pub use templates::UnitTemplate;

use crate::element::Element;
use crate::state::{Faction, Mana, Position, Structure, Unit, UnitId};

/// Queries answered by any board implementation.
///
/// Required methods expose raw state. Provided methods derive the rules the
/// decision engine relies on (occupancy, deployability, affordability) so
/// every implementation agrees on them.
pub trait BoardQuery {
    fn shape(&self) -> GridShape;

    /// Tile at `cell`, or `None` when the cell is outside the board or has
    /// no tile authored.
    fn tile(&self, cell: Position) -> Option<Tile>;

    /// Every unit currently on the board.
    fn units(&self) -> &[Unit];

    fn structures(&self) -> &[Structure];

    fn mana(&self, faction: Faction) -> Mana;

    fn templates(&self) -> &[UnitTemplate];

    /// Faction whose turn it is.
    fn active_faction(&self) -> Faction;

    /// Number of turn hand-offs since the game started.
    fn turn(&self) -> u32;

    fn contains(&self, cell: Position) -> bool {
        self.shape().contains(cell)
    }

    fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units().iter().find(|unit| unit.id == id)
    }

    fn unit_at(&self, cell: Position) -> Option<&Unit> {
        self.units()
            .iter()
            .find(|unit| unit.position == cell && unit.is_alive())
    }

    fn structure_at(&self, cell: Position) -> Option<&Structure> {
        self.structures()
            .iter()
            .find(|structure| structure.position == cell)
    }

    fn units_of(&self, faction: Faction) -> impl Iterator<Item = &Unit> {
        self.units()
            .iter()
            .filter(move |unit| unit.owner == faction && unit.is_alive())
    }

    fn structures_of(&self, faction: Faction) -> impl Iterator<Item = &Structure> {
        self.structures()
            .iter()
            .filter(move |structure| structure.is_owned_by(faction))
    }

    fn template(&self, name: &str) -> Option<&UnitTemplate> {
        self.templates().iter().find(|template| template.name == name)
    }

    fn can_afford(&self, faction: Faction, template: &UnitTemplate) -> bool {
        self.mana(faction).can_afford(&template.cost)
    }

    /// Whether `faction` can pay for at least one template right now.
    fn can_field_unit(&self, faction: Faction) -> bool {
        self.templates()
            .iter()
            .any(|template| self.can_afford(faction, template))
    }

    /// Cheapest affordable template of `element`, falling back to any
    /// affordable template when none of that element is affordable.
    fn affordable_template(
        &self,
        faction: Faction,
        element: Option<Element>,
    ) -> Option<&UnitTemplate> {
        let affordable = move || {
            self.templates()
                .iter()
                .filter(move |template| self.can_afford(faction, template))
        };
        element
            .and_then(|element| {
                affordable()
                    .filter(|template| template.element == element)
                    .min_by_key(|template| template.cost.total())
            })
            .or_else(|| affordable().min_by_key(|template| template.cost.total()))
    }

    /// Cells no unit can enter: obstructing or impassable tiles, or a cell
    /// holding a live unit.
    fn is_obstructed(&self, cell: Position) -> bool {
        self.tile(cell).is_some_and(Tile::is_blocking) || self.unit_at(cell).is_some()
    }

    /// Movement points charged for stepping off `cell`. Cells without a tile
    /// cost one point.
    fn leave_cost(&self, cell: Position) -> Option<u32> {
        self.tile(cell).map_or(Some(1), Tile::leave_cost)
    }

    /// In bounds, walkable, and free of both units and structures.
    fn is_deployable(&self, cell: Position) -> bool {
        self.contains(cell) && !self.is_obstructed(cell) && self.structure_at(cell).is_none()
    }
}

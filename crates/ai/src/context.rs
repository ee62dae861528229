//! Read-only view shared by every faction-level decision.

use skirmish_core::{BoardQuery, Element, Faction, Position, Structure, Unit};

use crate::config::AiConfig;
use crate::influence::InfluenceField;
use crate::threat::{self, StructureThreat};

/// Board, field, and tunables as seen by one faction during one plan.
pub struct FactionContext<'a, B> {
    pub board: &'a B,
    pub field: &'a InfluenceField,
    pub config: &'a AiConfig,
    pub faction: Faction,
}

impl<B> Clone for FactionContext<'_, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B> Copy for FactionContext<'_, B> {}

impl<'a, B: BoardQuery> FactionContext<'a, B> {
    pub fn new(board: &'a B, field: &'a InfluenceField, config: &'a AiConfig, faction: Faction) -> Self {
        Self {
            board,
            field,
            config,
            faction,
        }
    }

    pub fn friendly_units(&self) -> impl Iterator<Item = &'a Unit> + use<'a, B> {
        self.board.units_of(self.faction)
    }

    pub fn rival_units(&self) -> impl Iterator<Item = &'a Unit> + use<'a, B> {
        self.board.units_of(self.faction.rival())
    }

    pub fn owned_structures(&self) -> impl Iterator<Item = &'a Structure> + use<'a, B> {
        self.board.structures_of(self.faction)
    }

    /// Structures the faction does not hold yet, unclaimed ones included.
    pub fn contested_structures(&self) -> impl Iterator<Item = &'a Structure> + use<'a, B> {
        let faction = self.faction;
        self.board
            .structures()
            .iter()
            .filter(move |structure| !structure.is_owned_by(faction))
    }

    pub fn can_field_unit(&self) -> bool {
        self.board.can_field_unit(self.faction)
    }

    pub fn nearest_friendly(&self, cell: Position) -> Option<&'a Unit> {
        self.friendly_units()
            .min_by_key(|unit| unit.position.manhattan(cell))
    }

    pub fn nearest_owned_structure_distance(&self, cell: Position) -> Option<u32> {
        self.owned_structures()
            .map(|structure| structure.position.manhattan(cell))
            .min()
    }

    /// Most common element among rival units; ties follow [`Element::ALL`].
    pub fn rival_element(&self) -> Option<Element> {
        most_common(self.rival_units().map(|unit| unit.element))
    }

    /// Element a freshly deployed unit should carry.
    pub fn deploy_affinity(&self) -> Option<Element> {
        self.rival_element()
            .map(Element::countered_by)
            .or_else(|| self.board.mana(self.faction).dominant())
    }

    pub fn threats(&self) -> Vec<StructureThreat> {
        self.owned_structures()
            .map(|structure| threat::assess(self, structure))
            .collect()
    }

    pub fn any_structure_threatened(&self) -> bool {
        self.owned_structures()
            .any(|structure| threat::assess(self, structure).is_threatened(&self.config.threat))
    }
}

/// Most frequent element; ties follow [`Element::ALL`].
pub(crate) fn most_common(elements: impl Iterator<Item = Element>) -> Option<Element> {
    let mut counts = [0usize; 3];
    for element in elements {
        counts[Element::ALL.iter().position(|e| *e == element).unwrap_or(0)] += 1;
    }
    let mut best: Option<(Element, usize)> = None;
    for (element, count) in Element::ALL.into_iter().zip(counts) {
        if count > 0 && best.is_none_or(|(_, top)| count > top) {
            best = Some((element, count));
        }
    }
    best.map(|(element, _)| element)
}

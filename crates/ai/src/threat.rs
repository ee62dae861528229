//! Threat assessment around owned structures.

use skirmish_core::{BoardQuery, Element, Position, Structure, StructureId};

use crate::config::ThreatConfig;
use crate::context::{FactionContext, most_common};

#[derive(Clone, Debug, PartialEq)]
pub struct StructureThreat {
    pub structure: StructureId,
    pub cell: Position,
    /// The rival leads at the structure's own cell.
    pub direct: bool,
    /// Sum of rival pressure over sampled cells where the rival leads.
    pub pressure: f32,
    /// Number of sampled cells where the rival leads.
    pub samples: u32,
    /// Most common element among rival units standing in those cells.
    pub predominant: Option<Element>,
}

impl StructureThreat {
    pub fn is_threatened(&self, config: &ThreatConfig) -> bool {
        self.direct || self.pressure > config.pressure_share * self.samples as f32
    }
}

/// Samples the Chebyshev square of `fort_radius` around `structure`.
pub fn assess<B: BoardQuery>(ctx: &FactionContext<'_, B>, structure: &Structure) -> StructureThreat {
    let center = structure.position;
    let radius = ctx.config.threat.fort_radius as i32;
    let mut pressure = 0.0;
    let mut samples = 0;
    let mut elements = Vec::new();

    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let cell = center.offset(dx, dy);
            if !ctx.board.contains(cell) {
                continue;
            }
            let rival = ctx.field.pressure_at(cell, ctx.faction);
            if rival <= 0.0 {
                continue;
            }
            pressure += rival;
            samples += 1;
            if let Some(unit) = ctx.board.unit_at(cell)
                && unit.owner != ctx.faction
            {
                elements.push(unit.element);
            }
        }
    }

    StructureThreat {
        structure: structure.id,
        cell: center,
        direct: ctx.field.pressure_at(center, ctx.faction) > 0.0,
        pressure,
        samples,
        predominant: most_common(elements.into_iter()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AiConfig;
    use crate::influence::InfluenceField;
    use skirmish_core::{BoardBuilder, Faction, GridShape, UnitTemplate};

    #[test]
    fn rival_next_to_a_fort_is_a_direct_threat() {
        let mut board = BoardBuilder::new(GridShape::new(12, 12))
            .structure(Position::new(3, 3))
            .structure(Position::new(10, 10))
            .template(UnitTemplate::new("ember", Element::Fire, 1))
            .build();
        for id in [0, 1] {
            board.structure_mut(StructureId(id)).unwrap().owner = Some(Faction::B);
        }
        board.spawn(Faction::A, "ember", Position::new(4, 3)).unwrap();

        let config = AiConfig::default();
        let field = InfluenceField::from_board(&board, &config.influence);
        let ctx = FactionContext::new(&board, &field, &config, Faction::B);
        let threats = ctx.threats();

        let near = &threats[0];
        assert!(near.direct);
        assert!(near.is_threatened(&config.threat));
        assert_eq!(near.predominant, Some(Element::Fire));

        let far = &threats[1];
        assert!(!far.direct);
        assert_eq!(far.samples, 0);
        assert!(!far.is_threatened(&config.threat));
        assert!(ctx.any_structure_threatened());
    }
}

//! Waypoint candidate passes.
//!
//! Each faction strategy leaf assembles its plan from these passes; the
//! results are merged and ordered by [`WaypointSet::new`].

use skirmish_core::{BoardQuery, Position, SURROUNDING_OFFSETS, Unit};
use tracing::debug;

use crate::context::FactionContext;
use crate::faction::Posture;
use crate::threat::StructureThreat;
use crate::waypoint::{Waypoint, WaypointKind, WaypointSet};

/// Cells around a structure, starting east and turning toward +y.
const DEFENSE_RING: [(i32, i32); 8] =
    [(1, 0), (1, 1), (0, 1), (-1, 1), (-1, 0), (-1, -1), (0, -1), (1, -1)];

/// `+weight` where the faction leads at `cell`, `-against` where the rival
/// does, zero on a perfect standoff.
fn support(relative: f32, weight: i32, against: i32) -> i32 {
    if relative > 0.0 {
        weight
    } else if relative < 0.0 {
        -against
    } else {
        0
    }
}

pub struct WaypointGenerator<'c, 'a, B> {
    ctx: &'c FactionContext<'a, B>,
    posture: Posture,
}

impl<'c, 'a, B: BoardQuery> WaypointGenerator<'c, 'a, B> {
    pub fn new(ctx: &'c FactionContext<'a, B>, posture: Posture) -> Self {
        Self { ctx, posture }
    }

    /// Attack, capture, and move candidates, plus deploys when affordable.
    pub fn generate(&self) -> WaypointSet {
        let mut waypoints = self.attack_candidates();
        waypoints.extend(self.capture_candidates());
        waypoints.extend(self.deploy_candidates());
        waypoints.extend(self.move_candidates());
        WaypointSet::new(waypoints)
    }

    /// Closeness bonus falling linearly from `proximity_range` at distance
    /// zero to nothing at `proximity_range` steps and beyond.
    fn proximity(&self, distance: Option<u32>) -> i32 {
        let range = self.ctx.config.weights.proximity_range;
        distance.map_or(0, |d| (range - d as i32).max(0))
    }

    /// One Attack waypoint per rival unit.
    pub fn attack_candidates(&self) -> Vec<Waypoint> {
        let weights = &self.ctx.config.weights;
        self.ctx
            .rival_units()
            .map(|rival| {
                let anchor = self.ctx.nearest_friendly(rival.position);
                let advantage = anchor
                    .is_some_and(|unit| unit.element.has_advantage_over(rival.element));
                let relative = self.ctx.field.relative_at(rival.position, self.ctx.faction);
                let priority = weights.attack_base
                    + if advantage { weights.advantage_bonus } else { 0 }
                    + self.proximity(anchor.map(|unit| unit.position.manhattan(rival.position)))
                    + support(relative, weights.attack_support, weights.attack_support)
                    + self.posture.aggression;
                Waypoint::new(WaypointKind::Attack, rival.position, priority)
                    .with_affinity(Some(rival.element.countered_by()))
            })
            .collect()
    }

    /// One Capture waypoint per structure the faction does not hold.
    pub fn capture_candidates(&self) -> Vec<Waypoint> {
        let weights = &self.ctx.config.weights;
        self.ctx
            .contested_structures()
            .map(|structure| {
                let cell = structure.position;
                let anchor = self.ctx.nearest_friendly(cell);
                let relative = self.ctx.field.relative_at(cell, self.ctx.faction);
                let priority = weights.capture_base
                    + if structure.is_unclaimed() { weights.unclaimed_bonus } else { 0 }
                    + self.proximity(anchor.map(|unit| unit.position.manhattan(cell)))
                    + support(relative, weights.capture_support, weights.capture_contested);
                Waypoint::new(WaypointKind::Capture, cell, priority)
                    .with_affinity(structure.element.map(|element| element.countered_by()))
            })
            .collect()
    }

    /// A Move waypoint on the weakest frontier cell backed by a stronghold.
    pub fn move_candidates(&self) -> Vec<Waypoint> {
        let weights = &self.ctx.config.weights;
        let Some(cell) = self
            .ctx
            .field
            .find_weak_frontier_cell(self.ctx.faction, &self.ctx.config.thresholds)
        else {
            return Vec::new();
        };
        let relative = self.ctx.field.relative_at(cell, self.ctx.faction);
        let crowding = self
            .ctx
            .rival_units()
            .filter(|rival| rival.position.manhattan(cell) <= 3)
            .count() as i32;
        let priority = 1 + support(relative, weights.move_support, weights.move_support)
            - weights.move_crowding * crowding
            + self.posture.caution;
        vec![Waypoint::new(WaypointKind::Move, cell, priority)]
    }

    /// Deploy waypoints, capped by total mana and the configured maximum.
    ///
    /// Cells come from deployable no-man's-land near the faction's
    /// structures or units, then from cells touching owned structures, and
    /// as a last resort from the single best deployable cell on the board.
    pub fn deploy_candidates(&self) -> Vec<Waypoint> {
        let ctx = self.ctx;
        if !ctx.can_field_unit() {
            return Vec::new();
        }
        let config = &ctx.config;
        let wanted = (ctx.board.mana(ctx.faction).total() as usize).min(config.deploy.waypoint_cap);
        if wanted == 0 {
            return Vec::new();
        }

        let anchors: Vec<Position> = ctx
            .owned_structures()
            .map(|structure| structure.position)
            .chain(ctx.friendly_units().map(|unit| unit.position))
            .collect();
        let near_anchor = |cell: Position| {
            anchors.is_empty()
                || anchors
                    .iter()
                    .any(|anchor| anchor.manhattan(cell) <= config.deploy.reach)
        };

        let mut cells: Vec<Position> = ctx
            .field
            .find_no_mans_land_cells(config.thresholds.no_mans_land)
            .into_iter()
            .filter(|cell| ctx.board.is_deployable(*cell) && near_anchor(*cell))
            .collect();

        for structure in ctx.owned_structures() {
            for (dx, dy) in SURROUNDING_OFFSETS {
                let cell = structure.position.offset(dx, dy);
                if ctx.board.is_deployable(cell) && !cells.contains(&cell) {
                    cells.push(cell);
                }
            }
        }

        if cells.is_empty() {
            let fallback = ctx.field.find_best_cell(
                |cell| ctx.board.is_deployable(cell),
                |cell| {
                    let near_structure = ctx
                        .nearest_owned_structure_distance(cell)
                        .is_some_and(|d| d <= 2);
                    let move_cost = ctx.board.leave_cost(cell).unwrap_or(0) as f32;
                    ctx.field.safety_at(cell, ctx.faction) * 10.0
                        + if near_structure { 5.0 } else { 0.0 }
                        - move_cost * 0.5
                },
            );
            cells.extend(fallback);
        }

        let affinity = ctx.deploy_affinity();
        let waypoints: Vec<Waypoint> = cells
            .into_iter()
            .take(wanted)
            .map(|cell| {
                let safety = ctx.field.safety_at(cell, ctx.faction);
                let structure_bonus = ctx
                    .nearest_owned_structure_distance(cell)
                    .map_or(0, |d| (10 - d as i32).clamp(0, 8));
                let priority =
                    config.weights.deploy_base + (safety * 50.0).round() as i32 + structure_bonus;
                Waypoint::new(WaypointKind::Deploy, cell, priority).with_affinity(affinity)
            })
            .collect();
        debug!(faction = %ctx.faction, wanted, produced = waypoints.len(), "deploy candidates");
        waypoints
    }

    /// Move waypoints around threatened structures and Attack waypoints on
    /// rivals closing in on any owned structure.
    pub fn defense_candidates(&self, threats: &[StructureThreat]) -> Vec<Waypoint> {
        let ctx = self.ctx;
        let weights = &ctx.config.weights;
        let mut waypoints = Vec::new();

        for threat in threats.iter().filter(|t| t.is_threatened(&ctx.config.threat)) {
            let count = (threat.pressure.round() as i32).clamp(1, 6) as usize;
            let affinity = threat.predominant.map(|element| element.countered_by());
            for (dx, dy) in DEFENSE_RING.into_iter().take(count) {
                let cell = threat.cell.offset(dx, dy);
                if ctx.board.contains(cell) {
                    waypoints.push(
                        Waypoint::new(
                            WaypointKind::Move,
                            cell,
                            weights.defend_move_base + threat.pressure as i32 + self.posture.caution,
                        )
                        .with_affinity(affinity),
                    );
                }
            }
        }

        let radius = ctx.config.threat.defend_radius;
        for rival in ctx.rival_units() {
            let closing_in = ctx
                .owned_structures()
                .any(|structure| structure.position.manhattan(rival.position) <= radius);
            if closing_in {
                waypoints.push(
                    Waypoint::new(
                        WaypointKind::Attack,
                        rival.position,
                        weights.defend_attack + self.posture.aggression,
                    )
                    .with_affinity(Some(rival.element.countered_by())),
                );
            }
        }
        waypoints
    }

    /// Attack waypoints favoring wounded rivals near friendly units and
    /// structures, plus Move waypoints on open ground close to the action.
    pub fn kill_candidates(&self) -> Vec<Waypoint> {
        let ctx = self.ctx;
        let mut waypoints: Vec<Waypoint> = ctx
            .rival_units()
            .map(|rival| {
                let priority = kill_priority(ctx, rival) + self.posture.aggression;
                Waypoint::new(WaypointKind::Attack, rival.position, priority)
                    .with_affinity(Some(rival.element.countered_by()))
            })
            .collect();

        for cell in ctx
            .field
            .find_no_mans_land_cells(ctx.config.thresholds.no_mans_land)
        {
            if !ctx.board.is_deployable(cell) {
                continue;
            }
            let enemy = closeness(cell, ctx.rival_units().map(|unit| unit.position));
            let forts = closeness(cell, ctx.owned_structures().map(|s| s.position));
            if enemy + forts < 0.2 {
                continue;
            }
            let safety = ctx.field.safety_at(cell, ctx.faction);
            let priority =
                (safety * 50.0 + enemy * 30.0 + forts * 20.0).round() as i32 + self.posture.caution;
            waypoints.push(Waypoint::new(WaypointKind::Move, cell, priority));
        }
        waypoints
    }
}

/// Sum of inverse distances to the targets within four steps of `cell`.
fn closeness(cell: Position, targets: impl Iterator<Item = Position>) -> f32 {
    targets
        .map(|target| target.manhattan(cell))
        .filter(|&d| d > 0 && d <= 4)
        .map(|d| 1.0 / d as f32)
        .sum()
}

fn kill_priority<B: BoardQuery>(ctx: &FactionContext<'_, B>, rival: &Unit) -> i32 {
    let missing = 1.0 - rival.health_ratio();
    let friendly = ctx
        .nearest_friendly(rival.position)
        .map_or(0.0, |unit| 20.0 / (1.0 + unit.position.manhattan(rival.position) as f32));
    let structure = ctx
        .nearest_owned_structure_distance(rival.position)
        .map_or(0.0, |d| 20.0 / (1.0 + d as f32));
    (50.0 + missing * 30.0 + friendly + structure).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AiConfig;
    use crate::influence::InfluenceField;
    use skirmish_core::{Board, BoardBuilder, Element, Faction, GridShape, Mana, StructureId, UnitTemplate};

    fn board() -> Board {
        BoardBuilder::new(GridShape::new(12, 8))
            .structure(Position::new(2, 2))
            .structure(Position::new(9, 5))
            .template(UnitTemplate::new("ember", Element::Fire, 1))
            .template(UnitTemplate::new("tide", Element::Water, 1))
            .build()
    }

    #[test]
    fn attack_priority_rewards_advantage_and_proximity() {
        let mut board = board();
        board.spawn(Faction::A, "tide", Position::new(4, 4)).unwrap();
        board.spawn(Faction::B, "ember", Position::new(6, 4)).unwrap();
        let config = AiConfig::default();
        let field = InfluenceField::from_board(&board, &config.influence);
        let ctx = FactionContext::new(&board, &field, &config, Faction::A);

        let attacks = WaypointGenerator::new(&ctx, Posture::default()).attack_candidates();
        assert_eq!(attacks.len(), 1);
        // The rival's own cell reads 0.5 - 1.0 for A, so support counts against.
        let expected = 10 + 5 + (5 - 2) - 4;
        assert_eq!(attacks[0].priority, expected);
        assert_eq!(attacks[0].affinity, Some(Element::Water));
    }

    #[test]
    fn proximity_bonus_shrinks_with_distance() {
        let board = board();
        let config = AiConfig::default();
        let field = InfluenceField::from_board(&board, &config.influence);
        let ctx = FactionContext::new(&board, &field, &config, Faction::A);
        let generator = WaypointGenerator::new(&ctx, Posture::default());

        let bonuses: Vec<_> = (0..=6).map(|d| generator.proximity(Some(d))).collect();
        assert_eq!(bonuses, vec![5, 4, 3, 2, 1, 0, 0]);
        assert_eq!(generator.proximity(None), 0);
    }

    #[test]
    fn unclaimed_structures_outrank_rival_ones() {
        let mut board = board();
        board.structure_mut(StructureId(1)).unwrap().owner = Some(Faction::B);
        board.structure_mut(StructureId(1)).unwrap().element = Some(Element::Plant);
        let config = AiConfig::default();
        let field = InfluenceField::from_board(&board, &config.influence);
        let ctx = FactionContext::new(&board, &field, &config, Faction::A);

        let set = WaypointSet::new(WaypointGenerator::new(&ctx, Posture::default()).capture_candidates());
        let captures: Vec<_> = set.of_kind(WaypointKind::Capture).collect();
        assert_eq!(captures.len(), 2);
        assert_eq!(captures[0].target, Position::new(2, 2));
        assert_eq!(captures[0].priority, 12 + 5);
        assert_eq!(captures[1].priority, 12);
        assert_eq!(captures[1].affinity, Some(Element::Fire));
    }

    #[test]
    fn deploys_need_mana_and_respect_the_cap() {
        let mut board = board();
        board.structure_mut(StructureId(0)).unwrap().owner = Some(Faction::A);
        let mut config = AiConfig::default();
        let field = InfluenceField::from_board(&board, &config.influence);

        {
            let ctx = FactionContext::new(&board, &field, &config, Faction::A);
            assert!(WaypointGenerator::new(&ctx, Posture::default()).deploy_candidates().is_empty());
        }

        board.set_mana(Faction::A, Mana::new(2, 1, 0));
        config.deploy.waypoint_cap = 2;
        let ctx = FactionContext::new(&board, &field, &config, Faction::A);
        let deploys = WaypointGenerator::new(&ctx, Posture::default()).deploy_candidates();
        assert_eq!(deploys.len(), 2);
        for waypoint in &deploys {
            assert!(board.is_deployable(waypoint.target));
            assert!(waypoint.target.manhattan(Position::new(2, 2)) <= config.deploy.reach);
            // No units: zero safety; the structure bonus is clamp(10 - d, 0, 8).
            let d = waypoint.target.manhattan(Position::new(2, 2)) as i32;
            assert_eq!(waypoint.priority, 30 + (10 - d).clamp(0, 8));
            assert_eq!(waypoint.affinity, Some(Element::Fire));
        }
    }

    #[test]
    fn defense_rings_threatened_structures() {
        let mut board = board();
        board.structure_mut(StructureId(0)).unwrap().owner = Some(Faction::A);
        board.spawn(Faction::B, "ember", Position::new(3, 2)).unwrap();
        let config = AiConfig::default();
        let field = InfluenceField::from_board(&board, &config.influence);
        let ctx = FactionContext::new(&board, &field, &config, Faction::A);

        let threats = ctx.threats();
        let waypoints = WaypointGenerator::new(&ctx, Posture::default()).defense_candidates(&threats);
        let moves: Vec<_> = waypoints.iter().filter(|w| w.kind == WaypointKind::Move).collect();
        let attacks: Vec<_> = waypoints.iter().filter(|w| w.kind == WaypointKind::Attack).collect();
        assert!(!moves.is_empty() && moves.len() <= 6);
        assert!(moves.iter().all(|w| w.target.chebyshev(Position::new(2, 2)) == 1));
        assert!(moves.iter().all(|w| w.affinity == Some(Element::Water)));
        assert_eq!(attacks.len(), 1);
        assert_eq!(attacks[0].priority, 80);
    }

    #[test]
    fn kill_priority_grows_as_rivals_weaken() {
        let mut board = board();
        board.spawn(Faction::A, "tide", Position::new(4, 4)).unwrap();
        let rival = board.spawn(Faction::B, "ember", Position::new(7, 4)).unwrap();
        let config = AiConfig::default();

        let priority = |board: &Board| {
            let field = InfluenceField::from_board(board, &config.influence);
            let ctx = FactionContext::new(board, &field, &config, Faction::A);
            WaypointGenerator::new(&ctx, Posture::default())
                .kill_candidates()
                .into_iter()
                .find(|w| w.kind == WaypointKind::Attack)
                .map(|w| w.priority)
        };
        // 50 + 0 + 20 / (1 + 3) with no owned structure.
        assert_eq!(priority(&board), Some(55));
        board.unit_mut(rival).unwrap().health = 50;
        assert_eq!(priority(&board), Some(70));
    }
}

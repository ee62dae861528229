//! Per-unit view and the tactical helpers shared by unit behaviors.

use skirmish_core::{BoardQuery, CardinalDirection, Position, Unit, rotate_damage_area};

use crate::config::AiConfig;
use crate::context::FactionContext;
use crate::executor::PrimitiveAction;
use crate::navigator::Navigator;
use crate::threat;
use crate::waypoint::WaypointSet;

/// Best direction to hit from a given cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Strike {
    pub direction: CardinalDirection,
    /// Damage dealt to rivals, kill bonuses included, minus friendly fire.
    pub score: i32,
}

pub struct UnitContext<'a, B> {
    pub faction: FactionContext<'a, B>,
    pub unit: &'a Unit,
    pub waypoints: &'a WaypointSet,
    pub nav: &'a Navigator<'a, B>,
}

impl<'a, B: BoardQuery> UnitContext<'a, B> {
    pub fn new(
        faction: FactionContext<'a, B>,
        unit: &'a Unit,
        waypoints: &'a WaypointSet,
        nav: &'a Navigator<'a, B>,
    ) -> Self {
        Self {
            faction,
            unit,
            waypoints,
            nav,
        }
    }

    pub fn config(&self) -> &'a AiConfig {
        self.faction.config
    }

    /// Scores every facing from `cell` and keeps the best one that hits at
    /// least one rival for a positive total. Ties keep the first facing in
    /// [`CardinalDirection::ALL`].
    pub fn strike_from(&self, cell: Position) -> Option<Strike> {
        let board = self.faction.board;
        let mut best: Option<Strike> = None;
        for direction in CardinalDirection::ALL {
            let mut score = 0i32;
            let mut hits_rival = false;
            for offset in rotate_damage_area(&self.unit.damage_area, direction) {
                let Some(target) = board.unit_at(cell + offset) else {
                    continue;
                };
                if target.id == self.unit.id {
                    continue;
                }
                let dealt = self.unit.damage.min(target.health) as i32;
                if target.owner == self.unit.owner {
                    score -= dealt;
                } else {
                    hits_rival = true;
                    score += dealt;
                    if self.unit.damage >= target.health {
                        score += self.config().unit.kill_bonus;
                    }
                }
            }
            if hits_rival && score > 0 && best.is_none_or(|top| score > top.score) {
                best = Some(Strike { direction, score });
            }
        }
        best
    }

    /// Where the unit may end its move this turn, its own cell first.
    pub fn candidate_cells(&self, hold_ground: bool) -> Vec<Position> {
        let mut cells = vec![self.unit.position];
        if !hold_ground {
            cells.extend(self.nav.reachable_cells(self.unit));
        }
        cells
    }

    /// Most wounded teammate nearby that the rival is pressing.
    pub fn wounded_teammate(&self) -> Option<&'a Unit> {
        let config = &self.config().unit;
        let field = self.faction.field;
        self.faction
            .friendly_units()
            .filter(|mate| mate.id != self.unit.id)
            .filter(|mate| mate.health_ratio() <= config.escort_health)
            .filter(|mate| mate.position.manhattan(self.unit.position) <= config.escort_radius)
            .filter(|mate| field.pressure_at(mate.position, self.faction.faction) > 0.0)
            .min_by(|a, b| a.health_ratio().total_cmp(&b.health_ratio()))
    }

    /// Standing on an owned structure the rival is threatening.
    pub fn on_threatened_structure(&self) -> bool {
        self.faction
            .board
            .structure_at(self.unit.position)
            .filter(|structure| structure.is_owned_by(self.faction.faction))
            .is_some_and(|structure| {
                threat::assess(&self.faction, structure).is_threatened(&self.config().threat)
            })
    }

    pub fn nearest_rival(&self) -> Option<&'a Unit> {
        self.faction
            .rival_units()
            .min_by_key(|rival| rival.position.manhattan(self.unit.position))
    }

    /// Highest scoring cell among `candidates`; ties keep the earlier one.
    pub fn best_cell(
        &self,
        candidates: &[Position],
        mut score: impl FnMut(Position) -> f32,
    ) -> Option<Position> {
        let mut best: Option<(Position, f32)> = None;
        for &cell in candidates {
            let value = score(cell);
            if !value.is_nan() && best.is_none_or(|(_, top)| value > top) {
                best = Some((cell, value));
            }
        }
        best.map(|(cell, _)| cell)
    }

    /// Cell offering the best strike, with safety weighted in.
    pub fn best_strike_cell(&self, candidates: &[Position], safety_weight: f32) -> Option<Position> {
        let mut best: Option<(Position, f32)> = None;
        for &cell in candidates {
            let Some(strike) = self.strike_from(cell) else {
                continue;
            };
            let value = strike.score as f32 + self.safety(cell) * safety_weight * 10.0;
            if best.is_none_or(|(_, top)| value > top) {
                best = Some((cell, value));
            }
        }
        best.map(|(cell, _)| cell)
    }

    /// Candidate closest to `target`, with safety breaking near-ties.
    pub fn closest_cell(
        &self,
        candidates: &[Position],
        target: Position,
        safety_weight: f32,
    ) -> Option<Position> {
        self.best_cell(candidates, |cell| {
            -(cell.manhattan(target) as f32) + self.safety(cell) * safety_weight
        })
    }

    pub fn safety(&self, cell: Position) -> f32 {
        self.faction.field.safety_at(cell, self.faction.faction)
    }

    /// Move to `destination` (when it differs from the current cell and a
    /// path exists), then strike from wherever the unit ends up.
    pub fn plan(&self, destination: Position) -> Vec<PrimitiveAction> {
        let mut actions = Vec::new();
        let mut end = self.unit.position;
        if destination != end {
            let path = self.nav.path_to(self.unit, destination);
            if path.len() > 1 {
                end = destination;
                actions.push(PrimitiveAction::Move {
                    unit: self.unit.id,
                    path,
                });
            }
        }
        if !self.unit.exhausted
            && let Some(strike) = self.strike_from(end)
        {
            actions.push(PrimitiveAction::Attack {
                unit: self.unit.id,
                direction: strike.direction,
            });
        }
        actions
    }
}

//! Signed territorial-control field over the board.
//!
//! Every live unit projects influence that decays linearly with Manhattan
//! distance and vanishes at the configured radius. Faction A contributes
//! positive values and faction B negative ones, so the sign of a cell tells
//! who controls it and the magnitude tells how firmly.

use skirmish_core::{Adjacency, BoardQuery, Faction, GridShape, Position, Unit};
use tracing::trace;

use crate::config::{InfluenceConfig, ThresholdConfig};

#[derive(Clone, Debug)]
pub struct InfluenceField {
    shape: GridShape,
    values: Vec<f32>,
    radius: u32,
    strength: f32,
    rebuilds: u64,
}

impl InfluenceField {
    pub fn new(shape: GridShape, config: &InfluenceConfig) -> Self {
        Self {
            shape,
            values: vec![0.0; shape.cell_count()],
            radius: config.radius,
            strength: config.strength,
            rebuilds: 0,
        }
    }

    /// Builds a field and immediately projects the board's units onto it.
    pub fn from_board<B: BoardQuery>(board: &B, config: &InfluenceConfig) -> Self {
        let mut field = Self::new(board.shape(), config);
        field.rebuild(board);
        field
    }

    pub fn shape(&self) -> GridShape {
        self.shape
    }

    /// Number of rebuilds so far.
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    /// Recomputes every cell from the live units on `board`.
    ///
    /// Rebuilding twice against the same board yields identical values.
    pub fn rebuild<B: BoardQuery>(&mut self, board: &B) {
        if board.shape() != self.shape {
            self.shape = board.shape();
            self.values = vec![0.0; self.shape.cell_count()];
        } else {
            self.values.fill(0.0);
        }
        for unit in board.units().iter().filter(|unit| unit.is_alive()) {
            self.project(unit);
        }
        self.rebuilds += 1;
        trace!(rebuilds = self.rebuilds, units = board.units().len(), "influence rebuilt");
    }

    fn project(&mut self, unit: &Unit) {
        let signed = unit.owner.sign() * self.strength;
        for cell in self.shape.cells_within(unit.position, self.radius) {
            let falloff = if self.radius == 0 {
                1.0
            } else {
                1.0 - unit.position.manhattan(cell) as f32 / self.radius as f32
            };
            if let Some(index) = self.shape.index_of(cell) {
                self.values[index] += signed * falloff;
            }
        }
    }

    /// Raw signed influence; zero outside the board.
    pub fn influence_at(&self, cell: Position) -> f32 {
        self.shape
            .index_of(cell)
            .map_or(0.0, |index| self.values[index])
    }

    /// Influence from `faction`'s point of view: positive where it leads.
    pub fn relative_at(&self, cell: Position, faction: Faction) -> f32 {
        self.influence_at(cell) * faction.sign()
    }

    /// How firmly `faction` holds `cell`; zero where the rival leads.
    pub fn safety_at(&self, cell: Position, faction: Faction) -> f32 {
        self.relative_at(cell, faction).max(0.0)
    }

    /// How firmly the rival of `faction` holds `cell`.
    pub fn pressure_at(&self, cell: Position, faction: Faction) -> f32 {
        (-self.relative_at(cell, faction)).max(0.0)
    }

    /// Cell where `faction` is weak but backed by a strongly held neighbor.
    ///
    /// Considers cells whose own influence is below `thresholds.frontier`
    /// with at least one of the eight neighbors at or above
    /// `thresholds.strong_neighbor`, and returns the weakest of them. Ties
    /// keep the first cell in row-major scan order.
    pub fn find_weak_frontier_cell(
        &self,
        faction: Faction,
        thresholds: &ThresholdConfig,
    ) -> Option<Position> {
        let mut best: Option<(Position, f32)> = None;
        for cell in self.shape.cells() {
            let own = self.safety_at(cell, faction);
            if own >= thresholds.frontier {
                continue;
            }
            let backed = self
                .shape
                .neighbors(cell, Adjacency::Surrounding)
                .iter()
                .any(|neighbor| self.safety_at(*neighbor, faction) >= thresholds.strong_neighbor);
            if backed && best.is_none_or(|(_, weakest)| own < weakest) {
                best = Some((cell, own));
            }
        }
        best.map(|(cell, _)| cell)
    }

    /// Cells neither faction controls: the influence magnitude is below
    /// `threshold` on both sides. Returned in row-major scan order.
    pub fn find_no_mans_land_cells(&self, threshold: f32) -> Vec<Position> {
        self.shape
            .cells()
            .filter(|cell| self.is_no_mans_land(*cell, threshold))
            .collect()
    }

    pub fn is_no_mans_land(&self, cell: Position, threshold: f32) -> bool {
        let value = self.influence_at(cell);
        value.max(0.0) < threshold && (-value).max(0.0) < threshold
    }

    /// Highest-scoring in-bounds cell passing `filter`.
    ///
    /// Ties keep the first cell in row-major scan order; NaN scores never win.
    pub fn find_best_cell(
        &self,
        mut filter: impl FnMut(Position) -> bool,
        mut score: impl FnMut(Position) -> f32,
    ) -> Option<Position> {
        let mut best: Option<(Position, f32)> = None;
        for cell in self.shape.cells() {
            if !filter(cell) {
                continue;
            }
            let value = score(cell);
            if value.is_nan() {
                continue;
            }
            if best.is_none_or(|(_, top)| value > top) {
                best = Some((cell, value));
            }
        }
        best.map(|(cell, _)| cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::{Board, BoardBuilder, Element, UnitTemplate};

    fn board(units: &[(Faction, Position)]) -> Board {
        let mut board = BoardBuilder::new(GridShape::new(10, 10))
            .template(UnitTemplate::new("scout", Element::Fire, 1))
            .build();
        for (faction, cell) in units {
            board.spawn(*faction, "scout", *cell).unwrap();
        }
        board
    }

    fn config() -> InfluenceConfig {
        InfluenceConfig {
            radius: 4,
            strength: 1.0,
        }
    }

    #[test]
    fn footprint_decays_linearly_to_the_radius() {
        let board = board(&[(Faction::A, Position::new(5, 5))]);
        let field = InfluenceField::from_board(&board, &config());
        assert_eq!(field.influence_at(Position::new(5, 5)), 1.0);
        assert_eq!(field.influence_at(Position::new(6, 6)), 0.5);
        assert_eq!(field.influence_at(Position::new(9, 5)), 0.0);
        assert_eq!(field.influence_at(Position::new(-1, 5)), 0.0);
        assert_eq!(field.relative_at(Position::new(5, 5), Faction::B), -1.0);
    }

    #[test]
    fn rebuild_is_idempotent() {
        let board = board(&[
            (Faction::A, Position::new(2, 2)),
            (Faction::B, Position::new(4, 3)),
            (Faction::B, Position::new(8, 8)),
        ]);
        let mut field = InfluenceField::from_board(&board, &config());
        let first: Vec<f32> = board.shape().cells().map(|c| field.influence_at(c)).collect();
        field.rebuild(&board);
        let second: Vec<f32> = board.shape().cells().map(|c| field.influence_at(c)).collect();
        assert_eq!(first, second);
        assert_eq!(field.rebuilds(), 2);
    }

    #[test]
    fn opposed_units_cancel_at_the_midpoint() {
        let board = board(&[
            (Faction::A, Position::new(2, 5)),
            (Faction::B, Position::new(6, 5)),
        ]);
        let field = InfluenceField::from_board(&board, &config());
        assert_eq!(field.influence_at(Position::new(4, 5)), 0.0);
        assert!(field.influence_at(Position::new(3, 5)) > 0.0);
        assert!(field.influence_at(Position::new(5, 5)) < 0.0);
    }

    #[test]
    fn no_mans_land_partitions_the_board() {
        let board = board(&[
            (Faction::A, Position::new(1, 1)),
            (Faction::B, Position::new(7, 6)),
        ]);
        let field = InfluenceField::from_board(&board, &config());
        let threshold = 0.4;
        let open = field.find_no_mans_land_cells(threshold);
        for cell in board.shape().cells() {
            let value = field.influence_at(cell);
            let controlled = value.max(0.0) >= threshold || (-value).max(0.0) >= threshold;
            assert_ne!(open.contains(&cell), controlled, "{cell}");
        }
        assert!(!open.contains(&Position::new(1, 1)));
        assert!(open.contains(&Position::new(9, 0)));
    }

    #[test]
    fn weak_frontier_sits_next_to_a_stronghold() {
        let board = board(&[(Faction::A, Position::new(5, 5))]);
        let field = InfluenceField::from_board(&board, &config());
        let thresholds = ThresholdConfig {
            frontier: 0.5,
            strong_neighbor: 1.0,
            no_mans_land: 0.25,
        };
        // Only the unit's cell reaches 1.0; its eight neighbors sit at 0.75
        // or 0.5, none below the frontier threshold.
        assert_eq!(field.find_weak_frontier_cell(Faction::A, &thresholds), None);

        let relaxed = ThresholdConfig {
            frontier: 0.6,
            ..thresholds
        };
        // The weakest backed cells are the diagonals at 0.5; (4, 4) comes
        // first in scan order.
        assert_eq!(
            field.find_weak_frontier_cell(Faction::A, &relaxed),
            Some(Position::new(4, 4))
        );
        assert_eq!(field.find_weak_frontier_cell(Faction::B, &relaxed), None);
    }

    #[test]
    fn best_cell_keeps_first_on_ties() {
        let board = board(&[]);
        let field = InfluenceField::from_board(&board, &config());
        let best = field.find_best_cell(|cell| cell.x >= 3, |cell| if cell.y == 2 { 1.0 } else { 0.0 });
        assert_eq!(best, Some(Position::new(3, 2)));
        assert_eq!(field.find_best_cell(|_| false, |_| 1.0), None);
        assert_eq!(field.find_best_cell(|_| true, |_| f32::NAN), None);
    }
}

//! Movement queries for a single board snapshot.
//!
//! Moving off a cell costs that cell's move cost (departure cost), so the
//! price of a path is the sum over every cell but the last. Obstructing or
//! impassable tiles and cells holding a live unit can never be entered.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, VecDeque};

use skirmish_core::{Adjacency, BoardQuery, GridShape, Position, Unit};

/// Entry in the A* open set, ordered as a min-heap on `priority` with
/// insertion order breaking ties.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PathNode {
    cell: Position,
    cost: u32,
    priority: u32,
    seq: u64,
}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Reachability and pathfinding over one board snapshot.
///
/// Obstruction is sampled once on construction; build a new navigator after
/// the board changes.
pub struct Navigator<'a, B> {
    board: &'a B,
    shape: GridShape,
    obstructed: Vec<bool>,
}

impl<'a, B: BoardQuery> Navigator<'a, B> {
    pub fn new(board: &'a B) -> Self {
        let shape = board.shape();
        let obstructed = shape.cells().map(|cell| board.is_obstructed(cell)).collect();
        Self {
            board,
            shape,
            obstructed,
        }
    }

    pub fn board(&self) -> &'a B {
        self.board
    }

    /// In bounds and free to enter.
    pub fn is_open(&self, cell: Position) -> bool {
        self.shape
            .index_of(cell)
            .is_some_and(|index| !self.obstructed[index])
    }

    /// Every cell `unit` can end its move on this turn, excluding its own
    /// cell, in row-major scan order.
    ///
    /// A unit without movement points reaches nothing, even across free tiles.
    pub fn reachable_cells(&self, unit: &Unit) -> Vec<Position> {
        let Some(origin_index) = self.shape.index_of(unit.position) else {
            return Vec::new();
        };
        if unit.move_points == 0 {
            return Vec::new();
        }

        // Best remaining points seen per cell.
        let mut best: Vec<Option<u32>> = vec![None; self.shape.cell_count()];
        best[origin_index] = Some(unit.move_points);
        let mut frontier = VecDeque::from([(unit.position, unit.move_points)]);

        while let Some((cell, remaining)) = frontier.pop_front() {
            let Some(cost) = self.board.leave_cost(cell) else {
                continue;
            };
            let Some(left) = remaining.checked_sub(cost) else {
                continue;
            };
            for next in self.shape.neighbors(cell, Adjacency::Orthogonal) {
                if !self.is_open(next) {
                    continue;
                }
                let Some(index) = self.shape.index_of(next) else {
                    continue;
                };
                if best[index].is_none_or(|seen| seen < left) {
                    best[index] = Some(left);
                    frontier.push_back((next, left));
                }
            }
        }

        best.iter()
            .enumerate()
            .filter(|&(index, seen)| seen.is_some() && index != origin_index)
            .filter_map(|(index, _)| self.shape.cell_at(index))
            .collect()
    }

    pub fn is_reachable(&self, unit: &Unit, cell: Position) -> bool {
        self.is_open(cell) && self.reachable_cells(unit).contains(&cell)
    }

    /// Cheapest route for `unit` to `destination`, both ends included.
    ///
    /// Returns `[origin]` when already there, and an empty path when the
    /// destination is out of bounds, blocked, or beyond the unit's points.
    pub fn path_to(&self, unit: &Unit, destination: Position) -> Vec<Position> {
        let origin = unit.position;
        if origin == destination {
            return vec![origin];
        }
        if !self.is_open(destination) || unit.move_points == 0 {
            return Vec::new();
        }

        let mut open = BinaryHeap::new();
        let mut came_from: HashMap<Position, Position> = HashMap::new();
        let mut cost_so_far: HashMap<Position, u32> = HashMap::from([(origin, 0)]);
        let mut seq = 0u64;
        open.push(PathNode {
            cell: origin,
            cost: 0,
            priority: origin.manhattan(destination),
            seq,
        });

        while let Some(current) = open.pop() {
            if current.cell == destination {
                return reconstruct_path(&came_from, destination);
            }
            if cost_so_far
                .get(&current.cell)
                .is_some_and(|&known| known < current.cost)
            {
                continue;
            }
            let Some(step) = self.board.leave_cost(current.cell) else {
                continue;
            };
            let new_cost = current.cost.saturating_add(step);
            if new_cost > unit.move_points {
                continue;
            }
            for next in self.shape.neighbors(current.cell, Adjacency::Orthogonal) {
                if !self.is_open(next) {
                    continue;
                }
                if cost_so_far.get(&next).is_none_or(|&known| new_cost < known) {
                    cost_so_far.insert(next, new_cost);
                    came_from.insert(next, current.cell);
                    seq += 1;
                    open.push(PathNode {
                        cell: next,
                        cost: new_cost,
                        priority: new_cost + next.manhattan(destination),
                        seq,
                    });
                }
            }
        }

        Vec::new()
    }

    /// Movement points a path would consume.
    pub fn path_cost(&self, path: &[Position]) -> Option<u32> {
        let (_, departures) = path.split_last()?;
        departures
            .iter()
            .try_fold(0u32, |total, cell| Some(total + self.board.leave_cost(*cell)?))
    }
}

fn reconstruct_path(came_from: &HashMap<Position, Position>, mut current: Position) -> Vec<Position> {
    let mut path = vec![current];
    while let Some(&previous) = came_from.get(&current) {
        path.push(previous);
        current = previous;
    }
    path.reverse();
    path
}

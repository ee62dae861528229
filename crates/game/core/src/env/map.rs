use arrayvec::ArrayVec;

use crate::state::Position;

/// Offsets for the four orthogonal neighbors, in expansion order.
pub const ORTHOGONAL_OFFSETS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Offsets for all eight neighbors: orthogonal first, then diagonal.
pub const SURROUNDING_OFFSETS: [(i32, i32); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (-1, -1),
    (1, -1),
    (-1, 1),
];

/// Which cells count as adjacent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Adjacency {
    Orthogonal,
    Surrounding,
}

impl Adjacency {
    pub fn offsets(self) -> &'static [(i32, i32)] {
        match self {
            Adjacency::Orthogonal => &ORTHOGONAL_OFFSETS,
            Adjacency::Surrounding => &SURROUNDING_OFFSETS,
        }
    }
}

/// Bounds of the rectangular board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridShape {
    pub width: u32,
    pub height: u32,
}

impl GridShape {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && position.x < self.width as i32
            && position.y < self.height as i32
    }

    pub const fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Dense row-major index of an in-bounds cell.
    pub fn index_of(&self, position: Position) -> Option<usize> {
        self.contains(position)
            .then(|| position.y as usize * self.width as usize + position.x as usize)
    }

    pub fn cell_at(&self, index: usize) -> Option<Position> {
        (index < self.cell_count()).then(|| {
            let width = self.width as usize;
            Position::new((index % width) as i32, (index / width) as i32)
        })
    }

    /// Every cell in row-major scan order (top row first, left to right).
    pub fn cells(&self) -> impl Iterator<Item = Position> + use<> {
        let (width, height) = (self.width as i32, self.height as i32);
        (0..height).flat_map(move |y| (0..width).map(move |x| Position::new(x, y)))
    }

    /// In-bounds neighbors of `position`, in the order of [`Adjacency::offsets`].
    pub fn neighbors(&self, position: Position, adjacency: Adjacency) -> ArrayVec<Position, 8> {
        adjacency
            .offsets()
            .iter()
            .map(|&(dx, dy)| position.offset(dx, dy))
            .filter(|cell| self.contains(*cell))
            .collect()
    }

    /// In-bounds cells within Manhattan `radius` of `center`, center included.
    pub fn cells_within(&self, center: Position, radius: u32) -> Vec<Position> {
        let r = radius as i32;
        let mut cells = Vec::new();
        for dy in -r..=r {
            let span = r - dy.abs();
            for dx in -span..=span {
                let cell = center.offset(dx, dy);
                if self.contains(cell) {
                    cells.push(cell);
                }
            }
        }
        cells
    }
}

/// Cost of stepping off a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MoveCost {
    Cost(u32),
    Impassable,
}

/// Immutable descriptor for a board tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tile {
    pub move_cost: MoveCost,
    pub obstructs: bool,
    /// Damage dealt to a unit that finishes a move here.
    pub entry_damage: u32,
}

impl Tile {
    pub const GROUND: Tile = Tile::new(MoveCost::Cost(1));
    pub const WALL: Tile = Tile {
        move_cost: MoveCost::Impassable,
        obstructs: true,
        entry_damage: 0,
    };

    pub const fn new(move_cost: MoveCost) -> Self {
        Self {
            move_cost,
            obstructs: false,
            entry_damage: 0,
        }
    }

    #[must_use]
    pub const fn with_entry_damage(mut self, damage: u32) -> Self {
        self.entry_damage = damage;
        self
    }

    /// Whether units may never stand on this tile.
    pub fn is_blocking(self) -> bool {
        self.obstructs || self.move_cost == MoveCost::Impassable
    }

    /// Movement points charged for leaving this tile, if leaving is possible.
    pub fn leave_cost(self) -> Option<u32> {
        match self.move_cost {
            MoveCost::Cost(cost) => Some(cost),
            MoveCost::Impassable => None,
        }
    }
}

impl Default for Tile {
    fn default() -> Self {
        Self::GROUND
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbors_are_clipped_to_bounds() {
        let shape = GridShape::new(3, 3);
        let corner = shape.neighbors(Position::ORIGIN, Adjacency::Orthogonal);
        assert_eq!(corner.as_slice(), &[Position::new(1, 0), Position::new(0, 1)]);
        assert_eq!(
            shape
                .neighbors(Position::new(1, 1), Adjacency::Surrounding)
                .len(),
            8
        );
    }

    #[test]
    fn scan_order_is_row_major() {
        let shape = GridShape::new(2, 2);
        let cells: Vec<_> = shape.cells().collect();
        assert_eq!(
            cells,
            vec![
                Position::new(0, 0),
                Position::new(1, 0),
                Position::new(0, 1),
                Position::new(1, 1)
            ]
        );
        for (index, cell) in cells.iter().enumerate() {
            assert_eq!(shape.index_of(*cell), Some(index));
            assert_eq!(shape.cell_at(index), Some(*cell));
        }
    }

    #[test]
    fn cells_within_forms_a_diamond() {
        let shape = GridShape::new(9, 9);
        assert_eq!(shape.cells_within(Position::new(4, 4), 2).len(), 13);
        assert_eq!(shape.cells_within(Position::ORIGIN, 1).len(), 3);
    }
}

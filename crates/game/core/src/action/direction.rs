use crate::state::Position;

/// Facing of an attack. Screen coordinates: `Up` is `y - 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CardinalDirection {
    Up,
    Down,
    Left,
    Right,
}

impl CardinalDirection {
    pub const ALL: [CardinalDirection; 4] = [
        CardinalDirection::Up,
        CardinalDirection::Right,
        CardinalDirection::Down,
        CardinalDirection::Left,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            CardinalDirection::Up => (0, -1),
            CardinalDirection::Down => (0, 1),
            CardinalDirection::Left => (-1, 0),
            CardinalDirection::Right => (1, 0),
        }
    }

    /// Signed angle, in radians, from `Up` to this direction.
    fn angle_from_up(self) -> f64 {
        let (ux, uy) = CardinalDirection::Up.delta();
        let (dx, dy) = self.delta();
        let cross = f64::from(ux * dy - uy * dx);
        let dot = f64::from(ux * dx + uy * dy);
        cross.atan2(dot)
    }
}

/// Rotates an up-facing damage area so it faces `direction`.
///
/// Each offset is rotated by the angle between `Up` and `direction`, then
/// rounded to the nearest cell.
pub fn rotate_damage_area(area: &[Position], direction: CardinalDirection) -> Vec<Position> {
    let angle = direction.angle_from_up();
    let (sin, cos) = angle.sin_cos();
    area.iter()
        .map(|offset| {
            let (x, y) = (f64::from(offset.x), f64::from(offset.y));
            Position::new(
                (x * cos - y * sin).round() as i32,
                (x * sin + y * cos).round() as i32,
            )
        })
        .collect()
}

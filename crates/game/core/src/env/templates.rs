use crate::element::Element;
use crate::state::{Mana, Position};

/// Blueprint a faction can pay for to put a new unit on the board.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitTemplate {
    pub name: String,
    pub element: Element,
    pub cost: Mana,
    pub health: u32,
    pub damage: u32,
    pub move_points: u32,
    /// Offsets hit by an attack, authored facing up (`(0, -1)` is the cell ahead).
    pub damage_area: Vec<Position>,
}

impl UnitTemplate {
    /// A template whose cost is `price` mana of its own element.
    pub fn new(name: impl Into<String>, element: Element, price: u32) -> Self {
        Self {
            name: name.into(),
            element,
            cost: Mana::of(element, price),
            health: 100,
            damage: 50,
            move_points: 4,
            damage_area: vec![Position::new(0, -1)],
        }
    }

    #[must_use]
    pub fn with_stats(mut self, health: u32, damage: u32, move_points: u32) -> Self {
        self.health = health;
        self.damage = damage;
        self.move_points = move_points;
        self
    }

    #[must_use]
    pub fn with_damage_area(mut self, area: impl Into<Vec<Position>>) -> Self {
        self.damage_area = area.into();
        self
    }
}

use crate::element::Element;

/// Per-faction resource pool, one counter per element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mana {
    pub fire: u32,
    pub water: u32,
    pub plant: u32,
}

impl Mana {
    pub const ZERO: Self = Self::new(0, 0, 0);

    pub const fn new(fire: u32, water: u32, plant: u32) -> Self {
        Self { fire, water, plant }
    }

    /// A pool holding `amount` of a single element.
    pub const fn of(element: Element, amount: u32) -> Self {
        match element {
            Element::Fire => Self::new(amount, 0, 0),
            Element::Water => Self::new(0, amount, 0),
            Element::Plant => Self::new(0, 0, amount),
        }
    }

    pub const fn amount(&self, element: Element) -> u32 {
        match element {
            Element::Fire => self.fire,
            Element::Water => self.water,
            Element::Plant => self.plant,
        }
    }

    pub const fn total(&self) -> u32 {
        self.fire + self.water + self.plant
    }

    pub const fn can_afford(&self, cost: &Mana) -> bool {
        self.fire >= cost.fire && self.water >= cost.water && self.plant >= cost.plant
    }

    /// Deducts `cost`, returning `false` and leaving the pool untouched when
    /// it cannot be afforded.
    pub fn spend(&mut self, cost: &Mana) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        self.fire -= cost.fire;
        self.water -= cost.water;
        self.plant -= cost.plant;
        true
    }

    pub fn obtain(&mut self, element: Element, amount: u32) {
        match element {
            Element::Fire => self.fire = self.fire.saturating_add(amount),
            Element::Water => self.water = self.water.saturating_add(amount),
            Element::Plant => self.plant = self.plant.saturating_add(amount),
        }
    }

    /// Element with the largest stock. Ties resolve in [`Element::ALL`] order.
    pub fn dominant(&self) -> Option<Element> {
        let mut best: Option<(Element, u32)> = None;
        for element in Element::ALL {
            let amount = self.amount(element);
            if amount > 0 && best.is_none_or(|(_, top)| amount > top) {
                best = Some((element, amount));
            }
        }
        best.map(|(element, _)| element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spend_is_all_or_nothing() {
        let mut pool = Mana::new(2, 0, 1);
        assert!(!pool.spend(&Mana::new(1, 1, 0)));
        assert_eq!(pool, Mana::new(2, 0, 1));
        assert!(pool.spend(&Mana::new(1, 0, 1)));
        assert_eq!(pool, Mana::new(1, 0, 0));
    }

    #[test]
    fn dominant_breaks_ties_in_element_order() {
        assert_eq!(Mana::ZERO.dominant(), None);
        assert_eq!(Mana::new(0, 2, 2).dominant(), Some(Element::Water));
        assert_eq!(Mana::new(1, 0, 3).dominant(), Some(Element::Plant));
    }
}

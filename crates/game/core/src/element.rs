//! Elemental affinities and their advantage cycle.
//!
//! Water beats Fire, Fire beats Plant, Plant beats Water.

/// Elemental affinity carried by units, templates, and structures.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Element {
    Fire,
    Water,
    Plant,
}

impl Element {
    /// Canonical order, also used to break ties.
    pub const ALL: [Element; 3] = [Element::Fire, Element::Water, Element::Plant];

    /// The element this one defeats.
    pub const fn beats(self) -> Element {
        match self {
            Element::Water => Element::Fire,
            Element::Fire => Element::Plant,
            Element::Plant => Element::Water,
        }
    }

    /// The element that defeats this one; the natural pick against it.
    pub const fn countered_by(self) -> Element {
        match self {
            Element::Fire => Element::Water,
            Element::Plant => Element::Fire,
            Element::Water => Element::Plant,
        }
    }

    pub fn has_advantage_over(self, other: Element) -> bool {
        self.beats() == other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advantage_cycle_is_closed() {
        assert!(Element::Water.has_advantage_over(Element::Fire));
        assert!(Element::Fire.has_advantage_over(Element::Plant));
        assert!(Element::Plant.has_advantage_over(Element::Water));
        for element in Element::ALL {
            assert_eq!(element.countered_by().beats(), element);
            assert!(!element.has_advantage_over(element));
        }
    }

    #[test]
    fn parses_snake_case_names() {
        assert_eq!("plant".parse::<Element>().ok(), Some(Element::Plant));
        assert_eq!(Element::Water.as_ref(), "water");
    }
}

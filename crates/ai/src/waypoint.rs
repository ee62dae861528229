//! Prioritized targets published by the faction strategy.

use skirmish_core::{Element, Position};

/// What a waypoint asks units to do at its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WaypointKind {
    Attack,
    Capture,
    Move,
    Deploy,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Waypoint {
    pub kind: WaypointKind,
    pub target: Position,
    /// Element best suited to the job, if any.
    pub affinity: Option<Element>,
    pub priority: i32,
}

impl Waypoint {
    pub const fn new(kind: WaypointKind, target: Position, priority: i32) -> Self {
        Self {
            kind,
            target,
            affinity: None,
            priority,
        }
    }

    #[must_use]
    pub const fn with_affinity(mut self, affinity: Option<Element>) -> Self {
        self.affinity = affinity;
        self
    }
}

/// Waypoints ordered by descending priority.
///
/// Equal priorities keep the order in which candidates were generated.
/// The set is read-only once built; each plan produces a fresh one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WaypointSet {
    waypoints: Vec<Waypoint>,
}

impl WaypointSet {
    pub fn new(mut waypoints: Vec<Waypoint>) -> Self {
        // `sort_by` is stable.
        waypoints.sort_by(|a, b| b.priority.cmp(&a.priority));
        Self { waypoints }
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Waypoint> {
        self.waypoints.iter()
    }

    pub fn as_slice(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn of_kind(&self, kind: WaypointKind) -> impl Iterator<Item = &Waypoint> {
        self.waypoints
            .iter()
            .filter(move |waypoint| waypoint.kind == kind)
    }

    /// Highest-priority waypoint of `kind`.
    pub fn best(&self, kind: WaypointKind) -> Option<&Waypoint> {
        self.of_kind(kind).next()
    }

    /// Highest-priority waypoint of `kind`, preferring ones whose affinity
    /// matches `element` when priorities tie.
    pub fn best_for(&self, kind: WaypointKind, element: Element) -> Option<&Waypoint> {
        let top = self.best(kind)?;
        self.of_kind(kind)
            .take_while(|waypoint| waypoint.priority == top.priority)
            .find(|waypoint| waypoint.affinity == Some(element))
            .or(Some(top))
    }
}

impl<'a> IntoIterator for &'a WaypointSet {
    type Item = &'a Waypoint;
    type IntoIter = std::slice::Iter<'a, Waypoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.waypoints.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_priorities_keep_generation_order() {
        let set = WaypointSet::new(vec![
            Waypoint::new(WaypointKind::Move, Position::new(0, 0), 5),
            Waypoint::new(WaypointKind::Capture, Position::new(1, 0), 80),
            Waypoint::new(WaypointKind::Attack, Position::new(2, 0), 80),
            Waypoint::new(WaypointKind::Deploy, Position::new(3, 0), 90),
        ]);
        let kinds: Vec<_> = set.iter().map(|waypoint| waypoint.kind).collect();
        assert_eq!(
            kinds,
            [
                WaypointKind::Deploy,
                WaypointKind::Capture,
                WaypointKind::Attack,
                WaypointKind::Move
            ]
        );
    }

    #[test]
    fn best_for_prefers_matching_affinity_among_ties() {
        let set = WaypointSet::new(vec![
            Waypoint::new(WaypointKind::Attack, Position::new(0, 0), 20)
                .with_affinity(Some(Element::Fire)),
            Waypoint::new(WaypointKind::Attack, Position::new(1, 0), 20)
                .with_affinity(Some(Element::Water)),
            Waypoint::new(WaypointKind::Attack, Position::new(2, 0), 10)
                .with_affinity(Some(Element::Plant)),
        ]);
        let water = set.best_for(WaypointKind::Attack, Element::Water).unwrap();
        assert_eq!(water.target, Position::new(1, 0));
        let plant = set.best_for(WaypointKind::Attack, Element::Plant).unwrap();
        assert_eq!(plant.target, Position::new(0, 0));
        assert!(set.best(WaypointKind::Capture).is_none());
    }
}

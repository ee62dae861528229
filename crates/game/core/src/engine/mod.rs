//! In-memory board: the authoritative state the decision engine plays on.
//!
//! [`Board`] implements both [`BoardQuery`] and [`BoardCommands`]. It is
//! assembled with a [`BoardBuilder`]; tiles are fixed once built.
mod events;

pub use events::BoardEvent;

use tracing::debug;

use crate::action::{BoardCommands, BoardError, CardinalDirection, rotate_damage_area};
use crate::env::{BoardQuery, GridShape, Tile, UnitTemplate};
use crate::state::{Faction, Mana, Position, Structure, StructureId, Unit, UnitId};

/// Assembles a [`Board`].
#[derive(Clone, Debug)]
pub struct BoardBuilder {
    shape: GridShape,
    tiles: Vec<Tile>,
    structures: Vec<Structure>,
    templates: Vec<UnitTemplate>,
    mana: [Mana; 2],
    first: Faction,
}

impl BoardBuilder {
    /// A board of the given size covered with [`Tile::GROUND`].
    pub fn new(shape: GridShape) -> Self {
        Self {
            shape,
            tiles: vec![Tile::GROUND; shape.cell_count()],
            structures: Vec::new(),
            templates: Vec::new(),
            mana: [Mana::ZERO; 2],
            first: Faction::A,
        }
    }

    /// Replaces the tile at `cell`; out-of-bounds cells are ignored.
    #[must_use]
    pub fn tile(mut self, cell: Position, tile: Tile) -> Self {
        if let Some(index) = self.shape.index_of(cell) {
            self.tiles[index] = tile;
        }
        self
    }

    /// Paints every cell for which `predicate` holds.
    #[must_use]
    pub fn paint(mut self, tile: Tile, predicate: impl Fn(Position) -> bool) -> Self {
        for (index, cell) in self.shape.cells().enumerate() {
            if predicate(cell) {
                self.tiles[index] = tile;
            }
        }
        self
    }

    /// Adds an unclaimed structure.
    #[must_use]
    pub fn structure(mut self, cell: Position) -> Self {
        let id = StructureId(self.structures.len() as u32);
        self.structures.push(Structure {
            id,
            position: cell,
            owner: None,
            element: None,
        });
        self
    }

    #[must_use]
    pub fn template(mut self, template: UnitTemplate) -> Self {
        self.templates.push(template);
        self
    }

    #[must_use]
    pub fn mana(mut self, faction: Faction, mana: Mana) -> Self {
        self.mana[faction.index()] = mana;
        self
    }

    #[must_use]
    pub fn first_turn(mut self, faction: Faction) -> Self {
        self.first = faction;
        self
    }

    pub fn build(self) -> Board {
        Board {
            shape: self.shape,
            tiles: self.tiles,
            units: Vec::new(),
            structures: self.structures,
            templates: self.templates,
            mana: self.mana,
            active: self.first,
            turn: 0,
            next_unit: 0,
            hold_in_flight: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Board {
    shape: GridShape,
    tiles: Vec<Tile>,
    units: Vec<Unit>,
    structures: Vec<Structure>,
    templates: Vec<UnitTemplate>,
    mana: [Mana; 2],
    active: Faction,
    turn: u32,
    next_unit: u32,
    hold_in_flight: bool,
}

impl Board {
    /// Places a unit for free, ignoring mana and turn order. Used to set up
    /// scenarios.
    pub fn spawn(
        &mut self,
        owner: Faction,
        template: &str,
        cell: Position,
    ) -> Result<UnitId, BoardError> {
        let template = self
            .template(template)
            .cloned()
            .ok_or_else(|| BoardError::UnknownTemplate(template.to_owned()))?;
        if !self.is_deployable(cell) {
            return Err(BoardError::NotDeployable(cell));
        }
        Ok(self.place(owner, &template, cell))
    }

    /// Direct access to a unit, for scenario setup.
    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.iter_mut().find(|unit| unit.id == id)
    }

    /// Direct access to a structure, for scenario setup.
    pub fn structure_mut(&mut self, id: StructureId) -> Option<&mut Structure> {
        self.structures
            .iter_mut()
            .find(|structure| structure.id == id)
    }

    pub fn set_mana(&mut self, faction: Faction, mana: Mana) {
        self.mana[faction.index()] = mana;
    }

    /// When set, moved units stay unselectable until [`Board::settle`],
    /// mimicking a front-end that animates moves.
    pub fn set_hold_in_flight(&mut self, hold: bool) {
        self.hold_in_flight = hold;
    }

    /// Marks every unit selectable again.
    pub fn settle(&mut self) {
        for unit in &mut self.units {
            unit.selectable = true;
        }
    }

    fn place(&mut self, owner: Faction, template: &UnitTemplate, cell: Position) -> UnitId {
        let id = UnitId(self.next_unit);
        self.next_unit += 1;
        self.units
            .push(Unit::from_template(id, template, owner, cell));
        debug!(unit = %id, %owner, %cell, template = %template.name, "unit placed");
        id
    }

    fn index_of_unit(&self, id: UnitId) -> Result<usize, BoardError> {
        self.units
            .iter()
            .position(|unit| unit.id == id)
            .ok_or(BoardError::UnitNotFound(id))
    }

    /// Looks up a unit the active faction may command.
    fn commandable(&self, id: UnitId) -> Result<usize, BoardError> {
        let index = self.index_of_unit(id)?;
        let unit = &self.units[index];
        if unit.owner != self.active {
            return Err(BoardError::NotActiveFaction {
                unit: id,
                owner: unit.owner,
            });
        }
        if !unit.selectable {
            return Err(BoardError::UnitBusy(id));
        }
        Ok(index)
    }

    /// Applies damage and removes the unit when it dies.
    fn damage(&mut self, index: usize, amount: u32, events: &mut Vec<BoardEvent>) -> bool {
        let unit = &mut self.units[index];
        unit.health = unit.health.saturating_sub(amount);
        events.push(BoardEvent::UnitDamaged {
            unit: unit.id,
            amount,
            remaining: unit.health,
        });
        if unit.is_alive() {
            return false;
        }
        let dead = self.units.remove(index);
        debug!(unit = %dead.id, cell = %dead.position, "unit killed");
        events.push(BoardEvent::UnitKilled {
            unit: dead.id,
            owner: dead.owner,
            cell: dead.position,
        });
        true
    }

    fn path_cost(&self, path: &[Position]) -> Result<u32, BoardError> {
        let mut cost = 0u32;
        for cell in &path[..path.len() - 1] {
            let step = self.leave_cost(*cell).ok_or(BoardError::Blocked(*cell))?;
            cost = cost.saturating_add(step);
        }
        Ok(cost)
    }
}

impl BoardQuery for Board {
    fn shape(&self) -> GridShape {
        self.shape
    }

    fn tile(&self, cell: Position) -> Option<Tile> {
        self.shape.index_of(cell).map(|index| self.tiles[index])
    }

    fn units(&self) -> &[Unit] {
        &self.units
    }

    fn structures(&self) -> &[Structure] {
        &self.structures
    }

    fn mana(&self, faction: Faction) -> Mana {
        self.mana[faction.index()]
    }

    fn templates(&self) -> &[UnitTemplate] {
        &self.templates
    }

    fn active_faction(&self) -> Faction {
        self.active
    }

    fn turn(&self) -> u32 {
        self.turn
    }
}

impl BoardCommands for Board {
    fn move_unit(&mut self, unit: UnitId, path: &[Position]) -> Result<Vec<BoardEvent>, BoardError> {
        let index = self.commandable(unit)?;
        let (&first, rest) = path.split_first().ok_or(BoardError::EmptyPath)?;
        let origin = self.units[index].position;
        if first != origin {
            return Err(BoardError::PathOrigin {
                expected: origin,
                found: first,
            });
        }
        let mut previous = first;
        for &cell in rest {
            if previous.manhattan(cell) != 1 {
                return Err(BoardError::PathGap {
                    from: previous,
                    to: cell,
                });
            }
            if !self.contains(cell) {
                return Err(BoardError::OutOfBounds(cell));
            }
            if self.is_obstructed(cell) {
                return Err(BoardError::Blocked(cell));
            }
            previous = cell;
        }
        let needed = self.path_cost(path)?;
        let available = self.units[index].move_points;
        if needed > available {
            return Err(BoardError::InsufficientMovePoints { needed, available });
        }

        let destination = previous;
        let hold = self.hold_in_flight && !rest.is_empty();
        let mover = &mut self.units[index];
        mover.move_points -= needed;
        mover.position = destination;
        mover.selectable = !hold;
        let (owner, element) = (mover.owner, mover.element);

        let mut events = vec![BoardEvent::UnitMoved {
            unit,
            path: path.to_vec(),
        }];

        if let Some(structure) = self
            .structures
            .iter_mut()
            .find(|structure| structure.position == destination)
            && (structure.owner != Some(owner) || structure.element != Some(element))
        {
            structure.owner = Some(owner);
            structure.element = Some(element);
            debug!(structure = %structure.id, by = %owner, %element, "structure captured");
            events.push(BoardEvent::StructureCaptured {
                structure: structure.id,
                by: owner,
                element,
            });
        }

        let entry_damage = self.tile(destination).map_or(0, |tile| tile.entry_damage);
        if entry_damage > 0 {
            self.damage(index, entry_damage, &mut events);
        }
        Ok(events)
    }

    fn attack(
        &mut self,
        unit: UnitId,
        direction: CardinalDirection,
    ) -> Result<Vec<BoardEvent>, BoardError> {
        let index = self.commandable(unit)?;
        let attacker = &mut self.units[index];
        if attacker.exhausted {
            return Err(BoardError::Exhausted(unit));
        }
        attacker.exhausted = true;
        let origin = attacker.position;
        let damage = attacker.damage;
        let area = rotate_damage_area(&attacker.damage_area, direction);

        let mut events = Vec::new();
        for offset in area {
            let cell = origin + offset;
            if let Some(victim) = self
                .units
                .iter()
                .position(|candidate| candidate.position == cell && candidate.is_alive())
            {
                self.damage(victim, damage, &mut events);
            }
        }
        debug!(%unit, %direction, hits = events.len(), "attack resolved");
        Ok(events)
    }

    fn deploy(&mut self, template: &str, cell: Position) -> Result<Vec<BoardEvent>, BoardError> {
        let faction = self.active;
        let template = self
            .template(template)
            .cloned()
            .ok_or_else(|| BoardError::UnknownTemplate(template.to_owned()))?;
        if !self.is_deployable(cell) {
            return Err(BoardError::NotDeployable(cell));
        }
        if !self.mana[faction.index()].spend(&template.cost) {
            return Err(BoardError::InsufficientMana {
                faction,
                template: template.name,
            });
        }
        let unit = self.place(faction, &template, cell);
        Ok(vec![BoardEvent::UnitAdded {
            unit,
            owner: faction,
            cell,
        }])
    }

    fn pass_turn(&mut self) -> Vec<BoardEvent> {
        let outgoing = self.active;
        let mut events = Vec::new();
        for unit in self.units.iter_mut().filter(|unit| unit.owner == outgoing) {
            unit.restore();
        }
        for structure in &self.structures {
            if let (Some(owner), Some(element)) = (structure.owner, structure.element)
                && owner == outgoing
            {
                self.mana[outgoing.index()].obtain(element, 1);
                events.push(BoardEvent::ManaHarvested {
                    faction: outgoing,
                    element,
                    amount: 1,
                });
            }
        }
        self.active = outgoing.rival();
        self.turn += 1;
        debug!(faction = %self.active, turn = self.turn, "turn started");
        events.push(BoardEvent::TurnStarted {
            faction: self.active,
            turn: self.turn,
        });
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;
    use crate::env::MoveCost;

    fn board() -> Board {
        BoardBuilder::new(GridShape::new(6, 6))
            .tile(Position::new(2, 0), Tile::new(MoveCost::Cost(2)).with_entry_damage(30))
            .tile(Position::new(3, 3), Tile::WALL)
            .structure(Position::new(4, 0))
            .template(UnitTemplate::new("ember", Element::Fire, 1))
            .template(UnitTemplate::new("tide", Element::Water, 2))
            .mana(Faction::A, Mana::new(1, 0, 0))
            .build()
    }

    #[test]
    fn move_charges_every_cell_but_the_last() {
        let mut board = board();
        let id = board.spawn(Faction::A, "ember", Position::new(0, 0)).unwrap();
        let path = [
            Position::new(0, 0),
            Position::new(1, 0),
            Position::new(2, 0),
            Position::new(3, 0),
        ];
        let events = board.move_unit(id, &path).unwrap();
        assert_eq!(events.len(), 1);
        // 1 (ground) + 1 (ground) + 2 (leaving the marsh)
        assert_eq!(board.unit(id).unwrap().move_points, 0);
        assert_eq!(board.unit(id).unwrap().position, Position::new(3, 0));
    }

    #[test]
    fn rejected_move_leaves_board_untouched() {
        let mut board = board();
        let id = board.spawn(Faction::A, "ember", Position::new(3, 2)).unwrap();
        let before = board.units().to_vec();
        let err = board
            .move_unit(id, &[Position::new(3, 2), Position::new(3, 3)])
            .unwrap_err();
        assert_eq!(err, BoardError::Blocked(Position::new(3, 3)));
        assert_eq!(board.units(), before.as_slice());
    }

    #[test]
    fn entry_damage_applies_at_destination() {
        let mut board = board();
        let id = board.spawn(Faction::A, "ember", Position::new(1, 0)).unwrap();
        let events = board
            .move_unit(id, &[Position::new(1, 0), Position::new(2, 0)])
            .unwrap();
        assert!(events.contains(&BoardEvent::UnitDamaged {
            unit: id,
            amount: 30,
            remaining: 70
        }));
    }

    #[test]
    fn ending_on_a_structure_captures_it() {
        let mut board = board();
        let id = board.spawn(Faction::A, "ember", Position::new(4, 1)).unwrap();
        let events = board
            .move_unit(id, &[Position::new(4, 1), Position::new(4, 0)])
            .unwrap();
        assert!(events.iter().any(|event| matches!(
            event,
            BoardEvent::StructureCaptured { by: Faction::A, element: Element::Fire, .. }
        )));
        let fort = board.structure_at(Position::new(4, 0)).unwrap();
        assert!(fort.is_owned_by(Faction::A));

        let harvest = board.pass_turn();
        assert!(harvest.contains(&BoardEvent::ManaHarvested {
            faction: Faction::A,
            element: Element::Fire,
            amount: 1
        }));
        assert_eq!(board.mana(Faction::A), Mana::new(2, 0, 0));
        assert_eq!(board.active_faction(), Faction::B);
    }

    #[test]
    fn attack_hits_rotated_area_and_exhausts() {
        let mut board = board();
        let attacker = board.spawn(Faction::A, "ember", Position::new(1, 1)).unwrap();
        let victim = board.spawn(Faction::B, "tide", Position::new(2, 1)).unwrap();
        board.unit_mut(victim).unwrap().health = 40;

        let events = board.attack(attacker, CardinalDirection::Right).unwrap();
        assert!(events.iter().any(|event| matches!(event, BoardEvent::UnitKilled { unit, .. } if *unit == victim)));
        assert!(board.unit(victim).is_none());
        assert_eq!(
            board.attack(attacker, CardinalDirection::Up),
            Err(BoardError::Exhausted(attacker))
        );
    }

    #[test]
    fn deploy_spends_mana_of_active_faction() {
        let mut board = board();
        let cell = Position::new(0, 5);
        assert!(matches!(
            board.deploy("tide", cell),
            Err(BoardError::InsufficientMana { .. })
        ));
        let events = board.deploy("ember", cell).unwrap();
        assert!(matches!(events[0], BoardEvent::UnitAdded { owner: Faction::A, .. }));
        assert_eq!(board.mana(Faction::A), Mana::ZERO);
        assert_eq!(board.deploy("ember", Position::new(3, 3)), Err(BoardError::NotDeployable(Position::new(3, 3))));
    }

    #[test]
    fn only_active_faction_may_command() {
        let mut board = board();
        let rival = board.spawn(Faction::B, "tide", Position::new(5, 5)).unwrap();
        assert!(matches!(
            board.attack(rival, CardinalDirection::Up),
            Err(BoardError::NotActiveFaction { .. })
        ));
    }

    #[test]
    fn pass_turn_restores_outgoing_units() {
        let mut board = board();
        let id = board.spawn(Faction::A, "ember", Position::new(0, 0)).unwrap();
        board
            .move_unit(id, &[Position::new(0, 0), Position::new(0, 1)])
            .unwrap();
        board.attack(id, CardinalDirection::Down).unwrap();
        board.pass_turn();
        let unit = board.unit(id).unwrap();
        assert_eq!(unit.move_points, unit.max_move_points);
        assert!(!unit.exhausted);
    }

    #[test]
    fn held_units_are_busy_until_settled() {
        let mut board = board();
        board.set_hold_in_flight(true);
        let id = board.spawn(Faction::A, "ember", Position::new(0, 0)).unwrap();
        board
            .move_unit(id, &[Position::new(0, 0), Position::new(0, 1)])
            .unwrap();
        assert_eq!(
            board.attack(id, CardinalDirection::Down),
            Err(BoardError::UnitBusy(id))
        );
        board.settle();
        assert!(board.attack(id, CardinalDirection::Down).is_ok());
    }
}

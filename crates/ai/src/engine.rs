//! Per-faction decision cycle.
//!
//! # Semantics
//!
//! A turn runs against the board in this order:
//!
//! 1. rebuild the influence field,
//! 2. resolve the strategy tree and collect its waypoints,
//! 3. deploy on the best affordable deploy waypoints,
//! 4. let every friendly unit, in id order, resolve its own tree and play
//!    its plan,
//! 5. pass the turn.
//!
//! Every board event is fed back through [`DecisionEngine::on_event`], so
//! the field never lags the board. A failure in one unit's pipeline is
//! recorded in the [`TurnReport`] and the next unit still gets to act.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use skirmish_core::{BoardCommands, BoardEvent, BoardQuery, Faction, GridShape, UnitId};
use state_tree::StateTreeError;
use tracing::{debug, info, warn};

use crate::config::AiConfig;
use crate::context::FactionContext;
use crate::error::AiError;
use crate::executor::{self, PrimitiveAction};
use crate::faction::{self, StrategyTree};
use crate::influence::InfluenceField;
use crate::navigator::Navigator;
use crate::unit::{self, BehaviorTree, UnitContext};
use crate::waypoint::{WaypointKind, WaypointSet};

/// What one call to [`DecisionEngine::play_turn`] did.
#[derive(Clone, Debug)]
pub struct TurnReport {
    pub faction: Faction,
    pub turn: u32,
    /// Active strategy leaf the waypoints came from.
    pub strategy: &'static str,
    pub waypoints: WaypointSet,
    /// Primitives the board accepted, in play order.
    pub actions: Vec<PrimitiveAction>,
    pub failures: Vec<AiError>,
    pub events: Vec<BoardEvent>,
}

impl TurnReport {
    fn new(faction: Faction, turn: u32) -> Self {
        Self {
            faction,
            turn,
            strategy: faction::ROOT,
            waypoints: WaypointSet::default(),
            actions: Vec::new(),
            failures: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn kills(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, BoardEvent::UnitKilled { .. }))
            .count()
    }
}

pub struct DecisionEngine {
    faction: Faction,
    config: AiConfig,
    field: InfluenceField,
    strategy: StrategyTree,
    units: BTreeMap<UnitId, BehaviorTree>,
}

impl DecisionEngine {
    pub fn new(faction: Faction, shape: GridShape, config: AiConfig) -> Result<Self, AiError> {
        config.validate()?;
        let strategy = faction::strategy_tree(&config).map_err(|source| AiError::Resolution {
            tree: "faction",
            source,
        })?;
        Ok(Self {
            faction,
            field: InfluenceField::new(shape, &config.influence),
            config,
            strategy,
            units: BTreeMap::new(),
        })
    }

    pub fn faction(&self) -> Faction {
        self.faction
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    pub fn field(&self) -> &InfluenceField {
        &self.field
    }

    /// Active leaf of the strategy tree; `root` before the first plan.
    pub fn faction_leaf_name(&self) -> &'static str {
        self.strategy.name(self.strategy.active_leaf())
    }

    /// Active leaf of a unit's tree, if that unit has acted before.
    pub fn unit_leaf_name(&self, unit: UnitId) -> Option<&'static str> {
        self.units
            .get(&unit)
            .map(|tree| tree.name(tree.active_leaf()))
    }

    /// Keeps the field and the unit trees in step with the board.
    pub fn on_event<B: BoardQuery>(&mut self, board: &B, event: &BoardEvent) {
        if event.changes_unit_layout() {
            self.field.rebuild(board);
        }
        if let BoardEvent::UnitKilled { unit, .. } = event
            && let Some(mut tree) = self.units.remove(unit)
        {
            tree.shutdown();
            debug!(faction = %self.faction, %unit, "unit tree dropped");
        }
    }

    /// Waypoints the faction would publish right now.
    pub fn plan<B: BoardQuery>(&mut self, board: &B) -> Result<WaypointSet, AiError> {
        let (_, waypoints, fault) = self.strategize(board);
        match fault {
            Some(source) => Err(AiError::Resolution {
                tree: "faction",
                source,
            }),
            None => Ok(waypoints),
        }
    }

    fn strategize<B: BoardQuery>(
        &mut self,
        board: &B,
    ) -> (&'static str, WaypointSet, Option<StateTreeError>) {
        self.field.rebuild(board);
        let ctx = FactionContext::new(board, &self.field, &self.config, self.faction);
        let resolution = self.strategy.resolve_stable_leaf(&ctx);
        let leaf = self.strategy.name(resolution.leaf);
        let waypoints = self
            .strategy
            .node(resolution.leaf)
            .map(|node| node.state().waypoints(&ctx, *self.strategy.blackboard()))
            .unwrap_or_default();
        (leaf, WaypointSet::new(waypoints), resolution.fault)
    }

    /// Plays one full turn for this engine's faction.
    pub fn play_turn<B: BoardCommands>(&mut self, board: &mut B) -> TurnReport {
        let turn = board.turn();
        let faction = self.faction;
        let mut report = TurnReport::new(self.faction, turn);

        if board.active_faction() != self.faction {
            warn!(%faction, active = %board.active_faction(), "not this faction's turn");
            report.failures.push(AiError::OutOfTurn(self.faction));
            return report;
        }

        let (strategy, waypoints, fault) = self.strategize(&*board);
        report.strategy = strategy;
        if let Some(source) = fault {
            report.failures.push(AiError::Resolution {
                tree: "faction",
                source,
            });
        }
        debug!(%faction, turn, strategy, waypoints = waypoints.len(), "planned");

        self.deploy(board, &waypoints, &mut report);

        let mut roster: Vec<UnitId> = board.units_of(self.faction).map(|unit| unit.id).collect();
        roster.sort();
        for id in roster {
            self.act(board, id, &waypoints, &mut report);
        }

        match executor::apply(board, &PrimitiveAction::PassTurn) {
            Ok(events) => self.absorb(&*board, events, &mut report),
            Err(err) => report.failures.push(err),
        }

        info!(
            %faction,
            turn,
            strategy,
            actions = report.actions.len(),
            failures = report.failures.len(),
            kills = report.kills(),
            "turn done"
        );
        report.waypoints = waypoints;
        report
    }

    fn deploy<B: BoardCommands>(
        &mut self,
        board: &mut B,
        waypoints: &WaypointSet,
        report: &mut TurnReport,
    ) {
        let mut deployed = 0;
        for waypoint in waypoints.of_kind(WaypointKind::Deploy) {
            if deployed >= self.config.deploy.per_turn {
                break;
            }
            let Some(template) = board
                .affordable_template(self.faction, waypoint.affinity)
                .map(|template| template.name.clone())
            else {
                warn!(faction = %self.faction, cell = %waypoint.target, "no affordable template left");
                report.failures.push(AiError::Unaffordable);
                break;
            };
            if !board.is_deployable(waypoint.target) {
                continue;
            }
            let action = PrimitiveAction::Deploy {
                template,
                cell: waypoint.target,
            };
            match executor::apply(board, &action) {
                Ok(events) => {
                    deployed += 1;
                    report.actions.push(action);
                    self.absorb(&*board, events, report);
                }
                Err(err) => {
                    warn!(faction = %self.faction, %err, "deploy rejected");
                    report.failures.push(err);
                }
            }
        }
    }

    fn act<B: BoardCommands>(
        &mut self,
        board: &mut B,
        id: UnitId,
        waypoints: &WaypointSet,
        report: &mut TurnReport,
    ) {
        let actions = {
            let view: &B = board;
            let Some(unit) = view.unit(id).filter(|unit| unit.is_alive()) else {
                report.failures.push(AiError::UnitGone(id));
                return;
            };
            if !unit.selectable {
                debug!(unit = %id, "still mid-action, skipped");
                report.failures.push(AiError::UnitBusy(id));
                return;
            }
            let tree = match self.units.entry(id) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => match unit::behavior_tree(&self.config) {
                    Ok(tree) => entry.insert(tree),
                    Err(source) => {
                        report.failures.push(AiError::Resolution { tree: "unit", source });
                        return;
                    }
                },
            };

            let nav = Navigator::new(view);
            let faction = FactionContext::new(view, &self.field, &self.config, self.faction);
            let ctx = UnitContext::new(faction, unit, waypoints, &nav);
            let resolution = tree.resolve_stable_leaf(&ctx);
            if let Some(source) = resolution.fault {
                report.failures.push(AiError::Resolution { tree: "unit", source });
            }
            let leaf = tree.name(resolution.leaf);
            let actions = tree
                .node(resolution.leaf)
                .map(|node| node.state().strategy(&ctx, tree.blackboard()))
                .unwrap_or_default();
            debug!(unit = %id, leaf, planned = actions.len(), "unit planned");
            actions
        };

        for action in actions {
            match executor::apply(board, &action) {
                Ok(events) => {
                    report.actions.push(action);
                    self.absorb(&*board, events, report);
                }
                Err(err) => {
                    warn!(unit = %id, %err, "primitive rejected");
                    report.failures.push(err);
                    break;
                }
            }
            if board.unit(id).is_none_or(|unit| !unit.is_alive()) {
                debug!(unit = %id, "unit died mid-plan");
                break;
            }
        }
    }

    fn absorb<B: BoardQuery>(&mut self, board: &B, events: Vec<BoardEvent>, report: &mut TurnReport) {
        for event in events {
            self.on_event(board, &event);
            report.events.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use skirmish_core::{Board, BoardBuilder, Element, Mana, Position, UnitTemplate};

    use super::*;

    fn board() -> Board {
        BoardBuilder::new(GridShape::new(10, 8))
            .structure(Position::new(2, 2))
            .template(UnitTemplate::new("ember", Element::Fire, 1))
            .template(UnitTemplate::new("tide", Element::Water, 1))
            .mana(Faction::A, Mana::new(1, 1, 0))
            .build()
    }

    #[test]
    fn refuses_to_play_out_of_turn() {
        let mut board = board();
        let mut engine =
            DecisionEngine::new(Faction::B, board.shape(), AiConfig::default()).unwrap();
        let report = engine.play_turn(&mut board);
        assert_eq!(report.failures, vec![AiError::OutOfTurn(Faction::B)]);
        assert_eq!(board.active_faction(), Faction::A);
    }

    #[test]
    fn turn_deploys_and_passes() {
        let mut board = board();
        let mut engine =
            DecisionEngine::new(Faction::A, board.shape(), AiConfig::default()).unwrap();
        let report = engine.play_turn(&mut board);

        assert_eq!(report.strategy, faction::DEPLOY_FOCUS);
        assert_eq!(engine.faction_leaf_name(), faction::DEPLOY_FOCUS);
        let deploys = report
            .actions
            .iter()
            .filter(|action| matches!(action, PrimitiveAction::Deploy { .. }))
            .count();
        assert_eq!(deploys, 1);
        assert_eq!(board.units_of(Faction::A).count(), 1);
        assert_eq!(board.active_faction(), Faction::B);
        assert!(matches!(
            report.events.last(),
            Some(BoardEvent::TurnStarted { faction: Faction::B, .. })
        ));
    }

    #[test]
    fn killed_units_lose_their_tree() {
        let mut board = board();
        let mut engine =
            DecisionEngine::new(Faction::A, board.shape(), AiConfig::default()).unwrap();
        let unit = board.spawn(Faction::A, "ember", Position::new(6, 6)).unwrap();
        engine.play_turn(&mut board);
        assert!(engine.unit_leaf_name(unit).is_some());

        engine.on_event(
            &board,
            &BoardEvent::UnitKilled {
                unit,
                owner: Faction::A,
                cell: Position::new(6, 6),
            },
        );
        assert_eq!(engine.unit_leaf_name(unit), None);
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let mut config = AiConfig::default();
        config.unit.retreat_health = 1.5;
        let result = DecisionEngine::new(Faction::A, GridShape::new(4, 4), config);
        assert!(matches!(result, Err(AiError::Config(_))));
    }
}

//! Node payloads of the unit behavior tree.

use skirmish_core::{BoardQuery, Position};
use state_tree::{Lifecycle, Scope, State, Transition};

use super::{
    ADVANCE, ATTACK, CAPTURE, DISPERSE, DOMINATE, Directives, ENGAGE, ESCORT, HOLD, OVEREXTEND,
    RETREAT, SUPPORT, UnitContext, attack_leaf, choose_branch, dominate_leaf, hold_ground,
    risk_tolerance, support_leaf,
};
use crate::executor::PrimitiveAction;
use crate::waypoint::WaypointKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitState {
    Root,
    Attack,
    Dominate,
    Support,
    /// Close in on the best attack or move waypoint, striking if possible.
    Advance,
    /// Strike from the best cell that lands a hit.
    Engage,
    /// Fall back to the best-held cell in reach.
    Retreat,
    /// Rush the weakest rival regardless of safety.
    Overextend,
    Capture,
    /// Strike without moving.
    Hold,
    /// Stand next to the most wounded teammate.
    Escort,
    /// Spread out over open ground.
    Disperse,
}

impl UnitState {
    fn name(self) -> &'static str {
        match self {
            Self::Root => super::ROOT,
            Self::Attack => ATTACK,
            Self::Dominate => DOMINATE,
            Self::Support => SUPPORT,
            Self::Advance => ADVANCE,
            Self::Engage => ENGAGE,
            Self::Retreat => RETREAT,
            Self::Overextend => OVEREXTEND,
            Self::Capture => CAPTURE,
            Self::Hold => HOLD,
            Self::Escort => ESCORT,
            Self::Disperse => DISPERSE,
        }
    }

    fn branch(self) -> Option<&'static str> {
        match self {
            Self::Advance | Self::Engage | Self::Retreat | Self::Overextend => Some(ATTACK),
            Self::Capture | Self::Hold => Some(DOMINATE),
            Self::Escort | Self::Disperse => Some(SUPPORT),
            Self::Root | Self::Attack | Self::Dominate | Self::Support => None,
        }
    }

    /// Ordered primitives for this turn. Folders produce nothing.
    pub fn strategy<B: BoardQuery>(
        self,
        ctx: &UnitContext<'_, B>,
        directives: &Directives,
    ) -> Vec<PrimitiveAction> {
        let weight = directives.safety_weight();
        let candidates = ctx.candidate_cells(directives.hold_ground);
        let origin = ctx.unit.position;
        let element = ctx.unit.element;

        let destination = match self {
            Self::Root | Self::Attack | Self::Dominate | Self::Support => return Vec::new(),
            Self::Advance => ctx
                .best_strike_cell(&candidates, weight)
                .or_else(|| {
                    advance_target(ctx)
                        .and_then(|target| ctx.closest_cell(&candidates, target, weight))
                }),
            Self::Engage => ctx.best_strike_cell(&candidates, weight),
            Self::Retreat => ctx.best_cell(&candidates, |cell| {
                ctx.faction.field.relative_at(cell, ctx.faction.faction)
            }),
            Self::Overextend => ctx.best_strike_cell(&candidates, weight).or_else(|| {
                ctx.faction
                    .rival_units()
                    .min_by_key(|rival| rival.health)
                    .and_then(|rival| ctx.closest_cell(&candidates, rival.position, weight))
            }),
            Self::Capture => ctx
                .waypoints
                .best_for(WaypointKind::Capture, element)
                .and_then(|waypoint| {
                    if ctx.nav.is_reachable(ctx.unit, waypoint.target) {
                        Some(waypoint.target)
                    } else {
                        ctx.closest_cell(&candidates, waypoint.target, weight)
                    }
                }),
            Self::Hold => None,
            Self::Escort => ctx.wounded_teammate().and_then(|mate| {
                let beside: Vec<Position> = candidates
                    .iter()
                    .copied()
                    .filter(|cell| cell.manhattan(mate.position) == 1)
                    .collect();
                ctx.best_cell(&beside, |cell| ctx.safety(cell))
                    .or_else(|| ctx.closest_cell(&candidates, mate.position, weight))
            }),
            Self::Disperse => {
                let threshold = ctx.config().thresholds.no_mans_land;
                let open: Vec<Position> = candidates
                    .iter()
                    .copied()
                    .filter(|cell| ctx.faction.field.is_no_mans_land(*cell, threshold))
                    .collect();
                ctx.best_cell(&open, |cell| spread(ctx, cell) + ctx.safety(cell) * weight)
            }
        };
        ctx.plan(destination.unwrap_or(origin))
    }
}

/// The higher of the best attack and best move waypoint for this unit's
/// element, or the nearest rival when the faction published neither.
fn advance_target<B: BoardQuery>(ctx: &UnitContext<'_, B>) -> Option<Position> {
    let element = ctx.unit.element;
    let attack = ctx.waypoints.best_for(WaypointKind::Attack, element);
    let reposition = ctx.waypoints.best_for(WaypointKind::Move, element);
    match (attack, reposition) {
        (Some(attack), Some(reposition)) if reposition.priority > attack.priority => {
            Some(reposition.target)
        }
        (Some(waypoint), _) | (None, Some(waypoint)) => Some(waypoint.target),
        (None, None) => ctx.nearest_rival().map(|rival| rival.position),
    }
}

/// Distance from `cell` to the closest teammate.
fn spread<B: BoardQuery>(ctx: &UnitContext<'_, B>, cell: Position) -> f32 {
    ctx.faction
        .friendly_units()
        .filter(|mate| mate.id != ctx.unit.id)
        .map(|mate| mate.position.manhattan(cell))
        .min()
        .map_or(0.0, |d| d as f32)
}

impl Lifecycle<Directives> for UnitState {
    fn enter(&mut self, scope: &mut Scope<'_, Directives>) {
        match self {
            Self::Retreat => scope.temporary_change(risk_tolerance, 0.0),
            Self::Overextend => scope.temporary_change(risk_tolerance, 2.0),
            Self::Hold => scope.temporary_change(hold_ground, true),
            _ => {}
        }
    }
}

impl<'a, B: BoardQuery> State<UnitContext<'a, B>, Directives> for UnitState {
    fn try_transition(
        &mut self,
        ctx: &UnitContext<'a, B>,
        _directives: &Directives,
    ) -> Option<Transition> {
        let branch = choose_branch(ctx);
        let leaf = || match branch {
            ATTACK => attack_leaf(ctx),
            DOMINATE => dominate_leaf(ctx),
            _ => support_leaf(ctx),
        };
        match self {
            Self::Root => Some(Transition::Child(branch)),
            Self::Attack | Self::Dominate | Self::Support => {
                if branch != self.name() {
                    Some(Transition::Sibling(branch))
                } else {
                    Some(Transition::Child(leaf()))
                }
            }
            _ => {
                if self.branch() != Some(branch) {
                    Some(Transition::Parent)
                } else if leaf() != self.name() {
                    Some(Transition::Sibling(leaf()))
                } else {
                    None
                }
            }
        }
    }
}

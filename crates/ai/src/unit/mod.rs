//! Per-unit micro behavior.
//!
//! ```text
//! root
//!  ├─ attack     advance | engage | retreat | overextend
//!  ├─ dominate   capture | hold
//!  └─ support    escort | disperse
//! ```
//!
//! # Semantics
//!
//! Branch and leaf choices are pure functions of the board, the field and
//! the faction's waypoints ([`choose_branch`], [`attack_leaf`],
//! [`dominate_leaf`], [`support_leaf`]). The [`Directives`] blackboard only
//! shapes how the chosen leaf plans its moves.

mod context;
mod states;

pub use context::{Strike, UnitContext};
pub use states::UnitState;

use skirmish_core::BoardQuery;
use state_tree::{StateTree, StateTreeError, TreeBuilder};

use crate::config::AiConfig;
use crate::waypoint::WaypointKind;

pub const ROOT: &str = "root";
pub const ATTACK: &str = "attack";
pub const DOMINATE: &str = "dominate";
pub const SUPPORT: &str = "support";
pub const ADVANCE: &str = "advance";
pub const ENGAGE: &str = "engage";
pub const RETREAT: &str = "retreat";
pub const OVEREXTEND: &str = "overextend";
pub const CAPTURE: &str = "capture";
pub const HOLD: &str = "hold";
pub const ESCORT: &str = "escort";
pub const DISPERSE: &str = "disperse";

/// Unit blackboard.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Directives {
    /// 1.0 is neutral; 0.0 weighs safety heavily, 2.0 ignores it.
    pub risk_tolerance: f32,
    /// Strike from the current cell only.
    pub hold_ground: bool,
}

impl Default for Directives {
    fn default() -> Self {
        Self {
            risk_tolerance: 1.0,
            hold_ground: false,
        }
    }
}

impl Directives {
    pub fn safety_weight(&self) -> f32 {
        (2.0 - self.risk_tolerance).max(0.0)
    }
}

pub(crate) fn risk_tolerance(directives: &mut Directives) -> &mut f32 {
    &mut directives.risk_tolerance
}

pub(crate) fn hold_ground(directives: &mut Directives) -> &mut bool {
    &mut directives.hold_ground
}

pub type BehaviorTree = StateTree<UnitState, Directives>;

/// First match wins: defend the structure underfoot, chase a capture that
/// outranks every attack, cover a wounded teammate, idle into support when
/// nothing is left to fight, attack otherwise.
pub fn choose_branch<B: BoardQuery>(ctx: &UnitContext<'_, B>) -> &'static str {
    if ctx.on_threatened_structure() {
        return DOMINATE;
    }
    let attack = ctx.waypoints.best(WaypointKind::Attack);
    if let Some(capture) = ctx.waypoints.best(WaypointKind::Capture)
        && attack.is_none_or(|best| capture.priority > best.priority)
    {
        return DOMINATE;
    }
    if ctx.unit.health_ratio() > ctx.config().unit.retreat_health
        && ctx.wounded_teammate().is_some()
    {
        return SUPPORT;
    }
    if attack.is_none() && ctx.nearest_rival().is_none() {
        return SUPPORT;
    }
    ATTACK
}

/// Badly hurt units retreat, or throw themselves in when the faction can
/// replace them or they are nearly dead anyway.
pub fn attack_leaf<B: BoardQuery>(ctx: &UnitContext<'_, B>) -> &'static str {
    let config = &ctx.config().unit;
    let ratio = ctx.unit.health_ratio();
    if ratio <= config.retreat_health {
        if ctx.faction.can_field_unit() || ratio <= config.overextend_health {
            OVEREXTEND
        } else {
            RETREAT
        }
    } else if !ctx.unit.exhausted && ctx.strike_from(ctx.unit.position).is_some() {
        ENGAGE
    } else {
        ADVANCE
    }
}

pub fn dominate_leaf<B: BoardQuery>(ctx: &UnitContext<'_, B>) -> &'static str {
    if ctx.on_threatened_structure() {
        HOLD
    } else {
        CAPTURE
    }
}

pub fn support_leaf<B: BoardQuery>(ctx: &UnitContext<'_, B>) -> &'static str {
    if ctx.wounded_teammate().is_some() {
        ESCORT
    } else {
        DISPERSE
    }
}

/// Builds a unit tree; `hold` is the fallback leaf.
pub fn behavior_tree(config: &AiConfig) -> Result<BehaviorTree, StateTreeError> {
    let mut builder = TreeBuilder::new("unit", ROOT, UnitState::Root, Directives::default());
    let root = builder.root();

    let attack = builder.add_child(root, ATTACK, UnitState::Attack)?;
    builder.add_child(attack, ADVANCE, UnitState::Advance)?;
    builder.add_child(attack, ENGAGE, UnitState::Engage)?;
    builder.add_child(attack, RETREAT, UnitState::Retreat)?;
    builder.add_child(attack, OVEREXTEND, UnitState::Overextend)?;

    let dominate = builder.add_child(root, DOMINATE, UnitState::Dominate)?;
    builder.add_child(dominate, CAPTURE, UnitState::Capture)?;
    let hold = builder.add_child(dominate, HOLD, UnitState::Hold)?;

    let support = builder.add_child(root, SUPPORT, UnitState::Support)?;
    builder.add_child(support, ESCORT, UnitState::Escort)?;
    builder.add_child(support, DISPERSE, UnitState::Disperse)?;

    let builder = builder.fallback(hold);
    Ok(match config.resolver.iteration_cap {
        Some(cap) => builder.iteration_cap(cap),
        None => builder,
    }
    .build())
}

//! Faction-level strategy.
//!
//! One tree per faction decides the posture (defensive or offensive) and
//! the focus inside that posture. The active leaf publishes the turn's
//! waypoints.
//!
//! ```text
//! root
//!  ├─ defensive
//!  │   ├─ deploy-focus
//!  │   └─ fort-focus
//!  └─ offensive
//!      ├─ kill-focus
//!      └─ capture-focus
//! ```
//!
//! # Semantics
//!
//! Every node consults the same pure predicates ([`choose_posture`],
//! [`defensive_focus`], [`offensive_focus`]) so that a folder and the leaf
//! below it never disagree, which keeps resolution convergent. The posture
//! blackboard only biases priorities; it never feeds back into a decision.

mod states;

pub use states::FactionState;

use skirmish_core::BoardQuery;
use state_tree::{StateTree, StateTreeError, TreeBuilder};

use crate::config::AiConfig;
use crate::context::FactionContext;

pub const ROOT: &str = "root";
pub const DEFENSIVE: &str = "defensive";
pub const OFFENSIVE: &str = "offensive";
pub const DEPLOY_FOCUS: &str = "deploy-focus";
pub const FORT_FOCUS: &str = "fort-focus";
pub const KILL_FOCUS: &str = "kill-focus";
pub const CAPTURE_FOCUS: &str = "capture-focus";

/// Faction blackboard. Postures raise these while active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Posture {
    /// Added to attack priorities.
    pub aggression: i32,
    /// Added to move priorities.
    pub caution: i32,
}

pub(crate) fn aggression(posture: &mut Posture) -> &mut i32 {
    &mut posture.aggression
}

pub(crate) fn caution(posture: &mut Posture) -> &mut i32 {
    &mut posture.caution
}

pub type StrategyTree = StateTree<FactionState, Posture>;

/// Defensive while an owned structure is threatened, or while the army is
/// below its minimum size and reinforcements are affordable.
pub fn choose_posture<B: BoardQuery>(ctx: &FactionContext<'_, B>) -> &'static str {
    let undermanned = ctx.can_field_unit()
        && ctx.friendly_units().count() < ctx.config.deploy.min_army;
    if ctx.any_structure_threatened() || undermanned {
        DEFENSIVE
    } else {
        OFFENSIVE
    }
}

pub fn defensive_focus<B: BoardQuery>(ctx: &FactionContext<'_, B>) -> &'static str {
    if ctx.can_field_unit() {
        DEPLOY_FOCUS
    } else {
        FORT_FOCUS
    }
}

/// Capture while a structure is up for grabs and the faction is not
/// outnumbered; hunt rival units otherwise.
pub fn offensive_focus<B: BoardQuery>(ctx: &FactionContext<'_, B>) -> &'static str {
    let rivals = ctx.rival_units().count();
    let contested = ctx.contested_structures().next().is_some();
    if contested && (rivals == 0 || ctx.friendly_units().count() >= rivals) {
        CAPTURE_FOCUS
    } else {
        KILL_FOCUS
    }
}

/// Builds the strategy tree; the fallback leaf is `capture-focus`.
pub fn strategy_tree(config: &AiConfig) -> Result<StrategyTree, StateTreeError> {
    let mut builder = TreeBuilder::new("faction", ROOT, FactionState::Root, Posture::default());
    let root = builder.root();
    let defensive = builder.add_child(
        root,
        DEFENSIVE,
        FactionState::Defensive {
            caution: config.posture.defensive_caution,
        },
    )?;
    builder.add_child(defensive, DEPLOY_FOCUS, FactionState::DeployFocus)?;
    builder.add_child(defensive, FORT_FOCUS, FactionState::FortFocus)?;
    let offensive = builder.add_child(
        root,
        OFFENSIVE,
        FactionState::Offensive {
            aggression: config.posture.offensive_aggression,
        },
    )?;
    builder.add_child(offensive, KILL_FOCUS, FactionState::KillFocus)?;
    let capture = builder.add_child(offensive, CAPTURE_FOCUS, FactionState::CaptureFocus)?;

    let builder = builder.fallback(capture);
    Ok(match config.resolver.iteration_cap {
        Some(cap) => builder.iteration_cap(cap),
        None => builder,
    }
    .build())
}
